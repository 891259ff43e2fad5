use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tessera_application::{
    ApplicationRepository, ApplicationTemplateRepository, FormationRepository,
    FormationTemplateRepository, LabelRepository, LabelableObject, RuntimeContextRepository,
    RuntimeRepository, TenantContextResolver, WebhookRepository,
};
use tessera_core::{AppError, AppResult, TenantId};
use tessera_domain::{
    Application, ApplicationTemplate, CustomerTenantContext, Formation, FormationTemplate, Labels,
    Runtime, RuntimeContext, Webhook, WebhookOwnerType, WebhookType,
};
use tokio::sync::RwLock;

/// In-memory store for formations, participants, labels, webhooks, and tenant metadata.
///
/// Implements every read port around formation assignments, so a process can run
/// without PostgreSQL.
#[derive(Debug, Default)]
pub struct InMemoryParticipantDirectory {
    formations: RwLock<HashMap<String, Formation>>,
    formation_templates: RwLock<HashMap<String, FormationTemplate>>,
    applications: RwLock<HashMap<String, Application>>,
    application_templates: RwLock<HashMap<String, ApplicationTemplate>>,
    runtimes: RwLock<HashMap<String, Runtime>>,
    runtime_contexts: RwLock<HashMap<String, RuntimeContext>>,
    grants: RwLock<HashMap<(TenantId, LabelableObject, String), bool>>,
    labels: RwLock<HashMap<(LabelableObject, String), Labels>>,
    webhooks: RwLock<Vec<Webhook>>,
    tenant_contexts: RwLock<HashMap<TenantId, CustomerTenantContext>>,
}

impl InMemoryParticipantDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a formation together with its template.
    pub async fn save_formation(&self, formation: Formation, template: FormationTemplate) {
        self.formation_templates
            .write()
            .await
            .insert(template.id.clone(), template);
        self.formations
            .write()
            .await
            .insert(formation.id.clone(), formation);
    }

    /// Stores an application.
    pub async fn save_application(&self, application: Application) {
        self.applications
            .write()
            .await
            .insert(application.id.clone(), application);
    }

    /// Stores an application template.
    pub async fn save_application_template(&self, template: ApplicationTemplate) {
        self.application_templates
            .write()
            .await
            .insert(template.id.clone(), template);
    }

    /// Stores a runtime.
    pub async fn save_runtime(&self, runtime: Runtime) {
        self.runtimes
            .write()
            .await
            .insert(runtime.id.clone(), runtime);
    }

    /// Stores a runtime context.
    pub async fn save_runtime_context(&self, runtime_context: RuntimeContext) {
        self.runtime_contexts
            .write()
            .await
            .insert(runtime_context.id.clone(), runtime_context);
    }

    /// Makes an object visible to a tenant, optionally with owner access.
    pub async fn grant(
        &self,
        tenant_id: TenantId,
        object_type: LabelableObject,
        object_id: &str,
        owner: bool,
    ) {
        self.grants
            .write()
            .await
            .insert((tenant_id, object_type, object_id.to_owned()), owner);
    }

    /// Sets one label on an object.
    pub async fn save_label(
        &self,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
        value: Value,
    ) {
        self.labels
            .write()
            .await
            .entry((object_type, object_id.to_owned()))
            .or_default()
            .insert(key.to_owned(), value);
    }

    /// Registers a webhook.
    pub async fn save_webhook(&self, webhook: Webhook) {
        self.webhooks.write().await.push(webhook);
    }

    /// Stores the customer metadata of a tenant.
    pub async fn save_tenant_context(&self, tenant_id: TenantId, context: CustomerTenantContext) {
        self.tenant_contexts.write().await.insert(tenant_id, context);
    }

    async fn visible(&self, tenant_id: TenantId, object_type: LabelableObject, id: &str) -> bool {
        self.grants
            .read()
            .await
            .contains_key(&(tenant_id, object_type, id.to_owned()))
    }

    async fn owned(&self, tenant_id: TenantId, object_type: LabelableObject, id: &str) -> bool {
        self.grants
            .read()
            .await
            .get(&(tenant_id, object_type, id.to_owned()))
            .copied()
            .unwrap_or(false)
    }
}

fn not_found(kind: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{kind} with ID: '{id}' not found"))
}

#[async_trait]
impl FormationRepository for InMemoryParticipantDirectory {
    async fn get(&self, tenant_id: TenantId, formation_id: &str) -> AppResult<Formation> {
        self.formations
            .read()
            .await
            .get(formation_id)
            .filter(|formation| formation.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| not_found("formation", formation_id))
    }
}

#[async_trait]
impl FormationTemplateRepository for InMemoryParticipantDirectory {
    async fn get(&self, template_id: &str) -> AppResult<FormationTemplate> {
        self.formation_templates
            .read()
            .await
            .get(template_id)
            .cloned()
            .ok_or_else(|| not_found("formation template", template_id))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryParticipantDirectory {
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Application> {
        if !self
            .visible(tenant_id, LabelableObject::Application, id)
            .await
        {
            return Err(not_found("application", id));
        }

        ApplicationRepository::get_global_by_id(self, id).await
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<Application> {
        self.applications
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("application", id))
    }

    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        Ok(self.owned(tenant_id, LabelableObject::Application, id).await)
    }
}

#[async_trait]
impl ApplicationTemplateRepository for InMemoryParticipantDirectory {
    async fn get(&self, id: &str) -> AppResult<ApplicationTemplate> {
        self.application_templates
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("application template", id))
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.application_templates.read().await.contains_key(id))
    }
}

#[async_trait]
impl RuntimeRepository for InMemoryParticipantDirectory {
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Runtime> {
        if !self.visible(tenant_id, LabelableObject::Runtime, id).await {
            return Err(not_found("runtime", id));
        }

        self.runtimes
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("runtime", id))
    }

    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        Ok(self.owned(tenant_id, LabelableObject::Runtime, id).await)
    }
}

#[async_trait]
impl RuntimeContextRepository for InMemoryParticipantDirectory {
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<RuntimeContext> {
        if !self
            .visible(tenant_id, LabelableObject::RuntimeContext, id)
            .await
        {
            return Err(not_found("runtime context", id));
        }

        RuntimeContextRepository::get_global_by_id(self, id).await
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<RuntimeContext> {
        self.runtime_contexts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("runtime context", id))
    }

    async fn list_by_runtime_id(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<Vec<RuntimeContext>> {
        let candidates: Vec<RuntimeContext> = self
            .runtime_contexts
            .read()
            .await
            .values()
            .filter(|context| context.runtime_id == runtime_id)
            .cloned()
            .collect();

        let mut contexts = Vec::with_capacity(candidates.len());
        for context in candidates {
            if self
                .visible(tenant_id, LabelableObject::RuntimeContext, context.id.as_str())
                .await
            {
                contexts.push(context);
            }
        }
        contexts.sort_by(|left, right| left.id.cmp(&right.id));

        Ok(contexts)
    }
}

#[async_trait]
impl LabelRepository for InMemoryParticipantDirectory {
    async fn list_for_object(
        &self,
        _tenant_id: TenantId,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels> {
        self.list_for_global_object(object_type, object_id).await
    }

    async fn list_for_global_object(
        &self,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels> {
        Ok(self
            .labels
            .read()
            .await
            .get(&(object_type, object_id.to_owned()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl WebhookRepository for InMemoryParticipantDirectory {
    async fn get_by_id_and_webhook_type(
        &self,
        _tenant_id: TenantId,
        object_id: &str,
        object_type: WebhookOwnerType,
        webhook_type: WebhookType,
    ) -> AppResult<Webhook> {
        self.webhooks
            .read()
            .await
            .iter()
            .find(|webhook| {
                webhook.object_id == object_id
                    && webhook.object_type == object_type
                    && webhook.webhook_type == webhook_type
            })
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "webhook of type '{}' not found for {} with ID: '{object_id}'",
                    webhook_type.as_str(),
                    object_type.as_str()
                ))
            })
    }
}

#[async_trait]
impl TenantContextResolver for InMemoryParticipantDirectory {
    async fn customer_tenant_context(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<CustomerTenantContext> {
        self.tenant_contexts
            .read()
            .await
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("tenant '{tenant_id}' not found")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tessera_application::{
        ApplicationRepository, FormationRepository, LabelRepository, LabelableObject,
        RuntimeContextRepository, WebhookRepository,
    };
    use tessera_core::TenantId;
    use tessera_domain::{
        Application, Formation, FormationState, FormationTemplate, RuntimeContext,
        WebhookOwnerType, WebhookType,
    };

    use super::InMemoryParticipantDirectory;

    #[tokio::test]
    async fn formations_are_tenant_scoped() {
        let directory = InMemoryParticipantDirectory::new();
        let tenant_id = TenantId::new();
        directory
            .save_formation(
                Formation {
                    id: "formation-1".to_owned(),
                    tenant_id,
                    name: "formation".to_owned(),
                    formation_template_id: "template-1".to_owned(),
                    state: FormationState::Ready,
                },
                FormationTemplate {
                    id: "template-1".to_owned(),
                    name: "template".to_owned(),
                },
            )
            .await;

        assert!(directory.get(tenant_id, "formation-1").await.is_ok());
        let foreign = directory.get(TenantId::new(), "formation-1").await;
        assert!(foreign.is_err_and(|error| error.is_not_found()));
    }

    #[tokio::test]
    async fn applications_need_a_grant_for_tenant_reads() {
        let directory = InMemoryParticipantDirectory::new();
        let tenant_id = TenantId::new();
        directory
            .save_application(Application {
                id: "app-1".to_owned(),
                name: "app".to_owned(),
                application_template_id: None,
                integration_system_id: None,
            })
            .await;

        assert!(
            ApplicationRepository::get_by_id(&directory, tenant_id, "app-1")
                .await
                .is_err()
        );

        directory
            .grant(tenant_id, LabelableObject::Application, "app-1", false)
            .await;
        assert!(
            ApplicationRepository::get_by_id(&directory, tenant_id, "app-1")
                .await
                .is_ok()
        );
        assert_eq!(directory.owner_exists(tenant_id, "app-1").await, Ok(false));
    }

    #[tokio::test]
    async fn runtime_contexts_are_filtered_by_grant() {
        let directory = InMemoryParticipantDirectory::new();
        let tenant_id = TenantId::new();
        for id in ["ctx-2", "ctx-1", "ctx-3"] {
            directory
                .save_runtime_context(RuntimeContext {
                    id: id.to_owned(),
                    runtime_id: "runtime-1".to_owned(),
                    key: "subscription".to_owned(),
                    value: id.to_owned(),
                })
                .await;
        }
        directory
            .grant(tenant_id, LabelableObject::RuntimeContext, "ctx-2", false)
            .await;
        directory
            .grant(tenant_id, LabelableObject::RuntimeContext, "ctx-1", false)
            .await;

        let contexts = directory
            .list_by_runtime_id(tenant_id, "runtime-1")
            .await
            .unwrap_or_default();
        let ids: Vec<&str> = contexts.iter().map(|context| context.id.as_str()).collect();

        assert_eq!(ids, vec!["ctx-1", "ctx-2"]);
    }

    #[tokio::test]
    async fn missing_webhook_and_labels() {
        let directory = InMemoryParticipantDirectory::new();
        directory
            .save_label(LabelableObject::Runtime, "runtime-1", "runtimeType", json!("kyma"))
            .await;

        let labels = directory
            .list_for_object(TenantId::new(), LabelableObject::Runtime, "runtime-1")
            .await
            .unwrap_or_default();
        assert_eq!(labels.get("runtimeType"), Some(&json!("kyma")));

        let webhook = directory
            .get_by_id_and_webhook_type(
                TenantId::new(),
                "runtime-1",
                WebhookOwnerType::Runtime,
                WebhookType::ConfigurationChanged,
            )
            .await;
        assert!(webhook.is_err_and(|error| error.is_not_found()));
    }
}
