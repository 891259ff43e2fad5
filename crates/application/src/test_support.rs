use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tessera_core::{AppError, AppResult, Page, TenantId, decode_offset_cursor};
use tessera_domain::{
    Application, ApplicationTemplate, ApplicationTenantMappingDetails, AssignmentState,
    ConfigurationChangeDetails, ConstraintPhase, CustomerTenantContext, Formation,
    FormationAssignment, FormationState, FormationTemplate, JoinPointLocation, Labels,
    NotificationDetails, NotificationRequest, NotificationStatusReturnedDetails, ParticipantType,
    Runtime, RuntimeContext, Webhook, WebhookMode, WebhookOwnerType, WebhookType,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::formation_ports::{
    ApplicationRepository, ApplicationTemplateRepository, ApplicationTenantMappingInput,
    ConfigurationChangeInput, ConstraintEngine, FormationAssignmentRepository,
    FormationRepository, FormationTemplateRepository, LabelRepository, LabelableObject,
    NotificationBuilder, RuntimeContextRepository, RuntimeRepository, TenantContextResolver,
    WebhookRepository,
};

pub(crate) const FORMATION_ID: &str = "formation-1";
pub(crate) const FORMATION_TEMPLATE_ID: &str = "formation-template-1";

pub(crate) fn tenant() -> TenantId {
    TenantId::from_uuid(Uuid::from_u128(1))
}

pub(crate) fn assignment(
    id: &str,
    source: &str,
    source_type: ParticipantType,
    target: &str,
    target_type: ParticipantType,
    state: AssignmentState,
) -> FormationAssignment {
    FormationAssignment {
        id: id.to_owned(),
        formation_id: FORMATION_ID.to_owned(),
        tenant_id: tenant(),
        source: source.to_owned(),
        source_type,
        target: target.to_owned(),
        target_type,
        state,
        value: None,
        error: None,
        last_state_change_timestamp: None,
        last_notification_sent_timestamp: None,
    }
}

pub(crate) fn webhook(object_id: &str, object_type: WebhookOwnerType) -> Webhook {
    Webhook {
        id: format!("webhook-{object_id}"),
        object_id: object_id.to_owned(),
        object_type,
        webhook_type: WebhookType::ConfigurationChanged,
        url: Some(format!("https://hooks.example.com/{object_id}")),
        mode: WebhookMode::Sync,
    }
}

/// Ordered record of collaborator calls shared across fakes.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub(crate) async fn record(&self, call: impl Into<String>) {
        self.0.lock().await.push(call.into());
    }

    pub(crate) async fn calls(&self) -> Vec<String> {
        self.0.lock().await.clone()
    }

    pub(crate) async fn position(&self, call: &str) -> Option<usize> {
        self.0.lock().await.iter().position(|value| value == call)
    }
}

#[derive(Default)]
pub(crate) struct FakeAssignmentRepository {
    pub(crate) assignments: Mutex<BTreeMap<String, FormationAssignment>>,
    pub(crate) update_error: Mutex<Option<AppError>>,
    pub(crate) delete_error: Mutex<Option<AppError>>,
    pub(crate) log: CallLog,
}

impl FakeAssignmentRepository {
    pub(crate) fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub(crate) async fn insert(&self, assignment: FormationAssignment) {
        self.assignments
            .lock()
            .await
            .insert(assignment.id.clone(), assignment);
    }

    pub(crate) async fn stored(&self, id: &str) -> Option<FormationAssignment> {
        self.assignments.lock().await.get(id).cloned()
    }

    async fn find(
        &self,
        predicate: impl Fn(&FormationAssignment) -> bool,
    ) -> AppResult<FormationAssignment> {
        self.assignments
            .lock()
            .await
            .values()
            .find(|assignment| predicate(assignment))
            .cloned()
            .ok_or_else(|| AppError::NotFound("formation assignment not found".to_owned()))
    }

    async fn filter(
        &self,
        predicate: impl Fn(&FormationAssignment) -> bool,
    ) -> Vec<FormationAssignment> {
        self.assignments
            .lock()
            .await
            .values()
            .filter(|assignment| predicate(assignment))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl FormationAssignmentRepository for FakeAssignmentRepository {
    async fn create(&self, assignment: &FormationAssignment) -> AppResult<()> {
        self.log.record(format!("create:{}", assignment.id)).await;
        self.insert(assignment.clone()).await;
        Ok(())
    }

    async fn get(&self, tenant_id: TenantId, id: &str) -> AppResult<FormationAssignment> {
        self.log.record(format!("get:{id}")).await;
        self.find(|assignment| assignment.tenant_id == tenant_id && assignment.id == id)
            .await
    }

    async fn get_for_formation(
        &self,
        tenant_id: TenantId,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.find(|assignment| {
            assignment.tenant_id == tenant_id
                && assignment.id == id
                && assignment.formation_id == formation_id
        })
        .await
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<FormationAssignment> {
        self.find(|assignment| assignment.id == id).await
    }

    async fn get_global_by_id_and_formation_id(
        &self,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.log.record(format!("get_global:{id}")).await;
        self.find(|assignment| assignment.id == id && assignment.formation_id == formation_id)
            .await
    }

    async fn get_by_source_and_target(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        source: &str,
        target: &str,
    ) -> AppResult<FormationAssignment> {
        self.log.record(format!("get_by_source_and_target:{source}:{target}")).await;
        self.find(|assignment| {
            assignment.tenant_id == tenant_id
                && assignment.formation_id == formation_id
                && assignment.source == source
                && assignment.target == target
        })
        .await
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Page<FormationAssignment>> {
        let offset = decode_offset_cursor(cursor)?;
        let rows = self.filter(|assignment| assignment.tenant_id == tenant_id).await;
        let total = rows.len();
        let data = rows.into_iter().skip(offset).take(page_size).collect();
        Ok(Page::from_offset_window(data, total, cursor, offset, page_size))
    }

    async fn list_by_formation_ids(
        &self,
        tenant_id: TenantId,
        formation_ids: &[String],
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Vec<Page<FormationAssignment>>> {
        let mut pages = Vec::with_capacity(formation_ids.len());
        for formation_id in formation_ids {
            let offset = decode_offset_cursor(cursor)?;
            let rows = self
                .filter(|assignment| {
                    assignment.tenant_id == tenant_id && &assignment.formation_id == formation_id
                })
                .await;
            let total = rows.len();
            let data = rows.into_iter().skip(offset).take(page_size).collect();
            pages.push(Page::from_offset_window(data, total, cursor, offset, page_size));
        }
        Ok(pages)
    }

    async fn list_all_for_object(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.formation_id == formation_id
                    && (assignment.source == object_id || assignment.target == object_id)
            })
            .await)
    }

    async fn list_all_for_object_ids(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.formation_id == formation_id
                    && (object_ids.contains(&assignment.source)
                        || object_ids.contains(&assignment.target))
            })
            .await)
    }

    async fn list_all_for_object_global(
        &self,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| assignment.source == object_id || assignment.target == object_id)
            .await)
    }

    async fn list_for_ids(
        &self,
        tenant_id: TenantId,
        ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| assignment.tenant_id == tenant_id && ids.contains(&assignment.id))
            .await)
    }

    async fn get_assignments_for_formation(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id && assignment.formation_id == formation_id
            })
            .await)
    }

    async fn get_assignments_for_formation_with_states(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        states: &[AssignmentState],
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.formation_id == formation_id
                    && states.contains(&assignment.state)
            })
            .await)
    }

    async fn update(&self, assignment: &FormationAssignment) -> AppResult<()> {
        self.log
            .record(format!("update:{}:{}", assignment.id, assignment.state))
            .await;
        if let Some(error) = self.update_error.lock().await.clone() {
            return Err(error);
        }

        let mut assignments = self.assignments.lock().await;
        if !assignments.contains_key(assignment.id.as_str()) {
            return Err(AppError::NotFound("formation assignment not found".to_owned()));
        }
        assignments.insert(assignment.id.clone(), assignment.clone());
        Ok(())
    }

    async fn update_last_notification_sent_timestamp(&self, id: &str) -> AppResult<()> {
        self.log.record(format!("stamp:{id}")).await;
        Ok(())
    }

    async fn delete(&self, tenant_id: TenantId, id: &str) -> AppResult<()> {
        self.log.record(format!("delete:{id}")).await;
        if let Some(error) = self.delete_error.lock().await.clone() {
            return Err(error);
        }

        let mut assignments = self.assignments.lock().await;
        match assignments.get(id) {
            Some(assignment) if assignment.tenant_id == tenant_id => {
                assignments.remove(id);
                Ok(())
            }
            _ => Err(AppError::Unauthorized(
                "tenant does not own the formation assignment".to_owned(),
            )),
        }
    }

    async fn delete_assignments_for_object_id(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<()> {
        self.assignments.lock().await.retain(|_, assignment| {
            !(assignment.tenant_id == tenant_id
                && assignment.formation_id == formation_id
                && (assignment.source == object_id || assignment.target == object_id))
        });
        Ok(())
    }

    async fn exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        self.log.record(format!("exists:{id}")).await;
        Ok(self
            .assignments
            .lock()
            .await
            .get(id)
            .is_some_and(|assignment| assignment.tenant_id == tenant_id))
    }
}

pub(crate) struct FakeFormationRepository {
    pub(crate) formations: HashMap<String, Formation>,
}

impl Default for FakeFormationRepository {
    fn default() -> Self {
        Self {
            formations: HashMap::from([(
                FORMATION_ID.to_owned(),
                Formation {
                    id: FORMATION_ID.to_owned(),
                    tenant_id: tenant(),
                    name: "formation".to_owned(),
                    formation_template_id: FORMATION_TEMPLATE_ID.to_owned(),
                    state: FormationState::Ready,
                },
            )]),
        }
    }
}

#[async_trait]
impl FormationRepository for FakeFormationRepository {
    async fn get(&self, tenant_id: TenantId, formation_id: &str) -> AppResult<Formation> {
        self.formations
            .get(formation_id)
            .filter(|formation| formation.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("formation '{formation_id}' not found")))
    }
}

#[async_trait]
impl FormationTemplateRepository for FakeFormationRepository {
    async fn get(&self, template_id: &str) -> AppResult<FormationTemplate> {
        if template_id != FORMATION_TEMPLATE_ID {
            return Err(AppError::NotFound(format!(
                "formation template '{template_id}' not found"
            )));
        }

        Ok(FormationTemplate {
            id: FORMATION_TEMPLATE_ID.to_owned(),
            name: "template".to_owned(),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeConstraintEngine {
    pub(crate) fail_at: Option<ConstraintPhase>,
    pub(crate) seen: Mutex<Vec<NotificationStatusReturnedDetails>>,
    pub(crate) log: CallLog,
}

#[async_trait]
impl ConstraintEngine for FakeConstraintEngine {
    async fn enforce_constraints(
        &self,
        location: JoinPointLocation,
        details: &NotificationStatusReturnedDetails,
        _formation_template_id: &str,
    ) -> AppResult<()> {
        self.log
            .record(format!("enforce:{}", location.phase.as_str()))
            .await;
        self.seen.lock().await.push(details.clone());
        if self.fail_at == Some(location.phase) {
            return Err(AppError::Conflict("constraint violated".to_owned()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeWebhookRepository {
    pub(crate) webhooks: HashMap<String, Webhook>,
    pub(crate) log: CallLog,
}

#[async_trait]
impl WebhookRepository for FakeWebhookRepository {
    async fn get_by_id_and_webhook_type(
        &self,
        _tenant_id: TenantId,
        object_id: &str,
        object_type: WebhookOwnerType,
        webhook_type: WebhookType,
    ) -> AppResult<Webhook> {
        self.log.record(format!("webhook:{object_id}")).await;
        self.webhooks
            .get(object_id)
            .filter(|webhook| {
                webhook.object_type == object_type && webhook.webhook_type == webhook_type
            })
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("webhook for '{object_id}' not found")))
    }
}

#[derive(Default)]
pub(crate) struct FakeParticipants {
    pub(crate) applications: HashMap<String, Application>,
    pub(crate) application_templates: HashMap<String, ApplicationTemplate>,
    pub(crate) runtimes: HashMap<String, Runtime>,
    pub(crate) runtime_contexts: HashMap<String, RuntimeContext>,
    pub(crate) labels: HashMap<(LabelableObject, String), Labels>,
    pub(crate) owners: HashSet<(TenantId, String)>,
    pub(crate) owner_check_fails: bool,
    pub(crate) template_check_fails: bool,
    pub(crate) log: CallLog,
}

impl FakeParticipants {
    pub(crate) fn with_application(mut self, id: &str, template_id: Option<&str>) -> Self {
        self.applications.insert(
            id.to_owned(),
            Application {
                id: id.to_owned(),
                name: format!("{id}-name"),
                application_template_id: template_id.map(str::to_owned),
                integration_system_id: None,
            },
        );
        self
    }

    pub(crate) fn with_runtime(mut self, id: &str) -> Self {
        self.runtimes.insert(
            id.to_owned(),
            Runtime {
                id: id.to_owned(),
                name: format!("{id}-name"),
            },
        );
        self
    }

    pub(crate) fn with_runtime_context(mut self, id: &str, runtime_id: &str) -> Self {
        self.runtime_contexts.insert(
            id.to_owned(),
            RuntimeContext {
                id: id.to_owned(),
                runtime_id: runtime_id.to_owned(),
                key: "subscription".to_owned(),
                value: format!("{id}-value"),
            },
        );
        self
    }

    pub(crate) fn with_label(
        mut self,
        object_type: LabelableObject,
        object_id: &str,
        key: &str,
        value: Value,
    ) -> Self {
        self.labels
            .entry((object_type, object_id.to_owned()))
            .or_default()
            .insert(key.to_owned(), value);
        self
    }

    pub(crate) fn with_owner(mut self, tenant_id: TenantId, object_id: &str) -> Self {
        self.owners.insert((tenant_id, object_id.to_owned()));
        self
    }
}

fn not_found(kind: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{kind} '{id}' not found"))
}

#[async_trait]
impl ApplicationRepository for FakeParticipants {
    async fn get_by_id(&self, _tenant_id: TenantId, id: &str) -> AppResult<Application> {
        self.log.record(format!("application:{id}")).await;
        self.applications
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("application", id))
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<Application> {
        self.log.record(format!("application_global:{id}")).await;
        self.applications
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("application", id))
    }

    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        self.log.record(format!("application_owner:{id}")).await;
        if self.owner_check_fails {
            return Err(AppError::Internal("owner check failed".to_owned()));
        }
        Ok(self.owners.contains(&(tenant_id, id.to_owned())))
    }
}

#[async_trait]
impl RuntimeRepository for FakeParticipants {
    async fn get_by_id(&self, _tenant_id: TenantId, id: &str) -> AppResult<Runtime> {
        self.log.record(format!("runtime:{id}")).await;
        self.runtimes
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("runtime", id))
    }

    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        self.log.record(format!("runtime_owner:{id}")).await;
        if self.owner_check_fails {
            return Err(AppError::Internal("owner check failed".to_owned()));
        }
        Ok(self.owners.contains(&(tenant_id, id.to_owned())))
    }
}

#[async_trait]
impl RuntimeContextRepository for FakeParticipants {
    async fn get_by_id(&self, _tenant_id: TenantId, id: &str) -> AppResult<RuntimeContext> {
        self.log.record(format!("runtime_context:{id}")).await;
        self.runtime_contexts
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("runtime context", id))
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<RuntimeContext> {
        self.log.record(format!("runtime_context_global:{id}")).await;
        self.runtime_contexts
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("runtime context", id))
    }

    async fn list_by_runtime_id(
        &self,
        _tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<Vec<RuntimeContext>> {
        self.log.record(format!("runtime_contexts:{runtime_id}")).await;
        let mut contexts: Vec<RuntimeContext> = self
            .runtime_contexts
            .values()
            .filter(|context| context.runtime_id == runtime_id)
            .cloned()
            .collect();
        contexts.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(contexts)
    }
}

#[async_trait]
impl ApplicationTemplateRepository for FakeParticipants {
    async fn get(&self, id: &str) -> AppResult<ApplicationTemplate> {
        self.log.record(format!("application_template:{id}")).await;
        self.application_templates
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("application template", id))
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        self.log.record(format!("application_template_exists:{id}")).await;
        if self.template_check_fails {
            return Err(AppError::Internal("template check failed".to_owned()));
        }
        Ok(self.application_templates.contains_key(id))
    }
}

#[async_trait]
impl LabelRepository for FakeParticipants {
    async fn list_for_object(
        &self,
        _tenant_id: TenantId,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels> {
        Ok(self
            .labels
            .get(&(object_type, object_id.to_owned()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_for_global_object(
        &self,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels> {
        self.log
            .record(format!("labels_global:{}", object_type.as_str()))
            .await;
        Ok(self
            .labels
            .get(&(object_type, object_id.to_owned()))
            .cloned()
            .unwrap_or_default())
    }
}

pub(crate) struct FakeTenantContextResolver;

#[async_trait]
impl TenantContextResolver for FakeTenantContextResolver {
    async fn customer_tenant_context(
        &self,
        _tenant_id: TenantId,
    ) -> AppResult<CustomerTenantContext> {
        Ok(CustomerTenantContext {
            customer_id: "customer-1".to_owned(),
            account_id: Some("account-1".to_owned()),
            path: None,
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeNotificationBuilder {
    pub(crate) log: CallLog,
}

#[async_trait]
impl NotificationBuilder for FakeNotificationBuilder {
    fn prepare_details_for_configuration_change_notification_generation(
        &self,
        input: ConfigurationChangeInput,
    ) -> AppResult<NotificationDetails> {
        Ok(NotificationDetails::ConfigurationChange(
            ConfigurationChangeDetails {
                operation: input.operation,
                formation_id: input.formation_id,
                customer_tenant_context: input.customer_tenant_context,
                application_template: input.application_template,
                application: input.application,
                runtime: input.runtime,
                runtime_context: input.runtime_context,
                assignment: input.assignment.snapshot(),
                reverse_assignment: input.reverse_assignment.snapshot(),
                resource_type: input.resource_type,
            },
        ))
    }

    fn prepare_details_for_application_tenant_mapping_notification_generation(
        &self,
        input: ApplicationTenantMappingInput,
    ) -> AppResult<NotificationDetails> {
        Ok(NotificationDetails::ApplicationTenantMapping(
            ApplicationTenantMappingDetails {
                operation: input.operation,
                formation_id: input.formation_id,
                customer_tenant_context: input.customer_tenant_context,
                source_application_template: input.source_application_template,
                source_application: input.source_application,
                target_application_template: input.target_application_template,
                target_application: input.target_application,
                assignment: input.assignment.snapshot(),
                reverse_assignment: input.reverse_assignment.snapshot(),
            },
        ))
    }

    async fn build_notification_request(
        &self,
        formation_template_id: &str,
        details: &NotificationDetails,
        webhook: &Webhook,
    ) -> AppResult<NotificationRequest> {
        self.log.record(format!("build:{}", webhook.object_id)).await;
        Ok(NotificationRequest {
            webhook: webhook.clone(),
            formation_template_id: formation_template_id.to_owned(),
            correlation_id: "correlation-1".to_owned(),
            url: webhook.url.clone().unwrap_or_default(),
            body: serde_json::to_value(details).unwrap_or_else(|_| json!({})),
        })
    }
}
