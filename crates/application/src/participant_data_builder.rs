use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{AppResult, TenantId};
use tessera_domain::{
    ApplicationTemplateWithLabels, ApplicationWithLabels, RuntimeContextWithLabels,
    RuntimeWithLabels,
};

use crate::formation_ports::{
    ApplicationRepository, ApplicationTemplateRepository, LabelRepository, LabelableObject,
    ParticipantDataBuilder, RuntimeContextRepository, RuntimeRepository,
};

/// Participant data builder backed by the participant and label repositories.
#[derive(Clone)]
pub struct LabelledParticipantDataBuilder {
    application_repository: Arc<dyn ApplicationRepository>,
    application_template_repository: Arc<dyn ApplicationTemplateRepository>,
    runtime_repository: Arc<dyn RuntimeRepository>,
    runtime_context_repository: Arc<dyn RuntimeContextRepository>,
    label_repository: Arc<dyn LabelRepository>,
}

impl LabelledParticipantDataBuilder {
    /// Creates a builder over the participant repositories.
    #[must_use]
    pub fn new(
        application_repository: Arc<dyn ApplicationRepository>,
        application_template_repository: Arc<dyn ApplicationTemplateRepository>,
        runtime_repository: Arc<dyn RuntimeRepository>,
        runtime_context_repository: Arc<dyn RuntimeContextRepository>,
        label_repository: Arc<dyn LabelRepository>,
    ) -> Self {
        Self {
            application_repository,
            application_template_repository,
            runtime_repository,
            runtime_context_repository,
            label_repository,
        }
    }
}

#[async_trait]
impl ParticipantDataBuilder for LabelledParticipantDataBuilder {
    async fn prepare_application_and_app_template_with_labels(
        &self,
        tenant_id: TenantId,
        application_id: &str,
    ) -> AppResult<(ApplicationWithLabels, Option<ApplicationTemplateWithLabels>)> {
        let application = self
            .application_repository
            .get_by_id(tenant_id, application_id)
            .await
            .map_err(|error| {
                error.context(format!("while getting application by ID: '{application_id}'"))
            })?;
        let labels = self
            .label_repository
            .list_for_object(tenant_id, LabelableObject::Application, application_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while listing labels for application with ID: '{application_id}'"
                ))
            })?;

        let application_template = match application
            .application_template_id
            .as_deref()
            .filter(|template_id| !template_id.is_empty())
        {
            Some(template_id) => {
                let application_template = self
                    .application_template_repository
                    .get(template_id)
                    .await
                    .map_err(|error| {
                        error.context(format!(
                            "while getting application template with ID: '{template_id}'"
                        ))
                    })?;
                let labels = self
                    .label_repository
                    .list_for_global_object(LabelableObject::ApplicationTemplate, template_id)
                    .await
                    .map_err(|error| {
                        error.context(format!(
                            "while listing labels for application template with ID: '{template_id}'"
                        ))
                    })?;

                Some(ApplicationTemplateWithLabels {
                    application_template,
                    labels,
                })
            }
            None => None,
        };

        Ok((
            ApplicationWithLabels {
                application,
                labels,
            },
            application_template,
        ))
    }

    async fn prepare_runtime_with_labels(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<RuntimeWithLabels> {
        let runtime = self
            .runtime_repository
            .get_by_id(tenant_id, runtime_id)
            .await
            .map_err(|error| error.context(format!("while getting runtime by ID: '{runtime_id}'")))?;
        let labels = self
            .label_repository
            .list_for_object(tenant_id, LabelableObject::Runtime, runtime_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while listing labels for runtime with ID: '{runtime_id}'"
                ))
            })?;

        Ok(RuntimeWithLabels { runtime, labels })
    }

    async fn prepare_runtime_context_with_labels(
        &self,
        tenant_id: TenantId,
        runtime_context_id: &str,
    ) -> AppResult<RuntimeContextWithLabels> {
        let runtime_context = self
            .runtime_context_repository
            .get_by_id(tenant_id, runtime_context_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting runtime context by ID: '{runtime_context_id}'"
                ))
            })?;
        let labels = self
            .label_repository
            .list_for_object(tenant_id, LabelableObject::RuntimeContext, runtime_context_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while listing labels for runtime context with ID: '{runtime_context_id}'"
                ))
            })?;

        Ok(RuntimeContextWithLabels {
            runtime_context,
            labels,
        })
    }

    async fn prepare_runtime_and_runtime_context_with_labels(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<(RuntimeWithLabels, Option<RuntimeContextWithLabels>)> {
        let runtime = self.prepare_runtime_with_labels(tenant_id, runtime_id).await?;
        let runtime_contexts = self
            .runtime_context_repository
            .list_by_runtime_id(tenant_id, runtime_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while listing runtime contexts for runtime with ID: '{runtime_id}'"
                ))
            })?;

        let runtime_context = match runtime_contexts.first() {
            Some(runtime_context) => Some(
                self.prepare_runtime_context_with_labels(tenant_id, runtime_context.id.as_str())
                    .await?,
            ),
            None => None,
        };

        Ok((runtime, runtime_context))
    }
}
