use crate::formation_ports::ConfigurationChangeInput;

use super::*;

impl FormationAssignmentNotificationService {
    pub(super) async fn generate_runtime_notification(
        &self,
        context: &GenerationContext<'_>,
    ) -> AppResult<Option<NotificationRequest>> {
        let assignment = context.assignment;
        let tenant_id = assignment.tenant_id;
        let runtime_id = assignment.target.as_str();

        let Some(webhook) = self
            .configuration_changed_webhook(tenant_id, runtime_id, WebhookOwnerType::Runtime)
            .await?
        else {
            return Ok(None);
        };

        let (application, application_template) = self
            .participant_data_builder
            .prepare_application_and_app_template_with_labels(tenant_id, assignment.source.as_str())
            .await?;
        let runtime = self
            .participant_data_builder
            .prepare_runtime_with_labels(tenant_id, runtime_id)
            .await?;
        let reverse_assignment = self.reverse_assignment(assignment).await?;

        let details = self.configuration_change_details(ConfigurationChangeInput {
            operation: context.operation,
            formation_id: assignment.formation_id.clone(),
            customer_tenant_context: context.customer_tenant_context.clone(),
            application_template,
            application,
            runtime,
            runtime_context: None,
            assignment: assignment.clone(),
            reverse_assignment,
            resource_type: ParticipantType::Runtime,
        })?;

        self.build_request(context, &details, &webhook).await
    }

    pub(super) async fn generate_runtime_context_notification(
        &self,
        context: &GenerationContext<'_>,
    ) -> AppResult<Option<NotificationRequest>> {
        let assignment = context.assignment;
        let tenant_id = assignment.tenant_id;

        let runtime_context = self
            .participant_data_builder
            .prepare_runtime_context_with_labels(tenant_id, assignment.target.as_str())
            .await?;
        let runtime_id = runtime_context.runtime_context.runtime_id.clone();

        let Some(webhook) = self
            .configuration_changed_webhook(tenant_id, runtime_id.as_str(), WebhookOwnerType::Runtime)
            .await?
        else {
            return Ok(None);
        };

        let (application, application_template) = self
            .participant_data_builder
            .prepare_application_and_app_template_with_labels(tenant_id, assignment.source.as_str())
            .await?;
        let runtime = self
            .participant_data_builder
            .prepare_runtime_with_labels(tenant_id, runtime_id.as_str())
            .await?;
        let reverse_assignment = self.reverse_assignment(assignment).await?;

        let details = self.configuration_change_details(ConfigurationChangeInput {
            operation: context.operation,
            formation_id: assignment.formation_id.clone(),
            customer_tenant_context: context.customer_tenant_context.clone(),
            application_template,
            application,
            runtime,
            runtime_context: Some(runtime_context),
            assignment: assignment.clone(),
            reverse_assignment,
            resource_type: ParticipantType::RuntimeContext,
        })?;

        self.build_request(context, &details, &webhook).await
    }
}
