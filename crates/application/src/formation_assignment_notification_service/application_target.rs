use tessera_domain::NotificationDetails;

use crate::formation_ports::{ApplicationTenantMappingInput, ConfigurationChangeInput};

use super::*;

impl FormationAssignmentNotificationService {
    pub(super) async fn generate_application_notification(
        &self,
        context: &GenerationContext<'_>,
        source_type: ParticipantType,
    ) -> AppResult<Option<NotificationRequest>> {
        let assignment = context.assignment;
        let tenant_id = assignment.tenant_id;
        let application_id = assignment.target.as_str();

        let Some(webhook) = self
            .configuration_changed_webhook(tenant_id, application_id, WebhookOwnerType::Application)
            .await?
        else {
            return Ok(None);
        };

        let (application, application_template) = self
            .participant_data_builder
            .prepare_application_and_app_template_with_labels(tenant_id, application_id)
            .await?;

        info!(
            assignment_id = %assignment.id,
            source_type = %source_type,
            source = %assignment.source,
            "resolved reverse participant of formation assignment"
        );

        let details = match source_type {
            ParticipantType::Application => {
                let (source_application, source_application_template) = self
                    .participant_data_builder
                    .prepare_application_and_app_template_with_labels(
                        tenant_id,
                        assignment.source.as_str(),
                    )
                    .await?;
                let reverse_assignment = self.reverse_assignment(assignment).await?;

                self.notification_builder
                    .prepare_details_for_application_tenant_mapping_notification_generation(
                        ApplicationTenantMappingInput {
                            operation: context.operation,
                            formation_id: assignment.formation_id.clone(),
                            customer_tenant_context: context.customer_tenant_context.clone(),
                            source_application_template,
                            source_application,
                            target_application_template: application_template,
                            target_application: application,
                            assignment: assignment.clone(),
                            reverse_assignment,
                        },
                    )?
            }
            ParticipantType::Runtime => {
                let (runtime, runtime_context) = self
                    .participant_data_builder
                    .prepare_runtime_and_runtime_context_with_labels(
                        tenant_id,
                        assignment.source.as_str(),
                    )
                    .await?;
                let reverse_assignment = self.reverse_assignment(assignment).await?;

                self.configuration_change_details(ConfigurationChangeInput {
                    operation: context.operation,
                    formation_id: assignment.formation_id.clone(),
                    customer_tenant_context: context.customer_tenant_context.clone(),
                    application_template,
                    application,
                    runtime,
                    runtime_context,
                    assignment: assignment.clone(),
                    reverse_assignment,
                    resource_type: ParticipantType::Application,
                })?
            }
            ParticipantType::RuntimeContext => {
                let runtime_context = self
                    .participant_data_builder
                    .prepare_runtime_context_with_labels(tenant_id, assignment.source.as_str())
                    .await?;
                let runtime = self
                    .participant_data_builder
                    .prepare_runtime_with_labels(
                        tenant_id,
                        runtime_context.runtime_context.runtime_id.as_str(),
                    )
                    .await?;
                let reverse_assignment = self.reverse_assignment(assignment).await?;

                self.configuration_change_details(ConfigurationChangeInput {
                    operation: context.operation,
                    formation_id: assignment.formation_id.clone(),
                    customer_tenant_context: context.customer_tenant_context.clone(),
                    application_template,
                    application,
                    runtime,
                    runtime_context: Some(runtime_context),
                    assignment: assignment.clone(),
                    reverse_assignment,
                    resource_type: ParticipantType::Application,
                })?
            }
        };

        self.build_request(context, &details, &webhook).await
    }

    pub(super) fn configuration_change_details(
        &self,
        input: ConfigurationChangeInput,
    ) -> AppResult<NotificationDetails> {
        self.notification_builder
            .prepare_details_for_configuration_change_notification_generation(input)
    }

    pub(super) async fn build_request(
        &self,
        context: &GenerationContext<'_>,
        details: &NotificationDetails,
        webhook: &Webhook,
    ) -> AppResult<Option<NotificationRequest>> {
        self.notification_builder
            .build_notification_request(context.formation_template_id.as_str(), details, webhook)
            .await
            .map(Some)
            .map_err(|error| {
                error.context(format!(
                    "while building notification request for formation assignment with ID: '{}'",
                    context.assignment.id
                ))
            })
    }
}
