use async_trait::async_trait;
use serde_json::{Value, json};
use tessera_application::{
    ApplicationTenantMappingInput, ConfigurationChangeInput, NotificationBuilder,
};
use tessera_core::{AppError, AppResult};
use tessera_domain::{
    ApplicationTenantMappingDetails, ConfigurationChangeDetails, FormationAssignment,
    NotificationDetails, NotificationRequest, Webhook,
};
use uuid::Uuid;

/// Renders notification details as JSON request bodies for webhook delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonNotificationBuilder;

impl JsonNotificationBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn ensure_formation_member(formation_id: &str, assignment: &FormationAssignment) -> AppResult<()> {
    if assignment.formation_id != formation_id {
        return Err(AppError::Validation(format!(
            "formation assignment '{}' belongs to formation '{}', not '{formation_id}'",
            assignment.id, assignment.formation_id
        )));
    }

    Ok(())
}

#[async_trait]
impl NotificationBuilder for JsonNotificationBuilder {
    fn prepare_details_for_configuration_change_notification_generation(
        &self,
        input: ConfigurationChangeInput,
    ) -> AppResult<NotificationDetails> {
        ensure_formation_member(input.formation_id.as_str(), &input.assignment)?;
        ensure_formation_member(input.formation_id.as_str(), &input.reverse_assignment)?;

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
        ensure_formation_member(input.formation_id.as_str(), &input.assignment)?;
        ensure_formation_member(input.formation_id.as_str(), &input.reverse_assignment)?;

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
        let url = webhook
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation(format!("webhook '{}' has no URL", webhook.id))
            })?;

        let mut body = serde_json::to_value(details).map_err(|error| {
            AppError::Internal(format!("failed to serialize notification details: {error}"))
        })?;
        let Value::Object(fields) = &mut body else {
            return Err(AppError::Internal(
                "notification details must serialize to a JSON object".to_owned(),
            ));
        };
        fields.insert("operation".to_owned(), json!(details.operation().as_str()));
        fields.insert(
            "resourceType".to_owned(),
            json!(details.resource_type().as_str()),
        );
        fields.insert("formationId".to_owned(), json!(details.formation_id()));

        Ok(NotificationRequest {
            webhook: webhook.clone(),
            formation_template_id: formation_template_id.to_owned(),
            correlation_id: Uuid::new_v4().to_string(),
            url: url.to_owned(),
            body,
        })
    }
}
