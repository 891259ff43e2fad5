use std::sync::Arc;

use tessera_core::{AppError, AppResult, TenantId};
use tessera_domain::{
    AssignmentMappingPair, AssignmentRequestMapping, CustomerTenantContext, FormationAssignment,
    FormationOperation, NotificationRequest, ParticipantType, Webhook, WebhookOwnerType,
    WebhookType,
};
use tracing::{error, info};

use crate::formation_ports::{
    FormationAssignmentRepository, FormationRepository, NotificationBuilder,
    ParticipantDataBuilder, TenantContextResolver, WebhookRepository,
};

mod application_target;
mod runtime_target;

#[cfg(test)]
mod tests;

/// Builds the outbound notification for a formation assignment.
///
/// The service only assembles requests; delivery belongs to the caller.
#[derive(Clone)]
pub struct FormationAssignmentNotificationService {
    assignment_repository: Arc<dyn FormationAssignmentRepository>,
    webhook_repository: Arc<dyn WebhookRepository>,
    participant_data_builder: Arc<dyn ParticipantDataBuilder>,
    formation_repository: Arc<dyn FormationRepository>,
    notification_builder: Arc<dyn NotificationBuilder>,
    tenant_context_resolver: Arc<dyn TenantContextResolver>,
}

/// Supported `(target, source)` combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotificationRoute {
    ApplicationTarget { source_type: ParticipantType },
    RuntimeTarget,
    RuntimeContextTarget,
}

impl NotificationRoute {
    fn resolve(assignment: &FormationAssignment) -> AppResult<Self> {
        match (assignment.target_type, assignment.source_type) {
            (ParticipantType::Application, source_type) => {
                Ok(Self::ApplicationTarget { source_type })
            }
            (ParticipantType::Runtime, ParticipantType::Application) => Ok(Self::RuntimeTarget),
            (ParticipantType::RuntimeContext, ParticipantType::Application) => {
                Ok(Self::RuntimeContextTarget)
            }
            (target_type, source_type) => Err(AppError::UnsupportedParticipantType(format!(
                "formation assignment with ID: '{}' and target type: '{target_type}' has unsupported reverse type: '{source_type}'",
                assignment.id
            ))),
        }
    }
}

/// Values shared by every branch of one generation.
struct GenerationContext<'a> {
    assignment: &'a FormationAssignment,
    operation: FormationOperation,
    customer_tenant_context: CustomerTenantContext,
    formation_template_id: String,
}

impl FormationAssignmentNotificationService {
    /// Creates the service from its collaborators.
    #[must_use]
    pub fn new(
        assignment_repository: Arc<dyn FormationAssignmentRepository>,
        webhook_repository: Arc<dyn WebhookRepository>,
        participant_data_builder: Arc<dyn ParticipantDataBuilder>,
        formation_repository: Arc<dyn FormationRepository>,
        notification_builder: Arc<dyn NotificationBuilder>,
        tenant_context_resolver: Arc<dyn TenantContextResolver>,
    ) -> Self {
        Self {
            assignment_repository,
            webhook_repository,
            participant_data_builder,
            formation_repository,
            notification_builder,
            tenant_context_resolver,
        }
    }

    /// Generates the notification for an assignment, deriving the operation from its state.
    ///
    /// Returns `Ok(None)` when the notified participant has no configuration-changed webhook.
    pub async fn generate_notification(
        &self,
        assignment: &FormationAssignment,
    ) -> AppResult<Option<NotificationRequest>> {
        let operation = FormationOperation::from_assignment_state(assignment.state);
        self.generate_notification_for_operation(assignment, operation)
            .await
    }

    /// Generates the notification for an assignment and an explicit operation.
    pub async fn generate_notification_for_operation(
        &self,
        assignment: &FormationAssignment,
        operation: FormationOperation,
    ) -> AppResult<Option<NotificationRequest>> {
        info!(
            assignment_id = %assignment.id,
            target_type = %assignment.target_type,
            target = %assignment.target,
            "generating notification for formation assignment"
        );

        let route = NotificationRoute::resolve(assignment).inspect_err(|error| {
            error!(assignment_id = %assignment.id, %error, "unsupported formation assignment");
        })?;

        let customer_tenant_context = self
            .tenant_context_resolver
            .customer_tenant_context(assignment.tenant_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while resolving customer tenant context for tenant: '{}'",
                    assignment.tenant_id
                ))
            })?;
        let formation = self
            .formation_repository
            .get(assignment.tenant_id, assignment.formation_id.as_str())
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation with ID: '{}'",
                    assignment.formation_id
                ))
            })?;

        let context = GenerationContext {
            assignment,
            operation,
            customer_tenant_context,
            formation_template_id: formation.formation_template_id,
        };

        match route {
            NotificationRoute::ApplicationTarget { source_type } => {
                self.generate_application_notification(&context, source_type)
                    .await
            }
            NotificationRoute::RuntimeTarget => self.generate_runtime_notification(&context).await,
            NotificationRoute::RuntimeContextTarget => {
                self.generate_runtime_context_notification(&context).await
            }
        }
    }

    /// Generates the requests for an assignment and its reverse.
    pub async fn generate_assignment_pair(
        &self,
        assignment: &FormationAssignment,
        reverse_assignment: &FormationAssignment,
        operation: FormationOperation,
    ) -> AppResult<AssignmentMappingPair> {
        let request = self
            .generate_notification_for_operation(assignment, operation)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while generating notification for formation assignment with ID: '{}'",
                    assignment.id
                ))
            })?;
        let reverse_request = self
            .generate_notification_for_operation(reverse_assignment, operation)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while generating notification for formation assignment with ID: '{}'",
                    reverse_assignment.id
                ))
            })?;

        Ok(AssignmentMappingPair {
            assignment: AssignmentRequestMapping {
                assignment: assignment.clone(),
                request,
            },
            reverse_assignment: AssignmentRequestMapping {
                assignment: reverse_assignment.clone(),
                request: reverse_request,
            },
        })
    }

    async fn configuration_changed_webhook(
        &self,
        tenant_id: TenantId,
        object_id: &str,
        object_type: WebhookOwnerType,
    ) -> AppResult<Option<Webhook>> {
        match self
            .webhook_repository
            .get_by_id_and_webhook_type(
                tenant_id,
                object_id,
                object_type,
                WebhookType::ConfigurationChanged,
            )
            .await
        {
            Ok(webhook) => Ok(Some(webhook)),
            Err(error) if error.is_not_found() => {
                info!(
                    object_id,
                    object_type = object_type.as_str(),
                    "no configuration changed webhook registered, no notification generated"
                );
                Ok(None)
            }
            Err(error) => Err(error.context(format!(
                "while getting configuration changed webhook for {} with ID: '{object_id}'",
                object_type.as_str()
            ))),
        }
    }

    async fn reverse_assignment(
        &self,
        assignment: &FormationAssignment,
    ) -> AppResult<FormationAssignment> {
        self.assignment_repository
            .get_reverse_by_source_and_target(
                assignment.tenant_id,
                assignment.formation_id.as_str(),
                assignment.source.as_str(),
                assignment.target.as_str(),
            )
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting reverse formation assignment for formation assignment with ID: '{}'",
                    assignment.id
                ))
            })
    }
}
