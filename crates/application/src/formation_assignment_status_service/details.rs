use tessera_domain::ParticipantType;

use crate::formation_ports::LabelableObject;

use super::*;

impl FormationAssignmentStatusService {
    pub(super) async fn prepare_details_for_notification_status_returned(
        &self,
        tenant_id: TenantId,
        assignment: &FormationAssignment,
        operation: FormationOperation,
        status_report: NotificationStatusReport,
    ) -> AppResult<NotificationStatusReturnedDetails> {
        let formation = self
            .formation_repository
            .get(tenant_id, assignment.formation_id.as_str())
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation with ID: '{}'",
                    assignment.formation_id
                ))
            })?;
        let formation_template = self
            .formation_template_repository
            .get(formation.formation_template_id.as_str())
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation template with ID: '{}'",
                    formation.formation_template_id
                ))
            })?;

        let reverse_assignment = match self
            .assignment_repository
            .get_reverse_by_source_and_target(
                tenant_id,
                assignment.formation_id.as_str(),
                assignment.source.as_str(),
                assignment.target.as_str(),
            )
            .await
        {
            Ok(reverse_assignment) => Some(reverse_assignment),
            Err(error) if error.is_not_found() => {
                info!(
                    assignment_id = %assignment.id,
                    "reverse formation assignment not found"
                );
                None
            }
            Err(error) => {
                return Err(error.context(format!(
                    "while getting reverse formation assignment for formation assignment with ID: '{}'",
                    assignment.id
                )));
            }
        };

        let resource_subtype = self.resource_subtype(tenant_id, assignment).await?;

        Ok(NotificationStatusReturnedDetails {
            resource_type: assignment.target_type,
            resource_subtype,
            location: JoinPointLocation::PRE_NOTIFICATION_STATUS_RETURNED,
            tenant_id,
            operation,
            assignment: assignment.clone(),
            reverse_assignment,
            status_report,
            formation,
            formation_template,
        })
    }

    async fn resource_subtype(
        &self,
        tenant_id: TenantId,
        assignment: &FormationAssignment,
    ) -> AppResult<String> {
        let (object_type, object_id, label_key) = match assignment.target_type {
            ParticipantType::Application => (
                LabelableObject::Application,
                assignment.target.clone(),
                self.subtype_label_keys.application_type_label_key.as_str(),
            ),
            ParticipantType::Runtime => (
                LabelableObject::Runtime,
                assignment.target.clone(),
                self.subtype_label_keys.runtime_type_label_key.as_str(),
            ),
            ParticipantType::RuntimeContext => {
                let runtime_context = self
                    .runtime_context_repository
                    .get_by_id(tenant_id, assignment.target.as_str())
                    .await
                    .map_err(|error| {
                        error.context(format!(
                            "while getting runtime context with ID: '{}'",
                            assignment.target
                        ))
                    })?;
                (
                    LabelableObject::Runtime,
                    runtime_context.runtime_id,
                    self.subtype_label_keys.runtime_type_label_key.as_str(),
                )
            }
        };

        let labels = self
            .label_repository
            .list_for_object(tenant_id, object_type, object_id.as_str())
            .await
            .map_err(|error| {
                error.context(format!(
                    "while listing labels for {} with ID: '{object_id}'",
                    object_type.as_str()
                ))
            })?;

        Ok(labels
            .get(label_key)
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .to_owned())
    }
}
