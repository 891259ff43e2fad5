use std::sync::Arc;

use tessera_core::{AppError, AppResult, TenantId};
use tessera_domain::{
    AssignmentErrorCode, AssignmentState, FormationAssignment, FormationOperation,
    JoinPointLocation, NotificationStatusReport, NotificationStatusReturnedDetails,
};
use tracing::{info, warn};

use crate::formation_ports::{
    ConstraintEngine, FormationAssignmentRepository, FormationRepository,
    FormationTemplateRepository, LabelRepository, RuntimeContextRepository,
};

mod details;


/// Label keys read to fill the resource subtype of constraint details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtypeLabelKeys {
    /// Application label carrying the application type.
    pub application_type_label_key: String,
    /// Runtime label carrying the runtime type.
    pub runtime_type_label_key: String,
}

impl Default for SubtypeLabelKeys {
    fn default() -> Self {
        Self {
            application_type_label_key: "applicationType".to_owned(),
            runtime_type_label_key: "runtimeType".to_owned(),
        }
    }
}

/// Applies assignment mutations between pre and post constraint enforcement.
#[derive(Clone)]
pub struct FormationAssignmentStatusService {
    assignment_repository: Arc<dyn FormationAssignmentRepository>,
    constraint_engine: Arc<dyn ConstraintEngine>,
    formation_repository: Arc<dyn FormationRepository>,
    formation_template_repository: Arc<dyn FormationTemplateRepository>,
    label_repository: Arc<dyn LabelRepository>,
    runtime_context_repository: Arc<dyn RuntimeContextRepository>,
    subtype_label_keys: SubtypeLabelKeys,
}

impl FormationAssignmentStatusService {
    /// Creates the service from its collaborators.
    #[must_use]
    pub fn new(
        assignment_repository: Arc<dyn FormationAssignmentRepository>,
        constraint_engine: Arc<dyn ConstraintEngine>,
        formation_repository: Arc<dyn FormationRepository>,
        formation_template_repository: Arc<dyn FormationTemplateRepository>,
        label_repository: Arc<dyn LabelRepository>,
        runtime_context_repository: Arc<dyn RuntimeContextRepository>,
    ) -> Self {
        Self {
            assignment_repository,
            constraint_engine,
            formation_repository,
            formation_template_repository,
            label_repository,
            runtime_context_repository,
            subtype_label_keys: SubtypeLabelKeys::default(),
        }
    }

    /// Overrides the label keys used for resource subtypes.
    #[must_use]
    pub fn with_subtype_label_keys(mut self, subtype_label_keys: SubtypeLabelKeys) -> Self {
        self.subtype_label_keys = subtype_label_keys;
        self
    }

    /// Persists an assignment, enforcing constraints before and after the write.
    ///
    /// Constraint details carry the assignment as passed in. The report is applied
    /// only once the pre-phase passes; without one the report mirrors the assignment.
    pub async fn update_with_constraints(
        &self,
        tenant_id: TenantId,
        mut assignment: FormationAssignment,
        operation: FormationOperation,
        report: Option<NotificationStatusReport>,
    ) -> AppResult<FormationAssignment> {
        let current = self
            .assignment_repository
            .get(tenant_id, assignment.id.as_str())
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation assignment with id: '{}'",
                    assignment.id
                ))
            })?;

        let (report, reported) = match report {
            Some(report) => (report, true),
            None => (NotificationStatusReport::from_assignment(&assignment), false),
        };

        info!(
            assignment_id = %assignment.id,
            previous_state = %current.state,
            reported_state = %report.state,
            %operation,
            "updating formation assignment with constraints"
        );

        let details = self
            .prepare_details_for_notification_status_returned(
                tenant_id,
                &assignment,
                operation,
                report.clone(),
            )
            .await
            .map_err(|error| error.context("while preparing details for NotificationStatusReturned"))?;

        self.enforce(JoinPointLocation::PRE_NOTIFICATION_STATUS_RETURNED, &details)
            .await?;

        if reported {
            assignment.apply_status_report(&report)?;
        }
        self.assignment_repository
            .update(&assignment)
            .await
            .map_err(|error| update_error(error, assignment.id.as_str()))?;

        self.enforce(JoinPointLocation::POST_NOTIFICATION_STATUS_RETURNED, &details)
            .await?;

        Ok(assignment)
    }

    /// Moves an assignment to an error state and persists it with constraints.
    pub async fn set_assignment_to_error_state_with_constraints(
        &self,
        tenant_id: TenantId,
        mut assignment: FormationAssignment,
        message: &str,
        error_code: AssignmentErrorCode,
        state: AssignmentState,
        operation: FormationOperation,
    ) -> AppResult<FormationAssignment> {
        assignment.set_error(message, error_code, state)?;
        self.update_with_constraints(tenant_id, assignment, operation, None)
            .await
    }

    /// Deletes an assignment, enforcing constraints around the delete.
    ///
    /// The row is first stored as `READY` with a cleared value so readers observe
    /// completion before it disappears.
    pub async fn delete_with_constraints(
        &self,
        tenant_id: TenantId,
        id: &str,
        report: Option<NotificationStatusReport>,
    ) -> AppResult<()> {
        let assignment = self
            .assignment_repository
            .get(tenant_id, id)
            .await
            .map_err(|error| {
                error.context(format!("while getting formation assignment with id: '{id}'"))
            })?;

        let mut ready = assignment.clone();
        ready.state = AssignmentState::Ready;
        ready.value = None;
        ready.error = None;
        self.assignment_repository
            .update(&ready)
            .await
            .map_err(|error| update_error(error, id))?;

        let report = report.unwrap_or_else(|| NotificationStatusReport::from_assignment(&assignment));
        let details = self
            .prepare_details_for_notification_status_returned(
                tenant_id,
                &assignment,
                FormationOperation::Unassign,
                report,
            )
            .await
            .map_err(|error| error.context("while preparing details for NotificationStatusReturned"))?;

        self.enforce(JoinPointLocation::PRE_NOTIFICATION_STATUS_RETURNED, &details)
            .await?;

        self.assignment_repository
            .delete(tenant_id, id)
            .await
            .map_err(|error| match error {
                AppError::Unauthorized(_) => {
                    AppError::NotFound("formation assignment not found".to_owned())
                }
                other => other.context(format!("while deleting formation assignment with id: '{id}'")),
            })?;

        info!(assignment_id = %id, previous_state = %assignment.state, "deleted formation assignment");

        self.enforce(JoinPointLocation::POST_NOTIFICATION_STATUS_RETURNED, &details)
            .await
    }

    async fn enforce(
        &self,
        location: JoinPointLocation,
        details: &NotificationStatusReturnedDetails,
    ) -> AppResult<()> {
        let details = details.at(location);
        self.constraint_engine
            .enforce_constraints(location, &details, details.formation.formation_template_id.as_str())
            .await
            .map_err(|error| {
                warn!(
                    assignment_id = %details.assignment.id,
                    %location,
                    %error,
                    "constraint enforcement failed"
                );
                error.context(format!("while enforcing constraints for {location}"))
            })
    }
}

fn update_error(error: AppError, id: &str) -> AppError {
    match error {
        AppError::Unauthorized(_) => AppError::NotFound("formation assignment not found".to_owned()),
        other => other.context(format!("while updating formation assignment with ID: '{id}'")),
    }
}
