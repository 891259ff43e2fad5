use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tessera_core::{AppError, ConsumerIdentity};
use tessera_domain::{
    AssignmentErrorCode, AssignmentState, FormationAssignment, FormationOperation, FormationState,
    NotificationStatusReport, ReportedState,
};
use tracing::{error, info, warn};

use crate::dto::{EmptyResponse, FormationAssignmentStatusRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

mod request;
mod reverse_notification;


use request::StatusUpdate;
use reverse_notification::spawn_reverse_notification;

/// Applies a status report sent by the notified side of an assignment.
pub async fn update_formation_assignment_status_handler(
    State(state): State<AppState>,
    Extension(consumer): Extension<ConsumerIdentity>,
    Path((formation_id, assignment_id)): Path<(String, String)>,
    body: Result<Json<FormationAssignmentStatusRequest>, JsonRejection>,
) -> Response {
    handle_status_request(state, consumer, formation_id, assignment_id, body, false).await
}

/// Re-applies a configuration to a ready assignment and restarts its reverse side.
pub async fn reset_formation_assignment_status_handler(
    State(state): State<AppState>,
    Extension(consumer): Extension<ConsumerIdentity>,
    Path((formation_id, assignment_id)): Path<(String, String)>,
    body: Result<Json<FormationAssignmentStatusRequest>, JsonRejection>,
) -> Response {
    handle_status_request(state, consumer, formation_id, assignment_id, body, true).await
}

async fn handle_status_request(
    state: AppState,
    consumer: ConsumerIdentity,
    formation_id: String,
    assignment_id: String,
    body: Result<Json<FormationAssignmentStatusRequest>, JsonRejection>,
    reset: bool,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return rejection.into_response();
        }
        Err(rejection) => {
            warn!(%formation_id, %assignment_id, error = %rejection.body_text(), "failed to decode request body");
            return ApiError(AppError::Validation(rejection.body_text())).into_response();
        }
    };

    let flow = StatusFlow {
        state: &state,
        consumer: &consumer,
        formation_id: formation_id.as_str(),
        assignment_id: assignment_id.as_str(),
    };

    match flow.run(request, reset).await {
        Ok(()) => {
            info!(
                %formation_id,
                %assignment_id,
                reset,
                "formation assignment status was successfully processed"
            );
            Json(EmptyResponse {}).into_response()
        }
        Err(error) => error.into_response(),
    }
}

/// One status request against one assignment.
struct StatusFlow<'a> {
    state: &'a AppState,
    consumer: &'a ConsumerIdentity,
    formation_id: &'a str,
    assignment_id: &'a str,
}

impl StatusFlow<'_> {
    async fn run(&self, request: FormationAssignmentStatusRequest, reset: bool) -> ApiResult<()> {
        let update = StatusUpdate::validate(request, self.consumer.consumer_type())?;

        let assignment = self
            .state
            .formation_assignment_service
            .get_global_by_id_and_formation_id(self.assignment_id, self.formation_id)
            .await?;

        let formation = self
            .state
            .formation_repository
            .get(assignment.tenant_id, self.formation_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation with ID: '{}'",
                    self.formation_id
                ))
            })?;

        if update.state.is_some() && formation.state != FormationState::Ready {
            return Err(AppError::Validation(format!(
                "cannot update formation assignment for formation with ID: '{}' as formation is not in {} state",
                formation.id,
                FormationState::Ready.as_str()
            ))
            .into());
        }

        let operation = FormationOperation::from_assignment_state(assignment.state);
        let Some(reported_state) = update
            .reported_state(assignment.state, operation)
            .filter(|state| is_state_supported(*state, operation, self.consumer, reset))
        else {
            return Err(AppError::Validation(format!(
                "an invalid state: {} is provided for {operation} operation",
                update
                    .state
                    .map_or(assignment.state.as_str(), ReportedState::as_str)
            ))
            .into());
        };

        let report = update.into_report(reported_state);
        info!(
            assignment_id = %assignment.id,
            formation_id = %assignment.formation_id,
            current_state = %assignment.state,
            reported_state = %report.state,
            %operation,
            "processing formation assignment status report"
        );

        let assignment = if reset {
            self.reset_assignment_pair(assignment, report.state, report.configuration.clone())
                .await?
        } else {
            assignment
        };

        match operation {
            FormationOperation::Unassign => self.process_unassign(assignment, report).await,
            FormationOperation::Assign => {
                let notify_reverse = report.configuration.is_some()
                    && !matches!(
                        report.state,
                        AssignmentState::CreateError | AssignmentState::Initial
                    );

                let tenant_id = assignment.tenant_id;
                let updated = self
                    .state
                    .status_service
                    .update_with_constraints(tenant_id, assignment, operation, Some(report))
                    .await
                    .map_err(|error| {
                        error!(
                            assignment_id = self.assignment_id,
                            %error,
                            "failed to update formation assignment with constraints"
                        );
                        internal(error)
                    })?;

                if notify_reverse {
                    spawn_reverse_notification(self.state.clone(), updated);
                } else {
                    info!(
                        assignment_id = %updated.id,
                        "reverse formation assignment notification is not generated"
                    );
                }

                Ok(())
            }
        }
    }

    async fn process_unassign(
        &self,
        assignment: FormationAssignment,
        report: NotificationStatusReport,
    ) -> ApiResult<()> {
        let tenant_id = assignment.tenant_id;

        if report.state == AssignmentState::DeleteError {
            self.state
                .status_service
                .update_with_constraints(
                    tenant_id,
                    assignment,
                    FormationOperation::Unassign,
                    Some(report),
                )
                .await
                .map_err(internal)?;
            return Ok(());
        }

        match self
            .state
            .status_service
            .delete_with_constraints(tenant_id, assignment.id.as_str(), Some(report))
            .await
        {
            Ok(()) => Ok(()),
            Err(error) if error.is_not_found() => {
                info!(assignment_id = %assignment.id, "formation assignment has already been deleted");
                Ok(())
            }
            Err(error) => {
                warn!(assignment_id = %assignment.id, %error, "failed to delete formation assignment with constraints");
                let assignment_id = assignment.id.clone();
                if let Err(update_error) = self
                    .state
                    .formation_assignment_service
                    .set_assignment_to_error_state(
                        tenant_id,
                        assignment,
                        error.to_string().as_str(),
                        AssignmentErrorCode::TechnicalError,
                        AssignmentState::DeleteError,
                    )
                    .await
                {
                    error!(
                        %assignment_id,
                        error = %update_error,
                        "failed to move formation assignment to error state"
                    );
                }

                Err(internal(error))
            }
        }
    }

    async fn reset_assignment_pair(
        &self,
        mut assignment: FormationAssignment,
        state: AssignmentState,
        configuration: Option<String>,
    ) -> ApiResult<FormationAssignment> {
        if configuration.is_none() {
            return Err(AppError::Validation(format!(
                "cannot reset formation assignment with source '{}' and target '{}' because provided configuration is empty",
                assignment.source, assignment.target
            ))
            .into());
        }

        if assignment.state != AssignmentState::Ready {
            return Err(AppError::Validation(format!(
                "cannot reset formation assignment with source '{}' and target '{}' because assignment is not in {} state",
                assignment.source,
                assignment.target,
                AssignmentState::Ready
            ))
            .into());
        }

        let tenant_id = assignment.tenant_id;
        let mut reverse = self
            .state
            .formation_assignment_service
            .get_reverse_by_source_and_target(
                tenant_id,
                assignment.formation_id.as_str(),
                assignment.source.as_str(),
                assignment.target.as_str(),
            )
            .await
            .map_err(|error| match error {
                AppError::NotFound(_) => AppError::Validation(format!(
                    "cannot reset formation assignment with source '{}' and target '{}' because reverse assignment is missing",
                    assignment.source, assignment.target
                )),
                other => other,
            })?;

        if reverse.state != AssignmentState::Ready {
            return Err(AppError::Validation(format!(
                "cannot reset formation assignment with source '{}' and target '{}' because reverse assignment is not in {} state",
                reverse.source,
                reverse.target,
                AssignmentState::Ready
            ))
            .into());
        }

        info!(assignment_id = %assignment.id, %state, "resetting formation assignment");
        assignment.state = state;
        assignment.value = configuration;
        self.state
            .formation_assignment_service
            .update(tenant_id, &assignment)
            .await?;

        info!(assignment_id = %reverse.id, state = %AssignmentState::Initial, "resetting reverse formation assignment");
        reverse.state = AssignmentState::Initial;
        self.state
            .formation_assignment_service
            .update(tenant_id, &reverse)
            .await?;

        Ok(assignment)
    }
}

fn is_state_supported(
    state: ReportedState,
    operation: FormationOperation,
    consumer: &ConsumerIdentity,
    reset: bool,
) -> bool {
    if reset {
        return matches!(state, ReportedState::Ready | ReportedState::ConfigPending)
            && state.is_supported_for(operation, consumer.consumer_type());
    }

    state.is_supported_for(operation, consumer.consumer_type())
}

fn internal(error: AppError) -> ApiError {
    match error {
        AppError::Internal(_) => ApiError(error),
        other => ApiError(AppError::Internal(other.to_string())),
    }
}
