use tessera_core::{AppError, AppResult, ConsumerType};
use tessera_domain::{
    AssignmentState, FormationOperation, NotificationStatusReport, ReportedState, is_config_empty,
};

use crate::dto::FormationAssignmentStatusRequest;

/// Status request after decoding, empty-value folding, and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct StatusUpdate {
    pub(super) state: Option<ReportedState>,
    pub(super) configuration: Option<String>,
    pub(super) error: Option<String>,
}

impl StatusUpdate {
    pub(super) fn validate(
        request: FormationAssignmentStatusRequest,
        consumer_type: ConsumerType,
    ) -> AppResult<Self> {
        let configuration = request
            .configuration
            .filter(|configuration| !configuration.is_null())
            .map(|configuration| serde_json::to_string(&configuration))
            .transpose()
            .map_err(|error| {
                AppError::Validation(format!("invalid configuration in request body: {error}"))
            })?
            .filter(|configuration| !is_config_empty(configuration));
        let error = request.error.filter(|error| !error.is_empty());
        let state = request
            .state
            .filter(|state| !state.is_empty())
            .map(|state| ReportedState::parse(state.as_str()))
            .transpose()
            .map_err(invalid_input)?;

        match state {
            None if consumer_type != ConsumerType::BusinessIntegration
                && consumer_type != ConsumerType::User =>
            {
                return Err(invalid_input("state: cannot be blank"));
            }
            Some(ReportedState::Initial) => {
                return Err(invalid_input("state: must be a valid value"));
            }
            _ => {}
        }

        if let Some(state) = state {
            if error.is_some() && !state.accepts_error() {
                return Err(invalid_input(format!(
                    "state: '{state}' cannot be reported together with an error"
                )));
            }
            if configuration.is_some() && !state.accepts_configuration() {
                return Err(invalid_input(format!(
                    "state: '{state}' cannot be reported together with a configuration"
                )));
            }
        }

        if configuration.is_some() && error.is_some() {
            return Err(invalid_input(
                "configuration and error cannot be provided together",
            ));
        }

        Ok(Self {
            state,
            configuration,
            error,
        })
    }

    /// Picks the state the report carries for an assignment in `current` state.
    ///
    /// `None` means the assignment is `DELETING` and nothing was reported.
    pub(super) fn reported_state(
        &self,
        current: AssignmentState,
        operation: FormationOperation,
    ) -> Option<ReportedState> {
        if let Some(state) = self.state {
            return Some(state);
        }

        if self.error.is_none() {
            return ReportedState::from_assignment_state(current);
        }

        Some(match operation {
            FormationOperation::Assign => ReportedState::CreateError,
            FormationOperation::Unassign => ReportedState::DeleteError,
        })
    }

    pub(super) fn into_report(self, state: ReportedState) -> NotificationStatusReport {
        NotificationStatusReport {
            state: state.normalized(),
            configuration: self.configuration,
            error: self.error,
        }
    }
}

fn invalid_input(message: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("request body contains invalid input: {message}"))
}
