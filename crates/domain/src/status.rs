use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, ConsumerType};

use crate::assignment::{AssignmentErrorWrapper, AssignmentState, FormationAssignment};
use crate::formation::FormationOperation;

/// Outcome reported by the notified side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStatusReport {
    /// Reported state.
    pub state: AssignmentState,
    /// Raw JSON configuration, if any.
    pub configuration: Option<String>,
    /// Error message, if any.
    pub error: Option<String>,
}

impl NotificationStatusReport {
    /// Builds a report mirroring the assignment's current state, value and error.
    #[must_use]
    pub fn from_assignment(assignment: &FormationAssignment) -> Self {
        let error = assignment.error.as_deref().map(|raw| {
            AssignmentErrorWrapper::from_json(raw)
                .map(|wrapper| wrapper.error.message)
                .unwrap_or_else(|_| raw.to_owned())
        });

        Self {
            state: assignment.state,
            configuration: assignment.value.clone(),
            error,
        }
    }
}

/// State value accepted on the asynchronous status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportedState {
    /// Initial state, only business integrations may report it.
    Initial,
    /// Ready.
    Ready,
    /// Ready alias used while assigning.
    CreateReady,
    /// Ready alias used while unassigning.
    DeleteReady,
    /// Configuration pending.
    ConfigPending,
    /// Assign failed.
    CreateError,
    /// Unassign failed.
    DeleteError,
}

impl ReportedState {
    /// Returns stable wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Ready => "READY",
            Self::CreateReady => "CREATE_READY",
            Self::DeleteReady => "DELETE_READY",
            Self::ConfigPending => "CONFIG_PENDING",
            Self::CreateError => "CREATE_ERROR",
            Self::DeleteError => "DELETE_ERROR",
        }
    }

    /// Parses a state sent by a caller.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "INITIAL" => Ok(Self::Initial),
            "READY" => Ok(Self::Ready),
            "CREATE_READY" => Ok(Self::CreateReady),
            "DELETE_READY" => Ok(Self::DeleteReady),
            "CONFIG_PENDING" => Ok(Self::ConfigPending),
            "CREATE_ERROR" => Ok(Self::CreateError),
            "DELETE_ERROR" => Ok(Self::DeleteError),
            other => Err(AppError::Validation(format!(
                "state '{other}' is not supported"
            ))),
        }
    }

    /// Maps a persisted state to the reported state it corresponds to.
    #[must_use]
    pub fn from_assignment_state(state: AssignmentState) -> Option<Self> {
        match state {
            AssignmentState::Initial => Some(Self::Initial),
            AssignmentState::Ready => Some(Self::Ready),
            AssignmentState::ConfigPending => Some(Self::ConfigPending),
            AssignmentState::CreateError => Some(Self::CreateError),
            AssignmentState::DeleteError => Some(Self::DeleteError),
            AssignmentState::Deleting => None,
        }
    }

    /// Returns the persisted state, folding the ready aliases into `READY`.
    #[must_use]
    pub fn normalized(self) -> AssignmentState {
        match self {
            Self::Initial => AssignmentState::Initial,
            Self::Ready | Self::CreateReady | Self::DeleteReady => AssignmentState::Ready,
            Self::ConfigPending => AssignmentState::ConfigPending,
            Self::CreateError => AssignmentState::CreateError,
            Self::DeleteError => AssignmentState::DeleteError,
        }
    }

    /// Returns whether the state may carry a configuration.
    #[must_use]
    pub fn accepts_configuration(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::ConfigPending | Self::CreateReady | Self::DeleteReady
        )
    }

    /// Returns whether the state may carry an error.
    #[must_use]
    pub fn accepts_error(self) -> bool {
        matches!(self, Self::CreateError | Self::DeleteError)
    }

    /// Returns whether the state may be reported for the operation by the consumer.
    #[must_use]
    pub fn is_supported_for(self, operation: FormationOperation, consumer: ConsumerType) -> bool {
        match operation {
            FormationOperation::Assign => match self {
                Self::CreateError | Self::Ready | Self::CreateReady | Self::ConfigPending => true,
                Self::Initial => consumer == ConsumerType::BusinessIntegration,
                Self::DeleteReady | Self::DeleteError => false,
            },
            FormationOperation::Unassign => {
                matches!(self, Self::DeleteError | Self::Ready | Self::DeleteReady)
            }
        }
    }
}

impl Display for ReportedState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
