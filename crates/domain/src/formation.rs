use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, TenantId};

use crate::assignment::AssignmentState;

/// Lifecycle state of a formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormationState {
    /// Created, template notifications pending.
    Initial,
    /// Being edited, notifications are not sent.
    Draft,
    /// Accepting participants.
    Ready,
    /// Formation creation failed.
    CreateError,
    /// Formation deletion failed.
    DeleteError,
    /// Formation deletion in progress.
    Deleting,
}

impl FormationState {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Draft => "DRAFT",
            Self::Ready => "READY",
            Self::CreateError => "CREATE_ERROR",
            Self::DeleteError => "DELETE_ERROR",
            Self::Deleting => "DELETING",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "INITIAL" => Ok(Self::Initial),
            "DRAFT" => Ok(Self::Draft),
            "READY" => Ok(Self::Ready),
            "CREATE_ERROR" => Ok(Self::CreateError),
            "DELETE_ERROR" => Ok(Self::DeleteError),
            "DELETING" => Ok(Self::Deleting),
            other => Err(AppError::Validation(format!(
                "unknown formation state '{other}'"
            ))),
        }
    }
}

/// Named grouping of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formation {
    /// Formation id.
    pub id: String,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Formation name.
    pub name: String,
    /// Template the formation was created from.
    pub formation_template_id: String,
    /// Lifecycle state.
    pub state: FormationState,
}

/// Template that drives webhook behavior for its formations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationTemplate {
    /// Template id.
    pub id: String,
    /// Template name.
    pub name: String,
}

/// Direction of a formation membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationOperation {
    /// Participant joins a formation.
    Assign,
    /// Participant leaves a formation.
    Unassign,
}

impl FormationOperation {
    /// Returns stable operation value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Unassign => "unassign",
        }
    }

    /// Derives the in-flight operation from a persisted assignment state.
    #[must_use]
    pub fn from_assignment_state(state: AssignmentState) -> Self {
        match state {
            AssignmentState::Deleting | AssignmentState::DeleteError => Self::Unassign,
            AssignmentState::Initial
            | AssignmentState::Ready
            | AssignmentState::ConfigPending
            | AssignmentState::CreateError => Self::Assign,
        }
    }
}

impl Display for FormationOperation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
