use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, TenantId};

use crate::participant::ParticipantType;
use crate::status::NotificationStatusReport;

/// Lifecycle state of a formation assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentState {
    /// Created, no notification answered yet.
    Initial,
    /// Configuration exchange finished.
    Ready,
    /// Notified side returned configuration and expects more.
    ConfigPending,
    /// Assign notification failed.
    CreateError,
    /// Unassign notification failed.
    DeleteError,
    /// Unassign in progress.
    Deleting,
}

impl AssignmentState {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Ready => "READY",
            Self::ConfigPending => "CONFIG_PENDING",
            Self::CreateError => "CREATE_ERROR",
            Self::DeleteError => "DELETE_ERROR",
            Self::Deleting => "DELETING",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "INITIAL" => Ok(Self::Initial),
            "READY" => Ok(Self::Ready),
            "CONFIG_PENDING" => Ok(Self::ConfigPending),
            "CREATE_ERROR" => Ok(Self::CreateError),
            "DELETE_ERROR" => Ok(Self::DeleteError),
            "DELETING" => Ok(Self::Deleting),
            other => Err(AppError::Validation(format!(
                "unknown formation assignment state '{other}'"
            ))),
        }
    }

    /// Returns whether the state is one of the two error states.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::CreateError | Self::DeleteError)
    }
}

impl Display for AssignmentState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returns true when a raw configuration carries no information.
#[must_use]
pub fn is_config_empty(raw: &str) -> bool {
    matches!(raw.trim(), "" | "\"\"" | "{}" | "null")
}

/// Classification of an error stored on an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AssignmentErrorCode {
    /// Failure inside this system or its collaborators.
    TechnicalError,
    /// Failure reported by the notified side.
    ClientError,
}

impl From<AssignmentErrorCode> for u8 {
    fn from(value: AssignmentErrorCode) -> Self {
        match value {
            AssignmentErrorCode::TechnicalError => 1,
            AssignmentErrorCode::ClientError => 2,
        }
    }
}

impl TryFrom<u8> for AssignmentErrorCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::TechnicalError),
            2 => Ok(Self::ClientError),
            other => Err(format!("unknown assignment error code {other}")),
        }
    }
}

/// Message and code of an assignment error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentError {
    /// Human readable message.
    pub message: String,
    /// Error classification.
    #[serde(rename = "errorCode")]
    pub error_code: AssignmentErrorCode,
}

/// JSON envelope persisted in the assignment `error` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentErrorWrapper {
    /// Wrapped error.
    pub error: AssignmentError,
}

impl AssignmentErrorWrapper {
    /// Creates an error wrapper.
    #[must_use]
    pub fn new(message: impl Into<String>, error_code: AssignmentErrorCode) -> Self {
        Self {
            error: AssignmentError {
                message: message.into(),
                error_code,
            },
        }
    }

    /// Serializes the wrapper into raw JSON.
    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string(self).map_err(|error| {
            AppError::Internal(format!(
                "failed to serialize formation assignment error: {error}"
            ))
        })
    }

    /// Parses a wrapper from raw JSON.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw).map_err(|error| {
            AppError::Validation(format!("invalid formation assignment error payload: {error}"))
        })
    }
}

/// One directed source-to-target pairing inside a formation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationAssignment {
    /// Assignment id.
    pub id: String,
    /// Owning formation id.
    pub formation_id: String,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Source participant id.
    pub source: String,
    /// Source participant kind.
    pub source_type: ParticipantType,
    /// Target participant id.
    pub target: String,
    /// Target participant kind.
    pub target_type: ParticipantType,
    /// Current lifecycle state.
    pub state: AssignmentState,
    /// Raw JSON configuration returned by the notified side.
    pub value: Option<String>,
    /// Raw JSON error wrapper, set in error states.
    pub error: Option<String>,
    /// Time of the last state change.
    pub last_state_change_timestamp: Option<DateTime<Utc>>,
    /// Time the last notification was sent.
    pub last_notification_sent_timestamp: Option<DateTime<Utc>>,
}

impl FormationAssignment {
    /// Returns whether the assignment points at its own source.
    #[must_use]
    pub fn is_self_assignment(&self) -> bool {
        self.source == self.target
    }

    /// Returns the `(source, target)` pair of the reverse assignment.
    #[must_use]
    pub fn reverse_key(&self) -> (&str, &str) {
        (self.target.as_str(), self.source.as_str())
    }

    /// Moves the assignment into an error state with a wrapped error.
    pub fn set_error(
        &mut self,
        message: impl Into<String>,
        error_code: AssignmentErrorCode,
        state: AssignmentState,
    ) -> AppResult<()> {
        if !state.is_error() {
            return Err(AppError::Validation(format!(
                "state '{state}' is not an error state"
            )));
        }

        self.error = Some(AssignmentErrorWrapper::new(message, error_code).to_json()?);
        self.state = state;
        Ok(())
    }

    /// Applies a status report returned by the notified side.
    pub fn apply_status_report(&mut self, report: &NotificationStatusReport) -> AppResult<()> {
        self.state = report.state;

        if let Some(message) = report.error.as_deref() {
            self.error = Some(
                AssignmentErrorWrapper::new(message, AssignmentErrorCode::ClientError)
                    .to_json()?,
            );
            return Ok(());
        }

        self.error = None;
        self.value = report
            .configuration
            .as_deref()
            .filter(|configuration| !is_config_empty(configuration))
            .map(str::to_owned);
        Ok(())
    }

    /// Returns the wire-neutral snapshot embedded in notifications.
    #[must_use]
    pub fn snapshot(&self) -> FormationAssignmentSnapshot {
        FormationAssignmentSnapshot::from(self)
    }
}

/// Wire-neutral assignment view embedded in outbound notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationAssignmentSnapshot {
    /// Assignment id.
    pub id: String,
    /// Owning formation id.
    pub formation_id: String,
    /// Owning tenant id.
    pub tenant_id: String,
    /// Source participant id.
    pub source: String,
    /// Source participant kind.
    pub source_type: ParticipantType,
    /// Target participant id.
    pub target: String,
    /// Target participant kind.
    pub target_type: ParticipantType,
    /// Lifecycle state.
    pub state: AssignmentState,
    /// Raw configuration, `""` encoded as a JSON string literal when absent.
    pub value: String,
}

impl From<&FormationAssignment> for FormationAssignmentSnapshot {
    fn from(assignment: &FormationAssignment) -> Self {
        let value = match assignment.value.as_deref() {
            None | Some("") => "\"\"".to_owned(),
            Some(value) => value.to_owned(),
        };

        Self {
            id: assignment.id.clone(),
            formation_id: assignment.formation_id.clone(),
            tenant_id: assignment.tenant_id.to_string(),
            source: assignment.source.clone(),
            source_type: assignment.source_type,
            target: assignment.target.clone(),
            target_type: assignment.target_type,
            state: assignment.state,
            value,
        }
    }
}
