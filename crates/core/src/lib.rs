//! Shared primitives for all Rust crates in Tessera.

#![forbid(unsafe_code)]

/// Caller identity primitives resolved at the HTTP edge.
pub mod auth;
/// Page envelopes and offset cursors.
pub mod pagination;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use auth::{ConsumerIdentity, ConsumerType, TenantPair};
pub use pagination::{Page, PageInfo, decode_offset_cursor, encode_offset_cursor};

/// Result type used across Tessera crates.
pub type AppResult<T> = Result<T, AppError>;

/// Tenant identifier used as the partition key for every persisted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Creates a random tenant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a tenant identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a tenant identifier from its textual UUID form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid tenant id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TenantId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not allowed to access or mutate a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Participant type combination outside the supported matrix.
    #[error("unsupported participant type: {0}")]
    UnsupportedParticipantType(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Prefixes the error message with operation context, keeping the error kind.
    #[must_use]
    pub fn context(self, message: impl Display) -> Self {
        match self {
            Self::Validation(inner) => Self::Validation(format!("{message}: {inner}")),
            Self::NotFound(inner) => Self::NotFound(format!("{message}: {inner}")),
            Self::Conflict(inner) => Self::Conflict(format!("{message}: {inner}")),
            Self::Unauthorized(inner) => Self::Unauthorized(format!("{message}: {inner}")),
            Self::UnsupportedParticipantType(inner) => {
                Self::UnsupportedParticipantType(format!("{message}: {inner}"))
            }
            Self::Internal(inner) => Self::Internal(format!("{message}: {inner}")),
        }
    }

    /// Returns true for the not-found kind.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true for the unauthorized kind.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
