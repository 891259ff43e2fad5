use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core::{AppError, AppResult};

/// Label set attached to a participant, keyed by label key.
pub type Labels = BTreeMap<String, Value>;

/// Kind of formation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    /// Application participant.
    Application,
    /// Runtime participant.
    Runtime,
    /// Runtime context participant, owned by a runtime.
    RuntimeContext,
}

impl ParticipantType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "APPLICATION",
            Self::Runtime => "RUNTIME",
            Self::RuntimeContext => "RUNTIME_CONTEXT",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "APPLICATION" => Ok(Self::Application),
            "RUNTIME" => Ok(Self::Runtime),
            "RUNTIME_CONTEXT" => Ok(Self::RuntimeContext),
            other => Err(AppError::UnsupportedParticipantType(format!(
                "unknown participant type '{other}'"
            ))),
        }
    }
}

impl Display for ParticipantType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Registered application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Application id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Template the application was provisioned from, for subscription-provisioned apps.
    pub application_template_id: Option<String>,
    /// Integration system that registered and manages the application.
    pub integration_system_id: Option<String>,
}

/// Provider template shared across tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTemplate {
    /// Template id.
    pub id: String,
    /// Template name.
    pub name: String,
}

/// Registered runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runtime {
    /// Runtime id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Tenant-specific context inside a runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeContext {
    /// Runtime context id.
    pub id: String,
    /// Owning runtime id.
    pub runtime_id: String,
    /// Context key.
    pub key: String,
    /// Context value.
    pub value: String,
}

/// Application snapshot with its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithLabels {
    /// Application record.
    pub application: Application,
    /// Application labels.
    pub labels: Labels,
}

/// Application template snapshot with its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTemplateWithLabels {
    /// Template record.
    pub application_template: ApplicationTemplate,
    /// Template labels.
    pub labels: Labels,
}

/// Runtime snapshot with its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeWithLabels {
    /// Runtime record.
    pub runtime: Runtime,
    /// Runtime labels.
    pub labels: Labels,
}

/// Runtime context snapshot with its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeContextWithLabels {
    /// Runtime context record.
    pub runtime_context: RuntimeContext,
    /// Runtime context labels.
    pub labels: Labels,
}
