use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_core::{AppError, AppResult};

use crate::assignment::FormationAssignment;

/// Kind of object a webhook is registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookOwnerType {
    /// Webhook registered on an application.
    Application,
    /// Webhook registered on a runtime.
    Runtime,
}

impl WebhookOwnerType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "APPLICATION",
            Self::Runtime => "RUNTIME",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "APPLICATION" => Ok(Self::Application),
            "RUNTIME" => Ok(Self::Runtime),
            other => Err(AppError::Validation(format!(
                "unknown webhook owner type '{other}'"
            ))),
        }
    }
}

/// Event a webhook subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookType {
    /// Formation configuration of a participant changed.
    ConfigurationChanged,
    /// Application-to-application tenant mapping changed.
    ApplicationTenantMapping,
    /// Application is being unregistered.
    UnregisterApplication,
}

impl WebhookType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigurationChanged => "CONFIGURATION_CHANGED",
            Self::ApplicationTenantMapping => "APPLICATION_TENANT_MAPPING",
            Self::UnregisterApplication => "UNREGISTER_APPLICATION",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "CONFIGURATION_CHANGED" => Ok(Self::ConfigurationChanged),
            "APPLICATION_TENANT_MAPPING" => Ok(Self::ApplicationTenantMapping),
            "UNREGISTER_APPLICATION" => Ok(Self::UnregisterApplication),
            other => Err(AppError::Validation(format!(
                "unknown webhook type '{other}'"
            ))),
        }
    }
}

/// How the notified side answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookMode {
    /// Answer is carried by the webhook response.
    Sync,
    /// Answer arrives later through the status endpoint.
    AsyncCallback,
}

impl WebhookMode {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "SYNC",
            Self::AsyncCallback => "ASYNC_CALLBACK",
        }
    }

    /// Parses storage value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "SYNC" => Ok(Self::Sync),
            "ASYNC_CALLBACK" => Ok(Self::AsyncCallback),
            other => Err(AppError::Validation(format!(
                "unknown webhook mode '{other}'"
            ))),
        }
    }
}

/// Webhook registered on a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    /// Webhook id.
    pub id: String,
    /// Owning application or runtime id.
    pub object_id: String,
    /// Owning object kind.
    pub object_type: WebhookOwnerType,
    /// Subscribed event.
    pub webhook_type: WebhookType,
    /// Target URL.
    pub url: Option<String>,
    /// Response mode.
    pub mode: WebhookMode,
}

/// Transport-level request prepared for one webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Webhook the request targets.
    pub webhook: Webhook,
    /// Formation template the request was rendered for.
    pub formation_template_id: String,
    /// Correlation id carried to the notified side.
    pub correlation_id: String,
    /// Resolved target URL.
    pub url: String,
    /// Rendered JSON body.
    pub body: Value,
}

/// Assignment together with the request prepared for it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRequestMapping {
    /// Assignment the request belongs to.
    pub assignment: FormationAssignment,
    /// Prepared request, `None` when the target has no webhook.
    pub request: Option<NotificationRequest>,
}

/// Assignment and its reverse, each with its prepared request.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentMappingPair {
    /// Forward side.
    pub assignment: AssignmentRequestMapping,
    /// Reverse side.
    pub reverse_assignment: AssignmentRequestMapping,
}

impl AssignmentMappingPair {
    /// Returns whether neither side produced a request.
    #[must_use]
    pub fn has_no_requests(&self) -> bool {
        self.assignment.request.is_none() && self.reverse_assignment.request.is_none()
    }
}
