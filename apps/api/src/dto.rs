use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the asynchronous formation assignment status endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormationAssignmentStatusRequest {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub configuration: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Empty JSON object returned on successful status updates.
#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

#[derive(Debug, Serialize)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: HealthDependencyStatus,
}
