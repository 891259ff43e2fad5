use serde::{Deserialize, Serialize};

use crate::assignment::FormationAssignmentSnapshot;
use crate::formation::FormationOperation;
use crate::participant::{
    ApplicationTemplateWithLabels, ApplicationWithLabels, ParticipantType,
    RuntimeContextWithLabels, RuntimeWithLabels,
};

/// Customer metadata of the tenant owning an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTenantContext {
    /// Customer id at the top of the tenant hierarchy.
    pub customer_id: String,
    /// Account id, for account-scoped tenants.
    pub account_id: Option<String>,
    /// Resource-group path, for hierarchy-scoped tenants.
    pub path: Option<String>,
}

/// Payload for an application or runtime whose formation configuration changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationChangeDetails {
    /// Operation being notified.
    pub operation: FormationOperation,
    /// Formation id.
    pub formation_id: String,
    /// Customer metadata of the owning tenant.
    pub customer_tenant_context: CustomerTenantContext,
    /// Application template snapshot, when the application has one.
    pub application_template: Option<ApplicationTemplateWithLabels>,
    /// Application snapshot.
    pub application: ApplicationWithLabels,
    /// Runtime snapshot.
    pub runtime: RuntimeWithLabels,
    /// Runtime context snapshot, when a context participates.
    pub runtime_context: Option<RuntimeContextWithLabels>,
    /// Forward assignment.
    pub assignment: FormationAssignmentSnapshot,
    /// Reverse assignment.
    pub reverse_assignment: FormationAssignmentSnapshot,
    /// Kind of the notified participant.
    pub resource_type: ParticipantType,
}

/// Payload for an application paired with another application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTenantMappingDetails {
    /// Operation being notified.
    pub operation: FormationOperation,
    /// Formation id.
    pub formation_id: String,
    /// Customer metadata of the owning tenant.
    pub customer_tenant_context: CustomerTenantContext,
    /// Source application template snapshot.
    pub source_application_template: Option<ApplicationTemplateWithLabels>,
    /// Source application snapshot.
    pub source_application: ApplicationWithLabels,
    /// Target application template snapshot.
    pub target_application_template: Option<ApplicationTemplateWithLabels>,
    /// Target application snapshot.
    pub target_application: ApplicationWithLabels,
    /// Forward assignment.
    pub assignment: FormationAssignmentSnapshot,
    /// Reverse assignment.
    pub reverse_assignment: FormationAssignmentSnapshot,
}

/// Join-point details handed to the notification builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationDetails {
    /// Configuration-change notification.
    ConfigurationChange(ConfigurationChangeDetails),
    /// Application tenant mapping notification.
    ApplicationTenantMapping(ApplicationTenantMappingDetails),
}

impl NotificationDetails {
    /// Returns the notified operation.
    #[must_use]
    pub fn operation(&self) -> FormationOperation {
        match self {
            Self::ConfigurationChange(details) => details.operation,
            Self::ApplicationTenantMapping(details) => details.operation,
        }
    }

    /// Returns the formation id.
    #[must_use]
    pub fn formation_id(&self) -> &str {
        match self {
            Self::ConfigurationChange(details) => details.formation_id.as_str(),
            Self::ApplicationTenantMapping(details) => details.formation_id.as_str(),
        }
    }

    /// Returns the kind of the notified participant.
    #[must_use]
    pub fn resource_type(&self) -> ParticipantType {
        match self {
            Self::ConfigurationChange(details) => details.resource_type,
            Self::ApplicationTenantMapping(_) => ParticipantType::Application,
        }
    }

    /// Returns the forward assignment snapshot.
    #[must_use]
    pub fn assignment(&self) -> &FormationAssignmentSnapshot {
        match self {
            Self::ConfigurationChange(details) => &details.assignment,
            Self::ApplicationTenantMapping(details) => &details.assignment,
        }
    }

    /// Returns the reverse assignment snapshot.
    #[must_use]
    pub fn reverse_assignment(&self) -> &FormationAssignmentSnapshot {
        match self {
            Self::ConfigurationChange(details) => &details.reverse_assignment,
            Self::ApplicationTenantMapping(details) => &details.reverse_assignment,
        }
    }
}
