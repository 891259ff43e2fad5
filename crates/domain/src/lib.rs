//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod constraint;
mod formation;
mod notification;
mod participant;
mod status;
mod webhook;

pub use assignment::{
    AssignmentError, AssignmentErrorCode, AssignmentErrorWrapper, AssignmentState,
    FormationAssignment, FormationAssignmentSnapshot, is_config_empty,
};
pub use constraint::{
    ConstraintPhase, JoinPointLocation, NotificationStatusReturnedDetails, TargetOperation,
};
pub use formation::{Formation, FormationOperation, FormationState, FormationTemplate};
pub use notification::{
    ApplicationTenantMappingDetails, ConfigurationChangeDetails, CustomerTenantContext,
    NotificationDetails,
};
pub use participant::{
    Application, ApplicationTemplate, ApplicationTemplateWithLabels, ApplicationWithLabels,
    Labels, ParticipantType, Runtime, RuntimeContext, RuntimeContextWithLabels,
    RuntimeWithLabels,
};
pub use status::{NotificationStatusReport, ReportedState};
pub use webhook::{
    AssignmentMappingPair, AssignmentRequestMapping, NotificationRequest, Webhook, WebhookMode,
    WebhookOwnerType, WebhookType,
};
