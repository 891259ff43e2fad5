//! Application services and ports.

#![forbid(unsafe_code)]

mod formation_assignment_callback_authorizer;
mod formation_assignment_notification_service;
mod formation_assignment_service;
mod formation_assignment_status_service;
mod formation_ports;
mod participant_data_builder;

#[cfg(test)]
mod test_support;

pub use formation_assignment_callback_authorizer::{
    FormationAssignmentCallbackAuthorizer, SubscriptionLabelKeys,
};
pub use formation_assignment_notification_service::FormationAssignmentNotificationService;
pub use formation_assignment_service::{CreateFormationAssignmentInput, FormationAssignmentService};
pub use formation_assignment_status_service::{FormationAssignmentStatusService, SubtypeLabelKeys};
pub use formation_ports::{
    ApplicationRepository, ApplicationTemplateRepository, ApplicationTenantMappingInput,
    ConfigurationChangeInput, ConstraintEngine, FormationAssignmentRepository,
    FormationRepository, FormationTemplateRepository, LabelRepository, LabelableObject,
    NotificationBuilder, ParticipantDataBuilder, RuntimeContextRepository, RuntimeRepository,
    TenantContextResolver, WebhookRepository,
};
pub use participant_data_builder::LabelledParticipantDataBuilder;
