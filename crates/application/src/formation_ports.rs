mod assignment_repository;
mod constraints;
mod formations;
mod notifications;
mod participants;
mod webhooks;

pub use assignment_repository::FormationAssignmentRepository;
pub use constraints::ConstraintEngine;
pub use formations::{FormationRepository, FormationTemplateRepository};
pub use notifications::{
    ApplicationTenantMappingInput, ConfigurationChangeInput, NotificationBuilder,
    ParticipantDataBuilder, TenantContextResolver,
};
pub use participants::{
    ApplicationRepository, ApplicationTemplateRepository, LabelRepository, LabelableObject,
    RuntimeContextRepository, RuntimeRepository,
};
pub use webhooks::WebhookRepository;
