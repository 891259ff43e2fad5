//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_formation_assignment_repository;
mod in_memory_participant_directory;
mod json_notification_builder;
mod permissive_constraint_engine;
mod postgres_formation_assignment_repository;
mod postgres_formation_repository;
mod postgres_participant_repository;
mod postgres_tenant_context_resolver;
mod postgres_webhook_repository;
mod state_change_timestamp;

pub use in_memory_formation_assignment_repository::InMemoryFormationAssignmentRepository;
pub use in_memory_participant_directory::InMemoryParticipantDirectory;
pub use json_notification_builder::JsonNotificationBuilder;
pub use permissive_constraint_engine::PermissiveConstraintEngine;
pub use postgres_formation_assignment_repository::PostgresFormationAssignmentRepository;
pub use postgres_formation_repository::PostgresFormationRepository;
pub use postgres_participant_repository::PostgresParticipantRepository;
pub use postgres_tenant_context_resolver::PostgresTenantContextResolver;
pub use postgres_webhook_repository::PostgresWebhookRepository;
