//! Tessera API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tessera_application::{
    FormationAssignmentCallbackAuthorizer, FormationAssignmentNotificationService,
    FormationAssignmentService, FormationAssignmentStatusService, LabelledParticipantDataBuilder,
};
use tessera_core::AppError;
use tessera_infrastructure::{
    JsonNotificationBuilder, PermissiveConstraintEngine, PostgresFormationAssignmentRepository,
    PostgresFormationRepository, PostgresParticipantRepository, PostgresTenantContextResolver,
    PostgresWebhookRepository,
};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let assignment_repository = Arc::new(PostgresFormationAssignmentRepository::new(pool.clone()));
    let formation_repository = Arc::new(PostgresFormationRepository::new(pool.clone()));
    let participant_repository = Arc::new(PostgresParticipantRepository::new(pool.clone()));
    let webhook_repository = Arc::new(PostgresWebhookRepository::new(pool.clone()));
    let tenant_context_resolver = Arc::new(PostgresTenantContextResolver::new(pool.clone()));

    let participant_data_builder = Arc::new(LabelledParticipantDataBuilder::new(
        participant_repository.clone(),
        participant_repository.clone(),
        participant_repository.clone(),
        participant_repository.clone(),
        participant_repository.clone(),
    ));

    let formation_assignment_service = FormationAssignmentService::new(assignment_repository.clone());
    let notification_service = FormationAssignmentNotificationService::new(
        assignment_repository.clone(),
        webhook_repository,
        participant_data_builder,
        formation_repository.clone(),
        Arc::new(JsonNotificationBuilder::new()),
        tenant_context_resolver,
    );
    let status_service = FormationAssignmentStatusService::new(
        assignment_repository.clone(),
        Arc::new(PermissiveConstraintEngine::new()),
        formation_repository.clone(),
        formation_repository.clone(),
        participant_repository.clone(),
        participant_repository.clone(),
    )
    .with_subtype_label_keys(config.subtype_label_keys.clone());
    let callback_authorizer = FormationAssignmentCallbackAuthorizer::new(
        assignment_repository,
        participant_repository.clone(),
        participant_repository.clone(),
        participant_repository.clone(),
        participant_repository.clone(),
        participant_repository,
    )
    .with_subscription_label_keys(config.subscription_label_keys.clone());

    let app_state = AppState {
        postgres_pool: pool,
        formation_assignment_service,
        notification_service,
        status_service,
        callback_authorizer,
        formation_repository,
    };

    let app = api_router::build_router(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "tessera-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
