use std::sync::Arc;

use sqlx::PgPool;
use tessera_application::{
    FormationAssignmentCallbackAuthorizer, FormationAssignmentNotificationService,
    FormationAssignmentService, FormationAssignmentStatusService, FormationRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub postgres_pool: PgPool,
    pub formation_assignment_service: FormationAssignmentService,
    pub notification_service: FormationAssignmentNotificationService,
    pub status_service: FormationAssignmentStatusService,
    pub callback_authorizer: FormationAssignmentCallbackAuthorizer,
    pub formation_repository: Arc<dyn FormationRepository>,
}
