use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

/// Maximum accepted size of a status report body.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    let formation_mapping_routes = Router::new()
        .route(
            "/v1/businessIntegrations/{formation_id}/assignments/{assignment_id}/status",
            patch(handlers::formation_mapping::update_formation_assignment_status_handler),
        )
        .route(
            "/v1/businessIntegrations/{formation_id}/assignments/{assignment_id}/status/reset",
            patch(handlers::formation_mapping::reset_formation_assignment_status_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_formation_assignment_callback_auth,
        ))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(formation_mapping_routes)
        .layer(from_fn(middleware::attach_consumer_context))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
