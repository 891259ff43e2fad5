use std::collections::HashMap;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tessera_core::{AppError, ConsumerIdentity, ConsumerType, TenantId, TenantPair};
use tracing::{error, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const CONSUMER_ID_HEADER: &str = "x-consumer-id";
pub const CONSUMER_TYPE_HEADER: &str = "x-consumer-type";
pub const TENANT_INTERNAL_ID_HEADER: &str = "x-tenant-internal-id";
pub const TENANT_EXTERNAL_ID_HEADER: &str = "x-tenant-external-id";

pub const FORMATION_ID_PARAM: &str = "formation_id";
pub const FORMATION_ASSIGNMENT_ID_PARAM: &str = "assignment_id";

/// Attaches the caller identity resolved by the edge proxy.
///
/// Malformed or missing headers leave the request without an identity; the
/// authorization layer decides what that means.
pub async fn attach_consumer_context(mut request: Request, next: Next) -> Response {
    if let Some(consumer) = consumer_identity(request.headers()) {
        request.extensions_mut().insert(consumer);
    }
    if let Some(tenant_pair) = tenant_pair(request.headers()) {
        request.extensions_mut().insert(tenant_pair);
    }

    next.run(request).await
}

/// Lets a request through only when the caller may report status for the assignment.
pub async fn require_formation_assignment_callback_auth(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if request.method() != Method::PATCH {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let formation_id = required_path_param(&params, FORMATION_ID_PARAM)?;
    let assignment_id = required_path_param(&params, FORMATION_ASSIGNMENT_ID_PARAM)?;

    let (Some(consumer), Some(tenant_pair)) = (
        request.extensions().get::<ConsumerIdentity>().cloned(),
        request.extensions().get::<TenantPair>().cloned(),
    ) else {
        warn!(%formation_id, %assignment_id, "missing consumer info in request");
        return Err(unauthorized());
    };

    match state
        .callback_authorizer
        .is_authorized(&consumer, &tenant_pair, assignment_id, formation_id)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            warn!(
                consumer_id = consumer.consumer_id(),
                consumer_type = %consumer.consumer_type(),
                %formation_id,
                %assignment_id,
                "caller is not authorized to update formation assignment status"
            );
            return Err(unauthorized());
        }
        Err(AppError::Unauthorized(message)) => {
            warn!(
                consumer_id = consumer.consumer_id(),
                %formation_id,
                %assignment_id,
                error = %message,
                "formation assignment status authorization denied"
            );
            return Err(unauthorized());
        }
        Err(other) => {
            error!(
                %formation_id,
                %assignment_id,
                error = %other,
                "failed to authorize formation assignment status update"
            );
            return Err(ApiError(AppError::Internal(other.to_string())));
        }
    }

    Ok(next.run(request).await)
}

pub(crate) fn required_path_param<'a>(
    params: &'a HashMap<String, String>,
    name: &str,
) -> ApiResult<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            ApiError(AppError::Validation(
                "not all of the required parameters are provided".to_owned(),
            ))
        })
}

fn unauthorized() -> ApiError {
    ApiError(AppError::Unauthorized(
        "caller is not authorized to update the formation assignment".to_owned(),
    ))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn consumer_identity(headers: &HeaderMap) -> Option<ConsumerIdentity> {
    let consumer_id = header_value(headers, CONSUMER_ID_HEADER)?;
    let consumer_type = ConsumerType::parse(header_value(headers, CONSUMER_TYPE_HEADER)?).ok()?;
    Some(ConsumerIdentity::new(consumer_id, consumer_type))
}

fn tenant_pair(headers: &HeaderMap) -> Option<TenantPair> {
    let internal = TenantId::parse(header_value(headers, TENANT_INTERNAL_ID_HEADER)?).ok()?;
    let external = header_value(headers, TENANT_EXTERNAL_ID_HEADER)?;
    Some(TenantPair::new(internal, external))
}
