use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tessera_core::AppError;
use tracing::error;

/// Message returned in place of internal failure details.
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing the request";

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedParticipantType(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
            UNEXPECTED_ERROR_MESSAGE.to_owned()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::Value;
    use tessera_core::AppError;

    use super::{ApiError, UNEXPECTED_ERROR_MESSAGE};

    async fn message_of(error: AppError) -> (StatusCode, String) {
        let response = ApiError(error).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|_| unreachable!());
        let payload: Value = serde_json::from_slice(&bytes).unwrap_or_else(|_| unreachable!());
        (
            status,
            payload["message"].as_str().unwrap_or_default().to_owned(),
        )
    }

    #[tokio::test]
    async fn internal_details_are_not_echoed() {
        let (status, message) =
            message_of(AppError::Internal("failed to fetch row: db down".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, UNEXPECTED_ERROR_MESSAGE);

        let (status, message) = message_of(AppError::UnsupportedParticipantType(
            "unsupported reverse type".to_owned(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, UNEXPECTED_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let (status, message) =
            message_of(AppError::NotFound("formation assignment 'fa-1'".to_owned())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "not found: formation assignment 'fa-1'");
    }
}
