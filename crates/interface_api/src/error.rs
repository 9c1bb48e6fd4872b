//! API error handling
//!
//! Every gateway error reaches the client as one uniform error body; the
//! status code follows the error taxonomy.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::GatewayError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Gateway(error) = self;
        let message = error.to_string();
        let (status, error_type, details) = match error {
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            GatewayError::Validation { missing_fields, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                (!missing_fields.is_empty()).then_some(missing_fields),
            ),
            GatewayError::Connection { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "ledger_unreachable", None)
            }
            GatewayError::Transaction { .. } => {
                (StatusCode::BAD_GATEWAY, "transaction_failed", None)
            }
            GatewayError::IdentityNotFound(_) | GatewayError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: GatewayError) -> StatusCode {
        ApiError::from(error).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(GatewayError::not_found("TS09AE0200")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(GatewayError::validation("identifier must not be blank")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(GatewayError::connection("peer unreachable")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(GatewayError::transaction("rejected")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(GatewayError::identity_not_found("appUser")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
