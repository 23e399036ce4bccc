//! Error responses for non-streaming handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway::error::GatewayError;
use shared::envelope::Envelope;

/// An error that has been mapped to a client-facing status and message.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = match &err {
            GatewayError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            GatewayError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Rejected { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            GatewayError::Unknown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope::<()>::error(self.status.as_u16(), self.message).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use gateway::error::GatewayError;

    #[test]
    fn timeout_maps_to_408() {
        let err = ApiError::from(GatewayError::Timeout {
            upstream: "stock-info",
            operation: "stocks".to_string(),
        });
        assert_eq!(err.status, StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let err = ApiError::from(GatewayError::Unavailable {
            upstream: "stock-info",
            message: "connection refused".to_string(),
        });
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn rejection_keeps_the_upstream_status() {
        let err = ApiError::from(GatewayError::Rejected {
            upstream: "stock-info",
            operation: "stocks".to_string(),
            status: 422,
            message: "bad ticker".to_string(),
        });
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("bad ticker"));
    }

    #[test]
    fn out_of_range_rejection_status_falls_back_to_500() {
        let err = ApiError::from(GatewayError::Rejected {
            upstream: "stock-info",
            operation: "stocks".to_string(),
            status: 99,
            message: "?".to_string(),
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
