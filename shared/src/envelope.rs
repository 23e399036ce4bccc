//! The `{code, message, data}` response envelope.
//!
//! Every upstream service speaks this envelope, and the BFF emits it on every
//! non-streaming response of its own. Streaming (event-stream) responses never
//! carry it; they are built as raw responses by the SSE engine.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
    /// Milliseconds since the epoch. Present on BFF-produced successes,
    /// absent on upstream envelopes and error replies.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<i64>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
            timestamp: Some(Utc::now().timestamp_millis()),
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Envelope {
            code,
            message: message.into(),
            data: None,
            timestamp: None,
        }
    }

    /// Unwraps the payload of a parsed upstream envelope.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
