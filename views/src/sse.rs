//! Upstream event-stream piping.
//!
//! Once response headers are sent the HTTP status is fixed, so a mid-stream
//! upstream failure cannot become an error response. It becomes exactly one
//! in-band error frame instead; after that frame the session emits nothing.

use crate::metrics_defs;
use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE, HeaderName};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

enum SessionState {
    Forwarding,
    Closed,
}

/// Pipes an upstream byte stream to the client, folding the first upstream
/// error into a terminal SSE error frame.
pub struct StreamSession<E> {
    upstream: Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>,
    state: SessionState,
}

impl<E: std::fmt::Display> StreamSession<E> {
    pub fn new(upstream: Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>) -> Self {
        metrics::counter!(metrics_defs::SSE_SESSIONS_OPENED.name).increment(1);
        StreamSession {
            upstream,
            state: SessionState::Forwarding,
        }
    }
}

/// Formats an in-band SSE error frame.
fn error_frame(message: &str) -> Bytes {
    let payload = serde_json::json!({
        "stage": "error",
        "message": message,
    });
    Bytes::from(format!("data: {payload}\n\n"))
}

impl<E: std::fmt::Display> Stream for StreamSession<E> {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if matches!(self.state, SessionState::Closed) {
            return Poll::Ready(None);
        }

        match self.upstream.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(err))) => {
                let message = err.to_string();
                tracing::error!(error = %message, "event stream failed mid-flight");
                metrics::counter!(metrics_defs::SSE_UPSTREAM_ERRORS.name).increment(1);
                self.state = SessionState::Closed;
                Poll::Ready(Some(Ok(error_frame(&message))))
            }
            Poll::Ready(None) => {
                self.state = SessionState::Closed;
                Poll::Ready(None)
            }
        }
    }
}

/// Wraps an upstream byte stream in a streaming response with SSE headers.
pub fn event_stream_response<E>(
    upstream: Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>,
) -> Response
where
    E: std::fmt::Display + Send + 'static,
{
    (
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (CONNECTION, "keep-alive"),
            // Stops nginx-style proxies from buffering the event stream.
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(StreamSession::new(upstream)),
    )
        .into_response()
}
