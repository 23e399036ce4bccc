//! Shared plumbing for talking to one upstream service.

use crate::error::{GatewayError, Result, classify_transport};
use bytes::Bytes;
use futures_util::Stream;
use reqwest::Method;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::de::DeserializeOwned;
use shared::envelope::Envelope;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Raw byte stream of an upstream event-stream response.
pub type EventStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// One logical client per upstream service.
///
/// Owns the base URL and the default per-call timeout. Failures are classified
/// into [`GatewayError`] and logged with the upstream name and the operation;
/// the client never retries on its own.
#[derive(Clone)]
pub struct UpstreamClient {
    name: &'static str,
    base_url: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(name: &'static str, base_url: Url, timeout: Duration) -> Self {
        UpstreamClient {
            name,
            base_url,
            http: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn endpoint(&self, operation: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/api/v1/{operation}"));
        url
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        self.request_json(Method::GET, operation, query, None, self.timeout)
            .await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<Option<T>> {
        self.request_json(
            Method::POST,
            operation,
            query,
            body,
            timeout.unwrap_or(self.timeout),
        )
        .await
    }

    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        self.request_json(Method::DELETE, operation, query, None, self.timeout)
            .await
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        operation: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
        timeout: Duration,
    ) -> Result<Option<T>> {
        let mut request = self
            .http
            .request(method, self.endpoint(operation))
            .query(query)
            .timeout(timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.fail(operation, classify_transport(self.name, operation, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = rejection_message(response).await;
            return Err(self.fail(
                operation,
                GatewayError::Rejected {
                    upstream: self.name,
                    operation: operation.to_string(),
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            self.fail(
                operation,
                GatewayError::Unknown {
                    upstream: self.name,
                    operation: operation.to_string(),
                    message: format!("malformed response payload: {e}"),
                },
            )
        })?;

        Ok(envelope.into_data())
    }

    /// Opens a streaming call and hands back the raw byte stream.
    ///
    /// No per-call timeout is applied: an event stream runs until the upstream
    /// completes, errors, or the caller drops the stream.
    pub async fn open_event_stream(
        &self,
        method: Method,
        operation: &str,
        query: &[(&str, String)],
    ) -> Result<EventStream> {
        let response = self
            .http
            .request(method, self.endpoint(operation))
            .query(query)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| self.fail(operation, classify_transport(self.name, operation, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = rejection_message(response).await;
            return Err(self.fail(
                operation,
                GatewayError::Rejected {
                    upstream: self.name,
                    operation: operation.to_string(),
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        Ok(Box::pin(response.bytes_stream()))
    }

    fn fail(&self, operation: &str, err: GatewayError) -> GatewayError {
        tracing::error!(upstream = self.name, operation, error = %err, "upstream call failed");
        err
    }
}

/// Derives a human-readable message from a rejection body. Upstreams reply
/// with either `{detail}` (FastAPI style) or `{message}`; anything else is
/// passed through truncated.
async fn rejection_message(response: reqwest::Response) -> String {
    const MAX_LEN: usize = 512;

    let text = response.text().await.unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
        for key in ["detail", "message"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }

    let mut text = text;
    text.truncate(MAX_LEN);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use http_body_util::Full;
    use hyper::service::service_fn;
    use hyper::{Request, Response};
    use hyper_util::rt::TokioExecutor;
    use std::convert::Infallible;
    use tokio::net::TcpListener;

    async fn start_upstream(status: u16, body: serde_json::Value) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = hyper_util::rt::TokioIo::new(stream);
                let body = body.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |_req: Request<hyper::body::Incoming>| {
                        let body = body.clone();
                        async move {
                            let response = Response::builder()
                                .status(status)
                                .header("content-type", "application/json")
                                .body(Full::new(Bytes::from(serde_json::to_vec(&body).unwrap())))
                                .unwrap();
                            Ok::<_, Infallible>(response)
                        }
                    });

                    let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await;
                });
            }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        port
    }

    fn client_for(port: u16) -> UpstreamClient {
        let url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        UpstreamClient::new("test-upstream", url, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn unwraps_the_upstream_envelope() {
        let port = start_upstream(
            200,
            serde_json::json!({"code": 200, "message": "ok", "data": [1, 2, 3]}),
        )
        .await;

        let data: Option<Vec<i32>> = client_for(port).get_json("numbers", &[]).await.unwrap();
        assert_eq!(data, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn null_data_becomes_none() {
        let port = start_upstream(
            200,
            serde_json::json!({"code": 200, "message": "ok", "data": null}),
        )
        .await;

        let data: Option<Vec<i32>> = client_for(port).get_json("numbers", &[]).await.unwrap();
        assert_eq!(data, None);
    }

    #[tokio::test]
    async fn non_2xx_is_classified_as_rejected_with_body_message() {
        let port = start_upstream(422, serde_json::json!({"detail": "ticker is malformed"})).await;

        let err = client_for(port)
            .get_json::<serde_json::Value>("stocks/BAD", &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Rejected(422));
        assert!(err.to_string().contains("ticker is malformed"));
    }

    #[tokio::test]
    async fn connection_refused_is_classified_as_unavailable() {
        // Port 1 is never listening in the test environment.
        let url = Url::parse("http://127.0.0.1:1").unwrap();
        let client = UpstreamClient::new("dead-upstream", url, Duration::from_secs(2));

        let err = client
            .get_json::<serde_json::Value>("stocks", &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Unavailable);
        assert_eq!(err.upstream(), "dead-upstream");
    }

    #[tokio::test]
    async fn slow_upstream_is_classified_as_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Accept and hold the connection open without ever responding.
        tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                held.push(stream);
            }
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        let client = UpstreamClient::new("slow-upstream", url, Duration::from_millis(200));

        let err = client
            .get_json::<serde_json::Value>("stocks", &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn rejected_stream_open_never_yields_bytes() {
        let port = start_upstream(503, serde_json::json!({"message": "refresh in progress"})).await;

        let err = client_for(port)
            .open_event_stream(Method::GET, "historical-data/batch", &[])
            .await
            .map(|_| ())
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Rejected(503));
    }
}
