//! HTTP middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_REQUEST_ID_LEN: usize = 64;

/// Request tracing middleware
///
/// Reuses a well-formed incoming `x-request-id` or generates one, runs the
/// handler inside a `request` span carrying it so analysis and cache logs can
/// be correlated, and echoes the id on the response.
pub async fn request_tracing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id =
        incoming_request_id(&request).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis();
    span.in_scope(|| {
        if status.is_server_error() || status.is_client_error() {
            warn!(status = status.as_u16(), duration_ms, "Request failed");
        } else {
            info!(status = status.as_u16(), duration_ms, "Request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn incoming_request_id(request: &Request) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let valid = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    valid.then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    fn server() -> TestServer {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route("/fail", get(|| async { StatusCode::BAD_REQUEST }))
            .layer(axum::middleware::from_fn(request_tracing_middleware));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = server().get("/ping").await;
        response.assert_status_ok();

        let id = response.header("x-request-id");
        let id = id.to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_echoes_incoming_request_id() {
        let response = server()
            .get("/ping")
            .add_header("x-request-id", "upload-42")
            .await;
        assert_eq!(response.header("x-request-id"), "upload-42");
    }

    #[tokio::test]
    async fn test_replaces_malformed_request_id() {
        let response = server()
            .get("/ping")
            .add_header("x-request-id", "not a valid id")
            .await;
        let id = response.header("x-request-id");
        assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_error_responses_carry_request_id() {
        let response = server().get("/fail").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
