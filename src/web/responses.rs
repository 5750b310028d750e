//! HTTP response bodies and error mapping
//!
//! Every failure is reported as `{ "success": false, "error": ... }`. Upstream
//! failures keep their detail in the logs; malformed model replies expose the
//! raw text so a bad reply can be diagnosed from the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::{AppError, WebError};
use crate::models::{AnalysisResult, HistoryEntry};
use crate::services::AnalysisOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub hash: String,
    pub cached: bool,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            success: true,
            hash: outcome.hash,
            cached: outcome.cached,
            result: outcome.result,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryListResponse {
    pub success: bool,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntryResponse {
    pub success: bool,
    pub entry: HistoryEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
            raw_response: None,
        }
    }
}

/// Convert an application error into an HTTP response
pub fn handle_error(error: AppError) -> Response {
    let (status, body) = match error {
        AppError::MissingInput { message } => {
            (StatusCode::BAD_REQUEST, ErrorResponse::new(message))
        }
        AppError::UpstreamFailure { service, message } => {
            error!("Vision model call to {} failed: {}", service, message);
            (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::new("Failed to analyze image"),
            )
        }
        AppError::MalformedResponse { message, raw } => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse {
                success: false,
                error: "Failed to parse vision model response".to_string(),
                details: Some(message),
                raw_response: Some(raw),
            },
        ),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new(format!("{} with id '{}' not found", resource, id)),
        ),
        AppError::Web(web_error) => {
            let status = match &web_error {
                WebError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
                WebError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                WebError::UnsupportedContentType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            };
            (status, ErrorResponse::new(web_error.to_string()))
        }
        AppError::Configuration { message } => {
            error!("Configuration error while handling request: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal server error"),
            )
        }
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(AppError::missing_input("no image"), StatusCode::BAD_REQUEST)]
    #[case(AppError::upstream("gemini", "status 429"), StatusCode::BAD_GATEWAY)]
    #[case(AppError::not_found("history entry", "abc"), StatusCode::NOT_FOUND)]
    #[case(AppError::configuration("oops"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(
        AppError::Web(WebError::PayloadTooLarge { max_size: 10 }),
        StatusCode::PAYLOAD_TOO_LARGE
    )]
    #[case(
        AppError::Web(WebError::UnsupportedContentType { content_type: "text/plain".into() }),
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    )]
    #[case(AppError::Web(WebError::invalid_request("image", "bad")), StatusCode::BAD_REQUEST)]
    fn test_error_status(#[case] error: AppError, #[case] expected: StatusCode) {
        assert_eq!(handle_error(error).status(), expected);
    }

    #[tokio::test]
    async fn test_upstream_detail_is_not_leaked() {
        let response = handle_error(AppError::upstream("gemini", "API key invalid: sk-123"));
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(!json["error"].as_str().unwrap().contains("sk-123"));
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_malformed_response_exposes_raw_text() {
        let response = handle_error(AppError::MalformedResponse {
            message: "expected value at line 1".to_string(),
            raw: "Sorry, I can't".to_string(),
        });
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["details"], "expected value at line 1");
        assert_eq!(json["raw_response"], "Sorry, I can't");
    }

    #[test]
    fn test_analyze_response_flattens_result() {
        let response = AnalyzeResponse::from(AnalysisOutcome {
            hash: "abc".to_string(),
            cached: true,
            result: AnalysisResult::from_detections(Vec::new()),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["cached"], true);
        assert!(json["detections"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["total"], 0);
        assert!(json["recommendations"].is_array());
    }
}
