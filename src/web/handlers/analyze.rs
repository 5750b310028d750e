//! Image upload endpoint

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::errors::{AppError, AppResult, WebError};
use crate::services::ImageUpload;
use crate::utils::resolve_image_mime;
use crate::web::responses::{handle_error, AnalyzeResponse};
use crate::web::AppState;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match multipart {
        Ok(multipart) => read_image_field(multipart, state.max_upload_size).await,
        Err(rejection) => {
            debug!("Rejected analyze request: {}", rejection);
            Err(AppError::missing_input(
                "expected a multipart/form-data body with an 'image' field",
            ))
        }
    };

    let result = match upload {
        Ok(upload) => state.analysis.analyze(upload).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => (StatusCode::OK, Json(AnalyzeResponse::from(outcome))).into_response(),
        Err(e) => handle_error(e),
    }
}

async fn read_image_field(mut multipart: Multipart, max_upload_size: usize) -> AppResult<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_size))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_upload_size))?;

        if bytes.is_empty() {
            return Err(AppError::missing_input("the 'image' field is empty"));
        }

        let mime_type = resolve_image_mime(declared.as_deref(), &bytes).ok_or_else(|| {
            WebError::UnsupportedContentType {
                content_type: declared.unwrap_or_else(|| "unknown".to_string()),
            }
        })?;

        return Ok(ImageUpload {
            bytes: bytes.to_vec(),
            mime_type,
        });
    }

    Err(AppError::missing_input("no image provided"))
}

fn multipart_error(error: MultipartError, max_upload_size: usize) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        WebError::PayloadTooLarge {
            max_size: max_upload_size,
        }
        .into()
    } else {
        WebError::invalid_request(IMAGE_FIELD, error.body_text()).into()
    }
}
