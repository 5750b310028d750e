//! Vision model clients that turn an image into raw detection text

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

use crate::errors::AppResult;

pub use gemini::GeminiClient;
pub use prompt::DETECTION_PROMPT;

/// A multimodal model that answers a prompt about an image
///
/// Implementations return the model's raw text reply. Interpreting that text
/// is the normalizer's job; transport and API failures are reported as
/// `AppError::UpstreamFailure`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisionModelClient: Send + Sync {
    async fn detect(&self, image: &[u8], mime_type: &str, prompt: &str) -> AppResult<String>;
}
