//! Image analysis orchestration
//!
//! hash → cache lookup → (vision model → normalize → summarize → cache) on a
//! miss. Identical image bytes are only ever sent to the model once while
//! their result is still cached.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::ResultCache;
use crate::errors::{AppError, AppResult};
use crate::models::{AnalysisResult, HistoryEntry};
use crate::normalizer;
use crate::utils::{content_hash, data_url};
use crate::vision::{VisionModelClient, DETECTION_PROMPT};

/// Uploaded image bytes with their resolved MIME type
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub hash: String,
    pub cached: bool,
    pub result: AnalysisResult,
}

#[derive(Clone)]
pub struct AnalysisService {
    vision: Arc<dyn VisionModelClient>,
    cache: Arc<ResultCache>,
    prompt: String,
}

impl AnalysisService {
    pub fn new(vision: Arc<dyn VisionModelClient>, cache: Arc<ResultCache>) -> Self {
        Self {
            vision,
            cache,
            prompt: DETECTION_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub async fn analyze(&self, upload: ImageUpload) -> AppResult<AnalysisOutcome> {
        if upload.bytes.is_empty() {
            return Err(AppError::missing_input("no image data provided"));
        }

        let hash = content_hash(&upload.bytes);

        if let Some(entry) = self.cache.get(&hash).await {
            info!("Serving cached analysis for {}", hash);
            return Ok(AnalysisOutcome {
                hash,
                cached: true,
                result: entry.result,
            });
        }

        debug!(
            "Analyzing {} ({} bytes, {})",
            hash,
            upload.bytes.len(),
            upload.mime_type
        );
        let raw = self
            .vision
            .detect(&upload.bytes, &upload.mime_type, &self.prompt)
            .await?;

        let detections = normalizer::normalize(&raw)?;
        let result = AnalysisResult::from_detections(detections);
        info!(
            "Analysis of {} found {} items ({} recyclable, {} compostable, {} non-recyclable)",
            hash,
            result.summary.total,
            result.summary.recyclable,
            result.summary.compostable,
            result.summary.non_recyclable
        );

        self.cache
            .put(HistoryEntry {
                hash: hash.clone(),
                image_data_url: data_url(&upload.mime_type, &upload.bytes),
                result: result.clone(),
                timestamp: Utc::now().timestamp_millis(),
            })
            .await;

        Ok(AnalysisOutcome {
            hash,
            cached: false,
            result,
        })
    }

    /// Cached analyses, most recently used first
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.cache.list_all().await
    }

    /// One cached analysis; reading it marks it as recently used
    pub async fn history_entry(&self, hash: &str) -> AppResult<HistoryEntry> {
        self.cache
            .get(hash)
            .await
            .ok_or_else(|| AppError::not_found("history entry", hash))
    }

    pub async fn clear_history(&self) {
        self.cache.clear().await;
        info!("Analysis history cleared");
    }
}
