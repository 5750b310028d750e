//! Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::VisionModelClient;
use crate::config::VisionConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::base64_encode;

const SERVICE: &str = "gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &VisionConfig) -> AppResult<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            AppError::configuration(
                "no vision API key: set vision.api_key or WASTESNAP_API_KEY / GEMINI_API_KEY",
            )
        })?;

        let client = Client::builder()
            .timeout(config.timeout_duration()?)
            .build()
            .map_err(|e| AppError::configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn build_request<'a>(image: &[u8], mime_type: &'a str, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text { text: prompt },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: base64_encode(image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }

    fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|part| part.text)
    }
}

#[async_trait]
impl VisionModelClient for GeminiClient {
    async fn detect(&self, image: &[u8], mime_type: &str, prompt: &str) -> AppResult<String> {
        let start = Instant::now();
        let body = Self::build_request(image, mime_type, prompt);

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Vision model returned {}: {}", status, detail);
            return Err(AppError::upstream(SERVICE, format!("status {status}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("unreadable response: {e}")))?;

        let text = Self::first_candidate_text(parsed)
            .ok_or_else(|| AppError::upstream(SERVICE, "response contained no candidate text"))?;

        info!(
            "Vision model {} answered in {}ms ({} bytes)",
            self.model,
            start.elapsed().as_millis(),
            text.len()
        );
        debug!("Vision model raw reply: {}", text);
        Ok(text)
    }
}
