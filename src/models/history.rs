use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResult;

/// One result cache record, keyed by the content hash of the source image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Lowercase hex SHA-256 of the image bytes
    pub hash: String,
    /// `data:<mime>;base64,...` rendition of the image for history previews
    pub image_data_url: String,
    pub result: AnalysisResult,
    /// Unix milliseconds at which the result was stored
    pub timestamp: i64,
}
