//! Domain models shared by the normalizer, the result cache and the web layer

pub mod analysis;
pub mod detection;
pub mod history;

pub use analysis::{AnalysisResult, CategorySummary};
pub use detection::{Category, DetectionRecord};
pub use history::HistoryEntry;
