pub mod analysis;

pub use analysis::{AnalysisOutcome, AnalysisService, ImageUpload};
