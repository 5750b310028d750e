//! WasteSnap: waste detection from photos
//!
//! Uploads are hashed, looked up in a bounded result cache and, on a miss,
//! sent to a vision model whose loosely structured reply is normalized into
//! categorized detection records.

pub mod cache;
pub mod config;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod services;
pub mod utils;
pub mod vision;
pub mod web;

pub use errors::{AppError, AppResult};
