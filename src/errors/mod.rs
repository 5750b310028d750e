//! Centralized error handling for the WasteSnap service
//!
//! # Error Categories
//!
//! - **Input Errors**: no image supplied, unsupported content
//! - **Upstream Errors**: the vision model call failed or replied with garbage
//! - **Store Errors**: key-value persistence failures, absorbed by the cache
//! - **Web Errors**: HTTP request handling issues
//!
//! # Usage
//!
//! ```rust
//! use wastesnap::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::missing_input("No image provided"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for key-value store Results
pub type StoreResult<T> = Result<T, StoreError>;
