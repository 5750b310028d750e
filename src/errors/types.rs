//! Error type definitions for the WasteSnap service
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that keeps user-visible failures
//! separate from the failures the service absorbs internally.

use thiserror::Error;

/// Top-level application error type
///
/// Only `MissingInput`, `UpstreamFailure` and `MalformedResponse` describe
/// failures of the analysis itself; the remaining variants belong to the
/// surrounding web and configuration layers.
#[derive(Error, Debug)]
pub enum AppError {
    /// No image was supplied with the request
    #[error("Missing input: {message}")]
    MissingInput { message: String },

    /// The vision model call failed (network, quota, auth, bad envelope)
    #[error("Upstream failure: {service} - {message}")]
    UpstreamFailure { service: String, message: String },

    /// The vision model replied with text that is not a JSON array
    #[error("Malformed model response: {message}")]
    MalformedResponse { message: String, raw: String },

    /// Web layer errors
    #[error("Web error: {0}")]
    Web(#[from] WebError),

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Failures of the model-output normalizer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// The reply could not be read as a JSON array of fragments
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String, raw: String },
}

/// Key-value persistence errors
///
/// These never escape the result cache: an unavailable store turns the cache
/// into an always-miss, no-op cache.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend is disabled, full or otherwise refusing operations
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// Key contains characters the backend cannot address
    #[error("Invalid key: {key}")]
    InvalidKey { key: String },

    /// Filesystem failures of the file backend
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Web layer specific errors
#[derive(Error, Debug)]
pub enum WebError {
    /// Invalid request format
    #[error("Invalid request: {field} - {message}")]
    InvalidRequest { field: String, message: String },

    /// Request payload too large
    #[error("Payload too large (max: {max_size} bytes)")]
    PayloadTooLarge { max_size: usize },

    /// Unsupported content type
    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a missing input error
    pub fn missing_input<S: Into<String>>(message: S) -> Self {
        Self::MissingInput {
            message: message.into(),
        }
    }

    /// Create an upstream failure for the named service
    pub fn upstream<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::UpstreamFailure {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<NormalizeError> for AppError {
    fn from(error: NormalizeError) -> Self {
        match error {
            NormalizeError::MalformedResponse { reason, raw } => Self::MalformedResponse {
                message: reason,
                raw,
            },
        }
    }
}

impl NormalizeError {
    /// Create a malformed response error keeping the raw text for diagnosis
    pub fn malformed<R: Into<String>, T: Into<String>>(reason: R, raw: T) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

impl StoreError {
    /// Create an unavailable store error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl WebError {
    /// Create an invalid request error
    pub fn invalid_request<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }
}
