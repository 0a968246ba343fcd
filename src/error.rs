//! Error types for catalog-walker
//!
//! This module defines the error hierarchy that covers:
//! - Catalog fetch errors (transport, HTTP status, payload decoding, fixtures)
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Only the first fetch failure of a run is ever surfaced; a worker that
//! stops because the run was cancelled does not produce an error at all.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for catalog-walker
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Tree or product fetch failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (writing output, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization of the enriched tree failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Cancelled from outside the engine (signal handler, caller)
    #[error("Operation interrupted")]
    Interrupted,

    /// Caller-imposed deadline expired before every category was enriched
    #[error("Deadline of {0:?} exceeded before enrichment finished")]
    DeadlineExceeded(Duration),
}

/// Catalog fetch errors
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Request could not be sent or the response body could not be read
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// Server answered with a non-success status
    #[error("'{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Payload was not the JSON we expected
    #[error("Can't decode JSON returned by '{url}': {reason}")]
    Decode { url: String, reason: String },

    /// Fixture file could not be read
    #[error("Can't read '{}': {reason}", path.display())]
    Io { path: PathBuf, reason: String },
}

impl FetchError {
    /// The URL (or fixture path) the failing request was aimed at
    pub fn url(&self) -> String {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url.clone(),
            FetchError::Io { path, .. } => path.display().to_string(),
        }
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Invalid best-seller slice size
    #[error("Invalid top product count {count}: must be at least 1")]
    InvalidTopCount { count: usize },

    /// Origin code is not a 2-3 letter country code
    #[error("Invalid origin code '{code}': expected a 2 or 3 letter country code")]
    InvalidOriginCode { code: String },

    /// Endpoint URL is empty or malformed
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Fixture directory missing
    #[error("Invalid fixture directory '{}': {reason}", path.display())]
    InvalidFixtureDir { path: PathBuf, reason: String },

    /// Output path error
    #[error("Invalid output path '{}': {reason}", path.display())]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for FetchError
pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_url() {
        let err = FetchError::Status {
            url: "https://example.test/tree".into(),
            status: 503,
        };
        assert_eq!(err.url(), "https://example.test/tree");

        let err = FetchError::Io {
            path: PathBuf::from("/fixtures/7.json"),
            reason: "not found".into(),
        };
        assert_eq!(err.url(), "/fixtures/7.json");
    }

    #[test]
    fn test_error_conversion() {
        let fetch_err = FetchError::Transport {
            url: "https://example.test".into(),
            reason: "connection refused".into(),
        };
        let walker_err: WalkerError = fetch_err.into();
        assert!(matches!(walker_err, WalkerError::Fetch(_)));
        assert!(walker_err.to_string().contains("connection refused"));
    }
}
