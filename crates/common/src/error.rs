//! Error types shared across Retake crates.

use std::path::PathBuf;

/// Top-level error type for Retake operations.
///
/// The variants form a stable taxonomy: callers can distinguish bad input
/// artifacts, missing assets, encoder failures, cancellation, and internal
/// invariant violations without string matching.
#[derive(Debug, thiserror::Error)]
pub enum RetakeError {
    #[error("Invalid input: {message}")]
    InputInvalid { message: String },

    #[error("Missing asset: {path}")]
    AssetMissing { path: PathBuf },

    #[error("Encoder failure: {message}")]
    EncoderFailure { message: String },

    #[error("Job cancelled")]
    Cancelled,

    #[error("Internal invariant violated: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RetakeError.
pub type RetakeResult<T> = Result<T, RetakeError>;

impl RetakeError {
    pub fn input_invalid(msg: impl Into<String>) -> Self {
        Self::InputInvalid {
            message: msg.into(),
        }
    }

    pub fn asset_missing(path: impl Into<PathBuf>) -> Self {
        Self::AssetMissing { path: path.into() }
    }

    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::EncoderFailure {
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
        }
    }

    /// Whether this error was caused by explicit cancellation rather than
    /// a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
