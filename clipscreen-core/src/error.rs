// ============================================================================
// clipscreen-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for clipscreen-core
//
// This module defines the error types used throughout the clipscreen-core
// library. Every component returns the most specific variant it can; the
// pipeline converts whatever a single clip produced into a failed
// ProcessingResult and keeps going.
//
// KEY COMPONENTS:
// - CoreError: Main error enum
// - CoreResult: Type alias for Result with CoreError
// - Helper functions for decoder process errors

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the download, extraction, moderation and pipeline
/// components.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Size limit exceeded: {actual} bytes exceeds maximum allowed {limit} bytes")]
    SizeExceeded { actual: u64, limit: u64 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Frame extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Metadata gateway error: {0}")]
    Gateway(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Processing cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to execute {0}: {1}")]
    CommandStart(String, io::Error),

    #[error("Command {command} failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

impl CoreError {
    /// True for both malformed input and a required input that is absent.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_) | CoreError::MissingInput(_))
    }

    /// Short, stable name of the error kind, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::InvalidInput(_) => "InvalidInput",
            CoreError::MissingInput(_) => "MissingInput",
            CoreError::NotFound(_) => "NotFound",
            CoreError::SizeExceeded { .. } => "SizeExceeded",
            CoreError::Timeout(_) => "Timeout",
            CoreError::NetworkError(_) => "NetworkError",
            CoreError::ExtractionFailed(_) => "ExtractionFailed",
            CoreError::EmbeddingFailed(_) => "EmbeddingFailed",
            CoreError::InvalidState(_) => "InvalidState",
            CoreError::Gateway(_) => "Gateway",
            CoreError::Config(_) => "Config",
            CoreError::Cancelled => "Cancelled",
            CoreError::Io(_) => "Io",
            CoreError::Json(_) => "Json",
            CoreError::Image(_) => "Image",
            CoreError::CommandStart(..) => "CommandStart",
            CoreError::CommandFailed { .. } => "CommandFailed",
        }
    }
}

/// Result type for clipscreen operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds the error for an external command that could not be started.
pub fn command_start_error(command: impl Into<String>, error: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), error)
}

/// Builds the error for an external command that exited unsuccessfully.
pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_counts_as_invalid_input() {
        assert!(CoreError::MissingInput("no url".into()).is_invalid_input());
        assert!(CoreError::InvalidInput("bad url".into()).is_invalid_input());
        assert!(!CoreError::NotFound("clip".into()).is_invalid_input());
    }

    #[test]
    fn size_exceeded_message_names_both_sizes() {
        let err = CoreError::SizeExceeded { actual: 20, limit: 10 };
        let message = err.to_string();
        assert!(message.contains("20"));
        assert!(message.contains("10"));
        assert_eq!(err.kind(), "SizeExceeded");
    }
}
