//! Error types for answer-key extraction.

use thiserror::Error;

/// Result type alias for extraction operations.
pub type MarksheetResult<T> = Result<T, MarksheetError>;

/// Errors that can occur during answer-key extraction.
///
/// The variants mirror what a caller needs to present to the user:
/// an unreadable input file, a missing credential, a vision service
/// failure worth retrying, and a response the model got wrong. Zero
/// deterministic matches is NOT an error; it is an empty result list.
#[derive(Error, Debug)]
pub enum MarksheetError {
    /// Supplied bytes are not a valid/parseable PDF.
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Page rasterization failed.
    #[error("Page render error: {0}")]
    Render(String),

    /// Missing or invalid configuration (credential, library binding,
    /// config file). The message names the remediation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network/transport/service-side failure reaching the vision model.
    #[error("Vision service error: {message}")]
    Vision {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The vision model's response did not contain a parseable JSON
    /// array of the expected shape.
    #[error("Malformed vision response: {0}")]
    MalformedResponse(String),

    /// IO error during extraction.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl MarksheetError {
    /// Create a vision service error without an underlying source.
    pub fn vision(message: impl Into<String>) -> Self {
        Self::Vision {
            message: message.into(),
            source: None,
        }
    }

    /// Create a vision service error wrapping an underlying cause.
    pub fn vision_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Vision {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the failure is sensible to surface to the user as
    /// retryable. Retries stay a user decision; nothing in the pipeline
    /// retries automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Vision { .. })
    }
}
