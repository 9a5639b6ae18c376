// src/error.rs
//! Failure taxonomy for a pipeline run.
//!
//! Collaborators return `anyhow::Result`; the pipeline folds those errors into
//! a `PipelineError` when it logs them or reports the run outcome, so every
//! failure carries the operation that failed plus the underlying detail.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Feed or image-search fetch failed; the source is skipped.
    #[error("source unavailable ({op}): {detail}")]
    SourceUnavailable { op: String, detail: String },

    /// Text generation call failed.
    #[error("generation failed ({op}): {detail}")]
    GenerationFailure { op: String, detail: String },

    /// Unpublished media upload failed or returned no id.
    #[error("media upload failed: {detail}")]
    MediaUploadFailure { detail: String },

    /// Final feed publish call failed.
    #[error("publish failed ({op}): {detail}")]
    PublishFailure { op: String, detail: String },

    /// Missing credentials or invalid settings.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn source_unavailable(op: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::SourceUnavailable {
            op: op.into(),
            detail: format!("{err:#}"),
        }
    }

    pub fn generation(op: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::GenerationFailure {
            op: op.into(),
            detail: format!("{err:#}"),
        }
    }

    pub fn media_upload(detail: impl Into<String>) -> Self {
        Self::MediaUploadFailure {
            detail: detail.into(),
        }
    }

    pub fn publish(op: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::PublishFailure {
            op: op.into(),
            detail: format!("{err:#}"),
        }
    }

    /// Short stable label for log fields and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::GenerationFailure { .. } => "generation_failure",
            Self::MediaUploadFailure { .. } => "media_upload_failure",
            Self::PublishFailure { .. } => "publish_failure",
            Self::Config(_) => "config",
        }
    }
}
