use super::submission::ValidationError;
use crate::error::AppError;
use serde::Serialize;
use std::fmt;

/// Where a pipeline run is, or where it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validating,
    Resolving,
    ExtractingContent,
    Synthesizing,
    Assembling,
    Uploading,
    PersistingContent,
    PersistingRequest,
    Notifying,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Resolving => "resolving",
            Self::ExtractingContent => "extracting_content",
            Self::Synthesizing => "synthesizing",
            Self::Assembling => "assembling",
            Self::Uploading => "uploading",
            Self::PersistingContent => "persisting_content",
            Self::PersistingRequest => "persisting_request",
            Self::Notifying => "notifying",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractionError {
    #[error("source unreachable: {0}")]
    Unreachable(String),
    #[error("source returned status {0}")]
    Status(u16),
    #[error("unsupported content type: {0}")]
    NotHtml(String),
    #[error("no extractable body text")]
    EmptyBody,
    #[error("malformed extractor response: {0}")]
    Malformed(String),
    #[error("extraction timed out")]
    Timeout,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SynthesisError {
    #[error("provider rejected segment: {0}")]
    Rejected(String),
    #[error("provider quota exhausted: {0}")]
    Quota(String),
    #[error("provider transport failure: {0}")]
    Transport(String),
    #[error("segment of {len} characters exceeds provider limit of {limit}")]
    SegmentTooLong { len: usize, limit: usize },
    #[error("synthesis timed out")]
    Timeout,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("permission denied: {0}")]
    Permission(String),
    #[error("upload timed out")]
    Timeout,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    #[error("store write failed: {0}")]
    Write(String),
    #[error("store read failed: {0}")]
    Read(String),
    #[error("store call timed out")]
    Timeout,
}

impl PersistenceError {
    pub fn write(err: AppError) -> Self {
        Self::Write(err.to_string())
    }

    pub fn read(err: AppError) -> Self {
        Self::Read(err.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("gateway failure: {0}")]
    Gateway(String),
    #[error("notification timed out")]
    Timeout,
}

/// Everything that can stop a run, grouped by the failing collaborator
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// A run that ended in `Failed(stage)`
#[derive(Debug, Clone, thiserror::Error)]
#[error("pipeline failed while {stage}: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}
