pub mod assembler;
pub mod chunker;
pub mod dispatcher;
pub mod error;
pub mod language;
pub mod service;
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::{PipelineDispatcher, PipelineTask};
pub use error::{PipelineError, PipelineStage, StageError};
pub use service::{
    PipelineOutcome, PipelineReport, PipelineService, PipelineServiceApi, PipelineSettings,
};
pub use submission::{Submission, ValidationError};
