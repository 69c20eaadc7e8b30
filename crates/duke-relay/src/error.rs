//! Workflow error types

use std::fmt;

use duke_relay_core::StoreError;
use duke_relay_csv::CsvError;
use duke_relay_google::AuthError;
use thiserror::Error;

use crate::transform::TransformError;

/// Result type for workflow operations
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

/// The step of a workflow operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Lookup,
    Download,
    Read,
    Write,
    Upload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Lookup => "lookup",
            Step::Download => "download",
            Step::Read => "read",
            Step::Write => "write",
            Step::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`Workflow`](crate::Workflow)
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Credentials could not be loaded
    #[error("Credential error: {0}")]
    Auth(#[from] AuthError),

    /// A name lookup matched no file
    #[error("File '{0}' not found")]
    FileNotFound(String),

    /// A store call failed
    #[error("{step} step failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: StoreError,
    },

    /// The transform rejected the downloaded file
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    /// The staging directory could not be created or written
    #[error("Staging error: {0}")]
    Staging(#[source] std::io::Error),

    /// Rows could not be serialized for export
    #[error("Export error: {0}")]
    Export(#[from] CsvError),
}

impl WorkflowError {
    /// The failed step, if this is a store failure
    pub fn step(&self) -> Option<Step> {
        match self {
            WorkflowError::Step { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Tag a store result with the step it belongs to
pub(crate) trait StepContext<T> {
    fn step(self, step: Step) -> WorkflowResult<T>;
}

impl<T> StepContext<T> for Result<T, StoreError> {
    fn step(self, step: Step) -> WorkflowResult<T> {
        self.map_err(|source| WorkflowError::Step { step, source })
    }
}
