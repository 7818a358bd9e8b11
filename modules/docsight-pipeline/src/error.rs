use std::fmt;
use std::path::PathBuf;

use docsight_client::ClientError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Extraction,
    Generation,
    Speech,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStep::Extraction => "extraction",
            PipelineStep::Generation => "generation",
            PipelineStep::Speech => "speech synthesis",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Truncated read: {declared} bytes declared, {read} bytes read")]
    Truncated { declared: u64, read: u64 },

    #[error("File is larger than its declared {declared} bytes")]
    Oversized { declared: u64 },

    #[error("Invalid base64 content: {0}")]
    InvalidBase64(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File size {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("File is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Upload rejected: {0}")]
    UploadRejected(#[from] UploadRejection),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("{step} failed: {source}")]
    Service {
        step: PipelineStep,
        #[source]
        source: ClientError,
    },
}

impl PipelineError {
    pub fn service(step: PipelineStep) -> impl FnOnce(ClientError) -> Self {
        move |source| PipelineError::Service { step, source }
    }

    /// Step that failed, for service errors.
    pub fn step(&self) -> Option<PipelineStep> {
        match self {
            PipelineError::Service { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// HTTP status reported by a collaborator, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PipelineError::Service { source, .. } => source.status(),
            _ => None,
        }
    }
}
