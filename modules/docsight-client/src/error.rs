use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A required field was missing; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Remote service error (status {status}): {body}")]
    Remote { status: u16, body: String },

    /// A success response did not carry the expected fields.
    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),
}

impl ClientError {
    /// HTTP status for remote failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}
