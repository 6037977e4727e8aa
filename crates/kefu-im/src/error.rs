//! Remote identity client errors.

use kefu_core::error::KefuError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Well-formed reply carrying a non-zero application code.
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },
}

impl From<ImError> for KefuError {
    fn from(err: ImError) -> Self {
        match err {
            ImError::Api { code, message } => KefuError::RemoteRejected { code, message },
            other => KefuError::RemoteUnavailable(other.to_string()),
        }
    }
}
