//! Error types shared by every kefu crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KefuError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    /// The remote identity service could not be reached or answered
    /// with something other than a well-formed envelope.
    #[error("Remote identity service unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote identity service answered, but with a non-zero
    /// application error code.
    #[error("Remote identity service rejected the request ({code}): {message}")]
    RemoteRejected { code: i64, message: String },
}

pub type KefuResult<T> = Result<T, KefuError>;
