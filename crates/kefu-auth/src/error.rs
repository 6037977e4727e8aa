//! Provisioning and authentication error types.

use kefu_core::error::KefuError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("verification code is not valid")]
    InvalidCode,

    #[error("community creation failed: {0}")]
    CommunityCreationFailed(#[source] KefuError),

    #[error("persistence error: {0}")]
    Persistence(#[source] KefuError),

    /// The local row was written but the remote registration failed.
    /// `compensated` is false when the local row could not be removed
    /// again and is now orphaned.
    #[error("remote registration failed for {uuid}: {source}")]
    RemoteRegistrationFailed {
        uuid: Uuid,
        row_id: u64,
        compensated: bool,
        #[source]
        source: KefuError,
    },

    #[error("account not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("remote authentication failed: {0}")]
    RemoteAuth(#[source] KefuError),

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<AuthError> for KefuError {
    fn from(err: AuthError) -> Self {
        match err {
            // Unknown email and wrong password look the same from outside.
            AuthError::NotFound | AuthError::InvalidCredentials => {
                KefuError::AuthenticationFailed {
                    reason: AuthError::InvalidCredentials.to_string(),
                }
            }
            AuthError::AccountDisabled | AuthError::TokenExpired | AuthError::TokenInvalid(_) => {
                KefuError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::InvalidInput(_) | AuthError::InvalidCode => KefuError::Validation {
                message: err.to_string(),
            },
            AuthError::CommunityCreationFailed(source)
            | AuthError::Persistence(source)
            | AuthError::RemoteRegistrationFailed { source, .. }
            | AuthError::RemoteAuth(source) => source,
            AuthError::TokenIssuance(msg) | AuthError::Crypto(msg) => KefuError::Crypto(msg),
        }
    }
}
