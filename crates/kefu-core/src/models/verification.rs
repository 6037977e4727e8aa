//! Email verification code model.

use chrono::{DateTime, Utc};

/// A pending verification code for one email address.
///
/// Only the SHA-256 digest of the code is stored.
#[derive(Debug, Clone)]
pub struct StoreVerificationCode {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}
