//! Email verification codes for administrator onboarding.
//!
//! Delivery is someone else's job: [`VerificationService::issue_code`]
//! hands the plaintext code back to the caller and only its digest is
//! stored.

use chrono::{Duration, Utc};
use kefu_core::models::verification::StoreVerificationCode;
use kefu_core::repository::VerificationCodeRepository;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// SHA-256 of an (email, code) pair, hex-encoded.
pub fn hash_code(email: &str, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random 6-digit numeric code.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

pub struct VerificationService<V: VerificationCodeRepository> {
    repo: V,
    lifetime_secs: u64,
}

impl<V: VerificationCodeRepository> VerificationService<V> {
    pub fn new(repo: V, config: &AuthConfig) -> Self {
        Self {
            repo,
            lifetime_secs: config.verification_code_lifetime_secs,
        }
    }

    /// Issue a fresh code for `email`, replacing any pending one.
    #[instrument(skip(self))]
    pub async fn issue_code(&self, email: &str) -> AuthResult<String> {
        let code = generate_code();
        let lifetime = i64::try_from(self.lifetime_secs)
            .map_err(|_| AuthError::InvalidInput("code lifetime out of range".into()))?;

        self.repo
            .store(StoreVerificationCode {
                email: email.to_string(),
                code_hash: hash_code(email, &code),
                expires_at: Utc::now() + Duration::seconds(lifetime),
            })
            .await
            .map_err(AuthError::Persistence)?;

        debug!("Verification code issued");
        Ok(code)
    }

    /// Whether `code` is the pending, unexpired code for `email`.
    #[instrument(skip(self, code))]
    pub async fn check_code(&self, email: &str, code: &str) -> AuthResult<bool> {
        self.repo
            .matches(email, &hash_code(email, code))
            .await
            .map_err(AuthError::Persistence)
    }

    /// Drop the pending code for `email`. Failures are logged only.
    pub async fn revoke(&self, email: &str) {
        if let Err(e) = self.repo.revoke(email).await {
            warn!(error = %e, "Failed to revoke verification code");
        }
    }
}
