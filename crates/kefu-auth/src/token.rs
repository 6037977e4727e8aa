//! Session token issuance and verification.
//!
//! Session tokens are EdDSA (Ed25519) JWTs bound to a user uuid and a
//! community id. They are stateless: verification needs only the public
//! key, never a store lookup.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user uuid.
    pub sub: String,
    pub community_id: u64,
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// A signed session token and its lifetime in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    pub expire_time_seconds: i64,
}

/// Issue a signed session token for `user_id` in `community_id`.
pub fn issue_session_token(
    user_id: Uuid,
    community_id: u64,
    config: &AuthConfig,
) -> Result<SessionToken, AuthError> {
    let lifetime = i64::try_from(config.session_token_lifetime_secs)
        .map_err(|_| AuthError::TokenIssuance("token lifetime out of range".into()))?;
    if lifetime <= 0 {
        return Err(AuthError::TokenIssuance(
            "token lifetime must be positive".into(),
        ));
    }

    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        community_id,
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + lifetime,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_ed_pem(config.jwt_private_key_pem.as_bytes())
        .map_err(|e| AuthError::TokenIssuance(format!("bad private key: {e}")))?;

    let token = jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), &claims, &key)
        .map_err(|e| AuthError::TokenIssuance(format!("JWT encode: {e}")))?;

    Ok(SessionToken {
        token,
        expire_time_seconds: lifetime,
    })
}

/// Decode and verify a session token (signature, expiry, issuer).
pub fn validate_session_token(
    token: &str,
    config: &AuthConfig,
) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_ed_pem(config.jwt_public_key_pem.as_bytes())
        .map_err(|e| AuthError::Crypto(format!("bad public key: {e}")))?;

    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}
