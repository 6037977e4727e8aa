//! Authentication configuration.

/// Configuration for provisioning and login.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for session token signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for session token verification.
    pub jwt_public_key_pem: String,
    /// Session token lifetime in seconds (default: 604_800 = 7 days).
    pub session_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length accepted at registration.
    pub min_password_length: usize,
    /// Verification code lifetime in seconds (default: 300 = 5 minutes).
    pub verification_code_lifetime_secs: u64,
    /// Platform id sent when fetching the remote access token.
    pub platform_id: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            session_token_lifetime_secs: 604_800,
            jwt_issuer: "kefu".into(),
            pepper: None,
            min_password_length: 1,
            verification_code_lifetime_secs: 300,
            platform_id: 5,
        }
    }
}
