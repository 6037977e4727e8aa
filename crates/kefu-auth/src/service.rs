//! Authentication service: email/password login issuing a local
//! session token and a remote access token.

use kefu_core::error::KefuError;
use kefu_core::identity::{IdentityService, RemoteToken};
use kefu_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::token::{self, SessionClaims, SessionToken};

/// Input for the login flow.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login: both tokens, or nothing.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub uuid: Uuid,
    /// Local session token.
    pub kf_token: SessionToken,
    /// Token issued by the remote identity service.
    pub im_token: RemoteToken,
}

const DUMMY_PASSWORD: &str = "kefu-timing-equalizer";

/// Hash verified against when the email is unknown, so a miss costs
/// the same as a wrong password. Peppered like every stored hash.
fn dummy_hash(pepper: Option<&str>) -> Option<String> {
    match password::hash_password(DUMMY_PASSWORD, pepper) {
        Ok(hash) => Some(hash),
        Err(e) => {
            warn!(error = %e, "Could not prepare dummy password hash");
            None
        }
    }
}

/// Authentication service.
///
/// Generic over the credential store and identity service so the auth
/// layer has no dependency on the database or HTTP crates.
pub struct AuthService<U: UserRepository, I: IdentityService> {
    users: U,
    identity: I,
    config: AuthConfig,
    dummy_hash: Option<String>,
}

impl<U: UserRepository, I: IdentityService> AuthService<U, I> {
    pub fn new(users: U, identity: I, config: AuthConfig) -> Self {
        Self {
            dummy_hash: dummy_hash(config.pepper.as_deref()),
            users,
            identity,
            config,
        }
    }

    /// Log in with email and password.
    ///
    /// Nothing is mutated, so a failure at any step simply returns the
    /// error; a session token issued before a failed remote fetch is
    /// discarded.
    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> AuthResult<LoginResult> {
        // 1. Look up the account.
        let user = match self.users.get_by_email(&input.email).await {
            Ok(u) => u,
            Err(KefuError::NotFound { .. }) => {
                if let Some(hash) = &self.dummy_hash {
                    let _ = password::verify_password(
                        &input.password,
                        hash,
                        self.config.pepper.as_deref(),
                    );
                }
                warn!("Login for unknown email");
                return Err(AuthError::NotFound);
            }
            Err(e) => return Err(AuthError::Persistence(e)),
        };

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(uuid = %user.uuid, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_enabled {
            warn!(uuid = %user.uuid, "Login to disabled account");
            return Err(AuthError::AccountDisabled);
        }

        // 3. Local session token.
        let kf_token = token::issue_session_token(user.uuid, user.community_id, &self.config)?;

        // 4. Remote access token.
        let im_token = self
            .identity
            .user_token(&user.uuid.to_string(), self.config.platform_id)
            .await
            .map_err(|e| {
                warn!(uuid = %user.uuid, error = %e, "Remote token fetch failed");
                AuthError::RemoteAuth(e)
            })?;

        info!(uuid = %user.uuid, community_id = user.community_id, "Login succeeded");

        // 5. Compose.
        Ok(LoginResult {
            uuid: user.uuid,
            kf_token,
            im_token,
        })
    }

    /// Verify a session token previously issued by [`login`](Self::login).
    pub fn validate(&self, token: &str) -> AuthResult<SessionClaims> {
        token::validate_session_token(token, &self.config)
    }
}
