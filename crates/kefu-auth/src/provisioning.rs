//! Account provisioning: local write, remote registration and
//! compensation.
//!
//! There is no transaction spanning the local store and the remote
//! identity service. The local row is written first because it can be
//! deleted again; the remote registration has no undo from this side.
//! If the remote step fails the local row is removed ([`compensate`]),
//! so a remote registration never exists without its local row. The
//! window between the two writes is visible to concurrent readers.
//!
//! [`compensate`]: ProvisioningService::compensate

use kefu_core::error::KefuResult;
use kefu_core::identity::{IdentityService, RemoteUser};
use kefu_core::models::community::CreateCommunity;
use kefu_core::models::user::{CreateUser, User};
use kefu_core::repository::{CommunityRepository, UserRepository, VerificationCodeRepository};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::verification::VerificationService;

/// Profile of the account being created.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub email: String,
    pub nickname: String,
    pub avatar: Option<String>,
    /// Plaintext; hashed before it reaches the store.
    pub password: String,
}

/// Administrator onboarding: creates a community and its first admin.
#[derive(Debug, Clone)]
pub struct AdminRegistration {
    /// Verification code previously issued for `profile.email`.
    pub code: String,
    pub community: CreateCommunity,
    pub profile: AccountProfile,
}

/// Staff onboarding into an existing community.
#[derive(Debug, Clone)]
pub struct StaffRegistration {
    /// Assumed to exist; not checked.
    pub community_id: u64,
    pub profile: AccountProfile,
}

/// A fully provisioned account: stored locally and registered remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProvisionedAccount {
    pub uuid: Uuid,
    pub row_id: u64,
}

pub struct ProvisioningService<U, C, V, I>
where
    U: UserRepository,
    C: CommunityRepository,
    V: VerificationCodeRepository,
    I: IdentityService,
{
    users: U,
    communities: C,
    codes: VerificationService<V>,
    identity: I,
    config: AuthConfig,
}

impl<U, C, V, I> ProvisioningService<U, C, V, I>
where
    U: UserRepository,
    C: CommunityRepository,
    V: VerificationCodeRepository,
    I: IdentityService,
{
    pub fn new(users: U, communities: C, codes: V, identity: I, config: AuthConfig) -> Self {
        Self {
            codes: VerificationService::new(codes, &config),
            users,
            communities,
            identity,
            config,
        }
    }

    /// Create a community and its administrator.
    ///
    /// Nothing is written unless the verification code matches.
    #[instrument(skip_all, fields(email = %input.profile.email))]
    pub async fn create_admin(&self, input: AdminRegistration) -> AuthResult<ProvisionedAccount> {
        self.validate(&input.profile)?;

        if !self
            .codes
            .check_code(&input.profile.email, &input.code)
            .await?
        {
            warn!("Rejected admin registration with invalid verification code");
            return Err(AuthError::InvalidCode);
        }

        let community = self
            .communities
            .create(input.community)
            .await
            .map_err(AuthError::CommunityCreationFailed)?;
        info!(community_id = community.id, "Community created");

        let account = self.provision(input.profile.clone(), community.id, true).await?;
        self.codes.revoke(&input.profile.email).await;

        Ok(account)
    }

    /// Create a staff account in an existing community.
    #[instrument(skip_all, fields(email = %input.profile.email, community_id = input.community_id))]
    pub async fn create_staff(&self, input: StaffRegistration) -> AuthResult<ProvisionedAccount> {
        self.validate(&input.profile)?;
        self.provision(input.profile, input.community_id, false)
            .await
    }

    async fn provision(
        &self,
        profile: AccountProfile,
        community_id: u64,
        is_admin: bool,
    ) -> AuthResult<ProvisionedAccount> {
        // The uuid is fixed before anything leaves this process.
        let uuid = Uuid::new_v4();
        let password_hash = password::hash_password(&profile.password, self.config.pepper.as_deref())?;
        let email = profile.email.clone();

        let row_id = self
            .users
            .create(CreateUser {
                uuid,
                email: profile.email,
                nickname: profile.nickname,
                avatar: profile.avatar.unwrap_or_default(),
                is_enabled: true,
                password_hash,
                is_admin,
                community_id,
            })
            .await
            .map_err(AuthError::Persistence)?;

        let account = match self.users.get_by_uuid(uuid).await {
            Ok(account) => account,
            Err(e) => {
                // Nothing was sent remotely yet; the row must not outlive this call.
                error!(%uuid, row_id, error = %e, "Created account could not be read back");
                self.discard(uuid, row_id, &email).await;
                return Err(AuthError::Persistence(e));
            }
        };

        if let Err(e) = self.register_remote(&account).await {
            warn!(%uuid, row_id = account.row_id, error = %e, "Remote registration failed");
            let compensated = self.compensate(&account).await;
            return Err(AuthError::RemoteRegistrationFailed {
                uuid,
                row_id: account.row_id,
                compensated,
                source: e,
            });
        }

        info!(%uuid, row_id = account.row_id, is_admin, "Account provisioned");
        Ok(ProvisionedAccount {
            uuid,
            row_id: account.row_id,
        })
    }

    /// Register `account` with the remote identity service.
    pub async fn register_remote(&self, account: &User) -> KefuResult<()> {
        self.identity
            .register_users(vec![RemoteUser {
                user_id: account.uuid.to_string(),
                nickname: account.nickname.clone(),
                // Avatars are served locally, never by the remote service.
                face_url: String::new(),
            }])
            .await
    }

    /// Undo the local write for an account whose remote registration
    /// failed. Best-effort: returns whether the row is gone. A `false`
    /// leaves an orphaned local row, logged for reconciliation.
    pub async fn compensate(&self, account: &User) -> bool {
        self.discard(account.uuid, account.row_id, &account.email)
            .await
    }

    async fn discard(&self, uuid: Uuid, row_id: u64, email: &str) -> bool {
        match self.users.delete(row_id).await {
            Ok(()) => {
                info!(%uuid, row_id, "Compensated local account");
                true
            }
            Err(e) => {
                error!(
                    %uuid,
                    row_id,
                    %email,
                    error = %e,
                    "Compensation failed; local account has no remote registration"
                );
                false
            }
        }
    }

    fn validate(&self, profile: &AccountProfile) -> AuthResult<()> {
        let email = profile.email.trim();
        if email.is_empty() || !email.contains('@') || email != profile.email {
            return Err(AuthError::InvalidInput(format!(
                "invalid email address: {:?}",
                profile.email
            )));
        }
        if profile.nickname.trim().is_empty() {
            return Err(AuthError::InvalidInput("nickname must not be empty".into()));
        }
        if profile.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(())
    }
}
