//! Kefu Auth: account provisioning and login.
//!
//! Provisioning writes the local account first and registers it with
//! the remote identity service second, deleting the local row again if
//! the remote step fails. Login issues a local session token and
//! fetches a remote access token, returning both or neither.

pub mod config;
pub mod error;
pub mod password;
pub mod provisioning;
pub mod service;
pub mod token;
pub mod verification;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use provisioning::{
    AccountProfile, AdminRegistration, ProvisionedAccount, ProvisioningService, StaffRegistration,
};
pub use service::{AuthService, LoginInput, LoginResult};
pub use token::{SessionClaims, SessionToken};
pub use verification::VerificationService;
