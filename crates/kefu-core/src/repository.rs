//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations live in
//! `kefu-db`; workflows only ever see these traits.

use uuid::Uuid;

use crate::error::KefuResult;
use crate::models::{
    community::{Community, CreateCommunity},
    user::{CreateUser, User},
    verification::StoreVerificationCode,
};

pub trait CommunityRepository: Send + Sync {
    fn create(&self, input: CreateCommunity)
    -> impl Future<Output = KefuResult<Community>> + Send;
    /// Resolve a community by its store-assigned id. Staff onboarding
    /// takes the id on trust, so callers use this to reject unknown
    /// communities before provisioning.
    fn get_by_id(&self, id: u64) -> impl Future<Output = KefuResult<Community>> + Send;
}

/// The credential store.
///
/// Email is unique across the whole store. `create` must fail with
/// [`KefuError::AlreadyExists`](crate::error::KefuError::AlreadyExists)
/// when the email is taken, including when two creates race.
pub trait UserRepository: Send + Sync {
    /// Persist a new account and return its store-assigned `row_id`.
    fn create(&self, input: CreateUser) -> impl Future<Output = KefuResult<u64>> + Send;
    fn get_by_uuid(&self, uuid: Uuid) -> impl Future<Output = KefuResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = KefuResult<User>> + Send;
    /// Hard delete. Used to compensate a failed remote registration.
    fn delete(&self, row_id: u64) -> impl Future<Output = KefuResult<()>> + Send;
}

pub trait VerificationCodeRepository: Send + Sync {
    /// Store a code, replacing any pending code for the same email.
    fn store(&self, input: StoreVerificationCode) -> impl Future<Output = KefuResult<()>> + Send;
    /// Whether an unexpired code with `code_hash` is pending for `email`.
    /// Does not consume the code.
    fn matches(
        &self,
        email: &str,
        code_hash: &str,
    ) -> impl Future<Output = KefuResult<bool>> + Send;
    /// Drop any pending code for `email`.
    fn revoke(&self, email: &str) -> impl Future<Output = KefuResult<()>> + Send;
}
