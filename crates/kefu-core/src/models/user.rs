//! User account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A locally stored administrator or staff account.
///
/// `uuid` is the only identifier shared with the remote identity
/// service; `row_id` is assigned by the store and only used locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub row_id: u64,
    pub uuid: Uuid,
    pub email: String,
    pub nickname: String,
    pub avatar: String,
    pub is_enabled: bool,
    /// Argon2id PHC string. Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub community_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to persist a new account.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub uuid: Uuid,
    pub email: String,
    pub nickname: String,
    pub avatar: String,
    pub is_enabled: bool,
    /// Already hashed by the caller.
    pub password_hash: String,
    pub is_admin: bool,
    pub community_id: u64,
}
