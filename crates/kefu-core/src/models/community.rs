//! Community domain model.
//!
//! A community is the tenant an administrator and its staff belong to.
//! It must exist before any account referencing it is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    /// Store-assigned numeric identifier.
    pub id: u64,
    pub name: String,
    /// Contact address for the community.
    pub email: String,
    pub avatar: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Descriptor used to create a community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommunity {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub description: Option<String>,
}
