//! The remote identity service seam.
//!
//! The remote messaging platform keeps its own registry of users keyed
//! by the local account uuid and issues its own access tokens. A reply
//! that arrives over the wire but carries a non-zero application code
//! is a failure and must surface as
//! [`KefuError::RemoteRejected`](crate::error::KefuError::RemoteRejected).

use serde::{Deserialize, Serialize};

use crate::error::KefuResult;

/// A user as registered with the remote identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub user_id: String,
    pub nickname: String,
    pub face_url: String,
}

/// An access token issued by the remote identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteToken {
    pub token: String,
    pub expire_time_seconds: i64,
}

pub trait IdentityService: Send + Sync {
    fn register_users(&self, users: Vec<RemoteUser>)
    -> impl Future<Output = KefuResult<()>> + Send;
    fn user_token(
        &self,
        user_id: &str,
        platform_id: u32,
    ) -> impl Future<Output = KefuResult<RemoteToken>> + Send;
}
