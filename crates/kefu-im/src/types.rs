//! Wire types of the remote identity API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct ApiUser {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub nickname: String,
    #[serde(rename = "faceURL")]
    pub face_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterUserRequest<'a> {
    pub secret: &'a str,
    pub users: Vec<ApiUser>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserTokenRequest<'a> {
    pub secret: &'a str,
    #[serde(rename = "platformID")]
    pub platform_id: u32,
    #[serde(rename = "userID")]
    pub user_id: &'a str,
}

/// Envelope shared by every response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiResponse<T> {
    pub err_code: i64,
    #[serde(default)]
    pub err_msg: String,
    #[serde(default)]
    pub err_dlt: String,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenData {
    pub token: String,
    pub expire_time_seconds: i64,
}
