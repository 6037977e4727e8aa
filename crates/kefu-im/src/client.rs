//! Remote identity service client.
//!
//! Every call is a JSON POST answered by an `{errCode, errMsg, errDlt}`
//! envelope. A non-zero `errCode` is a failure even when the HTTP
//! exchange itself succeeded. The client never retries.

use kefu_core::error::KefuResult;
use kefu_core::identity::{IdentityService, RemoteToken, RemoteUser};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::config::ImConfig;
use crate::error::ImError;
use crate::types::{ApiResponse, ApiUser, RegisterUserRequest, TokenData, UserTokenRequest};

const REGISTER_USER_PATH: &str = "/user/user_register";
const USER_TOKEN_PATH: &str = "/auth/user_token";

/// HTTP client for the remote identity service.
#[derive(Debug, Clone)]
pub struct ImClient {
    http_client: Client,
    base_url: String,
    secret: String,
}

impl ImClient {
    pub fn new(config: &ImConfig) -> Result<Self, ImError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.base_url(),
            secret: config.secret.clone(),
        })
    }

    /// Sets a custom base URL (useful for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Register users with the remote service.
    #[instrument(skip(self, users), fields(count = users.len()))]
    pub async fn register_users(&self, users: Vec<RemoteUser>) -> Result<(), ImError> {
        let body = RegisterUserRequest {
            secret: &self.secret,
            users: users
                .into_iter()
                .map(|u| ApiUser {
                    user_id: u.user_id,
                    nickname: u.nickname,
                    face_url: u.face_url,
                })
                .collect(),
        };

        self.post::<_, serde_json::Value>(REGISTER_USER_PATH, &body)
            .await?;
        Ok(())
    }

    /// Fetch an access token for `user_id` on `platform_id`.
    #[instrument(skip(self))]
    pub async fn user_token(&self, user_id: &str, platform_id: u32) -> Result<RemoteToken, ImError> {
        let body = UserTokenRequest {
            secret: &self.secret,
            platform_id,
            user_id,
        };

        let data: TokenData = self
            .post(USER_TOKEN_PATH, &body)
            .await?
            .ok_or_else(|| ImError::InvalidResponse("token response has no data".into()))?;

        if data.expire_time_seconds <= 0 {
            return Err(ImError::InvalidResponse(format!(
                "token expiry must be positive, got {}",
                data.expire_time_seconds
            )));
        }

        Ok(RemoteToken {
            token: data.token,
            expire_time_seconds: data.expire_time_seconds,
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>, ImError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let operation_id = Uuid::new_v4().to_string();
        debug!(%url, %operation_id, "Calling identity service");

        let response = self
            .http_client
            .post(&url)
            .header("operationID", &operation_id)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, %url, "Identity service unreachable");
                ImError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %url, "Identity service returned HTTP error");
            return Err(ImError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&text)
            .map_err(|e| ImError::InvalidResponse(format!("JSON parse error: {e}")))?;

        if envelope.err_code != 0 {
            warn!(
                code = envelope.err_code,
                message = %envelope.err_msg,
                detail = %envelope.err_dlt,
                %operation_id,
                "Identity service rejected request"
            );
            return Err(ImError::Api {
                code: envelope.err_code,
                message: envelope.err_msg,
            });
        }

        Ok(envelope.data)
    }
}

impl IdentityService for ImClient {
    async fn register_users(&self, users: Vec<RemoteUser>) -> KefuResult<()> {
        Ok(ImClient::register_users(self, users).await?)
    }

    async fn user_token(&self, user_id: &str, platform_id: u32) -> KefuResult<RemoteToken> {
        Ok(ImClient::user_token(self, user_id, platform_id).await?)
    }
}
