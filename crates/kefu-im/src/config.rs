//! Remote identity service configuration.

use std::time::Duration;

/// Connection settings for the remote identity service.
///
/// Passed to [`ImClient`](crate::ImClient) at construction; the client
/// never reads configuration from anywhere else.
#[derive(Debug, Clone)]
pub struct ImConfig {
    /// Host or IP of the API gateway.
    pub ip: String,
    pub api_port: u16,
    /// Shared secret sent with every administrative call.
    pub secret: String,
    /// Optional per-request timeout. `None` leaves calls unbounded so
    /// callers can bound them externally.
    pub request_timeout: Option<Duration>,
}

impl Default for ImConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".into(),
            api_port: 10002,
            secret: String::new(),
            request_timeout: None,
        }
    }
}

impl ImConfig {
    /// Base URL of the API. Plain HTTP; TLS is terminated in front of
    /// the service.
    pub fn base_url(&self) -> String {
        if self.ip.contains(':') {
            format!("http://[{}]:{}", self.ip, self.api_port)
        } else {
            format!("http://{}:{}", self.ip, self.api_port)
        }
    }
}
