//! Runtime settings.
//!
//! Loaded from an optional `kefu.toml` next to the binary and then from
//! `KEFU__<SECTION>__<KEY>` environment variables (a `.env` file is read
//! first). Each section maps onto the config struct of one library crate.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use config::{Config as Cfg, Environment, File};
use kefu_auth::AuthConfig;
use kefu_db::DbConfig;
use kefu_im::ImConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub im: ImSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let db = DbConfig::default();
        Self {
            url: db.url,
            namespace: db.namespace,
            database: db.database,
            username: db.username,
            password: db.password,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImSettings {
    pub ip: String,
    pub api_port: u16,
    pub secret: String,
    /// Platform the IM tokens are requested for.
    pub platform_id: u32,
    /// Seconds; unset means no client-side timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ImSettings {
    fn default() -> Self {
        let im = ImConfig::default();
        Self {
            ip: im.ip,
            api_port: im.api_port,
            secret: im.secret,
            platform_id: AuthConfig::default().platform_id,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Path to the PEM-encoded Ed25519 signing key.
    pub jwt_private_key_path: Option<PathBuf>,
    /// Path to the PEM-encoded Ed25519 verification key.
    pub jwt_public_key_path: Option<PathBuf>,
    pub session_token_lifetime_secs: u64,
    pub jwt_issuer: String,
    pub pepper: Option<String>,
    pub min_password_length: usize,
    pub verification_code_lifetime_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        let auth = AuthConfig::default();
        Self {
            jwt_private_key_path: None,
            jwt_public_key_path: None,
            session_token_lifetime_secs: auth.session_token_lifetime_secs,
            jwt_issuer: auth.jwt_issuer,
            pepper: auth.pepper,
            min_password_length: auth.min_password_length,
            verification_code_lifetime_secs: auth.verification_code_lifetime_secs,
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("kefu").required(false))
            .add_source(Environment::with_prefix("KEFU").separator("__"))
            .build()
            .context("failed to read settings")?;

        config
            .try_deserialize()
            .context("failed to parse settings")
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.database.url.clone(),
            namespace: self.database.namespace.clone(),
            database: self.database.database.clone(),
            username: self.database.username.clone(),
            password: self.database.password.clone(),
        }
    }

    pub fn im_config(&self) -> ImConfig {
        ImConfig {
            ip: self.im.ip.clone(),
            api_port: self.im.api_port,
            secret: self.im.secret.clone(),
            request_timeout: self.im.request_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Builds the auth config, reading the signing keys from disk.
    /// Missing key paths leave the keys empty; only commands that issue
    /// session tokens need them.
    pub fn auth_config(&self) -> anyhow::Result<AuthConfig> {
        Ok(AuthConfig {
            jwt_private_key_pem: read_key(self.auth.jwt_private_key_path.as_ref())?,
            jwt_public_key_pem: read_key(self.auth.jwt_public_key_path.as_ref())?,
            session_token_lifetime_secs: self.auth.session_token_lifetime_secs,
            jwt_issuer: self.auth.jwt_issuer.clone(),
            pepper: self.auth.pepper.clone(),
            min_password_length: self.auth.min_password_length,
            verification_code_lifetime_secs: self.auth.verification_code_lifetime_secs,
            platform_id: self.im.platform_id,
        })
    }
}

fn read_key(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display())),
        None => Ok(String::new()),
    }
}
