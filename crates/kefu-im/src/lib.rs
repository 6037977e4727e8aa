//! Kefu IM: HTTP client for the remote messaging/identity service.
//!
//! Registers kefu accounts with the remote service and fetches the
//! per-platform access tokens it issues.

pub mod client;
pub mod config;
pub mod error;
mod types;

pub use client::ImClient;
pub use config::ImConfig;
pub use error::ImError;
