//! Kefu Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - The migrated store and its repositories ([`Store`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Implementations of the `kefu-core` repository traits
//!   ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, Store};
pub use error::DbError;
pub use schema::run_migrations;
