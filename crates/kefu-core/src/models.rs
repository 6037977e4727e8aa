//! Domain models for kefu.

pub mod community;
pub mod user;
pub mod verification;
