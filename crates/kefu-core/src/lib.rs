//! Kefu Core: domain models, errors and the collaborator traits the
//! provisioning and authentication workflows are written against.

pub mod error;
pub mod identity;
pub mod models;
pub mod repository;
