//! SurrealDB repository implementations.

mod community;
mod user;
mod verification;

pub use community::SurrealCommunityRepository;
pub use user::SurrealUserRepository;
pub use verification::SurrealVerificationCodeRepository;
