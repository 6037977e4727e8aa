//! SurrealDB implementation of [`VerificationCodeRepository`].
//!
//! Codes are keyed by email so issuing a new code replaces the old
//! one. Expired codes never match; they are overwritten by the next
//! issue or dropped by [`revoke`](VerificationCodeRepository::revoke).

use kefu_core::error::KefuResult;
use kefu_core::models::verification::StoreVerificationCode;
use kefu_core::repository::VerificationCodeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MatchRow {
    #[allow(dead_code)]
    email: String,
}

/// SurrealDB implementation of the verification code store.
#[derive(Clone)]
pub struct SurrealVerificationCodeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealVerificationCodeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> VerificationCodeRepository for SurrealVerificationCodeRepository<C> {
    async fn store(&self, input: StoreVerificationCode) -> KefuResult<()> {
        self.db
            .query(
                "UPSERT type::record('verification_code', $email) SET \
                 email = $email, code_hash = $code_hash, \
                 expires_at = $expires_at, created_at = time::now()",
            )
            .bind(("email", input.email))
            .bind(("code_hash", input.code_hash))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("verification_code", e))?;

        Ok(())
    }

    async fn matches(&self, email: &str, code_hash: &str) -> KefuResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT email FROM type::record('verification_code', $email) \
                 WHERE code_hash = $code_hash AND expires_at > time::now()",
            )
            .bind(("email", email.to_string()))
            .bind(("code_hash", code_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MatchRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn revoke(&self, email: &str) -> KefuResult<()> {
        self.db
            .query("DELETE type::record('verification_code', $email)")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
