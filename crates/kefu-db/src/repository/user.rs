//! SurrealDB implementation of [`UserRepository`].
//!
//! Records are keyed by the account uuid. `row_id` is drawn from the
//! `sys_user_row_seq` sequence inside the CREATE statement, so it is
//! assigned by the store and never reused even when a create fails.

use chrono::{DateTime, Utc};
use kefu_core::error::KefuResult;
use kefu_core::models::user::{CreateUser, User};
use kefu_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the uuid is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    row_id: u64,
    email: String,
    nickname: String,
    avatar: String,
    is_enabled: bool,
    password_hash: String,
    is_admin: bool,
    community_id: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// `row_id` returned by CREATE.
#[derive(Debug, SurrealValue)]
struct CreatedRow {
    row_id: u64,
}

/// DB-side row struct that includes the record key via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    row_id: u64,
    email: String,
    nickname: String,
    avatar: String,
    is_enabled: bool,
    password_hash: String,
    is_admin: bool,
    community_id: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, uuid: Uuid) -> User {
        User {
            row_id: self.row_id,
            uuid,
            email: self.email,
            nickname: self.nickname,
            avatar: self.avatar,
            is_enabled: self.is_enabled,
            password_hash: self.password_hash,
            is_admin: self.is_admin,
            community_id: self.community_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let uuid = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::InvalidRow(format!("invalid user UUID: {e}")))?;
        Ok(User {
            row_id: self.row_id,
            uuid,
            email: self.email,
            nickname: self.nickname,
            avatar: self.avatar,
            is_enabled: self.is_enabled,
            password_hash: self.password_hash,
            is_admin: self.is_admin,
            community_id: self.community_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the credential store.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> KefuResult<u64> {
        let id_str = input.uuid.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('sys_user', $id) SET \
                 row_id = sequence::nextval('sys_user_row_seq'), \
                 email = $email, nickname = $nickname, \
                 avatar = $avatar, is_enabled = $is_enabled, \
                 password_hash = $password_hash, \
                 is_admin = $is_admin, \
                 community_id = $community_id \
                 RETURN row_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("nickname", input.nickname))
            .bind(("avatar", input.avatar))
            .bind(("is_enabled", input.is_enabled))
            .bind(("password_hash", input.password_hash))
            .bind(("is_admin", input.is_admin))
            .bind(("community_id", input.community_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("sys_user", e))?;

        let rows: Vec<CreatedRow> = result.take(0).map_err(DbError::from)?;
        let row_id = rows
            .into_iter()
            .next()
            .map(|row| row.row_id)
            .ok_or_else(|| DbError::Query("CREATE sys_user returned no record".into()))?;

        debug!(uuid = %id_str, row_id, "User row created");
        Ok(row_id)
    }

    async fn get_by_uuid(&self, uuid: Uuid) -> KefuResult<User> {
        let id_str = uuid.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('sys_user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "sys_user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(uuid))
    }

    async fn get_by_email(&self, email: &str) -> KefuResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM sys_user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "sys_user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn delete(&self, row_id: u64) -> KefuResult<()> {
        let mut result = self
            .db
            .query("DELETE sys_user WHERE row_id = $row_id RETURN BEFORE")
            .bind(("row_id", row_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "sys_user".into(),
                id: format!("row_id={row_id}"),
            }
            .into());
        }

        debug!(row_id, "User row deleted");
        Ok(())
    }
}
