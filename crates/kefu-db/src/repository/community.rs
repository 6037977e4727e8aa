//! SurrealDB implementation of [`CommunityRepository`].

use chrono::{DateTime, Utc};
use kefu_core::error::KefuResult;
use kefu_core::models::community::{Community, CreateCommunity};
use kefu_core::repository::CommunityRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CommunityRow {
    community_id: u64,
    name: String,
    email: String,
    avatar: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommunityRow> for Community {
    fn from(row: CommunityRow) -> Self {
        Community {
            id: row.community_id,
            name: row.name,
            email: row.email,
            avatar: row.avatar,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SurrealDB implementation of the Community repository.
#[derive(Clone)]
pub struct SurrealCommunityRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCommunityRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CommunityRepository for SurrealCommunityRepository<C> {
    async fn create(&self, input: CreateCommunity) -> KefuResult<Community> {
        let result = self
            .db
            .query(
                "CREATE community SET \
                 community_id = sequence::nextval('community_id_seq'), \
                 name = $name, email = $email, \
                 avatar = $avatar, description = $description",
            )
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("avatar", input.avatar.unwrap_or_default()))
            .bind(("description", input.description.unwrap_or_default()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("community", e))?;

        let rows: Vec<CommunityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DbError::Query("CREATE community returned no record".into())
        })?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: u64) -> KefuResult<Community> {
        let mut result = self
            .db
            .query("SELECT * FROM community WHERE community_id = $id")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CommunityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "community".into(),
            id: id.to_string(),
        })?;

        Ok(row.into())
    }
}
