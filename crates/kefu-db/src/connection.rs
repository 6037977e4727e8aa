//! The kefu store: one SurrealDB handle with the schema applied, from
//! which the account, community and verification-code repositories are
//! handed out.

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealCommunityRepository, SurrealUserRepository, SurrealVerificationCodeRepository,
};
use crate::schema::run_migrations;

/// Where the kefu store lives.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address, `host:port`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "kefu".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A migrated kefu database.
///
/// Every repository handed out shares the same underlying connection.
#[derive(Clone)]
pub struct Store<C: Connection> {
    db: Surreal<C>,
}

impl Store<Client> {
    /// Connect over WebSocket as root, select the configured namespace
    /// and database, and bring the schema up to date.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to kefu store"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        Self::open(db).await
    }
}

impl<C: Connection> Store<C> {
    /// Wrap an already selected namespace/database, applying any
    /// pending migrations first.
    pub async fn open(db: Surreal<C>) -> Result<Self, DbError> {
        run_migrations(&db).await?;
        info!("Kefu store ready");
        Ok(Self { db })
    }

    /// Credential store for administrator and staff accounts.
    pub fn users(&self) -> SurrealUserRepository<C> {
        SurrealUserRepository::new(self.db.clone())
    }

    pub fn communities(&self) -> SurrealCommunityRepository<C> {
        SurrealCommunityRepository::new(self.db.clone())
    }

    pub fn verification_codes(&self) -> SurrealVerificationCodeRepository<C> {
        SurrealVerificationCodeRepository::new(self.db.clone())
    }
}
