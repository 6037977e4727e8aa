//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; numeric ids come from sequences so they are assigned by
//! the store and never reused.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Communities
-- =======================================================================
DEFINE SEQUENCE community_id_seq START 1;
DEFINE TABLE community SCHEMAFULL;
DEFINE FIELD community_id ON TABLE community TYPE int;
DEFINE FIELD name ON TABLE community TYPE string;
DEFINE FIELD email ON TABLE community TYPE string;
DEFINE FIELD avatar ON TABLE community TYPE string DEFAULT '';
DEFINE FIELD description ON TABLE community TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE community TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE community TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_community_id ON TABLE community \
    COLUMNS community_id UNIQUE;

-- =======================================================================
-- System users (administrators and staff)
-- =======================================================================
DEFINE SEQUENCE sys_user_row_seq START 1;
DEFINE TABLE sys_user SCHEMAFULL;
DEFINE FIELD row_id ON TABLE sys_user TYPE int;
DEFINE FIELD email ON TABLE sys_user TYPE string;
DEFINE FIELD nickname ON TABLE sys_user TYPE string;
DEFINE FIELD avatar ON TABLE sys_user TYPE string DEFAULT '';
DEFINE FIELD is_enabled ON TABLE sys_user TYPE bool DEFAULT true;
DEFINE FIELD password_hash ON TABLE sys_user TYPE string;
DEFINE FIELD is_admin ON TABLE sys_user TYPE bool DEFAULT false;
DEFINE FIELD community_id ON TABLE sys_user TYPE int;
DEFINE FIELD created_at ON TABLE sys_user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE sys_user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_sys_user_email ON TABLE sys_user \
    COLUMNS email UNIQUE;
DEFINE INDEX idx_sys_user_row_id ON TABLE sys_user \
    COLUMNS row_id UNIQUE;
DEFINE INDEX idx_sys_user_community ON TABLE sys_user \
    COLUMNS community_id;

-- =======================================================================
-- Verification codes (one pending code per email, keyed by email)
-- =======================================================================
DEFINE TABLE verification_code SCHEMAFULL;
DEFINE FIELD email ON TABLE verification_code TYPE string;
DEFINE FIELD code_hash ON TABLE verification_code TYPE string;
DEFINE FIELD expires_at ON TABLE verification_code TYPE datetime;
DEFINE FIELD created_at ON TABLE verification_code TYPE datetime \
    DEFAULT time::now();
";

/// Run all pending migrations against the given database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}
