//! Database migration runner
//!
//! Migrations live in the `migrations/` directory at the workspace root and
//! are embedded into the binary at compile time. Each migration is
//! reversible:
//! - `{timestamp}_{name}.up.sql` - applied by [`run_migrations`]
//! - `{timestamp}_{name}.down.sql` - applied by [`revert_last_migration`]
//!
//! # Example
//!
//! ```no_run
//! use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
//! use taskhub_shared::db::migrations::{run_migrations, get_migration_status};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     })
//!     .await?;
//!
//!     run_migrations(&pool).await?;
//!
//!     let status = get_migration_status(&pool).await?;
//!     println!("Applied {} migrations", status.applied_migrations);
//!     Ok(())
//! }
//! ```

use sqlx::{migrate::Migrator, sqlite::SqlitePool};
use tracing::{debug, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,

    /// Number of migrations embedded in this build
    pub known_migrations: usize,

    /// Whether every embedded migration has been applied
    pub is_up_to_date: bool,
}

/// Runs all pending database migrations
///
/// Each migration runs in its own transaction; a failing migration is rolled
/// back and the error returned. Running this against an up-to-date database
/// is a no-op.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Reverts the most recently applied migration
///
/// Development helper; it runs the matching `.down.sql` script.
pub async fn revert_last_migration(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    let status = get_migration_status(pool)
        .await
        .map_err(sqlx::migrate::MigrateError::Execute)?;

    let Some(latest) = status.latest_version else {
        debug!("No applied migrations to revert");
        return Ok(());
    };

    // Undo everything newer than the migration just before `latest`
    let target = MIGRATOR
        .iter()
        .map(|m| m.version)
        .filter(|v| *v < latest)
        .max()
        .unwrap_or(0);

    warn!(from = latest, to = target, "Reverting database migration");
    MIGRATOR.undo(pool, target).await
}

/// Gets the current migration status
///
/// Reads the `_sqlx_migrations` bookkeeping table; a database that has never
/// been migrated reports zero applied migrations.
pub async fn get_migration_status(pool: &SqlitePool) -> Result<MigrationStatus, sqlx::Error> {
    debug!("Checking migration status");

    let known_migrations = MIGRATOR.iter().filter(|m| m.migration_type.is_up_migration()).count();

    let table_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    if table_count == 0 {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied_migrations: 0,
            latest_version: None,
            known_migrations,
            is_up_to_date: known_migrations == 0,
        });
    }

    let (count, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = 1",
    )
    .fetch_one(pool)
    .await?;

    debug!(
        applied_migrations = count,
        latest_version = ?latest_version,
        "Migration status retrieved"
    );

    Ok(MigrationStatus {
        applied_migrations: count as usize,
        latest_version,
        known_migrations,
        is_up_to_date: count as usize >= known_migrations,
    })
}
