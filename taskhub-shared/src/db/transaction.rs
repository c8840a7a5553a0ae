//! Write transactions
//!
//! `Pool::begin` issues a deferred `BEGIN`: the connection takes a read lock
//! on its first `SELECT` and only tries to upgrade when it first writes. Two
//! such transactions that both read before writing cannot both upgrade, and
//! SQLite fails the second with `SQLITE_BUSY` at once instead of waiting out
//! the busy timeout.
//!
//! [`WriteTransaction`] starts with `BEGIN IMMEDIATE` instead, taking the
//! write lock up front. A competing writer then waits on the busy timeout
//! like any other locked statement.
//!
//! # Example
//!
//! ```no_run
//! use taskhub_shared::db::transaction::WriteTransaction;
//! use taskhub_shared::models::task::Task;
//!
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), sqlx::Error> {
//! let mut tx = WriteTransaction::begin(pool).await?;
//! if let Some(mut task) = Task::find_by_id(&mut tx, 1).await? {
//!     task.title = "Renamed".to_string();
//!     Task::save(&mut tx, &task).await?;
//! }
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

use sqlx::{pool::PoolConnection, Sqlite, SqliteConnection, SqlitePool};
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// A pooled connection inside `BEGIN IMMEDIATE`
///
/// Dereferences to the connection, so `&mut *tx` can be handed to any
/// model function. Dropping it without [`commit`](Self::commit) rolls back
/// before the connection goes back to the pool.
pub struct WriteTransaction {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTransaction {
    /// Acquires a connection and takes the database write lock
    ///
    /// Waits up to the pool's busy timeout if another writer holds it.
    pub async fn begin(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        Ok(Self { conn: Some(conn) })
    }

    pub async fn commit(mut self) -> Result<(), sqlx::Error> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };

        match sqlx::query("COMMIT").execute(&mut *conn).await {
            Ok(_) => Ok(()),
            Err(e) => {
                // A failed COMMIT leaves the transaction open
                rollback_in_background(conn);
                Err(e)
            }
        }
    }

    pub async fn rollback(mut self) -> Result<(), sqlx::Error> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };

        sqlx::query("ROLLBACK").execute(&mut *conn).await?;
        Ok(())
    }

    fn connection(&self) -> &PoolConnection<Sqlite> {
        self.conn
            .as_ref()
            .expect("connection is only taken by commit, rollback or drop")
    }

    fn connection_mut(&mut self) -> &mut PoolConnection<Sqlite> {
        self.conn
            .as_mut()
            .expect("connection is only taken by commit, rollback or drop")
    }
}

impl Deref for WriteTransaction {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        self.connection()
    }
}

impl DerefMut for WriteTransaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection_mut()
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("Write transaction dropped without commit; rolling back");
            rollback_in_background(conn);
        }
    }
}

/// Rolls back on a spawned task, which owns the connection until the
/// `ROLLBACK` finishes so no other caller can acquire it mid-transaction.
///
/// Outside a runtime, or if `ROLLBACK` itself fails, the connection is
/// detached from the pool and closed, which discards the transaction.
fn rollback_in_background(mut conn: PoolConnection<Sqlite>) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    warn!(error = %e, "Rollback failed; closing connection");
                    drop(conn.detach());
                }
            });
        }
        Err(_) => drop(conn.detach()),
    }
}
