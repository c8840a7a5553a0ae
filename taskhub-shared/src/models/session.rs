//! Server-side login sessions
//!
//! The client holds a signed cookie naming a session row (see
//! [`crate::auth::session`]). A session is active while `expires_at` is in
//! the future; it is authenticated while `user_id` is set.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE sessions (
//!     id VARCHAR(32) PRIMARY KEY,
//!     user_id INTEGER REFERENCES users (id) ON DELETE SET NULL,
//!     created_at TIMESTAMP NOT NULL,
//!     expires_at TIMESTAMP NOT NULL
//! );
//! ```

use crate::auth::session::generate_session_id;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqliteConnection;

/// Session row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Session {
    /// Random 32-character id
    pub id: String,

    /// Logged-in user; `None` after logout or once the user is deleted
    pub user_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Starts a new session for `user_id`, valid for `ttl`
    pub async fn create(
        conn: &mut SqliteConnection,
        user_id: i64,
        ttl: Duration,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, created_at, expires_at
            "#,
        )
        .bind(generate_session_id())
        .bind(user_id)
        .bind(now)
        .bind(now + ttl)
        .fetch_one(conn)
        .await?;

        Ok(session)
    }

    /// Finds a session that has not expired yet
    pub async fn find_active(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(session.filter(|s| s.is_active_at(Utc::now())))
    }

    /// Detaches the user from a session (logout)
    pub async fn clear_user(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET user_id = NULL WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Purges sessions whose expiry has passed
    ///
    /// # Returns
    ///
    /// Number of sessions removed
    pub async fn delete_expired(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
