//! User model and database operations
//!
//! A user owns tasks and is linked to tasks through assignments. The stored
//! password hash is write-only: it is a [`PasswordHash`] that can only be
//! checked through [`User::authenticate`], and none of the wire projections
//! carry it.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name VARCHAR(50) NOT NULL,
//!     email VARCHAR(100) NOT NULL UNIQUE,
//!     password_hash VARCHAR(128) NOT NULL DEFAULT 'default_hash_value'
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskhub_shared::auth::password::PasswordHash;
//! use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
//! use taskhub_shared::models::user::{CreateUser, User};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::in_memory()).await?;
//! let mut conn = pool.acquire().await?;
//!
//! let user = User::create(
//!     &mut conn,
//!     CreateUser {
//!         name: "Ada".to_string(),
//!         email: "ada@example.com".to_string(),
//!         password_hash: PasswordHash::generate("password")?,
//!     },
//! )
//! .await?;
//!
//! assert!(user.authenticate("password"));
//! # Ok(())
//! # }
//! ```

use crate::auth::password::PasswordHash;
use crate::models::assignment::{Assignment, AssignmentSummary};
use crate::models::task::{Task, TaskSummary};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::warn;

/// User row
///
/// Deliberately not `Serialize`: responses go through [`UserSummary`] or
/// [`UserDetail`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Display name, at most 50 characters
    pub name: String,

    /// Unique email address, at most 100 characters
    pub email: String,

    /// Argon2id hash in PHC format
    pub password_hash: PasswordHash,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
}

/// `{id, name, email}`: how a user appears in lists and nested objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Full user representation with owned tasks and assignments
///
/// Nested tasks and assignments are summaries, so they never expand back
/// into this user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub tasks: Vec<TaskSummary>,
    pub assignments: Vec<AssignmentSummary>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a database error if the email is already taken.
    pub async fn create(conn: &mut SqliteConnection, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES (?, ?, ?)
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(conn)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact email address
    pub async fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Lists all users ordered by id
    pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(conn)
        .await?;

        Ok(users)
    }

    /// Deletes the user row only
    ///
    /// Tasks and assignments referencing the user must be removed first
    /// (see [`Task::delete_by_user`] and [`Assignment::delete_for_user`]),
    /// otherwise the foreign key check fails. Sessions pointing at the user
    /// are detached by the schema.
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks a candidate password against the stored hash
    ///
    /// A stored value that is not a valid hash never authenticates.
    pub fn authenticate(&self, password: &str) -> bool {
        match self.password_hash.verify(password) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(user_id = self.id, error = %e, "Stored password hash is unusable");
                false
            }
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary::from(self)
    }

    /// Loads the full representation: the user's tasks and assignments
    pub async fn load_detail(&self, conn: &mut SqliteConnection) -> Result<UserDetail, sqlx::Error> {
        let tasks = Task::list_by_user(&mut *conn, self.id).await?;
        let assignments = Assignment::list_by_user(&mut *conn, self.id).await?;

        Ok(UserDetail {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            tasks: tasks.iter().map(TaskSummary::from).collect(),
            assignments: assignments.iter().map(AssignmentSummary::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(password_hash: PasswordHash) -> User {
        User {
            id: 7,
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            password_hash,
        }
    }

    #[test]
    fn test_summary_has_only_public_fields() {
        let user = user_with_hash(PasswordHash::generate("password").unwrap());
        let json = serde_json::to_value(user.summary()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": 7, "name": "Grace", "email": "grace@example.com"})
        );
    }

    #[test]
    fn test_authenticate() {
        let user = user_with_hash(PasswordHash::generate("password").unwrap());

        assert!(user.authenticate("password"));
        assert!(!user.authenticate("Password"));
        assert!(!user.authenticate(""));
    }

    #[test]
    fn test_debug_output_hides_hash() {
        let user = user_with_hash(PasswordHash::generate("password").unwrap());
        let debug = format!("{:?}", user);

        assert!(debug.contains("grace@example.com"));
        assert!(!debug.contains("$argon2id$"));
    }

    #[test]
    fn test_detail_serializes_nested_summaries() {
        let detail = UserDetail {
            id: 1,
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            tasks: vec![],
            assignments: vec![],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["tasks"], serde_json::json!([]));
        assert_eq!(json["assignments"], serde_json::json!([]));
        assert!(json.get("password_hash").is_none());
    }
}
