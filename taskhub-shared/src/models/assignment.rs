//! Assignment model and database operations
//!
//! An assignment links a user to a task with a free-form status such as
//! `"pending"` or `"done"`.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE assignments (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     task_id INTEGER NOT NULL REFERENCES tasks (id) ON DELETE CASCADE,
//!     user_id INTEGER NOT NULL REFERENCES users (id),
//!     status VARCHAR(50) NOT NULL
//! );
//! ```
//!
//! Referenced rows are not looked up before inserting; the foreign keys
//! reject dangling ids with a database error.

use crate::models::task::{Task, TaskSummary};
use crate::models::user::{User, UserSummary};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

/// Assignment row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Assignment {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,

    /// At most 50 characters
    pub status: String,
}

/// Input for creating a new assignment
#[derive(Debug, Clone)]
pub struct CreateAssignment {
    pub task_id: i64,
    pub user_id: i64,
    pub status: String,
}

/// Fields a client may change on an existing assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAssignment {
    pub task_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<String>,
}

impl UpdateAssignment {
    /// Merges the present fields into `assignment`
    pub fn apply(self, mut assignment: Assignment) -> Assignment {
        if let Some(task_id) = self.task_id {
            assignment.task_id = task_id;
        }
        if let Some(user_id) = self.user_id {
            assignment.user_id = user_id;
        }
        if let Some(status) = self.status {
            assignment.status = status;
        }
        assignment
    }
}

/// `{id, task_id, user_id, status}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub status: String,
}

/// Full assignment representation with its task and user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDetail {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub status: String,
    pub task: TaskSummary,
    pub user: UserSummary,
}

impl From<&Assignment> for AssignmentSummary {
    fn from(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id,
            task_id: assignment.task_id,
            user_id: assignment.user_id,
            status: assignment.status.clone(),
        }
    }
}

impl Assignment {
    /// Inserts a new assignment
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation if `task_id` or `user_id` do not
    /// exist.
    pub async fn create(
        conn: &mut SqliteConnection,
        data: CreateAssignment,
    ) -> Result<Self, sqlx::Error> {
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (task_id, user_id, status)
            VALUES (?, ?, ?)
            RETURNING id, task_id, user_id, status
            "#,
        )
        .bind(data.task_id)
        .bind(data.user_id)
        .bind(data.status)
        .fetch_one(conn)
        .await?;

        Ok(assignment)
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT id, task_id, user_id, status FROM assignments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(assignment)
    }

    pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Self>, sqlx::Error> {
        let assignments = sqlx::query_as::<_, Assignment>(
            "SELECT id, task_id, user_id, status FROM assignments ORDER BY id",
        )
        .fetch_all(conn)
        .await?;

        Ok(assignments)
    }

    pub async fn list_by_task(
        conn: &mut SqliteConnection,
        task_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, task_id, user_id, status
            FROM assignments
            WHERE task_id = ?
            ORDER BY id
            "#,
        )
        .bind(task_id)
        .fetch_all(conn)
        .await?;

        Ok(assignments)
    }

    pub async fn list_by_user(
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT id, task_id, user_id, status
            FROM assignments
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(assignments)
    }

    /// Writes every column of `assignment` back to its row
    pub async fn save(conn: &mut SqliteConnection, assignment: &Assignment) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE assignments
            SET task_id = ?, user_id = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(assignment.task_id)
        .bind(assignment.user_id)
        .bind(&assignment.status)
        .bind(assignment.id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every assignment on a task
    pub async fn delete_by_task(conn: &mut SqliteConnection, task_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assignments WHERE task_id = ?")
            .bind(task_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Deletes every assignment that would block removing a user
    ///
    /// That is the user's own assignments plus any assignment on a task the
    /// user owns.
    pub async fn delete_for_user(conn: &mut SqliteConnection, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM assignments
            WHERE user_id = ?
               OR task_id IN (SELECT id FROM tasks WHERE user_id = ?)
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Loads the full representation: the linked task and user
    pub async fn load_detail(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<AssignmentDetail, sqlx::Error> {
        let task = Task::find_by_id(&mut *conn, self.task_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let user = User::find_by_id(&mut *conn, self.user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok(AssignmentDetail {
            id: self.id,
            task_id: self.task_id,
            user_id: self.user_id,
            status: self.status.clone(),
            task: TaskSummary::from(&task),
            user: user.summary(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Assignment {
        Assignment {
            id: 1,
            task_id: 2,
            user_id: 3,
            status: "pending".to_string(),
        }
    }

    #[test]
    fn test_apply_status_only() {
        let update = UpdateAssignment {
            status: Some("done".to_string()),
            ..Default::default()
        };

        let assignment = update.apply(sample());
        assert_eq!(assignment.status, "done");
        assert_eq!(assignment.task_id, 2);
        assert_eq!(assignment.user_id, 3);
    }

    #[test]
    fn test_apply_reassigns() {
        let update = UpdateAssignment {
            task_id: Some(9),
            user_id: Some(8),
            status: None,
        };

        let assignment = update.apply(sample());
        assert_eq!(assignment.id, 1);
        assert_eq!(assignment.task_id, 9);
        assert_eq!(assignment.user_id, 8);
        assert_eq!(assignment.status, "pending");
    }

    #[test]
    fn test_summary_serialization() {
        let json = serde_json::to_value(AssignmentSummary::from(&sample())).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": 1, "task_id": 2, "user_id": 3, "status": "pending"})
        );
    }
}
