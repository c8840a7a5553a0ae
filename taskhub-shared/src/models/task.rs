//! Task model and database operations
//!
//! Every task belongs to exactly one user and can be linked to further users
//! through assignments.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title VARCHAR(100) NOT NULL,
//!     description TEXT NOT NULL,
//!     due_date DATE NOT NULL,
//!     user_id INTEGER NOT NULL REFERENCES users (id)
//! );
//! ```
//!
//! # Partial updates
//!
//! [`UpdateTask`] carries only the fields a client sent. [`UpdateTask::apply`]
//! merges it into a loaded row and [`Task::save`] writes the whole row back:
//!
//! ```no_run
//! use taskhub_shared::models::task::{Task, UpdateTask};
//! # use sqlx::SqliteConnection;
//!
//! # async fn example(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
//! if let Some(task) = Task::find_by_id(&mut *conn, 1).await? {
//!     let update = UpdateTask {
//!         title: Some("Write report".to_string()),
//!         ..Default::default()
//!     };
//!     Task::save(&mut *conn, &update.apply(task)).await?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::models::assignment::{Assignment, AssignmentSummary};
use crate::models::user::{User, UserSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

/// Task row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    /// At most 100 characters
    pub title: String,

    pub description: String,

    /// Stored and serialized as `YYYY-MM-DD`
    pub due_date: NaiveDate,

    /// Owning user
    pub user_id: i64,
}

/// Input for creating a new task
///
/// `user_id` must reference an existing user; callers check this before
/// inserting so a bad reference can be reported distinctly.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub user_id: i64,
}

/// Fields a client may change on an existing task
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl UpdateTask {
    /// Merges the present fields into `task`
    pub fn apply(self, mut task: Task) -> Task {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        task
    }
}

/// `{id, title, description, due_date}`: one entry of the task listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
}

/// A task nested inside a user or an assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub user_id: i64,
}

/// Full task representation: owner and assignments
///
/// The owner is a [`UserSummary`], so it does not repeat its own task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub user_id: i64,
    pub user: UserSummary,
    pub assignments: Vec<AssignmentSummary>,
}

impl From<&Task> for TaskListItem {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
        }
    }
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            user_id: task.user_id,
        }
    }
}

impl Task {
    /// Inserts a new task
    pub async fn create(conn: &mut SqliteConnection, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, due_date, user_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, description, due_date, user_id
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.user_id)
        .fetch_one(conn)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, user_id
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(task)
    }

    /// Lists all tasks ordered by id
    pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, user_id
            FROM tasks
            ORDER BY id
            "#,
        )
        .fetch_all(conn)
        .await?;

        Ok(tasks)
    }

    /// Lists the tasks owned by a user, ordered by id
    pub async fn list_by_user(
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, user_id
            FROM tasks
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(tasks)
    }

    /// Writes every column of `task` back to its row
    ///
    /// # Returns
    ///
    /// `true` if the row still existed
    pub async fn save(conn: &mut SqliteConnection, task: &Task) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, due_date = ?, user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.user_id)
        .bind(task.id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes the task row
    ///
    /// Run [`Assignment::delete_by_task`] first in the same transaction.
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every task owned by a user
    ///
    /// # Returns
    ///
    /// Number of tasks deleted
    pub async fn delete_by_user(conn: &mut SqliteConnection, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = ?")
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Loads the full representation: owner and assignments
    ///
    /// Fails with `RowNotFound` if the owner has vanished, which the foreign
    /// key makes impossible outside of a half-applied delete.
    pub async fn load_detail(&self, conn: &mut SqliteConnection) -> Result<TaskDetail, sqlx::Error> {
        let owner = User::find_by_id(&mut *conn, self.user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let assignments = Assignment::list_by_task(&mut *conn, self.id).await?;

        Ok(TaskDetail {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            user_id: self.user_id,
            user: owner.summary(),
            assignments: assignments.iter().map(AssignmentSummary::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: 3,
            title: "A".to_string(),
            description: "B".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            user_id: 1,
        }
    }

    #[test]
    fn test_apply_keeps_unspecified_fields() {
        let update = UpdateTask {
            title: Some("C".to_string()),
            ..Default::default()
        };

        let task = update.apply(sample_task());
        assert_eq!(task.title, "C");
        assert_eq!(task.description, "B");
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert_eq!(task.user_id, 1);
    }

    #[test]
    fn test_apply_empty_update_is_identity() {
        assert_eq!(UpdateTask::default().apply(sample_task()), sample_task());
    }

    #[test]
    fn test_apply_all_fields() {
        let due = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let update = UpdateTask {
            title: Some("New".to_string()),
            description: Some("Changed".to_string()),
            due_date: Some(due),
        };

        let task = update.apply(sample_task());
        assert_eq!(task.id, 3);
        assert_eq!(task.title, "New");
        assert_eq!(task.description, "Changed");
        assert_eq!(task.due_date, due);
    }

    #[test]
    fn test_list_item_omits_owner() {
        let json = serde_json::to_value(TaskListItem::from(&sample_task())).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "title": "A",
                "description": "B",
                "due_date": "2024-07-15"
            })
        );
    }

    #[test]
    fn test_summary_includes_owner_id() {
        let json = serde_json::to_value(TaskSummary::from(&sample_task())).unwrap();

        assert_eq!(json["user_id"], 1);
        assert_eq!(json["due_date"], "2024-07-15");
        assert!(json.get("user").is_none());
        assert!(json.get("assignments").is_none());
    }
}
