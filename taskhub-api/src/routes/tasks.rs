//! Task endpoints
//!
//! # Endpoints
//!
//! - `GET /tasks` - List tasks as `{id, title, description, due_date}`
//! - `POST /tasks` - Create a task for an existing user
//! - `GET /tasks/:id` - Full task with owner and assignments
//! - `PATCH /tasks/:id` - Change title, description or due date
//! - `DELETE /tasks/:id` - Delete a task and its assignments

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{JsonBody, PathId},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use taskhub_shared::{
    db::transaction::WriteTransaction,
    models::{
        assignment::Assignment,
        task::{CreateTask, Task, TaskDetail, TaskListItem, UpdateTask},
        user::User,
    },
};
use validator::Validate;

/// Create task request
///
/// Decoded only after the raw body is checked for `user_id`, so its absence
/// gets its own error message whatever else is wrong.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    pub description: String,

    /// `YYYY-MM-DD`
    pub due_date: NaiveDate,

    pub user_id: i64,
}

/// Partial task update; absent or `null` fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub due_date: Option<NaiveDate>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
        }
    }
}

pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskListItem>>> {
    let mut conn = state.db.acquire().await?;
    let tasks = Task::list(&mut conn).await?;

    Ok(Json(tasks.iter().map(TaskListItem::from).collect()))
}

/// Create task
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {"title": "Plan", "description": "Sprint", "due_date": "2024-07-20", "user_id": 1}
/// ```
///
/// Responds `201` with the full task.
///
/// # Errors
///
/// - `400 {"error": "user_id is required"}`: Checked before any other field
/// - `400 {"error": "Invalid user_id"}`: No such user
/// - `400 {"errors": [...]}`: Malformed body, failed validation or a
///   database failure
pub async fn create_task(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<(StatusCode, Json<TaskDetail>)> {
    if body.get("user_id").map_or(true, Value::is_null) {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    let req: CreateTaskRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::ValidationError(vec![e.to_string()]))?;
    req.validate()?;
    let user_id = req.user_id;

    let mut tx = WriteTransaction::begin(&state.db).await?;

    if User::find_by_id(&mut *tx, user_id).await?.is_none() {
        return Err(ApiError::BadRequest("Invalid user_id".to_string()));
    }

    let task = Task::create(
        &mut *tx,
        CreateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            user_id,
        },
    )
    .await
    .map_err(ApiError::write_failure)?;
    let detail = task.load_detail(&mut *tx).await?;
    tx.commit().await.map_err(ApiError::write_failure)?;

    tracing::info!(task_id = task.id, user_id, "Task created");
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_task(
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
) -> ApiResult<Json<TaskDetail>> {
    let mut conn = state.db.acquire().await?;
    let task = Task::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task.load_detail(&mut conn).await?))
}

/// Update task
///
/// Only the fields present in the body change. Responds `200` with the
/// full task, or `404` if it does not exist.
pub async fn update_task(
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
    JsonBody(req): JsonBody<UpdateTaskRequest>,
) -> ApiResult<Json<TaskDetail>> {
    req.validate()?;

    let mut tx = WriteTransaction::begin(&state.db).await?;
    let task = Task::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let task = UpdateTask::from(req).apply(task);
    Task::save(&mut *tx, &task)
        .await
        .map_err(ApiError::write_failure)?;
    let detail = task.load_detail(&mut *tx).await?;
    tx.commit().await.map_err(ApiError::write_failure)?;

    Ok(Json(detail))
}

/// Delete task
///
/// Deletes the task's assignments, then the task, in one transaction.
/// Responds `204`, `404` if the task does not exist, or `500` if the
/// storage layer refuses.
pub async fn delete_task(State(state): State<AppState>, PathId(id): PathId<i64>) -> ApiResult<StatusCode> {
    let mut tx = WriteTransaction::begin(&state.db).await?;

    if Task::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    let assignments = Assignment::delete_by_task(&mut *tx, id)
        .await
        .map_err(|e| ApiError::delete_failure("task", e))?;
    Task::delete(&mut *tx, id)
        .await
        .map_err(|e| ApiError::delete_failure("task", e))?;
    tx.commit()
        .await
        .map_err(|e| ApiError::delete_failure("task", e))?;

    tracing::info!(task_id = id, assignments, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
