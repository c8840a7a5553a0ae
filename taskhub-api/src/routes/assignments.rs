//! Assignment endpoints
//!
//! # Endpoints
//!
//! - `GET /assignments` - List assignments as `{id, task_id, user_id, status}`
//! - `POST /assignments` - Link a user to a task
//! - `GET /assignments/:id` - Full assignment with its task and user
//! - `PATCH /assignments/:id` - Change task, user or status
//!
//! Referenced tasks and users are not looked up first; the foreign keys turn
//! a dangling id into a `400 {"errors": [...]}`.

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
use serde::Deserialize;
use taskhub_shared::{
    db::transaction::WriteTransaction,
    models::assignment::{
        Assignment, AssignmentDetail, AssignmentSummary, CreateAssignment, UpdateAssignment,
    },
};
use validator::Validate;

/// Create assignment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
    pub task_id: i64,
    pub user_id: i64,

    #[validate(length(min = 1, max = 50, message = "Status must be between 1 and 50 characters"))]
    pub status: String,
}

/// Partial assignment update; absent or `null` fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAssignmentRequest {
    pub task_id: Option<i64>,
    pub user_id: Option<i64>,

    #[validate(length(min = 1, max = 50, message = "Status must be between 1 and 50 characters"))]
    pub status: Option<String>,
}

impl From<UpdateAssignmentRequest> for UpdateAssignment {
    fn from(req: UpdateAssignmentRequest) -> Self {
        Self {
            task_id: req.task_id,
            user_id: req.user_id,
            status: req.status,
        }
    }
}

pub async fn list_assignments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AssignmentSummary>>> {
    let mut conn = state.db.acquire().await?;
    let assignments = Assignment::list(&mut conn).await?;

    Ok(Json(assignments.iter().map(AssignmentSummary::from).collect()))
}

/// Create assignment
///
/// ```text
/// POST /assignments
/// Content-Type: application/json
///
/// {"task_id": 1, "user_id": 2, "status": "pending"}
/// ```
///
/// Responds `201` with the full assignment.
pub async fn create_assignment(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateAssignmentRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentDetail>)> {
    req.validate()?;

    let mut tx = WriteTransaction::begin(&state.db).await?;
    let assignment = Assignment::create(
        &mut *tx,
        CreateAssignment {
            task_id: req.task_id,
            user_id: req.user_id,
            status: req.status,
        },
    )
    .await
    .map_err(ApiError::write_failure)?;
    let detail = assignment.load_detail(&mut *tx).await?;
    tx.commit().await.map_err(ApiError::write_failure)?;

    tracing::info!(
        assignment_id = assignment.id,
        task_id = assignment.task_id,
        user_id = assignment.user_id,
        "Assignment created"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_assignment(
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
) -> ApiResult<Json<AssignmentDetail>> {
    let mut conn = state.db.acquire().await?;
    let assignment = Assignment::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    Ok(Json(assignment.load_detail(&mut conn).await?))
}

/// Update assignment
///
/// Only the fields present in the body change. Moving the assignment to a
/// task or user that does not exist is a `400 {"errors": [...]}`.
pub async fn update_assignment(
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
    JsonBody(req): JsonBody<UpdateAssignmentRequest>,
) -> ApiResult<Json<AssignmentDetail>> {
    req.validate()?;

    let mut tx = WriteTransaction::begin(&state.db).await?;
    let assignment = Assignment::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    let assignment = UpdateAssignment::from(req).apply(assignment);
    Assignment::save(&mut *tx, &assignment)
        .await
        .map_err(ApiError::write_failure)?;
    let detail = assignment.load_detail(&mut *tx).await?;
    tx.commit().await.map_err(ApiError::write_failure)?;

    Ok(Json(detail))
}
