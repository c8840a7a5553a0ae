//! User endpoints
//!
//! # Endpoints
//!
//! - `GET /users` - List users as `{id, name, email}`
//! - `POST /users` - Create a user
//! - `GET /users/:id` - Full user with tasks and assignments
//! - `DELETE /users/:id` - Delete a user and everything that references it

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
    auth::password::PasswordHash,
    db::transaction::WriteTransaction,
    models::{
        assignment::Assignment,
        task::Task,
        user::{CreateUser, User, UserDetail, UserSummary},
    },
};
use validator::Validate;

/// Password every new account starts with
///
/// Any password in the request body is ignored.
pub const DEFAULT_PASSWORD: &str = "password";

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,

    #[validate(
        contains(pattern = "@", message = "Invalid email format"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: String,
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    let mut conn = state.db.acquire().await?;
    let users = User::list(&mut conn).await?;

    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

/// Create user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// {"name": "Ada", "email": "ada@example.com"}
/// ```
///
/// Responds `201 {id, name, email}`.
///
/// # Errors
///
/// - `400 {"errors": [...]}`: Missing fields, failed validation, or a
///   database failure such as a duplicate email
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    req.validate()?;

    let password_hash =
        tokio::task::spawn_blocking(|| PasswordHash::generate(DEFAULT_PASSWORD)).await??;

    let mut tx = WriteTransaction::begin(&state.db).await?;
    let user = User::create(
        &mut *tx,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await
    .map_err(ApiError::write_failure)?;
    tx.commit().await.map_err(ApiError::write_failure)?;

    tracing::info!(user_id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user.summary())))
}

pub async fn get_user(
    State(state): State<AppState>,
    PathId(id): PathId<i64>,
) -> ApiResult<Json<UserDetail>> {
    let mut conn = state.db.acquire().await?;
    let user = User::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.load_detail(&mut conn).await?))
}

/// Delete user
///
/// Removes, in one transaction: every assignment held by the user or
/// attached to one of the user's tasks, then the user's tasks, then the
/// user. Responds `204`, `404` if the user does not exist, or `500` if the
/// storage layer refuses.
pub async fn delete_user(State(state): State<AppState>, PathId(id): PathId<i64>) -> ApiResult<StatusCode> {
    let mut tx = WriteTransaction::begin(&state.db).await?;

    if User::find_by_id(&mut *tx, id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let assignments = Assignment::delete_for_user(&mut *tx, id)
        .await
        .map_err(|e| ApiError::delete_failure("user", e))?;
    let tasks = Task::delete_by_user(&mut *tx, id)
        .await
        .map_err(|e| ApiError::delete_failure("user", e))?;
    User::delete(&mut *tx, id)
        .await
        .map_err(|e| ApiError::delete_failure("user", e))?;
    tx.commit()
        .await
        .map_err(|e| ApiError::delete_failure("user", e))?;

    tracing::info!(user_id = id, tasks, assignments, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
