//! Error handling for the API server
//!
//! Every handler returns [`ApiResult`]. An [`ApiError`] renders as a status
//! code plus one of two JSON shapes:
//!
//! - `{"error": "..."}` for a single message
//! - `{"errors": ["...", ...]}` for validation and write failures
//!
//! [`ApiError::SessionRequired`] renders as a bare `{}`.
//!
//! # Example
//!
//! ```
//! use taskhub_api::error::{ApiError, ApiResult};
//!
//! fn find_widget(id: i64) -> ApiResult<String> {
//!     if id == 1 {
//!         Ok("widget".to_string())
//!     } else {
//!         Err(ApiError::NotFound("Widget not found".to_string()))
//!     }
//! }
//! ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskhub_shared::auth::password::PasswordError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) with a single message
    BadRequest(String),

    /// Bad request (400) listing every problem found
    ValidationError(Vec<String>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Unauthorized (401) with an empty body: no logged-in session
    SessionRequired,

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500) whose message is shown to the client
    ///
    /// Used when a delete is refused or fails at the storage layer.
    IntegrityViolation(String),

    /// Internal server error (500); the message is logged, not returned
    InternalError(String),
}

/// Error response body
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ApiError {
    /// Maps a failed insert or update to a 400 carrying the database message
    pub fn write_failure(err: sqlx::Error) -> Self {
        tracing::warn!(error = %err, "Write rolled back");
        ApiError::ValidationError(vec![err.to_string()])
    }

    /// Maps a failed delete of `entity` to a 500
    ///
    /// Foreign key violations get a fixed message; anything else includes
    /// the database error.
    pub fn delete_failure(entity: &str, err: sqlx::Error) -> Self {
        tracing::warn!(entity, error = %err, "Delete rolled back");

        match &err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ApiError::IntegrityViolation(format!(
                    "Integrity error occurred while deleting {}",
                    entity
                ))
            }
            _ => ApiError::IntegrityViolation(format!(
                "An error occurred while deleting {}: {}",
                entity, err
            )),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::SessionRequired => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::IntegrityViolation(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::SessionRequired => write!(f, "Unauthorized: no active session"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::IntegrityViolation(msg) => write!(f, "Integrity violation: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::IntegrityViolation(msg) => ErrorResponse {
                error: Some(msg),
                errors: None,
            },
            ApiError::ValidationError(errors) => ErrorResponse {
                error: None,
                errors: Some(errors),
            },
            ApiError::SessionRequired => ErrorResponse::default(),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ErrorResponse {
                    error: Some("An internal error occurred".to_string()),
                    errors: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// One `"field: message"` entry per failed rule, sorted by field
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' validation", error.code));
                    format!("{}: {}", field, message)
                })
            })
            .collect();
        messages.sort();

        ApiError::ValidationError(messages)
    }
}

/// Malformed or incomplete JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(vec![rejection.body_text()])
    }
}

/// Path parameters that do not parse name nothing that could exist
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Unparseable path parameter");
        ApiError::NotFound("Resource not found".to_string())
    }
}

/// A blocking task that panicked or was cancelled
impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalError(format!("Blocking task failed: {}", err))
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");

        let err = ApiError::ValidationError(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[tokio::test]
    async fn test_single_message_body() {
        let (status, body) = render(ApiError::NotFound("Task not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "Task not found"}));

        let (status, body) = render(ApiError::Unauthorized("Wrong password".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({"error": "Wrong password"}));
    }

    #[tokio::test]
    async fn test_validation_body() {
        let (status, body) =
            render(ApiError::ValidationError(vec!["email: Invalid email".to_string()])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"errors": ["email: Invalid email"]}));
    }

    #[tokio::test]
    async fn test_session_required_is_empty_object() {
        let (status, body) = render(ApiError::SessionRequired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) = render(ApiError::InternalError("disk on fire".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "An internal error occurred"}));
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_write_failure_is_400_list() {
        match ApiError::write_failure(sqlx::Error::PoolTimedOut) {
            ApiError::ValidationError(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_delete_failure_message() {
        match ApiError::delete_failure("task", sqlx::Error::PoolTimedOut) {
            ApiError::IntegrityViolation(msg) => {
                assert!(msg.starts_with("An error occurred while deleting task: "))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_failure_on_foreign_key_violation() {
        use taskhub_shared::{
            auth::password::PasswordHash,
            db::{
                migrations::run_migrations,
                pool::{create_pool, DatabaseConfig},
            },
            models::{
                task::{CreateTask, Task},
                user::{CreateUser, User},
            },
        };

        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let owner = User::create(
            &mut conn,
            CreateUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: PasswordHash::generate("password").unwrap(),
            },
        )
        .await
        .unwrap();
        Task::create(
            &mut conn,
            CreateTask {
                title: "Plan".to_string(),
                description: "Sprint".to_string(),
                due_date: chrono::NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
                user_id: owner.id,
            },
        )
        .await
        .unwrap();

        // The user still owns a task, so the foreign key refuses the delete
        let err = User::delete(&mut conn, owner.id).await.unwrap_err();

        let (status, body) = render(ApiError::delete_failure("user", err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({"error": "Integrity error occurred while deleting user"})
        );
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 1, max = 5, message = "Name must be 1-5 characters"))]
        name: String,
        #[validate(contains(pattern = "@", message = "Invalid email"))]
        email: String,
    }

    #[test]
    fn test_validation_errors_are_field_prefixed_and_sorted() {
        let signup = Signup {
            name: "far too long".to_string(),
            email: "nope".to_string(),
        };

        match ApiError::from(signup.validate().unwrap_err()) {
            ApiError::ValidationError(errors) => assert_eq!(
                errors,
                vec![
                    "email: Invalid email".to_string(),
                    "name: Name must be 1-5 characters".to_string()
                ]
            ),
            other => panic!("unexpected {:?}", other),
        }
    }
}
