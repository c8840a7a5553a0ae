//! Session endpoints
//!
//! # Endpoints
//!
//! - `POST /login` - Check credentials and establish a session cookie
//! - `DELETE /logout` - Detach the user from the current session
//! - `GET /check_session` - Return the logged-in user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{session_cookie, CurrentSession, JsonBody},
};
use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    Json,
};
use serde::Deserialize;
use taskhub_shared::{
    db::transaction::WriteTransaction,
    models::{
        session::Session,
        user::{User, UserDetail, UserSummary},
    },
};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {"email": "ada@example.com", "password": "password"}
/// ```
///
/// On success responds `200 {id, name, email}` with a `Set-Cookie` header
/// naming a fresh session. Any session the client already had is dropped.
///
/// # Errors
///
/// - `401 {"error": "401 Unauthorized"}`: No user with that email
/// - `401 {"error": "Wrong password"}`: Password does not match
/// - `400 {"errors": [...]}`: Malformed body
pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<([(HeaderName, HeaderValue); 1], Json<UserSummary>)> {
    let mut conn = state.db.acquire().await?;
    let user = User::find_by_email(&mut conn, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("401 Unauthorized".to_string()))?;
    drop(conn);

    let password = req.password;
    let (user, matches) = tokio::task::spawn_blocking(move || {
        let matches = user.authenticate(&password);
        (user, matches)
    })
    .await?;

    if !matches {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized("Wrong password".to_string()));
    }

    let mut tx = WriteTransaction::begin(&state.db).await?;
    let session = Session::create(&mut *tx, user.id, state.config.session.ttl()).await?;
    if let Some(previous) = current.session_id.as_deref() {
        Session::delete(&mut *tx, previous).await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = user.id, "User logged in");

    let cookie = session_cookie(&state.config.session, &session.id)?;
    Ok(([(header::SET_COOKIE, cookie)], Json(user.summary())))
}

/// Logout
///
/// Clears the user from the current session and responds `204`. Without a
/// logged-in session responds `401 {"error": "Unauthorized"}`.
pub async fn logout(State(state): State<AppState>, current: CurrentSession) -> ApiResult<StatusCode> {
    let (Some(session_id), Some(user_id)) = (current.session_id, current.user_id) else {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    };

    let mut tx = WriteTransaction::begin(&state.db).await?;
    Session::clear_user(&mut *tx, &session_id).await?;
    tx.commit().await?;

    tracing::info!(user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// Check session
///
/// Responds `200` with the full logged-in user, or `401 {}` when there is
/// no logged-in session or its user has since been deleted.
pub async fn check_session(
    State(state): State<AppState>,
    current: CurrentSession,
) -> ApiResult<Json<UserDetail>> {
    let user_id = current.user_id.ok_or(ApiError::SessionRequired)?;

    let mut conn = state.db.acquire().await?;
    let user = User::find_by_id(&mut conn, user_id)
        .await?
        .ok_or(ApiError::SessionRequired)?;

    Ok(Json(user.load_detail(&mut conn).await?))
}
