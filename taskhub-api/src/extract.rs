//! Request extractors
//!
//! - [`JsonBody`]: `axum::Json` whose rejections render as `{"errors": [...]}`
//! - [`PathId`]: `axum::extract::Path` whose rejections render as a JSON 404
//! - [`CurrentSession`]: the session named by the signed session cookie

use crate::{app::AppState, config::SessionConfig, error::ApiError};
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use taskhub_shared::{
    auth::session::{sign_session_id, verify_signed_session_id},
    models::session::Session,
};

/// JSON request body with 400 `{"errors": [...]}` rejections
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameter that answers `404 {"error": ...}` when it does not parse
///
/// An id that is not an integer, or does not fit in one, cannot name a row.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathId<T>(pub T);

/// The caller's session, if the request carried a valid cookie
///
/// Never rejects on account of the cookie: a missing, forged or stale cookie
/// simply yields an anonymous session. Handlers decide what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentSession {
    /// Active session row, if any
    pub session_id: Option<String>,

    /// Logged-in user, if the session has one
    pub user_id: Option<i64>,
}

impl CurrentSession {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(session_id) = read_session_cookie(&parts.headers, &state.config.session) else {
            return Ok(Self::anonymous());
        };

        let mut conn = state.db.acquire().await?;
        let session = Session::find_active(&mut conn, &session_id).await?;

        Ok(match session {
            Some(session) => Self {
                session_id: Some(session.id),
                user_id: session.user_id,
            },
            None => {
                tracing::debug!("Session cookie names no active session");
                Self::anonymous()
            }
        })
    }
}

/// Finds the session cookie and checks its signature
///
/// Returns the session id it carries, or `None` if there is no such cookie
/// or the signature does not match.
pub fn read_session_cookie(headers: &HeaderMap, config: &SessionConfig) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == config.cookie_name)
        .find_map(|(_, value)| verify_signed_session_id(value, config.secret.as_bytes()))
}

/// Builds the `Set-Cookie` value establishing `session_id`
pub fn session_cookie(config: &SessionConfig, session_id: &str) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        config.cookie_name,
        sign_session_id(session_id, config.secret.as_bytes()),
        config.max_age_seconds(),
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid session cookie: {}", e)))
}
