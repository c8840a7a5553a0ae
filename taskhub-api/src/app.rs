//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use taskhub_api::{app::{build_router, AppState}, config::Config};
//! use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = create_pool(DatabaseConfig {
//!     url: config.database.url.clone(),
//!     ..Default::default()
//! })
//! .await?;
//!
//! let app = build_router(AppState::new(pool, config));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5555").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /                     # Landing page
/// ├── GET    /health               # Health check
/// ├── GET    /check_session        # Current user (full)
/// ├── POST   /login
/// ├── DELETE /logout
/// ├── GET    /users                # List / create
/// ├── POST   /users
/// ├── GET    /users/:id            # Read / delete
/// ├── DELETE /users/:id
/// ├── GET    /tasks                # List / create
/// ├── POST   /tasks
/// ├── GET    /tasks/:id            # Read / patch / delete
/// ├── PATCH  /tasks/:id
/// ├── DELETE /tasks/:id
/// ├── GET    /assignments          # List / create
/// ├── POST   /assignments
/// ├── GET    /assignments/:id      # Read / patch
/// └── PATCH  /assignments/:id
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let session_routes = Router::new()
        .route("/check_session", get(routes::session::check_session))
        .route("/login", post(routes::session::login))
        .route("/logout", delete(routes::session::logout));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route("/:id", get(routes::users::get_user).delete(routes::users::delete_user));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let assignment_routes = Router::new()
        .route(
            "/",
            get(routes::assignments::list_assignments).post(routes::assignments::create_assignment),
        )
        .route(
            "/:id",
            get(routes::assignments::get_assignment).patch(routes::assignments::update_assignment),
        );

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check))
        .merge(session_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .nest("/assignments", assignment_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Credentialed CORS for the configured origins
///
/// Browsers reject `Access-Control-Allow-Origin: *` on credentialed
/// requests, so a `*` entry mirrors the request origin instead.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
