//! Common test utilities for integration tests
//!
//! Every [`TestContext`] owns a private, freshly migrated in-memory SQLite
//! database and drives the full router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use taskhub_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, LogFormat, SessionConfig},
};
use taskhub_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig as PoolConfig},
};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    /// Parsed JSON body, `Value::Null` when empty or not JSON
    pub body: Value,
}

impl TestResponse {
    /// The `name=value` part of the `Set-Cookie` header, if any
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        session: SessionConfig {
            secret: TEST_SECRET.to_string(),
            cookie_name: "session".to_string(),
            ttl_hours: 1,
            cookie_secure: false,
        },
        log_format: LogFormat::Pretty,
    }
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> anyhow::Result<Self> {
        Self::with_database(config, PoolConfig::in_memory()).await
    }

    /// Test context on a caller-chosen database, such as a temporary file
    pub async fn with_database(config: Config, database: PoolConfig) -> anyhow::Result<Self> {
        let db = create_pool(database).await?;
        run_migrations(&db).await?;

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(Self { db, app, config })
    }

    /// Sends a request through the router
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, None).await
    }

    /// Creates a user through the API and returns its id
    pub async fn create_user(&self, name: &str, email: &str) -> i64 {
        let response = self.post("/users", json!({"name": name, "email": email})).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_i64().unwrap()
    }

    /// Creates a task through the API and returns its id
    pub async fn create_task(&self, user_id: i64, title: &str, description: &str) -> i64 {
        let response = self
            .post(
                "/tasks",
                json!({
                    "title": title,
                    "description": description,
                    "due_date": "2024-07-20",
                    "user_id": user_id
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_i64().unwrap()
    }

    /// Creates an assignment through the API and returns its id
    pub async fn create_assignment(&self, task_id: i64, user_id: i64, status: &str) -> i64 {
        let response = self
            .post(
                "/assignments",
                json!({"task_id": task_id, "user_id": user_id, "status": status}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_i64().unwrap()
    }

    /// Logs in and returns the `name=value` session cookie
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/login", json!({"email": email, "password": password}))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.cookie().expect("login should set a session cookie")
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.db)
            .await
            .unwrap();
        count
    }
}
