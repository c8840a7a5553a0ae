//! Configuration management for the API server
//!
//! Configuration comes from environment variables; a `.env` file in the
//! working directory is loaded first if present.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 5555)
//! - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
//! - `DATABASE_URL`: SQLite connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `SESSION_SECRET`: Cookie signing key, at least 32 characters (required)
//! - `SESSION_COOKIE_NAME`: Cookie name (default: session)
//! - `SESSION_TTL_HOURS`: Session lifetime (default: 744, i.e. 31 days)
//! - `SESSION_COOKIE_SECURE`: Mark the cookie `Secure` (default: false)
//! - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
//! - `RUST_LOG`: Log filter
//!
//! # Example
//!
//! ```no_run
//! use taskhub_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session cookie configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key for signing session cookies
    ///
    /// Must be at least 32 characters. Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub cookie_name: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,

    /// Whether the cookie carries the `Secure` attribute
    pub cookie_secure: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Unknown log format '{}' (expected 'pretty' or 'json')", other),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }

    /// Max-Age attribute value in seconds
    pub fn max_age_seconds(&self) -> i64 {
        self.ttl_hours * 3600
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `SESSION_SECRET` is missing
    /// - `SESSION_SECRET` is shorter than 32 characters
    /// - A numeric, boolean or log format variable cannot be parsed
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = var_or("API_PORT", "5555")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;
        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let session_secret = lookup("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        if session_secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }

        let ttl_hours = var_or("SESSION_TTL_HOURS", "744")
            .parse::<i64>()
            .context("SESSION_TTL_HOURS must be an integer")?;
        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        let cookie_secure = var_or("SESSION_COOKIE_SECURE", "false")
            .parse::<bool>()
            .context("SESSION_COOKIE_SECURE must be 'true' or 'false'")?;

        let log_format = var_or("LOG_FORMAT", "pretty").parse::<LogFormat>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret: session_secret,
                cookie_name: var_or("SESSION_COOKIE_NAME", "session"),
                ttl_hours,
                cookie_secure,
            },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "sqlite://taskhub.db"), ("SESSION_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5555");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.session.cookie_name, "session");
        assert_eq!(config.session.ttl_hours, 744);
        assert_eq!(config.session.max_age_seconds(), 744 * 3600);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SESSION_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "http://localhost:3000, https://app.example.com"),
            ("SESSION_COOKIE_SECURE", "true"),
            ("SESSION_TTL_HOURS", "2"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert!(config.session.cookie_secure);
        assert_eq!(config.session.ttl(), chrono::Duration::hours(2));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_required_variables() {
        assert!(load(&[("SESSION_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "sqlite::memory:")]).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[("DATABASE_URL", "sqlite::memory:"), ("SESSION_SECRET", "too-short")]).unwrap_err();
        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [("DATABASE_URL", "sqlite::memory:"), ("SESSION_SECRET", SECRET)];

        for bad in [
            ("API_PORT", "not-a-port"),
            ("DATABASE_MAX_CONNECTIONS", "-1"),
            ("SESSION_TTL_HOURS", "0"),
            ("SESSION_COOKIE_SECURE", "yes"),
            ("LOG_FORMAT", "xml"),
        ] {
            let mut vars = base.to_vec();
            vars.push(bad);
            assert!(load(&vars).is_err(), "{} = {} should be rejected", bad.0, bad.1);
        }
    }
}
