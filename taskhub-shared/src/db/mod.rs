//! Database layer for TaskHub
//!
//! # Modules
//!
//! - `pool`: SQLite connection pool management with health checks
//! - `migrations`: Embedded migration runner
//! - `transaction`: `BEGIN IMMEDIATE` write transactions
//!
//! Models are in the `models` module at crate root level.
//!
//! # Example
//!
//! ```no_run
//! use taskhub_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig {
//!         url: std::env::var("DATABASE_URL")?,
//!         ..Default::default()
//!     };
//!
//!     let pool = create_pool(config).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod migrations;
pub mod pool;
pub mod transaction;
