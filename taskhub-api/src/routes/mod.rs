//! API route handlers
//!
//! Handlers are organized by resource:
//!
//! - `health`: Landing page and health check
//! - `session`: Login, logout and session check
//! - `users`: User CRUD
//! - `tasks`: Task CRUD
//! - `assignments`: Assignment CRUD
//!
//! Reads run on a pooled connection. Writes run in a transaction that is
//! committed on success and rolled back when dropped on any error path.

pub mod assignments;
pub mod health;
pub mod session;
pub mod tasks;
pub mod users;
