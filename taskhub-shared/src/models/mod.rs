//! Database models for TaskHub
//!
//! Each model exposes its row type, create/update inputs and queries taking
//! a `&mut SqliteConnection`, so the caller decides whether they run on a
//! pooled connection or inside a transaction.
//!
//! # Models
//!
//! - `user`: Accounts and the write-only password hash
//! - `task`: Tasks owned by a user
//! - `assignment`: User-to-task links with a status
//! - `session`: Server-side login sessions
//!
//! # Projections
//!
//! Rows are never serialized directly. Responses use the summary/detail
//! types (`UserSummary`, `TaskDetail`, ...) which nest one level deep only.

pub mod assignment;
pub mod session;
pub mod task;
pub mod user;
