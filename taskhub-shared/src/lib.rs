//! # TaskHub Shared Library
//!
//! This crate contains the data layer used by the TaskHub API server.
//!
//! ## Module Organization
//!
//! - `db`: SQLite connection pool and embedded migrations
//! - `models`: Users, tasks, assignments and sessions, with their queries
//!   and wire projections
//! - `auth`: Password hashing and session cookie signing

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
