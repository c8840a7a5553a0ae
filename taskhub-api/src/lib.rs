//! # TaskHub API Server Library
//!
//! HTTP layer of the TaskHub task-management backend: users, tasks,
//! assignments and session-cookie login over a JSON API.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body and session cookie extractors
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
