//! # Todolist Shared Library
//!
//! This crate contains the domain types, authentication primitives and
//! business services used by the Todolist API server.
//!
//! ## Module Organization
//!
//! - `models`: Account and task records
//! - `auth`: Password hashing, JWT tokens, credential service
//! - `tasks`: Ownership-scoped task service
//! - `store`: Storage traits with PostgreSQL and in-memory backends
//! - `db`: Connection pool and migrations
//! - `error`: Service error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

/// Current version of the Todolist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
