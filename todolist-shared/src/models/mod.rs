/// Database models for Todolist
///
/// # Models
///
/// - `account`: Registered accounts (login key + password hash)
/// - `task`: To-do items owned by an account
///
/// Each model carries its own SQL. Services never call these directly; they
/// go through the [`crate::store`] traits, whose PostgreSQL backend
/// delegates here.

pub mod account;
pub mod task;
