/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Register and login
/// - `tasks`: Task CRUD for the authenticated account

pub mod auth;
pub mod health;
pub mod tasks;
