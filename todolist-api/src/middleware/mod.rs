/// Middleware for the API server
///
/// - `auth`: bearer-token layer for the task routes
/// - `security`: security response headers

pub mod auth;
pub mod security;
