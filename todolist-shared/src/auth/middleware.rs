/// Request identity for Axum handlers
///
/// The API's bearer-token layer validates the `Authorization` header and
/// inserts an [`AuthContext`] into the request extensions. Handlers then take
/// `AuthContext` as an extractor argument.
///
/// # Example
///
/// ```
/// use todolist_shared::auth::middleware::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("account {}", auth.account_id)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::INVALID_TOKEN;

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Account the token was issued to
    pub account_id: i64,

    /// Account email at token issuance
    pub email: String,
}

impl AuthContext {
    pub fn new(account_id: i64, email: impl Into<String>) -> Self {
        Self {
            account_id,
            email: email.into(),
        }
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively. Returns `None` when the header
/// is missing, not UTF-8, uses another scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Rejection when a handler asks for [`AuthContext`] on an unauthenticated
/// request
#[derive(Debug)]
pub struct MissingAuthContext;

impl IntoResponse for MissingAuthContext {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": INVALID_TOKEN,
            })),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = MissingAuthContext;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(MissingAuthContext)
    }
}
