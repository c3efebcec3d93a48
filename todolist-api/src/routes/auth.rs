/// Authentication endpoints
///
/// - `POST /auth/register` - Create an account and get a token
/// - `POST /auth/login` - Exchange credentials for a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use todolist_shared::{auth::service::IssuedToken, models::account::normalize_email};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be between 8 and 128 characters"
    ))]
    pub password: String,
}

/// Login request
///
/// No format checks: anything wrong is just "invalid credentials".
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always `Bearer`
    pub token_type: String,

    /// Seconds until the token expires
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            access_token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
        }
    }
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "pw123456" }
/// ```
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ...", "token_type": "Bearer", "expires_in": 3600 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, invalid email or password length
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(mut req) = body?;
    // Validate the address as it will be stored
    req.email = normalize_email(&req.email);
    req.validate().map_err(ApiError::from)?;

    let issued = state.credentials.register(&req.email, &req.password).await?;

    Ok(Json(issued.into()))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: Unknown email or wrong password (same response)
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = body?;

    let issued = state.credentials.login(&req.email, &req.password).await?;

    Ok(Json(issued.into()))
}
