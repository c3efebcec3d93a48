/// JWT access tokens
///
/// Tokens are HS256-signed and carry the account identity. There is no
/// refresh flow and no revocation list: a token is valid until `exp`.
///
/// # Claims
///
/// - `sub`: account id (decimal string)
/// - `email`: account email at issuance
/// - `iss`: always `"todolist"`
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use todolist_shared::auth::jwt::{Claims, TokenIssuer};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("an-example-secret-of-at-least-32-bytes", Duration::hours(1));
/// let token = issuer.issue(42, "a@x.com")?;
///
/// let claims: Claims = issuer.validate(&token)?;
/// assert_eq!(claims.account_id()?, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// `iss` claim of every token this service issues
pub const ISSUER: &str = "todolist";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, format or claim check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// `sub` is not an account id
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: String,

    /// Account email
    pub email: String,

    /// Issuer - always "todolist"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `account_id` valid from now for `ttl`
    ///
    /// # Errors
    ///
    /// `CreateError` if the expiry falls outside the representable date range.
    pub fn new(account_id: i64, email: impl Into<String>, ttl: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| JwtError::CreateError(format!("Token lifetime {} out of range", ttl)))?;

        Ok(Self {
            sub: account_id.to_string(),
            email: email.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    /// Parses `sub` back into an account id
    pub fn account_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature, issuer, `exp` and `nbf`, then returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

/// Signing secret and lifetime for access tokens
///
/// Built once from configuration and shared read-only by every request.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a fresh token for an account
    pub fn issue(&self, account_id: i64, email: &str) -> Result<String, JwtError> {
        create_token(&Claims::new(account_id, email, self.ttl)?, &self.secret)
    }

    /// Validates a token issued with this secret
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        validate_token(token, &self.secret)
    }
}
