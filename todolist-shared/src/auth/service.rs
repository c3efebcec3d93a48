/// Credential & token service
///
/// Registers accounts, checks logins, and verifies bearer tokens.
///
/// Login failures are uniform: an unknown email and a wrong password both
/// return [`ServiceError::invalid_credentials`], and both run one full
/// Argon2id verification. For unknown emails the verification runs against
/// a dummy hash computed when the service is built.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    jwt::{JwtError, TokenIssuer},
    middleware::AuthContext,
    password::{self, PasswordError},
};
use crate::{
    error::{ServiceError, ServiceResult},
    models::account::{normalize_email, CreateAccount},
    store::{AccountStore, StoreError},
};

/// A freshly issued access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub account_id: i64,
    pub expires_in: i64,
}

/// Service for account registration, login and token verification
#[derive(Clone)]
pub struct CredentialService {
    accounts: Arc<dyn AccountStore>,
    tokens: TokenIssuer,
    dummy_hash: Arc<str>,
}

impl CredentialService {
    /// Builds the service
    ///
    /// Hashes a throwaway password once so that logins for unknown emails
    /// cost the same as logins with a wrong password.
    pub fn new(accounts: Arc<dyn AccountStore>, tokens: TokenIssuer) -> ServiceResult<Self> {
        let dummy_hash = password::hash_password("todolist-timing-equalizer")
            .map_err(internal)?;

        Ok(Self {
            accounts,
            tokens,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Creates an account and returns a token for it
    ///
    /// # Errors
    ///
    /// - `Validation` if the password breaks the length policy
    /// - `Conflict` if the email is already registered
    pub async fn register(&self, email: &str, password: &str) -> ServiceResult<IssuedToken> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ServiceError::validation("email", "Email must not be empty"));
        }
        password::validate_password(password)
            .map_err(|message| ServiceError::validation("password", message))?;

        if self.accounts.find_account_by_email(&email).await?.is_some() {
            debug!("Registration rejected: email taken");
            return Err(email_taken());
        }

        let password_hash = hash_blocking(password.to_string()).await?;

        let account = self
            .accounts
            .insert_account(CreateAccount {
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                StoreError::Duplicate(_) => email_taken(),
                other => other.into(),
            })?;

        info!(account_id = account.id, "Account registered");
        self.issue(account.id, &account.email)
    }

    /// Checks credentials and returns a token
    ///
    /// # Errors
    ///
    /// `Auth("invalid credentials")` for an unknown email or a wrong
    /// password, indistinguishably.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<IssuedToken> {
        let email = normalize_email(email);
        let account = self.accounts.find_account_by_email(&email).await?;

        let stored_hash: Arc<str> = match &account {
            Some(account) => Arc::from(account.password_hash.as_str()),
            None => self.dummy_hash.clone(),
        };

        let matches = verify_blocking(password.to_string(), stored_hash).await?;

        match account {
            Some(account) if matches => {
                info!(account_id = account.id, "Login succeeded");
                self.issue(account.id, &account.email)
            }
            _ => {
                debug!("Login rejected");
                Err(ServiceError::invalid_credentials())
            }
        }
    }

    /// Validates a bearer token and returns the caller identity
    ///
    /// `None` (no token at all) fails the same way as a bad token.
    pub fn verify(&self, token: Option<&str>) -> ServiceResult<AuthContext> {
        let token = token.ok_or_else(ServiceError::invalid_token)?;

        let claims = self.tokens.validate(token).map_err(|e| {
            match &e {
                JwtError::Expired => debug!("Rejected expired token"),
                other => debug!(error = %other, "Rejected token"),
            }
            ServiceError::invalid_token()
        })?;

        let account_id = claims
            .account_id()
            .map_err(|_| ServiceError::invalid_token())?;

        Ok(AuthContext::new(account_id, claims.email))
    }

    fn issue(&self, account_id: i64, email: &str) -> ServiceResult<IssuedToken> {
        let access_token = self.tokens.issue(account_id, email).map_err(|e| {
            warn!(error = %e, "Token signing failed");
            ServiceError::Internal(e.to_string())
        })?;

        Ok(IssuedToken {
            access_token,
            account_id,
            expires_in: self.tokens.ttl().num_seconds(),
        })
    }
}

fn email_taken() -> ServiceError {
    ServiceError::Conflict("Email already registered".to_string())
}

fn internal(err: PasswordError) -> ServiceError {
    ServiceError::Internal(err.to_string())
}

async fn hash_blocking(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(format!("hashing task failed: {}", e)))?
        .map_err(internal)
}

async fn verify_blocking(password: String, hash: Arc<str>) -> ServiceResult<bool> {
    let outcome = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("verification task failed: {}", e)))?;

    match outcome {
        Ok(matches) => Ok(matches),
        // A corrupt stored hash must not reveal that the account exists
        Err(e) => {
            warn!(error = %e, "Stored password hash is unusable");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Claims;
    use crate::store::MemoryStore;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> CredentialService {
        let store: Arc<dyn AccountStore> = Arc::new(MemoryStore::new());
        CredentialService::new(store, TokenIssuer::new(SECRET, Duration::hours(1))).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login_same_identity() {
        let svc = service();

        let registered = svc.register("a@x.com", "pw123456").await.unwrap();
        let logged_in = svc.login("a@x.com", "pw123456").await.unwrap();

        let a = svc.verify(Some(&registered.access_token)).unwrap();
        let b = svc.verify(Some(&logged_in.access_token)).unwrap();
        assert_eq!(a.account_id, b.account_id);
        assert_eq!(a.account_id, registered.account_id);
        assert_eq!(a.email, "a@x.com");
        assert_eq!(registered.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_email_is_normalized() {
        let svc = service();
        svc.register("  A@X.com", "pw123456").await.unwrap();

        let token = svc.login("a@x.COM ", "pw123456").await.unwrap();
        assert_eq!(svc.verify(Some(&token.access_token)).unwrap().email, "a@x.com");

        let dup = svc.register("a@x.com", "pw123456").await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let svc = service();
        svc.register("a@x.com", "pw123456").await.unwrap();

        let err = svc.register("a@x.com", "another-pass").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let svc = service();
        let err = svc.register("a@x.com", "short").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "password"));
    }

    #[tokio::test]
    async fn test_login_failures_identical() {
        let svc = service();
        svc.register("a@x.com", "pw123456").await.unwrap();

        let wrong_password = svc.login("a@x.com", "pw654321").await.unwrap_err();
        let unknown_email = svc.login("nobody@x.com", "pw123456").await.unwrap_err();

        assert!(matches!(wrong_password, ServiceError::Auth(_)));
        assert!(matches!(unknown_email, ServiceError::Auth(_)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_unrepresentable_lifetime_fails_without_panic() {
        let store: Arc<dyn AccountStore> = Arc::new(MemoryStore::new());
        let svc = CredentialService::new(
            store,
            TokenIssuer::new(SECRET, Duration::seconds(9_000_000_000_000)),
        )
        .unwrap();

        let err = svc.register("a@x.com", "pw123456").await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn test_verify_rejections() {
        let svc = service();

        assert!(matches!(svc.verify(None), Err(ServiceError::Auth(_))));
        assert!(matches!(svc.verify(Some("garbage")), Err(ServiceError::Auth(_))));

        let foreign = TokenIssuer::new("a-completely-different-32-byte-secret", Duration::hours(1))
            .issue(1, "a@x.com")
            .unwrap();
        assert!(matches!(svc.verify(Some(&foreign)), Err(ServiceError::Auth(_))));

        let expired = crate::auth::jwt::create_token(
            &Claims::new(1, "a@x.com", Duration::hours(-2)).unwrap(),
            SECRET,
        )
        .unwrap();
        let err = svc.verify(Some(&expired)).unwrap_err();
        assert_eq!(err.to_string(), "invalid or missing token");
    }
}
