/// Authentication
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the password policy
/// - [`jwt`]: HS256 access tokens and the [`jwt::TokenIssuer`]
/// - [`middleware`]: [`middleware::AuthContext`] request identity and bearer parsing
/// - [`service`]: [`service::CredentialService`] (register, login, verify)
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Duration;
/// use todolist_shared::auth::{jwt::TokenIssuer, service::CredentialService};
/// use todolist_shared::store::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenIssuer::new("an-example-secret-of-at-least-32-bytes", Duration::hours(1));
/// let credentials = CredentialService::new(Arc::new(MemoryStore::new()), tokens)?;
///
/// let issued = credentials.register("a@x.com", "pw123456").await?;
/// let caller = credentials.verify(Some(&issued.access_token))?;
/// assert_eq!(caller.email, "a@x.com");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
