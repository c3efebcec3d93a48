/// Account model and database operations
///
/// An account is the owner of tasks and the subject of every access token.
/// Accounts are created on registration and never updated or deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id BIGSERIAL PRIMARY KEY,
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT accounts_email_key UNIQUE (email)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use todolist_shared::models::account::{Account, CreateAccount};
/// use todolist_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let account = Account::create(&pool, CreateAccount {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = Account::find_by_email(&pool, "user@example.com").await?;
/// assert_eq!(found.map(|a| a.id), Some(account.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Registered account
///
/// The password is only ever held as an Argon2id PHC string.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Store-assigned identifier, immutable
    pub id: i64,

    /// Normalized (trimmed, lowercase) email, unique
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Normalized email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Normalizes an email for storage and lookup
///
/// Emails are compared case-insensitively, so `User@Example.com ` and
/// `user@example.com` name the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Account {
    /// Inserts a new account
    ///
    /// # Errors
    ///
    /// Returns a database error carrying the `accounts_email_key` constraint
    /// when the email is already registered.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by its normalized email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }
}
