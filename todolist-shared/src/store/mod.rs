/// Storage traits
///
/// The credential and task services only talk to storage through these
/// traits. Two backends implement them:
///
/// - [`postgres::PgStore`]: the production backend (sqlx + PostgreSQL)
/// - [`memory::MemoryStore`]: process-local maps, used by the test suites
///
/// Both backends enforce the same contract: emails are unique, task lookups
/// are always scoped by owner, and listings are newest first.

use async_trait::async_trait;

use crate::models::{
    account::{Account, CreateAccount},
    task::{CreateTask, Task},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated; carries the constraint name
    #[error("duplicate value violates {0}")]
    Duplicate(String),

    /// Foreign key violated; carries the constraint name
    #[error("referenced row missing for {0}")]
    MissingReference(String),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Backend cannot serve requests
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Postgres SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Name Postgres gives the `tasks.owner_id` foreign key
pub const TASK_OWNER_FK: &str = "tasks_owner_id_fkey";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
                    return StoreError::Duplicate(constraint);
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    let constraint = db_err.constraint().unwrap_or("foreign key").to_string();
                    return StoreError::MissingReference(constraint);
                }
                _ => {}
            }
        }
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Result alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Account persistence
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts an account; `StoreError::Duplicate` if the email is taken
    async fn insert_account(&self, data: CreateAccount) -> StoreResult<Account>;

    /// Looks up an account by normalized email
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
}

/// Owner-scoped task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task with status `pending`
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task>;

    /// Tasks owned by `owner_id`, ordered by `created_at` then `id`, descending
    async fn list_tasks(&self, owner_id: i64) -> StoreResult<Vec<Task>>;

    /// The task with `task_id` if and only if `owner_id` owns it
    async fn find_task(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>>;

    /// Persists title, description, status and completion of `task`
    ///
    /// Scoped by `task.owner_id`; `None` if no such owned row exists.
    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>>;

    /// Removes an owned task; false if nothing matched
    async fn delete_task(&self, owner_id: i64, task_id: i64) -> StoreResult<bool>;
}

/// A complete backend
#[async_trait]
pub trait Storage: AccountStore + TaskStore {
    /// Cheap liveness probe for the health endpoint
    async fn ping(&self) -> StoreResult<()>;

    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_missing_reference_display() {
        let err = StoreError::MissingReference(TASK_OWNER_FK.to_string());
        assert_eq!(err.to_string(), "referenced row missing for tasks_owner_id_fkey");
    }

    #[test]
    fn test_other_errors_are_database() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
