/// PostgreSQL storage backend
///
/// Thin adapter from the storage traits onto the SQL in [`crate::models`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{AccountStore, Storage, StoreResult, TaskStore};
use crate::db::pool::health_check;
use crate::models::{
    account::{Account, CreateAccount},
    task::{CreateTask, Task},
};

/// Storage backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool (for migrations and shutdown)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn insert_account(&self, data: CreateAccount) -> StoreResult<Account> {
        Ok(Account::create(&self.pool, data).await?)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(Account::find_by_email(&self.pool, email).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn list_tasks(&self, owner_id: i64) -> StoreResult<Vec<Task>> {
        let tasks = Task::list_by_owner(&self.pool, owner_id).await?;
        debug!(owner_id, count = tasks.len(), "Loaded tasks");
        Ok(tasks)
    }

    async fn find_task(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_owned(&self.pool, owner_id, task_id).await?)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        Ok(Task::save_owned(&self.pool, task).await?)
    }

    async fn delete_task(&self, owner_id: i64, task_id: i64) -> StoreResult<bool> {
        Ok(Task::delete_owned(&self.pool, owner_id, task_id).await?)
    }
}

#[async_trait]
impl Storage for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
