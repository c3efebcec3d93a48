/// In-memory storage backend
///
/// Keeps accounts and tasks in maps behind a single `RwLock`. Ids are
/// assigned from counters starting at 1, mirroring `BIGSERIAL`. Data lives
/// only as long as the process.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AccountStore, Storage, StoreError, StoreResult, TaskStore, TASK_OWNER_FK};
use crate::models::{
    account::{Account, CreateAccount},
    task::{CreateTask, Task, TaskStatus},
};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<i64, Account>,
    account_ids_by_email: HashMap<String, i64>,
    tasks: BTreeMap<i64, Task>,
    last_account_id: i64,
    last_task_id: i64,
}

/// Storage backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored tasks across all owners
    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }

    /// Total number of registered accounts
    pub async fn account_count(&self) -> usize {
        self.tables.read().await.accounts.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_account(&self, data: CreateAccount) -> StoreResult<Account> {
        let mut tables = self.tables.write().await;

        if tables.account_ids_by_email.contains_key(&data.email) {
            return Err(StoreError::Duplicate("accounts_email_key".to_string()));
        }

        tables.last_account_id += 1;
        let account = Account {
            id: tables.last_account_id,
            email: data.email,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };

        tables
            .account_ids_by_email
            .insert(account.email.clone(), account.id);
        tables.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .account_ids_by_email
            .get(email)
            .and_then(|id| tables.accounts.get(id))
            .cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        // Same guarantee the foreign key gives in Postgres
        if !tables.accounts.contains_key(&data.owner_id) {
            return Err(StoreError::MissingReference(TASK_OWNER_FK.to_string()));
        }

        tables.last_task_id += 1;
        let task = Task {
            id: tables.last_task_id,
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            status: TaskStatus::Pending,
            created_at: data.created_at,
            completed_at: None,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn list_tasks(&self, owner_id: i64) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect();

        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn find_task(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .get(&task_id)
            .filter(|task| task.owner_id == owner_id)
            .cloned())
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables
            .tasks
            .get_mut(&task.id)
            .filter(|stored| stored.owner_id == task.owner_id)
        else {
            return Ok(None);
        };

        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.status = task.status;
        stored.completed_at = task.completed_at;

        Ok(Some(stored.clone()))
    }

    async fn delete_task(&self, owner_id: i64, task_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .tasks
            .get(&task_id)
            .is_some_and(|task| task.owner_id == owner_id);

        if owned {
            tables.tasks.remove(&task_id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
