/// Ownership-scoped task service
///
/// Every operation takes the caller's account id (from
/// [`crate::auth::service::CredentialService::verify`]) and uses it as the
/// only scoping key. A task that belongs to another account yields exactly
/// the same `NotFound` as a task that never existed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    error::{ServiceError, ServiceResult},
    models::task::{CreateTask, Task, TaskChanges},
    store::TaskStore,
};

/// Fields accepted when creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

/// Service for task CRUD
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Creates a pending task owned by `account_id`
    ///
    /// # Errors
    ///
    /// `Validation` if the title is empty or whitespace; the store is not
    /// touched in that case.
    pub async fn create_task(&self, account_id: i64, input: NewTask) -> ServiceResult<Task> {
        let title = clean_title(&input.title)?;

        let task = self
            .tasks
            .insert_task(CreateTask {
                owner_id: account_id,
                title,
                description: input.description,
                created_at: Utc::now(),
            })
            .await?;

        info!(account_id, task_id = task.id, "Task created");
        Ok(task)
    }

    /// The caller's tasks, newest first
    pub async fn list_tasks(&self, account_id: i64) -> ServiceResult<Vec<Task>> {
        let tasks = self.tasks.list_tasks(account_id).await?;
        debug!(account_id, count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Applies a partial update to one of the caller's tasks
    ///
    /// An update with no fields returns the task as stored without writing.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the caller owns no task with `task_id`
    /// - `Validation` if a provided title is empty
    pub async fn update_task(
        &self,
        account_id: i64,
        task_id: i64,
        mut changes: TaskChanges,
    ) -> ServiceResult<Task> {
        if let Some(title) = changes.title.take() {
            changes.title = Some(clean_title(&title)?);
        }

        let mut task = self
            .tasks
            .find_task(account_id, task_id)
            .await?
            .ok_or_else(ServiceError::task_not_found)?;

        if changes.is_empty() {
            debug!(account_id, task_id, "Empty update, nothing to save");
            return Ok(task);
        }

        task.apply_changes(changes, Utc::now());

        // Deleted between the read and the write
        let saved = self
            .tasks
            .save_task(&task)
            .await?
            .ok_or_else(ServiceError::task_not_found)?;

        info!(
            account_id,
            task_id,
            status = saved.status.as_str(),
            "Task updated"
        );
        Ok(saved)
    }

    /// Permanently deletes one of the caller's tasks
    ///
    /// # Errors
    ///
    /// `NotFound` if the caller owns no task with `task_id`, including when
    /// it was already deleted.
    pub async fn delete_task(&self, account_id: i64, task_id: i64) -> ServiceResult<()> {
        if !self.tasks.delete_task(account_id, task_id).await? {
            return Err(ServiceError::task_not_found());
        }

        info!(account_id, task_id, "Task deleted");
        Ok(())
    }
}

fn clean_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::validation("title", "Title must not be empty"));
    }
    Ok(title.to_string())
}
