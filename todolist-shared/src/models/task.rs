/// Task model and database operations
///
/// Every task belongs to exactly one account. All queries in this module are
/// filtered by both the task id and the owner id, so a task owned by someone
/// else behaves exactly like a task that does not exist.
///
/// # Status
///
/// ```text
/// pending ⇄ in-progress ⇄ done
/// ```
///
/// Any status can move to any other. `completed_at` follows the status:
/// every update that sets `done` stamps it, and leaving `done` clears it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in-progress', 'done');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     owner_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
///     title TEXT NOT NULL CHECK (length(btrim(title)) > 0),
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completed_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;

/// Task progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started (default)
    #[default]
    Pending,

    /// Being worked on
    InProgress,

    /// Finished; `completed_at` is set
    Done,
}

impl TaskStatus {
    /// Wire/storage spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// A to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned identifier, immutable
    pub id: i64,

    /// Owning account, immutable
    #[serde(skip_serializing, default)]
    pub owner_id: i64,

    /// Non-empty title
    pub title: String,

    /// Optional free text
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last marked `done` (None unless status is `done`)
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub owner_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial update of a task
///
/// `None` leaves a field untouched. For `description`, `Some(None)` clears
/// it; a JSON `null` deserializes to that thanks to [`deserialize_some`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskChanges {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Distinguishes an explicit `null` from an absent field
///
/// Used with `#[serde(default)]`: absent → `None`, `null` → `Some(None)`.
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

impl Task {
    /// Applies a partial update in place
    ///
    /// Completion rules:
    /// - setting `done` stamps `completed_at = now`, even if already done
    /// - leaving `done` clears `completed_at`
    /// - changes without a status leave `completed_at` alone
    pub fn apply_changes(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            if status.is_done() {
                self.completed_at = Some(now);
            } else if self.status.is_done() {
                self.completed_at = None;
            }
            self.status = status;
        }
    }

    /// Inserts a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, title, description, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, title, description, status, created_at, completed_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.created_at)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists an owner's tasks, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, status, created_at, completed_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Finds a task only if `owner_id` owns it
    pub async fn find_owned(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, status, created_at, completed_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Writes the mutable fields of `task` back, scoped to its owner
    ///
    /// Returns `None` if the row vanished or changed hands in between.
    pub async fn save_owned(pool: &PgPool, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        let saved = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, status = $5, completed_at = $6
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, status, created_at, completed_at
            "#,
        )
        .bind(task.id)
        .bind(task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.completed_at)
        .fetch_optional(pool)
        .await?;

        Ok(saved)
    }

    /// Deletes a task only if `owner_id` owns it
    ///
    /// Returns true if a row was removed.
    pub async fn delete_owned(pool: &PgPool, owner_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_task() -> Task {
        Task {
            id: 1,
            owner_id: 10,
            title: "buy milk".to_string(),
            description: None,
            status: TaskStatus::Pending,
            created_at: Utc::now() - Duration::minutes(5),
            completed_at: None,
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"done\"").unwrap(),
            TaskStatus::Done
        );
        assert!(serde_json::from_str::<TaskStatus>("\"finished\"").is_err());
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
    }

    #[test]
    fn test_task_json_shape() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["title"], "buy milk");
        assert_eq!(json["status"], "pending");
        assert!(json["createdAt"].is_string());
        assert!(json["completedAt"].is_null());
        assert!(json["description"].is_null());
        assert!(json.get("ownerId").is_none());
    }

    #[test]
    fn test_changes_distinguish_null_from_absent() {
        let absent: TaskChanges = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: TaskChanges = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: TaskChanges = serde_json::from_str(r#"{"description":"2 liters"}"#).unwrap();
        assert_eq!(set.description, Some(Some("2 liters".to_string())));

        let empty: TaskChanges = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_entering_done_stamps_completion() {
        let mut task = sample_task();
        let now = Utc::now();

        task.apply_changes(
            TaskChanges {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
            now,
        );

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.completed_at, Some(now));
        assert!(task.completed_at.unwrap() >= task.created_at);
    }

    #[test]
    fn test_repeating_done_restamps() {
        let mut task = sample_task();
        let first = Utc::now();
        task.apply_changes(
            TaskChanges {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
            first,
        );

        task.apply_changes(
            TaskChanges {
                status: Some(TaskStatus::Done),
                title: Some("buy oat milk".to_string()),
                ..Default::default()
            },
            first + Duration::minutes(1),
        );

        assert_eq!(task.completed_at, Some(first + Duration::minutes(1)));
        assert_eq!(task.title, "buy oat milk");

        // No status in the change, no new stamp
        task.apply_changes(
            TaskChanges {
                title: Some("buy soy milk".to_string()),
                ..Default::default()
            },
            first + Duration::minutes(2),
        );
        assert_eq!(task.completed_at, Some(first + Duration::minutes(1)));
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn test_leaving_done_clears_stamp() {
        let mut task = sample_task();
        task.apply_changes(
            TaskChanges {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
            Utc::now(),
        );

        task.apply_changes(
            TaskChanges {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_non_done_transitions_never_stamp() {
        let mut task = sample_task();
        task.apply_changes(
            TaskChanges {
                status: Some(TaskStatus::InProgress),
                description: Some(Some("soon".to_string())),
                ..Default::default()
            },
            Utc::now(),
        );

        assert!(task.completed_at.is_none());
        assert_eq!(task.description.as_deref(), Some("soon"));

        task.apply_changes(
            TaskChanges {
                description: Some(None),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(task.description.is_none());
    }
}
