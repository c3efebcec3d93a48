/// Task endpoints
///
/// All routes sit behind the bearer-token layer, so every handler receives
/// the caller's [`AuthContext`] and only ever touches that account's tasks.
///
/// - `POST   /tasks` - Create a task
/// - `GET    /tasks` - List own tasks, newest first
/// - `PATCH  /tasks/:id` - Partially update a task
/// - `DELETE /tasks/:id` - Delete a task
///
/// Tasks are returned as:
///
/// ```json
/// {
///   "id": 1,
///   "title": "buy milk",
///   "description": null,
///   "status": "pending",
///   "createdAt": "2025-01-01T12:00:00Z",
///   "completedAt": null
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use todolist_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskChanges},
    tasks::NewTask,
};

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Missing is treated like empty and rejected as a validation error
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: Empty or whitespace-only title
/// - `401 Unauthorized`: Missing or invalid token
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = body?;

    let task = state
        .tasks
        .create_task(
            auth.account_id,
            NewTask {
                title: req.title,
                description: req.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_tasks(auth.account_id).await?;
    Ok(Json(tasks))
}

/// Partially update a task
///
/// Only fields present in the body change. `"description": null` clears the
/// description. Setting `status` to `done` stamps `completedAt`; moving away
/// from `done` clears it.
///
/// # Errors
///
/// - `400 Bad Request`: Empty title or unknown status
/// - `404 Not Found`: No such task among the caller's tasks
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TaskChanges>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(task_id) = id?;
    let Json(changes) = body?;

    let task = state
        .tasks
        .update_task(auth.account_id, task_id, changes)
        .await?;

    Ok(Json(task))
}

/// Delete a task
///
/// # Errors
///
/// - `404 Not Found`: No such task among the caller's tasks, including a
///   second delete of the same id
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(task_id) = id?;

    state.tasks.delete_task(auth.account_id, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
