//! Task handlers. Every route is scoped to a project the caller owns.

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::{CurrentUser, Pagination, ValidatedJson, ValidatedPath};
use crate::api::AppState;
use crate::config::TASK_SORT_PROPERTIES;
use crate::domain::{NewTaskRequest, TaskRequest, TaskResponse};
use crate::errors::AppResult;
use crate::types::{NoContent, PageQuery, Paged};

/// `/api/projects/{projectId}/tasks`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ProjectTasksPath {
    /// Project ID
    #[serde(rename = "projectId")]
    pub project_id: Uuid,
}

/// `/api/projects/{projectId}/tasks/{id}`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct TaskPath {
    /// Project ID
    #[serde(rename = "projectId")]
    pub project_id: Uuid,
    /// Task ID
    pub id: Uuid,
}

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/projects/:projectId/tasks",
            get(list_tasks).post(create_task),
        )
        .route(
            "/api/projects/:projectId/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
}

/// Create a task
#[utoipa::path(
    post,
    path = "/api/projects/{projectId}/tasks",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(ProjectTasksPath),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Project not found or not owned by current user", body = ErrorResponse)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<ProjectTasksPath>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(payload): ValidatedJson<NewTaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let task = state
        .task_service
        .create(user_id, path.project_id, payload)
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

/// List tasks of a project, one page at a time
///
/// Out of range `page` and `size` are clamped.
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/tasks",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(ProjectTasksPath, PageQuery),
    responses(
        (status = 200, description = "One page of tasks", body = [TaskResponse],
            headers(
                ("Link" = String, description = "prev, first, last and next page URIs"),
                ("X-Total-Count" = u64, description = "Total number of tasks in the project")
            )),
        (status = 404, description = "Project not found or not owned by current user", body = ErrorResponse)
    )
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<ProjectTasksPath>,
    CurrentUser(user_id): CurrentUser,
    pagination: Pagination,
) -> AppResult<Paged<TaskResponse>> {
    let request = pagination.query.clamped(TASK_SORT_PROPERTIES);
    let page = state
        .task_service
        .page(user_id, path.project_id, request)
        .await?;
    Ok(Paged::new(page.map(TaskResponse::from), pagination.base))
}

/// Get a task
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/tasks/{id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(TaskPath),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 404, description = "Task or project not found", body = ErrorResponse)
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<TaskPath>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<TaskResponse>> {
    let task = state
        .task_service
        .get(user_id, path.project_id, path.id)
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Update the fields present in the body
#[utoipa::path(
    patch,
    path = "/api/projects/{projectId}/tasks/{id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(TaskPath),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Task or project not found", body = ErrorResponse)
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<TaskPath>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(payload): ValidatedJson<TaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let task = state
        .task_service
        .update(user_id, path.project_id, path.id, payload)
        .await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}/tasks/{id}",
    tag = "Tasks",
    security(("bearer_auth" = [])),
    params(TaskPath),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task or project not found", body = ErrorResponse)
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<TaskPath>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<NoContent> {
    state
        .task_service
        .delete(user_id, path.project_id, path.id)
        .await?;
    Ok(NoContent)
}
