//! Project handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::{CurrentUser, Pagination, ValidatedJson, ValidatedPath};
use crate::api::AppState;
use crate::config::PROJECT_SORT_PROPERTIES;
use crate::domain::{ProjectRequest, ProjectResponse};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, PageQuery, Paged};

/// `/api/projects/{projectId}`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ProjectPath {
    /// Project ID
    #[serde(rename = "projectId")]
    pub project_id: Uuid,
}

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:projectId",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/api/account/projects/:projectId", delete(delete_account_project))
}

/// Create a project owned by the caller
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse,
            headers(("Location" = String, description = "URI of the new project"))),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(payload): ValidatedJson<ProjectRequest>,
) -> AppResult<Created<ProjectResponse>> {
    let project = state.project_service.create(user_id, payload).await?;
    Ok(Created::at(
        format!("/api/projects/{}", project.id),
        ProjectResponse::from(project),
    ))
}

/// List the caller's projects, one page at a time
///
/// Out of range `page` or `size` is rejected. Sort keys outside
/// `createdAt`, `name` and `id` are dropped.
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "One page of projects", body = [ProjectResponse],
            headers(
                ("Link" = String, description = "prev, first, last and next page URIs"),
                ("X-Total-Count" = u64, description = "Total number of projects")
            )),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    pagination: Pagination,
) -> AppResult<Paged<ProjectResponse>> {
    let request = pagination.query.checked(PROJECT_SORT_PROPERTIES)?;
    let page = state.project_service.page(user_id, request).await?;
    Ok(Paged::new(page.map(ProjectResponse::from), pagination.base))
}

/// Get one of the caller's projects
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(ProjectPath),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 400, description = "Malformed project ID", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<ProjectPath>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<ProjectResponse>> {
    let project = state.project_service.get(user_id, path.project_id).await?;
    Ok(Json(ProjectResponse::from(project)))
}

/// Rename one of the caller's projects
#[utoipa::path(
    patch,
    path = "/api/projects/{projectId}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(ProjectPath),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<ProjectPath>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(payload): ValidatedJson<ProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .update_name(user_id, path.project_id, payload)
        .await?;
    Ok(Json(ProjectResponse::from(project)))
}

/// Delete one of the caller's projects and all of its tasks
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}",
    tag = "Projects",
    security(("bearer_auth" = [])),
    params(ProjectPath),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<ProjectPath>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<NoContent> {
    state.project_service.delete(user_id, path.project_id).await?;
    Ok(NoContent)
}

/// Remove a project from the caller's account
#[utoipa::path(
    delete,
    path = "/api/account/projects/{projectId}",
    tag = "Account",
    security(("bearer_auth" = [])),
    params(ProjectPath),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
pub async fn delete_account_project(
    state: State<AppState>,
    path: ValidatedPath<ProjectPath>,
    user: CurrentUser,
) -> AppResult<NoContent> {
    delete_project(state, path, user).await
}
