//! OpenAPI documentation configuration.
//!
//! Served at `/v3/api-docs`, browsable through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{health_handler, project_handler, task_handler, user_handler};
use crate::domain::{
    CreateUserRequest, ProjectRequest, ProjectResponse, TaskRequest, TaskResponse, TaskStatus,
    UpdateUserPasswordRequest, UpdateUserRequest, UserResponse, UserRole,
};
use crate::errors::ErrorResponse;

/// OpenAPI documentation for the task manager API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task Manager API",
        version = "0.1.0",
        description = "Projects and tasks owned by authenticated users",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        health_handler::health_check,
        // Users
        user_handler::register,
        user_handler::get_account,
        user_handler::update_account,
        user_handler::update_password,
        user_handler::get_user,
        user_handler::update_user,
        // Projects
        project_handler::create_project,
        project_handler::list_projects,
        project_handler::get_project,
        project_handler::update_project,
        project_handler::delete_project,
        project_handler::delete_account_project,
        // Tasks
        task_handler::create_task,
        task_handler::list_tasks,
        task_handler::get_task,
        task_handler::update_task,
        task_handler::delete_task,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UpdateUserPasswordRequest,
            ProjectRequest,
            ProjectResponse,
            TaskStatus,
            TaskRequest,
            TaskResponse,
            ErrorResponse,
            health_handler::HealthResponse,
            health_handler::ServiceStatus,
            health_handler::ServiceHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and datastore connectivity"),
        (name = "Users", description = "Registration"),
        (name = "Account", description = "The caller's own account"),
        (name = "Admin", description = "User administration"),
        (name = "Projects", description = "Projects owned by the caller"),
        (name = "Tasks", description = "Tasks inside the caller's projects")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/users",
            "/api/account",
            "/api/account/password",
            "/api/account/projects/{projectId}",
            "/api/admin/users/{id}",
            "/api/projects",
            "/api/projects/{projectId}",
            "/api/projects/{projectId}/tasks",
            "/api/projects/{projectId}/tasks/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_error_responses_reference_the_envelope() {
        let doc = ApiDoc::openapi();
        assert!(doc.components.unwrap().schemas.contains_key("ErrorResponse"));

        let json = serde_json::to_value(&ApiDoc::openapi()).unwrap();
        let not_found = &json["paths"]["/api/projects/{projectId}"]["get"]["responses"]["404"];
        assert_eq!(
            not_found["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ErrorResponse"
        );
    }
}
