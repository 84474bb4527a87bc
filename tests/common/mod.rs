//! Shared test fixtures: mocked repositories, a unit of work over them, a
//! static token decoder and an in-memory application.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mockall::mock;
use sea_orm::ConnectOptions;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use taskmanager::api::{create_router, AppState};
use taskmanager::config::Config;
use taskmanager::domain::{Claims, Project, Task, User};
use taskmanager::errors::{AppError, AppResult};
use taskmanager::infra::{
    Database, JwtDecoder, ProjectRepository, TaskRepository, TransactionContext, TxFuture,
    UnitOfWork, UserRepository,
};
use taskmanager::types::PageRequest;

// =============================================================================
// Mocked repositories
// =============================================================================

mock! {
    pub Users {}

    #[async_trait]
    impl UserRepository for Users {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
        async fn exists_by_id(&self, id: Uuid) -> AppResult<bool>;
        async fn insert(&self, user: User) -> AppResult<User>;
        async fn update(&self, user: User) -> AppResult<User>;
        async fn delete(&self, id: Uuid) -> AppResult<()>;
    }
}

mock! {
    pub Projects {}

    #[async_trait]
    impl ProjectRepository for Projects {
        async fn find_by_id_and_owner_id(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Project>>;
        async fn find_all_by_owner_id(&self, owner_id: Uuid) -> AppResult<Vec<Project>>;
        async fn find_page_by_owner_id(&self, owner_id: Uuid, request: &PageRequest) -> AppResult<(Vec<Project>, u64)>;
        async fn insert(&self, project: Project) -> AppResult<Project>;
        async fn update(&self, project: Project) -> AppResult<Project>;
        async fn delete(&self, id: Uuid) -> AppResult<()>;
    }
}

mock! {
    pub Tasks {}

    #[async_trait]
    impl TaskRepository for Tasks {
        async fn find_by_id_and_project_id(&self, id: Uuid, project_id: Uuid) -> AppResult<Option<Task>>;
        async fn find_all_by_project_id(&self, project_id: Uuid) -> AppResult<Vec<Task>>;
        async fn find_page_by_project_id(&self, project_id: Uuid, request: &PageRequest) -> AppResult<(Vec<Task>, u64)>;
        async fn insert(&self, task: Task) -> AppResult<Task>;
        async fn update(&self, task: Task) -> AppResult<Task>;
        async fn delete(&self, id: Uuid) -> AppResult<()>;
        async fn delete_all_by_project_id(&self, project_id: Uuid) -> AppResult<u64>;
    }
}

/// Unit of work handing every closure the same mocked repositories.
///
/// Unconfigured mocks panic when called, so tests only set up the
/// repositories they expect to be touched.
pub struct TestUnitOfWork {
    pub users: MockUsers,
    pub projects: MockProjects,
    pub tasks: MockTasks,
}

impl TestUnitOfWork {
    pub fn new() -> Self {
        Self {
            users: MockUsers::new(),
            projects: MockProjects::new(),
            tasks: MockTasks::new(),
        }
    }

    pub fn with_users(users: MockUsers) -> Self {
        Self {
            users,
            ..Self::new()
        }
    }

    fn context(&self) -> TransactionContext<'_> {
        TransactionContext::new(&self.users, &self.projects, &self.tasks)
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        f(self.context()).await
    }

    async fn read_only<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        f(self.context()).await
    }
}

// =============================================================================
// Token decoder
// =============================================================================

/// Maps `<role>_<sub>` or `<role>:<sub>` tokens to claims with that subject,
/// `<sub>@example.com` as email and `role` as the only realm role.
pub struct StaticDecoder;

pub fn claims_for(role: &str, sub: &str) -> Claims {
    let value = json!({
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "realm_access": { "roles": [role] },
    });
    match value {
        Value::Object(claims) => claims,
        _ => Claims::new(),
    }
}

#[async_trait]
impl JwtDecoder for StaticDecoder {
    async fn decode(&self, token: &str) -> AppResult<Claims> {
        let (role, sub) = token
            .split_once(['_', ':'])
            .filter(|(role, sub)| !role.is_empty() && !sub.is_empty())
            .ok_or(AppError::Unauthorized)?;
        Ok(claims_for(role, sub))
    }
}

pub fn user_token(id: Uuid) -> String {
    format!("user_{id}")
}

pub fn admin_token(id: Uuid) -> String {
    format!("admin:{id}")
}

// =============================================================================
// In-memory application
// =============================================================================

/// Router backed by a fresh SQLite in-memory database.
pub struct TestApp {
    pub router: Router,
    pub database: Arc<Database>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(StaticDecoder)).await
    }

    /// Same as [`TestApp::spawn`] with a custom token decoder.
    pub async fn spawn_with(decoder: Arc<dyn JwtDecoder>) -> Self {
        // One connection, so every query sees the same in-memory database
        let options = ConnectOptions::new("sqlite::memory:")
            .max_connections(1)
            .min_connections(1)
            .to_owned();
        let database = Database::connect_with(options)
            .await
            .expect("in-memory database");
        database.run_migrations().await.expect("migrations");
        let database = Arc::new(database);

        let mut config = Config::default();
        config.password_hash_strength = 1;

        let state = AppState::from_config(database.clone(), &config, decoder);
        Self {
            router: create_router(state),
            database,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        read(response).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register a user and return its id.
    pub async fn register(&self, email: &str) -> Uuid {
        let response = self
            .post(
                "/api/users",
                None,
                json!({ "email": email, "password": "Password123" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        id_of(&response.body)
    }

    /// Create a project and return its id.
    pub async fn create_project(&self, token: &str, name: &str) -> Uuid {
        let response = self.post("/api/projects", Some(token), json!({ "name": name })).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        id_of(&response.body)
    }

    /// Create a task and return its id.
    pub async fn create_task(&self, token: &str, project_id: Uuid, body: Value) -> Uuid {
        let response = self
            .post(&format!("/api/projects/{project_id}/tasks"), Some(token), body)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        id_of(&response.body)
    }
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("id in body")
}

async fn read(response: Response<Body>) -> TestResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    TestResponse {
        status,
        headers,
        body,
    }
}
