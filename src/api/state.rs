//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::infra::{Database, JwtDecoder};
use crate::services::{
    AuthService, ProjectService, ServiceContainer, Services, TaskService, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub project_service: Arc<dyn ProjectService>,
    pub task_service: Arc<dyn TaskService>,
    /// Database connection, for health checks
    pub database: Arc<Database>,
    /// Per-request deadline
    pub request_timeout: Duration,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: &Config, decoder: Arc<dyn JwtDecoder>) -> Self {
        let container = Services::from_connection(database.get_connection(), config, decoder);
        Self::from_container(&container, database, config.request_timeout)
    }

    /// Create application state from any service container.
    pub fn from_container(
        container: &dyn ServiceContainer,
        database: Arc<Database>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            project_service: container.projects(),
            task_service: container.tasks(),
            database,
            request_timeout,
        }
    }
}
