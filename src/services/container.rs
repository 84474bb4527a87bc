//! Service Container - Centralized service access.
//!
//! The composition root: one [`Persistence`] unit of work shared by every
//! service, handed out as trait objects.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AuthService, Authenticator, KeycloakAuthorities, ProjectManager, ProjectService, TaskManager,
    TaskService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{JwtDecoder, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn projects(&self) -> Arc<dyn ProjectService>;

    fn tasks(&self) -> Arc<dyn TaskService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    project_service: Arc<dyn ProjectService>,
    task_service: Arc<dyn TaskService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        project_service: Arc<dyn ProjectService>,
        task_service: Arc<dyn TaskService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            project_service,
            task_service,
        }
    }

    /// Wire every service over one connection pool.
    ///
    /// The dev user override is only honoured in a dev profile.
    pub fn from_connection(
        db: DatabaseConnection,
        config: &Config,
        decoder: Arc<dyn JwtDecoder>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let dev_user_id = config.dev_user_id.filter(|_| config.is_dev_profile());

        let auth_service = Arc::new(Authenticator::new(
            uow.clone(),
            decoder,
            KeycloakAuthorities::new(config.oauth2_client_id.clone()),
            dev_user_id,
            config.password_hash_strength,
        ));
        let user_service = Arc::new(UserManager::new(uow.clone(), config.password_hash_strength));
        let project_service = Arc::new(ProjectManager::new(uow.clone()));
        let task_service = Arc::new(TaskManager::new(uow));

        Self::new(auth_service, user_service, project_service, task_service)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn projects(&self) -> Arc<dyn ProjectService> {
        self.project_service.clone()
    }

    fn tasks(&self) -> Arc<dyn TaskService> {
        self.task_service.clone()
    }
}
