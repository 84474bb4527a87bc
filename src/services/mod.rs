//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management: one service call, one transaction.

mod auth_service;
mod authorities;
pub mod container;
mod project_service;
pub mod seeder;
mod task_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator};
pub use authorities::KeycloakAuthorities;
pub use project_service::{ProjectManager, ProjectService};
pub use seeder::seed_default_user;
pub use task_service::{TaskManager, TaskService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
