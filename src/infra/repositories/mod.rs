//! Repository layer - Data access abstraction
//!
//! Repository traits are what services see; the `*Store` types implement
//! them against one open transaction.

pub(crate) mod entities;
mod paging;
mod project_repository;
mod task_repository;
mod user_repository;

pub use project_repository::{ProjectRepository, ProjectStore};
pub use task_repository::{TaskRepository, TaskStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use project_repository::MockProjectRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use task_repository::MockTaskRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
