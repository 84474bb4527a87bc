//! Domain layer - Core business entities and logic
//!
//! Entities, request/response shapes and the field rules they carry.
//! Nothing here touches the database or HTTP.

pub mod authentication;
pub mod password;
pub mod project;
pub mod task;
pub mod user;
pub mod validation;

pub use authentication::{Authentication, Claims, Principal};
pub use password::Password;
pub use project::{Project, ProjectRequest, ProjectResponse};
pub use task::{NewTaskRequest, Task, TaskRequest, TaskResponse, TaskStatus};
pub use user::{
    normalize_email, CreateUserRequest, UpdateUserPasswordRequest, UpdateUserRequest, User,
    UserResponse, UserRole,
};
