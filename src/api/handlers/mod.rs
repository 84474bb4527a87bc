//! HTTP request handlers.

pub mod health_handler;
pub mod project_handler;
pub mod task_handler;
pub mod user_handler;

pub use health_handler::health_routes;
pub use project_handler::project_routes;
pub use task_handler::task_routes;
pub use user_handler::{account_routes, admin_routes, user_routes};
