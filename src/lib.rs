//! Task Manager - multi-tenant project and task tracking API
//!
//! Authenticated users own projects; projects contain tasks. Callers
//! authenticate with bearer JWTs from an external identity provider, and
//! first-seen token subjects are provisioned as local users on the fly.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and field rules
//! - **services**: Application use cases and business logic
//! - **infra**: Database, repositories, transactions, token verification
//! - **api**: HTTP handlers, extractors, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (runs pending migrations first)
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{Password, Project, Task, User, UserRole};
pub use errors::{AppError, AppResult};
