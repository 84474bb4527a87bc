//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Unit of Work for transaction management
//! - JWT verification against the identity provider

pub mod db;
pub mod jwt;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use jwt::{JwksDecoder, JwtDecoder, SecretDecoder};
pub use repositories::{
    ProjectRepository, ProjectStore, TaskRepository, TaskStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockProjectRepository, MockTaskRepository, MockUserRepository};
