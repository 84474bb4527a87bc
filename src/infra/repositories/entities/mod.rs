//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod project;
pub mod task;
pub mod user;
