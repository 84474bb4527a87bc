//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` (alias `run`) - Start the HTTP server
//! - `migrate` - Database migrations

pub mod args;

pub use args::{Cli, Commands};
