//! JournalScope Common Library
//!
//! Shared code for the JournalScope analysis engine including:
//! - Catalog domain model and store contract
//! - SeaORM entities and repository
//! - Error types and handling
//! - Configuration management
//! - Request-scoped cancellation
//! - Metrics helpers

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use cancel::{CancelHandle, Cancellation};
pub use catalog::CatalogStore;
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
