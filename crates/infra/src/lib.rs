//! Infrastructure layer: configuration and the in-memory entity owner.

pub mod config;
pub mod user_repository;


pub use config::{ConfigError, HooklineConfig};
pub use user_repository::{InMemoryUserRepository, RepositoryError, SaveOutcome};
