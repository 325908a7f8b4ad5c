//! Infrastructure: persistent storage and application configuration.

pub mod config;
pub mod db;
pub mod sqlite_store;

pub use config::{ApiToken, AppConfig, ConfigError, InsightConfig, VisionConfig};
pub use sqlite_store::SqliteInventoryStore;
