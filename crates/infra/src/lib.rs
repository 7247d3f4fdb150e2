//! Infrastructure layer: storage adapters and configuration.

pub mod config;
pub mod store;


pub use config::{AppConfig, ConfigError, StoreConfig};
pub use store::{InMemoryStore, PostgresStore};
