//! Connection pooling and the PostgreSQL executor.

pub mod config;
pub mod manager;

pub use config::{DatabaseConfig, OrmConfig};
pub use manager::{DbPoolManager, PooledConnection, SchemaPool};
