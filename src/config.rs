//! Configuration re-exported at the crate root.
//!
//! [`OrmConfig::load`] reads `config/config.toml` and `JOINERY__*`
//! environment variables; [`DbPoolManager::from_config`](crate::DbPoolManager::from_config)
//! turns the result into one pool per schema.

pub use crate::pool::config::*;
