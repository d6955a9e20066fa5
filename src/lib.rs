//! # Joinery
//!
//! A small PostgreSQL entity mapper for the `may` coroutine runtime.
//!
//! Each [`EntityMapper`] is bound to one `schema.table` and a set of named
//! [`Relation`]s. A find builds a single `SELECT`: the primary table's
//! columns, plus, for every relation requested through [`FindOptions`],
//! `LEFT JOIN`s and the related columns aliased `<relation>_<column>`. The
//! flat result rows are then folded back into one [`Record`] per primary
//! `id`, with an array per loaded relation, and finally converted into the
//! caller's type through [`FromRecord`].
//!
//! ```rust,no_run
//! use joinery::{Criteria, DbPoolManager, FindOptions, Orm, OrmConfig, Record, Relation};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OrmConfig::load()?;
//! let orm = Orm::new(Arc::new(DbPoolManager::from_config(&config)?));
//!
//! let posts = orm.mapper::<Record>("test_secondary", "posts");
//! let mut users = orm.mapper::<Record>("test_main", "users");
//! users.add_relation("posts", Relation::one_to_many(posts.table().clone(), "userId"))?;
//!
//! let everyone = users.find_all(&FindOptions::new().with("posts"))?;
//! let john = users.find_by_id(1, &FindOptions::new())?;
//!
//! let mut criteria = Criteria::new("users");
//! criteria.where_("name", "=", "John Doe");
//! let named = users.find(criteria, &FindOptions::new())?;
//! # Ok(())
//! # }
//! ```
//!
//! The API is synchronous; call it from `may` coroutines so that waiting on
//! the database parks the coroutine rather than the thread.

pub mod config;
pub mod connection;
pub mod executor;
pub mod mapper;
pub mod metrics;
pub mod model;
pub mod pool;
pub mod query;
pub mod relation;
pub mod test_helpers;
pub mod value;

pub use config::{DatabaseConfig, OrmConfig};
pub use connection::{connect, ConnectionError};
pub use executor::{OrmError, SchemaExecutor};
pub use mapper::{EntityMapper, Orm};
pub use model::{FromRecord, Record};
pub use pool::DbPoolManager;
pub use query::{ColumnResolver, Criteria, Dialect, FindOptions, SelectStatement, TableRef};
pub use relation::{JoinPlan, Relation, RelationMap, RelationType};
pub use value::{Row, Value, ValueType};
