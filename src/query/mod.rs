//! Query construction: criteria, the statement AST, column resolution and
//! find options.

pub mod columns;
pub mod criteria;
pub mod options;
pub mod statement;

pub use columns::ColumnResolver;
pub use criteria::Criteria;
pub use options::FindOptions;
pub use statement::{ColumnRef, Dialect, Filter, Join, Projection, SelectStatement, TableRef, Term};
