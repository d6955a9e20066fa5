//! Scalar values and flat rows.
//!
//! Rows coming back from a joined query are kept untyped until the very last
//! step: every cell is a [`Value`] and a [`Row`] maps column aliases to cells.
//! Typed entities are produced later from reassembled records via
//! [`ValueType`] conversions.

pub mod postgres;
pub(crate) mod sea;
pub mod row;
pub mod types;

pub use row::Row;
pub use types::{Value, ValueType};
