// src/schema/mod.rs

pub mod builtin;
pub mod types;

pub use builtin::{by_name, players, staff, teams, tournaments};
pub use types::{ColumnMap, ColumnSchema, Field, FieldKind, Identity};
