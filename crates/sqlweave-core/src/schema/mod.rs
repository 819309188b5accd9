//! Table schemas: column specifications and their inference from data.

mod infer;
mod types;

pub use infer::{columns_from_hints, infer_columns, Row};
pub use types::{ColumnOverride, ColumnSpec, ForeignKeyAction, ForeignKeyRef, LogicalType};
