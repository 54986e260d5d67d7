//! Schema registry subsystem
//!
//! Every table has a statically declared schema: ordered columns, a scalar
//! type per column, and optional numeric-range and character limits. The
//! first column is the table's integer primary identifier.
//!
//! # Design Principles
//!
//! - Declared once at startup, read-only afterwards
//! - Passed by reference to every component, never a global
//! - No nulls or implicit coercion in stored records (ints widen to floats)

mod registry;
mod types;
mod value;

pub use registry::{
    SchemaRegistry, FIRST_ID, MAX_ID, MEMBERS, PROVIDERS, PROVIDER_DIRECTORY, SERVICE_LOG,
};
pub use types::{ColumnDef, ColumnSpec, ColumnType, NumericRange, TableSchema};
pub use value::Value;
