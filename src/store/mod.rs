//! Record store subsystem
//!
//! Typed, schema-validated CRUD over one flat file per table.
//!
//! # Design Principles
//!
//! - Schemas are passed in by the caller, never looked up globally
//! - Validation happens before any write; a rejected call changes nothing
//! - Full-file rewrite is the only mutation primitive
//! - Read failures are errors, never an empty table

mod filters;
mod record;
mod record_store;
mod validation;

pub use filters::{FilterOp, Filters, PredicateFilter};
pub use record::Record;
pub use record_store::RecordStore;
pub use validation::{validate_value, RecordValidator};
