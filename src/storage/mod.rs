//! Table storage subsystem
//!
//! One file per table, `<data_dir>/<table>.tbl`, rewritten whole on every
//! mutation.
//!
//! # Design Principles
//!
//! - Self-describing files (schema travels with data)
//! - Checksum-verified on every read
//! - Atomic replace via temp file and rename
//! - Halt on corruption: unreadable files are never treated as empty

mod checksum;
mod codec;
mod table_file;

pub use checksum::compute_checksum;
pub use codec::{decode_table, encode_table, DecodedTable, FORMAT_VERSION, MAGIC};
pub use table_file::{TableFile, TABLE_EXTENSION};
