//! Report subsystem
//!
//! Renders tabular results to CSV files for humans. Dates print as
//! `MM-DD-YYYY`, timestamps as local `MM-DD-YYYY HH:MM`.

mod table;
mod writer;

pub use table::{format_value, ReportTable, DATETIME_FORMAT, DATE_FORMAT};
pub use writer::{render_csv, report_file_name, ReportWriter};
