//! CLI module
//!
//! Non-interactive command dispatcher over the domain services. Responses
//! go to stdout as single JSON objects; logs go to stderr.

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{
    parse_date, Cli, Command, ContactArgs, ContactUpdateArgs, DirectoryAction, MemberAction,
    ProviderAction, ReportAction, ServiceAction,
};
pub use commands::{execute, init, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
