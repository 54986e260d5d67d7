//! CLI argument definitions using clap
//!
//! Commands:
//! - chocan init
//! - chocan member add|update|remove|show|suspend|reinstate
//! - chocan provider add|update|remove|show|set-password|verify-password
//! - chocan directory add|update|remove|show|list|export
//! - chocan service record
//! - chocan report member|provider|summary

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ChocAn data center record management
#[derive(Parser, Debug)]
#[command(name = "chocan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./chocan.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration (if absent) and create its directories
    Init {
        /// Data directory for a newly written configuration
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Reports directory for a newly written configuration
        #[arg(long)]
        reports_dir: Option<PathBuf>,
    },

    /// Member records
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Provider records
    Provider {
        #[command(subcommand)]
        action: ProviderAction,
    },

    /// Provider directory (billable services)
    Directory {
        #[command(subcommand)]
        action: DirectoryAction,
    },

    /// Service billing entries
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },

    /// Weekly reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
}

/// Name and mailing address of a member or provider
#[derive(Args, Debug, Clone)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub zipcode: i64,
}

/// Contact fields to change
#[derive(Args, Debug, Clone)]
pub struct ContactUpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zipcode: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum MemberAction {
    /// Enroll a member; the member number is assigned
    Add(ContactArgs),
    /// Change member fields
    Update {
        id: i64,
        #[command(flatten)]
        fields: ContactUpdateArgs,
    },
    Remove { id: i64 },
    Show { id: i64 },
    Suspend { id: i64 },
    Reinstate { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ProviderAction {
    /// Register a provider; the provider number is assigned
    Add(ContactArgs),
    /// Change provider fields
    Update {
        id: i64,
        #[command(flatten)]
        fields: ContactUpdateArgs,
    },
    Remove { id: i64 },
    Show { id: i64 },
    SetPassword {
        id: i64,
        #[arg(long)]
        password: String,
    },
    VerifyPassword {
        id: i64,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DirectoryAction {
    /// Add a service under a six-digit code
    Add {
        #[arg(long)]
        code: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        dollars: i64,
        #[arg(long, default_value_t = 0)]
        cents: i64,
    },
    Update {
        code: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        dollars: Option<i64>,
        #[arg(long)]
        cents: Option<i64>,
    },
    Remove { code: i64 },
    Show { code: i64 },
    /// All services, sorted by name
    List,
    /// Write the directory to a report file
    Export,
}

#[derive(Subcommand, Debug)]
pub enum ServiceAction {
    /// Record a service rendered to a member
    Record {
        #[arg(long)]
        provider: i64,
        #[arg(long)]
        member: i64,
        #[arg(long)]
        service: i64,
        /// Date of service, MM-DD-YYYY or YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long, default_value = "")]
        comments: String,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ReportAction {
    Member,
    Provider,
    Summary,
}

/// Accepts `MM-DD-YYYY` or `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%m-%d-%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| format!("invalid date '{}': expected MM-DD-YYYY or YYYY-MM-DD", s))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("03-09-2024").unwrap(), expected);
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert!(parse_date("9 March").is_err());
    }

    #[test]
    fn test_member_update_parses() {
        let cli = Cli::try_parse_from([
            "chocan",
            "--config",
            "c.json",
            "member",
            "update",
            "1000000000",
            "--city",
            "Portland",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("c.json"));
        match cli.command {
            Command::Member {
                action: MemberAction::Update { id, fields },
            } => {
                assert_eq!(id, 1_000_000_000);
                assert_eq!(fields.city.as_deref(), Some("Portland"));
                assert!(fields.name.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["chocan", "report", "summary"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./chocan.json"));
    }
}
