//! CLI command implementations
//!
//! Each command loads the configuration, builds the registry, store and
//! report writer, runs one domain operation and prints one JSON response.

use std::fs;
use std::path::Path;

use chrono::{Local, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::observability::{log_event, Event, Logger};
use crate::report::ReportWriter;
use crate::schema::SchemaRegistry;
use crate::services::{
    MemberUpdate, NewMember, NewProvider, NewService, NewServiceEntry, ProviderUpdate,
    ServiceUpdate, Services,
};
use crate::store::RecordStore;

use super::args::{
    Cli, Command, ContactArgs, ContactUpdateArgs, DirectoryAction, MemberAction, ProviderAction,
    ReportAction, ServiceAction,
};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(&cli.config, cli.command)
}

/// Runs one command and prints its response
pub fn run_command(config_path: &Path, cmd: Command) -> CliResult<()> {
    let name = command_name(&cmd);
    match execute(config_path, cmd) {
        Ok(data) => {
            log_event(Event::CommandComplete, &[("command", name)]);
            write_response(data)
        }
        Err(e) => {
            log_event(
                Event::CommandFailed,
                &[("command", name), ("code", e.code_str()), ("message", e.message())],
            );
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Runs one command and returns its response data
pub fn execute(config_path: &Path, cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Init {
            data_dir,
            reports_dir,
        } => init(config_path, data_dir.as_deref(), reports_dir.as_deref()),
        Command::Member { action } => with_services(config_path, |s| member(s, action)),
        Command::Provider { action } => with_services(config_path, |s| provider(s, action)),
        Command::Directory { action } => with_services(config_path, |s| directory(s, action)),
        Command::Service { action } => with_services(config_path, |s| service(s, action)),
        Command::Report { action } => with_services(config_path, |s| report(s, action)),
    }
}

fn command_name(cmd: &Command) -> &'static str {
    match cmd {
        Command::Init { .. } => "init",
        Command::Member { .. } => "member",
        Command::Provider { .. } => "provider",
        Command::Directory { .. } => "directory",
        Command::Service { .. } => "service",
        Command::Report { .. } => "report",
    }
}

/// Writes a default configuration if none exists, then creates the data
/// and reports directories.
pub fn init(
    config_path: &Path,
    data_dir: Option<&Path>,
    reports_dir: Option<&Path>,
) -> CliResult<Value> {
    let (config, created) = if config_path.exists() {
        (Config::load(config_path)?, false)
    } else {
        let mut config = Config::default_for(config_path);
        if let Some(dir) = data_dir {
            config.data_dir = dir.to_path_buf();
        }
        if let Some(dir) = reports_dir {
            config.reports_dir = dir.to_path_buf();
        }
        config.save_new(config_path)?;
        (config, true)
    };
    Logger::set_min_severity(config.severity()?);

    for dir in [config.data_path(), config.reports_path()] {
        fs::create_dir_all(&dir).map_err(|e| {
            CliError::io_error(format!("failed to create directory {}: {}", dir.display(), e))
        })?;
    }

    let data_path = config.data_path().display().to_string();
    log_event(Event::WorkspaceInitialized, &[("data_dir", &data_path)]);

    Ok(json!({
        "initialized": true,
        "config_created": created,
        "data_dir": data_path,
        "reports_dir": config.reports_path().display().to_string(),
    }))
}

/// Boots the store for one command
fn with_services<F>(config_path: &Path, f: F) -> CliResult<Value>
where
    F: FnOnce(&Services<'_>) -> CliResult<Value>,
{
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    log_event(
        Event::ConfigLoaded,
        &[("config", &config_path.display().to_string())],
    );

    let data_dir = config.data_path();
    if !data_dir.is_dir() {
        return Err(CliError::not_initialized(&data_dir));
    }

    let registry = SchemaRegistry::standard()?;
    let store = RecordStore::open(data_dir)?;
    let reports = ReportWriter::new(config.reports_path());
    let services = Services::new(&registry, &store, &reports);
    f(&services)
}

fn to_json<T: Serialize>(value: &T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn member(services: &Services<'_>, action: MemberAction) -> CliResult<Value> {
    match action {
        MemberAction::Add(contact) => {
            let id = services.add_member(new_member(contact))?;
            Ok(json!({ "member_id": id }))
        }
        MemberAction::Update { id, fields } => {
            to_json(&services.update_member(id, member_update(fields))?)
        }
        MemberAction::Remove { id } => {
            Ok(json!({ "member_id": id, "removed": services.remove_member(id)? }))
        }
        MemberAction::Show { id } => to_json(&services.get_member(id)?),
        MemberAction::Suspend { id } => to_json(&services.set_member_suspended(id, true)?),
        MemberAction::Reinstate { id } => to_json(&services.set_member_suspended(id, false)?),
    }
}

fn provider(services: &Services<'_>, action: ProviderAction) -> CliResult<Value> {
    match action {
        ProviderAction::Add(contact) => {
            let id = services.add_provider(new_provider(contact))?;
            Ok(json!({ "provider_id": id }))
        }
        ProviderAction::Update { id, fields } => {
            to_json(&services.update_provider(id, provider_update(fields))?)
        }
        ProviderAction::Remove { id } => {
            Ok(json!({ "provider_id": id, "removed": services.remove_provider(id)? }))
        }
        ProviderAction::Show { id } => to_json(&services.get_provider(id)?),
        ProviderAction::SetPassword { id, password } => {
            services.set_provider_password(id, &password)?;
            Ok(json!({ "provider_id": id, "password_set": true }))
        }
        ProviderAction::VerifyPassword { id, password } => {
            let valid = services.verify_provider_password(id, &password)?;
            Ok(json!({ "provider_id": id, "valid": valid }))
        }
    }
}

fn directory(services: &Services<'_>, action: DirectoryAction) -> CliResult<Value> {
    match action {
        DirectoryAction::Add {
            code,
            name,
            dollars,
            cents,
        } => {
            let id = services.add_service(NewService {
                service_id: code,
                service_name: name,
                price_dollars: dollars,
                price_cents: cents,
            })?;
            Ok(json!({ "service_id": id }))
        }
        DirectoryAction::Update {
            code,
            name,
            dollars,
            cents,
        } => to_json(&services.update_service(
            code,
            ServiceUpdate {
                service_name: name,
                price_dollars: dollars,
                price_cents: cents,
            },
        )?),
        DirectoryAction::Remove { code } => {
            Ok(json!({ "service_id": code, "removed": services.remove_service(code)? }))
        }
        DirectoryAction::Show { code } => to_json(&services.get_service(code)?),
        DirectoryAction::List => to_json(&services.list_services()?),
        DirectoryAction::Export => {
            let path = services.export_provider_directory(Local::now().date_naive())?;
            Ok(json!({ "path": path.display().to_string() }))
        }
    }
}

fn service(services: &Services<'_>, action: ServiceAction) -> CliResult<Value> {
    match action {
        ServiceAction::Record {
            provider,
            member,
            service,
            date,
            comments,
        } => {
            let entry_id = services.record_service(NewServiceEntry {
                provider_id: provider,
                member_id: member,
                service_id: service,
                service_date: date,
                comments,
            })?;
            Ok(json!({ "entry_id": entry_id }))
        }
    }
}

fn report(services: &Services<'_>, action: ReportAction) -> CliResult<Value> {
    let now = Utc::now();
    let outcome = match action {
        ReportAction::Member => services.generate_member_reports(now)?,
        ReportAction::Provider => services.generate_provider_reports(now)?,
        ReportAction::Summary => services.generate_summary_report(now)?,
    };
    to_json(&outcome)
}

fn new_member(c: ContactArgs) -> NewMember {
    NewMember {
        name: c.name,
        address: c.address,
        city: c.city,
        state: c.state,
        zipcode: c.zipcode,
    }
}

fn new_provider(c: ContactArgs) -> NewProvider {
    NewProvider {
        name: c.name,
        address: c.address,
        city: c.city,
        state: c.state,
        zipcode: c.zipcode,
    }
}

fn member_update(c: ContactUpdateArgs) -> MemberUpdate {
    MemberUpdate {
        name: c.name,
        address: c.address,
        city: c.city,
        state: c.state,
        zipcode: c.zipcode,
    }
}

fn provider_update(c: ContactUpdateArgs) -> ProviderUpdate {
    ProviderUpdate {
        name: c.name,
        address: c.address,
        city: c.city,
        state: c.state,
        zipcode: c.zipcode,
    }
}
