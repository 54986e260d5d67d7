//! Weekly member, provider and summary reports
//!
//! The window is the `REPORT_WINDOW_DAYS` days of receipts ending at the
//! generation time. File names carry the local date of generation.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::Serialize;

use super::directory::Service;
use super::errors::ServiceResult;
use super::members::Member;
use super::providers::Provider;
use super::service_log::ServiceEntry;
use super::Services;
use crate::observability::{log_event, Event};
use crate::report::{report_file_name, ReportTable};
use crate::schema::Value;

pub const REPORT_WINDOW_DAYS: i64 = 7;

const SUMMARY_REPORT_NAME: &str = "summary";
const TOTAL_LABEL: &str = "TOTAL";

const MEMBER_REPORT_COLUMNS: [&str; 9] = [
    "member_name",
    "member_number",
    "address",
    "city",
    "state",
    "zipcode",
    "service_date",
    "provider_name",
    "service_name",
];

const PROVIDER_REPORT_COLUMNS: [&str; 13] = [
    "provider_name",
    "provider_number",
    "address",
    "city",
    "state",
    "zipcode",
    "service_date",
    "received_at",
    "member_name",
    "member_number",
    "service_code",
    "fee",
    "consultations",
];
const PROVIDER_LABEL_COLUMN: usize = 0;
const PROVIDER_FEE_COLUMN: usize = 11;
const PROVIDER_CONSULTATIONS_COLUMN: usize = 12;

const SUMMARY_REPORT_COLUMNS: [&str; 4] =
    ["provider_name", "provider_number", "consultations", "total_fee"];

/// What a report run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// Files written, in generation order
    Written { paths: Vec<PathBuf> },
    /// Nothing was received in the window; no files written
    NoRecords,
}

/// `1234` cents as `"12.34"`
pub fn format_fee(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, cents / 100, cents % 100)
}

/// Lookups shared by all three reports
struct WeekData {
    entries: Vec<ServiceEntry>,
    members: HashMap<i64, Member>,
    providers: HashMap<i64, Provider>,
    services: HashMap<i64, Service>,
    report_date: NaiveDate,
}

impl WeekData {
    fn fee_cents(&self, entry: &ServiceEntry) -> i64 {
        self.services
            .get(&entry.service_id)
            .map(Service::fee_cents)
            .unwrap_or(0)
    }

    fn member_name(&self, member_id: i64) -> Value {
        self.members
            .get(&member_id)
            .map(|m| Value::Str(m.name.clone()))
            .unwrap_or(Value::Null)
    }

    fn provider_name(&self, provider_id: i64) -> Value {
        self.providers
            .get(&provider_id)
            .map(|p| Value::Str(p.name.clone()))
            .unwrap_or(Value::Null)
    }

    fn service_name(&self, service_id: i64) -> Value {
        self.services
            .get(&service_id)
            .map(|s| Value::Str(s.service_name.clone()))
            .unwrap_or(Value::Null)
    }

    /// Entries grouped by a key, groups ordered by key
    fn grouped_by(&self, key: impl Fn(&ServiceEntry) -> i64) -> BTreeMap<i64, Vec<&ServiceEntry>> {
        let mut groups: BTreeMap<i64, Vec<&ServiceEntry>> = BTreeMap::new();
        for entry in &self.entries {
            groups.entry(key(entry)).or_default().push(entry);
        }
        groups
    }
}

impl<'a> Services<'a> {
    fn week_data(&self, now: DateTime<Utc>) -> ServiceResult<Option<WeekData>> {
        let since = now - Duration::days(REPORT_WINDOW_DAYS);
        let entries = self.entries_received_between(since, now)?;
        if entries.is_empty() {
            return Ok(None);
        }

        Ok(Some(WeekData {
            entries,
            members: self
                .all_members()?
                .into_iter()
                .map(|m| (m.member_id, m))
                .collect(),
            providers: self
                .all_providers()?
                .into_iter()
                .map(|p| (p.provider_id, p))
                .collect(),
            services: self
                .list_services()?
                .into_iter()
                .map(|s| (s.service_id, s))
                .collect(),
            report_date: now.with_timezone(&Local).date_naive(),
        }))
    }

    /// One report per member who received services in the window.
    ///
    /// Rows are ordered by service date. Either every file is written or
    /// none is.
    pub fn generate_member_reports(&self, now: DateTime<Utc>) -> ServiceResult<ReportOutcome> {
        let Some(week) = self.week_data(now)? else {
            return Ok(no_records("member"));
        };

        let mut reports = Vec::new();
        for (member_id, mut entries) in week.grouped_by(|e| e.member_id) {
            let Some(member) = week.members.get(&member_id) else {
                continue;
            };
            entries.sort_by_key(|e| (e.service_date, e.entry_datetime_utc));

            let mut table = ReportTable::new(MEMBER_REPORT_COLUMNS);
            for entry in entries {
                table.push_row(vec![
                    Value::Str(member.name.clone()),
                    Value::Int(member.member_id),
                    Value::Str(member.address.clone()),
                    Value::Str(member.city.clone()),
                    Value::Str(member.state.clone()),
                    Value::Int(member.zipcode),
                    Value::Date(entry.service_date),
                    week.provider_name(entry.provider_id),
                    week.service_name(entry.service_id),
                ])?;
            }

            let name = person_report_name(&member.name, member.member_id, week.report_date);
            reports.push((name, table));
        }

        Ok(written(self.reports.save_reports(&reports)?))
    }

    /// One report per provider who billed in the window, ending with a
    /// totals row. Either every file is written or none is.
    pub fn generate_provider_reports(&self, now: DateTime<Utc>) -> ServiceResult<ReportOutcome> {
        let Some(week) = self.week_data(now)? else {
            return Ok(no_records("provider"));
        };

        let mut reports = Vec::new();
        for (provider_id, mut entries) in week.grouped_by(|e| e.provider_id) {
            let Some(provider) = week.providers.get(&provider_id) else {
                continue;
            };
            entries.sort_by_key(|e| (e.service_date, e.entry_datetime_utc));

            let mut table = ReportTable::new(PROVIDER_REPORT_COLUMNS);
            let mut total_cents = 0;
            let consultations = entries.len();
            for entry in entries {
                let fee = week.fee_cents(entry);
                total_cents += fee;
                table.push_row(vec![
                    Value::Str(provider.name.clone()),
                    Value::Int(provider.provider_id),
                    Value::Str(provider.address.clone()),
                    Value::Str(provider.city.clone()),
                    Value::Str(provider.state.clone()),
                    Value::Int(provider.zipcode),
                    Value::Date(entry.service_date),
                    Value::Timestamp(entry.entry_datetime_utc),
                    week.member_name(entry.member_id),
                    Value::Int(entry.member_id),
                    Value::Str(format!("{:06}", entry.service_id)),
                    Value::Str(format_fee(fee)),
                    Value::Null,
                ])?;
            }

            let mut totals = vec![Value::Null; PROVIDER_REPORT_COLUMNS.len()];
            totals[PROVIDER_LABEL_COLUMN] = Value::Str(TOTAL_LABEL.to_string());
            totals[PROVIDER_FEE_COLUMN] = Value::Str(format_fee(total_cents));
            totals[PROVIDER_CONSULTATIONS_COLUMN] = Value::Int(consultations as i64);
            table.push_row(totals)?;

            let name =
                person_report_name(&provider.name, provider.provider_id, week.report_date);
            reports.push((name, table));
        }

        Ok(written(self.reports.save_reports(&reports)?))
    }

    /// Accounts-payable summary: one row per provider to be paid, then
    /// overall totals. Providers removed since billing are left out.
    pub fn generate_summary_report(&self, now: DateTime<Utc>) -> ServiceResult<ReportOutcome> {
        let Some(week) = self.week_data(now)? else {
            return Ok(no_records("summary"));
        };

        let mut table = ReportTable::new(SUMMARY_REPORT_COLUMNS);
        let mut providers = 0;
        let mut consultations = 0;
        let mut overall_cents = 0;
        for (provider_id, entries) in week.grouped_by(|e| e.provider_id) {
            let Some(provider) = week.providers.get(&provider_id) else {
                continue;
            };
            let cents: i64 = entries.iter().map(|e| week.fee_cents(e)).sum();
            providers += 1;
            consultations += entries.len();
            overall_cents += cents;
            table.push_row(vec![
                Value::Str(provider.name.clone()),
                Value::Int(provider.provider_id),
                Value::Int(entries.len() as i64),
                Value::Str(format_fee(cents)),
            ])?;
        }
        table.push_row(vec![
            Value::Str(format!("{} ({} providers)", TOTAL_LABEL, providers)),
            Value::Null,
            Value::Int(consultations as i64),
            Value::Str(format_fee(overall_cents)),
        ])?;

        let name = report_file_name(SUMMARY_REPORT_NAME, week.report_date);
        let path = self.reports.save_report(&table, &name)?;
        Ok(written(vec![path]))
    }
}

/// `<name>_<number>_<MM-DD-YYYY>`; the number keeps namesakes apart
fn person_report_name(name: &str, id: i64, date: NaiveDate) -> String {
    report_file_name(&format!("{}_{}", name, id), date)
}

fn no_records(kind: &str) -> ReportOutcome {
    log_event(Event::ReportSkipped, &[("report", kind), ("reason", "no records")]);
    ReportOutcome::NoRecords
}

fn written(paths: Vec<PathBuf>) -> ReportOutcome {
    ReportOutcome::Written { paths }
}
