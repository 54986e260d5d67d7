//! Billing entries for services rendered

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::errors::{ServiceError, ServiceResult};
use super::{fields, Services};
use crate::errors::StoreResult;
use crate::observability::{log_event, Event};
use crate::store::{Filters, Record};

/// A stored billing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    pub entry_id: i64,
    pub entry_datetime_utc: DateTime<Utc>,
    pub service_date: NaiveDate,
    pub member_id: i64,
    pub provider_id: i64,
    pub service_id: i64,
    pub comments: String,
}

impl ServiceEntry {
    pub(crate) fn from_record(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            entry_id: fields::int(record, "entry_id")?,
            entry_datetime_utc: fields::timestamp(record, "entry_datetime_utc")?,
            service_date: fields::date(record, "service_date")?,
            member_id: fields::int(record, "member_id")?,
            provider_id: fields::int(record, "provider_id")?,
            service_id: fields::int(record, "service_id")?,
            comments: fields::string(record, "comments")?,
        })
    }
}

/// A billing entry as submitted by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceEntry {
    pub provider_id: i64,
    pub member_id: i64,
    pub service_id: i64,
    pub service_date: NaiveDate,
    pub comments: String,
}

impl<'a> Services<'a> {
    /// Records a service, received now.
    ///
    /// The member must exist and be active; the provider and the service
    /// must exist.
    pub fn record_service(&self, entry: NewServiceEntry) -> ServiceResult<i64> {
        self.record_service_at(entry, Utc::now())
    }

    /// Records a service with an explicit receipt time
    pub fn record_service_at(
        &self,
        entry: NewServiceEntry,
        received_at: DateTime<Utc>,
    ) -> ServiceResult<i64> {
        self.provider_record(entry.provider_id)?;
        let member = self.get_member(entry.member_id)?;
        if member.suspended {
            return Err(ServiceError::MemberSuspended(entry.member_id));
        }
        self.get_service(entry.service_id)?;

        let schema = self.registry.service_log()?;
        let entry_id = self.store.generate_unique_id(schema)?;
        let record = Record::new()
            .with("entry_id", entry_id)
            .with("entry_datetime_utc", received_at)
            .with("service_date", entry.service_date)
            .with("member_id", entry.member_id)
            .with("provider_id", entry.provider_id)
            .with("service_id", entry.service_id)
            .with("comments", entry.comments);
        self.store.add(schema, vec![record])?;

        log_event(
            Event::ServiceRecorded,
            &[
                ("entry_id", &entry_id.to_string()),
                ("member_id", &entry.member_id.to_string()),
                ("provider_id", &entry.provider_id.to_string()),
                ("service_id", &entry.service_id.to_string()),
            ],
        );
        Ok(entry_id)
    }

    /// Entries received in `(since, until]`
    pub fn entries_received_between(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> ServiceResult<Vec<ServiceEntry>> {
        let schema = self.registry.service_log()?;
        let filters = Filters::none().gt("entry_datetime_utc", since);
        let records = self.store.load(schema, &filters)?;

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            let entry = ServiceEntry::from_record(record)?;
            if entry.entry_datetime_utc <= until {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
