//! Provider directory: the billable services and their fees

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use super::errors::{ServiceError, ServiceResult};
use super::{fields, Services};
use crate::errors::StoreResult;
use crate::report::{report_file_name, ReportTable};
use crate::schema::Value;
use crate::store::Record;

/// Identifier used for the exported directory file
const DIRECTORY_REPORT_NAME: &str = "provider_directory";

/// A billable service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    pub service_id: i64,
    pub service_name: String,
    pub price_dollars: i64,
    pub price_cents: i64,
}

impl Service {
    pub(crate) fn from_record(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            service_id: fields::int(record, "service_id")?,
            service_name: fields::string(record, "service_name")?,
            price_dollars: fields::int(record, "price_dollars")?,
            price_cents: fields::int(record, "price_cents")?,
        })
    }

    /// Fee in cents
    pub fn fee_cents(&self) -> i64 {
        self.price_dollars * 100 + self.price_cents
    }
}

/// A directory entry to add; the caller chooses the six-digit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewService {
    pub service_id: i64,
    pub service_name: String,
    pub price_dollars: i64,
    pub price_cents: i64,
}

/// Directory fields to change; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUpdate {
    pub service_name: Option<String>,
    pub price_dollars: Option<i64>,
    pub price_cents: Option<i64>,
}

impl<'a> Services<'a> {
    pub fn add_service(&self, service: NewService) -> ServiceResult<i64> {
        let schema = self.registry.provider_directory()?;
        let record = Record::new()
            .with("service_id", service.service_id)
            .with("service_name", service.service_name)
            .with("price_dollars", service.price_dollars)
            .with("price_cents", service.price_cents);
        self.store.add(schema, vec![record])?;
        Ok(service.service_id)
    }

    pub fn update_service(&self, service_id: i64, update: ServiceUpdate) -> ServiceResult<Service> {
        let mut changes = Record::new();
        if let Some(v) = update.service_name {
            changes.set("service_name", v);
        }
        if let Some(v) = update.price_dollars {
            changes.set("price_dollars", v);
        }
        if let Some(v) = update.price_cents {
            changes.set("price_cents", v);
        }

        let schema = self.registry.provider_directory()?;
        let record = self
            .store
            .update(schema, service_id, changes)
            .map_err(|e| {
                ServiceError::from(e).not_found_as(|| ServiceError::UnknownService(service_id))
            })?;
        Ok(Service::from_record(&record)?)
    }

    /// Returns false if no such service exists
    pub fn remove_service(&self, service_id: i64) -> ServiceResult<bool> {
        Ok(self
            .store
            .remove(self.registry.provider_directory()?, service_id)?)
    }

    pub fn get_service(&self, service_id: i64) -> ServiceResult<Service> {
        let schema = self.registry.provider_directory()?;
        match self.store.find(schema, service_id)? {
            Some(record) => Ok(Service::from_record(&record)?),
            None => Err(ServiceError::UnknownService(service_id)),
        }
    }

    /// All services, alphabetically by name
    pub fn list_services(&self) -> ServiceResult<Vec<Service>> {
        let records = self.store.load_all(self.registry.provider_directory()?)?;
        let mut services = records
            .iter()
            .map(Service::from_record)
            .collect::<StoreResult<Vec<_>>>()?;
        services.sort_by(|a, b| {
            a.service_name
                .cmp(&b.service_name)
                .then(a.service_id.cmp(&b.service_id))
        });
        Ok(services)
    }

    /// Writes the directory, sorted by service name, as a report dated `on`.
    pub fn export_provider_directory(&self, on: NaiveDate) -> ServiceResult<PathBuf> {
        let mut table = ReportTable::new(["service_name", "service_code", "fee"]);
        for service in self.list_services()? {
            table.push_row(vec![
                Value::Str(service.service_name.clone()),
                Value::Str(format!("{:06}", service.service_id)),
                Value::Str(super::format_fee(service.fee_cents())),
            ])?;
        }
        let name = report_file_name(DIRECTORY_REPORT_NAME, on);
        Ok(self.reports.save_report(&table, &name)?)
    }
}
