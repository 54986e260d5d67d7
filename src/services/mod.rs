//! Domain services
//!
//! Member, provider and provider-directory maintenance, billing entries and
//! the weekly reports, built on the record store. Type and limit checks are
//! left to the store; this layer adds the domain rules (existence,
//! suspension, id assignment).

mod credentials;
mod directory;
mod errors;
mod fields;
mod members;
mod providers;
mod reports;
mod service_log;

pub use credentials::MIN_PASSWORD_LENGTH;
pub use directory::{NewService, Service, ServiceUpdate};
pub use errors::{ServiceError, ServiceResult};
pub use members::{Member, MemberUpdate, NewMember};
pub use providers::{NewProvider, Provider, ProviderUpdate, PROVIDER_TYPE, MANAGER_TYPE};
pub use reports::{format_fee, ReportOutcome, REPORT_WINDOW_DAYS};
pub use service_log::{NewServiceEntry, ServiceEntry};

use crate::report::ReportWriter;
use crate::schema::SchemaRegistry;
use crate::store::RecordStore;

/// Entry point for domain operations.
///
/// Borrows the registry, store and report writer; holds no state of its own.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    registry: &'a SchemaRegistry,
    store: &'a RecordStore,
    reports: &'a ReportWriter,
}

impl<'a> Services<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        store: &'a RecordStore,
        reports: &'a ReportWriter,
    ) -> Self {
        Self {
            registry,
            store,
            reports,
        }
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    pub fn reports(&self) -> &'a ReportWriter {
        self.reports
    }
}
