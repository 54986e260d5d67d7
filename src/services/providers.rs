//! Provider maintenance

use serde::Serialize;

use super::errors::{ServiceError, ServiceResult};
use super::{fields, Services};
use crate::errors::StoreResult;
use crate::store::Record;

/// `type` value for managers
pub const MANAGER_TYPE: i64 = 0;
/// `type` value for providers
pub const PROVIDER_TYPE: i64 = 1;

/// A stored provider. The password hash itself is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provider {
    pub provider_id: i64,
    #[serde(rename = "type")]
    pub kind: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: i64,
    pub has_password: bool,
}

impl Provider {
    pub(crate) fn from_record(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            provider_id: fields::int(record, "provider_id")?,
            kind: fields::int(record, "type")?,
            name: fields::string(record, "name")?,
            address: fields::string(record, "address")?,
            city: fields::string(record, "city")?,
            state: fields::string(record, "state")?,
            zipcode: fields::int(record, "zipcode")?,
            has_password: !fields::binary(record, "password_hash")?.is_empty(),
        })
    }
}

/// Fields supplied when registering a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProvider {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: i64,
}

/// Provider fields to change; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<i64>,
}

impl ProviderUpdate {
    fn into_record(self) -> Record {
        let mut record = Record::new();
        if let Some(v) = self.name {
            record.set("name", v);
        }
        if let Some(v) = self.address {
            record.set("address", v);
        }
        if let Some(v) = self.city {
            record.set("city", v);
        }
        if let Some(v) = self.state {
            record.set("state", v);
        }
        if let Some(v) = self.zipcode {
            record.set("zipcode", v);
        }
        record
    }
}

impl<'a> Services<'a> {
    /// Registers a provider under a freshly generated number.
    ///
    /// The provider has no password until one is set.
    pub fn add_provider(&self, provider: NewProvider) -> ServiceResult<i64> {
        let schema = self.registry.providers()?;
        let provider_id = self.store.generate_unique_id(schema)?;
        let record = Record::new()
            .with("provider_id", provider_id)
            .with("type", PROVIDER_TYPE)
            .with("name", provider.name)
            .with("address", provider.address)
            .with("city", provider.city)
            .with("state", provider.state)
            .with("zipcode", provider.zipcode)
            .with("password_hash", Vec::<u8>::new());
        self.store.add(schema, vec![record])?;
        Ok(provider_id)
    }

    pub fn update_provider(
        &self,
        provider_id: i64,
        update: ProviderUpdate,
    ) -> ServiceResult<Provider> {
        let schema = self.registry.providers()?;
        let record = self
            .store
            .update(schema, provider_id, update.into_record())
            .map_err(|e| {
                ServiceError::from(e).not_found_as(|| ServiceError::UnknownProvider(provider_id))
            })?;
        Ok(Provider::from_record(&record)?)
    }

    /// Returns false if no such provider exists
    pub fn remove_provider(&self, provider_id: i64) -> ServiceResult<bool> {
        Ok(self.store.remove(self.registry.providers()?, provider_id)?)
    }

    pub fn get_provider(&self, provider_id: i64) -> ServiceResult<Provider> {
        let record = self.provider_record(provider_id)?;
        Ok(Provider::from_record(&record)?)
    }

    pub(crate) fn provider_record(&self, provider_id: i64) -> ServiceResult<Record> {
        self.store
            .find(self.registry.providers()?, provider_id)?
            .ok_or(ServiceError::UnknownProvider(provider_id))
    }

    pub(crate) fn all_providers(&self) -> ServiceResult<Vec<Provider>> {
        let records = self.store.load_all(self.registry.providers()?)?;
        Ok(records
            .iter()
            .map(Provider::from_record)
            .collect::<StoreResult<Vec<_>>>()?)
    }
}
