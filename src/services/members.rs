//! Member maintenance

use serde::Serialize;

use super::errors::{ServiceError, ServiceResult};
use super::{fields, Services};
use crate::errors::StoreResult;
use crate::observability::{log_event, Event};
use crate::store::Record;

/// A stored member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub member_id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: i64,
    pub suspended: bool,
}

impl Member {
    pub(crate) fn from_record(record: &Record) -> StoreResult<Self> {
        Ok(Self {
            member_id: fields::int(record, "member_id")?,
            name: fields::string(record, "name")?,
            address: fields::string(record, "address")?,
            city: fields::string(record, "city")?,
            state: fields::string(record, "state")?,
            zipcode: fields::int(record, "zipcode")?,
            suspended: fields::boolean(record, "suspended")?,
        })
    }
}

/// Fields supplied when enrolling a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: i64,
}

/// Member fields to change; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<i64>,
}

impl MemberUpdate {
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
    /// Enrolls a member under a freshly generated number.
    ///
    /// New members start out active.
    pub fn add_member(&self, member: NewMember) -> ServiceResult<i64> {
        let schema = self.registry.members()?;
        let member_id = self.store.generate_unique_id(schema)?;
        let record = Record::new()
            .with("member_id", member_id)
            .with("name", member.name)
            .with("address", member.address)
            .with("city", member.city)
            .with("state", member.state)
            .with("zipcode", member.zipcode)
            .with("suspended", false);
        self.store.add(schema, vec![record])?;
        Ok(member_id)
    }

    pub fn update_member(&self, member_id: i64, update: MemberUpdate) -> ServiceResult<Member> {
        let schema = self.registry.members()?;
        let record = self
            .store
            .update(schema, member_id, update.into_record())
            .map_err(|e| ServiceError::from(e).not_found_as(|| ServiceError::UnknownMember(member_id)))?;
        Ok(Member::from_record(&record)?)
    }

    /// Returns false if no such member exists
    pub fn remove_member(&self, member_id: i64) -> ServiceResult<bool> {
        Ok(self.store.remove(self.registry.members()?, member_id)?)
    }

    pub fn get_member(&self, member_id: i64) -> ServiceResult<Member> {
        let schema = self.registry.members()?;
        match self.store.find(schema, member_id)? {
            Some(record) => Ok(Member::from_record(&record)?),
            None => Err(ServiceError::UnknownMember(member_id)),
        }
    }

    /// Suspends or reinstates a member
    pub fn set_member_suspended(&self, member_id: i64, suspended: bool) -> ServiceResult<Member> {
        let schema = self.registry.members()?;
        let record = self
            .store
            .update(schema, member_id, Record::new().with("suspended", suspended))
            .map_err(|e| ServiceError::from(e).not_found_as(|| ServiceError::UnknownMember(member_id)))?;

        log_event(
            Event::MemberSuspensionChanged,
            &[
                ("member_id", &member_id.to_string()),
                ("suspended", &suspended.to_string()),
            ],
        );
        Ok(Member::from_record(&record)?)
    }

    pub(crate) fn all_members(&self) -> ServiceResult<Vec<Member>> {
        let records = self.store.load_all(self.registry.members()?)?;
        Ok(records
            .iter()
            .map(Member::from_record)
            .collect::<StoreResult<Vec<_>>>()?)
    }
}
