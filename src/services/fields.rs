//! Typed field extraction from loaded records

use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{StoreError, StoreResult};
use crate::schema::Value;
use crate::store::Record;

fn field<'r>(record: &'r Record, column: &str) -> StoreResult<&'r Value> {
    record
        .get(column)
        .ok_or_else(|| StoreError::schema_mismatch(format!("record has no column '{}'", column)))
}

fn wrong_type(column: &str, expected: &str, value: &Value) -> StoreError {
    StoreError::type_mismatch(column, expected, value.type_name())
}

pub(crate) fn int(record: &Record, column: &str) -> StoreResult<i64> {
    let value = field(record, column)?;
    value.as_i64().ok_or_else(|| wrong_type(column, "int", value))
}

pub(crate) fn string(record: &Record, column: &str) -> StoreResult<String> {
    let value = field(record, column)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(column, "string", value))
}

pub(crate) fn boolean(record: &Record, column: &str) -> StoreResult<bool> {
    let value = field(record, column)?;
    value.as_bool().ok_or_else(|| wrong_type(column, "bool", value))
}

pub(crate) fn binary<'r>(record: &'r Record, column: &str) -> StoreResult<&'r [u8]> {
    match field(record, column)? {
        Value::Binary(bytes) => Ok(bytes),
        other => Err(wrong_type(column, "binary", other)),
    }
}

pub(crate) fn date(record: &Record, column: &str) -> StoreResult<NaiveDate> {
    let value = field(record, column)?;
    value.as_date().ok_or_else(|| wrong_type(column, "date", value))
}

pub(crate) fn timestamp(record: &Record, column: &str) -> StoreResult<DateTime<Utc>> {
    let value = field(record, column)?;
    value
        .as_timestamp()
        .ok_or_else(|| wrong_type(column, "timestamp", value))
}
