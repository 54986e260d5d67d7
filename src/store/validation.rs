//! Record validation against a table schema
//!
//! Validation semantics:
//! - Record columns exactly match the schema (no missing, no extra)
//! - Each value's type matches its column type (ints widen to floats)
//! - Values respect declared numeric ranges and character limits
//! - Primary identifiers are unique within the validated set
//!
//! Forbidden:
//! - Null values
//! - String-to-number coercion
//! - Partial validation
//!
//! Check order per record: shape, then type, then limits.

use std::collections::HashSet;

use crate::errors::{StoreError, StoreResult};
use crate::schema::{ColumnDef, ColumnType, TableSchema, Value};

use super::record::Record;

/// Validator bound to one table schema.
///
/// Validation does not touch storage and is deterministic.
pub struct RecordValidator<'a> {
    schema: &'a TableSchema,
}

impl<'a> RecordValidator<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self { schema }
    }

    /// Validates a batch of complete records.
    ///
    /// Returns the records with values converted to their column's exact
    /// representation.
    pub fn validate_records(&self, records: Vec<Record>) -> StoreResult<Vec<Record>> {
        let validated = records
            .into_iter()
            .map(|r| self.validate_record(r))
            .collect::<StoreResult<Vec<_>>>()?;
        self.check_unique_ids(&validated)?;
        Ok(validated)
    }

    /// Validates one complete record.
    pub fn validate_record(&self, record: Record) -> StoreResult<Record> {
        self.check_shape(&record)?;
        self.validate_fields(record)
    }

    /// Validates a partial record (update field values).
    ///
    /// Every named column must exist in the schema.
    pub fn validate_fields(&self, fields: Record) -> StoreResult<Record> {
        fields
            .into_iter()
            .map(|(name, value)| -> StoreResult<(String, Value)> {
                let column = self
                    .schema
                    .column(&name)
                    .ok_or_else(|| StoreError::unknown_column(self.schema.name(), &name))?;
                let value = validate_value(column, value)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Rejects duplicate primary identifiers within `records`.
    pub fn check_unique_ids(&self, records: &[Record]) -> StoreResult<()> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            if let Some(id) = record.id(self.schema) {
                if !seen.insert(id) {
                    return Err(StoreError::duplicate_key(self.schema.name(), id));
                }
            }
        }
        Ok(())
    }

    fn check_shape(&self, record: &Record) -> StoreResult<()> {
        // Extra columns
        if let Some(extra) = record.columns().find(|c| !self.schema.has_column(c)) {
            return Err(StoreError::unknown_column(self.schema.name(), extra));
        }

        // Missing columns
        if let Some(missing) = self.schema.column_names().find(|c| !record.contains(c)) {
            return Err(StoreError::schema_mismatch(format!(
                "record for '{}' is missing column '{}'",
                self.schema.name(),
                missing
            ))
            .with_table(self.schema.name()));
        }

        Ok(())
    }
}

/// Validates a single value against its column definition.
pub fn validate_value(column: &ColumnDef, value: Value) -> StoreResult<Value> {
    if !value.fits(column.column_type) {
        return Err(StoreError::type_mismatch(
            &column.name,
            column.column_type.type_name(),
            value.type_name(),
        ));
    }
    let value = value.coerce_to(column.column_type);

    if let Value::Float(f) = value {
        if !f.is_finite() {
            return Err(StoreError::range_violation(&column.name, "value must be finite"));
        }
    }

    if let Some(range) = column.numeric_limit {
        if let Some(n) = value.as_f64() {
            if !range.contains(n) {
                return Err(StoreError::range_violation(
                    &column.name,
                    format!("{} is outside [{}, {})", value, range.min, range.max),
                ));
            }
        }
    }

    if let Some(limit) = column.char_limit {
        let length = match (&value, column.column_type) {
            (Value::Str(s), ColumnType::String) => Some(s.chars().count()),
            (Value::Int(i), ColumnType::Int) => Some(digit_count(*i)),
            _ => None,
        };
        if let Some(length) = length {
            if length > limit {
                return Err(StoreError::range_violation(
                    &column.name,
                    format!("length {} exceeds limit of {}", length, limit),
                ));
            }
        }
    }

    Ok(value)
}

/// Number of decimal digits in the absolute value of `n`
fn digit_count(n: i64) -> usize {
    let mut n = n.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreErrorCode;

    fn test_schema() -> TableSchema {
        TableSchema::new(
            "test",
            vec![
                ColumnDef::int("ID"),
                ColumnDef::float("value").range(0.0, 3.0),
                ColumnDef::string("name").max_chars(5),
                ColumnDef::int("zip").max_chars(5),
            ],
        )
        .unwrap()
    }

    fn valid_record(id: i64) -> Record {
        Record::new()
            .with("ID", id)
            .with("value", 1.5)
            .with("name", "abc")
            .with("zip", 97201i64)
    }

    #[test]
    fn test_valid_record_passes() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        assert!(validator.validate_record(valid_record(1)).is_ok());
    }

    #[test]
    fn test_missing_column() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        let mut record = valid_record(1);
        record.remove("name");
        let err = validator.validate_record(record).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::SchemaMismatch);
        assert!(err.message().contains("name"));
    }

    #[test]
    fn test_extra_column() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        let record = valid_record(1).with("extra", 1i64);
        let err = validator.validate_record(record).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::SchemaMismatch);
    }

    #[test]
    fn test_string_in_numeric_column() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        let record = valid_record(1).with("value", "1.1");
        let err = validator.validate_record(record).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::TypeMismatch);
    }

    #[test]
    fn test_null_rejected() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        let record = valid_record(1).with("name", Value::Null);
        let err = validator.validate_record(record).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::TypeMismatch);
    }

    #[test]
    fn test_int_widened_to_float() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        let record = validator
            .validate_record(valid_record(1).with("value", 2i64))
            .unwrap();
        assert_eq!(record.get("value"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_numeric_range() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        for bad in [5.0, -1.0, 3.0] {
            let err = validator
                .validate_record(valid_record(1).with("value", bad))
                .unwrap_err();
            assert_eq!(err.code(), StoreErrorCode::RangeViolation);
        }
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let schema = TableSchema::new("t", vec![ColumnDef::int("ID"), ColumnDef::float("f")]).unwrap();
        let validator = RecordValidator::new(&schema);
        let record = Record::new().with("ID", 1i64).with("f", f64::NAN);
        let err = validator.validate_record(record).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::RangeViolation);
    }

    #[test]
    fn test_char_limits() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);

        let err = validator
            .validate_record(valid_record(1).with("name", "abcdef"))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::RangeViolation);

        let err = validator
            .validate_record(valid_record(1).with("zip", 123456i64))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::RangeViolation);

        // Multi-byte characters count once
        assert!(validator
            .validate_record(valid_record(1).with("name", "ñañañ"))
            .is_ok());
    }

    #[test]
    fn test_duplicate_ids_in_batch() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);
        let err = validator
            .validate_records(vec![valid_record(1), valid_record(1)])
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::DuplicateKey);
    }

    #[test]
    fn test_partial_fields() {
        let schema = test_schema();
        let validator = RecordValidator::new(&schema);

        assert!(validator
            .validate_fields(Record::new().with("value", 2.3))
            .is_ok());

        let err = validator
            .validate_fields(Record::new().with("bad_column_name", "hello"))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::SchemaMismatch);
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(-12345), 5);
        assert_eq!(digit_count(i64::MIN), 19);
    }
}
