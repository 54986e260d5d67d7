//! Predicate filtering for table loads
//!
//! Three predicate kinds on named columns: equals, less-than, greater-than.
//! All supplied predicates combine with AND. No expressions, no coercion
//! beyond int/float numeric comparison.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{StoreError, StoreResult};
use crate::schema::{TableSchema, Value};

use super::record::Record;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Gt,
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Eq => write!(f, "="),
            FilterOp::Lt => write!(f, "<"),
            FilterOp::Gt => write!(f, ">"),
        }
    }
}

/// Filter configuration for [`RecordStore::load`](super::RecordStore::load)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub eq: BTreeMap<String, Value>,
    pub lt: BTreeMap<String, Value>,
    pub gt: BTreeMap<String, Value>,
}

impl Filters {
    /// No predicates: every row matches
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds `column == value`
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.eq.insert(column.into(), value.into());
        self
    }

    /// Adds `column < value`
    pub fn lt(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.lt.insert(column.into(), value.into());
        self
    }

    /// Adds `column > value`
    pub fn gt(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.gt.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.eq.is_empty() && self.lt.is_empty() && self.gt.is_empty()
    }

    /// All predicates as (column, op, value)
    pub fn predicates(&self) -> impl Iterator<Item = (&str, FilterOp, &Value)> + '_ {
        let eq = self.eq.iter().map(|(k, v)| (k.as_str(), FilterOp::Eq, v));
        let lt = self.lt.iter().map(|(k, v)| (k.as_str(), FilterOp::Lt, v));
        let gt = self.gt.iter().map(|(k, v)| (k.as_str(), FilterOp::Gt, v));
        eq.chain(lt).chain(gt)
    }
}

/// Checks and evaluates filters against records
pub struct PredicateFilter;

impl PredicateFilter {
    /// Verifies every predicate names a known column with a comparable value.
    ///
    /// Stored files are checked against the full schema on read, so schema
    /// columns are the file's columns.
    pub fn check(schema: &TableSchema, filters: &Filters) -> StoreResult<()> {
        for (column, op, value) in filters.predicates() {
            let def = schema
                .column(column)
                .ok_or_else(|| StoreError::unknown_column(schema.name(), column))?;

            if !value.comparable_with(def.column_type) {
                return Err(StoreError::type_mismatch(
                    column,
                    def.column_type.type_name(),
                    value.type_name(),
                ));
            }

            if op != FilterOp::Eq && !def.column_type.is_ordered() {
                return Err(StoreError::not_comparable(
                    column,
                    &op.to_string(),
                    format!("{} values have no ordering", def.column_type.type_name()),
                ));
            }
        }
        Ok(())
    }

    /// Checks if a record matches all predicates
    pub fn matches(record: &Record, filters: &Filters) -> bool {
        filters
            .predicates()
            .all(|(column, op, expected)| Self::matches_predicate(record, column, op, expected))
    }

    fn matches_predicate(record: &Record, column: &str, op: FilterOp, expected: &Value) -> bool {
        let actual = match record.get(column) {
            Some(v) => v,
            None => return false,
        };

        match op {
            FilterOp::Eq => actual.equals(expected),
            FilterOp::Lt => actual.compare(expected) == Some(Ordering::Less),
            FilterOp::Gt => actual.compare(expected) == Some(Ordering::Greater),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreErrorCode;
    use crate::schema::ColumnDef;

    fn schema() -> TableSchema {
        TableSchema::new(
            "test",
            vec![
                ColumnDef::int("ID"),
                ColumnDef::float("value"),
                ColumnDef::bool("active"),
            ],
        )
        .unwrap()
    }

    fn row(id: i64, value: f64, active: bool) -> Record {
        Record::new()
            .with("ID", id)
            .with("value", value)
            .with("active", active)
    }

    #[test]
    fn test_equality_match() {
        let r = row(1, 1.1, true);
        assert!(PredicateFilter::matches(&r, &Filters::none().eq("ID", 1i64)));
        assert!(!PredicateFilter::matches(&r, &Filters::none().eq("ID", 2i64)));
    }

    #[test]
    fn test_range_predicates() {
        let r = row(1, 1.1, true);
        assert!(PredicateFilter::matches(&r, &Filters::none().lt("value", 2.0)));
        assert!(!PredicateFilter::matches(&r, &Filters::none().gt("value", 2.0)));
        assert!(!PredicateFilter::matches(&r, &Filters::none().lt("value", 1.1)));
    }

    #[test]
    fn test_int_bound_on_float_column() {
        let r = row(1, 1.5, true);
        assert!(PredicateFilter::matches(&r, &Filters::none().lt("value", 2i64)));
    }

    #[test]
    fn test_multiple_predicates_and() {
        let r = row(1, 1.1, true);
        let both = Filters::none().gt("value", 1.0).eq("active", true);
        assert!(PredicateFilter::matches(&r, &both));

        let one_fails = Filters::none().gt("value", 1.0).eq("active", false);
        assert!(!PredicateFilter::matches(&r, &one_fails));
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert!(PredicateFilter::matches(&row(1, 0.0, false), &Filters::none()));
    }

    #[test]
    fn test_check_unknown_column() {
        for filters in [
            Filters::none().eq("invalid", 1i64),
            Filters::none().lt("invalid", 1i64),
            Filters::none().gt("invalid", 1i64),
        ] {
            let err = PredicateFilter::check(&schema(), &filters).unwrap_err();
            assert_eq!(err.code(), StoreErrorCode::SchemaMismatch);
        }
    }

    #[test]
    fn test_check_incompatible_value() {
        for filters in [
            Filters::none().lt("value", "a"),
            Filters::none().gt("value", "a"),
            Filters::none().eq("ID", Value::Null),
        ] {
            let err = PredicateFilter::check(&schema(), &filters).unwrap_err();
            assert_eq!(err.code(), StoreErrorCode::TypeMismatch);
        }
    }

    #[test]
    fn test_check_unordered_column() {
        let err = PredicateFilter::check(&schema(), &Filters::none().lt("active", true))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::TypeMismatch);

        assert!(PredicateFilter::check(&schema(), &Filters::none().eq("active", true)).is_ok());
    }
}
