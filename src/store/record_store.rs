//! Record store
//!
//! Every operation is a full read-modify-write of one table file. Nothing is
//! cached between calls. A failed operation leaves the stored table as it
//! was.

use std::path::{Path, PathBuf};

use crate::errors::{StoreError, StoreErrorCode, StoreResult};
use crate::observability::{log_event, Event};
use crate::schema::{ColumnSpec, ColumnType, TableSchema, FIRST_ID, MAX_ID};
use crate::storage::TableFile;

use super::filters::{Filters, PredicateFilter};
use super::record::Record;
use super::validation::RecordValidator;

/// Typed flat-file record store rooted at a data directory
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    /// Opens a store over an existing directory.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        if !data_dir.is_dir() {
            return Err(StoreError::storage_io(
                format!("data directory {} does not exist", data_dir.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `table`
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.table_file(table).path().to_path_buf()
    }

    /// Loads the rows of `schema`'s table that satisfy `filters`.
    ///
    /// A missing table file yields no rows.
    pub fn load(&self, schema: &TableSchema, filters: &Filters) -> StoreResult<Vec<Record>> {
        PredicateFilter::check(schema, filters)?;

        let rows = self.read_rows(schema)?;
        if filters.is_empty() {
            return Ok(rows);
        }
        Ok(rows
            .into_iter()
            .filter(|r| PredicateFilter::matches(r, filters))
            .collect())
    }

    /// Loads every row of the table
    pub fn load_all(&self, schema: &TableSchema) -> StoreResult<Vec<Record>> {
        self.load(schema, &Filters::none())
    }

    /// Looks up one row by primary identifier
    pub fn find(&self, schema: &TableSchema, id: i64) -> StoreResult<Option<Record>> {
        let filters = Filters::none().eq(schema.id_column().name.clone(), id);
        Ok(self.load(schema, &filters)?.into_iter().next())
    }

    /// Appends `records` to the table.
    ///
    /// The whole batch is validated before anything is written.
    pub fn add(&self, schema: &TableSchema, records: Vec<Record>) -> StoreResult<()> {
        let validator = RecordValidator::new(schema);
        let records = validator
            .validate_records(records)
            .inspect_err(|e| reject(schema, e))?;
        if records.is_empty() {
            return Ok(());
        }

        let mut rows = self.read_rows(schema)?;
        let added = records.len();
        rows.extend(records);
        validator
            .check_unique_ids(&rows)
            .inspect_err(|e| reject(schema, e))?;

        self.write_rows(schema, &rows)?;
        log_event(
            Event::RecordsAdded,
            &[("table", schema.name()), ("count", &added.to_string())],
        );
        Ok(())
    }

    /// Changes the named fields of the row identified by `id`.
    ///
    /// Returns the updated row.
    pub fn update(&self, schema: &TableSchema, id: i64, changes: Record) -> StoreResult<Record> {
        if changes.is_empty() {
            return Err(StoreError::invalid_argument("no fields to update").with_table(schema.name()));
        }
        let validator = RecordValidator::new(schema);
        let changes = validator
            .validate_fields(changes)
            .inspect_err(|e| reject(schema, e))?;

        let mut rows = self.read_rows(schema)?;
        let index = rows
            .iter()
            .position(|r| r.id(schema) == Some(id))
            .ok_or_else(|| StoreError::record_not_found(schema.name(), id))?;

        for (column, value) in changes {
            rows[index].set(column, value);
        }
        validator
            .check_unique_ids(&rows)
            .inspect_err(|e| reject(schema, e))?;

        self.write_rows(schema, &rows)?;
        log_event(
            Event::RecordUpdated,
            &[("table", schema.name()), ("id", &id.to_string())],
        );
        Ok(rows.swap_remove(index))
    }

    /// Removes the row identified by `id`.
    ///
    /// Returns false, without rewriting the file, if no row matches.
    pub fn remove(&self, schema: &TableSchema, id: i64) -> StoreResult<bool> {
        let mut rows = self.read_rows(schema)?;
        let before = rows.len();
        rows.retain(|r| r.id(schema) != Some(id));
        if rows.len() == before {
            return Ok(false);
        }

        self.write_rows(schema, &rows)?;
        log_event(
            Event::RecordRemoved,
            &[("table", schema.name()), ("id", &id.to_string())],
        );
        Ok(true)
    }

    /// Replaces the table contents with `records`.
    pub fn overwrite(&self, schema: &TableSchema, records: Vec<Record>) -> StoreResult<()> {
        let records = RecordValidator::new(schema)
            .validate_records(records)
            .inspect_err(|e| reject(schema, e))?;
        self.write_rows(schema, &records)
    }

    /// Next free primary identifier: one past the largest stored id.
    ///
    /// # Errors
    ///
    /// - `IdSpaceExhausted` if the largest id is already `MAX_ID`
    /// - `TypeMismatch` if the identifier column is not an integer
    /// - read failures propagate unchanged
    pub fn generate_unique_id(&self, schema: &TableSchema) -> StoreResult<i64> {
        let id_column = schema.id_column();
        if id_column.column_type != ColumnType::Int {
            return Err(StoreError::type_mismatch(
                &id_column.name,
                ColumnType::Int.type_name(),
                id_column.column_type.type_name(),
            ));
        }

        let rows = self.read_rows(schema)?;
        let id = match rows.iter().filter_map(|r| r.id(schema)).max() {
            None => FIRST_ID,
            Some(max) if max >= MAX_ID => {
                return Err(StoreError::id_space_exhausted(schema.name(), MAX_ID))
            }
            Some(max) => max + 1,
        };

        log_event(
            Event::IdGenerated,
            &[("table", schema.name()), ("id", &id.to_string())],
        );
        Ok(id)
    }

    fn table_file(&self, table: &str) -> TableFile {
        TableFile::new(&self.data_dir, table)
    }

    fn read_rows(&self, schema: &TableSchema) -> StoreResult<Vec<Record>> {
        let decoded = match self.table_file(schema.name()).read() {
            Ok(Some(decoded)) => decoded,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => {
                if e.code() == StoreErrorCode::CorruptData {
                    log_event(
                        Event::TableCorrupt,
                        &[("table", schema.name()), ("message", e.message())],
                    );
                }
                return Err(e.with_table(schema.name()));
            }
        };

        if decoded.table != schema.name() {
            return Err(StoreError::schema_mismatch(format!(
                "file for '{}' holds table '{}'",
                schema.name(),
                decoded.table
            ))
            .with_table(schema.name()));
        }
        check_stored_columns(schema, &decoded.columns)?;

        log_event(
            Event::TableLoaded,
            &[("table", schema.name()), ("rows", &decoded.rows.len().to_string())],
        );
        Ok(decoded.rows)
    }

    fn write_rows(&self, schema: &TableSchema, rows: &[Record]) -> StoreResult<()> {
        self.table_file(schema.name())
            .write_atomic(schema, rows)
            .map_err(|e| e.with_table(schema.name()))?;
        log_event(
            Event::TableWritten,
            &[("table", schema.name()), ("rows", &rows.len().to_string())],
        );
        Ok(())
    }
}

/// Stored columns must equal the schema's columns, in any order.
fn check_stored_columns(schema: &TableSchema, stored: &[ColumnSpec]) -> StoreResult<()> {
    let mut expected = schema.column_specs();
    let mut actual = stored.to_vec();
    expected.sort_by(|a, b| a.name.cmp(&b.name));
    actual.sort_by(|a, b| a.name.cmp(&b.name));

    if expected != actual {
        let describe = |cols: &[ColumnSpec]| {
            cols.iter()
                .map(|c| format!("{}:{}", c.name, c.column_type.type_name()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        return Err(StoreError::schema_mismatch(format!(
            "stored columns [{}] do not match schema columns [{}]",
            describe(&actual),
            describe(&expected)
        ))
        .with_table(schema.name()));
    }
    Ok(())
}

fn reject(schema: &TableSchema, error: &StoreError) {
    log_event(
        Event::RecordRejected,
        &[
            ("table", schema.name()),
            ("code", error.code().code()),
            ("message", error.message()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, Value};
    use tempfile::TempDir;

    fn schema() -> TableSchema {
        TableSchema::new(
            "test",
            vec![ColumnDef::int("ID"), ColumnDef::float("value")],
        )
        .unwrap()
    }

    fn row(id: i64, value: f64) -> Record {
        Record::new().with("ID", id).with("value", value)
    }

    fn open() -> (TempDir, RecordStore) {
        let tmp = TempDir::new().unwrap();
        let store = RecordStore::open(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_open_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let err = RecordStore::open(tmp.path().join("absent")).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::StorageIo);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_tmp, store) = open();
        assert!(store.load_all(&schema()).unwrap().is_empty());
    }

    #[test]
    fn test_add_appends_in_order() {
        let (_tmp, store) = open();
        store.add(&schema(), vec![row(1, 1.1)]).unwrap();
        store.add(&schema(), vec![row(2, 2.2), row(3, 3.3)]).unwrap();

        let ids: Vec<_> = store
            .load_all(&schema())
            .unwrap()
            .iter()
            .filter_map(|r| r.id(&schema()))
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_add_duplicate_against_stored() {
        let (_tmp, store) = open();
        store.add(&schema(), vec![row(1, 1.1)]).unwrap();
        let err = store.add(&schema(), vec![row(1, 9.9)]).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::DuplicateKey);
        assert_eq!(store.load_all(&schema()).unwrap(), vec![row(1, 1.1)]);
    }

    #[test]
    fn test_update_merges_fields() {
        let (_tmp, store) = open();
        store.add(&schema(), vec![row(1, 1.1), row(2, 2.2)]).unwrap();

        let updated = store
            .update(&schema(), 2, Record::new().with("value", 5i64))
            .unwrap();
        assert_eq!(updated, row(2, 5.0));

        let found = store.find(&schema(), 2).unwrap().unwrap();
        assert_eq!(found.get("value"), Some(&Value::Float(5.0)));
        assert_eq!(store.find(&schema(), 1).unwrap().unwrap(), row(1, 1.1));
    }

    #[test]
    fn test_update_rejects_empty_and_missing() {
        let (_tmp, store) = open();
        store.add(&schema(), vec![row(1, 1.1)]).unwrap();

        let err = store.update(&schema(), 1, Record::new()).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::InvalidArgument);

        let err = store
            .update(&schema(), 7, Record::new().with("value", 1.0))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::RecordNotFound);
    }

    #[test]
    fn test_update_id_must_stay_unique() {
        let (_tmp, store) = open();
        store.add(&schema(), vec![row(1, 1.1), row(2, 2.2)]).unwrap();

        let err = store
            .update(&schema(), 2, Record::new().with("ID", 1i64))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::DuplicateKey);

        store
            .update(&schema(), 2, Record::new().with("ID", 3i64))
            .unwrap();
        assert!(store.find(&schema(), 3).unwrap().is_some());
    }

    #[test]
    fn test_remove_twice() {
        let (_tmp, store) = open();
        store.add(&schema(), vec![row(1, 1.1), row(2, 2.2)]).unwrap();
        assert!(store.remove(&schema(), 1).unwrap());
        assert!(!store.remove(&schema(), 1).unwrap());
        assert_eq!(store.load_all(&schema()).unwrap(), vec![row(2, 2.2)]);
    }

    #[test]
    fn test_remove_from_missing_table_does_not_create_file() {
        let (_tmp, store) = open();
        assert!(!store.remove(&schema(), 1).unwrap());
        assert!(!store.table_path("test").exists());
    }

    #[test]
    fn test_generate_unique_id() {
        let (_tmp, store) = open();
        assert_eq!(store.generate_unique_id(&schema()).unwrap(), FIRST_ID);

        store.add(&schema(), vec![row(FIRST_ID, 0.0)]).unwrap();
        assert_eq!(store.generate_unique_id(&schema()).unwrap(), FIRST_ID + 1);

        store.add(&schema(), vec![row(MAX_ID, 0.0)]).unwrap();
        let err = store.generate_unique_id(&schema()).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::IdSpaceExhausted);
    }

    #[test]
    fn test_stored_columns_must_match() {
        let (_tmp, store) = open();
        store.add(&schema(), vec![row(1, 1.1)]).unwrap();

        let other = TableSchema::new(
            "test",
            vec![ColumnDef::int("ID"), ColumnDef::string("value")],
        )
        .unwrap();
        let err = store.load_all(&other).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::SchemaMismatch);
    }
}
