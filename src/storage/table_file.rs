//! Durable table file
//!
//! Writes replace the whole file atomically:
//! 1. Write to `<table>.tbl.tmp`
//! 2. fsync the temp file
//! 3. Rename over `<table>.tbl`
//! 4. fsync the directory
//!
//! A reader sees either the previous table or the new one, never a mix.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::codec::{decode_table, encode_table, DecodedTable};
use crate::errors::{StoreError, StoreResult};
use crate::schema::TableSchema;
use crate::store::Record;

/// File extension for table files
pub const TABLE_EXTENSION: &str = "tbl";

/// One table's file on disk
#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
    temp_path: PathBuf,
}

impl TableFile {
    /// Table file for `table` under `data_dir`
    pub fn new(data_dir: &Path, table: &str) -> Self {
        let file_name = format!("{}.{}", table, TABLE_EXTENSION);
        Self {
            path: data_dir.join(&file_name),
            temp_path: data_dir.join(format!("{}.tmp", file_name)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes the table.
    ///
    /// Returns `None` if the file does not exist.
    pub fn read(&self) -> StoreResult<Option<DecodedTable>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::storage_io(
                    format!("failed to read {}", self.path.display()),
                    e,
                ))
            }
        };

        decode_table(&bytes)
            .map(Some)
            .map_err(|e| {
                StoreError::corrupt_data(format!("{}: {}", self.path.display(), e.message()))
            })
    }

    /// Replaces the table contents with `rows`.
    pub fn write_atomic(&self, schema: &TableSchema, rows: &[Record]) -> StoreResult<()> {
        let bytes = encode_table(schema, rows)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| self.io_error("failed to create temp file", e))?;

        let written = file
            .write_all(&bytes)
            .map_err(|e| self.io_error("failed to write temp file", e))
            .and_then(|_| {
                file.sync_all()
                    .map_err(|e| self.io_error("failed to fsync temp file", e))
            });
        drop(file);
        if let Err(e) = written {
            let _ = fs::remove_file(&self.temp_path);
            return Err(e);
        }

        fs::rename(&self.temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&self.temp_path);
            self.io_error("failed to commit table file", e)
        })?;

        // Make the rename durable
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    fn io_error(&self, what: &str, e: io::Error) -> StoreError {
        StoreError::storage_io(format!("{} for {}", what, self.path.display()), e)
    }
}
