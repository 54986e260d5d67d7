//! Table file format
//!
//! A table file is self-describing: the column list travels with the data,
//! and values are stored column by column.
//!
//! ```text
//! +------------------+
//! | Magic "CHTB"     | (4 bytes)
//! +------------------+
//! | Format Version   | (u16 LE)
//! +------------------+
//! | Body Length      | (u32 LE)
//! +------------------+
//! | Body             | (JSON: table, row_count, columns, data)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers version, length and body. Binary values are base64,
//! timestamps RFC 3339, dates `YYYY-MM-DD`.

use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::checksum::compute_checksum;
use crate::errors::{StoreError, StoreResult};
use crate::schema::{ColumnSpec, ColumnType, TableSchema, Value};
use crate::store::Record;

pub const MAGIC: [u8; 4] = *b"CHTB";
pub const FORMAT_VERSION: u16 = 1;

const HEADER_SIZE: usize = 4 + 2 + 4;
const TRAILER_SIZE: usize = 4;

/// Decoded contents of a table file
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTable {
    /// Table name recorded in the file
    pub table: String,
    /// Columns recorded in the file, in stored order
    pub columns: Vec<ColumnSpec>,
    /// Rows in stored order
    pub rows: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableBody {
    table: String,
    row_count: usize,
    columns: Vec<ColumnSpec>,
    data: Vec<ColumnData>,
}

/// One column's values
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
    Bool(Vec<bool>),
    Binary(Vec<String>),
    Timestamp(Vec<DateTime<Utc>>),
    Date(Vec<NaiveDate>),
}

impl ColumnData {
    fn with_capacity(column_type: ColumnType, capacity: usize) -> Self {
        match column_type {
            ColumnType::Int => ColumnData::Int(Vec::with_capacity(capacity)),
            ColumnType::Float => ColumnData::Float(Vec::with_capacity(capacity)),
            ColumnType::String => ColumnData::String(Vec::with_capacity(capacity)),
            ColumnType::Bool => ColumnData::Bool(Vec::with_capacity(capacity)),
            ColumnType::Binary => ColumnData::Binary(Vec::with_capacity(capacity)),
            ColumnType::Timestamp => ColumnData::Timestamp(Vec::with_capacity(capacity)),
            ColumnType::Date => ColumnData::Date(Vec::with_capacity(capacity)),
        }
    }

    fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Int(_) => ColumnType::Int,
            ColumnData::Float(_) => ColumnType::Float,
            ColumnData::String(_) => ColumnType::String,
            ColumnData::Bool(_) => ColumnType::Bool,
            ColumnData::Binary(_) => ColumnType::Binary,
            ColumnData::Timestamp(_) => ColumnType::Timestamp,
            ColumnData::Date(_) => ColumnType::Date,
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::String(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Binary(v) => v.len(),
            ColumnData::Timestamp(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    /// Appends a value; returns false if its type does not match.
    fn push(&mut self, value: &Value) -> bool {
        match (self, value) {
            (ColumnData::Int(v), Value::Int(x)) => v.push(*x),
            (ColumnData::Float(v), Value::Float(x)) => v.push(*x),
            (ColumnData::Float(v), Value::Int(x)) => v.push(*x as f64),
            (ColumnData::String(v), Value::Str(x)) => v.push(x.clone()),
            (ColumnData::Bool(v), Value::Bool(x)) => v.push(*x),
            (ColumnData::Binary(v), Value::Binary(x)) => {
                v.push(base64::engine::general_purpose::STANDARD.encode(x))
            }
            (ColumnData::Timestamp(v), Value::Timestamp(x)) => v.push(*x),
            (ColumnData::Date(v), Value::Date(x)) => v.push(*x),
            _ => return false,
        }
        true
    }

    /// Converts the column into typed values.
    fn into_values(self) -> StoreResult<Vec<Value>> {
        let values = match self {
            ColumnData::Int(v) => v.into_iter().map(Value::Int).collect(),
            ColumnData::Float(v) => v.into_iter().map(Value::Float).collect(),
            ColumnData::String(v) => v.into_iter().map(Value::Str).collect(),
            ColumnData::Bool(v) => v.into_iter().map(Value::Bool).collect(),
            ColumnData::Binary(v) => v
                .into_iter()
                .map(|s| {
                    base64::engine::general_purpose::STANDARD
                        .decode(s)
                        .map(Value::Binary)
                        .map_err(|e| StoreError::corrupt_data(format!("invalid binary value: {}", e)))
                })
                .collect::<StoreResult<Vec<_>>>()?,
            ColumnData::Timestamp(v) => v.into_iter().map(Value::Timestamp).collect(),
            ColumnData::Date(v) => v.into_iter().map(Value::Date).collect(),
        };
        Ok(values)
    }
}

/// Serializes `rows` under `schema` into table file bytes.
///
/// Rows must already be validated against the schema.
pub fn encode_table(schema: &TableSchema, rows: &[Record]) -> StoreResult<Vec<u8>> {
    let mut data = Vec::with_capacity(schema.columns().len());
    for column in schema.columns() {
        let mut values = ColumnData::with_capacity(column.column_type, rows.len());
        for row in rows {
            let value = row.get(&column.name).ok_or_else(|| {
                StoreError::schema_mismatch(format!(
                    "record is missing column '{}' of '{}'",
                    column.name,
                    schema.name()
                ))
            })?;
            if !values.push(value) {
                return Err(StoreError::type_mismatch(
                    &column.name,
                    column.column_type.type_name(),
                    value.type_name(),
                ));
            }
        }
        data.push(values);
    }

    let body = TableBody {
        table: schema.name().to_string(),
        row_count: rows.len(),
        columns: schema.column_specs(),
        data,
    };
    let body = serde_json::to_vec(&body).map_err(|e| {
        StoreError::invalid_argument(format!("failed to encode '{}': {}", schema.name(), e))
    })?;
    let body_len = u32::try_from(body.len()).map_err(|_| {
        StoreError::invalid_argument(format!("table '{}' is too large to encode", schema.name()))
    })?;

    let version = FORMAT_VERSION.to_le_bytes();
    let length = body_len.to_le_bytes();
    let checksum = compute_checksum(&[&version, &length, &body]);

    let mut out = Vec::with_capacity(HEADER_SIZE + body.len() + TRAILER_SIZE);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&version);
    out.extend_from_slice(&length);
    out.extend_from_slice(&body);
    out.extend_from_slice(&checksum.to_le_bytes());
    Ok(out)
}

/// Parses table file bytes.
///
/// # Errors
///
/// `CorruptData` for bad magic, unknown version, truncation, checksum
/// mismatch, or a malformed body.
pub fn decode_table(bytes: &[u8]) -> StoreResult<DecodedTable> {
    if bytes.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(StoreError::corrupt_data(format!(
            "truncated table file: {} bytes, minimum is {}",
            bytes.len(),
            HEADER_SIZE + TRAILER_SIZE
        )));
    }

    if bytes[..4] != MAGIC {
        return Err(StoreError::corrupt_data("not a table file: bad magic"));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(StoreError::corrupt_data(format!(
            "unsupported table format version {}",
            version
        )));
    }

    let body_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let expected_len = HEADER_SIZE + body_len + TRAILER_SIZE;
    if bytes.len() != expected_len {
        return Err(StoreError::corrupt_data(format!(
            "table file length {} does not match header ({} expected)",
            bytes.len(),
            expected_len
        )));
    }

    let body = &bytes[HEADER_SIZE..HEADER_SIZE + body_len];
    let trailer = &bytes[HEADER_SIZE + body_len..];
    let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let computed = compute_checksum(&[&bytes[4..HEADER_SIZE], body]);
    if stored != computed {
        return Err(StoreError::corrupt_data(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored, computed
        )));
    }

    let body: TableBody = serde_json::from_slice(body)
        .map_err(|e| StoreError::corrupt_data(format!("malformed table body: {}", e)))?;

    into_decoded(body)
}

fn into_decoded(body: TableBody) -> StoreResult<DecodedTable> {
    if body.columns.len() != body.data.len() {
        return Err(StoreError::corrupt_data(format!(
            "table '{}' declares {} columns but stores {}",
            body.table,
            body.columns.len(),
            body.data.len()
        )));
    }

    if body.columns.is_empty() && body.row_count != 0 {
        return Err(StoreError::corrupt_data(format!(
            "table '{}' has no columns but claims {} rows",
            body.table, body.row_count
        )));
    }
    for (declared, column) in body.columns.iter().zip(&body.data) {
        if column.column_type() != declared.column_type {
            return Err(StoreError::corrupt_data(format!(
                "column '{}' declared {} but stores {}",
                declared.name,
                declared.column_type.type_name(),
                column.column_type().type_name()
            )));
        }
        if column.len() != body.row_count {
            return Err(StoreError::corrupt_data(format!(
                "column '{}' has {} values for {} rows",
                declared.name,
                column.len(),
                body.row_count
            )));
        }
    }

    // Shape is checked, so row_count is bounded by the decoded column data
    let mut rows = vec![Record::new(); body.row_count];
    for (declared, column) in body.columns.iter().zip(body.data) {
        for (row, value) in rows.iter_mut().zip(column.into_values()?) {
            row.set(declared.name.clone(), value);
        }
    }

    Ok(DecodedTable {
        table: body.table,
        columns: body.columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreErrorCode;
    use crate::schema::ColumnDef;
    use chrono::TimeZone;

    fn schema() -> TableSchema {
        TableSchema::new(
            "mixed",
            vec![
                ColumnDef::int("ID"),
                ColumnDef::float("value"),
                ColumnDef::string("name"),
                ColumnDef::bool("flag"),
                ColumnDef::binary("blob"),
                ColumnDef::timestamp("at"),
                ColumnDef::date("on"),
            ],
        )
        .unwrap()
    }

    fn rows() -> Vec<Record> {
        vec![
            Record::new()
                .with("ID", 1i64)
                .with("value", 1.1)
                .with("name", "Ann")
                .with("flag", true)
                .with("blob", vec![0u8, 159, 255])
                .with("at", Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap())
                .with("on", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()),
            Record::new()
                .with("ID", 2i64)
                .with("value", 2.2)
                .with("name", "Bo, \"jr\"")
                .with("flag", false)
                .with("blob", Vec::<u8>::new())
                .with("at", Utc.with_ymd_and_hms(2022, 6, 30, 23, 59, 0).unwrap())
                .with("on", NaiveDate::from_ymd_opt(2022, 6, 30).unwrap()),
        ]
    }

    #[test]
    fn test_all_column_types_survive() {
        let bytes = encode_table(&schema(), &rows()).unwrap();
        let decoded = decode_table(&bytes).unwrap();
        assert_eq!(decoded.table, "mixed");
        assert_eq!(decoded.columns, schema().column_specs());
        assert_eq!(decoded.rows, rows());
    }

    #[test]
    fn test_empty_table() {
        let bytes = encode_table(&schema(), &[]).unwrap();
        let decoded = decode_table(&bytes).unwrap();
        assert!(decoded.rows.is_empty());
        assert_eq!(decoded.columns.len(), 7);
    }

    #[test]
    fn test_body_is_columnar() {
        let bytes = encode_table(&schema(), &rows()).unwrap();
        let body = &bytes[HEADER_SIZE..bytes.len() - TRAILER_SIZE];
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["data"][0]["type"], "int");
        assert_eq!(json["data"][0]["values"], serde_json::json!([1, 2]));
        assert_eq!(json["data"][6]["values"][0], "2021-01-01");
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let err = decode_table(b"some extra garbage").unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::CorruptData);
    }

    #[test]
    fn test_flipped_byte_is_corrupt() {
        let mut bytes = encode_table(&schema(), &rows()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        let err = decode_table(&bytes).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::CorruptData);
    }

    #[test]
    fn test_truncated_is_corrupt() {
        let bytes = encode_table(&schema(), &rows()).unwrap();
        let err = decode_table(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::CorruptData);
    }

    /// Frames a hand-written body with a valid header and checksum
    fn frame(body: &serde_json::Value) -> Vec<u8> {
        let body = serde_json::to_vec(body).unwrap();
        let version = FORMAT_VERSION.to_le_bytes();
        let length = (body.len() as u32).to_le_bytes();
        let checksum = compute_checksum(&[&version, &length, &body]);
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&version);
        out.extend_from_slice(&length);
        out.extend_from_slice(&body);
        out.extend_from_slice(&checksum.to_le_bytes());
        out
    }

    #[test]
    fn test_row_count_disagreeing_with_columns_is_corrupt() {
        let bytes = frame(&serde_json::json!({
            "table": "t",
            "row_count": usize::MAX,
            "columns": [{"name": "ID", "type": "int"}],
            "data": [{"type": "int", "values": [1]}],
        }));
        let err = decode_table(&bytes).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::CorruptData);
    }

    #[test]
    fn test_rows_without_columns_is_corrupt() {
        let bytes = frame(&serde_json::json!({
            "table": "t",
            "row_count": usize::MAX,
            "columns": [],
            "data": [],
        }));
        let err = decode_table(&bytes).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::CorruptData);
    }

    #[test]
    fn test_missing_column_rejected_on_encode() {
        let mut bad = rows();
        bad[1].remove("name");
        let err = encode_table(&schema(), &bad).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::SchemaMismatch);
    }
}
