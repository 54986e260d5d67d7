//! Report Writer Tests
//!
//! Covers value normalization, CSV quoting, file naming and the
//! never-overwrite rule.

use chocan::errors::StoreErrorCode;
use chocan::report::{report_file_name, ReportTable, ReportWriter};
use chocan::schema::Value;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use std::fs;
use tempfile::TempDir;

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_dates_and_timestamps_normalized() {
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(dir.path());

    let ts = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let mut table = ReportTable::new(["received", "served"]);
    table
        .push_row(vec![
            Value::Timestamp(ts),
            Value::Date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()),
        ])
        .unwrap();

    let path = writer.save_report(&table, "dates").unwrap();
    let lines = read_lines(&path);

    let local = ts.with_timezone(&Local).format("%m-%d-%Y %H:%M").to_string();
    assert_eq!(lines[0], "received,served");
    assert_eq!(lines[1], format!("{},01-01-2021", local));
}

#[test]
fn test_mixed_values_and_quoting() {
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(dir.path());

    let mut table = ReportTable::new(["ID", "value", "flag", "note", "blank"]);
    table
        .push_row(vec![
            Value::Int(1),
            Value::Float(1.1),
            Value::Bool(true),
            Value::Str("line one\nline two".into()),
            Value::Null,
        ])
        .unwrap();

    let path = writer.save_report(&table, "mixed").unwrap();
    let content = fs::read_to_string(path).unwrap();
    assert_eq!(
        content,
        "ID,value,flag,note,blank\r\n1,1.1,true,\"line one\nline two\",\r\n"
    );
}

#[test]
fn test_header_only_report() {
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(dir.path());
    let path = writer
        .save_report(&ReportTable::new(["a", "b"]), "empty")
        .unwrap();
    assert_eq!(read_lines(&path), vec!["a,b".to_string()]);
}

#[test]
fn test_missing_directory_is_storage_io() {
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(dir.path().join("does_not_exist"));
    let err = writer
        .save_report(&ReportTable::new(["a"]), "r")
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::StorageIo);
}

#[test]
fn test_existing_report_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(dir.path());
    fs::write(dir.path().join("r.csv"), "keep me").unwrap();

    let err = writer
        .save_report(&ReportTable::new(["a"]), "r")
        .unwrap_err();
    assert_eq!(err.code(), StoreErrorCode::StorageIo);
    assert_eq!(fs::read_to_string(dir.path().join("r.csv")).unwrap(), "keep me");
}

#[test]
fn test_file_name_format() {
    let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
    assert_eq!(report_file_name("summary", date), "summary_12-01-2023");
}
