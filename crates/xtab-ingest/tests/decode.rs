use std::collections::BTreeMap;
use std::fs;

use polars::prelude::*;
use tempfile::TempDir;
use xtab_ingest::{
    IngestError, decode_bytes, decode_file, decode_parts, decode_records, display_column,
    label_column,
};
use xtab_model::{ByteSpan, Schema, SchemaParts, ValueLabelTable, VariableSpec};

fn survey_schema() -> Schema {
    let mut schema = Schema::new();
    schema.push_variable(VariableSpec::new(
        "v025",
        "Type of place of residence",
        ByteSpan::new(24, 25),
        "URBAN",
    ));
    schema.push_variable(VariableSpec::new("v101", "Region", ByteSpan::new(25, 27), "REGION"));
    schema.insert_value_label("v025", "1", "Urban");
    schema.insert_value_label("v025", "2", "Rural");
    schema.insert_value_label("v025", "8", "");
    schema
}

fn record(residence: &str, region: &str) -> String {
    format!("{}{residence}{region}", " ".repeat(24))
}

fn strings(frame: &DataFrame, name: &str) -> Vec<String> {
    frame
        .column(name)
        .expect("column")
        .str()
        .expect("string column")
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

#[test]
fn decodes_raw_label_and_combined_columns() {
    let input = [record("1", "05"), record("2", "05")].join("\n");
    let table = decode_bytes(input.as_bytes(), &survey_schema()).expect("decode");

    assert_eq!(table.height(), 2);
    assert_eq!(table.variables(), &["v025".to_string(), "v101".to_string()]);
    let frame = table.frame();
    assert_eq!(strings(frame, "v025"), vec!["1", "2"]);
    assert_eq!(strings(frame, &label_column("v025")), vec!["Urban", "Rural"]);
    assert_eq!(
        strings(frame, &display_column("v025")),
        vec!["1: Urban", "2: Rural"]
    );
    // Empty value-label table: label falls back to the raw code.
    assert_eq!(strings(frame, "v101"), vec!["05", "05"]);
    assert_eq!(strings(frame, &display_column("v101")), vec!["05", "05"]);
}

#[test]
fn lookup_miss_falls_back_to_raw_value() {
    let input = format!("{}\n{}\n", record("9", "01"), record("8", "01"));
    let table = decode_bytes(input.as_bytes(), &survey_schema()).expect("decode");
    let frame = table.frame();

    assert_eq!(strings(frame, &label_column("v025")), vec!["9", ""]);
    assert_eq!(strings(frame, &display_column("v025")), vec!["9", "8: "]);
}

#[test]
fn metadata_is_attached_to_table() {
    let table = decode_bytes(record("1", "05").as_bytes(), &survey_schema()).expect("decode");
    assert_eq!(table.var_label("v025"), Some("Type of place of residence"));
    assert_eq!(table.tag("v101"), Some("REGION"));
    assert_eq!(table.tag("v999"), None);
}

#[test]
fn short_lines_and_crlf_are_tolerated() {
    let input = format!("{}\r\n{}\r\n\r\n", record("1", "05"), record("2", "0"));
    let table = decode_bytes(input.as_bytes(), &survey_schema()).expect("decode");
    assert_eq!(table.height(), 2);
    assert_eq!(strings(table.frame(), "v101"), vec!["05", "0"]);

    let short = decode_bytes(b"   \n", &survey_schema()).expect("decode");
    assert_eq!(short.height(), 1);
    assert_eq!(strings(short.frame(), "v025"), vec![""]);
    assert_eq!(strings(short.frame(), &display_column("v025")), vec![""]);
}

#[test]
fn variables_without_table_keep_unstripped_raw_column() {
    let parts = SchemaParts {
        byte_spans: vec![ByteSpan::new(0, 1), ByteSpan::new(1, 4)],
        var_labels: vec![
            ("v025".to_string(), "Residence".to_string()),
            ("v101".to_string(), "Region".to_string()),
        ],
        value_labels: BTreeMap::from([(
            "v025".to_string(),
            [("1", "Urban")].into_iter().collect::<ValueLabelTable>(),
        )]),
        tags: vec![],
    };
    let table = decode_parts(b"1 5 ", &parts).expect("decode");

    assert_eq!(strings(table.frame(), "v101"), vec![" 5 "]);
    assert!(!table.has_column(&display_column("v101")));
    assert!(table.has_column(&display_column("v025")));
}

#[test]
fn inconsistent_parts_are_rejected() {
    let parts = SchemaParts {
        byte_spans: vec![ByteSpan::new(0, 1)],
        ..SchemaParts::default()
    };
    let err = decode_parts(b"1", &parts).unwrap_err();
    assert!(matches!(err, IngestError::InconsistentSchema { spans: 1, variables: 0 }));
}

#[test]
fn decodes_from_reader_and_file() {
    let input = [record("1", "05"), record("2", "07")].join("\n");
    let from_reader = decode_records(input.as_bytes(), &survey_schema()).expect("decode reader");
    assert_eq!(from_reader.height(), 2);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bd2018ir.dat");
    fs::write(&path, &input).unwrap();
    let from_file = decode_file(&path, &survey_schema()).expect("decode file");
    assert!(from_file.frame().equals(from_reader.frame()));

    let err = decode_file(&dir.path().join("missing.dat"), &survey_schema()).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
