use std::fs;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use tempfile::TempDir;
use xtab_core::build_crosstab;
use xtab_ingest::decode_bytes;
use xtab_model::{ByteSpan, Schema, VariableSpec};
use xtab_report::{
    CrosstabReport, FIRST_LINE_ROW, ReportError, ReportFormat, write_json, write_report_file,
    write_xlsx,
};

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
    schema
}

fn report() -> CrosstabReport {
    let input = format!("{pad}105\n{pad}205\n{pad}105\n", pad = " ".repeat(24));
    let table = decode_bytes(input.as_bytes(), &survey_schema()).expect("decode");
    let selected = ["v025", "v101"];
    let crosstab = build_crosstab(&table, &selected).expect("crosstab");
    CrosstabReport::new("ci2021kr", &table, &crosstab, &selected)
}

fn column_a(bytes: Vec<u8>) -> Vec<(u32, String)> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).expect("open workbook");
    let sheet = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&sheet).expect("worksheet");
    let (start_row, _) = range.start().expect("non-empty sheet");
    range
        .rows()
        .enumerate()
        .filter_map(|(offset, row)| match row.first() {
            Some(Data::String(text)) => Some((start_row + offset as u32, text.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn layout_places_rows_at_fixed_indices() {
    let rendered = report()
        .layout()
        .iter()
        .map(|(row, text)| format!("{row:02} | {text}"))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r"
    00 | ci2021kr
    01 | P
    05 | URBAN REGION
    08 | v025 v101
    09 | Type of place of residence;Region
    12 | 105 = 1: Urban; 05 {2}
    13 | 205 = 2: Rural; 05 {1}
    ");
}

#[test]
fn missing_metadata_uses_blank_placeholder() {
    let table = decode_bytes(b"", &survey_schema()).expect("decode");
    let crosstab = build_crosstab(&table, &["v025"]).expect("crosstab");
    let report = CrosstabReport::new("ci2021kr", &table, &crosstab, &["v025", "v999"]);

    assert_eq!(report.tags, vec!["URBAN", " "]);
    assert_eq!(report.labels, vec!["Type of place of residence", " "]);
    let layout = report.layout();
    assert_eq!(layout.len(), 5);
    assert!(layout.iter().all(|(row, _)| *row < FIRST_LINE_ROW));
}

#[test]
fn xlsx_reads_back_in_column_a() {
    let mut bytes = Vec::new();
    write_xlsx(&report(), &mut bytes).expect("write xlsx");

    assert_eq!(column_a(bytes), report().layout());
}

#[test]
fn json_carries_header_and_rows() {
    let mut bytes = Vec::new();
    write_json(&report(), &mut bytes).expect("write json");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");

    assert_eq!(value["sample"], "ci2021kr");
    assert_eq!(value["codes"], serde_json::json!(["v025", "v101"]));
    assert_eq!(value["rows"][0]["composite_code"], "105");
    assert_eq!(value["rows"][0]["frequency"], 2);
    assert_eq!(value["rows"].as_array().map(Vec::len), Some(2));
}

#[test]
fn report_file_is_written_to_explicit_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("ci2021kr_crosstab.xlsx");

    let written = write_report_file(&report(), &path, ReportFormat::Xlsx).expect("write file");
    assert_eq!(written, path);
    let bytes = fs::read(&path).expect("read back");
    assert_eq!(column_a(bytes)[0], (0, "ci2021kr".to_string()));
}

#[test]
fn unwritable_destination_names_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("missing").join("out.json");

    let err = write_report_file(&report(), &path, ReportFormat::Json).unwrap_err();
    assert!(matches!(err, ReportError::Io { .. }));
    assert!(err.to_string().contains("out.json"));
    assert!(!path.exists());
}
