use std::collections::BTreeMap;

use polars::prelude::*;
use proptest::prelude::*;
use xtab_core::{CrosstabError, aggregate, build_crosstab};
use xtab_ingest::{DecodedTable, decode_bytes, display_column};
use xtab_model::{ByteSpan, CrosstabRow, Schema, VariableSpec};

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

fn record(residence: &str, region: &str) -> String {
    format!("{}{residence}{region}", " ".repeat(24))
}

fn decode(lines: &[String], schema: &Schema) -> DecodedTable {
    decode_bytes(lines.join("\n").as_bytes(), schema).expect("decode")
}

#[test]
fn residence_by_region_lines() {
    let table = decode(&[record("1", "05"), record("2", "05")], &survey_schema());
    let lines = aggregate(&table, &["v025", "v101"]).expect("aggregate");
    assert_eq!(
        lines,
        vec!["105 = 1: Urban; 05 {1}", "205 = 2: Rural; 05 {1}"]
    );
}

#[test]
fn identical_records_are_counted_together() {
    let lines = [
        record("2", "03"),
        record("1", "05"),
        record("2", "03"),
        record("2", "03"),
    ];
    let table = decode(&lines, &survey_schema());
    let crosstab = build_crosstab(&table, &["v025", "v101"]).expect("crosstab");

    assert_eq!(
        crosstab.rows(),
        &[
            CrosstabRow::new("105", "1: Urban; 05", 1),
            CrosstabRow::new("203", "2: Rural; 03", 3),
        ]
    );
    assert_eq!(crosstab.total(), 4);
    assert_eq!(crosstab.variables(), &["v025".to_string(), "v101".to_string()]);
}

#[test]
fn unlabeled_value_uses_raw_code() {
    let table = decode(&[record("9", "01")], &survey_schema());
    let lines = aggregate(&table, &["v025"]).expect("aggregate");
    assert_eq!(lines, vec!["9 = 9 {1}"]);
}

#[test]
fn blank_segment_keeps_its_position() {
    let mut schema = Schema::new();
    schema.push_variable(VariableSpec::new("v025", "Residence", ByteSpan::new(0, 1), "URBAN"));
    schema.push_variable(VariableSpec::new("v104", "Years lived", ByteSpan::new(1, 2), "LIVED"));
    schema.push_variable(VariableSpec::new("v106", "Education", ByteSpan::new(2, 3), "EDUC"));
    schema.insert_value_label("v025", "5", "Rural");
    schema.insert_value_label("v106", "2", "Secondary");

    let table = decode(&["5 2".to_string()], &schema);
    let lines = aggregate(&table, &["v025", "v104", "v106"]).expect("aggregate");
    assert_eq!(lines, vec!["52 = 5: Rural; ; 2: Secondary {1}"]);
}

#[test]
fn same_code_with_different_labels_stays_separate() {
    let frame = df!(
        "v025" => ["1", "1", "1"],
        display_column("v025").as_str() => ["1: Urban", "1: City", "1: Urban"],
    )
    .expect("frame");
    let table = DecodedTable::new(frame, vec!["v025".into()], BTreeMap::new(), BTreeMap::new());

    let lines = aggregate(&table, &["v025"]).expect("aggregate");
    assert_eq!(lines, vec!["1 = 1: City {1}", "1 = 1: Urban {2}"]);
}

#[test]
fn variable_without_display_column_contributes_empty_label() {
    let frame = df!(
        "v025" => ["1", "2"],
        display_column("v025").as_str() => ["1: Urban", "2: Rural"],
        "v012" => [" 24", "31 "],
    )
    .expect("frame");
    let table = DecodedTable::new(
        frame,
        vec!["v025".into(), "v012".into()],
        BTreeMap::new(),
        BTreeMap::new(),
    );

    let lines = aggregate(&table, &["v025", "v012"]).expect("aggregate");
    assert_eq!(lines, vec!["124 = 1: Urban;  {1}", "231 = 2: Rural;  {1}"]);
}

#[test]
fn missing_variable_is_rejected() {
    let table = decode(&[record("1", "05")], &survey_schema());
    let err = build_crosstab(&table, &["v025", "v999"]).unwrap_err();
    assert!(matches!(err, CrosstabError::MissingVariable { ref variable } if variable == "v999"));
}

#[test]
fn empty_selection_is_rejected() {
    let table = decode(&[record("1", "05")], &survey_schema());
    let selected: [&str; 0] = [];
    assert!(matches!(
        build_crosstab(&table, &selected),
        Err(CrosstabError::NoVariables)
    ));
}

#[test]
fn empty_input_yields_no_lines() {
    let table = decode_bytes(b"", &survey_schema()).expect("decode");
    let crosstab = build_crosstab(&table, &["v025", "v101"]).expect("crosstab");
    assert!(crosstab.is_empty());
    assert_eq!(crosstab.total(), 0);
}

proptest! {
    #[test]
    fn frequencies_sum_to_record_count(
        records in prop::collection::vec((0u8..4, 0u8..3), 0..40)
    ) {
        let lines: Vec<String> = records
            .iter()
            .map(|(residence, region)| record(&residence.to_string(), &format!("0{region}")))
            .collect();
        let table = decode(&lines, &survey_schema());
        let crosstab = build_crosstab(&table, &["v025", "v101"]).expect("crosstab");

        prop_assert_eq!(crosstab.total(), records.len() as u64);
        prop_assert!(crosstab.rows().iter().all(|row| row.frequency > 0));
    }

    #[test]
    fn aggregation_is_deterministic_and_sorted(
        records in prop::collection::vec((0u8..4, 0u8..3), 1..40)
    ) {
        let lines: Vec<String> = records
            .iter()
            .map(|(residence, region)| record(&residence.to_string(), &format!("0{region}")))
            .collect();
        let table = decode(&lines, &survey_schema());

        let first = build_crosstab(&table, &["v025", "v101"]).expect("crosstab");
        let second = build_crosstab(&table, &["v025", "v101"]).expect("crosstab");
        prop_assert_eq!(&first, &second);

        let keys: Vec<(&str, &str)> = first
            .rows()
            .iter()
            .map(|row| (row.composite_code.as_str(), row.composite_label.as_str()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(keys, sorted);
    }
}
