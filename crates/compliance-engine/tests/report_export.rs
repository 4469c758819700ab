mod common;

use chrono::{TimeZone, Utc};
use common::*;
use compliance_engine::config::EngineConfig;
use compliance_engine::workflows::export::{
    write_flat_buildings, ReportExporter, FLAT_BUILDINGS_FILE, MANIFEST_FILE,
};
use compliance_engine::workflows::pipeline;
use serde_json::Value;
use std::fs;

fn read_rows(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("csv opens");
    let header = reader
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("csv row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (header, rows)
}

#[test]
fn export_writes_sections_in_workbook_order() {
    let config = EngineConfig {
        train_model: false,
        ..EngineConfig::default()
    };
    let run = pipeline::run(inputs(REGISTERED_CSV, CERTIFIED_CSV), &config).expect("pipeline runs");
    let dir = tempfile::tempdir().expect("temp dir");
    let generated_at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();

    let manifest = ReportExporter::new(generated_at)
        .write(&run, dir.path())
        .expect("export succeeds");

    let names: Vec<&str> = manifest.sections.iter().map(|section| section.name).collect();
    assert_eq!(
        names,
        vec![
            "Compliance_Buildings",
            "Province_Summary",
            "Occupancy_Summary",
            "Ownership_Summary",
            "Entity_Summary",
            "Recommendations",
            "EPC_Only_Not_Registered",
        ]
    );
    for section in &manifest.sections {
        assert!(dir.path().join(&section.file).exists(), "{}", section.file);
    }

    let saved: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join(MANIFEST_FILE)).expect("manifest readable"),
    )
    .expect("manifest is json");
    assert_eq!(saved["generated_at"], "2025-03-01T08:30:00Z");
    assert_eq!(saved["model"], "disabled");
    assert_eq!(saved["orphans"], 1);
    assert_eq!(saved["sections"][6]["rows"], 1);

    let (header, rows) = read_rows(&dir.path().join("Province_Summary.csv"));
    assert_eq!(
        header,
        vec![
            "Province",
            "total_buildings",
            "compliant_buildings",
            "non_compliant_buildings",
            "compliance_rate_%",
        ]
    );
    assert_eq!(rows[0], vec!["western cape", "1", "0", "1", "0.00"]);

    let (header, rows) = read_rows(&dir.path().join("Recommendations.csv"));
    assert_eq!(header, vec!["Policy Recommendations"]);
    assert_eq!(rows.len(), 4);

    let (_, rows) = read_rows(&dir.path().join("EPC_Only_Not_Registered.csv"));
    assert_eq!(rows[0][0], "ORPHAN1");
    assert_eq!(rows[0][4], "free state");

    let (header, rows) = read_rows(&dir.path().join(FLAT_BUILDINGS_FILE));
    assert!(!header.iter().any(|column| column.starts_with("ml_")));
    let score_column = header
        .iter()
        .position(|column| column == "risk_score_rule")
        .expect("score column");
    let scores: Vec<&str> = rows.iter().map(|row| row[score_column].as_str()).collect();
    assert_eq!(scores, vec!["85", "80", "40", "5"]);

    let (section_header, section_rows) = read_rows(&dir.path().join("Compliance_Buildings.csv"));
    assert_eq!(section_header, header);
    let keys: Vec<&str> = section_rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(keys, vec!["QRS111", "XYZ789", "ABC123", "LMN456"]);
}

#[test]
fn absent_summaries_are_left_out_of_the_export() {
    let registered = "Registration Number,Occupancy Classification\nA1,Office\n";
    let config = EngineConfig {
        train_model: false,
        ..EngineConfig::default()
    };
    let run = pipeline::run(inputs(registered, "Registration Number\nA1\n"), &config)
        .expect("pipeline runs");
    let dir = tempfile::tempdir().expect("temp dir");

    let manifest = ReportExporter::default()
        .write(&run, &dir.path().join("nested").join("report"))
        .expect("export succeeds");

    let names: Vec<&str> = manifest.sections.iter().map(|section| section.name).collect();
    assert_eq!(
        names,
        vec![
            "Compliance_Buildings",
            "Occupancy_Summary",
            "Recommendations",
            "EPC_Only_Not_Registered",
        ]
    );
    assert!(!dir
        .path()
        .join("nested/report/Province_Summary.csv")
        .exists());
}

#[test]
fn flat_table_carries_model_columns_when_trained() {
    let (registered, certified) = generated_population(32);
    let run = pipeline::run(inputs(&registered, &certified), &small_config())
        .expect("pipeline runs");

    let mut buffer = Vec::new();
    write_flat_buildings(&run, &mut buffer).expect("flat table written");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let header: Vec<String> = reader
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(
        &header[header.len() - 2..],
        &["ml_high_risk_pred".to_string(), "ml_high_risk_prob".to_string()]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.expect("row")).collect();
    assert_eq!(rows.len(), 32);
    for row in &rows {
        let probability: f64 = row[header.len() - 1].parse().expect("probability");
        assert!((0.0..=1.0).contains(&probability));
        assert!(matches!(&row[header.len() - 2], "0" | "1"));
    }
}
