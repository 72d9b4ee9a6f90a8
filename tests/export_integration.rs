//! Integration tests for writing captures to disk

mod common;

use common::assert_float_eq;
use common::builders::CaptureBuilder;
use hs_telemetry::config::{AppConfig, ExportConfig};
use hs_telemetry::export::{prepare_output_dir, CaptureSummary, ReportExporter};
use hs_telemetry::session::BatchIngest;
use tempfile::tempdir;

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_export_matches_capture() {
    let dir = tempdir().unwrap();
    let capture = CaptureBuilder::new()
        .version(3, 0, 1, 0)
        .cycle(0x10, 0x20, 0x30, 0x3FF)
        .cycle(0, 0, 0, 0)
        .cycle(3, 4, 0, 0x200)
        .build();
    let report = BatchIngest::run(&capture);
    let summary = CaptureSummary::new(&report, "capture.txt");

    ReportExporter::new(dir.path(), ExportConfig::default())
        .export(&report, &summary, Some(&capture))
        .unwrap();

    assert_eq!(
        read_lines(&dir.path().join("accel.csv")),
        vec![
            "Sample Number,X Data,Y Data,Z Data",
            "0,16,32,48",
            "1,0,0,0",
            "2,3,4,0",
        ]
    );
    assert_eq!(
        read_lines(&dir.path().join("pot.csv")),
        vec![
            "Sample Number,Potentiometer Data",
            "0,1023",
            "1,0",
            "2,512",
        ]
    );

    let combined = read_lines(&dir.path().join("both.csv"));
    assert_eq!(combined[0], "Sample Number,Potentiometer,Accelerometer");
    assert_eq!(combined.len(), 4);
    let row: Vec<f64> = combined[1].split(',').map(|v| v.parse().unwrap()).collect();
    assert_float_eq(row[1], 1.0, 1e-9);
    assert_float_eq(row[2], 1.0, 1e-9);

    let json = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    let parsed: CaptureSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.accel_samples, 3);
    assert_eq!(parsed.version.as_deref(), Some("3.0.1.0"));
    assert_eq!(parsed.source, "capture.txt");

    // The saved raw capture decodes back to the same report
    let raw = BatchIngest::from_file(dir.path().join("raw.txt")).unwrap();
    assert_eq!(raw, report);
}

#[test]
fn test_export_uses_configured_names() {
    let dir = tempdir().unwrap();
    let files = ExportConfig {
        accel_file: "a.csv".to_string(),
        pot_file: "p.csv".to_string(),
        combined_file: "ap.csv".to_string(),
        raw_file: "capture.bin".to_string(),
        summary_file: "meta.json".to_string(),
    };
    let report = BatchIngest::run(&CaptureBuilder::new().cycles(2).build());
    let summary = CaptureSummary::new(&report, "test");

    let written = ReportExporter::new(dir.path(), files)
        .export(&report, &summary, None)
        .unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.csv", "p.csv", "ap.csv", "meta.json"]);
}

#[test]
fn test_output_guard_protects_previous_export() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("run");
    let config = AppConfig::default();
    let report = BatchIngest::run(&CaptureBuilder::new().cycles(1).build());
    let summary = CaptureSummary::new(&report, "test");

    prepare_output_dir(&out, false).unwrap();
    ReportExporter::new(&out, config.export.clone())
        .export(&report, &summary, None)
        .unwrap();

    assert!(prepare_output_dir(&out, false).is_err());
    assert!(prepare_output_dir(&out, true).is_ok());
}

#[test]
fn test_flat_streams_normalize_to_zero() {
    let dir = tempdir().unwrap();
    let report = BatchIngest::run(
        &CaptureBuilder::new()
            .cycle(1, 1, 1, 7)
            .cycle(1, 1, 1, 7)
            .build(),
    );
    let summary = CaptureSummary::new(&report, "flat");
    ReportExporter::new(dir.path(), ExportConfig::default())
        .export(&report, &summary, None)
        .unwrap();

    assert_eq!(
        read_lines(&dir.path().join("both.csv")),
        vec!["Sample Number,Potentiometer,Accelerometer", "0,0.0,0.0", "1,0.0,0.0"]
    );
}
