//! Report files in every supported format.

use cloudtrail_audit_tools::commands::report::{write_report, OutputFormat};
use cloudtrail_audit_tools::pipeline::{ActionObservation, AnalysisReport, RunStats};
use std::fs;
use tempfile::TempDir;

fn report() -> AnalysisReport {
    AnalysisReport {
        identity: "arn:aws:iam::111122223333:role/Deploy".to_string(),
        actions: vec![
            ActionObservation {
                operation: "cloudformation:UpdateStack".to_string(),
                last_seen: "2024-05-02T17:45:10Z".to_string(),
            },
            ActionObservation {
                operation: "s3:PutObject".to_string(),
                last_seen: "2024-05-02T17:44:59Z".to_string(),
            },
        ],
        secrets: vec!["deploy/github-token".to_string()],
        stats: RunStats {
            shards: 4,
            files_listed: 10,
            files_processed: 10,
            parse_failures: 1,
            records_seen: 250,
            records_matched: 12,
            ..RunStats::default()
        },
    }
}

#[test]
fn test_text_report_matches_console_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");
    write_report(&report(), &path, OutputFormat::Text).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("Actions by arn:aws:iam::111122223333:role/Deploy:\n"));
    assert!(contents.contains("- cloudformation:UpdateStack (2024-05-02T17:45:10Z)\n"));
    assert!(contents.contains("Potential Secrets Manager secrets:\n- deploy/github-token\n"));
}

#[test]
fn test_csv_report_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.csv");
    write_report(&report(), &path, OutputFormat::Csv).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["kind", "name", "last_seen"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[1][1], "s3:PutObject");
    assert_eq!(&rows[2][0], "secret");
    assert_eq!(&rows[2][2], "");
}

#[test]
fn test_json_report_includes_stats_and_timestamp() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    write_report(&report(), &path, OutputFormat::Json).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["identity"], "arn:aws:iam::111122223333:role/Deploy");
    assert_eq!(value["actions"][0]["operation"], "cloudformation:UpdateStack");
    assert_eq!(value["secrets"][0], "deploy/github-token");
    assert_eq!(value["stats"]["parse_failures"], 1);
    assert!(value["generated_at"]
        .as_str()
        .is_some_and(|ts| chrono::DateTime::parse_from_rfc3339(ts).is_ok()));
}

#[test]
fn test_unwritable_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.json");
    let err = write_report(&report(), &path, OutputFormat::Json).unwrap_err();
    assert!(err.to_string().contains("Failed to create output file"));
}
