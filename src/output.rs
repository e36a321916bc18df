//! Output formatting and persistence for records and statistics.
//!
//! Supports debug logging, JSON on any writer (stdout by default), and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::normalize::AnalysisRecord;
use csv::WriterBuilder;
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Writes a value as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Prints a value as pretty-printed JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    write_json(std::io::stdout().lock(), value)
}

/// Appends [`AnalysisRecord`]s as rows to a CSV file.
///
/// Writes the header row only when the file is missing or empty.
pub fn append_records(path: &str, records: &[AnalysisRecord]) -> Result<()> {
    let has_rows = std::fs::metadata(path).is_ok_and(|m| m.len() > 0);
    debug!(path, has_rows, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!has_rows) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::RiskLevel;
    use chrono::{TimeZone, Utc};
    use std::env;
    use std::fs;
    use std::path::Path;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn record(id: &str) -> AnalysisRecord {
        AnalysisRecord {
            id: id.to_string(),
            food: "Apple".to_string(),
            quantity: Some("100g".to_string()),
            calories: None,
            microplastic_level: Some("0.5 mg/kg".to_string()),
            risk: RiskLevel::Low,
            risk_defaulted: false,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap(),
            timestamp_defaulted: false,
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&record("r1-0"));
    }

    #[test]
    fn test_write_json() {
        let mut buf = Vec::new();
        write_json(&mut buf, &record("r1-0")).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["food"], "Apple");
        assert_eq!(value["risk"], "LOW");
        assert_eq!(value["timestamp"], "2026-10-01T08:00:00Z");
        assert!(buf.ends_with(b"\n"));
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("plastiscan_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[record("r1-0")]).unwrap();
        append_records(&path, &[record("r1-1"), record("r2-0")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id,food,quantity"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("id,")).count(), 1);
        assert!(lines[1].starts_with("r1-0,Apple,100g,,0.5 mg/kg,LOW,false,"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_after_empty_file_writes_header() {
        let path = temp_path("plastiscan_test_empty.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[]).unwrap();
        assert!(Path::new(&path).exists());

        append_records(&path, &[record("r1-0")]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("id,"));

        fs::remove_file(&path).unwrap();
    }
}
