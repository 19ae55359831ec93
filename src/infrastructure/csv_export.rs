//! CSV export of a merged wine document

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

use crate::domain::dedup::dedupe_records;
use crate::domain::wine_record::{WineRecord, CSV_COLUMNS};

/// Default CSV path for a JSON input: `.json` replaced by `.csv`.
pub fn default_csv_path(json_path: &Path) -> PathBuf {
    json_path.with_extension("csv")
}

/// Records of either a `{"wines": [...]}` document or a bare array.
pub fn records_from_document(document: Value) -> Result<Vec<WineRecord>> {
    let wines = match document {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map.remove("wines").unwrap_or(Value::Array(Vec::new())),
        _ => Value::Array(Vec::new()),
    };
    serde_json::from_value(wines).context("Records do not match the wine schema")
}

/// Write `records` with the fixed header. Nulls become empty cells.
pub fn write_csv(path: &Path, records: &[WineRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.write_record(record.csv_row())?;
    }
    writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;
    Ok(())
}

/// Export a merged JSON file to CSV.
///
/// Returns the CSV path, or `None` when the input holds no records (nothing
/// is written in that case).
pub async fn export_csv(json_path: &Path, csv_path: Option<&Path>) -> Result<Option<PathBuf>> {
    let content = fs::read_to_string(json_path)
        .await
        .with_context(|| format!("Failed to read {:?}", json_path))?;
    let document: Value =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", json_path))?;

    let records = dedupe_records(records_from_document(document)?);
    if records.is_empty() {
        warn!("⚠️  No records in {:?}, CSV not written", json_path);
        return Ok(None);
    }

    let target = csv_path.map(Path::to_path_buf).unwrap_or_else(|| default_csv_path(json_path));
    write_csv(&target, &records)?;
    info!("📄 Exported {} records to {:?}", records.len(), target);

    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_export_writes_header_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("reds.json");
        let document = json!({"wines": [
            {"id": 1, "name": "Alpha", "vintage": 2018, "rating": 4.1, "flavor_rank1": "oak"},
            {"id": 1, "name": "Alpha again", "vintage": 2018},
            {"id": 2, "name": "Beta, Reserve", "vintage": null}
        ]});
        std::fs::write(&json_path, document.to_string()).unwrap();

        let written = export_csv(&json_path, None).await.unwrap().unwrap();
        assert_eq!(written, dir.path().join("reds.csv"));

        let content = std::fs::read_to_string(&written).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_COLUMNS.join(","));
        assert_eq!(lines[1], "1,Alpha,2018,,,,4.1,,,,,,oak,,");
        assert_eq!(lines[2], "2,\"Beta, Reserve\",,,,,,,,,,,,,");
    }

    #[tokio::test]
    async fn test_empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("empty.json");
        std::fs::write(&json_path, r#"{"wines": []}"#).unwrap();

        assert!(export_csv(&json_path, None).await.unwrap().is_none());
        assert!(!dir.path().join("empty.csv").exists());
    }

    #[test]
    fn test_records_from_bare_array() {
        let records = records_from_document(json!([{"id": 5}])).unwrap();
        assert_eq!(records[0].id, Some(5));
    }

    #[test]
    fn test_default_csv_path() {
        assert_eq!(default_csv_path(Path::new("out/reds.json")), PathBuf::from("out/reds.csv"));
    }
}
