//! Loading records from files and manual entry
//!
//! JSON documents are taken as-is. CSV files become an array of objects,
//! one per data row, keyed by the header row; every cell stays a string
//! and numeric coercion is left to the converter.

use crate::convert::RawRecord;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(InputError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse a JSON document typed in by hand.
pub fn parse_json(text: &str) -> Result<RawRecord, InputError> {
    Ok(serde_json::from_str(text.trim())?)
}

pub fn load_json(path: &Path) -> Result<RawRecord, InputError> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

/// Read CSV with a header row into an array of string-valued objects.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<RawRecord, InputError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }
    Ok(Value::Array(rows))
}

pub fn load_csv(path: &Path) -> Result<RawRecord, InputError> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Load a file, picking the parser from its extension.
pub fn load_file(path: &Path) -> Result<RawRecord, InputError> {
    match InputFormat::from_path(path)? {
        InputFormat::Json => load_json(path),
        InputFormat::Csv => load_csv(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn csv_rows_become_string_objects() {
        let data = "timestamp,Outdoor_temperature,Electricity_consumption\n\
                    01/03/2024 08:30,3.5,120\n\
                    01/03/2024 09:30,4.0,118\n";
        let record = read_csv(data.as_bytes()).unwrap();
        assert_eq!(
            record,
            json!([
                {"timestamp": "01/03/2024 08:30", "Outdoor_temperature": "3.5", "Electricity_consumption": "120"},
                {"timestamp": "01/03/2024 09:30", "Outdoor_temperature": "4.0", "Electricity_consumption": "118"}
            ])
        );
    }

    #[test]
    fn csv_keeps_header_order() {
        let record = read_csv("b,a\n1,2\n".as_bytes()).unwrap();
        let keys: Vec<&String> = record[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn manual_json_is_trimmed() {
        let record = parse_json("  {\"powerMeasurements\": []}\n").unwrap();
        assert_eq!(record, json!({"powerMeasurements": []}));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(parse_json("{not json"), Err(InputError::Json(_))));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.JSON")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("dir/b.csv")).unwrap(), InputFormat::Csv);
        assert!(matches!(
            InputFormat::from_path(Path::new("c.xml")),
            Err(InputError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pv.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{\"powerMeasurements\": [{{\"value\": 1}}]}}").unwrap();

        let record = load_file(&path).unwrap();
        assert_eq!(record["powerMeasurements"][0]["value"], json!(1));
    }
}
