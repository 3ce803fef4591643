/// JSON-line ingestion and extraction.
///
/// Producers hand the dataset one JSON object per line; consumers get rows
/// back as JSON objects with keys in schema order. Only the closed value set
/// maps across: integers, other numbers (as floats), strings and null.
/// Booleans, arrays and nested objects are rejected.

use crate::column::Value;
use crate::dataset::{Dataset, Row, Schema};
use crate::error::{DatasetError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::io::BufRead;

/// Outcome of loading a stream of JSON lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_loaded: usize,
    /// (1-based line number, reason) for every line that was not loaded
    pub skipped: Vec<(usize, String)>,
}

fn value_from_json(key: &str, value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                n.as_f64().map(Value::Float).ok_or_else(|| {
                    DatasetError::InvalidJson(format!("number out of range for key '{}'", key))
                })
            }
        }
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Null => Ok(Value::Null),
        _ => Err(DatasetError::InvalidJson(format!(
            "unsupported JSON value type for key '{}'",
            key
        ))),
    }
}

/// Parse one line holding a JSON object into a row.
pub fn row_from_json_line(line: &str) -> Result<Row> {
    let parsed: serde_json::Value = serde_json::from_str(line)?;
    let obj = parsed
        .as_object()
        .ok_or_else(|| DatasetError::InvalidJson("expected a JSON object".to_string()))?;

    let mut row = HashMap::with_capacity(obj.len());
    for (key, value) in obj {
        row.insert(key.clone(), value_from_json(key, value)?);
    }
    Ok(row)
}

/// A row paired with the schema that orders its keys.
struct OrderedRow<'a> {
    row: &'a Row,
    schema: &'a Schema,
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema.len()))?;
        for name in self.schema.get_column_names() {
            map.serialize_entry(name, self.row.get(name).unwrap_or(&Value::Null))?;
        }
        map.end()
    }
}

/// Render a row as a single-line JSON object, keys in schema order.
///
/// Columns absent from `row` are written as null.
pub fn row_to_json_line(row: &Row, schema: &Schema) -> Result<String> {
    Ok(serde_json::to_string(&OrderedRow { row, schema })?)
}

/// Append every JSON line from `reader` to `dataset`.
///
/// Blank lines are ignored. Lines that fail to parse, or that the dataset
/// rejects, are logged and recorded in the summary; loading continues with the
/// next line. Only read errors abort the load.
pub fn load_json_lines<R: BufRead>(dataset: &mut Dataset, reader: R) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        match row_from_json_line(&line).and_then(|row| dataset.append(row)) {
            Ok(()) => summary.rows_loaded += 1,
            Err(e) => {
                log::warn!("Failed at [{}]: {}", line_no, e);
                summary.skipped.push((line_no, e.to_string()));
            }
        }
    }

    log::debug!(
        "loaded {} rows, skipped {} lines",
        summary.rows_loaded,
        summary.skipped.len()
    );
    Ok(summary)
}
