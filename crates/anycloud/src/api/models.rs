//! Typed views over the vendor API's loosely-typed JSON rows.
//!
//! The workbench API is inconsistent about scalar types (ids arrive as
//! numbers or strings depending on the endpoint), so rows are mapped
//! field-by-field instead of deriving `Deserialize` and fighting the drift.

use serde::Serialize;
use serde_json::Value;

/// String form of a JSON scalar: strings pass through, numbers are
/// formatted. `None` for null/missing and anything structured.
pub(crate) fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_string(row: &Value, key: &str) -> Option<String> {
    row.get(key).and_then(value_string)
}

fn field_u64(row: &Value, key: &str) -> u64 {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn field_i64(row: &Value, key: &str) -> Option<i64> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// One entry of the user's cloud file listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileItem {
    pub id: String,
    pub name: String,
    pub size_bytes: u64,
    pub created_at: u64,
    pub file_type: Option<i64>,
    pub md5: Option<String>,
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    pub gcode_id: Option<String>,
}

impl FileItem {
    pub(crate) fn from_row(row: &Value) -> Self {
        Self {
            id: field_string(row, "id").unwrap_or_default(),
            name: field_string(row, "old_filename")
                .or_else(|| field_string(row, "filename"))
                .unwrap_or_default(),
            size_bytes: field_u64(row, "size"),
            created_at: field_u64(row, "time"),
            file_type: field_i64(row, "file_type"),
            md5: field_string(row, "md5"),
            url: field_string(row, "url"),
            thumbnail: field_string(row, "thumbnail"),
            gcode_id: field_string(row, "gcode_id").filter(|id| !id.is_empty()),
        }
    }
}

/// Cloud storage quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quota {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

impl Quota {
    pub(crate) fn from_data(data: &Value) -> Self {
        Self {
            total_bytes: field_u64(data, "total_bytes"),
            used_bytes: field_u64(data, "used_bytes"),
        }
    }

    pub fn free_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}
