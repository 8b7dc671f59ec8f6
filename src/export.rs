//! CSV export of application records.
//!
//! The header row is the field list of the first record in serialized order;
//! every cell is double-quoted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{StoreError, StoreResult},
    models::{ApplicationRecord, ApplicationStatus},
    query,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    All,
    Approved,
    Declined,
    Graduated,
}

impl ExportScope {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportScope::All => "all_applications.csv",
            ExportScope::Approved => "approved_students.csv",
            ExportScope::Declined => "declined_applications.csv",
            ExportScope::Graduated => "graduated_students.csv",
        }
    }

    pub fn select(&self, records: &[ApplicationRecord]) -> Vec<ApplicationRecord> {
        match self {
            ExportScope::All => records.to_vec(),
            ExportScope::Approved => query::with_status(records, ApplicationStatus::Approved),
            ExportScope::Declined => query::with_status(records, ApplicationStatus::Declined),
            ExportScope::Graduated => query::with_status(records, ApplicationStatus::Graduated),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub file_name: &'static str,
    pub content: String,
    pub record_count: usize,
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Null) | None => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Render `records` as CSV. An empty slice is reported as
/// [`StoreError::NothingToExport`] rather than a header-only file.
pub fn to_csv(records: &[ApplicationRecord]) -> StoreResult<String> {
    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(anyhow::Error::from)?;

    let headers: Vec<String> = match rows.first().and_then(Value::as_object) {
        Some(first) => first.keys().cloned().collect(),
        None => return Err(StoreError::NothingToExport),
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(","));
    for row in &rows {
        let line = headers
            .iter()
            .map(|header| quote(&cell_text(row.get(header))))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

pub fn export(records: &[ApplicationRecord], scope: ExportScope) -> StoreResult<CsvExport> {
    let selected = scope.select(records);
    let content = to_csv(&selected)?;
    Ok(CsvExport {
        file_name: scope.file_name(),
        content,
        record_count: selected.len(),
    })
}
