//! BIDS electrodes.tsv reader
//!
//! Tab-separated, header row first. Only `name` is required; coordinate and
//! descriptive columns are passed through as text so the database keeps
//! whatever precision the file carries. `n/a` and empty cells become NULL.

use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::error::{ImportError, ImportResult};

/// One electrode from an electrodes.tsv file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ElectrodeRow {
    pub name: String,
    #[serde(default, deserialize_with = "na_as_none")]
    pub x: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub y: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub z: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "na_as_none")]
    pub electrode_type: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "na_as_none")]
    pub impedance: Option<String>,
}

fn na_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("n/a")))
}

/// Read all electrode rows from a TSV file
///
/// Fails with `EmptyOrInvalidFile` when the file cannot be parsed, lacks a
/// `name` column, has a row with an empty name, or holds no data rows.
pub fn read_electrode_tsv(path: &Path) -> ImportResult<Vec<ElectrodeRow>> {
    let invalid = |reason: String| ImportError::EmptyOrInvalidFile {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| invalid(e.to_string()))?;

    let headers = reader.headers().map_err(|e| invalid(e.to_string()))?;
    if !headers.iter().any(|h| h == "name") {
        return Err(invalid("missing 'name' column".to_string()));
    }

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<ElectrodeRow>().enumerate() {
        let row = record.map_err(|e| invalid(format!("row {}: {}", index + 1, e)))?;
        if row.name.is_empty() {
            return Err(invalid(format!("row {}: empty electrode name", index + 1)));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(invalid("no data rows".to_string()));
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "Parsed electrode file");

    Ok(rows)
}
