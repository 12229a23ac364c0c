// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use teles::{QueryResult, Row};
use tracing::debug;

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

pub fn load_rows(path: &Path) -> Result<QueryResult> {
    if is_csv(path) {
        return load_csv_rows(path);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows from '{}'", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Rows file '{}' is not valid JSON", path.display()))?;
    let query = QueryResult::from_value(value)
        .with_context(|| format!("Rows file '{}' has an unexpected shape", path.display()))?;
    debug!("Loaded {} rows from {}", query.rows.len(), path.display());
    Ok(query)
}

pub fn load_csv_rows(path: &Path) -> Result<QueryResult> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV '{}'", path.display()))?;
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad CSV record {}", line + 1))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (name.to_string(), value)
            })
            .collect();
        rows.push(row);
    }
    debug!("Loaded {} CSV rows from {}", rows.len(), path.display());
    Ok(QueryResult::new(rows))
}

pub fn load_plan(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chart plan '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Chart plan '{}' is not valid JSON", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_cells_become_strings_and_blanks_become_null() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp csv");
        writeln!(file, "vendor_name,total").expect("write");
        writeln!(file, "Acme, 93.50").expect("write");
        writeln!(file, "Tech Inc,").expect("write");
        let query = load_rows(file.path()).expect("rows");
        assert_eq!(query.rows.len(), 2);
        assert_eq!(query.rows[0]["total"], Value::String("93.50".to_string()));
        assert_eq!(query.rows[1]["total"], Value::Null);
    }

    #[test]
    fn missing_plan_means_no_entries() {
        assert_eq!(load_plan(None).expect("plan"), Value::Null);
    }
}
