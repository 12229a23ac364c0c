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

use crate::error::{QueryError, QueryRowsResult};
use crate::value::{json_type, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub has_more: bool,
}
impl QueryResult {
    pub fn new(rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            rows,
            row_count,
            has_more: false,
        }
    }
    pub fn with_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }
    pub fn from_value(value: Value) -> QueryRowsResult<Self> {
        match value {
            Value::Array(items) => Ok(Self::new(rows_from(items)?)),
            Value::Object(mut map) => {
                let rows = match map.remove("rows") {
                    Some(Value::Array(items)) => rows_from(items)?,
                    Some(other) => {
                        return Err(QueryError::InvalidRows {
                            found: format!("'rows' of type {}", json_type(&other)),
                        })
                    }
                    None => {
                        return Err(QueryError::InvalidRows {
                            found: "an object without 'rows'".to_string(),
                        })
                    }
                };
                let row_count = map
                    .get("row_count")
                    .and_then(Value::as_u64)
                    .map(|n| n as usize)
                    .unwrap_or(rows.len());
                let has_more = map.get("has_more").and_then(Value::as_bool).unwrap_or(false);
                Ok(Self {
                    rows,
                    row_count,
                    has_more,
                })
            }
            other => Err(QueryError::InvalidRows {
                found: json_type(&other).to_string(),
            }),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
fn rows_from(items: Vec<Value>) -> QueryRowsResult<Vec<Row>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            _ => Err(QueryError::InvalidRow { index }),
        })
        .collect()
}
