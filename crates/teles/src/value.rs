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

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
pub type Row = serde_json::Map<String, Value>;
pub(crate) static NULL: Value = Value::Null;
pub fn effective(value: &Value) -> &Value {
    match value {
        Value::Object(map) if map.len() == 1 => map.get("value").unwrap_or(value),
        _ => value,
    }
}
pub fn field<'a>(row: &'a Row, name: &str) -> &'a Value {
    row.get(name).map(effective).unwrap_or(&NULL)
}
pub fn parse_numeric_str(raw: &str, separators: &[char]) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut cleaned = trimmed.to_string();
    for sep in separators {
        cleaned = strip_thousands(&cleaned, *sep)?;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
fn strip_thousands(s: &str, sep: char) -> Option<String> {
    if !s.contains(sep) {
        return Some(s.to_string());
    }
    let (int_part, rest) = match s.find(|c: char| c == '.' || c == 'e' || c == 'E') {
        Some(i) => s.split_at(i),
        None => (s, ""),
    };
    if rest.contains(sep) {
        return None;
    }
    let unsigned = int_part.trim_start_matches(|c| c == '+' || c == '-');
    let mut groups = unsigned.split(sep);
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 || !first.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    Some(format!("{}{}", int_part.replace(sep, ""), rest))
}
pub fn as_number(value: &Value, separators: &[char]) -> Option<f64> {
    match effective(value) {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_str(s, separators),
        _ => None,
    }
}
pub fn label(value: &Value, missing: &str) -> String {
    let text = match effective(value) {
        Value::Null => return missing.to_string(),
        Value::String(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        missing.to_string()
    } else {
        text
    }
}
pub fn is_date(raw: &str, formats: &[String]) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    if DateTime::parse_from_rfc3339(trimmed).is_ok() {
        return true;
    }
    formats.iter().any(|format| {
        NaiveDateTime::parse_from_str(trimmed, format).is_ok()
            || NaiveDate::parse_from_str(trimmed, format).is_ok()
    })
}
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
pub fn humanise(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    #[test]
    fn unwraps_single_value_wrapper() {
        assert_eq!(effective(&json!({"value": 12})), &json!(12));
        assert_eq!(effective(&json!({"value": 1, "unit": "kg"})), &json!({"value": 1, "unit": "kg"}));
        assert_eq!(effective(&json!({"amount": 3})), &json!({"amount": 3}));
    }
    #[test]
    fn parses_numeric_strings_with_grouping() {
        assert_eq!(parse_numeric_str(" 93.50 ", &[',']), Some(93.5));
        assert_eq!(parse_numeric_str("1,234,567.25", &[',']), Some(1_234_567.25));
        assert_eq!(parse_numeric_str("-12,000", &[',']), Some(-12_000.0));
        assert_eq!(parse_numeric_str("3,4", &[',']), None);
        assert_eq!(parse_numeric_str("inf", &[',']), None);
        assert_eq!(parse_numeric_str("NaN", &[',']), None);
        assert_eq!(parse_numeric_str("", &[',']), None);
        assert_eq!(parse_numeric_str("12abc", &[',']), None);
    }
    #[test]
    fn labels_collapse_whitespace_and_fill_missing() {
        assert_eq!(label(&json!("  Acme   Corp "), "Unknown"), "Acme Corp");
        assert_eq!(label(&json!(null), "Unknown"), "Unknown");
        assert_eq!(label(&json!("   "), "Unknown"), "Unknown");
        assert_eq!(label(&json!({"value": 2024}), "Unknown"), "2024");
        assert_eq!(label(&json!(true), "Unknown"), "true");
    }
    #[test]
    fn recognises_dates() {
        let formats = vec!["%Y-%m-%d".to_string(), "%m/%d/%Y".to_string()];
        assert!(is_date("2024-03-01", &formats));
        assert!(is_date("03/01/2024", &formats));
        assert!(is_date("2024-03-01T10:00:00Z", &formats));
        assert!(!is_date("March", &formats));
    }
    #[test]
    fn humanises_field_names() {
        assert_eq!(humanise("total_amount"), "Total Amount");
        assert_eq!(humanise("vendor-name"), "Vendor Name");
    }
}
