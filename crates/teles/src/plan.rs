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

use crate::chart_type::ChartType;
use crate::config::VisualisationConfig;
use crate::diagnostics::Diagnostic;
use crate::error::{PlanError, PlanResult};
use crate::value::json_type;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Sum,
    Count,
    Avg,
    Max,
    Min,
}
impl AggregateFunction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sum" | "total" => Some(AggregateFunction::Sum),
            "count" | "cnt" => Some(AggregateFunction::Count),
            "avg" | "average" | "mean" => Some(AggregateFunction::Avg),
            "max" | "maximum" => Some(AggregateFunction::Max),
            "min" | "minimum" => Some(AggregateFunction::Min),
            _ => None,
        }
    }
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            AggregateFunction::Sum => values.iter().sum(),
            AggregateFunction::Count => values.len() as f64,
            AggregateFunction::Avg => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            AggregateFunction::Max => values.iter().copied().reduce(f64::max).unwrap_or(0.0),
            AggregateFunction::Min => values.iter().copied().reduce(f64::min).unwrap_or(0.0),
        }
    }
    pub fn title_prefix(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "Total",
            AggregateFunction::Count => "Count of",
            AggregateFunction::Avg => "Average",
            AggregateFunction::Max => "Maximum",
            AggregateFunction::Min => "Minimum",
        }
    }
}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChartPlanEntry {
    #[serde(rename = "type", alias = "chart_type", default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data_source: Option<RawDataSource>,
}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDataSource {
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Option<String>,
    #[serde(default)]
    pub aggregate: Option<RawAggregate>,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAggregate {
    Spec {
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        function: Option<String>,
    },
    Field(String),
}
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPlanEntry {
    pub chart_type: ChartType,
    pub title: Option<String>,
    pub group_by_field: Option<String>,
    pub aggregate_field: Option<String>,
    pub aggregate_function: Option<AggregateFunction>,
    pub x_axis_field: Option<String>,
    pub y_axis_field: Option<String>,
}
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
impl ChartPlanEntry {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            title: None,
            group_by_field: None,
            aggregate_field: None,
            aggregate_function: None,
            x_axis_field: None,
            y_axis_field: None,
        }
    }
    pub fn with_group_by(mut self, field: &str) -> Self {
        self.group_by_field = Some(field.to_string());
        self
    }
    pub fn with_aggregate(mut self, field: &str, function: AggregateFunction) -> Self {
        self.aggregate_field = Some(field.to_string());
        self.aggregate_function = Some(function);
        self
    }
    pub fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x_axis_field = Some(x.to_string());
        self.y_axis_field = Some(y.to_string());
        self
    }
    pub fn from_raw(raw: RawChartPlanEntry, config: &VisualisationConfig) -> Result<Self, String> {
        let type_token = non_blank(raw.chart_type).ok_or_else(|| "missing 'type'".to_string())?;
        let chart_type = parse_chart_type(&type_token, config)
            .ok_or_else(|| format!("unknown chart type '{type_token}'"))?;
        let source = raw.data_source.unwrap_or_default();
        let (aggregate_field, aggregate_function) = match source.aggregate {
            Some(RawAggregate::Spec { field, function }) => {
                let function = match non_blank(function) {
                    Some(f) => Some(
                        AggregateFunction::parse(&f)
                            .ok_or_else(|| format!("unknown aggregate function '{f}'"))?,
                    ),
                    None => None,
                };
                (non_blank(field), function)
            }
            Some(RawAggregate::Field(field)) => (non_blank(Some(field)), None),
            None => (None, None),
        };
        Ok(Self {
            chart_type,
            title: non_blank(raw.title),
            group_by_field: non_blank(source.group_by),
            aggregate_field,
            aggregate_function,
            x_axis_field: non_blank(source.x_axis),
            y_axis_field: non_blank(source.y_axis),
        })
    }
}
pub fn parse_chart_type(token: &str, config: &VisualisationConfig) -> Option<ChartType> {
    let mut normalised: String = token
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if normalised.len() > "chart".len() {
        if let Some(stem) = normalised.strip_suffix("chart") {
            normalised = stem.to_string();
        }
    }
    ChartType::from_token(&normalised).or_else(|| config.chart_aliases.get(&normalised).copied())
}
pub type ParsedPlan = Vec<Result<ChartPlanEntry, Diagnostic>>;
pub fn parse_plan(value: &Value, config: &VisualisationConfig) -> PlanResult<ParsedPlan> {
    let entries: Vec<&Value> = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("charts") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(other) => {
                return Err(PlanError::InvalidShape {
                    found: format!("'charts' of type {}", json_type(other)),
                })
            }
            None => vec![value],
        },
        other => {
            return Err(PlanError::InvalidShape {
                found: json_type(other).to_string(),
            })
        }
    };
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<RawChartPlanEntry>(item.clone())
                .map_err(|e| e.to_string())
                .and_then(|raw| ChartPlanEntry::from_raw(raw, config))
                .map_err(|reason| {
                    warn!("Chart plan entry #{} is malformed: {}", index, reason);
                    Diagnostic::MalformedPlanEntry { index, reason }
                })
        })
        .collect())
}
pub fn parse_plan_str(content: &str, config: &VisualisationConfig) -> PlanResult<ParsedPlan> {
    let value: Value = serde_json::from_str(content)?;
    parse_plan(&value, config)
}
