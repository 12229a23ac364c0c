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
use crate::error::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualisationConfig {
    pub sample_size: usize,
    pub identifier_keywords: Vec<String>,
    pub pure_id_names: Vec<String>,
    pub grouping_keywords: Vec<String>,
    pub preferred_grouping_fields: Vec<String>,
    pub multi_value: MultiValueRule,
    pub thousands_separators: Vec<char>,
    pub date_formats: Vec<String>,
    pub caps: ProjectionCaps,
    pub chart_aliases: IndexMap<String, ChartType>,
    pub auto_chart_types: Vec<ChartType>,
    pub missing_label: String,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiValueRule {
    pub delimiter: char,
    pub min_length: usize,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionCaps {
    pub multi_metric_fields: usize,
    pub multi_metric_categories: usize,
    pub funnel_stages: usize,
    pub treemap_categories: usize,
}
impl Default for MultiValueRule {
    fn default() -> Self {
        Self {
            delimiter: ',',
            min_length: 20,
        }
    }
}
impl Default for ProjectionCaps {
    fn default() -> Self {
        Self {
            multi_metric_fields: 5,
            multi_metric_categories: 8,
            funnel_stages: 6,
            treemap_categories: 12,
        }
    }
}
fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
impl Default for VisualisationConfig {
    fn default() -> Self {
        let mut chart_aliases = IndexMap::new();
        chart_aliases.insert("radial".to_string(), ChartType::RadialBar);
        chart_aliases.insert("mixed".to_string(), ChartType::Composed);
        Self {
            sample_size: 10,
            identifier_keywords: strings(&["number", "id", "uuid", "code", "ref", "reference"]),
            pure_id_names: strings(&["id", "uuid"]),
            grouping_keywords: strings(&["name", "category", "type", "status", "group", "class"]),
            preferred_grouping_fields: strings(&["vendor_name", "supplier_name"]),
            multi_value: MultiValueRule::default(),
            thousands_separators: vec![','],
            date_formats: strings(&[
                "%Y-%m-%d",
                "%Y-%m-%d %H:%M:%S",
                "%Y-%m-%dT%H:%M:%S",
                "%Y-%m-%dT%H:%M:%SZ",
                "%m/%d/%Y",
                "%d/%m/%Y",
            ]),
            caps: ProjectionCaps::default(),
            chart_aliases,
            auto_chart_types: vec![ChartType::Pie, ChartType::Bar],
            missing_label: "Unknown".to_string(),
        }
    }
}
impl VisualisationConfig {
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sample_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sample_size".to_string(),
                value: self.sample_size.to_string(),
            });
        }
        for (field, table) in [
            ("identifier_keywords", &self.identifier_keywords),
            ("grouping_keywords", &self.grouping_keywords),
        ] {
            if table.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::EmptyTable {
                    field: field.to_string(),
                });
            }
        }
        for (field, cap) in [
            ("caps.multi_metric_fields", self.caps.multi_metric_fields),
            ("caps.multi_metric_categories", self.caps.multi_metric_categories),
            ("caps.funnel_stages", self.caps.funnel_stages),
            ("caps.treemap_categories", self.caps.treemap_categories),
        ] {
            if cap == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: cap.to_string(),
                });
            }
        }
        if self.caps.multi_metric_fields < 2 {
            return Err(ConfigError::InvalidValue {
                field: "caps.multi_metric_fields".to_string(),
                value: self.caps.multi_metric_fields.to_string(),
            });
        }
        if let Some(alias) = self
            .chart_aliases
            .keys()
            .find(|alias| alias.trim().is_empty() || alias.chars().any(|c| !c.is_alphanumeric()))
        {
            return Err(ConfigError::InvalidValue {
                field: "chart_aliases".to_string(),
                value: alias.clone(),
            });
        }
        if let Some(chart) = self.auto_chart_types.iter().find(|c| **c == ChartType::Table) {
            return Err(ConfigError::InvalidValue {
                field: "auto_chart_types".to_string(),
                value: chart.token().to_string(),
            });
        }
        Ok(())
    }
    pub fn for_dense_dashboards() -> Self {
        Self {
            caps: ProjectionCaps {
                multi_metric_fields: 3,
                multi_metric_categories: 5,
                funnel_stages: 4,
                treemap_categories: 8,
            },
            ..Default::default()
        }
    }
    pub fn for_exploration() -> Self {
        Self {
            sample_size: 25,
            caps: ProjectionCaps {
                multi_metric_fields: 8,
                multi_metric_categories: 12,
                funnel_stages: 8,
                treemap_categories: 20,
            },
            ..Default::default()
        }
    }
    pub fn is_identifier_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.identifier_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| lower.contains(&k.to_lowercase()))
    }
    pub fn is_pure_id_name(&self, name: &str) -> bool {
        self.pure_id_names
            .iter()
            .any(|id| id.eq_ignore_ascii_case(name.trim()))
    }
    pub fn is_grouping_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.grouping_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| lower.contains(&k.to_lowercase()))
    }
    pub fn is_preferred_grouping_name(&self, name: &str) -> bool {
        self.preferred_grouping_fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(name))
    }
}
