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
use crate::value::{effective, is_date, label, parse_numeric_str, Row, NULL};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Numeric,
    Categorical,
    Identifier,
    MultiValue,
    Date,
}
impl FieldKind {
    pub fn is_groupable(&self) -> bool {
        !matches!(self, FieldKind::Identifier | FieldKind::MultiValue)
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Numeric => "numeric",
            FieldKind::Categorical => "categorical",
            FieldKind::Identifier => "identifier",
            FieldKind::MultiValue => "multi-value",
            FieldKind::Date => "date",
        }
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProfile {
    pub name: String,
    pub kind: FieldKind,
    pub pure_id: bool,
    pub numeric_string: bool,
    pub sample_value: Option<String>,
    pub null_count: usize,
}
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub sampled_rows: usize,
    pub total_fields: usize,
    pub numeric_count: usize,
    pub categorical_count: usize,
    pub date_count: usize,
    pub identifier_count: usize,
    pub multi_value_count: usize,
}
impl DatasetSummary {
    pub fn supports_multi_metric_charts(&self) -> bool {
        self.numeric_count >= 2
    }
    pub fn supports_category_charts(&self, chart_type: ChartType) -> bool {
        let has_dimension = self.categorical_count > 0
            || (chart_type.accepts_date_dimension() && self.date_count > 0);
        has_dimension && self.numeric_count > 0
    }
    pub fn supports_scatter(&self) -> bool {
        self.numeric_count >= 2 || (self.numeric_count == 1 && self.categorical_count > 0)
    }
    pub fn supports(&self, chart_type: ChartType) -> bool {
        match chart_type {
            ChartType::Radar | ChartType::Composed => {
                self.supports_multi_metric_charts() && self.categorical_count > 0
            }
            ChartType::Scatter => self.supports_scatter(),
            ChartType::Table => self.total_fields > 0,
            other => self.supports_category_charts(other),
        }
    }
}
impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dataset: {} rows, {} fields ({} numeric, {} categorical, {} date, {} identifier, {} multi-value)",
            self.row_count,
            self.total_fields,
            self.numeric_count,
            self.categorical_count,
            self.date_count,
            self.identifier_count,
            self.multi_value_count
        )
    }
}
#[derive(Debug, Clone, Default)]
pub struct FieldProfiles {
    profiles: Vec<FieldProfile>,
    by_name: HashMap<String, usize>,
    row_count: usize,
    sampled_rows: usize,
}
impl FieldProfiles {
    pub fn new(profiles: Vec<FieldProfile>, row_count: usize, sampled_rows: usize) -> Self {
        let by_name = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self {
            profiles,
            by_name,
            row_count,
            sampled_rows,
        }
    }
    pub fn get(&self, name: &str) -> Option<&FieldProfile> {
        self.by_name.get(name).map(|&i| &self.profiles[i])
    }
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(|p| p.kind)
    }
    pub fn iter(&self) -> impl Iterator<Item = &FieldProfile> {
        self.profiles.iter()
    }
    pub fn len(&self) -> usize {
        self.profiles.len()
    }
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
    pub fn of_kind(&self, kind: FieldKind) -> impl Iterator<Item = &FieldProfile> {
        self.profiles.iter().filter(move |p| p.kind == kind)
    }
    pub fn numeric_fields(&self) -> Vec<&str> {
        self.of_kind(FieldKind::Numeric).map(|p| p.name.as_str()).collect()
    }
    pub fn first_numeric(&self, exclude: &[&str]) -> Option<&FieldProfile> {
        self.of_kind(FieldKind::Numeric)
            .find(|p| !exclude.contains(&p.name.as_str()))
    }
    pub fn first_date(&self, exclude: &[&str]) -> Option<&FieldProfile> {
        self.of_kind(FieldKind::Date)
            .find(|p| !exclude.contains(&p.name.as_str()))
    }
    pub fn best_categorical(
        &self,
        config: &VisualisationConfig,
        exclude: &[&str],
    ) -> Option<&FieldProfile> {
        // Fields null in every sampled row only win when nothing else is left.
        let (populated, empty): (Vec<&FieldProfile>, Vec<&FieldProfile>) = self
            .of_kind(FieldKind::Categorical)
            .filter(|p| !p.pure_id && !exclude.contains(&p.name.as_str()))
            .partition(|p| p.sample_value.is_some());
        Self::rank_grouping(config, &populated).or_else(|| Self::rank_grouping(config, &empty))
    }
    fn rank_grouping<'p>(
        config: &VisualisationConfig,
        candidates: &[&'p FieldProfile],
    ) -> Option<&'p FieldProfile> {
        candidates
            .iter()
            .find(|p| config.is_preferred_grouping_name(&p.name))
            .or_else(|| candidates.iter().find(|p| config.is_grouping_name(&p.name)))
            .or_else(|| candidates.first())
            .copied()
    }
    pub fn best_dimension(
        &self,
        config: &VisualisationConfig,
        chart_type: ChartType,
        exclude: &[&str],
    ) -> Option<&FieldProfile> {
        self.best_categorical(config, exclude).or_else(|| {
            if chart_type.accepts_date_dimension() {
                self.first_date(exclude)
            } else {
                None
            }
        })
    }
    pub fn summary(&self) -> DatasetSummary {
        let count = |kind| self.of_kind(kind).count();
        DatasetSummary {
            row_count: self.row_count,
            sampled_rows: self.sampled_rows,
            total_fields: self.profiles.len(),
            numeric_count: count(FieldKind::Numeric),
            categorical_count: count(FieldKind::Categorical),
            date_count: count(FieldKind::Date),
            identifier_count: count(FieldKind::Identifier),
            multi_value_count: count(FieldKind::MultiValue),
        }
    }
}
struct FieldSample<'r> {
    value: Option<&'r Value>,
    null_count: usize,
}
pub struct FieldProfiler<'a> {
    config: &'a VisualisationConfig,
}
impl<'a> FieldProfiler<'a> {
    pub fn new(config: &'a VisualisationConfig) -> Self {
        Self { config }
    }
    pub fn profile(&self, rows: &[Row]) -> FieldProfiles {
        let sample = &rows[..rows.len().min(self.config.sample_size)];
        let mut fields: IndexMap<&str, FieldSample> = IndexMap::new();
        for row in sample {
            for (name, value) in row {
                let entry = fields.entry(name.as_str()).or_insert(FieldSample {
                    value: None,
                    null_count: 0,
                });
                let value = effective(value);
                if value.is_null() {
                    entry.null_count += 1;
                } else if entry.value.is_none() {
                    entry.value = Some(value);
                }
            }
        }
        let profiles: Vec<FieldProfile> = fields
            .into_iter()
            .map(|(name, sample)| self.profile_field(name, &sample))
            .collect();
        for profile in &profiles {
            debug!(
                "Profiled field '{}' as {} (sample: {:?})",
                profile.name,
                profile.kind.as_str(),
                profile.sample_value
            );
        }
        FieldProfiles::new(profiles, rows.len(), sample.len())
    }
    fn profile_field(&self, name: &str, sample: &FieldSample) -> FieldProfile {
        let (kind, numeric_string) = self.classify(name, sample.value);
        FieldProfile {
            name: name.to_string(),
            kind,
            pure_id: self.config.is_pure_id_name(name),
            numeric_string,
            sample_value: sample.value.map(|v| label(v, &self.config.missing_label)),
            null_count: sample.null_count,
        }
    }
    pub fn classify(&self, name: &str, value: Option<&Value>) -> (FieldKind, bool) {
        if self.config.is_identifier_name(name) {
            return (FieldKind::Identifier, false);
        }
        let value = value.map(effective).unwrap_or(&NULL);
        if value.is_number() {
            return (FieldKind::Numeric, false);
        }
        if let Value::String(s) = value {
            if parse_numeric_str(s, &self.config.thousands_separators).is_some() {
                return (FieldKind::Numeric, true);
            }
            let rule = &self.config.multi_value;
            if s.contains(rule.delimiter) && s.chars().count() > rule.min_length {
                return (FieldKind::MultiValue, false);
            }
        }
        if self.config.is_grouping_name(name) {
            return (FieldKind::Categorical, false);
        }
        match value {
            Value::String(s) if is_date(s, &self.config.date_formats) => (FieldKind::Date, false),
            _ => (FieldKind::Categorical, false),
        }
    }
}
