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
use crate::plan::AggregateFunction;
use crate::plan_validator::ResolvedChart;
use crate::value::{as_number, field, label, Row};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedDatum {
    pub name: String,
    #[serde(flatten)]
    pub metrics: IndexMap<String, f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Row>,
}
impl ProjectedDatum {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: IndexMap::new(),
            details: Vec::new(),
        }
    }
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
    fn absorb(&mut self, other: ProjectedDatum) {
        for (key, value) in other.metrics {
            self.metrics
                .entry(key)
                .and_modify(|current| *current = current.max(value))
                .or_insert(value);
        }
        self.details.extend(other.details);
    }
}
pub const COUNT_KEY: &str = "count";
pub const SCATTER_X: &str = "x";
pub const SCATTER_Y: &str = "y";
pub const RESERVED_KEYS: [&str; 2] = ["name", "details"];
// A metric named like one of the datum's own keys is written under `<field>_value`.
pub fn metric_keys(metrics: &[String]) -> Vec<String> {
    let mut assigned: HashSet<String> = HashSet::with_capacity(metrics.len());
    let taken = |candidate: &str, assigned: &HashSet<String>| {
        RESERVED_KEYS.contains(&candidate)
            || assigned.contains(candidate)
            || metrics.iter().any(|m| m == candidate)
    };
    metrics
        .iter()
        .map(|field| {
            let key = if RESERVED_KEYS.contains(&field.as_str()) {
                let mut candidate = format!("{field}_value");
                let mut n = 2;
                while taken(&candidate, &assigned) {
                    candidate = format!("{field}_value_{n}");
                    n += 1;
                }
                candidate
            } else {
                field.clone()
            };
            assigned.insert(key.clone());
            key
        })
        .collect()
}
// Keys the projected data carries for each metric of `chart`. Scatter points use fixed axis keys,
// so their metrics keep the field names.
pub fn output_metrics(chart: &ResolvedChart) -> Vec<String> {
    match chart.chart_type {
        ChartType::Scatter => chart.metrics.clone(),
        _ => metric_keys(&chart.metrics),
    }
}
fn merge_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
// Metrics of colliding groups merge by max; details are concatenated.
pub fn merge_duplicates(data: Vec<ProjectedDatum>) -> Vec<ProjectedDatum> {
    let mut merged: IndexMap<String, ProjectedDatum> = IndexMap::with_capacity(data.len());
    for datum in data {
        match merged.get_mut(&merge_key(&datum.name)) {
            Some(existing) => {
                debug!("Merging duplicate group '{}'", datum.name);
                existing.absorb(datum);
            }
            None => {
                merged.insert(merge_key(&datum.name), datum);
            }
        }
    }
    merged.into_values().collect()
}
struct Group {
    display: String,
    values: Vec<Vec<f64>>,
    rows: Vec<Row>,
}
pub struct Aggregator<'a> {
    config: &'a VisualisationConfig,
}
impl<'a> Aggregator<'a> {
    pub fn new(config: &'a VisualisationConfig) -> Self {
        Self { config }
    }
    pub fn project(&self, chart: &ResolvedChart, rows: &[Row]) -> Vec<ProjectedDatum> {
        let data = match chart.chart_type {
            ChartType::Scatter => self.project_scatter(chart, rows),
            ChartType::Table => self.project_table(chart, rows),
            _ => match chart.dimension.as_deref() {
                Some(dimension) => {
                    self.group(dimension, &chart.metrics, chart.function, rows)
                }
                None => Vec::new(),
            },
        };
        let data = self.apply_caps(chart.chart_type, data);
        debug!(
            "Projected {} into {} data points from {} rows",
            chart.chart_type,
            data.len(),
            rows.len()
        );
        data
    }
    pub fn group(
        &self,
        dimension: &str,
        metrics: &[String],
        function: AggregateFunction,
        rows: &[Row],
    ) -> Vec<ProjectedDatum> {
        let output = metric_keys(metrics);
        let keys: Vec<(&str, &str)> = metrics
            .iter()
            .zip(&output)
            .map(|(field, key)| (field.as_str(), key.as_str()))
            .collect();
        self.group_as(dimension, &keys, function, rows)
    }
    fn group_as(
        &self,
        dimension: &str,
        metrics: &[(&str, &str)],
        function: AggregateFunction,
        rows: &[Row],
    ) -> Vec<ProjectedDatum> {
        let separators = &self.config.thousands_separators;
        let mut groups: IndexMap<String, Group> = IndexMap::new();
        for row in rows {
            let name = label(field(row, dimension), &self.config.missing_label);
            let group = groups.entry(name.clone()).or_insert_with(|| Group {
                display: name,
                values: vec![Vec::new(); metrics.len()],
                rows: Vec::new(),
            });
            for (slot, (source, _)) in group.values.iter_mut().zip(metrics) {
                if let Some(value) = as_number(field(row, source), separators) {
                    slot.push(value);
                }
            }
            group.rows.push(row.clone());
        }
        let data = groups
            .into_values()
            .map(|group| {
                let mut datum = ProjectedDatum::new(group.display);
                if metrics.is_empty() {
                    datum
                        .metrics
                        .insert(COUNT_KEY.to_string(), group.rows.len() as f64);
                }
                for ((_, key), values) in metrics.iter().zip(&group.values) {
                    datum.metrics.insert(key.to_string(), function.apply(values));
                }
                datum.details = group.rows;
                datum
            })
            .collect();
        merge_duplicates(data)
    }
    fn project_scatter(&self, chart: &ResolvedChart, rows: &[Row]) -> Vec<ProjectedDatum> {
        let separators = &self.config.thousands_separators;
        match chart.metrics.as_slice() {
            [x, y, ..] => {
                let mut names = UniqueNames::default();
                rows.iter()
                    .enumerate()
                    .filter_map(|(i, row)| {
                        let x_value = as_number(field(row, x), separators)?;
                        let y_value = as_number(field(row, y), separators)?;
                        let name = match chart.dimension.as_deref() {
                            Some(dimension) => names.claim(label(
                                field(row, dimension),
                                &self.config.missing_label,
                            )),
                            None => names.claim((i + 1).to_string()),
                        };
                        let mut datum = ProjectedDatum::new(name);
                        datum.metrics.insert(SCATTER_X.to_string(), x_value);
                        datum.metrics.insert(SCATTER_Y.to_string(), y_value);
                        datum.details.push(row.clone());
                        Some(datum)
                    })
                    .collect()
            }
            [y] => match chart.dimension.as_deref() {
                Some(dimension) => {
                    self.group_as(dimension, &[(y.as_str(), SCATTER_Y)], chart.function, rows)
                }
                None => Vec::new(),
            },
            [] => Vec::new(),
        }
    }
    fn project_table(&self, chart: &ResolvedChart, rows: &[Row]) -> Vec<ProjectedDatum> {
        let separators = &self.config.thousands_separators;
        let keys = metric_keys(&chart.metrics);
        let mut names = UniqueNames::default();
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let name = match chart.dimension.as_deref() {
                    Some(dimension) => {
                        names.claim(label(field(row, dimension), &self.config.missing_label))
                    }
                    None => names.claim((i + 1).to_string()),
                };
                let mut datum = ProjectedDatum::new(name);
                for (metric, key) in chart.metrics.iter().zip(&keys) {
                    if let Some(value) = as_number(field(row, metric), separators) {
                        datum.metrics.insert(key.clone(), value);
                    }
                }
                datum.details.push(row.clone());
                datum
            })
            .collect()
    }
    fn apply_caps(&self, chart_type: ChartType, mut data: Vec<ProjectedDatum>) -> Vec<ProjectedDatum> {
        let caps = &self.config.caps;
        match chart_type {
            ChartType::Funnel => {
                let first_value = |d: &ProjectedDatum| d.metrics.values().next().copied().unwrap_or(0.0);
                data.sort_by(|a, b| first_value(b).total_cmp(&first_value(a)));
                data.truncate(caps.funnel_stages);
            }
            ChartType::Treemap => data.truncate(caps.treemap_categories),
            ChartType::Radar | ChartType::Composed => data.truncate(caps.multi_metric_categories),
            _ => {}
        }
        data
    }
}
#[derive(Default)]
struct UniqueNames {
    seen: HashSet<String>,
}
impl UniqueNames {
    fn claim(&mut self, base: String) -> String {
        if self.seen.insert(merge_key(&base)) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base} ({n})");
            if self.seen.insert(merge_key(&candidate)) {
                return candidate;
            }
            n += 1;
        }
    }
}
