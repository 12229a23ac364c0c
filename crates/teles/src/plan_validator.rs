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
use crate::data_profiler::{DatasetSummary, FieldKind, FieldProfiles};
use crate::diagnostics::{Diagnostic, FieldIssue, FieldRole};
use crate::error::ErrorSeverity;
use crate::plan::{AggregateFunction, ChartPlanEntry};
use serde::Serialize;
use tracing::{info, warn};
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedChart {
    pub chart_type: ChartType,
    pub title: Option<String>,
    pub dimension: Option<String>,
    pub metrics: Vec<String>,
    pub function: AggregateFunction,
    pub diagnostics: Vec<Diagnostic>,
}
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Accepted(ResolvedChart),
    Dropped {
        chart_type: ChartType,
        diagnostics: Vec<Diagnostic>,
    },
}
impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accepted(_))
    }
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Validation::Accepted(chart) => &chart.diagnostics,
            Validation::Dropped { diagnostics, .. } => diagnostics,
        }
    }
}
pub(crate) fn record(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    match diagnostic.severity() {
        ErrorSeverity::Info => info!("{}", diagnostic),
        _ => warn!("{}", diagnostic),
    }
    diagnostics.push(diagnostic);
}
pub struct PlanValidator<'a> {
    config: &'a VisualisationConfig,
    profiles: &'a FieldProfiles,
    summary: DatasetSummary,
}
impl<'a> PlanValidator<'a> {
    pub fn new(config: &'a VisualisationConfig, profiles: &'a FieldProfiles) -> Self {
        Self {
            config,
            profiles,
            summary: profiles.summary(),
        }
    }
    pub fn validate(&self, index: usize, entry: &ChartPlanEntry) -> Validation {
        let mut diagnostics = Vec::new();
        let resolved = match entry.chart_type {
            ChartType::Radar | ChartType::Composed => {
                self.validate_multi_metric(entry, &mut diagnostics)
            }
            ChartType::Scatter => self.validate_scatter(entry, &mut diagnostics),
            ChartType::Table => self.validate_table(entry),
            _ => self.validate_category(index, entry, &mut diagnostics),
        };
        match resolved {
            Some((dimension, metrics, function)) => Validation::Accepted(ResolvedChart {
                chart_type: entry.chart_type,
                title: entry.title.clone(),
                dimension,
                metrics,
                function,
                diagnostics,
            }),
            None => Validation::Dropped {
                chart_type: entry.chart_type,
                diagnostics,
            },
        }
    }
    fn check_dimension(
        &self,
        chart_type: ChartType,
        role: FieldRole,
        field: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<String> {
        let kind = self.profiles.kind_of(field);
        if kind.is_some_and(|k| k.is_groupable()) {
            return Some(field.to_string());
        }
        let issue = kind
            .and_then(FieldIssue::for_kind)
            .unwrap_or(FieldIssue::Missing);
        match self.profiles.best_dimension(self.config, chart_type, &[]) {
            Some(replacement) => {
                record(
                    diagnostics,
                    Diagnostic::FieldSubstituted {
                        chart_type,
                        role,
                        field: field.to_string(),
                        issue,
                        replacement: replacement.name.clone(),
                    },
                );
                Some(replacement.name.clone())
            }
            None => {
                record(
                    diagnostics,
                    Diagnostic::UnsuitableFieldReference {
                        chart_type,
                        role,
                        field: field.to_string(),
                        issue,
                    },
                );
                None
            }
        }
    }
    fn check_metric(
        &self,
        chart_type: ChartType,
        role: FieldRole,
        field: &str,
        exclude: &[&str],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<String> {
        let issue = match self.profiles.kind_of(field) {
            Some(FieldKind::Numeric) => return Some(field.to_string()),
            Some(kind) => FieldIssue::NotNumeric(kind),
            None => FieldIssue::Missing,
        };
        match self.profiles.first_numeric(exclude) {
            Some(replacement) => {
                record(
                    diagnostics,
                    Diagnostic::FieldSubstituted {
                        chart_type,
                        role,
                        field: field.to_string(),
                        issue,
                        replacement: replacement.name.clone(),
                    },
                );
                Some(replacement.name.clone())
            }
            None => {
                record(
                    diagnostics,
                    Diagnostic::UnsuitableFieldReference {
                        chart_type,
                        role,
                        field: field.to_string(),
                        issue,
                    },
                );
                None
            }
        }
    }
    fn checked_dimension(
        &self,
        entry: &ChartPlanEntry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Option<String>> {
        let named: Vec<(FieldRole, &str)> = [
            (FieldRole::GroupBy, entry.group_by_field.as_deref()),
            (FieldRole::XAxis, entry.x_axis_field.as_deref()),
        ]
        .into_iter()
        .filter_map(|(role, field)| field.map(|field| (role, field)))
        .collect();
        let Some(&(first_role, first_field)) = named.first() else {
            return Some(None);
        };
        // A usable reference wins over substituting for an unusable one.
        let usable = named
            .iter()
            .copied()
            .find(|(_, field)| self.profiles.kind_of(field).is_some_and(|k| k.is_groupable()));
        let (chosen_role, dimension) = match usable {
            Some((role, field)) => (role, field.to_string()),
            None => (
                first_role,
                self.check_dimension(entry.chart_type, first_role, first_field, diagnostics)?,
            ),
        };
        for &(role, field) in &named {
            if role == chosen_role || field == dimension {
                continue;
            }
            let reason = match self.profiles.kind_of(field) {
                Some(kind) if kind.is_groupable() => format!("grouping by '{dimension}'"),
                kind => {
                    let issue = kind.and_then(FieldIssue::for_kind).unwrap_or(FieldIssue::Missing);
                    format!("{issue}; grouping by '{dimension}'")
                }
            };
            record(
                diagnostics,
                Diagnostic::FieldIgnored {
                    chart_type: entry.chart_type,
                    role,
                    field: field.to_string(),
                    reason,
                },
            );
        }
        Some(Some(dimension))
    }
    fn checked_metrics(
        &self,
        entry: &ChartPlanEntry,
        dimension: Option<&str>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Vec<String>> {
        let references = [
            (FieldRole::Aggregate, entry.aggregate_field.as_deref()),
            (FieldRole::YAxis, entry.y_axis_field.as_deref()),
        ];
        let exclude: Vec<&str> = dimension.into_iter().collect();
        let mut metrics: Vec<String> = Vec::new();
        for (role, field) in references {
            let Some(field) = field else { continue };
            let checked = self.check_metric(entry.chart_type, role, field, &exclude, diagnostics)?;
            if !metrics.contains(&checked) {
                metrics.push(checked);
            }
        }
        Some(metrics)
    }
    fn insufficient(
        &self,
        chart_type: ChartType,
        requirement: String,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        record(
            diagnostics,
            Diagnostic::InsufficientFieldsForChartType {
                chart_type,
                requirement,
            },
        );
    }
    fn validate_category(
        &self,
        index: usize,
        entry: &ChartPlanEntry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(Option<String>, Vec<String>, AggregateFunction)> {
        let chart_type = entry.chart_type;
        let Some(dimension) = self.checked_dimension(entry, diagnostics)? else {
            record(
                diagnostics,
                Diagnostic::MalformedPlanEntry {
                    index,
                    reason: format!("{chart_type} entry names no group_by or x_axis field"),
                },
            );
            return None;
        };
        let mut metrics = self.checked_metrics(entry, Some(dimension.as_str()), diagnostics)?;
        let function = entry.aggregate_function.unwrap_or(if metrics.is_empty() {
            AggregateFunction::Count
        } else {
            AggregateFunction::Sum
        });
        if metrics.is_empty() && function != AggregateFunction::Count {
            record(
                diagnostics,
                Diagnostic::MalformedPlanEntry {
                    index,
                    reason: format!("{chart_type} entry aggregates with {function:?} but names no field"),
                },
            );
            return None;
        }
        if !self.summary.supports_category_charts(chart_type) {
            let dimension_kind = if chart_type.accepts_date_dimension() {
                "categorical or date"
            } else {
                "categorical"
            };
            self.insufficient(
                chart_type,
                format!("at least one {dimension_kind} field and one numeric field"),
                diagnostics,
            );
            return None;
        }
        if metrics.len() > 1 {
            let extras = metrics.split_off(1);
            for extra in extras {
                record(
                    diagnostics,
                    Diagnostic::FieldIgnored {
                        chart_type,
                        role: FieldRole::YAxis,
                        field: extra,
                        reason: format!("{chart_type} charts plot a single metric; using '{}'", metrics[0]),
                    },
                );
            }
        }
        Some((Some(dimension), metrics, function))
    }
    fn validate_multi_metric(
        &self,
        entry: &ChartPlanEntry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(Option<String>, Vec<String>, AggregateFunction)> {
        let chart_type = entry.chart_type;
        let dimension = match self.checked_dimension(entry, diagnostics)? {
            Some(dimension) => dimension,
            None => match self.profiles.best_categorical(self.config, &[]) {
                Some(profile) => profile.name.clone(),
                None => {
                    self.insufficient(chart_type, "a categorical field".to_string(), diagnostics);
                    return None;
                }
            },
        };
        let available = self
            .profiles
            .numeric_fields()
            .into_iter()
            .filter(|name| *name != dimension)
            .count();
        if available < 2 {
            self.insufficient(
                chart_type,
                format!("at least 2 numeric fields, found {available}"),
                diagnostics,
            );
            return None;
        }
        let mut metrics = self.checked_metrics(entry, Some(dimension.as_str()), diagnostics)?;
        for name in self.profiles.numeric_fields() {
            if metrics.len() >= self.config.caps.multi_metric_fields {
                break;
            }
            if name != dimension && !metrics.iter().any(|m| m == name) {
                metrics.push(name.to_string());
            }
        }
        metrics.truncate(self.config.caps.multi_metric_fields);
        let function = entry.aggregate_function.unwrap_or(AggregateFunction::Sum);
        Some((Some(dimension), metrics, function))
    }
    fn validate_scatter(
        &self,
        entry: &ChartPlanEntry,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<(Option<String>, Vec<String>, AggregateFunction)> {
        let chart_type = entry.chart_type;
        let numeric = self.profiles.numeric_fields();
        let label_field = self
            .profiles
            .best_categorical(self.config, &[])
            .map(|p| p.name.clone());
        let function = entry.aggregate_function.unwrap_or(AggregateFunction::Sum);
        match numeric.len() {
            0 => {
                self.insufficient(
                    chart_type,
                    "at least one numeric field".to_string(),
                    diagnostics,
                );
                None
            }
            1 => {
                let Some(dimension) = label_field else {
                    self.insufficient(
                        chart_type,
                        "two numeric fields, or one numeric and one categorical field".to_string(),
                        diagnostics,
                    );
                    return None;
                };
                record(
                    diagnostics,
                    Diagnostic::DegradedProjection {
                        chart_type,
                        detail: format!(
                            "only one numeric field; plotting '{}' against '{}' categories",
                            numeric[0], dimension
                        ),
                    },
                );
                Some((Some(dimension), vec![numeric[0].to_string()], function))
            }
            _ => {
                let x = match entry.x_axis_field.as_deref() {
                    Some(field) => {
                        self.check_metric(chart_type, FieldRole::XAxis, field, &[], diagnostics)?
                    }
                    None => numeric[0].to_string(),
                };
                let y_reference = entry
                    .y_axis_field
                    .as_deref()
                    .map(|f| (FieldRole::YAxis, f))
                    .or(entry.aggregate_field.as_deref().map(|f| (FieldRole::Aggregate, f)));
                let mut y = match y_reference {
                    Some((role, field)) => {
                        self.check_metric(chart_type, role, field, &[x.as_str()], diagnostics)?
                    }
                    None => self.profiles.first_numeric(&[x.as_str()])?.name.clone(),
                };
                if y == x {
                    y = self.profiles.first_numeric(&[x.as_str()])?.name.clone();
                }
                Some((label_field, vec![x, y], function))
            }
        }
    }
    fn validate_table(
        &self,
        entry: &ChartPlanEntry,
    ) -> Option<(Option<String>, Vec<String>, AggregateFunction)> {
        let dimension = self
            .profiles
            .best_categorical(self.config, &[])
            .map(|p| p.name.clone());
        let metrics = self
            .profiles
            .numeric_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        Some((
            dimension,
            metrics,
            entry.aggregate_function.unwrap_or(AggregateFunction::Sum),
        ))
    }
}
