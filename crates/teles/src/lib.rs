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

pub mod aggregator;
pub mod chart_type;
pub mod completeness;
pub mod config;
pub mod data_profiler;
pub mod diagnostics;
pub mod error;
pub mod plan;
pub mod plan_validator;
pub mod query;
pub mod value;

pub use aggregator::{merge_duplicates, Aggregator, ProjectedDatum};
pub use chart_type::{ChartType, ChartTypeResolver, RequestedTypeSet};
pub use completeness::{CompletenessGuarantor, Fallbacks};
pub use config::{MultiValueRule, ProjectionCaps, VisualisationConfig};
pub use data_profiler::{DatasetSummary, FieldKind, FieldProfile, FieldProfiler, FieldProfiles};
pub use diagnostics::{Diagnostic, FieldIssue, FieldRole};
pub use error::{
    ConfigError, ErrorReporter, ErrorSeverity, PlanError, QueryError, RecoveryStrategy, Result,
    SerialisationError, TelesError,
};
pub use plan::{parse_plan, parse_plan_str, AggregateFunction, ChartPlanEntry, ParsedPlan};
pub use plan_validator::{PlanValidator, ResolvedChart, Validation};
pub use query::QueryResult;
pub use value::Row;

use error::SerialisationResult;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, info_span};
use uuid::Uuid;
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedChart {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub data: Vec<ProjectedDatum>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    pub metrics: Vec<String>,
    pub synthesised: bool,
}
#[derive(Debug, Clone, Serialize)]
pub struct PreparedCharts {
    pub request_id: Uuid,
    pub requested_types: RequestedTypeSet,
    pub auto_mode: bool,
    pub summary: DatasetSummary,
    pub diagnostics: Vec<Diagnostic>,
    pub charts: Vec<PreparedChart>,
}
impl PreparedCharts {
    pub fn chart_types(&self) -> Vec<ChartType> {
        self.charts.iter().map(|c| c.chart_type).collect()
    }
    pub fn charts_of(&self, chart_type: ChartType) -> impl Iterator<Item = &PreparedChart> {
        self.charts.iter().filter(move |c| c.chart_type == chart_type)
    }
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .chain(self.charts.iter().flat_map(|c| c.diagnostics.iter()))
    }
    pub fn to_json(&self) -> SerialisationResult<String> {
        Ok(serde_json::to_string(self)?)
    }
    pub fn to_json_pretty(&self) -> SerialisationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
enum EntryOutcome {
    Prepared(PreparedChart),
    Dropped(Vec<Diagnostic>),
}
pub fn chart_title(chart: &ResolvedChart) -> String {
    let metrics = chart.metrics.iter().map(|m| value::humanise(m));
    let dimension = chart.dimension.as_deref().map(value::humanise);
    match chart.chart_type {
        ChartType::Table => "Query Results".to_string(),
        ChartType::Scatter if chart.metrics.len() >= 2 => {
            format!(
                "{} vs {}",
                value::humanise(&chart.metrics[1]),
                value::humanise(&chart.metrics[0])
            )
        }
        ChartType::Radar | ChartType::Composed => match dimension {
            Some(dimension) => format!("{} by {}", metrics.format(", "), dimension),
            None => metrics.format(", ").to_string(),
        },
        _ => {
            let prefix = chart.function.title_prefix();
            let measure = match chart.metrics.first() {
                Some(metric) => {
                    let metric = value::humanise(metric);
                    let leading = prefix.split_whitespace().next().unwrap_or(prefix);
                    if metric.split_whitespace().next() == Some(leading) {
                        metric
                    } else {
                        format!("{prefix} {metric}")
                    }
                }
                None => "Count".to_string(),
            };
            match dimension {
                Some(dimension) => format!("{measure} by {dimension}"),
                None => measure,
            }
        }
    }
}
pub struct ChartPreparationSystem {
    config: VisualisationConfig,
}
impl ChartPreparationSystem {
    pub fn new() -> Self {
        Self {
            config: VisualisationConfig::default(),
        }
    }
    pub fn with_config(config: VisualisationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = VisualisationConfig::from_yaml_file(path)?;
        Ok(Self { config })
    }
    pub fn config(&self) -> &VisualisationConfig {
        &self.config
    }
    pub fn resolve_preferences(&self, text: &str) -> RequestedTypeSet {
        ChartTypeResolver::new(&self.config).resolve(text)
    }
    pub fn profile(&self, rows: &[Row]) -> FieldProfiles {
        FieldProfiler::new(&self.config).profile(rows)
    }
    pub fn parse_plan(&self, raw: &Value) -> Result<ParsedPlan> {
        Ok(plan::parse_plan(raw, &self.config)?)
    }
    pub fn prepare_value(
        &self,
        query: &QueryResult,
        plan: &Value,
        preferences: &str,
    ) -> Result<PreparedCharts> {
        let plan = self.parse_plan(plan)?;
        Ok(self.prepare(query, &plan, preferences))
    }
    pub fn prepare(&self, query: &QueryResult, plan: &ParsedPlan, preferences: &str) -> PreparedCharts {
        let request_id = Uuid::new_v4();
        let span = info_span!("prepare_charts", request_id = %request_id);
        let _guard = span.enter();
        let requested_types = self.resolve_preferences(preferences);
        let auto_mode = requested_types.is_auto();
        if query.has_more {
            info!(
                "Query result is truncated upstream ({} of {} rows); preparing from the rows present",
                query.rows.len(),
                query.row_count
            );
        }
        if query.is_empty() {
            let mut diagnostics = Vec::new();
            plan_validator::record(&mut diagnostics, Diagnostic::EmptyDataset);
            return PreparedCharts {
                request_id,
                requested_types,
                auto_mode,
                summary: DatasetSummary::default(),
                diagnostics,
                charts: Vec::new(),
            };
        }
        let rows = &query.rows;
        let profiles = self.profile(rows);
        let summary = profiles.summary();
        info!("{}", summary);
        let validator = PlanValidator::new(&self.config, &profiles);
        let aggregator = Aggregator::new(&self.config);
        let outcomes: Vec<EntryOutcome> = plan
            .par_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Ok(entry) => match validator.validate(index, entry) {
                    Validation::Accepted(chart) => {
                        EntryOutcome::Prepared(self.render(&aggregator, chart, rows, false))
                    }
                    Validation::Dropped { diagnostics, .. } => EntryOutcome::Dropped(diagnostics),
                },
                Err(diagnostic) => EntryOutcome::Dropped(vec![diagnostic.clone()]),
            })
            .collect();
        let mut charts = Vec::with_capacity(outcomes.len());
        let mut diagnostics = Vec::new();
        for outcome in outcomes {
            match outcome {
                EntryOutcome::Prepared(chart) => charts.push(chart),
                EntryOutcome::Dropped(dropped) => diagnostics.extend(dropped),
            }
        }
        let present: Vec<ChartType> = charts.iter().map(|c| c.chart_type).collect();
        let fallbacks =
            CompletenessGuarantor::new(&self.config, &profiles).complete(&requested_types, &present);
        diagnostics.extend(fallbacks.diagnostics);
        charts.extend(
            fallbacks
                .charts
                .into_iter()
                .map(|chart| self.render(&aggregator, chart, rows, true)),
        );
        info!(
            "Prepared {} charts [{}] for {} requested types (auto: {}), {} entries dropped",
            charts.len(),
            charts.iter().map(|c| c.chart_type).join(", "),
            requested_types.len(),
            auto_mode,
            diagnostics.iter().filter(|d| d.drops_entry()).count()
        );
        PreparedCharts {
            request_id,
            requested_types,
            auto_mode,
            summary,
            diagnostics,
            charts,
        }
    }
    fn render(
        &self,
        aggregator: &Aggregator,
        mut chart: ResolvedChart,
        rows: &[Row],
        synthesised: bool,
    ) -> PreparedChart {
        let data = aggregator.project(&chart, rows);
        let title = chart.title.clone().or_else(|| Some(chart_title(&chart)));
        let metrics = aggregator::output_metrics(&chart);
        for (field, key) in chart.metrics.iter().zip(&metrics) {
            if field != key {
                plan_validator::record(
                    &mut chart.diagnostics,
                    Diagnostic::DegradedProjection {
                        chart_type: chart.chart_type,
                        detail: format!(
                            "metric field '{field}' clashes with a reserved data key; reported as '{key}'"
                        ),
                    },
                );
            }
        }
        PreparedChart {
            chart_type: chart.chart_type,
            title,
            data,
            diagnostics: chart.diagnostics,
            dimension: chart.dimension,
            metrics,
            synthesised,
        }
    }
}
impl Default for ChartPreparationSystem {
    fn default() -> Self {
        Self::new()
    }
}
