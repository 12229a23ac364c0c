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

use crate::chart_type::{ChartType, RequestedTypeSet};
use crate::config::VisualisationConfig;
use crate::data_profiler::{DatasetSummary, FieldProfiles};
use crate::diagnostics::Diagnostic;
use crate::plan::{AggregateFunction, ChartPlanEntry};
use crate::plan_validator::{record, PlanValidator, ResolvedChart, Validation};
use tracing::{debug, info};
#[derive(Debug, Clone, Default)]
pub struct Fallbacks {
    pub charts: Vec<ResolvedChart>,
    pub diagnostics: Vec<Diagnostic>,
}
impl Fallbacks {
    pub fn chart_types(&self) -> Vec<ChartType> {
        self.charts.iter().map(|c| c.chart_type).collect()
    }
}
pub struct CompletenessGuarantor<'a> {
    config: &'a VisualisationConfig,
    profiles: &'a FieldProfiles,
    summary: DatasetSummary,
}
impl<'a> CompletenessGuarantor<'a> {
    pub fn new(config: &'a VisualisationConfig, profiles: &'a FieldProfiles) -> Self {
        Self {
            config,
            profiles,
            summary: profiles.summary(),
        }
    }
    pub fn missing_types(&self, requested: &RequestedTypeSet, present: &[ChartType]) -> Vec<ChartType> {
        let targets: Vec<ChartType> = if requested.is_auto() {
            self.config
                .auto_chart_types
                .iter()
                .copied()
                .filter(|ct| {
                    let supported = self.summary.supports(*ct);
                    if !supported {
                        debug!("Auto mode: dataset cannot support {}, not synthesising it", ct);
                    }
                    supported
                })
                .collect()
        } else {
            requested.iter().collect()
        };
        targets
            .into_iter()
            .filter(|ct| !present.contains(ct))
            .collect()
    }
    pub fn complete(&self, requested: &RequestedTypeSet, present: &[ChartType]) -> Fallbacks {
        let mut fallbacks = Fallbacks::default();
        for chart_type in self.missing_types(requested, present) {
            match self.synthesise(chart_type) {
                Some(mut chart) => {
                    let note = Diagnostic::FallbackSynthesised {
                        chart_type,
                        dimension: chart.dimension.clone(),
                        metrics: chart.metrics.clone(),
                    };
                    info!("{}", note);
                    chart.diagnostics.insert(0, note);
                    fallbacks.charts.push(chart);
                }
                None => record(
                    &mut fallbacks.diagnostics,
                    Diagnostic::FallbackUnavailable { chart_type },
                ),
            }
        }
        fallbacks
    }
    pub fn fallback_entry(&self, chart_type: ChartType) -> Option<ChartPlanEntry> {
        let entry = ChartPlanEntry::new(chart_type);
        match chart_type {
            ChartType::Scatter | ChartType::Table => Some(entry),
            ChartType::Radar | ChartType::Composed => {
                let dimension = self.profiles.best_categorical(self.config, &[])?;
                let metric = self.profiles.first_numeric(&[dimension.name.as_str()])?;
                Some(
                    entry
                        .with_group_by(&dimension.name)
                        .with_aggregate(&metric.name, AggregateFunction::Sum),
                )
            }
            _ => {
                let dimension = self
                    .profiles
                    .best_dimension(self.config, chart_type, &[])?;
                let metric = self.profiles.first_numeric(&[dimension.name.as_str()])?;
                Some(
                    entry
                        .with_group_by(&dimension.name)
                        .with_aggregate(&metric.name, AggregateFunction::Sum),
                )
            }
        }
    }
    fn synthesise(&self, chart_type: ChartType) -> Option<ResolvedChart> {
        let entry = self.fallback_entry(chart_type)?;
        let validator = PlanValidator::new(self.config, self.profiles);
        match validator.validate(usize::MAX, &entry) {
            Validation::Accepted(mut chart) => {
                if chart_type.is_multi_metric() {
                    chart.metrics.truncate(2);
                }
                Some(chart)
            }
            Validation::Dropped { .. } => None,
        }
    }
}
