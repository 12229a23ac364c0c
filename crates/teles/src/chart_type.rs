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

use crate::config::VisualisationConfig;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("valid word pattern"));
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Pie,
    Bar,
    Line,
    Area,
    Scatter,
    Radar,
    RadialBar,
    Composed,
    Funnel,
    Treemap,
    Table,
}
impl ChartType {
    pub const ALL: [ChartType; 11] = [
        ChartType::Pie,
        ChartType::Bar,
        ChartType::Line,
        ChartType::Area,
        ChartType::Scatter,
        ChartType::Radar,
        ChartType::RadialBar,
        ChartType::Composed,
        ChartType::Funnel,
        ChartType::Treemap,
        ChartType::Table,
    ];
    pub fn token(&self) -> &'static str {
        match self {
            ChartType::Pie => "pie",
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
            ChartType::RadialBar => "radialbar",
            ChartType::Composed => "composed",
            ChartType::Funnel => "funnel",
            ChartType::Treemap => "treemap",
            ChartType::Table => "table",
        }
    }
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.token() == token)
    }
    pub fn is_multi_metric(&self) -> bool {
        matches!(self, ChartType::Radar | ChartType::Composed)
    }
    pub fn accepts_date_dimension(&self) -> bool {
        matches!(self, ChartType::Line | ChartType::Area)
    }
}
impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestedTypeSet {
    types: IndexSet<ChartType>,
}
impl RequestedTypeSet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, chart_type: ChartType) -> bool {
        self.types.insert(chart_type)
    }
    pub fn contains(&self, chart_type: ChartType) -> bool {
        self.types.contains(&chart_type)
    }
    pub fn is_auto(&self) -> bool {
        self.types.is_empty()
    }
    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = ChartType> + '_ {
        self.types.iter().copied()
    }
    pub fn tokens(&self) -> Vec<&'static str> {
        self.iter().map(|c| c.token()).collect()
    }
}
impl FromIterator<ChartType> for RequestedTypeSet {
    fn from_iter<I: IntoIterator<Item = ChartType>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}
pub struct ChartTypeResolver<'a> {
    config: &'a VisualisationConfig,
}
impl<'a> ChartTypeResolver<'a> {
    pub fn new(config: &'a VisualisationConfig) -> Self {
        Self { config }
    }
    pub fn resolve(&self, text: &str) -> RequestedTypeSet {
        let lower = text.to_lowercase();
        let words: Vec<&str> = WORD_RE.find_iter(&lower).map(|m| m.as_str()).collect();
        let mut requested = RequestedTypeSet::new();
        let mut i = 0;
        while i < words.len() {
            if let Some(next) = words.get(i + 1) {
                let joined = format!("{}{}", words[i], next);
                if let Some(chart_type) = ChartType::from_token(&joined) {
                    requested.insert(chart_type);
                    i += 2;
                    continue;
                }
            }
            if let Some(chart_type) = self.lookup(words[i]) {
                requested.insert(chart_type);
            }
            i += 1;
        }
        debug!(
            "Resolved chart preferences {:?} to {:?}",
            text,
            requested.tokens()
        );
        requested
    }
    fn lookup(&self, word: &str) -> Option<ChartType> {
        self.lookup_exact(word).or_else(|| {
            word.strip_suffix('s')
                .filter(|stem| stem.len() >= 3)
                .and_then(|stem| self.lookup_exact(stem))
        })
    }
    fn lookup_exact(&self, word: &str) -> Option<ChartType> {
        ChartType::from_token(word).or_else(|| {
            self.config
                .chart_aliases
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(word))
                .map(|(_, chart_type)| *chart_type)
        })
    }
}
