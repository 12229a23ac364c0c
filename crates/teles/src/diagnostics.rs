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
use crate::data_profiler::FieldKind;
use crate::error::{ErrorSeverity, RecoveryStrategy};
use serde::{Serialize, Serializer};
use std::fmt;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    GroupBy,
    XAxis,
    YAxis,
    Aggregate,
}
impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldRole::GroupBy => "group_by",
            FieldRole::XAxis => "x_axis",
            FieldRole::YAxis => "y_axis",
            FieldRole::Aggregate => "aggregate",
        })
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    Identifier,
    MultiValue,
    Missing,
    NotNumeric(FieldKind),
}
impl FieldIssue {
    pub fn for_kind(kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Identifier => Some(FieldIssue::Identifier),
            FieldKind::MultiValue => Some(FieldIssue::MultiValue),
            _ => None,
        }
    }
}
impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::Identifier => f.write_str("is an identifier field"),
            FieldIssue::MultiValue => f.write_str("is a multi-value field"),
            FieldIssue::Missing => f.write_str("does not exist in the dataset"),
            FieldIssue::NotNumeric(kind) => write!(f, "is {}, not numeric", kind.as_str()),
        }
    }
}
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    FieldSubstituted {
        chart_type: ChartType,
        role: FieldRole,
        field: String,
        issue: FieldIssue,
        replacement: String,
    },
    UnsuitableFieldReference {
        chart_type: ChartType,
        role: FieldRole,
        field: String,
        issue: FieldIssue,
    },
    FieldIgnored {
        chart_type: ChartType,
        role: FieldRole,
        field: String,
        reason: String,
    },
    InsufficientFieldsForChartType {
        chart_type: ChartType,
        requirement: String,
    },
    MalformedPlanEntry {
        index: usize,
        reason: String,
    },
    EmptyDataset,
    FallbackSynthesised {
        chart_type: ChartType,
        dimension: Option<String>,
        metrics: Vec<String>,
    },
    FallbackUnavailable {
        chart_type: ChartType,
    },
    DegradedProjection {
        chart_type: ChartType,
        detail: String,
    },
}
impl Diagnostic {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Diagnostic::FallbackSynthesised { .. }
            | Diagnostic::EmptyDataset
            | Diagnostic::DegradedProjection { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Warning,
        }
    }
    pub fn recovery(&self) -> RecoveryStrategy {
        match self {
            Diagnostic::FieldSubstituted { replacement, .. } => {
                RecoveryStrategy::Substitute(replacement.clone())
            }
            Diagnostic::UnsuitableFieldReference { .. }
            | Diagnostic::InsufficientFieldsForChartType { .. }
            | Diagnostic::MalformedPlanEntry { .. } => RecoveryStrategy::Drop,
            Diagnostic::EmptyDataset => RecoveryStrategy::Skip,
            Diagnostic::FallbackSynthesised { chart_type, .. } => {
                RecoveryStrategy::Fallback(chart_type.token().to_string())
            }
            Diagnostic::FallbackUnavailable { .. }
            | Diagnostic::DegradedProjection { .. }
            | Diagnostic::FieldIgnored { .. } => {
                RecoveryStrategy::None
            }
        }
    }
    pub fn drops_entry(&self) -> bool {
        matches!(self.recovery(), RecoveryStrategy::Drop)
    }
}
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FieldSubstituted {
                chart_type,
                role,
                field,
                issue,
                replacement,
            } => write!(
                f,
                "{chart_type}: {role} field '{field}' {issue}; using '{replacement}' instead"
            ),
            Diagnostic::UnsuitableFieldReference {
                chart_type,
                role,
                field,
                issue,
            } => write!(
                f,
                "{chart_type}: {role} field '{field}' {issue} and no suitable replacement exists; entry dropped"
            ),
            Diagnostic::FieldIgnored {
                chart_type,
                role,
                field,
                reason,
            } => write!(f, "{chart_type}: {role} field '{field}' ignored ({reason})"),
            Diagnostic::InsufficientFieldsForChartType {
                chart_type,
                requirement,
            } => write!(f, "{chart_type}: requires {requirement}; entry dropped"),
            Diagnostic::MalformedPlanEntry { index, reason } => {
                write!(f, "chart plan entry #{index} is malformed ({reason}); entry dropped")
            }
            Diagnostic::EmptyDataset => f.write_str("query returned no rows; no charts produced"),
            Diagnostic::FallbackSynthesised {
                chart_type,
                dimension,
                metrics,
            } => {
                write!(f, "{chart_type}: requested chart type missing from the plan; synthesised")?;
                if let Some(dimension) = dimension {
                    write!(f, " by '{dimension}'")?;
                }
                if !metrics.is_empty() {
                    write!(f, " over '{}'", metrics.join("', '"))?;
                }
                Ok(())
            }
            Diagnostic::FallbackUnavailable { chart_type } => write!(
                f,
                "{chart_type}: requested chart type cannot be built from the available fields"
            ),
            Diagnostic::DegradedProjection { chart_type, detail } => {
                write!(f, "{chart_type}: {detail}")
            }
        }
    }
}
impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
