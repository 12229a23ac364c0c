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

use crate::diagnostics::Diagnostic;
use thiserror::Error;
#[derive(Error, Debug)]
pub enum TelesError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Chart plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("Query result error: {0}")]
    Query(#[from] QueryError),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] SerialisationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML configuration: {source}")]
    YamlParseError {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
    #[error("Configuration table '{field}' must not be empty")]
    EmptyTable { field: String },
}
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Chart plan must be an array, an object with a 'charts' array, or a single chart object; found {found}")]
    InvalidShape { found: String },
    #[error("Failed to parse chart plan JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query rows must be an array of objects; found {found}")]
    InvalidRows { found: String },
    #[error("Row {index} is not an object")]
    InvalidRow { index: usize },
}
#[derive(Error, Debug)]
pub enum SerialisationError {
    #[error("JSON serialisation failed: {source}")]
    JsonSerialisationError {
        #[from]
        source: serde_json::Error,
    },
    #[error("YAML serialisation failed: {source}")]
    YamlSerialisationError {
        #[from]
        source: serde_yaml::Error,
    },
}
pub type Result<T> = std::result::Result<T, TelesError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type PlanResult<T> = std::result::Result<T, PlanError>;
pub type QueryRowsResult<T> = std::result::Result<T, QueryError>;
pub type SerialisationResult<T> = std::result::Result<T, SerialisationError>;
impl TelesError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TelesError::Plan(_) | TelesError::Query(_))
    }
    pub fn category(&self) -> &'static str {
        match self {
            TelesError::Config(_) => "Configuration",
            TelesError::Plan(_) => "Plan",
            TelesError::Query(_) => "Query",
            TelesError::Serialisation(_) => "Serialisation",
            TelesError::Io(_) => "I/O",
        }
    }
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            TelesError::Plan(PlanError::InvalidShape { .. }) => vec![
                "Wrap chart entries in a JSON array".to_string(),
                "Each entry needs a 'type' and a 'data_source' object".to_string(),
            ],
            TelesError::Query(_) => vec![
                "Provide query rows as a JSON array of objects".to_string(),
            ],
            TelesError::Config(ConfigError::YamlParseError { .. }) => vec![
                "Check the YAML indentation and key names".to_string(),
                "Omitted keys fall back to their defaults".to_string(),
            ],
            _ => vec!["Check the error message for specific guidance".to_string()],
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            TelesError::Plan(_) => {
                "The chart plan could not be read. Charts will be chosen automatically.".to_string()
            }
            TelesError::Config(ConfigError::ConfigFileError { .. }) => {
                "Unable to load visualisation configuration. Please check the configuration file."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}
impl From<serde_json::Error> for TelesError {
    fn from(err: serde_json::Error) -> Self {
        TelesError::Serialisation(SerialisationError::JsonSerialisationError { source: err })
    }
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryStrategy {
    Substitute(String),
    Drop,
    Skip,
    Fallback(String),
    None,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}
impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
    pub fn color_code(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "\x1b[36m",
            ErrorSeverity::Warning => "\x1b[33m",
            ErrorSeverity::Error => "\x1b[31m",
            ErrorSeverity::Critical => "\x1b[35m",
        }
    }
}
pub fn error_severity(error: &TelesError) -> ErrorSeverity {
    match error {
        TelesError::Plan(_) | TelesError::Query(_) => ErrorSeverity::Warning,
        TelesError::Config(_) => ErrorSeverity::Critical,
        TelesError::Serialisation(_) | TelesError::Io(_) => ErrorSeverity::Error,
    }
}
pub struct ErrorReporter {
    pub show_suggestions: bool,
    pub show_recovery: bool,
    pub colored_output: bool,
}
impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            show_suggestions: true,
            show_recovery: true,
            colored_output: true,
        }
    }
    pub fn plain() -> Self {
        Self {
            colored_output: false,
            ..Self::new()
        }
    }
    fn severity_line(&self, severity: ErrorSeverity, message: &str) -> String {
        let mut output = String::new();
        if self.colored_output {
            output.push_str(severity.color_code());
        }
        output.push_str(&format!("[{}] {}\n", severity.as_str(), message));
        if self.colored_output {
            output.push_str("\x1b[0m");
        }
        output
    }
    pub fn report(&self, error: &TelesError) -> String {
        let mut output = self.severity_line(error_severity(error), &error.to_string());
        if self.show_suggestions {
            let suggestions = error.suggestions();
            if !suggestions.is_empty() {
                output.push_str("\nSuggestions:\n");
                for suggestion in suggestions {
                    output.push_str(&format!("  • {suggestion}\n"));
                }
            }
        }
        output
    }
    pub fn report_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = self.severity_line(diagnostic.severity(), &diagnostic.to_string());
        if self.show_recovery {
            match diagnostic.recovery() {
                RecoveryStrategy::Substitute(field) => {
                    output.push_str(&format!("  recovered: substituted '{field}'\n"));
                }
                RecoveryStrategy::Drop => output.push_str("  recovered: entry dropped\n"),
                RecoveryStrategy::Skip => output.push_str("  recovered: skipped\n"),
                RecoveryStrategy::Fallback(chart) => {
                    output.push_str(&format!("  recovered: fallback '{chart}' appended\n"));
                }
                RecoveryStrategy::None => {}
            }
        }
        output
    }
}
impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
