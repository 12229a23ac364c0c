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

mod args;
mod loader;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use std::fs;
use teles::{ChartPreparationSystem, ErrorReporter};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let reporter = if args.no_color {
        ErrorReporter::plain()
    } else {
        ErrorReporter::new()
    };

    let system = match args.config.as_deref() {
        Some(path) => ChartPreparationSystem::from_config_file(path)
            .inspect_err(|e| eprint!("{}", reporter.report(e)))?,
        None => ChartPreparationSystem::new(),
    };
    let query = loader::load_rows(&args.rows)?;
    let plan = loader::load_plan(args.plan.as_deref())?;
    info!(
        "Preparing charts for {} rows with preferences {:?}",
        query.rows.len(),
        args.preferences
    );

    let prepared = system
        .prepare_value(&query, &plan, &args.preferences)
        .inspect_err(|e| eprint!("{}", reporter.report(e)))?;
    if args.report {
        for diagnostic in prepared.all_diagnostics() {
            eprint!("{}", reporter.report_diagnostic(diagnostic));
        }
    }
    info!(
        "Request {}: {} charts ({})",
        prepared.request_id,
        prepared.charts.len(),
        prepared
            .charts
            .iter()
            .map(|c| c.chart_type.token())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let json = if args.pretty {
        prepared.to_json_pretty()?
    } else {
        prepared.to_json()?
    };
    match args.output.as_deref() {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
