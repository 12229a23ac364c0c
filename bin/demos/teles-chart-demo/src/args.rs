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

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "teles-chart-demo",
    version,
    about = "Prepare chart datasets from query rows, a chart plan and free-text chart preferences"
)]
pub struct Args {
    #[arg(
        long = "rows",
        help = "Query rows as a JSON array, a JSON {rows, row_count, has_more} object, or a CSV file"
    )]
    pub rows: PathBuf,
    #[arg(
        long = "plan",
        help = "Chart plan JSON (array, {charts: [...]} or a single entry); omit to let the preferences drive"
    )]
    pub plan: Option<PathBuf>,
    #[arg(
        long = "preferences",
        short = 'p',
        default_value = "",
        help = "Free-text chart preferences, e.g. \"a pie and a radial bar\""
    )]
    pub preferences: String,
    #[arg(long = "config", help = "Visualisation configuration YAML")]
    pub config: Option<PathBuf>,
    #[arg(long = "output", short = 'o', help = "Write the prepared charts here instead of stdout")]
    pub output: Option<PathBuf>,
    #[arg(long = "pretty", default_value_t = false, help = "Pretty-print the JSON output")]
    pub pretty: bool,
    #[arg(
        long = "report",
        default_value_t = false,
        help = "Print every diagnostic with its recovery to stderr"
    )]
    pub report: bool,
    #[arg(long = "no-color", default_value_t = false, help = "Disable coloured reports")]
    pub no_color: bool,
    #[arg(
        long = "debug",
        default_value_t = false,
        help = "Enable debug-level logging (tracing::Level::DEBUG)."
    )]
    pub debug: bool,
}
