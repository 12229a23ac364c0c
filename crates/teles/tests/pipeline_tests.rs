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

mod common;

use common::{acme_rows, invoice_rows, query};
use serde_json::json;
use teles::{
    parse_plan, parse_plan_str, ChartPreparationSystem, ChartType, Diagnostic, PlanError, QueryResult,
    TelesError, VisualisationConfig,
};

fn acme_plan() -> serde_json::Value {
    json!({
        "type": "bar",
        "data_source": {
            "group_by": "vendor_name",
            "aggregate": {"field": "total", "function": "sum"}
        }
    })
}

#[test]
fn prepares_the_vendor_bar_chart() {
    let system = ChartPreparationSystem::new();
    let prepared = system
        .prepare_value(&query(acme_rows()), &acme_plan(), "bar")
        .expect("prepared");
    assert_eq!(prepared.chart_types(), vec![ChartType::Bar]);
    let bar = &prepared.charts[0];
    assert!(!bar.synthesised);
    assert_eq!(bar.title.as_deref(), Some("Total by Vendor Name"));
    let data = serde_json::to_value(&bar.data).expect("serialise");
    assert_eq!(data[0]["name"], json!("Acme"));
    assert_eq!(data[0]["total"], json!(113.5));
    assert_eq!(data[0]["details"].as_array().map(Vec::len), Some(2));
    assert_eq!(data[1]["name"], json!("Tech Inc"));
    assert_eq!(data[1]["total"], json!(10.0));
}

#[test]
fn auto_mode_appends_missing_defaults_after_plan_entries() {
    let system = ChartPreparationSystem::new();
    let prepared = system
        .prepare_value(&query(acme_rows()), &acme_plan(), "")
        .expect("prepared");
    assert!(prepared.auto_mode);
    assert_eq!(prepared.chart_types(), vec![ChartType::Bar, ChartType::Pie]);
    assert!(prepared.charts[1].synthesised);
}

#[test]
fn requested_line_is_always_present() {
    let system = ChartPreparationSystem::new();
    let plan = json!([
        {"type": "bar", "data_source": {"group_by": "invoice_number", "aggregate": {"field": "total_amount", "function": "sum"}}},
        {"type": "line", "data_source": {"x_axis": "issued_on", "y_axis": "total_amount"}},
        {"type": "line", "data_source": {"x_axis": "vendor_name", "y_axis": "quantity"}}
    ]);
    let prepared = system
        .prepare_value(&query(invoice_rows()), &plan, "line and bar charts")
        .expect("prepared");
    assert_eq!(prepared.charts_of(ChartType::Line).count(), 2);
    let without_line = json!([plan[0].clone()]);
    let prepared = system
        .prepare_value(&query(invoice_rows()), &without_line, "line and bar charts")
        .expect("prepared");
    assert_eq!(prepared.chart_types(), vec![ChartType::Bar, ChartType::Line]);
    assert_eq!(prepared.charts_of(ChartType::Line).count(), 1);
}

#[test]
fn corrected_entry_carries_its_substitution_note() {
    let system = ChartPreparationSystem::new();
    let plan = json!([{
        "type": "bar",
        "data_source": {"group_by": "invoice_number", "aggregate": {"field": "total_amount", "function": "sum"}}
    }]);
    let prepared = system
        .prepare_value(&query(invoice_rows()), &plan, "bar")
        .expect("prepared");
    let bar = &prepared.charts[0];
    assert_eq!(bar.dimension.as_deref(), Some("vendor_name"));
    assert_eq!(bar.title.as_deref(), Some("Total Amount by Vendor Name"));
    let json = serde_json::to_value(bar).expect("serialise");
    let note = json["diagnostics"][0].as_str().expect("string diagnostic");
    assert!(note.contains("invoice_number") && note.contains("vendor_name"));
    assert_eq!(json["type"], json!("bar"));
}

#[test]
fn empty_dataset_yields_no_charts() {
    let system = ChartPreparationSystem::new();
    let prepared = system
        .prepare_value(&QueryResult::default(), &acme_plan(), "pie and bar")
        .expect("prepared");
    assert!(prepared.charts.is_empty());
    assert_eq!(prepared.diagnostics, vec![Diagnostic::EmptyDataset]);
    assert_eq!(prepared.requested_types.tokens(), vec!["pie", "bar"]);
}

#[test]
fn malformed_entries_are_dropped_individually() {
    let system = ChartPreparationSystem::new();
    let plan = json!({"charts": [
        {"type": "hologram", "data_source": {"group_by": "vendor_name"}},
        {"data_source": {"group_by": "vendor_name"}},
        {"type": "pie", "data_source": {"group_by": "vendor_name", "aggregate": {"field": "total_amount", "function": "median"}}},
        "not an object",
        {"type": "Pie Chart", "data_source": {"group_by": "vendor_name", "aggregate": "quantity"}}
    ]});
    let prepared = system
        .prepare_value(&query(invoice_rows()), &plan, "pie")
        .expect("prepared");
    assert_eq!(prepared.chart_types(), vec![ChartType::Pie]);
    let malformed: Vec<usize> = prepared
        .diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::MalformedPlanEntry { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(malformed, vec![0, 1, 2, 3]);
    assert_eq!(prepared.charts[0].metrics, vec!["quantity"]);
}

#[test]
fn radar_without_two_metrics_never_reaches_output() {
    let system = ChartPreparationSystem::new();
    let plan = json!([
        {"type": "radar", "data_source": {"group_by": "vendor_name", "aggregate": "total"}},
        {"type": "bar", "data_source": {"group_by": "vendor_name", "aggregate": "total"}}
    ]);
    let prepared = system
        .prepare_value(&query(acme_rows()), &plan, "radar and bar")
        .expect("prepared");
    assert_eq!(prepared.chart_types(), vec![ChartType::Bar]);
    assert!(prepared.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::InsufficientFieldsForChartType { chart_type: ChartType::Radar, .. }
    )));
    assert!(prepared
        .diagnostics
        .contains(&Diagnostic::FallbackUnavailable { chart_type: ChartType::Radar }));
}

#[test]
fn radar_output_carries_at_least_two_metric_keys() {
    let system = ChartPreparationSystem::new();
    let prepared = system
        .prepare_value(&query(invoice_rows()), &json!([]), "radar")
        .expect("prepared");
    let radar = prepared.charts_of(ChartType::Radar).next().expect("radar");
    assert!(radar.data.iter().all(|d| d.metrics.len() >= 2));
    assert_eq!(radar.title.as_deref(), Some("Total Amount, Quantity by Vendor Name"));
}

#[test]
fn plan_order_survives_parallel_processing() {
    let system = ChartPreparationSystem::new();
    let cycle = [ChartType::Pie, ChartType::Bar, ChartType::Funnel, ChartType::Treemap];
    let entries: Vec<_> = (0..40)
        .map(|i| {
            json!({
                "type": cycle[i % cycle.len()].token(),
                "title": format!("chart {i}"),
                "data_source": {"group_by": "status", "aggregate": {"field": "quantity", "function": "avg"}}
            })
        })
        .collect();
    let prepared = system
        .prepare_value(&query(invoice_rows()), &json!(entries), "pie")
        .expect("prepared");
    let titles: Vec<String> = prepared
        .charts
        .iter()
        .filter_map(|c| c.title.clone())
        .collect();
    let expected: Vec<String> = (0..40).map(|i| format!("chart {i}")).collect();
    assert_eq!(titles, expected);
}

#[test]
fn output_envelope_serialises_for_rendering() {
    let system = ChartPreparationSystem::new();
    let prepared = system
        .prepare_value(&query(invoice_rows()).with_more(true), &json!(null), "radial bar")
        .expect("prepared");
    let json: serde_json::Value =
        serde_json::from_str(&prepared.to_json().expect("json")).expect("parse");
    assert_eq!(json["requested_types"], json!(["radialbar"]));
    assert_eq!(json["auto_mode"], json!(false));
    assert_eq!(json["summary"]["row_count"], json!(4));
    assert_eq!(json["charts"][0]["type"], json!("radialbar"));
    assert_eq!(json["charts"][0]["synthesised"], json!(true));
    assert!(json["charts"][0]["diagnostics"][0].is_string());
    assert!(json["request_id"].is_string());
}

#[test]
fn invalid_plan_shape_is_an_error() {
    let system = ChartPreparationSystem::new();
    let err = system
        .prepare_value(&query(acme_rows()), &json!(42), "")
        .expect_err("plan shape rejected");
    assert!(matches!(err, TelesError::Plan(PlanError::InvalidShape { .. })));
    assert!(err.is_recoverable());
    assert_eq!(err.category(), "Plan");
}

#[test]
fn parsed_plans_can_be_reused_across_requests() {
    let config = VisualisationConfig::default();
    let plan = parse_plan(&acme_plan(), &config).expect("plan");
    let system = ChartPreparationSystem::with_config(config).expect("system");
    let first = system.prepare(&query(acme_rows()), &plan, "bar");
    let second = system.prepare(&query(acme_rows()), &plan, "bar");
    assert_ne!(first.request_id, second.request_id);
    assert_eq!(first.charts, second.charts);
}

#[test]
fn query_envelope_accepts_rows_object() {
    let result = QueryResult::from_value(json!({
        "rows": [{"a": 1}, {"a": 2}],
        "row_count": 50,
        "has_more": true
    }))
    .expect("query");
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.row_count, 50);
    assert!(result.has_more);
    assert!(QueryResult::from_value(json!([1, 2])).is_err());
    assert!(QueryResult::from_value(json!("rows")).is_err());
}

#[test]
fn plan_text_parses_with_function_aliases() {
    let config = VisualisationConfig::default();
    let plan = parse_plan_str(
        r#"[{"chart_type": "Radial Bar", "data_source": {"group_by": "vendor_name", "aggregate": {"field": "total", "function": "Average"}}}]"#,
        &config,
    )
    .expect("plan");
    let entry = plan[0].as_ref().expect("entry");
    assert_eq!(entry.chart_type, ChartType::RadialBar);
    assert_eq!(entry.aggregate_function, Some(teles::AggregateFunction::Avg));
    assert!(matches!(
        parse_plan_str("{not json", &config),
        Err(PlanError::Json { .. })
    ));
}

#[test]
fn metric_field_named_name_is_reported_under_its_own_key() {
    let data = QueryResult::from_value(json!([
        {"vendor_name": "Acme", "name": 3},
        {"vendor_name": "Globex", "name": 5}
    ]))
    .expect("rows");
    let plan = json!({
        "type": "bar",
        "data_source": {"group_by": "vendor_name", "aggregate": {"field": "name", "function": "sum"}}
    });
    let prepared = ChartPreparationSystem::new()
        .prepare_value(&data, &plan, "bar")
        .expect("prepared");
    let bar = &prepared.charts[0];
    assert_eq!(bar.metrics, vec!["name_value"]);
    assert!(matches!(bar.diagnostics[0], Diagnostic::DegradedProjection { .. }));
    assert!(bar.diagnostics[0].to_string().contains("name_value"));
    let data = serde_json::to_value(&bar.data).expect("serialise");
    assert_eq!(data[0]["name"], json!("Acme"));
    assert_eq!(data[0]["name_value"], json!(3.0));
}
