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

use proptest::prelude::*;
use serde_json::{json, Value};
use teles::{merge_duplicates, FieldKind, FieldProfile, FieldProfiler, ProjectedDatum, Row, VisualisationConfig};

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ,.-]{0,30}".prop_map(Value::from),
        "[a-z ]{1,12}".prop_map(|s| json!({ "value": s })),
    ]
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        prop::collection::btree_map("[a-z_]{1,10}", value_strategy(), 1..6),
        0..15,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|fields| fields.into_iter().collect::<Row>())
            .collect()
    })
}

fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

proptest! {
    #[test]
    fn profiling_is_a_pure_function_of_the_sample(rows in rows_strategy()) {
        let config = VisualisationConfig::default();
        let profiler = FieldProfiler::new(&config);
        let first: Vec<FieldProfile> = profiler.profile(&rows).iter().cloned().collect();
        let second: Vec<FieldProfile> = profiler.profile(&rows).iter().cloned().collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn identifier_keywords_always_win(
        prefix in "[a-z_]{0,6}",
        keyword in prop::sample::select(vec!["number", "id", "uuid", "code", "ref", "reference", "ID", "Number"]),
        suffix in "[a-z_]{0,6}",
        value in value_strategy(),
    ) {
        let config = VisualisationConfig::default();
        let name = format!("{prefix}{keyword}{suffix}");
        let (kind, _) = FieldProfiler::new(&config).classify(&name, Some(&value));
        prop_assert_eq!(kind, FieldKind::Identifier);
    }

    #[test]
    fn finite_number_strings_are_numeric(x in -1.0e12f64..1.0e12f64, pad in " {0,3}") {
        let config = VisualisationConfig::default();
        let raw = format!("{pad}{x}{pad}");
        let (kind, numeric_string) = FieldProfiler::new(&config).classify("amount", Some(&json!(raw)));
        prop_assert_eq!(kind, FieldKind::Numeric);
        prop_assert!(numeric_string);
    }

    #[test]
    fn thousands_grouped_strings_are_numeric(n in 0u64..1_000_000_000_000u64, cents in 0u32..100) {
        let config = VisualisationConfig::default();
        let raw = format!("{}.{:02}", with_thousands(n), cents);
        let (kind, _) = FieldProfiler::new(&config).classify("amount", Some(&json!(raw)));
        prop_assert_eq!(kind, FieldKind::Numeric);
        let parsed = teles::value::as_number(&json!(raw), &config.thousands_separators);
        prop_assert_eq!(parsed, Some(format!("{n}.{cents:02}").parse::<f64>().unwrap()));
    }

    #[test]
    fn merging_is_idempotent_and_loses_no_rows(
        groups in prop::collection::vec(
            (prop::sample::select(vec!["Acme", "acme", "ACME ", "Globex", "globex", "Initech"]), 0u32..1000, 1usize..4),
            0..20,
        )
    ) {
        let data: Vec<ProjectedDatum> = groups
            .iter()
            .map(|(name, value, detail_count)| {
                let mut datum = ProjectedDatum::new(*name);
                datum.metrics.insert("total".to_string(), f64::from(*value));
                datum.details = (0..*detail_count).map(|_| Row::new()).collect();
                datum
            })
            .collect();
        let total_details: usize = data.iter().map(|d| d.details.len()).sum();
        let once = merge_duplicates(data);
        let twice = merge_duplicates(once.clone());
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.iter().map(|d| d.details.len()).sum::<usize>(), total_details);
        for datum in &once {
            let key = datum.name.trim().to_lowercase();
            let expected = groups
                .iter()
                .filter(|(name, _, _)| name.trim().to_lowercase() == key)
                .map(|(_, value, _)| f64::from(*value))
                .fold(f64::MIN, f64::max);
            prop_assert_eq!(datum.metric("total"), Some(expected));
        }
    }
}
