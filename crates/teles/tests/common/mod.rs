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

#![allow(dead_code)]

use serde_json::{json, Value};
use teles::{QueryResult, Row};

pub fn rows(value: Value) -> Vec<Row> {
    QueryResult::from_value(value).expect("fixture rows").rows
}

pub fn acme_rows() -> Vec<Row> {
    rows(json!([
        {"vendor_name": "Acme", "total": "93.50"},
        {"vendor_name": "Acme", "total": "20.00"},
        {"vendor_name": "Tech Inc", "total": "10.00"}
    ]))
}

pub fn invoice_rows() -> Vec<Row> {
    rows(json!([
        {
            "invoice_number": "INV-001",
            "vendor_name": "Acme",
            "total_amount": "1,250.00",
            "quantity": 5,
            "status": "paid",
            "issued_on": "2024-01-05",
            "line_items": "SKU-100, SKU-200, SKU-300"
        },
        {
            "invoice_number": "INV-002",
            "vendor_name": {"value": "Tech Inc"},
            "total_amount": "980.50",
            "quantity": 3,
            "status": "open",
            "issued_on": "2024-01-12",
            "line_items": "SKU-100, SKU-400, SKU-500"
        },
        {
            "invoice_number": "INV-003",
            "vendor_name": "Acme",
            "total_amount": "75.25",
            "quantity": 1,
            "status": "paid",
            "issued_on": "2024-02-02",
            "line_items": "SKU-300, SKU-600, SKU-700"
        },
        {
            "invoice_number": "INV-004",
            "vendor_name": "Globex",
            "total_amount": {"value": "2,400.00"},
            "quantity": 8,
            "status": "overdue",
            "issued_on": "2024-02-20",
            "line_items": "SKU-200, SKU-800, SKU-900"
        }
    ]))
}

pub fn query(rows: Vec<Row>) -> QueryResult {
    QueryResult::new(rows)
}
