// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Table output formatting

use comfy_table::{Table, presets::ASCII_FULL_CONDENSED};
use serde_json::Value;

use crate::utils::value_to_string;

/// Create a new table with headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL_CONDENSED);
    table.set_header(headers);
    table
}

/// Two-column `Field | Value` table for one record
pub fn print_show(columns: &[&str], values: &[&Value]) {
    let mut table = create_table(&["Field", "Value"]);
    for (c, v) in columns.iter().zip(values) {
        table.add_row(vec![c.to_string(), value_to_string(v)]);
    }
    print_table(table);
}

pub fn print_list(headers: &[&str], rows: &[Vec<&Value>]) {
    let mut table = create_table(headers);
    for row in rows {
        table.add_row(row.iter().map(|v| value_to_string(v)).collect::<Vec<_>>());
    }
    print_table(table);
}

/// Format a table and print it
pub fn print_table(table: Table) {
    println!("{table}");
}
