// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Structured (JSON, YAML, shell) output formatting

use serde::Serialize;
use serde_json::{Map, Value};

use crate::utils::value_to_string;

fn record(columns: &[&str], values: &[&Value]) -> Map<String, Value> {
    columns
        .iter()
        .zip(values)
        .map(|(c, v)| (c.to_string(), (*v).clone()))
        .collect()
}

/// Print a value as JSON, pretty unless `noindent`
pub fn print_json<T: Serialize>(value: &T, noindent: bool) -> anyhow::Result<()> {
    let json = if noindent {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}

pub fn print_show_json(columns: &[&str], values: &[&Value], noindent: bool) -> anyhow::Result<()> {
    print_json(&record(columns, values), noindent)
}

pub fn print_list_json(columns: &[&str], rows: &[Vec<&Value>], noindent: bool) -> anyhow::Result<()> {
    let items: Vec<Map<String, Value>> = rows.iter().map(|r| record(columns, r)).collect();
    print_json(&items, noindent)
}

pub fn print_show_yaml(columns: &[&str], values: &[&Value]) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&record(columns, values))?);
    Ok(())
}

pub fn print_list_yaml(columns: &[&str], rows: &[Vec<&Value>]) -> anyhow::Result<()> {
    let items: Vec<Map<String, Value>> = rows.iter().map(|r| record(columns, r)).collect();
    print!("{}", serde_yaml::to_string(&items)?);
    Ok(())
}

/// `name="value"` lines suitable for `eval`
pub fn print_shell(columns: &[&str], values: &[&Value], prefix: &str) {
    for line in shell_lines(columns, values, prefix) {
        println!("{}", line);
    }
}

fn shell_lines(columns: &[&str], values: &[&Value], prefix: &str) -> Vec<String> {
    columns
        .iter()
        .zip(values)
        .map(|(c, v)| {
            let name: String = c
                .chars()
                .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '_' })
                .collect();
            let value = value_to_string(v).replace('\\', "\\\\").replace('"', "\\\"");
            format!("{}{}=\"{}\"", prefix, name, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shell_lines() {
        let (a, b) = (json!("ACTIVE"), json!("say \"hi\""));
        assert_eq!(
            shell_lines(&["OS-EXT-STS:vm_state", "Description"], &[&a, &b], "os_"),
            vec![
                "os_os_ext_sts_vm_state=\"ACTIVE\"".to_string(),
                "os_description=\"say \\\"hi\\\"\"".to_string(),
            ]
        );
    }
}
