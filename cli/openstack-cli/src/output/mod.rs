// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Output formatting
//!
//! Commands produce either one record (`show`) or a list of rows
//! (`list`); the formatter chosen with `-f` renders them.

pub mod json;
pub mod progress;
pub mod table;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde_json::Value;

use crate::error::CommandError;
use crate::utils::{self, Formatter};
use openstack_client::Resource;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
    Value,
    Shell,
}

/// Formatting options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct FormatArgs {
    /// The output format
    #[arg(short = 'f', long = "format", global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Specify the column(s) to include, can be repeated
    #[arg(short = 'c', long = "column", global = true, value_name = "COLUMN")]
    pub columns: Vec<String>,

    /// Specify the column(s) to sort list output by, can be repeated
    #[arg(long = "sort-column", global = true, value_name = "SORT_COLUMN")]
    pub sort_columns: Vec<String>,

    /// Whether to disable indenting the JSON
    #[arg(long, global = true)]
    pub noindent: bool,

    /// Add a prefix to all variable names (shell format, given before the command)
    #[arg(long, default_value = "")]
    pub prefix: String,
}

/// Keep only the columns requested with `-c`, in display order
fn select(args: &FormatArgs, columns: &[String]) -> Result<Vec<usize>, CommandError> {
    if args.columns.is_empty() {
        return Ok((0..columns.len()).collect());
    }
    let picked: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| args.columns.iter().any(|want| want == *c))
        .map(|(i, _)| i)
        .collect();
    if picked.is_empty() {
        return Err(CommandError::new(format!(
            "No recognized column names in {}. Recognized columns are {}.",
            args.columns.join(", "),
            columns.join(", ")
        )));
    }
    Ok(picked)
}

/// Render a single record
pub fn show(args: &FormatArgs, columns: &[String], values: &[Value]) -> Result<()> {
    let idx = select(args, columns)?;
    let cols: Vec<&str> = idx.iter().map(|&i| columns[i].as_str()).collect();
    let vals: Vec<&Value> = idx.iter().map(|&i| &values[i]).collect();

    match args.format {
        OutputFormat::Table => table::print_show(&cols, &vals),
        OutputFormat::Json => json::print_show_json(&cols, &vals, args.noindent)?,
        OutputFormat::Yaml => json::print_show_yaml(&cols, &vals)?,
        OutputFormat::Value => {
            for v in vals {
                println!("{}", utils::value_to_string(v));
            }
        }
        OutputFormat::Shell => json::print_shell(&cols, &vals, &args.prefix),
    }
    Ok(())
}

/// Render rows under `headers`
pub fn list(args: &FormatArgs, headers: &[String], mut rows: Vec<Vec<Value>>) -> Result<()> {
    if args.format == OutputFormat::Shell {
        return Err(CommandError::new("The shell format is only available for single records").into());
    }
    let idx = select(args, headers)?;

    for sort_col in args.sort_columns.iter().rev() {
        if let Some(pos) = headers.iter().position(|h| h == sort_col) {
            rows.sort_by(|a, b| utils::compare_values(a.get(pos), b.get(pos)));
        }
    }

    let cols: Vec<&str> = idx.iter().map(|&i| headers[i].as_str()).collect();
    let rows: Vec<Vec<&Value>> = rows
        .iter()
        .map(|r| idx.iter().filter_map(|&i| r.get(i)).collect())
        .collect();

    match args.format {
        OutputFormat::Table => table::print_list(&cols, &rows),
        OutputFormat::Json => json::print_list_json(&cols, &rows, args.noindent)?,
        OutputFormat::Yaml => json::print_list_yaml(&cols, &rows)?,
        OutputFormat::Value => {
            for row in rows {
                let line: Vec<String> = row.into_iter().map(utils::value_to_string).collect();
                println!("{}", line.join(" "));
            }
        }
        OutputFormat::Shell => {}
    }
    Ok(())
}

/// Show every field of a resource, sorted by name
///
/// `hidden` fields are dropped; `formatters` render the named fields.
pub fn show_resource(
    args: &FormatArgs,
    resource: &Resource,
    hidden: &[&str],
    formatters: &[(&str, Formatter)],
) -> Result<()> {
    let mut columns: Vec<String> = resource
        .fields()
        .keys()
        .filter(|k| !hidden.contains(&k.as_str()))
        .cloned()
        .collect();
    columns.sort();
    let values: Vec<Value> = columns
        .iter()
        .map(|c| {
            let v = resource.get(c).cloned().unwrap_or(Value::Null);
            match formatters.iter().find(|(name, _)| name == c) {
                Some((_, f)) => Value::String(f(&v)),
                None => v,
            }
        })
        .collect();
    show(args, &columns, &values)
}

/// Build list rows from resources with [`utils::get_item_properties`]
pub fn rows(
    items: &[Resource],
    fields: &[&str],
    formatters: &[(&str, Formatter)],
    mixed_case: &[&str],
) -> Vec<Vec<Value>> {
    items
        .iter()
        .map(|r| utils::get_item_properties(r, fields, formatters, mixed_case))
        .collect()
}

/// Owned header list
pub fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(columns: &[&str]) -> FormatArgs {
        FormatArgs {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            ..FormatArgs::default()
        }
    }

    #[test]
    fn test_select_keeps_display_order() {
        let cols = headers(&["ID", "Name", "Status"]);
        assert_eq!(select(&args(&["Status", "ID"]), &cols).unwrap(), vec![0, 2]);
        assert_eq!(select(&args(&[]), &cols).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_select_unknown_columns() {
        let cols = headers(&["ID", "Name"]);
        let err = select(&args(&["Bogus"]), &cols).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No recognized column names in Bogus. Recognized columns are ID, Name."
        );
    }

    #[test]
    fn test_shell_rejected_for_lists() {
        let a = FormatArgs {
            format: OutputFormat::Shell,
            ..FormatArgs::default()
        };
        assert!(list(&a, &headers(&["ID"]), vec![]).is_err());
    }
}
