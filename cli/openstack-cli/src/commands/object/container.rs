// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Container commands

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_client::{ListOptions, Resource};

use super::{PageArgs, local_path, save_object};
use crate::commands::Context;
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::utils::{Formatter, format_dict};

const FORMATTERS: &[(&str, Formatter)] = &[("properties", format_dict)];

#[derive(Subcommand, Clone)]
pub enum ContainerCommand {
    /// List containers
    List(ListArgs),
    /// Display container details
    Show(ShowArgs),
    /// Create new container
    Create(CreateArgs),
    /// Delete container
    Delete(DeleteArgs),
    /// Save container contents locally
    Save(SaveArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Container to display
    pub container: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New container name(s)
    #[arg(required = true)]
    pub containers: Vec<String>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Container(s) to delete
    #[arg(required = true)]
    pub containers: Vec<String>,

    /// Recursively delete objects and container
    #[arg(long, short = 'r')]
    pub recursive: bool,
}

#[derive(Args, Clone)]
pub struct SaveArgs {
    /// Container to save
    pub container: String,
}

impl ContainerCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Save(args) => save(args, ctx).await,
        }
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let containers = store.list_containers(&args.page.options(None)).await?;

    let columns: &[&str] = if args.long {
        &["Name", "Bytes", "Count"]
    } else {
        &["Name"]
    };
    let rows = output::rows(&containers, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let container = store.show_container(&args.container).await?;
    output::show_resource(&ctx.format, &container, &[], FORMATTERS)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let mut created: Vec<Resource> = Vec::with_capacity(args.containers.len());
    for name in &args.containers {
        if name.contains('/') {
            tracing::warn!("Container name {} contains a '/'; it will be URL-encoded", name);
        }
        created.push(store.create_container(name).await?);
    }

    let columns = ["account", "container"];
    let rows = output::rows(&created, &columns, &[], &[]);
    output::list(&ctx.format, &output::headers(&columns), rows)
}

/// Every object name in `container`
async fn all_objects(ctx: &Context, container: &str) -> Result<Vec<String>, CommandError> {
    let store = ctx.clients.object_store().await?;
    let options = ListOptions {
        all: true,
        ..ListOptions::default()
    };
    Ok(store
        .list_objects(container, &options)
        .await?
        .iter()
        .filter_map(|o| o.str_field("name").map(str::to_string))
        .collect())
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let mut report = DeleteReport::new("container", args.containers.len());
    for name in &args.containers {
        let result: Result<(), CommandError> = async {
            if args.recursive {
                for object in all_objects(ctx, name).await? {
                    store.delete_object(name, &object).await?;
                }
            }
            store.delete_container(name).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn save(args: SaveArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    for object in all_objects(ctx, &args.container).await? {
        let path = local_path(None, &object);
        save_object(store, &args.container, &object, &path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;
    use serde_json::{Value, json};

    #[test]
    fn test_long_list_columns() {
        let container = Resource::from_value(json!({"name": "backups", "bytes": 2048, "count": 3})).unwrap();
        let row = utils::get_item_properties(&container, &["Name", "Bytes", "Count"], FORMATTERS, &[]);
        assert_eq!(row, vec![json!("backups"), json!(2048), json!(3)]);
    }

    #[test]
    fn test_show_properties_formatted() {
        let mut container = Resource::default();
        container.insert("properties", json!({"owner": "ops"}));
        let formatted = FORMATTERS
            .iter()
            .find(|(name, _)| *name == "properties")
            .map(|(_, f)| f(container.get("properties").unwrap_or(&Value::Null)));
        assert_eq!(formatted.as_deref(), Some("owner='ops'"));
    }
}
