// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Object and account commands

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bytes::Bytes;
use clap::{Args, Subcommand};
use openstack_client::Resource;
use serde_json::Value;

use super::{PageArgs, local_path, save_object};
use crate::commands::Context;
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::utils::{Formatter, format_dict};

const FORMATTERS: &[(&str, Formatter)] = &[("properties", format_dict)];

#[derive(Subcommand, Clone)]
pub enum ObjectCommand {
    /// List objects
    List(ListArgs),
    /// Display object details
    Show(ObjectArgs),
    /// Upload object to container
    Create(CreateArgs),
    /// Delete object from container
    Delete(DeleteArgs),
    /// Save object locally
    Save(SaveArgs),
    /// Object store account
    #[command(subcommand)]
    Store(StoreCommand),
}

#[derive(Subcommand, Clone)]
pub enum StoreCommand {
    /// Account commands
    #[command(subcommand)]
    Account(AccountCommand),
}

#[derive(Subcommand, Clone)]
pub enum AccountCommand {
    /// Display account details
    Show,
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Container to list
    pub container: String,

    #[command(flatten)]
    pub page: PageArgs,

    /// Roll up items with <delimiter>
    #[arg(long)]
    pub delimiter: Option<String>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct ObjectArgs {
    /// Object's container
    pub container: String,

    /// Object to display
    pub object: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// Container for new object
    pub container: String,

    /// Local filename(s) to upload
    #[arg(required = true)]
    pub objects: Vec<PathBuf>,

    /// Upload a file and rename it. Can only be used when uploading a single object
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Delete object(s) from <container>
    pub container: String,

    /// Object(s) to delete
    #[arg(required = true)]
    pub objects: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SaveArgs {
    /// Download <object> from <container>
    pub container: String,

    /// Object to save
    pub object: String,

    /// Destination filename (defaults to object name); using '-' as the filename will print the file to stdout
    #[arg(long)]
    pub file: Option<String>,
}

impl ObjectCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Save(args) => save(args, ctx).await,
            Self::Store(StoreCommand::Account(AccountCommand::Show)) => show_account(ctx).await,
        }
    }
}

/// Delimited listings return `{"subdir": ..}` entries for pseudo-directories
fn normalize_entry(mut entry: Resource) -> Resource {
    if entry.get("name").is_none() {
        if let Some(subdir) = entry.remove("subdir") {
            entry.insert("name", subdir);
        }
    }
    entry
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let objects: Vec<Resource> = store
        .list_objects(&args.container, &args.page.options(args.delimiter.clone()))
        .await?
        .into_iter()
        .map(normalize_entry)
        .collect();

    let columns: &[&str] = if args.long {
        &["Name", "Bytes", "Hash", "Content Type", "Last Modified"]
    } else {
        &["Name"]
    };
    let rows = output::rows(&objects, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ObjectArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let object = store.show_object(&args.container, &args.object).await?;
    output::show_resource(&ctx.format, &object, &[], FORMATTERS)
}

/// Object name for an uploaded file; `--name` only applies to a single file
fn upload_name(path: &std::path::Path, rename: Option<&str>) -> String {
    match rename {
        Some(name) => name.to_string(),
        None => path.to_string_lossy().trim_start_matches("./").to_string(),
    }
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    if args.name.is_some() && args.objects.len() > 1 {
        return Err(CommandError::new("Attempting to upload multiple objects and using --name is not permitted").into());
    }
    for path in &args.objects {
        if path.is_dir() {
            return Err(CommandError::new(format!("Can't upload directory: {}", path.display())).into());
        }
    }

    let store = ctx.clients.object_store().await?;
    let mut uploaded: Vec<Resource> = Vec::with_capacity(args.objects.len());
    for path in &args.objects {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| CommandError::new(format!("Unable to read {}: {}", path.display(), e)))?;
        let name = upload_name(path, args.name.as_deref());
        tracing::debug!("uploading {} as {}/{}", path.display(), args.container, name);
        uploaded.push(store.upload_object(&args.container, &name, Bytes::from(data)).await?);
    }

    let columns = ["object", "container", "etag"];
    let rows = output::rows(&uploaded, &columns, &[], &[]);
    output::list(&ctx.format, &output::headers(&columns), rows)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let mut report = DeleteReport::new("object", args.objects.len());
    for object in &args.objects {
        let result = store.delete_object(&args.container, object).await;
        report.record(object, result);
    }
    Ok(report.finish()?)
}

async fn save(args: SaveArgs, ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    match args.file.as_deref() {
        Some("-") => {
            let data = store.download_object(&args.container, &args.object).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }
        Some(file) => {
            save_object(store, &args.container, &args.object, &PathBuf::from(file)).await?;
        }
        None => {
            let path = local_path(None, &args.object);
            save_object(store, &args.container, &args.object, &path).await?;
        }
    }
    Ok(())
}

async fn show_account(ctx: &Context) -> Result<()> {
    let store = ctx.clients.object_store().await?;
    let mut account = store.show_account().await?;
    // Header counts arrive as strings.
    for field in ["Containers", "Objects", "Bytes"] {
        let parsed = account
            .str_field(field)
            .and_then(|v| v.parse::<u64>().ok())
            .map(Value::from);
        if let Some(v) = parsed {
            account.insert(field, v);
        }
    }
    output::show_resource(&ctx.format, &account, &[], FORMATTERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn test_subdir_entries_become_names() {
        let entry = Resource::from_value(json!({"subdir": "logs/"})).unwrap();
        assert_eq!(normalize_entry(entry).name(), "logs/");

        let entry = Resource::from_value(json!({"name": "a.txt", "bytes": 3})).unwrap();
        assert_eq!(normalize_entry(entry).name(), "a.txt");
    }

    #[test]
    fn test_upload_name() {
        assert_eq!(upload_name(Path::new("./data/a.txt"), None), "data/a.txt");
        assert_eq!(upload_name(Path::new("a.txt"), Some("renamed.txt")), "renamed.txt");
    }
}
