// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Volume snapshot commands

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_client::{Manager, Resource};
use serde_json::{Map, Value, json};

use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::{KeyValue, parse_key_value};
use crate::utils::{self, Formatter, format_dict};

use super::VolumeState;

const FORMATTERS: &[(&str, Formatter)] = &[("properties", format_dict), ("Properties", format_dict)];

#[derive(Subcommand, Clone)]
pub enum SnapshotCommand {
    /// List volume snapshots
    List(ListArgs),
    /// Display volume snapshot details
    Show(ShowArgs),
    /// Create new volume snapshot
    Create(CreateArgs),
    /// Delete volume snapshot(s)
    Delete(DeleteArgs),
    /// Set volume snapshot properties
    Set(SetArgs),
    /// Unset volume snapshot properties
    Unset(UnsetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Include all projects (admin only)
    #[arg(long)]
    pub all_projects: bool,

    /// Filter results by project (name or ID) (admin only)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,

    /// Filters results by a name
    #[arg(long)]
    pub name: Option<String>,

    /// Filters results by a status
    #[arg(long)]
    pub status: Option<String>,

    /// Filters results by a volume (name or ID)
    #[arg(long)]
    pub volume: Option<String>,

    /// The last snapshot ID of the previous page
    #[arg(long)]
    pub marker: Option<String>,

    /// Maximum number of snapshots to display
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Snapshot to display (name or ID)
    pub snapshot: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// Name of the new snapshot
    pub snapshot_name: String,

    /// Volume to snapshot (name or ID) (default is <snapshot-name>)
    #[arg(long)]
    pub volume: Option<String>,

    /// Description of the snapshot
    #[arg(long)]
    pub description: Option<String>,

    /// Create a snapshot attached to an instance
    #[arg(long)]
    pub force: bool,

    /// Set a property to this snapshot (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Snapshot(s) to delete (name or ID)
    #[arg(required = true)]
    pub snapshots: Vec<String>,

    /// Attempt forced removal of snapshot(s), regardless of state
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Snapshot to modify (name or ID)
    pub snapshot: String,

    /// New snapshot name
    #[arg(long)]
    pub name: Option<String>,

    /// New snapshot description
    #[arg(long)]
    pub description: Option<String>,

    /// Remove all properties before setting new ones
    #[arg(long)]
    pub no_property: bool,

    /// Property to add/change for this snapshot (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// New snapshot state (admin only)
    #[arg(long, value_enum)]
    pub state: Option<VolumeState>,
}

#[derive(Args, Clone)]
pub struct UnsetArgs {
    /// Snapshot to modify (name or ID)
    pub snapshot: String,

    /// Property to remove from snapshot (repeat option to remove multiple properties)
    #[arg(long = "property", value_name = "KEY")]
    pub properties: Vec<String>,
}

impl SnapshotCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Set(args) => set(args, ctx).await,
            Self::Unset(args) => unset(args, ctx).await,
        }
    }
}

fn flatten_snapshot(mut snapshot: Resource) -> Resource {
    if let Some(metadata) = snapshot.remove("metadata") {
        snapshot.insert("properties", metadata);
    }
    snapshot
}

/// Volume column: the volume name when known, else its ID
fn volume_label(snapshot: &Resource, volumes: &BTreeMap<String, String>) -> String {
    let id = snapshot.str_field("volume_id").unwrap_or_default();
    volumes
        .get(id)
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| id.to_string())
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;

    let project = match &args.project {
        Some(p) => Some(commands::project_id(ctx, p, args.project_domain.as_deref()).await?),
        None => None,
    };
    let volume_id = match &args.volume {
        Some(v) => Some(utils::find_resource(volume.volumes(), v).await?.id().to_string()),
        None => None,
    };
    let all_projects = args.all_projects || project.is_some();

    let query = commands::query(&[
        ("all_tenants", all_projects.then(|| "True".to_string())),
        ("project_id", project),
        ("name", args.name),
        ("status", args.status),
        ("volume_id", volume_id),
        ("marker", args.marker),
        ("limit", args.limit.map(|l| l.to_string())),
    ]);

    let mut snapshots: Vec<Resource> = volume
        .snapshots()
        .list(&query)
        .await?
        .into_iter()
        .map(flatten_snapshot)
        .collect();

    let columns: &[&str] = if args.long {
        // Volume names are best effort; the ID is shown when the lookup fails.
        let volumes: BTreeMap<String, String> = match volume.volumes().list(&[]).await {
            Ok(vols) => vols
                .into_iter()
                .map(|v| (v.id().to_string(), v.name().to_string()))
                .collect(),
            Err(e) => {
                tracing::debug!("unable to list volumes: {}", e);
                BTreeMap::new()
            }
        };
        for s in snapshots.iter_mut() {
            let label = volume_label(s, &volumes);
            s.insert("volume", Value::from(label));
        }
        &["ID", "Name", "Description", "Status", "Size", "Created At", "Volume", "Properties"]
    } else {
        &["ID", "Name", "Description", "Status", "Size"]
    };
    let rows = output::rows(&snapshots, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

fn show_snapshot(ctx: &Context, snapshot: Resource) -> Result<()> {
    output::show_resource(&ctx.format, &flatten_snapshot(snapshot), &["links"], FORMATTERS)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let snapshot = utils::find_resource(volume.snapshots(), &args.snapshot).await?;
    show_snapshot(ctx, snapshot)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let source = args.volume.as_deref().unwrap_or(&args.snapshot_name);
    let volume_id = utils::find_resource(volume.volumes(), source).await?.id().to_string();

    let mut body = Map::new();
    body.insert("volume_id".into(), Value::from(volume_id));
    body.insert("name".into(), Value::from(args.snapshot_name));
    body.insert("force".into(), Value::Bool(args.force));
    commands::insert_opt(&mut body, "description", args.description);
    let metadata = commands::properties(&args.properties);
    if !metadata.is_empty() {
        body.insert("metadata".into(), Value::Object(metadata));
    }

    let snapshot = volume.snapshots().create(Value::Object(body)).await?;
    tracing::info!("created snapshot {}", snapshot.id());
    show_snapshot(ctx, snapshot)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let mut report = DeleteReport::new("snapshot", args.snapshots.len());
    for name in &args.snapshots {
        let result: Result<(), CommandError> = async {
            let snapshot = utils::find_resource(volume.snapshots(), name).await?;
            if args.force {
                volume
                    .snapshots()
                    .action(snapshot.id(), "os-force_delete", json!({}))
                    .await?;
            } else {
                volume.snapshots().delete(snapshot.id()).await?;
            }
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let snapshot = utils::find_resource(volume.snapshots(), &args.snapshot).await?;
    let id = snapshot.id().to_string();
    let mut failed = 0usize;

    if args.no_property {
        let existing: Vec<String> = snapshot
            .get("metadata")
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        for key in existing {
            let path = format!("{}/metadata/{}", volume.snapshots().item_path(&id), key);
            if let Err(e) = volume.snapshots().client().delete(&path).await {
                tracing::error!("Failed to clean snapshot property {}: {}", key, e);
                failed += 1;
            }
        }
    }

    let metadata = commands::properties(&args.properties);
    if !metadata.is_empty() {
        let path = format!("{}/metadata", volume.snapshots().item_path(&id));
        let body = json!({ "metadata": metadata });
        if let Err(e) = volume.snapshots().client().post_json(&path, &body).await {
            tracing::error!("Failed to set snapshot property: {}", e);
            failed += 1;
        }
    }

    if let Some(state) = args.state {
        let body = json!({ "status": state.to_string() });
        if let Err(e) = volume.snapshots().action(&id, "os-reset_status", body).await {
            tracing::error!("Failed to set snapshot state: {}", e);
            failed += 1;
        }
    }

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    if !body.is_empty() {
        if let Err(e) = volume.snapshots().update(&id, Value::Object(body)).await {
            tracing::error!("Failed to update snapshot name or description: {}", e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(CommandError::new("One or more of the set operations failed").into());
    }
    Ok(())
}

async fn unset(args: UnsetArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let snapshot = utils::find_resource(volume.snapshots(), &args.snapshot).await?;
    if args.properties.is_empty() {
        tracing::debug!("no snapshot properties to unset");
        return Ok(());
    }
    let mut failed = 0usize;
    for key in &args.properties {
        let path = format!("{}/metadata/{}", volume.snapshots().item_path(snapshot.id()), key);
        if let Err(e) = volume.snapshots().client().delete(&path).await {
            tracing::error!("Failed to unset snapshot property {}: {}", key, e);
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(CommandError::new(format!(
            "{} of {} properties failed to unset.",
            failed,
            args.properties.len()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(volume_id: &str) -> Resource {
        Resource::from_value(json!({
            "id": "s1",
            "name": "nightly",
            "volume_id": volume_id,
            "metadata": {"tier": "gold"},
        }))
        .unwrap()
    }

    #[test]
    fn test_volume_label_prefers_name() {
        let volumes = BTreeMap::from([("v1".to_string(), "data".to_string()), ("v2".to_string(), String::new())]);
        assert_eq!(volume_label(&snapshot("v1"), &volumes), "data");
        assert_eq!(volume_label(&snapshot("v2"), &volumes), "v2");
        assert_eq!(volume_label(&snapshot("v3"), &volumes), "v3");
    }

    #[test]
    fn test_flatten_snapshot_properties() {
        let flat = flatten_snapshot(snapshot("v1"));
        let row = utils::get_item_properties(&flat, &["Name", "Properties"], FORMATTERS, &[]);
        assert_eq!(row, vec![json!("nightly"), json!("tier='gold'")]);
    }
}
