// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Volume commands, including volume types and snapshots

pub mod snapshot;
pub mod volume_type;

pub use snapshot::SnapshotCommand;
pub use volume_type::VolumeTypeCommand;

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use openstack_client::{Manager, Resource, VolumeClient};
use serde_json::{Map, Value, json};

use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::{KeyValue, parse_key_value};
use crate::utils::{self, Formatter, format_dict, format_list_of_dicts};

const FORMATTERS: &[(&str, Formatter)] = &[
    ("properties", format_dict),
    ("Properties", format_dict),
    ("volume_image_metadata", format_dict),
    ("attachments", format_list_of_dicts),
];

#[derive(Subcommand, Clone)]
pub enum VolumeCommand {
    /// List volumes
    List(ListArgs),
    /// Display volume details
    Show(ShowArgs),
    /// Create new volume
    Create(CreateArgs),
    /// Delete volume(s)
    Delete(DeleteArgs),
    /// Set volume properties
    Set(SetArgs),
    /// Unset volume properties
    Unset(UnsetArgs),
    /// Volume types
    #[command(subcommand)]
    Type(VolumeTypeCommand),
    /// Volume snapshots
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum VolumeState {
    Available,
    Error,
    Creating,
    Deleting,
    InUse,
    Attaching,
    Detaching,
    #[value(name = "error_deleting")]
    #[strum(serialize = "error_deleting")]
    ErrorDeleting,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RetypePolicy {
    Never,
    OnDemand,
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Filter results by project (name or ID) (admin only)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Filter results by user (name or ID) (admin only)
    #[arg(long)]
    pub user: Option<String>,

    /// Domain the user belongs to (name or ID)
    #[arg(long, requires = "user")]
    pub user_domain: Option<String>,

    /// Filter results by volume name
    #[arg(long)]
    pub name: Option<String>,

    /// Filter results by status
    #[arg(long)]
    pub status: Option<String>,

    /// Include all projects (admin only)
    #[arg(long)]
    pub all_projects: bool,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,

    /// The last volume ID of the previous page
    #[arg(long)]
    pub marker: Option<String>,

    /// Maximum number of volumes to display
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Volume to display (name or ID)
    pub volume: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// Volume name
    pub name: Option<String>,

    /// Volume size in GB (required unless --snapshot or --source is given)
    #[arg(long)]
    pub size: Option<u64>,

    /// Set the type of volume
    #[arg(long = "type")]
    pub volume_type: Option<String>,

    /// Use image ID as source for the volume
    #[arg(long, conflicts_with_all = ["snapshot", "source"])]
    pub image: Option<String>,

    /// Use snapshot as volume source (name or ID)
    #[arg(long, conflicts_with = "source")]
    pub snapshot: Option<String>,

    /// Volume to clone (name or ID)
    #[arg(long)]
    pub source: Option<String>,

    /// Volume description
    #[arg(long)]
    pub description: Option<String>,

    /// Create volume in this availability zone
    #[arg(long)]
    pub availability_zone: Option<String>,

    /// Set a property to this volume (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// Mark volume as bootable
    #[arg(long, conflicts_with = "non_bootable")]
    pub bootable: bool,

    /// Mark volume as non-bootable (default)
    #[arg(long)]
    pub non_bootable: bool,

    /// Set volume to read-only access mode
    #[arg(long, conflicts_with = "read_write")]
    pub read_only: bool,

    /// Set volume to read-write access mode (default)
    #[arg(long)]
    pub read_write: bool,

    /// Wait for the volume to become available
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Volume(s) to delete (name or ID)
    #[arg(required = true)]
    pub volumes: Vec<String>,

    /// Attempt forced removal of volume(s), regardless of state
    #[arg(long, conflicts_with = "purge")]
    pub force: bool,

    /// Remove any snapshots along with volume(s)
    #[arg(long)]
    pub purge: bool,

    /// Wait for the volume(s) to be deleted
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Volume to modify (name or ID)
    pub volume: String,

    /// New volume name
    #[arg(long)]
    pub name: Option<String>,

    /// Extend volume size in GB
    #[arg(long)]
    pub size: Option<u64>,

    /// New volume description
    #[arg(long)]
    pub description: Option<String>,

    /// Set a property on this volume (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// Remove all properties before setting new ones
    #[arg(long)]
    pub no_property: bool,

    /// New volume state (admin only)
    #[arg(long, value_enum)]
    pub state: Option<VolumeState>,

    /// New volume type (name or ID)
    #[arg(long = "type")]
    pub volume_type: Option<String>,

    /// Migration policy while re-typing volume
    #[arg(long, value_enum, requires = "volume_type")]
    pub retype_policy: Option<RetypePolicy>,

    /// Mark volume as bootable
    #[arg(long, conflicts_with = "non_bootable")]
    pub bootable: bool,

    /// Mark volume as non-bootable
    #[arg(long)]
    pub non_bootable: bool,

    /// Set volume to read-only access mode
    #[arg(long, conflicts_with = "read_write")]
    pub read_only: bool,

    /// Set volume to read-write access mode
    #[arg(long)]
    pub read_write: bool,
}

#[derive(Args, Clone)]
pub struct UnsetArgs {
    /// Volume to modify (name or ID)
    pub volume: String,

    /// Remove a property from volume (repeat option to remove multiple properties)
    #[arg(long = "property", value_name = "KEY")]
    pub properties: Vec<String>,
}

impl VolumeCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Set(args) => set(args, ctx).await,
            Self::Unset(args) => unset(args, ctx).await,
            Self::Type(cmd) => cmd.run(ctx).await,
            Self::Snapshot(cmd) => cmd.run(ctx).await,
        }
    }
}

/// `Attached to <server> on <device>`, one attachment per line
fn format_attachments(attachments: &Value, servers: &BTreeMap<String, String>) -> String {
    let Some(items) = attachments.as_array() else {
        return String::new();
    };
    items
        .iter()
        .map(|a| {
            let server_id = a.get("server_id").and_then(Value::as_str).unwrap_or_default();
            let server = servers.get(server_id).map(String::as_str).unwrap_or(server_id);
            let device = a.get("device").and_then(Value::as_str).unwrap_or_default();
            format!("Attached to {} on {} ", server, device)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Server names for attachment output; IDs are shown when the compute
/// service cannot be reached
async fn server_names(ctx: &Context, volumes: &[Resource]) -> BTreeMap<String, String> {
    let attached = volumes.iter().any(|v| {
        v.get("attachments")
            .and_then(Value::as_array)
            .is_some_and(|a| !a.is_empty())
    });
    if !attached {
        return BTreeMap::new();
    }
    let servers = match ctx.clients.compute().await {
        Ok(compute) => compute.servers().list(&[]).await,
        Err(e) => Err(e),
    };
    match servers {
        Ok(servers) => servers
            .iter()
            .map(|s| (s.id().to_string(), s.name().to_string()))
            .collect(),
        Err(e) => {
            tracing::debug!("unable to look up server names: {}", e);
            BTreeMap::new()
        }
    }
}

/// Cinder field names to the names the CLI shows
fn flatten_volume(mut volume: Resource) -> Resource {
    if let Some(metadata) = volume.remove("metadata") {
        volume.insert("properties", metadata);
    }
    if let Some(kind) = volume.remove("volume_type") {
        volume.insert("type", kind);
    }
    volume
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;

    let project = match &args.project {
        Some(p) => Some(commands::project_id(ctx, p, args.project_domain.as_deref()).await?),
        None => None,
    };
    let user = match &args.user {
        Some(u) => {
            let identity = ctx.clients.identity().await?;
            Some(
                commands::find_user(identity, u, args.user_domain.as_deref())
                    .await?
                    .id()
                    .to_string(),
            )
        }
        None => None,
    };
    let all_projects = args.all_projects || project.is_some();

    let query = commands::query(&[
        ("all_tenants", all_projects.then(|| "True".to_string())),
        ("project_id", project),
        ("user_id", user),
        ("name", args.name),
        ("status", args.status),
        ("marker", args.marker),
        ("limit", args.limit.map(|l| l.to_string())),
    ]);

    let volumes: Vec<Resource> = volume
        .volumes()
        .list(&query)
        .await?
        .into_iter()
        .map(flatten_volume)
        .collect();

    let servers = server_names(ctx, &volumes).await;
    let volumes: Vec<Resource> = volumes
        .into_iter()
        .map(|mut v| {
            let attached = format_attachments(v.get("attachments").unwrap_or(&Value::Null), &servers);
            v.insert("attached_to", Value::from(attached));
            v
        })
        .collect();

    let columns: &[&str] = if args.long {
        &["ID", "Name", "Status", "Size", "Type", "Bootable", "Attached to", "Properties"]
    } else {
        &["ID", "Name", "Status", "Size", "Attached to"]
    };
    let rows = output::rows(&volumes, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

fn show_volume(ctx: &Context, volume: Resource) -> Result<()> {
    output::show_resource(&ctx.format, &flatten_volume(volume), &["links"], FORMATTERS)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let found = utils::find_resource(volume.volumes(), &args.volume).await?;
    show_volume(ctx, found)
}

/// Wait for `available` before running post-create actions
async fn wait_available(volume: &VolumeClient, id: &str, message: &str) -> Result<(), CommandError> {
    let ok = commands::wait_for_status(volume.volumes(), id, &["available"], &["error"], message).await?;
    if ok {
        Ok(())
    } else {
        Err(CommandError::new(format!("Error creating volume: {}", id)))
    }
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;

    if args.size.is_none() && args.snapshot.is_none() && args.source.is_none() {
        return Err(CommandError::new("--size is a required option if snapshot or source volume are not specified.").into());
    }

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name.clone());
    commands::insert_opt(&mut body, "description", args.description.clone());
    commands::insert_opt(&mut body, "volume_type", args.volume_type.clone());
    commands::insert_opt(&mut body, "availability_zone", args.availability_zone.clone());
    commands::insert_opt(&mut body, "imageRef", args.image.clone());

    let mut size = args.size;
    if let Some(snapshot) = &args.snapshot {
        let snap = utils::find_resource(volume.snapshots(), snapshot).await?;
        body.insert("snapshot_id".into(), Value::from(snap.id()));
        // A larger --size extends the clone; otherwise the snapshot size wins.
        let snap_size = snap.get("size").and_then(Value::as_u64);
        size = match (size, snap_size) {
            (Some(s), Some(ss)) if s < ss => Some(ss),
            (None, ss) => ss,
            (s, _) => s,
        };
    }
    if let Some(source) = &args.source {
        let src = utils::find_resource(volume.volumes(), source).await?;
        body.insert("source_volid".into(), Value::from(src.id()));
        if size.is_none() {
            size = src.get("size").and_then(Value::as_u64);
        }
    }
    commands::insert_opt(&mut body, "size", size);
    let metadata = commands::properties(&args.properties);
    if !metadata.is_empty() {
        body.insert("metadata".into(), Value::Object(metadata));
    }

    let created = volume.volumes().create(Value::Object(body)).await?;
    let id = created.id().to_string();
    tracing::info!("created volume {}", id);

    let bootable = commands::toggle(args.bootable, args.non_bootable);
    let read_only = commands::toggle(args.read_only, args.read_write);
    if args.wait || bootable.is_some() || read_only.is_some() {
        wait_available(volume, &id, "Creating volume").await?;
    }
    if let Some(bootable) = bootable {
        if let Err(e) = volume.volume_action(&id, "os-set_bootable", json!({ "bootable": bootable })).await {
            tracing::error!("Failed to set volume bootable property: {}", e);
        }
    }
    if let Some(read_only) = read_only {
        if let Err(e) = volume
            .volume_action(&id, "os-update_readonly_flag", json!({ "readonly": read_only }))
            .await
        {
            tracing::error!("Failed to set volume read-only access mode flag: {}", e);
        }
    }

    let shown = if args.wait || bootable.is_some() || read_only.is_some() {
        volume.volumes().get(&id).await?
    } else {
        created
    };
    show_volume(ctx, shown)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let mut report = DeleteReport::new("volume", args.volumes.len());

    for name in &args.volumes {
        let result: Result<(), CommandError> = async {
            let found = utils::find_resource(volume.volumes(), name).await?;
            if args.force {
                volume.volume_action(found.id(), "os-force_delete", Value::Null).await?;
            } else if args.purge {
                volume
                    .volumes()
                    .client()
                    .delete_with_query(
                        &volume.volumes().item_path(found.id()),
                        &[("cascade".to_string(), "true".to_string())],
                    )
                    .await?;
            } else {
                volume.volumes().delete(found.id()).await?;
            }
            if args.wait && !commands::wait_for_delete(volume.volumes(), found.id(), "Deleting volume").await? {
                return Err(CommandError::new(format!("Error deleting volume: {}", found.id())));
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
    let found = utils::find_resource(volume.volumes(), &args.volume).await?;
    let id = found.id();
    let mut failed = 0usize;

    if let Some(size) = args.size {
        let current = found.get("size").and_then(Value::as_u64).unwrap_or(0);
        if found.status() != "available" {
            tracing::error!("Volume is in {} state, it must be available before size can be extended", found.status());
            failed += 1;
        } else if size <= current {
            tracing::error!("New size must be greater than {} GB", current);
            failed += 1;
        } else if let Err(e) = volume.volume_action(id, "os-extend", json!({ "new_size": size })).await {
            tracing::error!("Failed to set volume size: {}", e);
            failed += 1;
        }
    }

    if args.no_property {
        let existing: Vec<String> = found
            .get("metadata")
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        for key in existing {
            if let Err(e) = volume.delete_volume_metadata(id, &key).await {
                tracing::error!("Failed to clean volume properties: {}", e);
                failed += 1;
            }
        }
    }

    let metadata = commands::properties(&args.properties);
    if !metadata.is_empty() {
        if let Err(e) = volume.set_volume_metadata(id, &metadata).await {
            tracing::error!("Failed to set volume property: {}", e);
            failed += 1;
        }
    }

    if let Some(state) = args.state {
        if let Err(e) = volume
            .volume_action(id, "os-reset_status", json!({ "status": state.to_string() }))
            .await
        {
            tracing::error!("Failed to set volume state: {}", e);
            failed += 1;
        }
    }

    if let Some(bootable) = commands::toggle(args.bootable, args.non_bootable) {
        if let Err(e) = volume.volume_action(id, "os-set_bootable", json!({ "bootable": bootable })).await {
            tracing::error!("Failed to set volume bootable property: {}", e);
            failed += 1;
        }
    }

    if let Some(read_only) = commands::toggle(args.read_only, args.read_write) {
        if let Err(e) = volume
            .volume_action(id, "os-update_readonly_flag", json!({ "readonly": read_only }))
            .await
        {
            tracing::error!("Failed to set volume read-only access mode flag: {}", e);
            failed += 1;
        }
    }

    if let Some(new_type) = &args.volume_type {
        let result: Result<(), CommandError> = async {
            let kind = utils::find_resource(volume.volume_types(), new_type).await?;
            let policy = args.retype_policy.unwrap_or(RetypePolicy::Never);
            volume
                .volume_action(
                    id,
                    "os-retype",
                    json!({ "new_type": kind.id(), "migration_policy": policy.to_string() }),
                )
                .await?;
            Ok(())
        }
        .await;
        if let Err(e) = result {
            tracing::error!("Failed to set volume type: {}", e);
            failed += 1;
        }
    }

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    if !body.is_empty() {
        if let Err(e) = volume.volumes().update(id, Value::Object(body)).await {
            tracing::error!("Failed to update volume display name or display description: {}", e);
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
    let found = utils::find_resource(volume.volumes(), &args.volume).await?;
    let mut failed = false;
    for key in &args.properties {
        if let Err(e) = volume.delete_volume_metadata(found.id(), key).await {
            tracing::error!("Failed to unset volume property {}: {}", key, e);
            failed = true;
        }
    }
    if failed {
        return Err(CommandError::new("One or more of the unset operations failed").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_attachments_uses_server_names() {
        let attachments = json!([
            {"server_id": "s1", "device": "/dev/vdb"},
            {"server_id": "s2", "device": "/dev/vdc"},
        ]);
        let servers = BTreeMap::from([("s1".to_string(), "web".to_string())]);
        assert_eq!(
            format_attachments(&attachments, &servers),
            "Attached to web on /dev/vdb \nAttached to s2 on /dev/vdc "
        );
    }

    #[test]
    fn test_flatten_volume() {
        let volume = Resource::from_value(json!({
            "id": "v1",
            "metadata": {"a": "1"},
            "volume_type": "ssd",
        }))
        .unwrap();
        let flat = flatten_volume(volume);
        assert_eq!(flat.get("properties"), Some(&json!({"a": "1"})));
        assert_eq!(flat.str_field("type"), Some("ssd"));
        assert!(flat.get("metadata").is_none());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(VolumeState::InUse.to_string(), "in-use");
        assert_eq!(VolumeState::ErrorDeleting.to_string(), "error_deleting");
        assert_eq!(RetypePolicy::OnDemand.to_string(), "on-demand");
    }
}
