// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Volume type commands

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_client::{Manager, Resource, VolumeClient};
use serde_json::{Map, Value};

use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::{KeyValue, parse_key_value};
use crate::utils::{self, Formatter, format_dict, format_list};

const FORMATTERS: &[(&str, Formatter)] = &[
    ("properties", format_dict),
    ("Properties", format_dict),
    ("access_project_ids", format_list),
];

#[derive(Subcommand, Clone)]
pub enum VolumeTypeCommand {
    /// List volume types
    List(ListArgs),
    /// Display volume type details
    Show(ShowArgs),
    /// Create new volume type
    Create(CreateArgs),
    /// Delete volume type(s)
    Delete(DeleteArgs),
    /// Set volume type properties
    Set(SetArgs),
    /// Unset volume type properties
    Unset(UnsetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// List additional fields in output
    #[arg(long)]
    pub long: bool,

    /// List only public types
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// List only private types (admin only)
    #[arg(long)]
    pub private: bool,

    /// List the default volume type
    #[arg(long, conflicts_with_all = ["public", "private"])]
    pub default: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Volume type to display (name or ID)
    pub volume_type: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// Volume type name
    pub name: String,

    /// Volume type description
    #[arg(long)]
    pub description: Option<String>,

    /// Volume type is accessible to the public
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Volume type is not accessible to the public
    #[arg(long)]
    pub private: bool,

    /// Set a property on this volume type (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// Allow <project> to access private type (name or ID) (admin only)
    #[arg(long, requires = "private")]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Volume type(s) to delete (name or ID)
    #[arg(required = true)]
    pub volume_types: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Volume type to modify (name or ID)
    pub volume_type: String,

    /// Set volume type name
    #[arg(long)]
    pub name: Option<String>,

    /// Set volume type description
    #[arg(long)]
    pub description: Option<String>,

    /// Set a property on this volume type (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// Set volume type access to project (name or ID) (admin only)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct UnsetArgs {
    /// Volume type to modify (name or ID)
    pub volume_type: String,

    /// Remove a property from this volume type (repeat option to remove multiple properties)
    #[arg(long = "property", value_name = "KEY")]
    pub properties: Vec<String>,

    /// Removes volume type access to project (name or ID) (admin only)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,
}

impl VolumeTypeCommand {
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

/// `extra_specs` shown as `properties`
fn flatten_type(mut kind: Resource) -> Resource {
    if let Some(specs) = kind.remove("extra_specs") {
        kind.insert("properties", specs);
    }
    if let Some(public) = kind.get("os-volume-type-access:is_public").cloned() {
        kind.insert("is_public", public);
    }
    kind
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;

    let types: Vec<Resource> = if args.default {
        let value = volume.volume_types().client().get_json("types/default", &[]).await?;
        value
            .get("volume_type")
            .cloned()
            .and_then(Resource::from_value)
            .into_iter()
            .collect()
    } else {
        let is_public = match (args.public, args.private) {
            (true, _) => Some("true"),
            (_, true) => Some("false"),
            _ => None,
        };
        volume
            .volume_types()
            .list(&commands::query(&[("is_public", is_public.map(str::to_string))]))
            .await?
    };
    let types: Vec<Resource> = types.into_iter().map(flatten_type).collect();

    let columns: &[&str] = if args.long {
        &["ID", "Name", "Is Public", "Description", "Properties"]
    } else {
        &["ID", "Name", "Is Public"]
    };
    let rows = output::rows(&types, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

/// Projects allowed to use a private type
async fn access_project_ids(volume: &VolumeClient, id: &str) -> Result<Vec<Value>, CommandError> {
    let path = format!("{}/os-volume-type-access", volume.volume_types().item_path(id));
    let value = volume.volume_types().client().get_json(&path, &[]).await?;
    Ok(value
        .get("volume_type_access")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|a| a.get("project_id").cloned()).collect())
        .unwrap_or_default())
}

async fn show_type(ctx: &Context, volume: &VolumeClient, kind: Resource) -> Result<()> {
    let mut kind = flatten_type(kind);
    if kind.get("is_public").and_then(Value::as_bool) == Some(false) {
        match access_project_ids(volume, kind.id()).await {
            Ok(ids) => {
                kind.insert("access_project_ids", Value::Array(ids));
            }
            Err(e) => tracing::debug!("unable to list volume type access: {}", e),
        }
    }
    output::show_resource(&ctx.format, &kind, &["os-volume-type-access:is_public"], FORMATTERS)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let kind = utils::find_resource(volume.volume_types(), &args.volume_type).await?;
    show_type(ctx, volume, kind).await
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name));
    commands::insert_opt(&mut body, "description", args.description);
    commands::insert_opt(
        &mut body,
        "os-volume-type-access:is_public",
        commands::toggle(args.public, args.private),
    );

    let kind = volume.volume_types().create(Value::Object(body)).await?;
    tracing::info!("created volume type {}", kind.id());

    if let Some(project) = &args.project {
        let project_id = commands::project_id(ctx, project, args.project_domain.as_deref()).await?;
        if let Err(e) = volume.add_type_access(kind.id(), &project_id).await {
            return Err(CommandError::new(format!("Failed to add project {} access to type: {}", project, e)).into());
        }
    }

    let specs = commands::properties(&args.properties);
    let kind = if specs.is_empty() {
        kind
    } else {
        volume.set_type_extra_specs(kind.id(), &specs).await?;
        volume.volume_types().get(kind.id()).await?
    };
    show_type(ctx, volume, kind).await
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let mut report = DeleteReport::new("volume type", args.volume_types.len());
    for name in &args.volume_types {
        let result: Result<(), CommandError> = async {
            let kind = utils::find_resource(volume.volume_types(), name).await?;
            volume.volume_types().delete(kind.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let kind = utils::find_resource(volume.volume_types(), &args.volume_type).await?;
    let mut failed = 0usize;

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    if !body.is_empty() {
        if let Err(e) = volume.volume_types().update(kind.id(), Value::Object(body)).await {
            tracing::error!("Failed to update volume type name or description: {}", e);
            failed += 1;
        }
    }

    let specs = commands::properties(&args.properties);
    if !specs.is_empty() {
        if let Err(e) = volume.set_type_extra_specs(kind.id(), &specs).await {
            tracing::error!("Failed to set volume type property: {}", e);
            failed += 1;
        }
    }

    if let Some(project) = &args.project {
        let project_id = commands::project_id(ctx, project, args.project_domain.as_deref()).await?;
        if let Err(e) = volume.add_type_access(kind.id(), &project_id).await {
            tracing::error!("Failed to set volume type access to project: {}", e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(CommandError::new("Command Failed: One or more of the operations failed").into());
    }
    Ok(())
}

async fn unset(args: UnsetArgs, ctx: &Context) -> Result<()> {
    let volume = ctx.clients.volume().await?;
    let kind = utils::find_resource(volume.volume_types(), &args.volume_type).await?;
    let mut failed = 0usize;

    for key in &args.properties {
        if let Err(e) = volume.delete_type_extra_spec(kind.id(), key).await {
            tracing::error!("Failed to unset volume type property {}: {}", key, e);
            failed += 1;
        }
    }

    if let Some(project) = &args.project {
        let project_id = commands::project_id(ctx, project, args.project_domain.as_deref()).await?;
        if let Err(e) = volume.remove_type_access(kind.id(), &project_id).await {
            tracing::error!("Failed to remove volume type access from project: {}", e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(CommandError::new("Command Failed: One or more of the operations failed").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_type() {
        let kind = Resource::from_value(json!({
            "id": "t1",
            "name": "ssd",
            "extra_specs": {"volume_backend_name": "fast"},
            "os-volume-type-access:is_public": false,
        }))
        .unwrap();
        let flat = flatten_type(kind);
        let row = utils::get_item_properties(&flat, &["Name", "Is Public", "Properties"], FORMATTERS, &[]);
        assert_eq!(row, vec![json!("ssd"), json!(false), json!("volume_backend_name='fast'")]);
    }
}
