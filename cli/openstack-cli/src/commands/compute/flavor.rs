// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Flavor commands

use anyhow::Result;
use clap::Args;
use clap::Subcommand;
use openstack_client::{ComputeClient, Manager, Resource};
use serde_json::{Map, Value, json};

use super::microversion_at_least;
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::{KeyValue, parse_key_value, parse_non_negative};
use crate::utils::{self, format_dict};

#[derive(Subcommand, Clone)]
pub enum FlavorCommand {
    /// List flavors
    List(ListArgs),
    /// Display flavor details
    Show(ShowArgs),
    /// Create new flavor
    Create(CreateArgs),
    /// Delete flavor(s)
    Delete(DeleteArgs),
    /// Set flavor properties
    Set(SetArgs),
    /// Unset flavor properties
    Unset(UnsetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// List only public flavors (default)
    #[arg(long, conflicts_with_all = ["private", "all"])]
    pub public: bool,

    /// List only private flavors
    #[arg(long, conflicts_with = "all")]
    pub private: bool,

    /// List all flavors, whether public or private
    #[arg(long)]
    pub all: bool,

    /// Filters the flavors by a minimum disk space, in GB
    #[arg(long, value_name = "MIN_DISK")]
    pub min_disk: Option<u64>,

    /// Filters the flavors by a minimum RAM, in MB
    #[arg(long, value_name = "MIN_RAM")]
    pub min_ram: Option<u64>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,

    /// The last flavor ID of the previous page
    #[arg(long)]
    pub marker: Option<String>,

    /// Maximum number of flavors to display
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Flavor to display (name or ID)
    pub flavor: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New flavor name
    pub name: String,

    /// Unique flavor ID; 'auto' creates a UUID
    #[arg(long, default_value = "auto")]
    pub id: String,

    /// Memory size in MB
    #[arg(long, default_value_t = 256, value_parser = parse_non_negative)]
    pub ram: u64,

    /// Disk size in GB
    #[arg(long, default_value_t = 0, value_parser = parse_non_negative)]
    pub disk: u64,

    /// Ephemeral disk size in GB
    #[arg(long, default_value_t = 0, value_parser = parse_non_negative)]
    pub ephemeral: u64,

    /// Additional swap space size in MB
    #[arg(long, default_value_t = 0, value_parser = parse_non_negative)]
    pub swap: u64,

    /// Number of vcpus
    #[arg(long, default_value_t = 1, value_parser = parse_non_negative)]
    pub vcpus: u64,

    /// RX/TX factor
    #[arg(long, default_value_t = 1.0)]
    pub rxtx_factor: f64,

    /// Flavor is available to other projects (default)
    #[arg(long, conflicts_with = "private")]
    pub public: bool,

    /// Flavor is not available to other projects
    #[arg(long)]
    pub private: bool,

    /// Property to add for this flavor (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// Allow the project to access the flavor (admin only, name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Description for the flavor (compute API 2.55 or later)
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Flavor(s) to delete (name or ID)
    #[arg(required = true)]
    pub flavors: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Flavor to modify (name or ID)
    pub flavor: String,

    /// Property to add or modify for this flavor (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// Remove all properties from this flavor before setting new ones
    #[arg(long)]
    pub no_property: bool,

    /// Set flavor access to project (admin only, name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Set description for the flavor (compute API 2.55 or later)
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Clone)]
pub struct UnsetArgs {
    /// Flavor to modify (name or ID)
    pub flavor: String,

    /// Property to remove from flavor (repeat option to unset multiple properties)
    #[arg(long = "property", value_name = "KEY")]
    pub properties: Vec<String>,

    /// Remove flavor access from project (admin only, name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,
}

impl FlavorCommand {
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

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;

    let is_public = if args.all {
        "none"
    } else if args.private {
        "false"
    } else {
        "true"
    };
    let query = commands::query(&[
        ("is_public", Some(is_public.to_string())),
        ("minDisk", args.min_disk.map(|d| d.to_string())),
        ("minRam", args.min_ram.map(|r| r.to_string())),
        ("marker", args.marker),
        ("limit", args.limit.map(|l| l.to_string())),
    ]);

    let mut flavors = Vec::new();
    for flavor in compute.flavors().list(&query).await? {
        let mut flavor = flatten_flavor(flavor);
        if args.long && flavor.get("properties").is_none() {
            let specs = compute.flavor_extra_specs(flavor.id()).await?;
            flavor.insert("properties", Value::Object(specs));
        }
        flavors.push(flavor);
    }

    let columns: &[&str] = if args.long {
        &[
            "ID",
            "Name",
            "RAM",
            "Disk",
            "Ephemeral",
            "VCPUs",
            "Is Public",
            "Swap",
            "RXTX Factor",
            "Properties",
        ]
    } else {
        &["ID", "Name", "RAM", "Disk", "Ephemeral", "VCPUs", "Is Public"]
    };
    let rows = output::rows(&flavors, columns, &[("Properties", format_dict)], &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

/// Plain names for the extension attributes
fn flatten_flavor(mut flavor: Resource) -> Resource {
    for (from, to) in [
        ("OS-FLV-EXT-DATA:ephemeral", "ephemeral"),
        ("os-flavor-access:is_public", "is_public"),
        ("OS-FLV-DISABLED:disabled", "disabled"),
        ("extra_specs", "properties"),
    ] {
        if let Some(v) = flavor.remove(from) {
            flavor.insert(to, v);
        }
    }
    flavor
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let flavor = utils::find_resource(compute.flavors(), &args.flavor).await?;
    let flavor = with_properties(compute, flavor).await?;
    show_flavor(ctx, &flavor)
}

/// Flavor with extra specs as `properties`, fetched when the
/// microversion does not embed them
async fn with_properties(compute: &ComputeClient, flavor: Resource) -> Result<Resource> {
    let mut flavor = flatten_flavor(flavor);
    if flavor.get("properties").is_none() {
        let specs = compute.flavor_extra_specs(flavor.id()).await?;
        flavor.insert("properties", Value::Object(specs));
    }
    Ok(flavor)
}

fn show_flavor(ctx: &Context, flavor: &Resource) -> Result<()> {
    output::show_resource(&ctx.format, flavor, &["links"], &[("properties", format_dict)])
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    if args.project.is_some() && !args.private {
        return Err(CommandError::new("--project is only allowed with --private").into());
    }

    let compute = ctx.clients.compute().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name.clone()));
    body.insert("ram".into(), Value::from(args.ram));
    body.insert("vcpus".into(), Value::from(args.vcpus));
    body.insert("disk".into(), Value::from(args.disk));
    body.insert("swap".into(), Value::from(args.swap));
    body.insert("OS-FLV-EXT-DATA:ephemeral".into(), Value::from(args.ephemeral));
    body.insert("rxtx_factor".into(), Value::from(args.rxtx_factor));
    body.insert("os-flavor-access:is_public".into(), Value::Bool(!args.private));
    let id = if args.id == "auto" {
        Value::Null
    } else {
        Value::from(args.id.clone())
    };
    body.insert("id".into(), id);
    if let Some(description) = &args.description {
        require_description_support(compute)?;
        body.insert("description".into(), Value::from(description.as_str()));
    }

    let flavor = compute.flavors().create(Value::Object(body)).await?;
    tracing::info!("created flavor {}", flavor.id());

    if let Some(project) = &args.project {
        let project_id = commands::project_id(ctx, project, args.project_domain.as_deref()).await?;
        compute.add_flavor_access(flavor.id(), &project_id).await?;
    }

    let specs = commands::properties(&args.properties);
    if !specs.is_empty() {
        compute.set_flavor_extra_specs(flavor.id(), &specs).await?;
    }

    let flavor = with_properties(compute, flavor).await?;
    show_flavor(ctx, &flavor)
}

fn require_description_support(compute: &ComputeClient) -> Result<(), CommandError> {
    if microversion_at_least(compute.version(), 2, 55) {
        Ok(())
    } else {
        Err(CommandError::new(
            "--os-compute-api-version 2.55 or later is required to support the --description option",
        ))
    }
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let mut report = DeleteReport::new("flavor", args.flavors.len());
    for name in &args.flavors {
        let result: Result<(), CommandError> = async {
            let flavor = utils::find_resource(compute.flavors(), name).await?;
            compute.flavors().delete(flavor.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let flavor = utils::find_resource(compute.flavors(), &args.flavor).await?;
    let id = flavor.id();

    let mut failures = Vec::new();

    if args.no_property {
        match compute.flavor_extra_specs(id).await {
            Ok(existing) => {
                for key in existing.keys() {
                    if let Err(e) = compute.delete_flavor_extra_spec(id, key).await {
                        tracing::error!("Failed to clear flavor property {}: {}", key, e);
                        failures.push("properties");
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to clear flavor properties: {}", e);
                failures.push("properties");
            }
        }
    }

    let specs = commands::properties(&args.properties);
    if !specs.is_empty() {
        if let Err(e) = compute.set_flavor_extra_specs(id, &specs).await {
            tracing::error!("Failed to set flavor property: {}", e);
            failures.push("properties");
        }
    }

    if let Some(project) = &args.project {
        if flavor.get("os-flavor-access:is_public").and_then(Value::as_bool) == Some(true) {
            return Err(CommandError::new("Cannot set access for a public flavor").into());
        }
        let project_id = commands::project_id(ctx, project, args.project_domain.as_deref()).await?;
        if let Err(e) = compute.add_flavor_access(id, &project_id).await {
            tracing::error!("Failed to set flavor access to project: {}", e);
            failures.push("access");
        }
    }

    if let Some(description) = args.description {
        require_description_support(compute)?;
        compute
            .flavors()
            .update(id, json!({ "description": description }))
            .await?;
    }

    if failures.is_empty() {
        Ok(())
    } else {
        failures.dedup();
        Err(CommandError::new(format!(
            "Set flavor {} failed for: {}",
            failures.join(", "),
            flavor.name()
        ))
        .into())
    }
}

async fn unset(args: UnsetArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let flavor = utils::find_resource(compute.flavors(), &args.flavor).await?;
    let id = flavor.id();

    let mut failed = false;
    for key in &args.properties {
        if let Err(e) = compute.delete_flavor_extra_spec(id, key).await {
            tracing::error!("Failed to unset flavor property {}: {}", key, e);
            failed = true;
        }
    }

    if let Some(project) = &args.project {
        let project_id = commands::project_id(ctx, project, args.project_domain.as_deref()).await?;
        if let Err(e) = compute.remove_flavor_access(id, &project_id).await {
            tracing::error!("Failed to remove flavor access from project: {}", e);
            failed = true;
        }
    }

    if failed {
        return Err(CommandError::new("Unset flavor failed").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flatten_flavor() {
        let flavor = Resource::from_value(json!({
            "id": "1",
            "OS-FLV-EXT-DATA:ephemeral": 10,
            "os-flavor-access:is_public": true,
            "extra_specs": {"hw:cpu_policy": "dedicated"}
        }))
        .unwrap();
        let flat = flatten_flavor(flavor);
        assert_eq!(flat.get("ephemeral"), Some(&json!(10)));
        assert_eq!(flat.get("is_public"), Some(&json!(true)));
        assert_eq!(flat.get("properties"), Some(&json!({"hw:cpu_policy": "dedicated"})));
        assert!(flat.get("extra_specs").is_none());
    }
}
