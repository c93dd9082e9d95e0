// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Network commands

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_client::{Manager, Resource};
use serde_json::{Map, Value};

use super::{alias, common_attrs, project_id};
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::utils::{self, Formatter, format_admin_state, format_list};

const FORMATTERS: &[(&str, Formatter)] = &[
    ("admin_state_up", format_admin_state),
    ("State", format_admin_state),
    ("subnets", format_list),
    ("Subnets", format_list),
    ("availability_zones", format_list),
    ("Availability Zones", format_list),
    ("availability_zone_hints", format_list),
    ("tags", format_list),
];

#[derive(Subcommand, Clone)]
pub enum NetworkCommand {
    /// List networks
    List(ListArgs),
    /// Show network details
    Show(ShowArgs),
    /// Create new network
    Create(CreateArgs),
    /// Delete network(s)
    Delete(DeleteArgs),
    /// Set network properties
    Set(SetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// List external networks
    #[arg(long, conflicts_with = "internal")]
    pub external: bool,

    /// List internal networks
    #[arg(long)]
    pub internal: bool,

    /// List networks according to their name
    #[arg(long)]
    pub name: Option<String>,

    /// List networks according to their status ('ACTIVE', 'BUILD', 'DOWN', 'ERROR')
    #[arg(long)]
    pub status: Option<String>,

    /// List networks according to their project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// List networks shared between projects
    #[arg(long, conflicts_with = "no_share")]
    pub share: bool,

    /// List networks not shared between projects
    #[arg(long)]
    pub no_share: bool,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Network to display (name or ID)
    pub network: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New network name
    pub name: String,

    /// Enable network (default)
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable network
    #[arg(long)]
    pub disable: bool,

    /// Share the network between projects
    #[arg(long, conflicts_with = "no_share")]
    pub share: bool,

    /// Do not share the network between projects
    #[arg(long)]
    pub no_share: bool,

    /// Set network description
    #[arg(long)]
    pub description: Option<String>,

    /// Set network mtu
    #[arg(long)]
    pub mtu: Option<u32>,

    /// Owner's project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Availability Zone in which to create this network (repeat option to set multiple)
    #[arg(long = "availability-zone-hint", value_name = "AVAILABILITY_ZONE")]
    pub availability_zone_hints: Vec<String>,

    /// Set this network as an external network (external-net extension required)
    #[arg(long, conflicts_with = "internal")]
    pub external: bool,

    /// Set this network as an internal network (default)
    #[arg(long)]
    pub internal: bool,

    /// The physical mechanism by which the virtual network is implemented
    #[arg(long, value_name = "PROVIDER_NETWORK_TYPE")]
    pub provider_network_type: Option<String>,

    /// Name of the physical network over which the virtual network is implemented
    #[arg(long, value_name = "PROVIDER_PHYSICAL_NETWORK")]
    pub provider_physical_network: Option<String>,

    /// VLAN ID for VLAN networks or Tunnel ID for GENEVE/GRE/VXLAN networks
    #[arg(long, value_name = "PROVIDER_SEGMENT")]
    pub provider_segment: Option<u32>,

    /// Enable port security by default for ports created on this network (default)
    #[arg(long, conflicts_with = "disable_port_security")]
    pub enable_port_security: bool,

    /// Disable port security by default for ports created on this network
    #[arg(long)]
    pub disable_port_security: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Network(s) to delete (name or ID)
    #[arg(required = true)]
    pub networks: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Network to modify (name or ID)
    pub network: String,

    /// Set network name
    #[arg(long)]
    pub name: Option<String>,

    /// Enable network
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable network
    #[arg(long)]
    pub disable: bool,

    /// Share the network between projects
    #[arg(long, conflicts_with = "no_share")]
    pub share: bool,

    /// Do not share the network between projects
    #[arg(long)]
    pub no_share: bool,

    /// Set network description
    #[arg(long)]
    pub description: Option<String>,

    /// Set network mtu
    #[arg(long)]
    pub mtu: Option<u32>,

    /// Set this network as an external network
    #[arg(long, conflicts_with = "internal")]
    pub external: bool,

    /// Set this network as an internal network
    #[arg(long)]
    pub internal: bool,

    /// Enable port security by default for ports created on this network
    #[arg(long, conflicts_with = "disable_port_security")]
    pub enable_port_security: bool,

    /// Disable port security by default for ports created on this network
    #[arg(long)]
    pub disable_port_security: bool,
}

impl NetworkCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Set(args) => set(args, ctx).await,
        }
    }
}

/// Column keys for list output
fn flatten_network(mut network: Resource) -> Resource {
    alias(&mut network, "project_id", "project");
    alias(&mut network, "admin_state_up", "state");
    alias(&mut network, "provider:network_type", "network_type");
    let router_type = match network.get("router:external").and_then(Value::as_bool) {
        Some(true) => "External",
        _ => "Internal",
    };
    network.insert("router_type", Value::from(router_type));
    network
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;

    let external = commands::toggle(args.external, args.internal);
    let shared = commands::toggle(args.share, args.no_share);
    let query = commands::query(&[
        ("name", args.name),
        ("status", args.status),
        ("project_id", project),
        ("router:external", external.map(|b| b.to_string())),
        ("shared", shared.map(|b| b.to_string())),
    ]);

    let networks: Vec<Resource> = network
        .networks()
        .list(&query)
        .await?
        .into_iter()
        .map(flatten_network)
        .collect();

    let columns: &[&str] = if args.long {
        &[
            "ID",
            "Name",
            "Status",
            "Project",
            "State",
            "Shared",
            "Subnets",
            "Network Type",
            "Router Type",
            "Availability Zones",
        ]
    } else {
        &["ID", "Name", "Subnets"]
    };
    let rows = output::rows(&networks, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let found = utils::find_resource(network.networks(), &args.network).await?;
    output::show_resource(&ctx.format, &found, &[], FORMATTERS)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name));
    body.insert(
        "admin_state_up".into(),
        Value::Bool(commands::toggle(args.enable, args.disable).unwrap_or(true)),
    );
    commands::insert_opt(&mut body, "shared", commands::toggle(args.share, args.no_share));
    commands::insert_opt(&mut body, "mtu", args.mtu);
    commands::insert_opt(
        &mut body,
        "port_security_enabled",
        commands::toggle(args.enable_port_security, args.disable_port_security),
    );
    commands::insert_opt(&mut body, "router:external", commands::toggle(args.external, args.internal));
    commands::insert_opt(&mut body, "provider:network_type", args.provider_network_type);
    commands::insert_opt(&mut body, "provider:physical_network", args.provider_physical_network);
    commands::insert_opt(&mut body, "provider:segmentation_id", args.provider_segment);
    if !args.availability_zone_hints.is_empty() {
        body.insert(
            "availability_zone_hints".into(),
            Value::from(args.availability_zone_hints),
        );
    }
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;
    common_attrs(&mut body, args.description, project);

    let created = network.networks().create(Value::Object(body)).await?;
    tracing::info!("created network {}", created.id());
    output::show_resource(&ctx.format, &created, &[], FORMATTERS)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let mut report = DeleteReport::new("network", args.networks.len());
    for name in &args.networks {
        let result: Result<(), CommandError> = async {
            let found = utils::find_resource(network.networks(), name).await?;
            network.networks().delete(found.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let found = utils::find_resource(network.networks(), &args.network).await?;

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    commands::insert_opt(&mut body, "mtu", args.mtu);
    commands::insert_opt(&mut body, "admin_state_up", commands::toggle(args.enable, args.disable));
    commands::insert_opt(&mut body, "shared", commands::toggle(args.share, args.no_share));
    commands::insert_opt(&mut body, "router:external", commands::toggle(args.external, args.internal));
    commands::insert_opt(
        &mut body,
        "port_security_enabled",
        commands::toggle(args.enable_port_security, args.disable_port_security),
    );

    if body.is_empty() {
        tracing::debug!("nothing to set on network {}", found.id());
        return Ok(());
    }
    network.networks().update(found.id(), Value::Object(body)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_network_columns() {
        let net = Resource::from_value(json!({
            "id": "n1",
            "name": "public",
            "project_id": "p1",
            "admin_state_up": true,
            "router:external": true,
            "provider:network_type": "flat",
            "subnets": ["s2", "s1"],
        }))
        .unwrap();

        let row = utils::get_item_properties(
            &flatten_network(net),
            &["Project", "State", "Subnets", "Network Type", "Router Type"],
            FORMATTERS,
            &[],
        );
        assert_eq!(
            row,
            vec![json!("p1"), json!("UP"), json!("s1, s2"), json!("flat"), json!("External")]
        );
    }
}
