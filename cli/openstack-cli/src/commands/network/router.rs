// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Router commands

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_client::{Manager, NetworkClient, Resource, RouterInterface};
use serde_json::{Map, Value, json};

use super::{alias, common_attrs, project_id};
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::MultiKeyValueParser;
use crate::utils::{self, Formatter, format_admin_state, format_dict, format_list, format_list_of_dicts};

const ROUTE_PARSER: MultiKeyValueParser = MultiKeyValueParser::new(&["destination", "gateway"], &[]);

const FORMATTERS: &[(&str, Formatter)] = &[
    ("admin_state_up", format_admin_state),
    ("State", format_admin_state),
    ("external_gateway_info", format_dict),
    ("External gateway info", format_dict),
    ("routes", format_list_of_dicts),
    ("Routes", format_list_of_dicts),
    ("availability_zones", format_list),
    ("Availability zones", format_list),
    ("availability_zone_hints", format_list),
    ("tags", format_list),
];

#[derive(Subcommand, Clone)]
pub enum RouterCommand {
    /// List routers
    List(ListArgs),
    /// Display router details
    Show(ShowArgs),
    /// Create a new router
    Create(CreateArgs),
    /// Delete router(s)
    Delete(DeleteArgs),
    /// Set router properties
    Set(SetArgs),
    /// Add a subnet or port to a router
    #[command(subcommand)]
    Add(InterfaceCommand),
    /// Remove a subnet or port from a router
    #[command(subcommand)]
    Remove(InterfaceCommand),
}

#[derive(Subcommand, Clone)]
pub enum InterfaceCommand {
    /// Attach a subnet
    Subnet(SubnetInterfaceArgs),
    /// Attach a port
    Port(PortInterfaceArgs),
}

#[derive(Args, Clone)]
pub struct SubnetInterfaceArgs {
    /// Router (name or ID)
    pub router: String,

    /// Subnet (name or ID)
    pub subnet: String,
}

#[derive(Args, Clone)]
pub struct PortInterfaceArgs {
    /// Router (name or ID)
    pub router: String,

    /// Port (name or ID)
    pub port: String,
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// List routers according to their name
    #[arg(long)]
    pub name: Option<String>,

    /// List enabled routers
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// List disabled routers
    #[arg(long)]
    pub disable: bool,

    /// List routers according to their project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Router to display (name or ID)
    pub router: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New router name
    pub name: String,

    /// Enable router (default)
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable router
    #[arg(long)]
    pub disable: bool,

    /// Create a distributed router
    #[arg(long, conflicts_with = "centralized")]
    pub distributed: bool,

    /// Create a centralized router
    #[arg(long)]
    pub centralized: bool,

    /// Create a highly available router
    #[arg(long, conflicts_with = "no_ha")]
    pub ha: bool,

    /// Create a legacy router
    #[arg(long)]
    pub no_ha: bool,

    /// Set router description
    #[arg(long)]
    pub description: Option<String>,

    /// Owner's project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Availability Zone in which to create this router (repeat option to set multiple)
    #[arg(long = "availability-zone-hint", value_name = "AVAILABILITY_ZONE")]
    pub availability_zone_hints: Vec<String>,

    /// External Network used as router's gateway (name or ID)
    #[arg(long, value_name = "NETWORK")]
    pub external_gateway: Option<String>,

    /// Enable Source NAT on external gateway
    #[arg(long, requires = "external_gateway", conflicts_with = "disable_snat")]
    pub enable_snat: bool,

    /// Disable Source NAT on external gateway
    #[arg(long, requires = "external_gateway")]
    pub disable_snat: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Router(s) to delete (name or ID)
    #[arg(required = true)]
    pub routers: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Router to modify (name or ID)
    pub router: String,

    /// Set router name
    #[arg(long)]
    pub name: Option<String>,

    /// Set router description
    #[arg(long)]
    pub description: Option<String>,

    /// Enable router
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable router
    #[arg(long)]
    pub disable: bool,

    /// Set router to distributed mode (disabled router only)
    #[arg(long, conflicts_with = "centralized")]
    pub distributed: bool,

    /// Set router to centralized mode (disabled router only)
    #[arg(long)]
    pub centralized: bool,

    /// Add routes to the router: destination=<subnet>,gateway=<ip-address>
    /// (repeat option to add multiple routes)
    #[arg(long = "route", value_name = "destination=SUBNET,gateway=IP", value_parser = ROUTE_PARSER)]
    pub routes: Vec<BTreeMap<String, String>>,

    /// Clear routes associated with the router before adding --route
    #[arg(long)]
    pub no_route: bool,

    /// External Network used as router's gateway (name or ID)
    #[arg(long, value_name = "NETWORK", conflicts_with = "no_external_gateway")]
    pub external_gateway: Option<String>,

    /// Remove the external gateway from the router
    #[arg(long)]
    pub no_external_gateway: bool,

    /// Enable Source NAT on external gateway
    #[arg(long, requires = "external_gateway", conflicts_with = "disable_snat")]
    pub enable_snat: bool,

    /// Disable Source NAT on external gateway
    #[arg(long, requires = "external_gateway")]
    pub disable_snat: bool,
}

impl RouterCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Set(args) => set(args, ctx).await,
            Self::Add(cmd) => interface(cmd, ctx, true).await,
            Self::Remove(cmd) => interface(cmd, ctx, false).await,
        }
    }
}

/// `external_gateway_info` for `--external-gateway` and the SNAT switches
async fn gateway_info(network: &NetworkClient, gateway: &str, snat: Option<bool>) -> Result<Value, CommandError> {
    let net = utils::find_resource(network.networks(), gateway).await?;
    let mut info = Map::new();
    info.insert("network_id".into(), Value::from(net.id()));
    commands::insert_opt(&mut info, "enable_snat", snat);
    Ok(Value::Object(info))
}

/// Neutron `routes` entries from `--route` values
fn routes(items: &[BTreeMap<String, String>]) -> Vec<Value> {
    items
        .iter()
        .map(|r| {
            json!({
                "destination": r.get("destination").cloned().unwrap_or_default(),
                "nexthop": r.get("gateway").cloned().unwrap_or_default(),
            })
        })
        .collect()
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;

    let query = commands::query(&[
        ("name", args.name),
        (
            "admin_state_up",
            commands::toggle(args.enable, args.disable).map(|b| b.to_string()),
        ),
        ("project_id", project),
    ]);

    let routers: Vec<Resource> = network
        .routers()
        .list(&query)
        .await?
        .into_iter()
        .map(|mut r| {
            alias(&mut r, "admin_state_up", "state");
            alias(&mut r, "project_id", "project");
            r
        })
        .collect();

    let columns: &[&str] = if args.long {
        &[
            "ID",
            "Name",
            "Status",
            "State",
            "Project",
            "Distributed",
            "HA",
            "Routes",
            "External gateway info",
            "Availability zones",
        ]
    } else {
        &["ID", "Name", "Status", "State", "Project", "Distributed", "HA"]
    };
    let rows = output::rows(&routers, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let router = utils::find_resource(network.routers(), &args.router).await?;
    output::show_resource(&ctx.format, &router, &[], FORMATTERS)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name));
    body.insert(
        "admin_state_up".into(),
        Value::Bool(commands::toggle(args.enable, args.disable).unwrap_or(true)),
    );
    commands::insert_opt(&mut body, "distributed", commands::toggle(args.distributed, args.centralized));
    commands::insert_opt(&mut body, "ha", commands::toggle(args.ha, args.no_ha));
    if !args.availability_zone_hints.is_empty() {
        body.insert(
            "availability_zone_hints".into(),
            Value::from(args.availability_zone_hints),
        );
    }
    if let Some(gateway) = &args.external_gateway {
        let snat = commands::toggle(args.enable_snat, args.disable_snat);
        body.insert("external_gateway_info".into(), gateway_info(network, gateway, snat).await?);
    }
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;
    common_attrs(&mut body, args.description, project);

    let router = network.routers().create(Value::Object(body)).await?;
    tracing::info!("created router {}", router.id());
    output::show_resource(&ctx.format, &router, &[], FORMATTERS)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let mut report = DeleteReport::new("router", args.routers.len());
    for name in &args.routers {
        let result: Result<(), CommandError> = async {
            let router = utils::find_resource(network.routers(), name).await?;
            network.routers().delete(router.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let router = utils::find_resource(network.routers(), &args.router).await?;

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    commands::insert_opt(&mut body, "admin_state_up", commands::toggle(args.enable, args.disable));
    commands::insert_opt(&mut body, "distributed", commands::toggle(args.distributed, args.centralized));

    if args.no_route || !args.routes.is_empty() {
        let mut current: Vec<Value> = if args.no_route {
            Vec::new()
        } else {
            router.get("routes").and_then(Value::as_array).cloned().unwrap_or_default()
        };
        current.extend(routes(&args.routes));
        body.insert("routes".into(), Value::Array(current));
    }

    if args.no_external_gateway {
        body.insert("external_gateway_info".into(), json!({}));
    } else if let Some(gateway) = &args.external_gateway {
        let snat = commands::toggle(args.enable_snat, args.disable_snat);
        body.insert("external_gateway_info".into(), gateway_info(network, gateway, snat).await?);
    }

    if body.is_empty() {
        tracing::debug!("nothing to set on router {}", router.id());
        return Ok(());
    }
    network.routers().update(router.id(), Value::Object(body)).await?;
    Ok(())
}

/// `router add|remove subnet|port`
async fn interface(cmd: InterfaceCommand, ctx: &Context, add: bool) -> Result<()> {
    let network = ctx.clients.network().await?;
    let (router, target) = match cmd {
        InterfaceCommand::Subnet(args) => {
            let subnet = utils::find_resource(network.subnets(), &args.subnet).await?;
            (args.router, RouterInterface::Subnet(subnet.id().to_string()))
        }
        InterfaceCommand::Port(args) => {
            let port = utils::find_resource(network.ports(), &args.port).await?;
            (args.router, RouterInterface::Port(port.id().to_string()))
        }
    };
    let router = utils::find_resource(network.routers(), &router).await?;

    if add {
        network.add_router_interface(router.id(), &target).await?;
    } else {
        network.remove_router_interface(router.id(), &target).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_use_nexthop() {
        let parsed = ROUTE_PARSER.parse_str("destination=0.0.0.0/0,gateway=10.0.0.1").unwrap();
        assert_eq!(
            routes(&[parsed]),
            vec![json!({"destination": "0.0.0.0/0", "nexthop": "10.0.0.1"})]
        );
    }

    #[test]
    fn test_list_columns() {
        let mut router = Resource::from_value(json!({
            "id": "r1",
            "name": "edge",
            "status": "ACTIVE",
            "admin_state_up": false,
            "distributed": false,
            "ha": true,
        }))
        .unwrap();
        alias(&mut router, "admin_state_up", "state");
        let row = utils::get_item_properties(&router, &["State", "Distributed", "HA"], FORMATTERS, &[]);
        assert_eq!(row, vec![json!("DOWN"), json!(false), json!(true)]);
    }
}
