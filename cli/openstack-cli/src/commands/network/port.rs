// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Port commands

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use openstack_client::{Manager, NetworkClient, Resource};
use serde_json::{Map, Value};

use super::{alias, common_attrs, project_id};
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::MultiKeyValueParser;
use crate::utils::{self, Formatter, format_admin_state, format_list, format_list_of_dicts};

const FIXED_IP_PARSER: MultiKeyValueParser = MultiKeyValueParser::new(&[], &["subnet", "ip-address"]);

const FORMATTERS: &[(&str, Formatter)] = &[
    ("admin_state_up", format_admin_state),
    ("fixed_ips", format_list_of_dicts),
    ("Fixed IP Addresses", format_list_of_dicts),
    ("security_group_ids", format_list),
    ("Security Groups", format_list),
    ("allowed_address_pairs", format_list_of_dicts),
    ("binding:profile", utils::format_dict),
    ("binding:vif_details", utils::format_dict),
    ("extra_dhcp_opts", format_list_of_dicts),
    ("tags", format_list),
    ("Tags", format_list),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum VnicType {
    Direct,
    DirectPhysical,
    Macvtap,
    Normal,
    Baremetal,
    VirtioForwarder,
}

#[derive(Subcommand, Clone)]
pub enum PortCommand {
    /// List ports
    List(ListArgs),
    /// Display port details
    Show(ShowArgs),
    /// Create a new port
    Create(CreateArgs),
    /// Delete port(s)
    Delete(DeleteArgs),
    /// Set port properties
    Set(SetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// List only ports attached to this network (name or ID)
    #[arg(long)]
    pub network: Option<String>,

    /// List only ports attached to this router (name or ID)
    #[arg(long, conflicts_with = "server")]
    pub router: Option<String>,

    /// List only ports attached to this server (name or ID)
    #[arg(long)]
    pub server: Option<String>,

    /// List only ports with the specified device owner
    #[arg(long)]
    pub device_owner: Option<String>,

    /// List only ports with this MAC address
    #[arg(long)]
    pub mac_address: Option<String>,

    /// Desired IP and/or subnet for filtering ports: subnet=<subnet>,ip-address=<ip-address>
    /// (repeat option to set multiple fixed IP addresses)
    #[arg(long = "fixed-ip", value_name = "subnet=SUBNET,ip-address=IP", value_parser = FIXED_IP_PARSER)]
    pub fixed_ips: Vec<BTreeMap<String, String>>,

    /// List ports according to their project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// List ports according to their name
    #[arg(long)]
    pub name: Option<String>,

    /// List ports according to their status ('ACTIVE', 'BUILD', 'DOWN')
    #[arg(long)]
    pub status: Option<String>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Port to display (name or ID)
    pub port: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// Name of this port
    pub name: String,

    /// Network this port belongs to (name or ID)
    #[arg(long)]
    pub network: String,

    /// Description of this port
    #[arg(long)]
    pub description: Option<String>,

    /// Port device ID
    #[arg(long)]
    pub device: Option<String>,

    /// Device owner of this port
    #[arg(long)]
    pub device_owner: Option<String>,

    /// MAC address of this port (admin only)
    #[arg(long)]
    pub mac_address: Option<String>,

    /// Desired IP and/or subnet for this port: subnet=<subnet>,ip-address=<ip-address>
    /// (repeat option to set multiple fixed IP addresses)
    #[arg(
        long = "fixed-ip",
        value_name = "subnet=SUBNET,ip-address=IP",
        value_parser = FIXED_IP_PARSER,
        conflicts_with = "no_fixed_ip"
    )]
    pub fixed_ips: Vec<BTreeMap<String, String>>,

    /// No IP or subnet for this port
    #[arg(long)]
    pub no_fixed_ip: bool,

    /// VNIC type for this port
    #[arg(long, value_enum)]
    pub vnic_type: Option<VnicType>,

    /// Allocate port on host (ID only)
    #[arg(long)]
    pub host: Option<String>,

    /// Enable port (default)
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable port
    #[arg(long)]
    pub disable: bool,

    /// Security group to associate with this port (name or ID)
    /// (repeat option to set multiple security groups)
    #[arg(long = "security-group", value_name = "SECURITY_GROUP", conflicts_with = "no_security_group")]
    pub security_groups: Vec<String>,

    /// Associate no security groups with this port
    #[arg(long)]
    pub no_security_group: bool,

    /// Enable port security for this port (default)
    #[arg(long, conflicts_with = "disable_port_security")]
    pub enable_port_security: bool,

    /// Disable port security for this port
    #[arg(long)]
    pub disable_port_security: bool,

    /// Owner's project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Port(s) to delete (name or ID)
    #[arg(required = true)]
    pub ports: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Port to modify (name or ID)
    pub port: String,

    /// Set port name
    #[arg(long)]
    pub name: Option<String>,

    /// Description of this port
    #[arg(long)]
    pub description: Option<String>,

    /// Port device ID
    #[arg(long)]
    pub device: Option<String>,

    /// Device owner of this port
    #[arg(long)]
    pub device_owner: Option<String>,

    /// Set the port's host binding (ID only)
    #[arg(long)]
    pub host: Option<String>,

    /// Desired IP and/or subnet for this port (repeat option to set multiple fixed IP addresses)
    #[arg(long = "fixed-ip", value_name = "subnet=SUBNET,ip-address=IP", value_parser = FIXED_IP_PARSER)]
    pub fixed_ips: Vec<BTreeMap<String, String>>,

    /// Clear existing fixed IPs before adding --fixed-ip
    #[arg(long)]
    pub no_fixed_ip: bool,

    /// Security group to associate with this port (repeat option to set multiple security groups)
    #[arg(long = "security-group", value_name = "SECURITY_GROUP")]
    pub security_groups: Vec<String>,

    /// Clear existing security groups before adding --security-group
    #[arg(long)]
    pub no_security_group: bool,

    /// Enable port
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable port
    #[arg(long)]
    pub disable: bool,

    /// Enable port security for this port
    #[arg(long, conflicts_with = "disable_port_security")]
    pub enable_port_security: bool,

    /// Disable port security for this port
    #[arg(long)]
    pub disable_port_security: bool,
}

impl PortCommand {
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

/// `fixed_ips` entries with subnet names resolved to IDs
async fn fixed_ips(network: &NetworkClient, items: &[BTreeMap<String, String>]) -> Result<Vec<Value>, CommandError> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let mut entry = Map::new();
        if let Some(subnet) = item.get("subnet") {
            let subnet = utils::find_resource(network.subnets(), subnet).await?;
            entry.insert("subnet_id".into(), Value::from(subnet.id()));
        }
        if let Some(ip) = item.get("ip-address") {
            entry.insert("ip_address".into(), Value::from(ip.as_str()));
        }
        out.push(Value::Object(entry));
    }
    Ok(out)
}

async fn security_group_ids(network: &NetworkClient, groups: &[String]) -> Result<Vec<Value>, CommandError> {
    let mut ids = Vec::with_capacity(groups.len());
    for group in groups {
        let sg = utils::find_resource(network.security_groups(), group).await?;
        ids.push(Value::from(sg.id()));
    }
    Ok(ids)
}

/// `ip_address=...` query values for `--fixed-ip` filters
fn fixed_ip_filters(fixed: &[Value]) -> Vec<String> {
    fixed
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|entry| {
            entry
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| format!("{}={}", k, v)))
                .collect::<Vec<_>>()
        })
        .collect()
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;

    let network_id = match &args.network {
        Some(n) => Some(utils::find_resource(network.networks(), n).await?.id().to_string()),
        None => None,
    };
    let device_id = match (&args.router, &args.server) {
        (Some(router), _) => Some(utils::find_resource(network.routers(), router).await?.id().to_string()),
        (None, Some(server)) => {
            let compute = ctx.clients.compute().await?;
            Some(utils::find_resource(compute.servers(), server).await?.id().to_string())
        }
        (None, None) => None,
    };

    let mut query = commands::query(&[
        ("network_id", network_id),
        ("device_id", device_id),
        ("device_owner", args.device_owner),
        ("mac_address", args.mac_address),
        ("project_id", project),
        ("name", args.name),
        ("status", args.status),
    ]);
    let fixed = fixed_ips(network, &args.fixed_ips).await?;
    for filter in fixed_ip_filters(&fixed) {
        query.push(("fixed_ips".to_string(), filter));
    }

    let ports: Vec<Resource> = network
        .ports()
        .list(&query)
        .await?
        .into_iter()
        .map(|mut p| {
            alias(&mut p, "fixed_ips", "fixed_ip_addresses");
            alias(&mut p, "security_groups", "security_group_ids");
            p
        })
        .collect();

    let columns: &[&str] = if args.long {
        &[
            "ID",
            "Name",
            "MAC Address",
            "Fixed IP Addresses",
            "Status",
            "Security Groups",
            "Device Owner",
            "Tags",
        ]
    } else {
        &["ID", "Name", "MAC Address", "Fixed IP Addresses", "Status"]
    };
    let rows = output::rows(&ports, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

fn show_port(ctx: &Context, mut port: Resource) -> Result<()> {
    if let Some(groups) = port.remove("security_groups") {
        port.insert("security_group_ids", groups);
    }
    output::show_resource(&ctx.format, &port, &[], FORMATTERS)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let port = utils::find_resource(network.ports(), &args.port).await?;
    show_port(ctx, port)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let net = utils::find_resource(network.networks(), &args.network).await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name));
    body.insert("network_id".into(), Value::from(net.id()));
    body.insert(
        "admin_state_up".into(),
        Value::Bool(commands::toggle(args.enable, args.disable).unwrap_or(true)),
    );
    commands::insert_opt(&mut body, "device_id", args.device);
    commands::insert_opt(&mut body, "device_owner", args.device_owner);
    commands::insert_opt(&mut body, "mac_address", args.mac_address);
    commands::insert_opt(&mut body, "binding:vnic_type", args.vnic_type.map(|v| v.to_string()));
    commands::insert_opt(&mut body, "binding:host_id", args.host);
    commands::insert_opt(
        &mut body,
        "port_security_enabled",
        commands::toggle(args.enable_port_security, args.disable_port_security),
    );

    if args.no_fixed_ip {
        body.insert("fixed_ips".into(), Value::Array(Vec::new()));
    } else if !args.fixed_ips.is_empty() {
        body.insert("fixed_ips".into(), Value::Array(fixed_ips(network, &args.fixed_ips).await?));
    }
    if args.no_security_group {
        body.insert("security_groups".into(), Value::Array(Vec::new()));
    } else if !args.security_groups.is_empty() {
        body.insert(
            "security_groups".into(),
            Value::Array(security_group_ids(network, &args.security_groups).await?),
        );
    }
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;
    common_attrs(&mut body, args.description, project);

    let port = network.ports().create(Value::Object(body)).await?;
    tracing::info!("created port {}", port.id());
    show_port(ctx, port)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let mut report = DeleteReport::new("port", args.ports.len());
    for name in &args.ports {
        let result: Result<(), CommandError> = async {
            let port = utils::find_resource(network.ports(), name).await?;
            network.ports().delete(port.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let port = utils::find_resource(network.ports(), &args.port).await?;

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    commands::insert_opt(&mut body, "device_id", args.device);
    commands::insert_opt(&mut body, "device_owner", args.device_owner);
    commands::insert_opt(&mut body, "binding:host_id", args.host);
    commands::insert_opt(&mut body, "admin_state_up", commands::toggle(args.enable, args.disable));
    commands::insert_opt(
        &mut body,
        "port_security_enabled",
        commands::toggle(args.enable_port_security, args.disable_port_security),
    );

    if args.no_fixed_ip || !args.fixed_ips.is_empty() {
        let mut ips: Vec<Value> = if args.no_fixed_ip {
            Vec::new()
        } else {
            port.get("fixed_ips").and_then(Value::as_array).cloned().unwrap_or_default()
        };
        ips.extend(fixed_ips(network, &args.fixed_ips).await?);
        body.insert("fixed_ips".into(), Value::Array(ips));
    }
    if args.no_security_group || !args.security_groups.is_empty() {
        let mut groups: Vec<Value> = if args.no_security_group {
            Vec::new()
        } else {
            port.get("security_groups").and_then(Value::as_array).cloned().unwrap_or_default()
        };
        for id in security_group_ids(network, &args.security_groups).await? {
            if !groups.contains(&id) {
                groups.push(id);
            }
        }
        body.insert("security_groups".into(), Value::Array(groups));
    }

    if body.is_empty() {
        tracing::debug!("nothing to set on port {}", port.id());
        return Ok(());
    }
    network.ports().update(port.id(), Value::Object(body)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_ip_filters() {
        let fixed = vec![json!({"subnet_id": "s1"}), json!({"ip_address": "10.0.0.6"})];
        assert_eq!(fixed_ip_filters(&fixed), vec!["subnet_id=s1", "ip_address=10.0.0.6"]);
    }

    #[test]
    fn test_fixed_ip_parser_rejects_unknown_keys() {
        assert!(FIXED_IP_PARSER.parse_str("subnet=s1,ip=10.0.0.5").is_err());
        assert!(FIXED_IP_PARSER.parse_str("ip-address=10.0.0.5").is_ok());
    }

    #[test]
    fn test_vnic_type_names() {
        assert_eq!(VnicType::DirectPhysical.to_string(), "direct-physical");
        assert_eq!(VnicType::Normal.to_string(), "normal");
    }
}
