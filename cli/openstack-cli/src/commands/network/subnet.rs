// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Subnet commands

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_client::{Manager, Resource};
use serde_json::{Map, Value, json};

use super::{alias, common_attrs, project_id};
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::MultiKeyValueParser;
use crate::utils::{self, Formatter, format_list};

const POOL_PARSER: MultiKeyValueParser = MultiKeyValueParser::new(&["start", "end"], &[]);
const ROUTE_PARSER: MultiKeyValueParser = MultiKeyValueParser::new(&["destination", "gateway"], &[]);

const FORMATTERS: &[(&str, Formatter)] = &[
    ("allocation_pools", format_allocation_pools),
    ("Allocation Pools", format_allocation_pools),
    ("host_routes", format_host_routes),
    ("Host Routes", format_host_routes),
    ("dns_nameservers", format_list),
    ("Name Servers", format_list),
    ("service_types", format_list),
    ("tags", format_list),
];

#[derive(Subcommand, Clone)]
pub enum SubnetCommand {
    /// List subnets
    List(ListArgs),
    /// Display subnet details
    Show(ShowArgs),
    /// Create a subnet
    Create(CreateArgs),
    /// Delete subnet(s)
    Delete(DeleteArgs),
    /// Set subnet properties
    Set(SetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// List only subnets of given IP version in output
    #[arg(long, value_parser = ["4", "6"])]
    pub ip_version: Option<String>,

    /// List subnets which have DHCP enabled
    #[arg(long, conflicts_with = "no_dhcp")]
    pub dhcp: bool,

    /// List subnets which have DHCP disabled
    #[arg(long)]
    pub no_dhcp: bool,

    /// List only subnets which belong to a given network (name or ID)
    #[arg(long)]
    pub network: Option<String>,

    /// List only subnets which belong to a given project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// List only subnets of given name in output
    #[arg(long)]
    pub name: Option<String>,

    /// List only subnets of given subnet range (in CIDR notation) in output
    #[arg(long)]
    pub subnet_range: Option<String>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Subnet to display (name or ID)
    pub subnet: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New subnet name
    pub name: String,

    /// Network this subnet belongs to (name or ID)
    #[arg(long)]
    pub network: String,

    /// Subnet range in CIDR notation
    #[arg(long)]
    pub subnet_range: Option<String>,

    /// Use default subnet pool for --ip-version
    #[arg(long)]
    pub use_default_subnet_pool: bool,

    /// Prefix length for subnet allocation from subnet pool
    #[arg(long)]
    pub prefix_length: Option<u8>,

    /// IP version (default is 4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(4..=6), default_value_t = 4)]
    pub ip_version: u8,

    /// Specify a gateway for the subnet: 'auto', 'none' or an IP address
    #[arg(long, default_value = "auto")]
    pub gateway: String,

    /// Enable DHCP (default)
    #[arg(long, conflicts_with = "no_dhcp")]
    pub dhcp: bool,

    /// Disable DHCP
    #[arg(long)]
    pub no_dhcp: bool,

    /// Allocation pool IP addresses for this subnet e.g.: start=192.168.199.2,end=192.168.199.254
    /// (repeat option to add multiple IP addresses)
    #[arg(long = "allocation-pool", value_name = "start=IP,end=IP", value_parser = POOL_PARSER)]
    pub allocation_pools: Vec<BTreeMap<String, String>>,

    /// DNS server for this subnet (repeat option to set multiple DNS servers)
    #[arg(long = "dns-nameserver", value_name = "DNS_NAMESERVER")]
    pub dns_nameservers: Vec<String>,

    /// Additional route for this subnet e.g.: destination=10.10.0.0/16,gateway=192.168.71.254
    /// (repeat option to add multiple routes)
    #[arg(long = "host-route", value_name = "destination=SUBNET,gateway=IP", value_parser = ROUTE_PARSER)]
    pub host_routes: Vec<BTreeMap<String, String>>,

    /// IPv6 RA (Router Advertisement) mode
    #[arg(long, value_parser = ["dhcpv6-stateful", "dhcpv6-stateless", "slaac"])]
    pub ipv6_ra_mode: Option<String>,

    /// IPv6 address mode
    #[arg(long, value_parser = ["dhcpv6-stateful", "dhcpv6-stateless", "slaac"])]
    pub ipv6_address_mode: Option<String>,

    /// Set subnet description
    #[arg(long)]
    pub description: Option<String>,

    /// Owner's project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Subnet(s) to delete (name or ID)
    #[arg(required = true)]
    pub subnets: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Subnet to modify (name or ID)
    pub subnet: String,

    /// Updated name of the subnet
    #[arg(long)]
    pub name: Option<String>,

    /// Set subnet description
    #[arg(long)]
    pub description: Option<String>,

    /// Enable DHCP
    #[arg(long, conflicts_with = "no_dhcp")]
    pub dhcp: bool,

    /// Disable DHCP
    #[arg(long)]
    pub no_dhcp: bool,

    /// Specify a gateway for the subnet: an IP address or 'none'
    #[arg(long)]
    pub gateway: Option<String>,

    /// Allocation pool IP addresses for this subnet (repeat option to add multiple)
    #[arg(long = "allocation-pool", value_name = "start=IP,end=IP", value_parser = POOL_PARSER)]
    pub allocation_pools: Vec<BTreeMap<String, String>>,

    /// Clear existing allocation pools before adding --allocation-pool
    #[arg(long)]
    pub no_allocation_pool: bool,

    /// DNS server for this subnet (repeat option to set multiple DNS servers)
    #[arg(long = "dns-nameserver", value_name = "DNS_NAMESERVER")]
    pub dns_nameservers: Vec<String>,

    /// Clear existing DNS servers before adding --dns-nameserver
    #[arg(long)]
    pub no_dns_nameservers: bool,

    /// Additional route for this subnet (repeat option to add multiple routes)
    #[arg(long = "host-route", value_name = "destination=SUBNET,gateway=IP", value_parser = ROUTE_PARSER)]
    pub host_routes: Vec<BTreeMap<String, String>>,

    /// Clear existing host routes before adding --host-route
    #[arg(long)]
    pub no_host_route: bool,
}

impl SubnetCommand {
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

/// `10.0.0.2-10.0.0.254`, one pool per entry
pub fn format_allocation_pools(data: &Value) -> String {
    let Some(pools) = data.as_array() else {
        return String::new();
    };
    pools
        .iter()
        .map(|p| {
            format!(
                "{}-{}",
                p.get("start").and_then(Value::as_str).unwrap_or_default(),
                p.get("end").and_then(Value::as_str).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `destination='10.10.0.0/16', gateway='192.168.71.254'`, one route per line
pub fn format_host_routes(data: &Value) -> String {
    let Some(routes) = data.as_array() else {
        return String::new();
    };
    routes
        .iter()
        .map(|r| {
            format!(
                "destination='{}', gateway='{}'",
                r.get("destination").and_then(Value::as_str).unwrap_or_default(),
                r.get("nexthop")
                    .or_else(|| r.get("gateway"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Neutron spells the route gateway `nexthop`
fn host_routes(routes: &[BTreeMap<String, String>]) -> Vec<Value> {
    routes
        .iter()
        .map(|r| {
            json!({
                "destination": r.get("destination").cloned().unwrap_or_default(),
                "nexthop": r.get("gateway").cloned().unwrap_or_default(),
            })
        })
        .collect()
}

fn allocation_pools(pools: &[BTreeMap<String, String>]) -> Vec<Value> {
    pools
        .iter()
        .map(|p| Value::from(p.iter().map(|(k, v)| (k.clone(), Value::from(v.as_str()))).collect::<Map<_, _>>()))
        .collect()
}

/// `gateway_ip` for `--gateway`; `auto` leaves the choice to Neutron
fn gateway_ip(gateway: &str) -> Option<Value> {
    match gateway.to_lowercase().as_str() {
        "auto" => None,
        "none" => Some(Value::Null),
        _ => Some(Value::from(gateway)),
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;
    let network_id = match &args.network {
        Some(n) => Some(utils::find_resource(network.networks(), n).await?.id().to_string()),
        None => None,
    };

    let query = commands::query(&[
        ("ip_version", args.ip_version),
        ("enable_dhcp", commands::toggle(args.dhcp, args.no_dhcp).map(|b| b.to_string())),
        ("network_id", network_id),
        ("project_id", project),
        ("name", args.name),
        ("cidr", args.subnet_range),
    ]);

    let subnets: Vec<Resource> = network
        .subnets()
        .list(&query)
        .await?
        .into_iter()
        .map(|mut s| {
            alias(&mut s, "network_id", "network");
            alias(&mut s, "cidr", "subnet");
            alias(&mut s, "project_id", "project");
            alias(&mut s, "enable_dhcp", "dhcp");
            alias(&mut s, "dns_nameservers", "name_servers");
            alias(&mut s, "gateway_ip", "gateway");
            s
        })
        .collect();

    let columns: &[&str] = if args.long {
        &[
            "ID",
            "Name",
            "Network",
            "Subnet",
            "Project",
            "DHCP",
            "Name Servers",
            "Allocation Pools",
            "Host Routes",
            "IP Version",
            "Gateway",
        ]
    } else {
        &["ID", "Name", "Network", "Subnet"]
    };
    let rows = output::rows(&subnets, columns, FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let subnet = utils::find_resource(network.subnets(), &args.subnet).await?;
    output::show_resource(&ctx.format, &subnet, &[], FORMATTERS)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;

    if args.subnet_range.is_none() && !args.use_default_subnet_pool {
        return Err(CommandError::new("You must specify --subnet-range or --use-default-subnet-pool").into());
    }
    if args.ip_version != 4 && args.ip_version != 6 {
        return Err(CommandError::new("--ip-version must be 4 or 6").into());
    }

    let net = utils::find_resource(network.networks(), &args.network).await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name));
    body.insert("network_id".into(), Value::from(net.id()));
    body.insert("ip_version".into(), Value::from(args.ip_version));
    commands::insert_opt(&mut body, "cidr", args.subnet_range);
    if args.use_default_subnet_pool {
        body.insert("use_default_subnetpool".into(), Value::Bool(true));
    }
    commands::insert_opt(&mut body, "prefixlen", args.prefix_length);
    if let Some(gateway) = gateway_ip(&args.gateway) {
        body.insert("gateway_ip".into(), gateway);
    }
    body.insert(
        "enable_dhcp".into(),
        Value::Bool(commands::toggle(args.dhcp, args.no_dhcp).unwrap_or(true)),
    );
    if !args.allocation_pools.is_empty() {
        body.insert("allocation_pools".into(), Value::from(allocation_pools(&args.allocation_pools)));
    }
    if !args.dns_nameservers.is_empty() {
        body.insert("dns_nameservers".into(), Value::from(args.dns_nameservers));
    }
    if !args.host_routes.is_empty() {
        body.insert("host_routes".into(), Value::from(host_routes(&args.host_routes)));
    }
    commands::insert_opt(&mut body, "ipv6_ra_mode", args.ipv6_ra_mode);
    commands::insert_opt(&mut body, "ipv6_address_mode", args.ipv6_address_mode);
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;
    common_attrs(&mut body, args.description, project);

    let subnet = network.subnets().create(Value::Object(body)).await?;
    tracing::info!("created subnet {}", subnet.id());
    output::show_resource(&ctx.format, &subnet, &[], FORMATTERS)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let mut report = DeleteReport::new("subnet", args.subnets.len());
    for name in &args.subnets {
        let result: Result<(), CommandError> = async {
            let subnet = utils::find_resource(network.subnets(), name).await?;
            network.subnets().delete(subnet.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

/// Existing list attribute unless `clear`, with `extra` appended
fn extend_list(subnet: &Resource, key: &str, clear: bool, extra: Vec<Value>) -> Value {
    let mut items: Vec<Value> = if clear {
        Vec::new()
    } else {
        subnet.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
    };
    items.extend(extra);
    Value::Array(items)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let subnet = utils::find_resource(network.subnets(), &args.subnet).await?;

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    commands::insert_opt(&mut body, "enable_dhcp", commands::toggle(args.dhcp, args.no_dhcp));
    if let Some(gateway) = args.gateway.as_deref().and_then(gateway_ip) {
        body.insert("gateway_ip".into(), gateway);
    }
    if args.no_allocation_pool || !args.allocation_pools.is_empty() {
        body.insert(
            "allocation_pools".into(),
            extend_list(
                &subnet,
                "allocation_pools",
                args.no_allocation_pool,
                allocation_pools(&args.allocation_pools),
            ),
        );
    }
    if args.no_dns_nameservers || !args.dns_nameservers.is_empty() {
        let servers = args.dns_nameservers.into_iter().map(Value::from).collect();
        body.insert(
            "dns_nameservers".into(),
            extend_list(&subnet, "dns_nameservers", args.no_dns_nameservers, servers),
        );
    }
    if args.no_host_route || !args.host_routes.is_empty() {
        body.insert(
            "host_routes".into(),
            extend_list(&subnet, "host_routes", args.no_host_route, host_routes(&args.host_routes)),
        );
    }

    if body.is_empty() {
        tracing::debug!("nothing to set on subnet {}", subnet.id());
        return Ok(());
    }
    network.subnets().update(subnet.id(), Value::Object(body)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_allocation_pools() {
        let pools = json!([
            {"start": "10.0.0.2", "end": "10.0.0.100"},
            {"start": "10.0.0.150", "end": "10.0.0.254"},
        ]);
        assert_eq!(
            format_allocation_pools(&pools),
            "10.0.0.2-10.0.0.100, 10.0.0.150-10.0.0.254"
        );
        assert_eq!(format_allocation_pools(&Value::Null), "");
    }

    #[test]
    fn test_host_routes_use_nexthop() {
        let parsed = ROUTE_PARSER.parse_str("destination=10.10.0.0/16,gateway=192.168.71.254").unwrap();
        assert_eq!(
            host_routes(&[parsed]),
            vec![json!({"destination": "10.10.0.0/16", "nexthop": "192.168.71.254"})]
        );
    }

    #[test]
    fn test_pool_requires_both_ends() {
        assert!(POOL_PARSER.parse_str("start=10.0.0.2").is_err());
    }

    #[test]
    fn test_gateway_ip() {
        assert_eq!(gateway_ip("auto"), None);
        assert_eq!(gateway_ip("None"), Some(Value::Null));
        assert_eq!(gateway_ip("10.0.0.1"), Some(json!("10.0.0.1")));
    }

    #[test]
    fn test_extend_list_appends_or_clears() {
        let subnet = Resource::from_value(json!({"id": "s", "dns_nameservers": ["8.8.8.8"]})).unwrap();
        assert_eq!(
            extend_list(&subnet, "dns_nameservers", false, vec![json!("1.1.1.1")]),
            json!(["8.8.8.8", "1.1.1.1"])
        );
        assert_eq!(
            extend_list(&subnet, "dns_nameservers", true, vec![json!("1.1.1.1")]),
            json!(["1.1.1.1"])
        );
    }
}
