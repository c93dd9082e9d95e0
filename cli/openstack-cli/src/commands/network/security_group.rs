// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Security group and security group rule commands

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use openstack_client::{Manager, Resource};
use serde_json::{Map, Value};

use super::{alias, common_attrs, project_id};
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::parse_range;
use crate::utils::{self, Formatter, format_list};

#[derive(Subcommand, Clone)]
pub enum SecurityCommand {
    /// Security groups and their rules
    #[command(subcommand)]
    Group(SecurityGroupCommand),
}

#[derive(Subcommand, Clone)]
pub enum SecurityGroupCommand {
    /// List security groups
    List(ListArgs),
    /// Display security group details
    Show(ShowArgs),
    /// Create a new security group
    Create(CreateArgs),
    /// Delete security group(s)
    Delete(DeleteArgs),
    /// Set security group properties
    Set(SetArgs),
    /// Security group rules
    #[command(subcommand)]
    Rule(RuleCommand),
}

#[derive(Subcommand, Clone)]
pub enum RuleCommand {
    /// List security group rules
    List(RuleListArgs),
    /// Display security group rule details
    Show(RuleShowArgs),
    /// Create a new security group rule
    Create(RuleCreateArgs),
    /// Delete security group rule(s)
    Delete(RuleDeleteArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
pub enum Ethertype {
    #[value(name = "IPv4")]
    #[strum(serialize = "IPv4")]
    IPv4,
    #[value(name = "IPv6")]
    #[strum(serialize = "IPv6")]
    IPv6,
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// List security groups according to the project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Security group to display (name or ID)
    pub group: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New security group name
    pub name: String,

    /// Security group description
    #[arg(long)]
    pub description: Option<String>,

    /// Owner's project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Security group is stateful (default)
    #[arg(long, conflicts_with = "stateless")]
    pub stateful: bool,

    /// Security group is stateless
    #[arg(long)]
    pub stateless: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Security group(s) to delete (name or ID)
    #[arg(required = true)]
    pub groups: Vec<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Security group to modify (name or ID)
    pub group: String,

    /// New security group name
    #[arg(long)]
    pub name: Option<String>,

    /// New security group description
    #[arg(long)]
    pub description: Option<String>,

    /// Security group is stateful
    #[arg(long, conflicts_with = "stateless")]
    pub stateful: bool,

    /// Security group is stateless
    #[arg(long)]
    pub stateless: bool,
}

#[derive(Args, Clone)]
pub struct RuleListArgs {
    /// List all rules in this security group (name or ID)
    pub group: Option<String>,

    /// List rules by the IP protocol (e.g. 'tcp', 'icmp' or an IP protocol number)
    #[arg(long)]
    pub protocol: Option<String>,

    /// List rules by the Ethertype
    #[arg(long, value_enum)]
    pub ethertype: Option<Ethertype>,

    /// List rules applied to incoming network traffic
    #[arg(long, conflicts_with = "egress")]
    pub ingress: bool,

    /// List rules applied to outgoing network traffic
    #[arg(long)]
    pub egress: bool,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct RuleShowArgs {
    /// Security group rule to display (ID only)
    pub rule: String,
}

#[derive(Args, Clone)]
pub struct RuleCreateArgs {
    /// Create rule in this security group (name or ID)
    pub group: String,

    /// Remote IP address block (may use CIDR notation; default for IPv4 rule: 0.0.0.0/0,
    /// default for IPv6 rule: ::/0)
    #[arg(long, conflicts_with = "remote_group")]
    pub remote_ip: Option<String>,

    /// Remote security group (name or ID)
    #[arg(long)]
    pub remote_group: Option<String>,

    /// Destination port, may be a single port or a starting and ending port range: 137:139
    #[arg(long, value_parser = parse_range)]
    pub dst_port: Option<(u32, u32)>,

    /// IP protocol (ah, dccp, egp, esp, gre, icmp, igmp, ipv6-icmp, ...,
    /// or an IP protocol number); default 'tcp', 'any' matches all protocols
    #[arg(long)]
    pub protocol: Option<String>,

    /// ICMP type for ICMP IP protocols
    #[arg(long)]
    pub icmp_type: Option<u32>,

    /// ICMP code for ICMP IP protocols
    #[arg(long, requires = "icmp_type")]
    pub icmp_code: Option<u32>,

    /// Rule applies to incoming network traffic (default)
    #[arg(long, conflicts_with = "egress")]
    pub ingress: bool,

    /// Rule applies to outgoing network traffic
    #[arg(long)]
    pub egress: bool,

    /// Ethertype of network traffic
    #[arg(long, value_enum)]
    pub ethertype: Option<Ethertype>,

    /// Set security group rule description
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
pub struct RuleDeleteArgs {
    /// Security group rule(s) to delete (ID only)
    #[arg(required = true)]
    pub rules: Vec<String>,
}

impl SecurityCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Group(cmd) => cmd.run(ctx).await,
        }
    }
}

impl SecurityGroupCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Set(args) => set(args, ctx).await,
            Self::Rule(cmd) => cmd.run(ctx).await,
        }
    }
}

impl RuleCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => rule_list(args, ctx).await,
            Self::Show(args) => rule_show(args, ctx).await,
            Self::Create(args) => rule_create(args, ctx).await,
            Self::Delete(args) => rule_delete(args, ctx).await,
        }
    }
}

/// Rules inside a group, one per line without the repeated group fields
pub fn format_rules(data: &Value) -> String {
    let Some(rules) = data.as_array() else {
        return String::new();
    };
    rules
        .iter()
        .map(|rule| {
            let trimmed: Map<String, Value> = rule
                .as_object()
                .map(|m| {
                    m.iter()
                        .filter(|(k, v)| {
                            !matches!(
                                k.as_str(),
                                "id" | "security_group_id" | "project_id" | "tenant_id" | "created_at" | "updated_at"
                                    | "revision_number" | "tags"
                            ) && !v.is_null()
                        })
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default();
            utils::format_dict(&Value::Object(trimmed))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `22:22` style port range; empty for ICMP and unbounded rules
pub fn format_port_range(rule: &Resource) -> String {
    let port = |k: &str| rule.get(k).and_then(Value::as_u64);
    let protocol = rule.str_field("protocol").unwrap_or_default();
    if protocol == "icmp" || protocol == "ipv6-icmp" {
        return String::new();
    }
    match (port("port_range_min"), port("port_range_max")) {
        (None, None) => String::new(),
        (Some(min), None) => format!("{}:{}", min, min),
        (None, Some(max)) => format!("{}:{}", max, max),
        (Some(min), Some(max)) => format!("{}:{}", min, max),
    }
}

const GROUP_FORMATTERS: &[(&str, Formatter)] = &[
    ("security_group_rules", format_rules),
    ("rules", format_rules),
    ("tags", format_list),
    ("Tags", format_list),
];

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;

    let groups: Vec<Resource> = network
        .security_groups()
        .list(&commands::query(&[("project_id", project)]))
        .await?
        .into_iter()
        .map(|mut g| {
            alias(&mut g, "project_id", "project");
            g
        })
        .collect();

    let columns = ["ID", "Name", "Description", "Project", "Tags"];
    let rows = output::rows(&groups, &columns, GROUP_FORMATTERS, &[]);
    output::list(&ctx.format, &output::headers(&columns), rows)
}

fn show_group(ctx: &Context, mut group: Resource) -> Result<()> {
    if let Some(rules) = group.remove("security_group_rules") {
        group.insert("rules", rules);
    }
    output::show_resource(&ctx.format, &group, &[], GROUP_FORMATTERS)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let group = utils::find_resource(network.security_groups(), &args.group).await?;
    show_group(ctx, group)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name.clone()));
    body.insert(
        "description".into(),
        Value::from(args.description.unwrap_or(args.name)),
    );
    commands::insert_opt(&mut body, "stateful", commands::toggle(args.stateful, args.stateless));
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;
    common_attrs(&mut body, None, project);

    let group = network.security_groups().create(Value::Object(body)).await?;
    tracing::info!("created security group {}", group.id());
    show_group(ctx, group)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let mut report = DeleteReport::new("group", args.groups.len());
    for name in &args.groups {
        let result: Result<(), CommandError> = async {
            let group = utils::find_resource(network.security_groups(), name).await?;
            network.security_groups().delete(group.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let group = utils::find_resource(network.security_groups(), &args.group).await?;

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    commands::insert_opt(&mut body, "stateful", commands::toggle(args.stateful, args.stateless));

    if body.is_empty() {
        tracing::debug!("nothing to set on security group {}", group.id());
        return Ok(());
    }
    network.security_groups().update(group.id(), Value::Object(body)).await?;
    Ok(())
}

async fn rule_list(args: RuleListArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let group_id = match &args.group {
        Some(g) => Some(utils::find_resource(network.security_groups(), g).await?.id().to_string()),
        None => None,
    };
    let direction = commands::toggle(args.ingress, args.egress)
        .map(|ingress| if ingress { "ingress" } else { "egress" })
        .map(str::to_string);

    let query = commands::query(&[
        ("security_group_id", group_id),
        ("protocol", args.protocol),
        ("ethertype", args.ethertype.map(|e| e.to_string())),
        ("direction", direction),
    ]);

    let rules: Vec<Resource> = network
        .security_group_rules()
        .list(&query)
        .await?
        .into_iter()
        .map(|mut r| {
            let range = format_port_range(&r);
            r.insert("port_range", Value::from(range));
            alias(&mut r, "protocol", "ip_protocol");
            alias(&mut r, "remote_ip_prefix", "ip_range");
            alias(&mut r, "remote_group_id", "remote_security_group");
            alias(&mut r, "security_group_id", "security_group");
            r
        })
        .collect();

    let columns: &[&str] = if args.long {
        &[
            "ID",
            "IP Protocol",
            "Ethertype",
            "IP Range",
            "Port Range",
            "Direction",
            "Remote Security Group",
            "Security Group",
        ]
    } else {
        &[
            "ID",
            "IP Protocol",
            "Ethertype",
            "IP Range",
            "Port Range",
            "Remote Security Group",
            "Security Group",
        ]
    };
    let rows = output::rows(&rules, columns, &[], &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn rule_show(args: RuleShowArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let rule = network.security_group_rules().get(&args.rule).await?;
    output::show_resource(&ctx.format, &rule, &[], &[("tags", format_list)])
}

/// Neutron protocol value for `--protocol`; absent means `tcp`, `any`
/// means no filter and ICMP over IPv6 is `ipv6-icmp`
fn normalize_protocol(protocol: Option<&str>, ethertype: Ethertype) -> Option<String> {
    let protocol = protocol.unwrap_or("tcp").to_lowercase();
    match protocol.as_str() {
        "any" => None,
        "icmp" if ethertype == Ethertype::IPv6 => Some("ipv6-icmp".to_string()),
        _ => Some(protocol),
    }
}

/// Ethertype from `--ethertype`, else from the remote IP's family
fn ethertype(explicit: Option<Ethertype>, remote_ip: Option<&str>) -> Ethertype {
    match (explicit, remote_ip) {
        (Some(e), _) => e,
        (None, Some(ip)) if ip.contains(':') => Ethertype::IPv6,
        _ => Ethertype::IPv4,
    }
}

fn is_icmp(protocol: Option<&str>) -> bool {
    matches!(protocol, Some("icmp" | "ipv6-icmp" | "1" | "58"))
}

/// Protocols whose rules may carry a port range, by name or number
fn has_ports(protocol: Option<&str>) -> bool {
    matches!(
        protocol,
        Some("tcp" | "udp" | "sctp" | "dccp" | "udplite" | "6" | "17" | "132" | "33" | "136")
    )
}

/// Rule body without the group and remote group lookups
fn rule_body(args: &RuleCreateArgs) -> Result<Map<String, Value>, CommandError> {
    let ethertype = ethertype(args.ethertype, args.remote_ip.as_deref());
    let protocol = normalize_protocol(args.protocol.as_deref(), ethertype);

    let mut body = Map::new();
    body.insert("ethertype".into(), Value::from(ethertype.to_string()));
    body.insert(
        "direction".into(),
        Value::from(if args.egress { "egress" } else { "ingress" }),
    );

    if is_icmp(protocol.as_deref()) {
        if args.dst_port.is_some() {
            return Err(CommandError::new(
                "Argument --dst-port not allowed with arguments --icmp-type and --icmp-code",
            ));
        }
        commands::insert_opt(&mut body, "port_range_min", args.icmp_type);
        commands::insert_opt(&mut body, "port_range_max", args.icmp_code);
    } else {
        if args.icmp_type.is_some() {
            return Err(CommandError::new("--icmp-type is only valid for ICMP protocols"));
        }
        if let Some((min, max)) = args.dst_port {
            if !has_ports(protocol.as_deref()) {
                return Err(CommandError::new(format!(
                    "Argument --dst-port is not allowed with protocol {}",
                    protocol.as_deref().unwrap_or("any")
                )));
            }
            body.insert("port_range_min".into(), Value::from(min));
            body.insert("port_range_max".into(), Value::from(max));
        }
    }
    commands::insert_opt(&mut body, "protocol", protocol);

    if args.remote_group.is_none() {
        let default = match ethertype {
            Ethertype::IPv4 => "0.0.0.0/0",
            Ethertype::IPv6 => "::/0",
        };
        body.insert(
            "remote_ip_prefix".into(),
            Value::from(args.remote_ip.clone().unwrap_or_else(|| default.to_string())),
        );
    }
    commands::insert_opt(&mut body, "description", args.description.clone());
    Ok(body)
}

async fn rule_create(args: RuleCreateArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let group = utils::find_resource(network.security_groups(), &args.group).await?;

    let mut body = rule_body(&args)?;
    body.insert("security_group_id".into(), Value::from(group.id()));
    if let Some(remote) = &args.remote_group {
        let remote = utils::find_resource(network.security_groups(), remote).await?;
        body.insert("remote_group_id".into(), Value::from(remote.id()));
    }
    let project = project_id(ctx, args.project.as_deref(), args.project_domain.as_deref()).await?;
    common_attrs(&mut body, None, project);

    let rule = network.security_group_rules().create(Value::Object(body)).await?;
    tracing::info!("created security group rule {}", rule.id());
    output::show_resource(&ctx.format, &rule, &[], &[("tags", format_list)])
}

async fn rule_delete(args: RuleDeleteArgs, ctx: &Context) -> Result<()> {
    let network = ctx.clients.network().await?;
    let mut report = DeleteReport::new("rule", args.rules.len());
    for id in &args.rules {
        let result: Result<(), CommandError> = async {
            let rule = network.security_group_rules().get(id).await?;
            network.security_group_rules().delete(rule.id()).await?;
            Ok(())
        }
        .await;
        report.record(id, result);
    }
    Ok(report.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn rule_args() -> RuleCreateArgs {
        RuleCreateArgs {
            group: "default".into(),
            remote_ip: None,
            remote_group: None,
            dst_port: None,
            protocol: None,
            icmp_type: None,
            icmp_code: None,
            ingress: false,
            egress: false,
            ethertype: None,
            description: None,
            project: None,
            project_domain: None,
        }
    }

    #[test_case(json!({"protocol": "tcp", "port_range_min": 22, "port_range_max": 22}), "22:22" ; "single port")]
    #[test_case(json!({"protocol": "udp", "port_range_min": 137, "port_range_max": 139}), "137:139" ; "range")]
    #[test_case(json!({"protocol": "tcp", "port_range_min": null, "port_range_max": 80}), "80:80" ; "max only")]
    #[test_case(json!({"protocol": "icmp", "port_range_min": 8, "port_range_max": 0}), "" ; "icmp")]
    #[test_case(json!({"protocol": null}), "" ; "any")]
    fn test_format_port_range(rule: Value, expected: &str) {
        let rule = Resource::from_value(rule).unwrap();
        assert_eq!(format_port_range(&rule), expected);
    }

    #[test]
    fn test_rule_defaults_to_open_tcp_ingress() {
        let body = rule_body(&rule_args()).unwrap();
        assert_eq!(
            Value::Object(body),
            json!({"ethertype": "IPv4", "direction": "ingress", "protocol": "tcp", "remote_ip_prefix": "0.0.0.0/0"})
        );
    }

    #[test]
    fn test_rule_any_protocol_sends_none() {
        let args = RuleCreateArgs {
            protocol: Some("any".into()),
            ..rule_args()
        };
        let body = rule_body(&args).unwrap();
        assert_eq!(body.get("protocol"), None);
    }

    #[test]
    fn test_rule_dst_port_defaults_to_tcp() {
        let args = RuleCreateArgs {
            dst_port: Some((22, 22)),
            ..rule_args()
        };
        let body = rule_body(&args).unwrap();
        assert_eq!(
            Value::Object(body),
            json!({
                "ethertype": "IPv4",
                "direction": "ingress",
                "protocol": "tcp",
                "port_range_min": 22,
                "port_range_max": 22,
                "remote_ip_prefix": "0.0.0.0/0",
            })
        );
    }

    #[test_case("udp" ; "udp")]
    #[test_case("SCTP" ; "sctp by name")]
    #[test_case("6" ; "tcp by number")]
    fn test_rule_dst_port_allowed(protocol: &str) {
        let args = RuleCreateArgs {
            protocol: Some(protocol.into()),
            dst_port: Some((53, 53)),
            ..rule_args()
        };
        let body = rule_body(&args).unwrap();
        assert_eq!(body.get("port_range_min"), Some(&json!(53)));
    }

    #[test_case("gre", "protocol gre" ; "gre")]
    #[test_case("any", "protocol any" ; "any")]
    fn test_rule_dst_port_rejected_without_ports(protocol: &str, msg: &str) {
        let args = RuleCreateArgs {
            protocol: Some(protocol.into()),
            dst_port: Some((22, 22)),
            ..rule_args()
        };
        let err = rule_body(&args).unwrap_err();
        assert!(err.to_string().contains(msg), "{}", err);
    }

    #[test]
    fn test_rule_ipv6_icmp() {
        let args = RuleCreateArgs {
            protocol: Some("ICMP".into()),
            remote_ip: Some("fd00::/8".into()),
            icmp_type: Some(128),
            egress: true,
            ..rule_args()
        };
        let body = rule_body(&args).unwrap();
        assert_eq!(
            Value::Object(body),
            json!({
                "ethertype": "IPv6",
                "direction": "egress",
                "protocol": "ipv6-icmp",
                "port_range_min": 128,
                "remote_ip_prefix": "fd00::/8",
            })
        );
    }

    #[test]
    fn test_rule_port_range_rejected_for_icmp() {
        let args = RuleCreateArgs {
            protocol: Some("icmp".into()),
            dst_port: Some((22, 22)),
            ..rule_args()
        };
        assert!(rule_body(&args).is_err());
    }

    #[test]
    fn test_format_rules_drops_group_fields() {
        let rules = json!([{
            "id": "r1",
            "security_group_id": "sg",
            "direction": "egress",
            "ethertype": "IPv4",
            "protocol": null,
        }]);
        assert_eq!(format_rules(&rules), "direction='egress', ethertype='IPv4'");
    }
}
