// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Server commands

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use base64::Engine;
use clap::{Args, Subcommand, ValueEnum};
use openstack_client::{ComputeClient, Manager, Resource};
use serde_json::{Map, Value, json};

use super::microversion_at_least;
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::{
    KeyValue, MultiKeyValueParser, key_value_append, parse_key_value, parse_key_value_pair,
};
use crate::utils::{self, format_dict, format_list_of_dicts};

const NIC_PARSER: MultiKeyValueParser =
    MultiKeyValueParser::new(&[], &["net-id", "port-id", "v4-fixed-ip", "v6-fixed-ip"]);

/// Nova power states, indexed by `OS-EXT-STS:power_state`
const POWER_STATES: [&str; 8] = [
    "NOSTATE", "Running", "", "Paused", "Shutdown", "", "Crashed", "Suspended",
];

#[derive(Subcommand, Clone)]
pub enum ServerCommand {
    /// List servers
    List(ListArgs),
    /// Display server details
    Show(ShowArgs),
    /// Create a new server
    Create(CreateArgs),
    /// Delete server(s)
    Delete(DeleteArgs),
    /// Set server properties
    Set(SetArgs),
    /// Unset server properties
    Unset(UnsetArgs),
    /// Start server(s)
    Start(ServersArgs),
    /// Stop server(s)
    Stop(ServersArgs),
    /// Perform a hard or soft server reboot
    Reboot(RebootArgs),
    /// Pause server(s)
    Pause(ServersArgs),
    /// Unpause server(s)
    Unpause(ServersArgs),
    /// Suspend server(s)
    Suspend(ServersArgs),
    /// Resume server(s)
    Resume(ServersArgs),
    /// Lock server(s); a non-admin user will not be able to execute actions
    Lock(ServersArgs),
    /// Unlock server(s)
    Unlock(ServersArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Regular expression to match names
    #[arg(long)]
    pub name: Option<String>,

    /// Search by server status
    #[arg(long)]
    pub status: Option<String>,

    /// Search by flavor (name or ID)
    #[arg(long)]
    pub flavor: Option<String>,

    /// Search by image ID
    #[arg(long)]
    pub image: Option<String>,

    /// Search by hostname
    #[arg(long)]
    pub host: Option<String>,

    /// Include all projects (admin only)
    #[arg(long)]
    pub all_projects: bool,

    /// Search by project (admin only, name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,

    /// The last server of the previous page
    #[arg(long)]
    pub marker: Option<String>,

    /// Maximum number of servers to display
    #[arg(long)]
    pub limit: Option<u32>,

    /// List only servers changed later or equal to a certain point of time
    #[arg(long, value_name = "TIMESTAMP")]
    pub changes_since: Option<String>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Server to display (name or ID)
    pub server: String,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New server name
    pub name: String,

    /// Create server with this flavor (name or ID)
    #[arg(long)]
    pub flavor: String,

    /// Create server boot disk from this image ID
    #[arg(long, required_unless_present = "volume", conflicts_with = "volume")]
    pub image: Option<String>,

    /// Create server using this volume as the boot disk (name or ID)
    #[arg(long)]
    pub volume: Option<String>,

    /// Security group to assign to this server (repeat option to set multiple groups)
    #[arg(long = "security-group", value_name = "SECURITY_GROUP")]
    pub security_groups: Vec<String>,

    /// Keypair to inject into this server
    #[arg(long)]
    pub key_name: Option<String>,

    /// Set a property on this server (repeat option to set multiple values)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// User data file to serve from the metadata server
    #[arg(long, value_name = "FILE")]
    pub user_data: Option<PathBuf>,

    /// Set description for the server (compute API 2.19 or later)
    #[arg(long)]
    pub description: Option<String>,

    /// Select an availability zone for the server
    #[arg(long)]
    pub availability_zone: Option<String>,

    /// Hints for the scheduler (repeat option to set multiple hints)
    #[arg(long = "hint", value_name = "KEY=VALUE", value_parser = parse_key_value_pair)]
    pub hints: Vec<(String, String)>,

    /// Create a NIC on the server: net-id=NET,v4-fixed-ip=IP,v6-fixed-ip=IP,port-id=PORT
    #[arg(long = "nic", value_name = "NIC", value_parser = NIC_PARSER)]
    pub nics: Vec<BTreeMap<String, String>>,

    /// Create a NIC on the server and connect it to network (name or ID)
    #[arg(long = "network", value_name = "NETWORK")]
    pub networks: Vec<String>,

    /// Create a NIC on the server and connect it to port (name or ID)
    #[arg(long = "port", value_name = "PORT")]
    pub ports: Vec<String>,

    /// Let the compute service allocate a network
    #[arg(long, conflicts_with = "no_network")]
    pub auto_network: bool,

    /// Do not attach a network to the server
    #[arg(long)]
    pub no_network: bool,

    /// Enable config drive
    #[arg(long)]
    pub config_drive: bool,

    /// Minimum number of servers to launch
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub min: u32,

    /// Maximum number of servers to launch
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub max: u32,

    /// Wait for build to complete
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Server(s) to delete (name or ID)
    #[arg(required = true)]
    pub servers: Vec<String>,

    /// Wait for delete to complete
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Server (name or ID)
    pub server: String,

    /// New server name
    #[arg(long)]
    pub name: Option<String>,

    /// Property to add/change for this server (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// New server description (compute API 2.19 or later)
    #[arg(long)]
    pub description: Option<String>,

    /// Set new root password (interactive only)
    #[arg(long)]
    pub root_password: bool,

    /// New server state (admin only)
    #[arg(long, value_enum)]
    pub state: Option<ServerState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ServerState {
    Active,
    Error,
}

#[derive(Args, Clone)]
pub struct UnsetArgs {
    /// Server (name or ID)
    pub server: String,

    /// Property key to remove from server (repeat option to remove multiple values)
    #[arg(long = "property", value_name = "KEY")]
    pub properties: Vec<String>,

    /// Unset server description (compute API 2.19 or later)
    #[arg(long)]
    pub description: bool,
}

#[derive(Args, Clone)]
pub struct ServersArgs {
    /// Server(s) (name or ID)
    #[arg(required = true)]
    pub servers: Vec<String>,
}

#[derive(Args, Clone)]
pub struct RebootArgs {
    /// Server (name or ID)
    pub server: String,

    /// Perform a hard reboot
    #[arg(long, conflicts_with = "soft")]
    pub hard: bool,

    /// Perform a soft reboot
    #[arg(long)]
    pub soft: bool,

    /// Wait for reboot to complete
    #[arg(long)]
    pub wait: bool,
}

impl ServerCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Set(args) => set(args, ctx).await,
            Self::Unset(args) => unset(args, ctx).await,
            Self::Start(args) => each(args, ctx, "os-start").await,
            Self::Stop(args) => each(args, ctx, "os-stop").await,
            Self::Reboot(args) => reboot(args, ctx).await,
            Self::Pause(args) => each(args, ctx, "pause").await,
            Self::Unpause(args) => each(args, ctx, "unpause").await,
            Self::Suspend(args) => each(args, ctx, "suspend").await,
            Self::Resume(args) => each(args, ctx, "resume").await,
            Self::Lock(args) => each(args, ctx, "lock").await,
            Self::Unlock(args) => each(args, ctx, "unlock").await,
        }
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;

    let flavor = match &args.flavor {
        Some(f) => Some(utils::find_resource(compute.flavors(), f).await?.id().to_string()),
        None => None,
    };
    let project = match &args.project {
        Some(p) => Some(commands::project_id(ctx, p, args.project_domain.as_deref()).await?),
        None => None,
    };
    let all_projects = args.all_projects || project.is_some();

    let query = commands::query(&[
        ("name", args.name),
        ("status", args.status.map(|s| s.to_uppercase())),
        ("flavor", flavor),
        ("image", args.image),
        ("host", args.host),
        ("all_tenants", all_projects.then(|| "True".to_string())),
        ("project_id", project),
        ("changes-since", args.changes_since),
        ("marker", args.marker),
        ("limit", args.limit.map(|l| l.to_string())),
    ]);

    let servers: Vec<Resource> = compute
        .servers()
        .list(&query)
        .await?
        .into_iter()
        .map(flatten_server)
        .collect();

    let columns: &[&str] = if args.long {
        &[
            "ID",
            "Name",
            "Status",
            "Task State",
            "Power State",
            "Networks",
            "Image",
            "Flavor",
            "Availability Zone",
            "Host",
            "Properties",
        ]
    } else {
        &["ID", "Name", "Status", "Networks", "Image", "Flavor"]
    };
    let formatters: &[(&str, utils::Formatter)] = &[
        ("Networks", format_addresses),
        ("Image", format_image),
        ("Flavor", format_flavor),
        ("Power State", format_power_state),
        ("Properties", format_dict),
    ];

    let rows = output::rows(&servers, columns, formatters, &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

/// Copy extension attributes to the plain names the list columns use
fn flatten_server(mut server: Resource) -> Resource {
    for (from, to) in [
        ("addresses", "networks"),
        ("OS-EXT-STS:task_state", "task_state"),
        ("OS-EXT-STS:power_state", "power_state"),
        ("OS-EXT-AZ:availability_zone", "availability_zone"),
        ("OS-EXT-SRV-ATTR:host", "host"),
        ("metadata", "properties"),
    ] {
        if let Some(v) = server.get(from).cloned() {
            server.insert(to, v);
        }
    }
    server
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let server = utils::find_resource(compute.servers(), &args.server).await?;
    let server = prep_server_detail(compute, server).await;
    show_server(ctx, &server)
}

fn show_server(ctx: &Context, server: &Resource) -> Result<()> {
    output::show_resource(
        &ctx.format,
        server,
        &["links"],
        &[
            ("addresses", format_addresses),
            ("properties", format_dict),
            ("security_groups", format_list_of_dicts),
            ("os-extended-volumes:volumes_attached", format_list_of_dicts),
            ("OS-EXT-STS:power_state", format_power_state),
        ],
    )
}

/// Reshape a server for display: flavor and image summaries,
/// metadata as `properties`
async fn prep_server_detail(compute: &ComputeClient, mut server: Resource) -> Resource {
    if let Some(metadata) = server.remove("metadata") {
        server.insert("properties", metadata);
    }

    let image = server.get("image").map(format_image).unwrap_or_default();
    server.insert("image", Value::String(image));

    let flavor = match server.get("flavor") {
        Some(f) if f.get("original_name").is_some() => format_flavor(f),
        Some(f) => match f.get("id").and_then(Value::as_str) {
            Some(id) => match compute.flavors().get(id).await {
                Ok(found) => format!("{} ({})", found.name(), id),
                Err(e) => {
                    tracing::debug!("flavor {} lookup failed: {}", id, e);
                    id.to_string()
                }
            },
            None => String::new(),
        },
        None => String::new(),
    };
    server.insert("flavor", Value::String(flavor));
    server.remove("adminPass");
    server
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    if args.min > args.max {
        return Err(CommandError::new("min instances should be <= max instances").into());
    }

    let compute = ctx.clients.compute().await?;
    let flavor = utils::find_resource(compute.flavors(), &args.flavor).await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name.clone()));
    body.insert("flavorRef".into(), Value::from(flavor.id()));
    body.insert("min_count".into(), Value::from(args.min));
    body.insert("max_count".into(), Value::from(args.max));

    match (&args.image, &args.volume) {
        (_, Some(volume)) => {
            let volumes = ctx.clients.volume().await?;
            let volume = utils::find_resource(volumes.volumes(), volume).await?;
            body.insert("imageRef".into(), Value::from(""));
            body.insert(
                "block_device_mapping_v2".into(),
                json!([{
                    "uuid": volume.id(),
                    "boot_index": 0,
                    "source_type": "volume",
                    "destination_type": "volume",
                    "delete_on_termination": false,
                }]),
            );
        }
        (Some(image), None) => {
            body.insert("imageRef".into(), Value::from(image.as_str()));
        }
        (None, None) => {
            return Err(CommandError::new("Either --image or --volume must be specified").into());
        }
    }

    commands::insert_opt(&mut body, "key_name", args.key_name.clone());
    commands::insert_opt(&mut body, "availability_zone", args.availability_zone.clone());
    commands::insert_opt(&mut body, "description", args.description.clone());

    if !args.security_groups.is_empty() {
        let groups: Vec<Value> = args
            .security_groups
            .iter()
            .map(|g| json!({ "name": g }))
            .collect();
        body.insert("security_groups".into(), Value::Array(groups));
    }
    if !args.properties.is_empty() {
        body.insert(
            "metadata".into(),
            Value::Object(commands::properties(&args.properties)),
        );
    }
    if let Some(path) = &args.user_data {
        let data = std::fs::read(path).map_err(|e| {
            CommandError::new(format!("Can't open '{}': {}", path.display(), e))
        })?;
        body.insert(
            "user_data".into(),
            Value::from(base64::engine::general_purpose::STANDARD.encode(data)),
        );
    }
    if args.config_drive {
        body.insert("config_drive".into(), Value::Bool(true));
    }

    if let Some(networks) = build_networks(&args, ctx, compute).await? {
        body.insert("networks".into(), networks);
    }

    let mut request = json!({ "server": body });
    if !args.hints.is_empty() {
        let hints: Map<String, Value> = key_value_append(&args.hints)
            .into_iter()
            .map(|(k, mut v)| {
                let value = if v.len() == 1 {
                    Value::from(v.remove(0))
                } else {
                    Value::from(v)
                };
                (k, value)
            })
            .collect();
        request["os:scheduler_hints"] = Value::Object(hints);
    }

    let resp = compute
        .servers()
        .client()
        .post_json("servers", &request)
        .await?
        .unwrap_or(Value::Null);
    let id = resp
        .get("server")
        .and_then(|s| s.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| CommandError::new("Server create response did not include an ID"))?
        .to_string();
    tracing::info!("created server {}", id);

    if args.wait {
        let ok = commands::wait_for_status(
            compute.servers(),
            &id,
            &["active"],
            &["error"],
            "Waiting for server",
        )
        .await?;
        if !ok {
            return Err(CommandError::new(format!("Error creating server: {}", args.name)).into());
        }
    }

    let server = compute.servers().get(&id).await?;
    let server = prep_server_detail(compute, server).await;
    show_server(ctx, &server)
}

/// `networks` for the create request from `--nic`, `--network`, `--port`
/// and the auto/none switches
async fn build_networks(args: &CreateArgs, ctx: &Context, compute: &ComputeClient) -> Result<Option<Value>> {
    if args.auto_network {
        return Ok(Some(Value::from("auto")));
    }
    if args.no_network {
        return Ok(Some(Value::from("none")));
    }

    let mut nics: Vec<Value> = Vec::new();
    for nic in &args.nics {
        if nic.contains_key("net-id") && nic.contains_key("port-id") {
            return Err(CommandError::new(
                "Invalid --nic argument: either net-id or port-id should be specified but not both",
            )
            .into());
        }
        let mut entry = Map::new();
        if let Some(net) = nic.get("net-id") {
            let network = ctx.clients.network().await?;
            let id = utils::find_resource(network.networks(), net).await?.id().to_string();
            entry.insert("uuid".into(), Value::from(id));
        }
        if let Some(port) = nic.get("port-id") {
            let network = ctx.clients.network().await?;
            let id = utils::find_resource(network.ports(), port).await?.id().to_string();
            entry.insert("port".into(), Value::from(id));
        }
        if let Some(ip) = nic.get("v4-fixed-ip").or_else(|| nic.get("v6-fixed-ip")) {
            entry.insert("fixed_ip".into(), Value::from(ip.as_str()));
        }
        nics.push(Value::Object(entry));
    }
    if !args.networks.is_empty() || !args.ports.is_empty() {
        let network = ctx.clients.network().await?;
        for net in &args.networks {
            let id = utils::find_resource(network.networks(), net).await?.id().to_string();
            nics.push(json!({ "uuid": id }));
        }
        for port in &args.ports {
            let id = utils::find_resource(network.ports(), port).await?.id().to_string();
            nics.push(json!({ "port": id }));
        }
    }

    if !nics.is_empty() {
        return Ok(Some(Value::Array(nics)));
    }
    // 2.37 made `networks` mandatory; default to auto allocation
    if microversion_at_least(compute.version(), 2, 37) {
        return Ok(Some(Value::from("auto")));
    }
    Ok(None)
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let mut report = DeleteReport::new("server", args.servers.len());

    for name in &args.servers {
        let result: Result<(), CommandError> = async {
            let server = utils::find_resource(compute.servers(), name).await?;
            compute.servers().delete(server.id()).await?;
            if args.wait && !commands::wait_for_delete(compute.servers(), server.id(), "Deleting server").await? {
                return Err(CommandError::new(format!("Error deleting server: {}", server.id())));
            }
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let server = utils::find_resource(compute.servers(), &args.server).await?;
    let id = server.id();

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    if let Some(description) = args.description {
        if !microversion_at_least(compute.version(), 2, 19) {
            return Err(CommandError::new(
                "--os-compute-api-version 2.19 or greater is required to support the --description option",
            )
            .into());
        }
        body.insert("description".into(), Value::from(description));
    }
    if !body.is_empty() {
        compute.servers().update(id, Value::Object(body)).await?;
    }

    if !args.properties.is_empty() {
        compute
            .set_server_metadata(id, &commands::properties(&args.properties))
            .await?;
    }

    if let Some(state) = args.state {
        compute
            .server_action(id, "os-resetState", json!({ "state": state.to_string() }))
            .await?;
    }

    if args.root_password {
        let password = utils::get_password("New password: ", true)?;
        compute
            .server_action(id, "changePassword", json!({ "adminPass": password }))
            .await?;
    }
    Ok(())
}

async fn unset(args: UnsetArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let server = utils::find_resource(compute.servers(), &args.server).await?;

    for key in &args.properties {
        compute.delete_server_metadata(server.id(), key).await?;
    }
    if args.description {
        if !microversion_at_least(compute.version(), 2, 19) {
            return Err(CommandError::new(
                "--os-compute-api-version 2.19 or greater is required to support the --description option",
            )
            .into());
        }
        compute
            .servers()
            .update(server.id(), json!({ "description": Value::Null }))
            .await?;
    }
    Ok(())
}

/// Run a body-less server action on each server in turn
async fn each(args: ServersArgs, ctx: &Context, action: &str) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    for name in &args.servers {
        let server = utils::find_resource(compute.servers(), name).await?;
        tracing::debug!("{} {}", action, server.id());
        compute.server_action(server.id(), action, Value::Null).await?;
    }
    Ok(())
}

async fn reboot(args: RebootArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let server = utils::find_resource(compute.servers(), &args.server).await?;
    let kind = if args.hard { "HARD" } else { "SOFT" };
    compute
        .server_action(server.id(), "reboot", json!({ "type": kind }))
        .await?;

    if args.wait {
        let ok = commands::wait_for_status(
            compute.servers(),
            server.id(),
            &["active"],
            &["error"],
            "Rebooting server",
        )
        .await?;
        if !ok {
            return Err(CommandError::new(format!("Error rebooting server: {}", server.id())).into());
        }
    }
    Ok(())
}

/// `net1=10.0.0.3, fd00::5; net2=172.24.4.2`, networks sorted
pub fn format_addresses(data: &Value) -> String {
    let Some(networks) = data.as_object() else {
        return utils::value_to_string(data);
    };
    let mut names: Vec<&String> = networks.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|net| {
            let addrs: Vec<String> = networks[net.as_str()]
                .as_array()
                .map(|list| {
                    list.iter()
                        .filter_map(|a| a.get("addr").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            format!("{}={}", net, addrs.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Image ID, or a marker for servers booted from a volume
pub fn format_image(data: &Value) -> String {
    match data.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => "N/A (booted from volume)".to_string(),
    }
}

/// Flavor name embedded by newer microversions, else the flavor ID
pub fn format_flavor(data: &Value) -> String {
    data.get("original_name")
        .or_else(|| data.get("id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn format_power_state(data: &Value) -> String {
    match data.as_u64() {
        Some(n) => POWER_STATES
            .get(n as usize)
            .map(|s| s.to_string())
            .unwrap_or_else(|| n.to_string()),
        None => utils::value_to_string(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_addresses_sorted_by_network() {
        let addresses = json!({
            "public": [{"addr": "172.24.4.2", "version": 4}],
            "private": [{"addr": "10.0.0.3"}, {"addr": "fd00::5"}]
        });
        assert_eq!(
            format_addresses(&addresses),
            "private=10.0.0.3, fd00::5; public=172.24.4.2"
        );
    }

    #[test]
    fn test_format_image() {
        assert_eq!(format_image(&json!({"id": "img-1", "links": []})), "img-1");
        assert_eq!(format_image(&json!("")), "N/A (booted from volume)");
    }

    #[test]
    fn test_format_flavor_prefers_original_name() {
        assert_eq!(format_flavor(&json!({"original_name": "m1.small", "vcpus": 1})), "m1.small");
        assert_eq!(format_flavor(&json!({"id": "2"})), "2");
    }

    #[test]
    fn test_format_power_state() {
        assert_eq!(format_power_state(&json!(1)), "Running");
        assert_eq!(format_power_state(&json!(4)), "Shutdown");
        assert_eq!(format_power_state(&json!(7)), "Suspended");
        assert_eq!(format_power_state(&json!(2)), "");
        assert_eq!(format_power_state(&json!(9)), "9");
    }

    #[test]
    fn test_flatten_server() {
        let server = Resource::from_value(json!({
            "id": "s1",
            "addresses": {"net": [{"addr": "10.0.0.1"}]},
            "OS-EXT-STS:power_state": 1,
            "metadata": {"k": "v"}
        }))
        .unwrap();
        let flat = flatten_server(server);
        assert_eq!(flat.get("power_state"), Some(&json!(1)));
        assert_eq!(flat.get("properties"), Some(&json!({"k": "v"})));
        assert!(flat.get("networks").is_some());
    }
}
