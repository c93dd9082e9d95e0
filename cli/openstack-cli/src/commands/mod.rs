// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! CLI commands

pub mod common;
pub mod compute;
pub mod identity;
pub mod network;
pub mod object;
pub mod volume;

pub use common::{CompleteArgs, ConfigurationCommand};
pub use compute::{FlavorCommand, KeypairCommand, ServerCommand};
pub use identity::{ProjectCommand, RoleCommand, TokenCommand, UserCommand};
pub use network::{NetworkCommand, PortCommand, RouterCommand, SecurityCommand, SubnetCommand};
pub use object::{ContainerCommand, ObjectCommand};
pub use volume::VolumeCommand;

use std::time::Duration;

use openstack_auth::keystone::IdentityVersion;
use openstack_client::{ClientManager, IdentityClient, Manager, Resource};
use serde_json::{Map, Value};

use crate::error::CommandError;
use crate::output::FormatArgs;
use crate::output::progress::Spinner;
use crate::parseractions::{KeyValue, key_values};
use crate::utils;

/// Poll interval for `--wait`
pub const WAIT_INTERVAL: Duration = Duration::from_secs(5);

/// How long `--wait` on delete keeps polling
pub const DELETE_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared state handed to every command
pub struct Context {
    pub clients: ClientManager,
    pub format: FormatArgs,
}

/// `--property` occurrences as a JSON object of strings
pub fn properties(items: &[KeyValue]) -> Map<String, Value> {
    key_values(items)
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// Query pairs from optional values; unset values are skipped
pub fn query(pairs: &[(&str, Option<String>)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
        .collect()
}

/// `--foo` / `--no-foo` pair to a tri-state
pub fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Insert `key` into `body` when `value` is set
pub fn insert_opt<V: Into<Value>>(body: &mut Map<String, Value>, key: &str, value: Option<V>) {
    if let Some(v) = value {
        body.insert(key.to_string(), v.into());
    }
}

pub async fn find_domain(identity: &IdentityClient, domain: &str) -> Result<Resource, CommandError> {
    utils::find_resource(identity.domains()?, domain).await
}

/// Domain ID for an optional `--domain` style argument (v3 only)
pub async fn domain_id(identity: &IdentityClient, domain: Option<&str>) -> Result<Option<String>, CommandError> {
    match domain {
        Some(d) if identity.version() == IdentityVersion::V3 => {
            Ok(Some(find_domain(identity, d).await?.id().to_string()))
        }
        _ => Ok(None),
    }
}

fn domain_filter(domain_id: Option<String>) -> Vec<(String, String)> {
    query(&[("domain_id", domain_id)])
}

/// Resolve a project, optionally within `domain`
pub async fn find_project(
    identity: &IdentityClient,
    project: &str,
    domain: Option<&str>,
) -> Result<Resource, CommandError> {
    let filters = domain_filter(domain_id(identity, domain).await?);
    utils::find_resource_with(identity.projects(), project, &filters).await
}

/// Resolve a user, optionally within `domain`
pub async fn find_user(identity: &IdentityClient, user: &str, domain: Option<&str>) -> Result<Resource, CommandError> {
    let filters = domain_filter(domain_id(identity, domain).await?);
    utils::find_resource_with(identity.users(), user, &filters).await
}

pub async fn find_group(identity: &IdentityClient, group: &str, domain: Option<&str>) -> Result<Resource, CommandError> {
    let filters = domain_filter(domain_id(identity, domain).await?);
    utils::find_resource_with(identity.groups()?, group, &filters).await
}

/// Project ID for `--project`/`--project-domain`
pub async fn project_id(ctx: &Context, project: &str, domain: Option<&str>) -> Result<String, CommandError> {
    let identity = ctx.clients.identity().await?;
    Ok(find_project(identity, project, domain).await?.id().to_string())
}

/// Poll with a spinner until the resource reaches a success or error
/// status
pub async fn wait_for_status(
    manager: &dyn Manager,
    id: &str,
    success: &[&str],
    error: &[&str],
    message: &str,
) -> Result<bool, CommandError> {
    let mut spinner = Spinner::new(message);
    let ok = {
        let mut progress = |p: u64| spinner.update(p);
        utils::wait_for_status(manager, id, "status", success, error, WAIT_INTERVAL, Some(&mut progress)).await?
    };
    spinner.finish();
    Ok(ok)
}

/// Poll with a spinner until the resource is gone
pub async fn wait_for_delete(manager: &dyn Manager, id: &str, message: &str) -> Result<bool, CommandError> {
    let mut spinner = Spinner::new(message);
    let gone = {
        let mut progress = |p: u64| spinner.update(p);
        utils::wait_for_delete(
            manager,
            id,
            "status",
            &["error"],
            WAIT_INTERVAL,
            DELETE_TIMEOUT,
            Some(&mut progress),
        )
        .await?
    };
    spinner.finish();
    Ok(gone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parseractions::parse_key_value;
    use serde_json::json;

    #[test]
    fn test_toggle() {
        assert_eq!(toggle(true, false), Some(true));
        assert_eq!(toggle(false, true), Some(false));
        assert_eq!(toggle(false, false), None);
    }

    #[test]
    fn test_query_skips_unset() {
        let q = query(&[("name", Some("web".into())), ("status", None)]);
        assert_eq!(q, vec![("name".to_string(), "web".to_string())]);
    }

    #[test]
    fn test_properties() {
        let items = vec![parse_key_value("a=1").unwrap(), parse_key_value("b=x=y").unwrap()];
        assert_eq!(Value::Object(properties(&items)), json!({"a": "1", "b": "x=y"}));
    }

    #[test]
    fn test_insert_opt() {
        let mut body = Map::new();
        insert_opt(&mut body, "name", Some("n"));
        insert_opt::<bool>(&mut body, "enabled", None);
        assert_eq!(Value::Object(body), json!({"name": "n"}));
    }
}
