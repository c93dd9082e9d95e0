// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Network (Neutron) client

use std::sync::Arc;

use serde_json::{Value, json};

use crate::manager::{ResourceManager, ResourceSpec};
use crate::{ApiError, ServiceClient, Session};

pub const SERVICE_TYPE: &str = "network";

const NETWORKS: ResourceSpec = ResourceSpec::new("network", "networks", "networks");
const SUBNETS: ResourceSpec = ResourceSpec::new("subnet", "subnets", "subnets");
const PORTS: ResourceSpec = ResourceSpec::new("port", "ports", "ports");
const ROUTERS: ResourceSpec = ResourceSpec::new("router", "routers", "routers");
const SECURITY_GROUPS: ResourceSpec =
    ResourceSpec::new("security_group", "security_groups", "security-groups").display_name("security group");
const SECURITY_GROUP_RULES: ResourceSpec =
    ResourceSpec::new("security_group_rule", "security_group_rules", "security-group-rules")
        .display_name("security group rule")
        .without_name_filter();

/// Router interface target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterInterface {
    Subnet(String),
    Port(String),
}

impl RouterInterface {
    fn body(&self) -> Value {
        match self {
            Self::Subnet(id) => json!({ "subnet_id": id }),
            Self::Port(id) => json!({ "port_id": id }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetworkClient {
    client: ServiceClient,
    networks: ResourceManager,
    subnets: ResourceManager,
    ports: ResourceManager,
    routers: ResourceManager,
    security_groups: ResourceManager,
    security_group_rules: ResourceManager,
}

impl NetworkClient {
    /// Build from the catalog's `network` endpoint
    ///
    /// Neutron publishes an unversioned endpoint; only API 2.0 exists,
    /// so `version` must start with `2`.
    pub fn new(session: Arc<Session>, version: &str) -> Result<Self, ApiError> {
        if !version.starts_with('2') {
            return Err(ApiError::Config(format!(
                "Network API version {} is not supported",
                version
            )));
        }
        let base = session.endpoint_for(&[SERVICE_TYPE])?;
        let endpoint = with_v2_suffix(&base);
        tracing::debug!("network endpoint {}", endpoint);
        let client = ServiceClient::new(session, SERVICE_TYPE, endpoint);

        Ok(Self {
            networks: ResourceManager::new(client.clone(), NETWORKS),
            subnets: ResourceManager::new(client.clone(), SUBNETS),
            ports: ResourceManager::new(client.clone(), PORTS),
            routers: ResourceManager::new(client.clone(), ROUTERS),
            security_groups: ResourceManager::new(client.clone(), SECURITY_GROUPS),
            security_group_rules: ResourceManager::new(client.clone(), SECURITY_GROUP_RULES),
            client,
        })
    }

    pub fn networks(&self) -> &ResourceManager {
        &self.networks
    }

    pub fn subnets(&self) -> &ResourceManager {
        &self.subnets
    }

    pub fn ports(&self) -> &ResourceManager {
        &self.ports
    }

    pub fn routers(&self) -> &ResourceManager {
        &self.routers
    }

    pub fn security_groups(&self) -> &ResourceManager {
        &self.security_groups
    }

    pub fn security_group_rules(&self) -> &ResourceManager {
        &self.security_group_rules
    }

    pub async fn add_router_interface(&self, router_id: &str, target: &RouterInterface) -> Result<(), ApiError> {
        let path = format!("{}/add_router_interface", self.routers.item_path(router_id));
        self.client.put_json(&path, Some(&target.body())).await?;
        Ok(())
    }

    pub async fn remove_router_interface(&self, router_id: &str, target: &RouterInterface) -> Result<(), ApiError> {
        let path = format!("{}/remove_router_interface", self.routers.item_path(router_id));
        self.client.put_json(&path, Some(&target.body())).await?;
        Ok(())
    }
}

fn with_v2_suffix(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/v2.0") {
        trimmed.to_string()
    } else {
        format!("{}/v2.0", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v2_suffix() {
        assert_eq!(with_v2_suffix("http://neutron:9696/"), "http://neutron:9696/v2.0");
        assert_eq!(with_v2_suffix("http://neutron:9696/v2.0"), "http://neutron:9696/v2.0");
    }

    #[test]
    fn test_router_interface_body() {
        assert_eq!(
            RouterInterface::Subnet("s1".into()).body(),
            json!({"subnet_id": "s1"})
        );
        assert_eq!(RouterInterface::Port("p1".into()).body(), json!({"port_id": "p1"}));
    }
}
