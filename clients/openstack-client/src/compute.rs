// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Compute (Nova) client

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::manager::{ResourceManager, ResourceSpec};
use crate::{ApiError, ServiceClient, Session};

pub const SERVICE_TYPE: &str = "compute";

const SERVERS: ResourceSpec = ResourceSpec::new("server", "servers", "servers").list_path("servers/detail");
const FLAVORS: ResourceSpec = ResourceSpec::new("flavor", "flavors", "flavors")
    .list_path("flavors/detail")
    .without_name_filter();
const KEYPAIRS: ResourceSpec = ResourceSpec::new("keypair", "keypairs", "os-keypairs")
    .list_item_key("keypair")
    .without_name_filter();

/// Nova endpoint plus managers for the resources the CLI handles
#[derive(Debug, Clone)]
pub struct ComputeClient {
    client: ServiceClient,
    version: String,
    servers: ResourceManager,
    flavors: ResourceManager,
    keypairs: ResourceManager,
}

impl ComputeClient {
    /// Build from the catalog's `compute` endpoint, pinning `version`
    /// as the requested microversion
    pub fn new(session: Arc<Session>, version: &str) -> Result<Self, ApiError> {
        let endpoint = session.endpoint_for(&[SERVICE_TYPE])?;
        let client = ServiceClient::new(session, SERVICE_TYPE, endpoint)
            .with_header("X-OpenStack-Nova-API-Version", version)
            .with_header("OpenStack-API-Version", format!("compute {}", version));
        tracing::debug!("compute endpoint {} (microversion {})", client.endpoint(), version);

        Ok(Self {
            servers: ResourceManager::new(client.clone(), SERVERS),
            flavors: ResourceManager::new(client.clone(), FLAVORS),
            keypairs: ResourceManager::new(client.clone(), KEYPAIRS),
            version: version.to_string(),
            client,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn servers(&self) -> &ResourceManager {
        &self.servers
    }

    pub fn flavors(&self) -> &ResourceManager {
        &self.flavors
    }

    pub fn keypairs(&self) -> &ResourceManager {
        &self.keypairs
    }

    /// Run a server action such as `os-start` or `reboot`
    pub async fn server_action(&self, id: &str, action: &str, body: Value) -> Result<(), ApiError> {
        self.servers.action(id, action, body).await?;
        Ok(())
    }

    /// Merge `metadata` into the server's metadata
    pub async fn set_server_metadata(&self, id: &str, metadata: &Map<String, Value>) -> Result<(), ApiError> {
        let path = format!("{}/metadata", self.servers.item_path(id));
        self.client
            .post_json(&path, &json!({ "metadata": metadata }))
            .await?;
        Ok(())
    }

    pub async fn delete_server_metadata(&self, id: &str, key: &str) -> Result<(), ApiError> {
        let path = format!(
            "{}/metadata/{}",
            self.servers.item_path(id),
            urlencoding::encode(key)
        );
        self.client.delete(&path).await
    }

    pub async fn flavor_extra_specs(&self, id: &str) -> Result<Map<String, Value>, ApiError> {
        let path = format!("{}/os-extra_specs", self.flavors.item_path(id));
        let value = self.client.get_json(&path, &[]).await?;
        Ok(value
            .get("extra_specs")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default())
    }

    pub async fn set_flavor_extra_specs(&self, id: &str, specs: &Map<String, Value>) -> Result<(), ApiError> {
        let path = format!("{}/os-extra_specs", self.flavors.item_path(id));
        self.client
            .post_json(&path, &json!({ "extra_specs": specs }))
            .await?;
        Ok(())
    }

    pub async fn delete_flavor_extra_spec(&self, id: &str, key: &str) -> Result<(), ApiError> {
        let path = format!(
            "{}/os-extra_specs/{}",
            self.flavors.item_path(id),
            urlencoding::encode(key)
        );
        self.client.delete(&path).await
    }

    /// Grant a project access to a private flavor
    pub async fn add_flavor_access(&self, id: &str, project_id: &str) -> Result<(), ApiError> {
        self.flavors
            .action(id, "addTenantAccess", json!({ "tenant": project_id }))
            .await?;
        Ok(())
    }

    pub async fn remove_flavor_access(&self, id: &str, project_id: &str) -> Result<(), ApiError> {
        self.flavors
            .action(id, "removeTenantAccess", json!({ "tenant": project_id }))
            .await?;
        Ok(())
    }
}
