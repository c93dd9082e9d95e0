// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Block storage (Cinder) client

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::manager::{ResourceManager, ResourceSpec};
use crate::{ApiError, ServiceClient, Session};

const VOLUMES: ResourceSpec = ResourceSpec::new("volume", "volumes", "volumes").list_path("volumes/detail");
const VOLUME_TYPES: ResourceSpec = ResourceSpec::new("volume_type", "volume_types", "types")
    .display_name("volume type")
    .without_name_filter();
const SNAPSHOTS: ResourceSpec = ResourceSpec::new("snapshot", "snapshots", "snapshots")
    .list_path("snapshots/detail")
    .display_name("volume snapshot");

/// Catalog service types to try for a volume API version
pub fn service_types(version: &str) -> &'static [&'static str] {
    if version.starts_with('2') {
        &["volumev2", "volume"]
    } else {
        &["volumev3", "block-storage", "volume"]
    }
}

#[derive(Debug, Clone)]
pub struct VolumeClient {
    client: ServiceClient,
    volumes: ResourceManager,
    types: ResourceManager,
    snapshots: ResourceManager,
}

impl VolumeClient {
    /// Build from the catalog; a dotted `version` such as `3.42` is
    /// also sent as the requested microversion
    pub fn new(session: Arc<Session>, version: &str) -> Result<Self, ApiError> {
        let types = service_types(version);
        let endpoint = session.endpoint_for(types)?;
        let mut client = ServiceClient::new(session, "volume", endpoint);
        if version.contains('.') {
            client = client.with_header("OpenStack-API-Version", format!("volume {}", version));
        }
        tracing::debug!("volume endpoint {}", client.endpoint());

        Ok(Self {
            volumes: ResourceManager::new(client.clone(), VOLUMES),
            types: ResourceManager::new(client.clone(), VOLUME_TYPES),
            snapshots: ResourceManager::new(client.clone(), SNAPSHOTS),
            client,
        })
    }

    pub fn volumes(&self) -> &ResourceManager {
        &self.volumes
    }

    pub fn volume_types(&self) -> &ResourceManager {
        &self.types
    }

    pub fn snapshots(&self) -> &ResourceManager {
        &self.snapshots
    }

    /// Run a volume action such as `os-extend` or `os-reset_status`
    pub async fn volume_action(&self, id: &str, action: &str, body: Value) -> Result<(), ApiError> {
        self.volumes.action(id, action, body).await?;
        Ok(())
    }

    pub async fn set_volume_metadata(&self, id: &str, metadata: &Map<String, Value>) -> Result<(), ApiError> {
        let path = format!("{}/metadata", self.volumes.item_path(id));
        self.client
            .post_json(&path, &json!({ "metadata": metadata }))
            .await?;
        Ok(())
    }

    pub async fn delete_volume_metadata(&self, id: &str, key: &str) -> Result<(), ApiError> {
        let path = format!(
            "{}/metadata/{}",
            self.volumes.item_path(id),
            urlencoding::encode(key)
        );
        self.client.delete(&path).await
    }

    pub async fn set_type_extra_specs(&self, id: &str, specs: &Map<String, Value>) -> Result<(), ApiError> {
        let path = format!("{}/extra_specs", self.types.item_path(id));
        self.client
            .post_json(&path, &json!({ "extra_specs": specs }))
            .await?;
        Ok(())
    }

    pub async fn delete_type_extra_spec(&self, id: &str, key: &str) -> Result<(), ApiError> {
        let path = format!(
            "{}/extra_specs/{}",
            self.types.item_path(id),
            urlencoding::encode(key)
        );
        self.client.delete(&path).await
    }

    pub async fn add_type_access(&self, id: &str, project_id: &str) -> Result<(), ApiError> {
        self.types
            .action(id, "addProjectAccess", json!({ "project": project_id }))
            .await?;
        Ok(())
    }

    pub async fn remove_type_access(&self, id: &str, project_id: &str) -> Result<(), ApiError> {
        self.types
            .action(id, "removeProjectAccess", json!({ "project": project_id }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_types_by_version() {
        assert_eq!(service_types("2"), &["volumev2", "volume"]);
        assert_eq!(service_types("3.42")[0], "volumev3");
    }
}
