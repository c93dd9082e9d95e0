// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Per-process holder of lazily built service clients

use std::sync::Arc;

use openstack_auth::{AuthOptions, AuthPlugin, AuthSession, check_valid_auth_options};
use tokio::sync::OnceCell;

use crate::{
    ApiError, ComputeClient, IdentityClient, NetworkClient, ObjectStoreClient, Session,
    SessionConfig, VolumeClient,
};

/// Requested API version per service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersions {
    pub compute: String,
    pub identity: String,
    pub network: String,
    pub volume: String,
    pub object_store: String,
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self {
            compute: "2.1".to_string(),
            identity: openstack_auth::DEFAULT_IDENTITY_API_VERSION.to_string(),
            network: "2".to_string(),
            volume: "3".to_string(),
            object_store: "1".to_string(),
        }
    }
}

/// Authenticates on first use and hands out one client per service
///
/// Nothing touches the network until a command asks for a client, so
/// commands that need no cloud (`configuration show`, `complete`) never
/// authenticate.
#[derive(Debug)]
pub struct ClientManager {
    options: AuthOptions,
    plugin: AuthPlugin,
    config: SessionConfig,
    versions: ApiVersions,
    session: OnceCell<Arc<Session>>,
    compute: OnceCell<ComputeClient>,
    identity: OnceCell<IdentityClient>,
    network: OnceCell<NetworkClient>,
    volume: OnceCell<VolumeClient>,
    object_store: OnceCell<ObjectStoreClient>,
}

impl ClientManager {
    pub fn new(options: AuthOptions, plugin: AuthPlugin, config: SessionConfig, versions: ApiVersions) -> Self {
        Self {
            options,
            plugin,
            config,
            versions,
            session: OnceCell::new(),
            compute: OnceCell::new(),
            identity: OnceCell::new(),
            network: OnceCell::new(),
            volume: OnceCell::new(),
            object_store: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    pub fn plugin(&self) -> AuthPlugin {
        self.plugin
    }

    pub fn versions(&self) -> &ApiVersions {
        &self.versions
    }

    /// Validate options and authenticate, once per process
    pub async fn session(&self) -> Result<&Arc<Session>, ApiError> {
        self.session
            .get_or_try_init(|| async {
                check_valid_auth_options(self.plugin, &self.options)?;
                tracing::debug!("authenticating with auth plugin {}", self.plugin);
                let session = Session::authenticate(self.plugin, &self.options, &self.config).await?;
                Ok::<_, ApiError>(Arc::new(session))
            })
            .await
    }

    pub async fn auth(&self) -> Result<&AuthSession, ApiError> {
        Ok(self.session().await?.auth())
    }

    pub async fn compute(&self) -> Result<&ComputeClient, ApiError> {
        self.compute
            .get_or_try_init(|| async {
                let session = Arc::clone(self.session().await?);
                ComputeClient::new(session, &self.versions.compute)
            })
            .await
    }

    pub async fn identity(&self) -> Result<&IdentityClient, ApiError> {
        self.identity
            .get_or_try_init(|| async {
                let session = Arc::clone(self.session().await?);
                IdentityClient::new(session, &self.versions.identity)
            })
            .await
    }

    pub async fn network(&self) -> Result<&NetworkClient, ApiError> {
        self.network
            .get_or_try_init(|| async {
                let session = Arc::clone(self.session().await?);
                NetworkClient::new(session, &self.versions.network)
            })
            .await
    }

    pub async fn volume(&self) -> Result<&VolumeClient, ApiError> {
        self.volume
            .get_or_try_init(|| async {
                let session = Arc::clone(self.session().await?);
                VolumeClient::new(session, &self.versions.volume)
            })
            .await
    }

    pub async fn object_store(&self) -> Result<&ObjectStoreClient, ApiError> {
        self.object_store
            .get_or_try_init(|| async {
                let session = Arc::clone(self.session().await?);
                ObjectStoreClient::new(session, &self.versions.object_store)
            })
            .await
    }
}
