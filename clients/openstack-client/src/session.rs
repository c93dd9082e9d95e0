// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Authenticated HTTP session shared by every service client

use std::path::PathBuf;
use std::time::Duration;

use openstack_auth::{AuthOptions, AuthPlugin, AuthSession, Authenticator};

use crate::ApiError;

/// Transport settings that apply to every request
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Extra CA bundle (PEM)
    pub cacert: Option<PathBuf>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
}

/// Install the ring crypto provider for rustls
///
/// reqwest is built without a bundled provider, so one has to be in
/// place before the first client is constructed. Repeated calls are
/// harmless.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Build the reqwest client used for Keystone and every service
pub fn build_http_client(config: &SessionConfig) -> Result<reqwest::Client, ApiError> {
    install_crypto_provider();

    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("openstack-cli/", env!("CARGO_PKG_VERSION")))
        .danger_accept_invalid_certs(config.insecure);

    if let Some(path) = &config.cacert {
        let pem = std::fs::read(path).map_err(|e| {
            ApiError::Config(format!("Unable to read CA bundle {}: {}", path.display(), e))
        })?;
        let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
            ApiError::Config(format!("Invalid CA bundle {}: {}", path.display(), e))
        })?;
        builder = builder.add_root_certificate(cert);
    }

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

/// A token plus the transport used to present it
#[derive(Debug)]
pub struct Session {
    http: reqwest::Client,
    auth: AuthSession,
    interface: String,
    region: Option<String>,
}

impl Session {
    /// Authenticate with `plugin` and keep the resulting token
    pub async fn authenticate(
        plugin: AuthPlugin,
        options: &AuthOptions,
        config: &SessionConfig,
    ) -> Result<Self, ApiError> {
        let http = build_http_client(config)?;
        let auth = Authenticator::new(plugin, options.clone())
            .authenticate(&http)
            .await?;
        tracing::debug!(
            "authenticated, project {:?}, {} catalog entries",
            auth.project_id,
            auth.catalog.entries.len()
        );

        Ok(Self {
            http,
            auth,
            interface: options.interface.clone(),
            region: options.region_name.clone(),
        })
    }

    /// Wrap an existing token; used by tests and by callers that
    /// already hold an [`AuthSession`]
    pub fn from_parts(
        http: reqwest::Client,
        auth: AuthSession,
        interface: impl Into<String>,
        region: Option<String>,
    ) -> Self {
        Self {
            http,
            auth,
            interface: interface.into(),
            region,
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn token(&self) -> &str {
        &self.auth.token
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// Endpoint for the first of `service_types` found in the catalog
    ///
    /// An `--os-url` override replaces catalog lookups entirely.
    pub fn endpoint_for(&self, service_types: &[&str]) -> Result<String, ApiError> {
        if let Some(url) = &self.auth.endpoint_override {
            return Ok(url.clone());
        }
        Ok(self
            .auth
            .catalog
            .url_for(service_types, &self.interface, self.region.as_deref())?)
    }
}
