// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Configuration management
//!
//! Precedence, highest first: command-line flags, `OS_*` environment
//! variables, the cloud selected with `--os-cloud`, built-in defaults.

pub mod clouds;
pub mod paths;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use openstack_auth::{AuthOptions, DEFAULT_IDENTITY_API_VERSION, DEFAULT_INTERFACE};
use openstack_client::{ApiVersions, SessionConfig};

use crate::utils;
pub use clouds::{CloudEntry, find_cloud};

/// Endpoint interface in the service catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Interface {
    Public,
    Internal,
    Admin,
}

/// Authentication and connection options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Cloud name in clouds.yaml
    #[arg(long, global = true, env = "OS_CLOUD", value_name = "NAME")]
    pub os_cloud: Option<String>,

    /// Authentication URL
    #[arg(long, global = true, env = "OS_AUTH_URL", value_name = "URL")]
    pub os_auth_url: Option<String>,

    /// Select an authentication type
    #[arg(long, global = true, env = "OS_AUTH_TYPE", value_name = "AUTH_TYPE")]
    pub os_auth_type: Option<String>,

    /// Service endpoint used with --os-token
    #[arg(long, alias = "os-endpoint", global = true, env = "OS_URL", value_name = "URL")]
    pub os_url: Option<String>,

    /// Authentication token
    #[arg(long, global = true, env = "OS_TOKEN", hide_env_values = true)]
    pub os_token: Option<String>,

    /// Authentication username
    #[arg(long, global = true, env = "OS_USERNAME")]
    pub os_username: Option<String>,

    /// Authentication user ID
    #[arg(long, global = true, env = "OS_USER_ID")]
    pub os_user_id: Option<String>,

    /// Authentication password
    #[arg(long, global = true, env = "OS_PASSWORD", hide_env_values = true)]
    pub os_password: Option<String>,

    /// Project name to scope to
    #[arg(long, alias = "os-tenant-name", global = true, env = "OS_PROJECT_NAME")]
    pub os_project_name: Option<String>,

    /// Project ID to scope to
    #[arg(long, alias = "os-tenant-id", global = true, env = "OS_PROJECT_ID")]
    pub os_project_id: Option<String>,

    /// Domain name of the user
    #[arg(long, global = true, env = "OS_USER_DOMAIN_NAME")]
    pub os_user_domain_name: Option<String>,

    /// Domain ID of the user
    #[arg(long, global = true, env = "OS_USER_DOMAIN_ID")]
    pub os_user_domain_id: Option<String>,

    /// Domain name containing the project
    #[arg(long, global = true, env = "OS_PROJECT_DOMAIN_NAME")]
    pub os_project_domain_name: Option<String>,

    /// Domain ID containing the project
    #[arg(long, global = true, env = "OS_PROJECT_DOMAIN_ID")]
    pub os_project_domain_id: Option<String>,

    /// Domain name to scope to
    #[arg(long, global = true, env = "OS_DOMAIN_NAME")]
    pub os_domain_name: Option<String>,

    /// Domain ID to scope to
    #[arg(long, global = true, env = "OS_DOMAIN_ID")]
    pub os_domain_id: Option<String>,

    /// Authentication region name
    #[arg(long, global = true, env = "OS_REGION_NAME")]
    pub os_region_name: Option<String>,

    /// Select an interface type
    #[arg(long, global = true, env = "OS_INTERFACE", value_enum)]
    pub os_interface: Option<Interface>,

    /// CA certificate bundle file
    #[arg(long, global = true, env = "OS_CACERT", value_name = "CA_BUNDLE_FILE")]
    pub os_cacert: Option<PathBuf>,

    /// Disable server certificate verification
    #[arg(long, global = true, env = "OS_INSECURE")]
    pub insecure: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "OS_TIMEOUT", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Compute API version
    #[arg(long, global = true, env = "OS_COMPUTE_API_VERSION", value_name = "VERSION")]
    pub os_compute_api_version: Option<String>,

    /// Identity API version
    #[arg(long, global = true, env = "OS_IDENTITY_API_VERSION", value_name = "VERSION")]
    pub os_identity_api_version: Option<String>,

    /// Network API version
    #[arg(long, global = true, env = "OS_NETWORK_API_VERSION", value_name = "VERSION")]
    pub os_network_api_version: Option<String>,

    /// Volume API version
    #[arg(long, global = true, env = "OS_VOLUME_API_VERSION", value_name = "VERSION")]
    pub os_volume_api_version: Option<String>,

    /// Object store API version
    #[arg(long, global = true, env = "OS_OBJECT_API_VERSION", value_name = "VERSION")]
    pub os_object_api_version: Option<String>,
}

/// Everything needed to build a client manager
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// Selected cloud, if any
    pub name: Option<String>,
    pub options: AuthOptions,
    pub session: SessionConfig,
    pub versions: ApiVersions,
}

impl GlobalArgs {
    /// Merge flags and environment with the selected cloud
    pub fn resolve(&self) -> Result<CloudConfig> {
        let cloud = match &self.os_cloud {
            Some(name) => find_cloud(name, &paths::clouds_files(), &paths::secure_files())?,
            None => CloudEntry::default(),
        };
        Ok(self.merge(cloud))
    }

    /// Overlay these arguments on a cloud entry
    pub fn merge(&self, cloud: CloudEntry) -> CloudConfig {
        let auth = cloud.auth;
        let pick = |flag: &Option<String>, file: Option<String>| flag.clone().or(file);

        let options = AuthOptions {
            auth_url: pick(&self.os_auth_url, auth.auth_url),
            auth_type: self
                .os_auth_type
                .clone()
                .or_else(|| utils::env(&["OS_AUTH_PLUGIN"]))
                .or(cloud.auth_type),
            url: pick(&self.os_url, auth.url),
            token: pick(&self.os_token, auth.token),
            username: pick(&self.os_username, auth.username),
            user_id: pick(&self.os_user_id, auth.user_id),
            password: pick(&self.os_password, auth.password),
            project_name: pick(&self.os_project_name, auth.project_name),
            project_id: pick(&self.os_project_id, auth.project_id),
            user_domain_name: pick(&self.os_user_domain_name, auth.user_domain_name),
            user_domain_id: pick(&self.os_user_domain_id, auth.user_domain_id),
            project_domain_name: pick(&self.os_project_domain_name, auth.project_domain_name),
            project_domain_id: pick(&self.os_project_domain_id, auth.project_domain_id),
            domain_name: pick(&self.os_domain_name, auth.domain_name),
            domain_id: pick(&self.os_domain_id, auth.domain_id),
            identity_api_version: pick(&self.os_identity_api_version, cloud.identity_api_version.clone())
                .unwrap_or_else(|| DEFAULT_IDENTITY_API_VERSION.to_string()),
            region_name: pick(&self.os_region_name, cloud.region_name),
            interface: self
                .os_interface
                .map(|i| i.to_string())
                .or(cloud.interface)
                .unwrap_or_else(|| DEFAULT_INTERFACE.to_string()),
        };

        let session = SessionConfig {
            insecure: self.insecure || cloud.verify == Some(false),
            cacert: self.os_cacert.clone().or(cloud.cacert),
            timeout: self.timeout.map(Duration::from_secs),
        };

        let defaults = ApiVersions::default();
        let versions = ApiVersions {
            compute: pick(&self.os_compute_api_version, cloud.compute_api_version)
                .unwrap_or(defaults.compute),
            identity: options.identity_api_version.clone(),
            network: pick(&self.os_network_api_version, cloud.network_api_version)
                .unwrap_or(defaults.network),
            volume: pick(&self.os_volume_api_version, cloud.volume_api_version)
                .unwrap_or(defaults.volume),
            object_store: pick(&self.os_object_api_version, cloud.object_store_api_version)
                .unwrap_or(defaults.object_store),
        };

        CloudConfig {
            name: self.os_cloud.clone(),
            options,
            session,
            versions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clouds::AuthSection;
    use pretty_assertions::assert_eq;

    fn cloud() -> CloudEntry {
        CloudEntry {
            auth: AuthSection {
                auth_url: Some("http://keystone/v3".into()),
                username: Some("file-user".into()),
                password: Some("file-pass".into()),
                project_name: Some("file-project".into()),
                ..AuthSection::default()
            },
            region_name: Some("RegionOne".into()),
            identity_api_version: Some("3".into()),
            volume_api_version: Some("2".into()),
            verify: Some(false),
            ..CloudEntry::default()
        }
    }

    #[test]
    fn test_flags_override_cloud() {
        let args = GlobalArgs {
            os_username: Some("flag-user".into()),
            os_compute_api_version: Some("2.53".into()),
            ..GlobalArgs::default()
        };
        let config = args.merge(cloud());
        assert_eq!(config.options.username.as_deref(), Some("flag-user"));
        assert_eq!(config.options.password.as_deref(), Some("file-pass"));
        assert_eq!(config.options.region_name.as_deref(), Some("RegionOne"));
        assert_eq!(config.versions.compute, "2.53");
        assert_eq!(config.versions.volume, "2");
        assert!(config.session.insecure);
    }

    #[test]
    fn test_defaults_without_cloud() {
        let config = GlobalArgs::default().merge(CloudEntry::default());
        assert_eq!(config.options.identity_api_version, "3");
        assert_eq!(config.options.interface, "public");
        assert_eq!(config.versions, ApiVersions::default());
        assert!(!config.session.insecure);
        assert_eq!(config.name, None);
    }

    #[test]
    fn test_interface_flag() {
        let args = GlobalArgs {
            os_interface: Some(Interface::Internal),
            ..GlobalArgs::default()
        };
        assert_eq!(args.merge(CloudEntry::default()).options.interface, "internal");
    }
}
