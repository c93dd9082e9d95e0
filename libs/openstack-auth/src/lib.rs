// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Keystone authentication for the openstack CLI
//!
//! This library turns a bag of user-supplied credentials into an
//! authenticated session. It supports:
//!
//! - Choosing an auth plugin from the options that are present
//! - Validating that the chosen plugin has everything it needs
//! - Issuing tokens against Keystone v2.0 and v3
//! - Looking up service endpoints in the returned catalog
//!
//! # Authentication Flow
//!
//! 1. Fill an [`AuthOptions`] from flags, environment and `clouds.yaml`
//! 2. Call [`select_auth_plugin`] to pick an [`AuthPlugin`]
//! 3. Call [`check_valid_auth_options`] to report missing options up front
//! 4. Build an [`Authenticator`] and call `authenticate` to obtain an
//!    [`AuthSession`] holding the token and the service catalog
//!
//! # Example
//!
//! ```ignore
//! use openstack_auth::{AuthOptions, Authenticator, select_auth_plugin};
//!
//! let mut opts = AuthOptions::default();
//! opts.auth_url = Some("https://keystone.example.com/v3".into());
//! opts.username = Some("demo".into());
//! opts.password = Some("secret".into());
//! opts.project_name = Some("demo".into());
//!
//! let plugin = select_auth_plugin(&opts);
//! let session = Authenticator::new(plugin, opts).authenticate(&reqwest::Client::new()).await?;
//! let nova = session.catalog.url_for(&["compute"], "public", None)?;
//! ```

pub mod catalog;
pub mod error;
pub mod keystone;
pub mod plugin;

pub use catalog::{CatalogEndpoint, CatalogEntry, ServiceCatalog};
pub use error::AuthError;
pub use keystone::{AuthSession, Authenticator};
pub use plugin::{AuthPlugin, PLUGIN_LIST, check_valid_auth_options, select_auth_plugin};

/// Default identity API major version
pub const DEFAULT_IDENTITY_API_VERSION: &str = "3";

/// Default endpoint interface
pub const DEFAULT_INTERFACE: &str = "public";

/// Credentials and scope used to obtain a token
#[derive(Clone, Debug)]
pub struct AuthOptions {
    /// Keystone endpoint, e.g. `https://keystone:5000/v3`
    pub auth_url: Option<String>,
    /// Explicit plugin name (`--os-auth-type`)
    pub auth_type: Option<String>,
    /// Service endpoint used with a pre-issued token (`--os-url`)
    pub url: Option<String>,
    /// Pre-issued token
    pub token: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub project_name: Option<String>,
    pub project_id: Option<String>,
    pub user_domain_name: Option<String>,
    pub user_domain_id: Option<String>,
    pub project_domain_name: Option<String>,
    pub project_domain_id: Option<String>,
    /// Domain scope (v3 only)
    pub domain_name: Option<String>,
    pub domain_id: Option<String>,
    /// Identity API version string, e.g. `3` or `2.0`
    pub identity_api_version: String,
    pub region_name: Option<String>,
    /// Endpoint interface: `public`, `internal` or `admin`
    pub interface: String,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            auth_url: None,
            auth_type: None,
            url: None,
            token: None,
            username: None,
            user_id: None,
            password: None,
            project_name: None,
            project_id: None,
            user_domain_name: None,
            user_domain_id: None,
            project_domain_name: None,
            project_domain_id: None,
            domain_name: None,
            domain_id: None,
            identity_api_version: DEFAULT_IDENTITY_API_VERSION.to_string(),
            region_name: None,
            interface: DEFAULT_INTERFACE.to_string(),
        }
    }
}

impl AuthOptions {
    /// True when the options identify a user by name or ID
    pub fn has_user(&self) -> bool {
        self.username.is_some() || self.user_id.is_some()
    }

    /// True when a project scope is requested
    pub fn has_project_scope(&self) -> bool {
        self.project_name.is_some() || self.project_id.is_some()
    }

    /// True when a domain scope is requested
    pub fn has_domain_scope(&self) -> bool {
        self.domain_name.is_some() || self.domain_id.is_some()
    }
}
