// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Auth plugin selection
//!
//! Maps the options a user supplied onto one of the known plugin names.
//! The order of the checks matters: a service URL plus a token always
//! wins, even over an explicit `--os-auth-type`, because clouds.yaml
//! defaults `auth_type` to `password`.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, VariantNames};

use crate::{AuthError, AuthOptions};

/// Known authentication plugins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, VariantNames)]
pub enum AuthPlugin {
    /// Password auth, identity version discovered from the auth URL
    #[strum(serialize = "password")]
    Password,
    #[strum(serialize = "v2password")]
    V2Password,
    #[strum(serialize = "v3password")]
    V3Password,
    /// Token auth, identity version discovered from the auth URL
    #[strum(serialize = "token")]
    Token,
    #[strum(serialize = "v2token")]
    V2Token,
    #[strum(serialize = "v3token")]
    V3Token,
    /// Pre-issued token used directly against `--os-url`
    #[strum(to_string = "token_endpoint", serialize = "admin_token")]
    TokenEndpoint,
}

/// Canonical plugin names for `--os-auth-type`; `admin_token` is also
/// accepted as an alias of `token_endpoint`
pub const PLUGIN_LIST: &[&str] = AuthPlugin::VARIANTS;

impl AuthPlugin {
    /// Plugins that authenticate with a user password
    pub fn is_password(self) -> bool {
        matches!(self, Self::Password | Self::V2Password | Self::V3Password)
    }

    /// Plugins that exchange an existing token at Keystone
    pub fn is_token(self) -> bool {
        matches!(self, Self::Token | Self::V2Token | Self::V3Token)
    }
}

/// Pick an auth plugin based on `--os-auth-type` or the other options
pub fn select_auth_plugin(options: &AuthOptions) -> AuthPlugin {
    let version = options.identity_api_version.as_str();

    let plugin = if options.url.is_some() && options.token.is_some() {
        AuthPlugin::TokenEndpoint
    } else if let Some(plugin) = options
        .auth_type
        .as_deref()
        .and_then(|name| AuthPlugin::from_str(name).ok())
    {
        plugin
    } else if options.has_user() {
        if version == "3" {
            AuthPlugin::V3Password
        } else if version.starts_with('2') {
            AuthPlugin::V2Password
        } else {
            AuthPlugin::Password
        }
    } else if options.token.is_some() {
        if version == "3" {
            AuthPlugin::V3Token
        } else if version.starts_with('2') {
            AuthPlugin::V2Token
        } else {
            AuthPlugin::Token
        }
    } else {
        AuthPlugin::Password
    };

    tracing::debug!("Auth plugin {} selected", plugin);
    plugin
}

/// Verify the options needed by `plugin` are present
///
/// All problems are reported at once so the user can fix them in a
/// single pass.
pub fn check_valid_auth_options(plugin: AuthPlugin, options: &AuthOptions) -> Result<(), AuthError> {
    let mut msgs: Vec<&str> = Vec::new();

    if plugin.is_password() {
        if !options.has_user() {
            msgs.push("Set a username with --os-username, OS_USERNAME, or auth.username");
        }
        if options.auth_url.is_none() {
            msgs.push(
                "Set an authentication URL, with --os-auth-url, OS_AUTH_URL or auth.auth_url",
            );
        }
        if !options.has_project_scope() && !options.has_domain_scope() {
            msgs.push(
                "Set a scope, such as a project or domain, set a project scope with \
                 --os-project-name, OS_PROJECT_NAME or auth.project_name, set a domain \
                 scope with --os-domain-name, OS_DOMAIN_NAME or auth.domain_name",
            );
        }
    } else if plugin.is_token() {
        if options.token.is_none() {
            msgs.push("Set a token with --os-token, OS_TOKEN or auth.token");
        }
        if options.auth_url.is_none() {
            msgs.push(
                "Set an authentication URL, with --os-auth-url, OS_AUTH_URL or auth.auth_url",
            );
        }
    } else {
        if options.token.is_none() {
            msgs.push("Set a token with --os-token, OS_TOKEN or auth.token");
        }
        if options.url.is_none() {
            msgs.push("Set a service URL, with --os-url, OS_URL or auth.url");
        }
    }

    if msgs.is_empty() {
        Ok(())
    } else {
        Err(AuthError::MissingOptions(msgs.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    fn opts() -> AuthOptions {
        AuthOptions::default()
    }

    #[test]
    fn test_url_and_token_select_token_endpoint() {
        let mut o = opts();
        o.url = Some("http://nova:8774/v2.1".into());
        o.token = Some("abc".into());
        o.username = Some("demo".into());
        o.auth_type = Some("v3password".into());
        assert_eq!(select_auth_plugin(&o), AuthPlugin::TokenEndpoint);
    }

    #[test]
    fn test_explicit_auth_type_wins_over_username() {
        let mut o = opts();
        o.auth_type = Some("v2token".into());
        o.username = Some("demo".into());
        assert_eq!(select_auth_plugin(&o), AuthPlugin::V2Token);
    }

    #[test]
    fn test_unknown_auth_type_falls_through() {
        let mut o = opts();
        o.auth_type = Some("saml2".into());
        o.username = Some("demo".into());
        assert_eq!(select_auth_plugin(&o), AuthPlugin::V3Password);
    }

    #[test_case("3", AuthPlugin::V3Password ; "identity v3")]
    #[test_case("2.0", AuthPlugin::V2Password ; "identity v2.0")]
    #[test_case("", AuthPlugin::Password ; "version unset")]
    fn test_username_selects_password_flavor(version: &str, expected: AuthPlugin) {
        let mut o = opts();
        o.username = Some("demo".into());
        o.identity_api_version = version.to_string();
        assert_eq!(select_auth_plugin(&o), expected);
    }

    #[test_case("3", AuthPlugin::V3Token ; "identity v3")]
    #[test_case("2", AuthPlugin::V2Token ; "identity v2")]
    #[test_case("4", AuthPlugin::Token ; "unknown version")]
    fn test_token_selects_token_flavor(version: &str, expected: AuthPlugin) {
        let mut o = opts();
        o.token = Some("abc".into());
        o.identity_api_version = version.to_string();
        assert_eq!(select_auth_plugin(&o), expected);
    }

    #[test]
    fn test_nothing_set_defaults_to_password() {
        assert_eq!(select_auth_plugin(&opts()), AuthPlugin::Password);
    }

    #[test]
    fn test_admin_token_alias() {
        assert_eq!(
            AuthPlugin::from_str("admin_token").unwrap(),
            AuthPlugin::TokenEndpoint
        );
        assert_eq!(AuthPlugin::TokenEndpoint.to_string(), "token_endpoint");
    }

    #[test]
    fn test_plugin_list_parses() {
        for name in PLUGIN_LIST {
            assert!(AuthPlugin::from_str(name).is_ok(), "{name} should parse");
        }
    }

    #[test]
    fn test_plugin_list_matches_variants() {
        let names: Vec<String> = AuthPlugin::iter().map(|p| p.to_string()).collect();
        assert_eq!(names, PLUGIN_LIST);
    }

    #[test]
    fn test_password_plugin_reports_all_missing() {
        let err = check_valid_auth_options(AuthPlugin::V3Password, &opts()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--os-username"));
        assert!(msg.contains("--os-auth-url"));
        assert!(msg.contains("--os-project-name"));
    }

    #[test]
    fn test_password_plugin_domain_scope_is_enough() {
        let mut o = opts();
        o.username = Some("admin".into());
        o.auth_url = Some("http://keystone/v3".into());
        o.domain_name = Some("Default".into());
        assert!(check_valid_auth_options(AuthPlugin::V3Password, &o).is_ok());
    }

    #[test]
    fn test_token_endpoint_needs_url() {
        let mut o = opts();
        o.token = Some("abc".into());
        let msg = check_valid_auth_options(AuthPlugin::TokenEndpoint, &o)
            .unwrap_err()
            .to_string();
        assert!(msg.contains("--os-url"));
        assert!(!msg.contains("--os-token"));
    }

    #[test]
    fn test_token_plugin_needs_auth_url() {
        let mut o = opts();
        o.token = Some("abc".into());
        let msg = check_valid_auth_options(AuthPlugin::V3Token, &o)
            .unwrap_err()
            .to_string();
        assert!(msg.contains("--os-auth-url"));
    }
}
