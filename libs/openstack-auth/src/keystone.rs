// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Token issue against Keystone v2.0 and v3

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::catalog::ServiceCatalog;
use crate::plugin::AuthPlugin;
use crate::{AuthError, AuthOptions};

/// Domain used for user and project names when none is given
pub const DEFAULT_DOMAIN_ID: &str = "default";

/// Header carrying the token in v3 responses and all requests
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Identity API major version used for a token request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityVersion {
    V2,
    V3,
}

/// Result of a successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The token to send as `X-Auth-Token`
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub domain_id: Option<String>,
    /// Services visible to the token; empty for `token_endpoint`
    pub catalog: ServiceCatalog,
    /// Endpoint that replaces catalog lookups (`--os-url`)
    pub endpoint_override: Option<String>,
}

/// Issues tokens for one plugin and one set of options
#[derive(Debug, Clone)]
pub struct Authenticator {
    plugin: AuthPlugin,
    options: AuthOptions,
}

impl Authenticator {
    pub fn new(plugin: AuthPlugin, options: AuthOptions) -> Self {
        Self { plugin, options }
    }

    pub fn plugin(&self) -> AuthPlugin {
        self.plugin
    }

    /// Obtain a token and service catalog
    pub async fn authenticate(&self, http: &reqwest::Client) -> Result<AuthSession, AuthError> {
        if self.plugin == AuthPlugin::TokenEndpoint {
            return Ok(AuthSession {
                token: self.options.token.clone().unwrap_or_default(),
                expires_at: None,
                user_id: None,
                project_id: self.options.project_id.clone(),
                domain_id: None,
                catalog: ServiceCatalog::default(),
                endpoint_override: self.options.url.clone(),
            });
        }

        let auth_url = self
            .options
            .auth_url
            .as_deref()
            .ok_or_else(|| AuthError::MissingOptions("Set an authentication URL".to_string()))?;
        let version = resolve_version(self.plugin, auth_url);
        let base = versioned_url(auth_url, version)?;

        match version {
            IdentityVersion::V3 => {
                let url = format!("{}/auth/tokens", base);
                let body = v3_request_body(self.plugin, &self.options)?;
                tracing::debug!("REQ: POST {}", url);
                let resp = http.post(&url).json(&body).send().await?;
                let status = resp.status();
                let token = resp
                    .headers()
                    .get(SUBJECT_TOKEN_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let body: Value = read_body(resp, status).await?;
                let token = token.ok_or_else(|| {
                    AuthError::MalformedResponse(format!("missing {} header", SUBJECT_TOKEN_HEADER))
                })?;
                parse_v3_token(token, &body)
            }
            IdentityVersion::V2 => {
                let url = format!("{}/tokens", base);
                let body = v2_request_body(self.plugin, &self.options)?;
                tracing::debug!("REQ: POST {}", url);
                let resp = http.post(&url).json(&body).send().await?;
                let status = resp.status();
                let body: Value = read_body(resp, status).await?;
                parse_v2_access(&body)
            }
        }
    }
}

async fn read_body(resp: reqwest::Response, status: reqwest::StatusCode) -> Result<Value, AuthError> {
    let text = resp.text().await?;
    tracing::debug!("RESP: {} ({} bytes)", status, text.len());

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(text);
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::AuthorizationFailure(message));
        }
        return Err(AuthError::Http {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|e| AuthError::MalformedResponse(e.to_string()))
}

/// Decide which identity version a plugin talks to
///
/// Versioned plugins are fixed. The generic `password` and `token`
/// plugins use v2.0 only when the auth URL explicitly points there.
pub fn resolve_version(plugin: AuthPlugin, auth_url: &str) -> IdentityVersion {
    match plugin {
        AuthPlugin::V2Password | AuthPlugin::V2Token => IdentityVersion::V2,
        AuthPlugin::V3Password | AuthPlugin::V3Token | AuthPlugin::TokenEndpoint => {
            IdentityVersion::V3
        }
        AuthPlugin::Password | AuthPlugin::Token => {
            if auth_url.trim_end_matches('/').ends_with("/v2.0") {
                IdentityVersion::V2
            } else {
                IdentityVersion::V3
            }
        }
    }
}

/// Append the version path segment unless the auth URL already has it
pub fn versioned_url(auth_url: &str, version: IdentityVersion) -> Result<String, AuthError> {
    url::Url::parse(auth_url).map_err(|source| AuthError::InvalidUrl {
        url: auth_url.to_string(),
        source,
    })?;

    let trimmed = auth_url.trim_end_matches('/');
    let suffix = match version {
        IdentityVersion::V2 => "/v2.0",
        IdentityVersion::V3 => "/v3",
    };
    if trimmed.ends_with(suffix) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", trimmed, suffix))
    }
}

fn domain_ref(id: Option<&String>, name: Option<&String>) -> Value {
    match (id, name) {
        (Some(id), _) => json!({ "id": id }),
        (None, Some(name)) => json!({ "name": name }),
        (None, None) => json!({ "id": DEFAULT_DOMAIN_ID }),
    }
}

/// Build the body of `POST /v3/auth/tokens`
pub fn v3_request_body(plugin: AuthPlugin, opts: &AuthOptions) -> Result<Value, AuthError> {
    let identity = if plugin.is_password() {
        let password = opts.password.as_ref().ok_or_else(|| {
            AuthError::MissingOptions(
                "Set a password with --os-password, OS_PASSWORD or auth.password".to_string(),
            )
        })?;
        let mut user = Map::new();
        if let Some(id) = &opts.user_id {
            user.insert("id".into(), json!(id));
        } else {
            user.insert("name".into(), json!(opts.username));
            user.insert(
                "domain".into(),
                domain_ref(opts.user_domain_id.as_ref(), opts.user_domain_name.as_ref()),
            );
        }
        user.insert("password".into(), json!(password));
        json!({ "methods": ["password"], "password": { "user": user } })
    } else {
        json!({ "methods": ["token"], "token": { "id": opts.token } })
    };

    let mut auth = Map::new();
    auth.insert("identity".into(), identity);

    if let Some(id) = &opts.project_id {
        auth.insert("scope".into(), json!({ "project": { "id": id } }));
    } else if let Some(name) = &opts.project_name {
        auth.insert(
            "scope".into(),
            json!({
                "project": {
                    "name": name,
                    "domain": domain_ref(opts.project_domain_id.as_ref(), opts.project_domain_name.as_ref()),
                }
            }),
        );
    } else if opts.has_domain_scope() {
        auth.insert(
            "scope".into(),
            json!({ "domain": domain_ref(opts.domain_id.as_ref(), opts.domain_name.as_ref()) }),
        );
    }

    Ok(json!({ "auth": auth }))
}

/// Build the body of `POST /v2.0/tokens`
pub fn v2_request_body(plugin: AuthPlugin, opts: &AuthOptions) -> Result<Value, AuthError> {
    let mut auth = Map::new();
    if plugin.is_password() {
        let password = opts.password.as_ref().ok_or_else(|| {
            AuthError::MissingOptions(
                "Set a password with --os-password, OS_PASSWORD or auth.password".to_string(),
            )
        })?;
        let mut creds = Map::new();
        if let Some(id) = &opts.user_id {
            creds.insert("userId".into(), json!(id));
        } else {
            creds.insert("username".into(), json!(opts.username));
        }
        creds.insert("password".into(), json!(password));
        auth.insert("passwordCredentials".into(), Value::Object(creds));
    } else {
        auth.insert("token".into(), json!({ "id": opts.token }));
    }

    if let Some(id) = &opts.project_id {
        auth.insert("tenantId".into(), json!(id));
    } else if let Some(name) = &opts.project_name {
        auth.insert("tenantName".into(), json!(name));
    }

    Ok(json!({ "auth": auth }))
}

fn parse_time(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn pointer_str(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parse a v3 token response body
pub fn parse_v3_token(token: String, body: &Value) -> Result<AuthSession, AuthError> {
    let tok = body
        .get("token")
        .ok_or_else(|| AuthError::MalformedResponse("missing 'token' object".to_string()))?;

    Ok(AuthSession {
        token,
        expires_at: parse_time(tok.get("expires_at")),
        user_id: pointer_str(tok, "/user/id"),
        project_id: pointer_str(tok, "/project/id"),
        domain_id: pointer_str(tok, "/domain/id"),
        catalog: tok
            .get("catalog")
            .map(ServiceCatalog::from_v3)
            .unwrap_or_default(),
        endpoint_override: None,
    })
}

/// Parse a v2.0 `access` response body
pub fn parse_v2_access(body: &Value) -> Result<AuthSession, AuthError> {
    let access = body
        .get("access")
        .ok_or_else(|| AuthError::MalformedResponse("missing 'access' object".to_string()))?;
    let token = pointer_str(access, "/token/id")
        .ok_or_else(|| AuthError::MalformedResponse("missing token id".to_string()))?;

    Ok(AuthSession {
        token,
        expires_at: parse_time(access.pointer("/token/expires")),
        user_id: pointer_str(access, "/user/id"),
        project_id: pointer_str(access, "/token/tenant/id"),
        domain_id: None,
        catalog: access
            .get("serviceCatalog")
            .map(ServiceCatalog::from_v2)
            .unwrap_or_default(),
        endpoint_override: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn password_opts() -> AuthOptions {
        AuthOptions {
            auth_url: Some("http://keystone:5000/v3".into()),
            username: Some("demo".into()),
            password: Some("secret".into()),
            project_name: Some("demo-project".into()),
            ..AuthOptions::default()
        }
    }

    #[test]
    fn test_v3_password_body_defaults_domains() {
        let body = v3_request_body(AuthPlugin::V3Password, &password_opts()).unwrap();
        assert_eq!(
            body,
            json!({
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": {"user": {
                            "name": "demo",
                            "domain": {"id": "default"},
                            "password": "secret"
                        }}
                    },
                    "scope": {"project": {"name": "demo-project", "domain": {"id": "default"}}}
                }
            })
        );
    }

    #[test]
    fn test_v3_domain_scope_and_user_id() {
        let mut opts = password_opts();
        opts.project_name = None;
        opts.user_id = Some("u-1".into());
        opts.domain_name = Some("Engineering".into());
        let body = v3_request_body(AuthPlugin::Password, &opts).unwrap();
        assert_eq!(body["auth"]["identity"]["password"]["user"], json!({"id": "u-1", "password": "secret"}));
        assert_eq!(body["auth"]["scope"], json!({"domain": {"name": "Engineering"}}));
    }

    #[test]
    fn test_v3_missing_password() {
        let mut opts = password_opts();
        opts.password = None;
        let err = v3_request_body(AuthPlugin::V3Password, &opts).unwrap_err();
        assert!(err.to_string().contains("--os-password"));
    }

    #[test]
    fn test_v2_token_body() {
        let opts = AuthOptions {
            token: Some("tok".into()),
            project_id: Some("p-1".into()),
            ..AuthOptions::default()
        };
        let body = v2_request_body(AuthPlugin::V2Token, &opts).unwrap();
        assert_eq!(body, json!({"auth": {"token": {"id": "tok"}, "tenantId": "p-1"}}));
    }

    #[test]
    fn test_generic_plugin_version_from_url() {
        assert_eq!(
            resolve_version(AuthPlugin::Password, "http://ks:5000/v2.0/"),
            IdentityVersion::V2
        );
        assert_eq!(
            resolve_version(AuthPlugin::Token, "http://ks:5000"),
            IdentityVersion::V3
        );
        assert_eq!(
            resolve_version(AuthPlugin::V2Password, "http://ks:5000/v3"),
            IdentityVersion::V2
        );
    }

    #[test]
    fn test_versioned_url() {
        assert_eq!(
            versioned_url("http://ks:5000/", IdentityVersion::V3).unwrap(),
            "http://ks:5000/v3"
        );
        assert_eq!(
            versioned_url("http://ks:5000/v3/", IdentityVersion::V3).unwrap(),
            "http://ks:5000/v3"
        );
        assert!(versioned_url("not a url", IdentityVersion::V3).is_err());
    }

    #[test]
    fn test_parse_v3_token() {
        let body = json!({
            "token": {
                "expires_at": "2026-10-17T13:43:26.000000Z",
                "user": {"id": "u-1"},
                "project": {"id": "p-1"},
                "catalog": []
            }
        });
        let session = parse_v3_token("tok".into(), &body).unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.user_id.as_deref(), Some("u-1"));
        assert_eq!(session.project_id.as_deref(), Some("p-1"));
        assert!(session.expires_at.is_some());
    }

    #[test]
    fn test_parse_v2_access() {
        let body = json!({
            "access": {
                "token": {"id": "tok", "expires": "2026-10-17T13:43:26Z", "tenant": {"id": "t-1"}},
                "user": {"id": "u-1"},
                "serviceCatalog": []
            }
        });
        let session = parse_v2_access(&body).unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.project_id.as_deref(), Some("t-1"));
        assert!(parse_v2_access(&json!({})).is_err());
    }
}
