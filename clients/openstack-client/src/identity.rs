// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Identity (Keystone) client for v2.0 and v3

use std::sync::Arc;

use openstack_auth::keystone::IdentityVersion;

use crate::manager::{ResourceManager, ResourceSpec};
use crate::{ApiError, Query, Resource, ServiceClient, Session};

pub const SERVICE_TYPE: &str = "identity";

const V3_PROJECTS: ResourceSpec = ResourceSpec::new("project", "projects", "projects").patch_updates();
const V3_USERS: ResourceSpec = ResourceSpec::new("user", "users", "users").patch_updates();
const V3_ROLES: ResourceSpec = ResourceSpec::new("role", "roles", "roles").patch_updates();
const V3_DOMAINS: ResourceSpec = ResourceSpec::new("domain", "domains", "domains").patch_updates();
const V3_GROUPS: ResourceSpec = ResourceSpec::new("group", "groups", "groups").patch_updates();

const V2_TENANTS: ResourceSpec = ResourceSpec::new("tenant", "tenants", "tenants").display_name("project");
const V2_USERS: ResourceSpec = ResourceSpec::new("user", "users", "users");
const V2_ROLES: ResourceSpec = ResourceSpec::new("role", "roles", "OS-KSADM/roles").without_name_filter();

/// Scope of a role assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleScope {
    Project(String),
    Domain(String),
}

/// Holder of a role assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleActor {
    User(String),
    Group(String),
}

/// Keystone endpoint plus managers for the selected API version
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: ServiceClient,
    version: IdentityVersion,
    projects: ResourceManager,
    users: ResourceManager,
    roles: ResourceManager,
    domains: Option<ResourceManager>,
    groups: Option<ResourceManager>,
}

impl IdentityClient {
    pub fn new(session: Arc<Session>, version: &str) -> Result<Self, ApiError> {
        let base = session.endpoint_for(&[SERVICE_TYPE])?;
        let version = parse_version(version);
        let endpoint = versioned_endpoint(&base, version);
        tracing::debug!("identity endpoint {}", endpoint);
        let client = ServiceClient::new(session, SERVICE_TYPE, endpoint);

        let manager = |spec| ResourceManager::new(client.clone(), spec);
        let this = match version {
            IdentityVersion::V3 => Self {
                projects: manager(V3_PROJECTS),
                users: manager(V3_USERS),
                roles: manager(V3_ROLES),
                domains: Some(manager(V3_DOMAINS)),
                groups: Some(manager(V3_GROUPS)),
                version,
                client: client.clone(),
            },
            IdentityVersion::V2 => Self {
                projects: manager(V2_TENANTS),
                users: manager(V2_USERS),
                roles: manager(V2_ROLES),
                domains: None,
                groups: None,
                version,
                client: client.clone(),
            },
        };
        Ok(this)
    }

    pub fn version(&self) -> IdentityVersion {
        self.version
    }

    pub fn projects(&self) -> &ResourceManager {
        &self.projects
    }

    pub fn users(&self) -> &ResourceManager {
        &self.users
    }

    pub fn roles(&self) -> &ResourceManager {
        &self.roles
    }

    pub fn domains(&self) -> Result<&ResourceManager, ApiError> {
        self.domains.as_ref().ok_or_else(v3_only)
    }

    pub fn groups(&self) -> Result<&ResourceManager, ApiError> {
        self.groups.as_ref().ok_or_else(v3_only)
    }

    /// Grant `role_id` to a user or group on a project or domain
    pub async fn grant_role(&self, role_id: &str, actor: &RoleActor, scope: &RoleScope) -> Result<(), ApiError> {
        let path = self.grant_path(role_id, actor, scope)?;
        self.client.put_json(&path, None).await?;
        Ok(())
    }

    pub async fn revoke_role(&self, role_id: &str, actor: &RoleActor, scope: &RoleScope) -> Result<(), ApiError> {
        let path = self.grant_path(role_id, actor, scope)?;
        self.client.delete(&path).await
    }

    /// Role assignments (v3) matching the given query
    /// (`user.id`, `scope.project.id`, ...)
    pub async fn role_assignments(&self, query: &Query) -> Result<Vec<Resource>, ApiError> {
        if self.version != IdentityVersion::V3 {
            return Err(v3_only());
        }
        let value = self.client.get_json("role_assignments", query).await?;
        Ok(list_field(&value, "role_assignments"))
    }

    /// Projects `user_id` has a role on (v3)
    pub async fn user_projects(&self, user_id: &str) -> Result<Vec<Resource>, ApiError> {
        if self.version != IdentityVersion::V3 {
            return Err(v3_only());
        }
        let path = format!("users/{}/projects", urlencoding::encode(user_id));
        let value = self.client.get_json(&path, &[]).await?;
        Ok(list_field(&value, "projects"))
    }

    /// Roles a user holds directly on a project
    pub async fn user_roles_on_project(&self, user_id: &str, project_id: &str) -> Result<Vec<Resource>, ApiError> {
        let path = match self.version {
            IdentityVersion::V2 => format!(
                "tenants/{}/users/{}/roles",
                urlencoding::encode(project_id),
                urlencoding::encode(user_id)
            ),
            IdentityVersion::V3 => format!(
                "projects/{}/users/{}/roles",
                urlencoding::encode(project_id),
                urlencoding::encode(user_id)
            ),
        };
        let value = self.client.get_json(&path, &[]).await?;
        Ok(list_field(&value, "roles"))
    }

    fn grant_path(&self, role_id: &str, actor: &RoleActor, scope: &RoleScope) -> Result<String, ApiError> {
        let role = urlencoding::encode(role_id);
        match self.version {
            IdentityVersion::V3 => {
                let (scope_kind, scope_id) = match scope {
                    RoleScope::Project(id) => ("projects", id),
                    RoleScope::Domain(id) => ("domains", id),
                };
                let (actor_kind, actor_id) = match actor {
                    RoleActor::User(id) => ("users", id),
                    RoleActor::Group(id) => ("groups", id),
                };
                Ok(format!(
                    "{}/{}/{}/{}/roles/{}",
                    scope_kind,
                    urlencoding::encode(scope_id),
                    actor_kind,
                    urlencoding::encode(actor_id),
                    role
                ))
            }
            IdentityVersion::V2 => match (actor, scope) {
                (RoleActor::User(user), RoleScope::Project(project)) => Ok(format!(
                    "tenants/{}/users/{}/roles/OS-KSADM/{}",
                    urlencoding::encode(project),
                    urlencoding::encode(user),
                    role
                )),
                _ => Err(v3_only()),
            },
        }
    }
}

/// `--os-identity-api-version` value to an API generation
pub fn parse_version(version: &str) -> IdentityVersion {
    if version.starts_with('2') {
        IdentityVersion::V2
    } else {
        IdentityVersion::V3
    }
}

fn v3_only() -> ApiError {
    ApiError::Config("This operation requires identity API v3".to_string())
}

fn list_field(value: &serde_json::Value, key: &str) -> Vec<Resource> {
    value
        .get(key)
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| Resource::from_value(v.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Replace any version suffix on the catalog URL with `version`
pub fn versioned_endpoint(base: &str, version: IdentityVersion) -> String {
    let trimmed = base.trim_end_matches('/');
    let root = trimmed
        .strip_suffix("/v3")
        .or_else(|| trimmed.strip_suffix("/v2.0"))
        .unwrap_or(trimmed);
    match version {
        IdentityVersion::V3 => format!("{}/v3", root),
        IdentityVersion::V2 => format!("{}/v2.0", root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("2.0"), IdentityVersion::V2);
        assert_eq!(parse_version("3"), IdentityVersion::V3);
        assert_eq!(parse_version("3.10"), IdentityVersion::V3);
    }

    #[test]
    fn test_versioned_endpoint() {
        assert_eq!(
            versioned_endpoint("http://ks:5000/v2.0/", IdentityVersion::V3),
            "http://ks:5000/v3"
        );
        assert_eq!(
            versioned_endpoint("http://ks:5000", IdentityVersion::V2),
            "http://ks:5000/v2.0"
        );
        assert_eq!(
            versioned_endpoint("http://ks/identity/v3", IdentityVersion::V3),
            "http://ks/identity/v3"
        );
    }
}
