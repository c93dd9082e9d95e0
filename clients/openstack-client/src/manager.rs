// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Resource managers
//!
//! A manager exposes `get`/`list`/`find` for one resource type. Most
//! OpenStack collections share the same JSON envelope conventions, so a
//! single [`ResourceManager`] parameterised by a [`ResourceSpec`] covers
//! servers, networks, projects, volumes and the rest.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{ApiError, Lookup, Query, Resource, ServiceClient};

/// Upper bound on followed pagination links
const MAX_PAGES: usize = 1000;

/// Lookup operations shared by every resource type
#[async_trait]
pub trait Manager: Send + Sync {
    /// Human-readable resource type, used in error messages
    fn resource_name(&self) -> &str;

    /// Attribute compared against the user-supplied name
    fn name_attr(&self) -> &str {
        "name"
    }

    /// Whether the service filters list results by name server-side
    fn supports_name_filter(&self) -> bool {
        true
    }

    async fn get(&self, id: &str) -> Result<Resource, ApiError>;

    async fn list(&self, query: &Query) -> Result<Vec<Resource>, ApiError>;

    /// Find resources whose name matches `name` exactly
    ///
    /// `filters` are passed to the service and also checked against each
    /// returned resource, since not every service honours every filter.
    /// Filter keys a resource does not carry are not checked.
    async fn find(&self, name: &str, filters: &Query) -> Result<Lookup, ApiError> {
        let mut query: Vec<(String, String)> = filters.to_vec();
        if self.supports_name_filter() {
            query.push((self.name_attr().to_string(), name.to_string()));
        }

        let name_attr = self.name_attr();
        let matches = self
            .list(&query)
            .await?
            .into_iter()
            .filter(|r| r.str_field(name_attr) == Some(name))
            .filter(|r| filters.iter().all(|(k, v)| field_matches(r, k, v)))
            .collect();

        Ok(Lookup::from_matches(matches))
    }
}

fn field_matches(resource: &Resource, key: &str, expected: &str) -> bool {
    match resource.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == expected,
    }
}

/// HTTP verb a service uses for updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Put,
    Patch,
}

/// Envelope and path conventions for one resource collection
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    /// Envelope key for a single resource, e.g. `server`
    pub singular: &'static str,
    /// Envelope key for a collection, e.g. `servers`
    pub plural: &'static str,
    /// Collection path relative to the service endpoint
    pub path: &'static str,
    /// Path used for listing, when it differs (`servers/detail`)
    pub list_path: Option<&'static str>,
    pub display_name: &'static str,
    pub name_attr: &'static str,
    pub name_filter: bool,
    /// Items in a list are themselves wrapped (`{"keypair": {..}}`)
    pub list_item_key: Option<&'static str>,
    pub update_method: UpdateMethod,
}

impl ResourceSpec {
    pub const fn new(singular: &'static str, plural: &'static str, path: &'static str) -> Self {
        Self {
            singular,
            plural,
            path,
            list_path: None,
            display_name: singular,
            name_attr: "name",
            name_filter: true,
            list_item_key: None,
            update_method: UpdateMethod::Put,
        }
    }

    pub const fn list_path(self, list_path: &'static str) -> Self {
        Self {
            list_path: Some(list_path),
            ..self
        }
    }

    pub const fn display_name(self, display_name: &'static str) -> Self {
        Self {
            display_name,
            ..self
        }
    }

    pub const fn name_attr(self, name_attr: &'static str) -> Self {
        Self { name_attr, ..self }
    }

    pub const fn without_name_filter(self) -> Self {
        Self {
            name_filter: false,
            ..self
        }
    }

    pub const fn list_item_key(self, key: &'static str) -> Self {
        Self {
            list_item_key: Some(key),
            ..self
        }
    }

    pub const fn patch_updates(self) -> Self {
        Self {
            update_method: UpdateMethod::Patch,
            ..self
        }
    }
}

/// Generic JSON CRUD manager for one collection
#[derive(Debug, Clone)]
pub struct ResourceManager {
    client: ServiceClient,
    spec: ResourceSpec,
}

impl ResourceManager {
    pub fn new(client: ServiceClient, spec: ResourceSpec) -> Self {
        Self { client, spec }
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Path of one resource (`servers/<id>`)
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.spec.path, urlencoding::encode(id))
    }

    /// Create a resource; `body` is the unwrapped attribute object
    pub async fn create(&self, body: Value) -> Result<Resource, ApiError> {
        let wrapped = json!({ self.spec.singular: body });
        let resp = self.client.post_json(self.spec.path, &wrapped).await?;
        self.unwrap_one(resp.unwrap_or(Value::Null))
    }

    /// Update a resource with PUT or PATCH, as the service expects
    ///
    /// Services that answer with an empty body are re-read.
    pub async fn update(&self, id: &str, body: Value) -> Result<Resource, ApiError> {
        let path = self.item_path(id);
        let wrapped = json!({ self.spec.singular: body });
        let resp = match self.spec.update_method {
            UpdateMethod::Put => self.client.put_json(&path, Some(&wrapped)).await?,
            UpdateMethod::Patch => self.client.patch_json(&path, &wrapped).await?,
        };
        match resp {
            Some(value) => self.unwrap_one(value),
            None => self.get(id).await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&self.item_path(id)).await
    }

    /// POST `{path}/{id}/action` with `{name: body}`
    pub async fn action(&self, id: &str, name: &str, body: Value) -> Result<Option<Value>, ApiError> {
        let path = format!("{}/action", self.item_path(id));
        self.client.post_json(&path, &json!({ name: body })).await
    }

    fn unwrap_one(&self, value: Value) -> Result<Resource, ApiError> {
        let inner = match value {
            Value::Object(mut map) => match map.remove(self.spec.singular) {
                Some(inner) => inner,
                None => Value::Object(map),
            },
            other => other,
        };
        Resource::from_value(inner).ok_or_else(|| {
            ApiError::decode(
                self.client.service(),
                format!("expected a {} object", self.spec.singular),
            )
        })
    }

    fn unwrap_many(&self, value: &Value) -> Result<Vec<Resource>, ApiError> {
        let items = value
            .get(self.spec.plural)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ApiError::decode(
                    self.client.service(),
                    format!("expected a {} list", self.spec.plural),
                )
            })?;

        Ok(items
            .iter()
            .filter_map(|item| {
                let item = match self.spec.list_item_key {
                    Some(key) => item.get(key).unwrap_or(item),
                    None => item,
                };
                Resource::from_value(item.clone())
            })
            .collect())
    }

    fn next_link(&self, page: &Value) -> Option<String> {
        let links_key = format!("{}_links", self.spec.plural);
        if let Some(links) = page.get(&links_key).and_then(Value::as_array) {
            return links
                .iter()
                .find(|l| l.get("rel").and_then(Value::as_str) == Some("next"))
                .and_then(|l| l.get("href").and_then(Value::as_str))
                .map(str::to_string);
        }
        page.get("links")
            .and_then(|l| l.get("next"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[async_trait]
impl Manager for ResourceManager {
    fn resource_name(&self) -> &str {
        self.spec.display_name
    }

    fn name_attr(&self) -> &str {
        self.spec.name_attr
    }

    fn supports_name_filter(&self) -> bool {
        self.spec.name_filter
    }

    async fn get(&self, id: &str) -> Result<Resource, ApiError> {
        let value = self.client.get_json(&self.item_path(id), &[]).await?;
        self.unwrap_one(value)
    }

    /// List the collection, following `next` links unless the caller
    /// asked for a bounded page with `limit`
    async fn list(&self, query: &Query) -> Result<Vec<Resource>, ApiError> {
        let path = self.spec.list_path.unwrap_or(self.spec.path);
        let follow = !query.iter().any(|(k, _)| k == "limit");

        let mut page = self.client.get_json(path, query).await?;
        let mut items = self.unwrap_many(&page)?;
        let mut last_len = items.len();
        let mut pages = 1;

        while follow && last_len > 0 && pages < MAX_PAGES {
            let Some(next) = self.next_link(&page) else {
                break;
            };
            tracing::debug!("following {} page link {}", self.spec.plural, next);
            page = self.client.get_json(&next, &[]).await?;
            let batch = self.unwrap_many(&page)?;
            last_len = batch.len();
            items.extend(batch);
            pages += 1;
        }

        Ok(items)
    }
}
