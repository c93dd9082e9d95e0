// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Object storage (Swift) client
//!
//! Swift does not wrap resources in JSON envelopes and reports most
//! metadata in response headers, so it gets its own small client rather
//! than a [`ResourceManager`](crate::ResourceManager).

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::{ApiError, Resource, ServiceClient, Session};

pub const SERVICE_TYPE: &str = "object-store";

const OBJECT_META_PREFIX: &str = "x-object-meta-";
const CONTAINER_META_PREFIX: &str = "x-container-meta-";

/// Listing options shared by containers and objects
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub marker: Option<String>,
    pub end_marker: Option<String>,
    pub limit: Option<u32>,
    /// Keep requesting pages until the listing is exhausted
    pub all: bool,
}

impl ListOptions {
    fn query(&self, marker: Option<&str>) -> Vec<(String, String)> {
        let mut q = vec![("format".to_string(), "json".to_string())];
        let marker = marker.or(self.marker.as_deref());
        for (k, v) in [
            ("prefix", self.prefix.as_deref()),
            ("delimiter", self.delimiter.as_deref()),
            ("marker", marker),
            ("end_marker", self.end_marker.as_deref()),
        ] {
            if let Some(v) = v {
                q.push((k.to_string(), v.to_string()));
            }
        }
        if let Some(limit) = self.limit {
            q.push(("limit".to_string(), limit.to_string()));
        }
        q
    }
}

#[derive(Debug, Clone)]
pub struct ObjectStoreClient {
    client: ServiceClient,
}

impl ObjectStoreClient {
    pub fn new(session: Arc<Session>, version: &str) -> Result<Self, ApiError> {
        if version != "1" {
            return Err(ApiError::Config(format!(
                "Object API version {} is not supported",
                version
            )));
        }
        let endpoint = session.endpoint_for(&[SERVICE_TYPE])?;
        tracing::debug!("object-store endpoint {}", endpoint);
        Ok(Self {
            client: ServiceClient::new(session, SERVICE_TYPE, endpoint),
        })
    }

    /// Account name, the last path segment of the endpoint (`AUTH_<project>`)
    pub fn account(&self) -> &str {
        self.client
            .endpoint()
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    pub async fn show_account(&self) -> Result<Resource, ApiError> {
        let headers = self.client.head("").await?;
        let mut r = Resource::default();
        r.insert("Account", Value::from(self.account()));
        for (field, header) in [
            ("Containers", "x-account-container-count"),
            ("Objects", "x-account-object-count"),
            ("Bytes", "x-account-bytes-used"),
        ] {
            if let Some(v) = header_str(&headers, header) {
                r.insert(field, Value::from(v));
            }
        }
        Ok(r)
    }

    pub async fn list_containers(&self, options: &ListOptions) -> Result<Vec<Resource>, ApiError> {
        self.list_paged("", options, "name").await
    }

    pub async fn create_container(&self, name: &str) -> Result<Resource, ApiError> {
        self.client.put_json(&encode_container(name), None).await?;
        let mut r = Resource::default();
        r.insert("account", Value::from(self.account()));
        r.insert("container", Value::from(name));
        Ok(r)
    }

    pub async fn show_container(&self, name: &str) -> Result<Resource, ApiError> {
        let headers = self.client.head(&encode_container(name)).await?;
        let mut r = Resource::default();
        r.insert("account", Value::from(self.account()));
        r.insert("container", Value::from(name));
        for (field, header) in [
            ("object_count", "x-container-object-count"),
            ("bytes_used", "x-container-bytes-used"),
            ("read_acl", "x-container-read"),
            ("write_acl", "x-container-write"),
            ("sync_to", "x-container-sync-to"),
            ("sync_key", "x-container-sync-key"),
            ("storage_policy", "x-storage-policy"),
        ] {
            if let Some(v) = header_str(&headers, header) {
                r.insert(field, Value::from(v));
            }
        }
        let props = prefixed_headers(&headers, CONTAINER_META_PREFIX);
        if !props.is_empty() {
            r.insert("properties", Value::Object(props));
        }
        Ok(r)
    }

    pub async fn delete_container(&self, name: &str) -> Result<(), ApiError> {
        self.client.delete(&encode_container(name)).await
    }

    pub async fn list_objects(&self, container: &str, options: &ListOptions) -> Result<Vec<Resource>, ApiError> {
        self.list_paged(&encode_container(container), options, "name")
            .await
    }

    pub async fn show_object(&self, container: &str, object: &str) -> Result<Resource, ApiError> {
        let headers = self.client.head(&object_path(container, object)).await?;
        let mut r = Resource::default();
        r.insert("account", Value::from(self.account()));
        r.insert("container", Value::from(container));
        r.insert("object", Value::from(object));
        for (field, header) in [
            ("content-type", "content-type"),
            ("content-length", "content-length"),
            ("last-modified", "last-modified"),
            ("etag", "etag"),
            ("x-object-manifest", "x-object-manifest"),
        ] {
            if let Some(v) = header_str(&headers, header) {
                r.insert(field, Value::from(v));
            }
        }
        let props = prefixed_headers(&headers, OBJECT_META_PREFIX);
        if !props.is_empty() {
            r.insert("properties", Value::Object(props));
        }
        Ok(r)
    }

    pub async fn upload_object(&self, container: &str, object: &str, data: Bytes) -> Result<Resource, ApiError> {
        let headers = self
            .client
            .put_bytes(&object_path(container, object), data)
            .await?;
        let mut r = Resource::default();
        r.insert("object", Value::from(object));
        r.insert("container", Value::from(container));
        if let Some(etag) = header_str(&headers, "etag") {
            r.insert("etag", Value::from(etag));
        }
        Ok(r)
    }

    pub async fn download_object(&self, container: &str, object: &str) -> Result<Bytes, ApiError> {
        self.client.get_bytes(&object_path(container, object)).await
    }

    pub async fn delete_object(&self, container: &str, object: &str) -> Result<(), ApiError> {
        self.client.delete(&object_path(container, object)).await
    }

    async fn list_paged(&self, path: &str, options: &ListOptions, key: &str) -> Result<Vec<Resource>, ApiError> {
        let mut out: Vec<Resource> = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let value = self
                .client
                .get_json_optional(path, &options.query(marker.as_deref()))
                .await?;
            let page: Vec<Resource> = value
                .as_ref()
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| Resource::from_value(v.clone()))
                        .collect()
                })
                .unwrap_or_default();

            let last = page
                .last()
                .and_then(|r| r.str_field(key).or_else(|| r.str_field("subdir")))
                .map(str::to_string);
            let done = page.is_empty() || !options.all;
            out.extend(page);
            match last {
                Some(last) if !done => marker = Some(last),
                _ => break,
            }
        }
        Ok(out)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn prefixed_headers(headers: &HeaderMap, prefix: &str) -> Map<String, Value> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(prefix)?;
            let value = value.to_str().ok()?;
            Some((key.to_string(), Value::from(value)))
        })
        .collect()
}

fn encode_container(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// `container/object`, keeping `/` in pseudo-directory object names
fn object_path(container: &str, object: &str) -> String {
    let object = object
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", encode_container(container), object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_keeps_pseudo_dirs() {
        assert_eq!(object_path("my box", "a/b c.txt"), "my%20box/a/b%20c.txt");
    }

    #[test]
    fn test_list_query() {
        let opts = ListOptions {
            prefix: Some("img".into()),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(
            opts.query(Some("img-9")),
            vec![
                ("format".to_string(), "json".to_string()),
                ("prefix".to_string(), "img".to_string()),
                ("marker".to_string(), "img-9".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }
}
