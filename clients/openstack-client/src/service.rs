// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! JSON-over-HTTP calls against one service endpoint

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, Response};
use serde_json::Value;

use crate::{ApiError, Session};

/// Header carrying the token on every service request
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

const REQUEST_ID_HEADERS: [&str; 3] = [
    "x-openstack-request-id",
    "x-compute-request-id",
    "x-trans-id",
];

/// Query string pairs
pub type Query = [(String, String)];

/// An endpoint plus the headers every call to it carries
#[derive(Debug, Clone)]
pub struct ServiceClient {
    session: Arc<Session>,
    service: &'static str,
    endpoint: String,
    headers: Vec<(String, String)>,
}

impl ServiceClient {
    pub fn new(session: Arc<Session>, service: &'static str, endpoint: impl Into<String>) -> Self {
        Self {
            session,
            service,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            headers: Vec::new(),
        }
    }

    /// Add a header sent with every request (e.g. a microversion)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Service type used in error messages
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Absolute URL for a path relative to the endpoint
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.endpoint.clone()
        } else {
            format!("{}/{}", self.endpoint, path)
        }
    }

    /// Send a request and map non-success statuses onto [`ApiError`]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        let mut url = reqwest::Url::parse(&self.url(path))
            .map_err(|e| ApiError::Config(format!("Invalid {} URL: {}", self.service, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        tracing::debug!("REQ: {} {}", method, url);

        let mut req = self
            .session
            .http()
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, self.session.token())
            .header("Accept", "application/json");
        for (name, value) in &self.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        check(req.send().await?).await
    }

    pub async fn get_json(&self, path: &str, query: &Query) -> Result<Value, ApiError> {
        self.get_json_optional(path, query).await?.ok_or_else(|| {
            ApiError::decode(self.service, format!("empty body from GET {}", path))
        })
    }

    /// GET that tolerates `204 No Content` (empty Swift listings)
    pub async fn get_json_optional(&self, path: &str, query: &Query) -> Result<Option<Value>, ApiError> {
        let resp = self.request(Method::GET, path, query, None).await?;
        self.json_body(resp).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        let resp = self.request(Method::POST, path, &[], Some(body)).await?;
        self.json_body(resp).await
    }

    pub async fn put_json(&self, path: &str, body: Option<&Value>) -> Result<Option<Value>, ApiError> {
        let resp = self.request(Method::PUT, path, &[], body).await?;
        self.json_body(resp).await
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        let resp = self.request(Method::PATCH, path, &[], Some(body)).await?;
        self.json_body(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.delete_with_query(path, &[]).await
    }

    pub async fn delete_with_query(&self, path: &str, query: &Query) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, query, None).await?;
        Ok(())
    }

    pub async fn head(&self, path: &str) -> Result<HeaderMap, ApiError> {
        let resp = self.request(Method::HEAD, path, &[], None).await?;
        Ok(resp.headers().clone())
    }

    /// Upload a raw body (object store)
    pub async fn put_bytes(&self, path: &str, data: Bytes) -> Result<HeaderMap, ApiError> {
        let url = self.url(path);
        tracing::debug!("REQ: PUT {} ({} bytes)", url, data.len());
        let resp = self
            .session
            .http()
            .put(&url)
            .header(AUTH_TOKEN_HEADER, self.session.token())
            .body(data)
            .send()
            .await?;
        let resp = check(resp).await?;
        Ok(resp.headers().clone())
    }

    /// Download a raw body (object store)
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, ApiError> {
        let resp = self.request(Method::GET, path, &[], None).await?;
        Ok(resp.bytes().await?)
    }

    async fn json_body(&self, resp: Response) -> Result<Option<Value>, ApiError> {
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::decode(self.service, e.to_string()))
    }
}

async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    tracing::debug!("RESP: {} {}", status, resp.url());
    if status.is_success() {
        return Ok(resp);
    }

    let request_id = REQUEST_ID_HEADERS.iter().find_map(|name| {
        resp.headers()
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), &body, request_id))
}
