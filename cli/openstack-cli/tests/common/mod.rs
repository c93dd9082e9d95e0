// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Test helpers for openstack CLI integration tests
//!
//! - `openstack_cmd` runs the binary with a clean environment
//! - `FakeCloud` serves a minimal Keystone, Nova and Neutron on a
//!   loopback port

// Allow unused code - not every test file uses every helper
// Allow deprecated - cargo_bin is standard for CLI testing
#![allow(dead_code, deprecated)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;

use assert_cmd::Command;
use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

pub const TOKEN: &str = "tok-fake";

/// The openstack binary with no inherited `OS_*` settings
pub fn openstack_cmd() -> Command {
    let mut cmd = Command::cargo_bin("openstack").expect("Failed to find openstack binary");
    cmd.env_clear();
    cmd
}

/// A loopback cloud with a fixed set of resources
pub struct FakeCloud {
    pub url: String,
}

impl FakeCloud {
    pub fn start() -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind fake cloud");
                let addr = listener.local_addr().expect("Failed to read address");
                tx.send(addr).expect("Failed to report address");
                axum::serve(listener, router(addr)).await.expect("Fake cloud failed");
            });
        });
        let addr = rx.recv().expect("Fake cloud did not start");
        Self {
            url: format!("http://{}", addr),
        }
    }

    /// Keystone v3 URL for `--os-auth-url`
    pub fn auth_url(&self) -> String {
        format!("{}/identity/v3", self.url)
    }

    /// Compute endpoint for `--os-url`
    pub fn compute_url(&self) -> String {
        format!("{}/compute", self.url)
    }

    /// `clouds.yaml` with one password cloud named `fake`
    pub fn clouds_yaml(&self) -> String {
        format!(
            "clouds:\n  fake:\n    auth:\n      auth_url: {}\n      username: demo\n      password: secret\n      project_name: demo\n    region_name: RegionOne\n",
            self.auth_url()
        )
    }
}

fn router(addr: SocketAddr) -> Router {
    Router::new()
        .route("/identity/v3/auth/tokens", post(issue_token))
        .route("/compute/servers/detail", get(list_servers))
        .route("/compute/servers/{id}", get(get_server))
        .route("/compute/flavors/{id}", get(get_flavor))
        .route("/network/v2.0/networks", get(list_networks))
        .with_state(format!("http://{}", addr))
}

fn servers() -> Vec<Value> {
    let server = |id: &str, name: &str| {
        json!({
            "id": id,
            "name": name,
            "status": "ACTIVE",
            "addresses": {"private": [{"addr": "10.0.0.5", "version": 4}]},
            "image": {"id": "img-1"},
            "flavor": {"original_name": "m1.small"},
            "metadata": {},
            "links": [],
        })
    };
    vec![
        server("s-1", "web1"),
        server("s-2", "db"),
        server("s-3", "dup"),
        server("s-4", "dup"),
    ]
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"itemNotFound": {"code": 404, "message": format!("{} could not be found.", what)}})),
    )
        .into_response()
}

async fn issue_token(State(base): State<String>, Json(body): Json<Value>) -> Response {
    let password = body.pointer("/auth/identity/password/user/password").and_then(Value::as_str);
    if password != Some("secret") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "message": "The request you have made requires authentication."}})),
        )
            .into_response();
    }

    let endpoint = |kind: &str, path: &str| {
        json!({
            "type": kind,
            "name": kind,
            "endpoints": [{"interface": "public", "region_id": "RegionOne", "url": format!("{}/{}", base, path)}],
        })
    };
    let token = json!({
        "token": {
            "expires_at": "2026-10-17T18:00:00.000000Z",
            "user": {"id": "u-1", "name": "demo"},
            "project": {"id": "p-1", "name": "demo"},
            "catalog": [endpoint("compute", "compute"), endpoint("network", "network")],
        }
    });

    let mut headers = HeaderMap::new();
    headers.insert("X-Subject-Token", TOKEN.parse().expect("valid header"));
    (StatusCode::CREATED, headers, Json(token)).into_response()
}

async fn list_servers(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let items: Vec<Value> = servers()
        .into_iter()
        .filter(|s| match query.get("name") {
            Some(name) => s["name"] == name.as_str(),
            None => true,
        })
        .collect();
    Json(json!({ "servers": items }))
}

async fn get_server(Path(id): Path<String>) -> Response {
    match servers().into_iter().find(|s| s["id"] == id.as_str()) {
        Some(server) => Json(json!({ "server": server })).into_response(),
        None => not_found(&format!("Instance {}", id)),
    }
}

async fn get_flavor(Path(id): Path<String>) -> Response {
    if id == "f-1" {
        Json(json!({"flavor": {"id": "f-1", "name": "m1.small", "ram": 2048, "vcpus": 1, "disk": 20}})).into_response()
    } else {
        not_found(&format!("Flavor {}", id))
    }
}

async fn list_networks(headers: HeaderMap) -> Response {
    if headers.get("X-Auth-Token").and_then(|v| v.to_str().ok()) != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
    }
    Json(json!({
        "networks": [
            {"id": "n-1", "name": "private", "subnets": ["sn-1"], "status": "ACTIVE"},
            {"id": "n-2", "name": "public", "subnets": [], "status": "ACTIVE"},
        ]
    }))
    .into_response()
}
