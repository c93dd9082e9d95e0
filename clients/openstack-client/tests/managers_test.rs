// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Manager behaviour against an in-process fake cloud
//!
//! The fake is reached through the `token_endpoint` plugin, so every
//! service shares one base URL and no Keystone round trip happens.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use openstack_client::openstack_auth::{AuthOptions, AuthPlugin};
use openstack_client::{ApiVersions, ClientManager, Lookup, Manager, SessionConfig};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn servers() -> Vec<Value> {
    vec![
        json!({"id": "s1", "name": "web", "status": "ACTIVE"}),
        json!({"id": "s2", "name": "db", "status": "ACTIVE"}),
        json!({"id": "s3", "name": "db", "status": "SHUTOFF"}),
        json!({"id": "s4", "name": "web-2", "status": "ACTIVE"}),
    ]
}

async fn list_servers(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    // Nova treats the name filter as a regular expression, so partial
    // matches come back too.
    let items: Vec<Value> = servers()
        .into_iter()
        .filter(|s| match q.get("name") {
            Some(name) => s["name"].as_str().unwrap().contains(name.as_str()),
            None => true,
        })
        .collect();
    Json(json!({ "servers": items }))
}

async fn get_server(Path(id): Path<String>) -> Response {
    match servers().into_iter().find(|s| s["id"] == id.as_str()) {
        Some(s) => Json(json!({ "server": s })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [("x-compute-request-id", "req-404")],
            Json(json!({"itemNotFound": {"code": 404, "message": format!("Instance {} could not be found.", id)}})),
        )
            .into_response(),
    }
}

async fn list_keypairs() -> Json<Value> {
    Json(json!({
        "keypairs": [
            {"keypair": {"name": "k1", "fingerprint": "aa:bb"}},
            {"keypair": {"name": "k2", "fingerprint": "cc:dd"}}
        ]
    }))
}

async fn list_networks(
    State(base): State<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    if q.get("marker").map(String::as_str) == Some("n2") {
        return Json(json!({
            "networks": [{"id": "n3", "name": "ext"}],
            "networks_links": []
        }));
    }
    Json(json!({
        "networks": [{"id": "n1", "name": "private"}, {"id": "n2", "name": "public"}],
        "networks_links": [{"rel": "next", "href": format!("{}/v2.0/networks?marker=n2", base)}]
    }))
}

async fn update_network(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    let mut net = body["network"].clone();
    net["id"] = json!(id);
    Json(json!({ "network": net }))
}

async fn patch_project(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    let mut project = json!({"id": id, "name": "demo", "enabled": true});
    if let Some(desc) = body.pointer("/project/description") {
        project["description"] = desc.clone();
    }
    Json(json!({ "project": project }))
}

async fn spawn_cloud() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = Router::new()
        .route("/servers/detail", get(list_servers))
        .route("/servers/{id}", get(get_server))
        .route("/os-keypairs", get(list_keypairs))
        .route("/v2.0/networks", get(list_networks))
        .route("/v2.0/networks/{id}", axum::routing::put(update_network))
        .route("/v3/projects/{id}", axum::routing::patch(patch_project))
        .with_state(base.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn manager(base: &str) -> ClientManager {
    let options = AuthOptions {
        url: Some(base.to_string()),
        token: Some("admin-token".into()),
        ..AuthOptions::default()
    };
    ClientManager::new(
        options,
        AuthPlugin::TokenEndpoint,
        SessionConfig::default(),
        ApiVersions::default(),
    )
}

#[tokio::test]
async fn test_find_exact_name_among_partial_matches() {
    let base = spawn_cloud().await;
    let cm = manager(&base);
    let servers = cm.compute().await.unwrap().servers();

    match servers.find("web", &[]).await.unwrap() {
        Lookup::Found(r) => assert_eq!(r.id(), "s1"),
        other => panic!("expected a single match, got {:?}", other),
    }
    assert_eq!(servers.find("db", &[]).await.unwrap(), Lookup::Ambiguous(2));
    assert_eq!(servers.find("nope", &[]).await.unwrap(), Lookup::NotFound);
}

#[tokio::test]
async fn test_get_missing_maps_to_not_found() {
    let base = spawn_cloud().await;
    let cm = manager(&base);
    let err = cm
        .compute()
        .await
        .unwrap()
        .servers()
        .get("zzz")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "Instance zzz could not be found. (HTTP 404) (Request-ID: req-404)"
    );
}

#[tokio::test]
async fn test_list_follows_next_links() {
    let base = spawn_cloud().await;
    let cm = manager(&base);
    let nets = cm.network().await.unwrap().networks().list(&[]).await.unwrap();
    let ids: Vec<&str> = nets.iter().map(|n| n.id()).collect();
    assert_eq!(ids, vec!["n1", "n2", "n3"]);
}

#[tokio::test]
async fn test_list_with_limit_stops_after_one_page() {
    let base = spawn_cloud().await;
    let cm = manager(&base);
    let query = [("limit".to_string(), "2".to_string())];
    let nets = cm
        .network()
        .await
        .unwrap()
        .networks()
        .list(&query)
        .await
        .unwrap();
    assert_eq!(nets.len(), 2);
}

#[tokio::test]
async fn test_nested_keypair_items_are_unwrapped() {
    let base = spawn_cloud().await;
    let cm = manager(&base);
    let keypairs = cm.compute().await.unwrap().keypairs();
    let all = keypairs.list(&[]).await.unwrap();
    assert_eq!(all[1].str_field("fingerprint"), Some("cc:dd"));

    match keypairs.find("k2", &[]).await.unwrap() {
        Lookup::Found(r) => assert_eq!(r.name(), "k2"),
        other => panic!("expected k2, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_uses_service_envelope_and_verb() {
    let base = spawn_cloud().await;
    let cm = manager(&base);

    let net = cm
        .network()
        .await
        .unwrap()
        .networks()
        .update("n1", json!({"name": "renamed"}))
        .await
        .unwrap();
    assert_eq!(net.name(), "renamed");
    assert_eq!(net.id(), "n1");

    let project = cm
        .identity()
        .await
        .unwrap()
        .projects()
        .update("p1", json!({"description": "lab"}))
        .await
        .unwrap();
    assert_eq!(project.str_field("description"), Some("lab"));
}

#[tokio::test]
async fn test_missing_token_fails_validation() {
    let cm = ClientManager::new(
        AuthOptions {
            url: Some("http://127.0.0.1:1".into()),
            ..AuthOptions::default()
        },
        AuthPlugin::TokenEndpoint,
        SessionConfig::default(),
        ApiVersions::default(),
    );
    let err = cm.session().await.unwrap_err();
    assert!(err.to_string().contains("Missing parameter(s)"));
}
