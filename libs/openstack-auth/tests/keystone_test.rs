// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Token issue tests against an in-process fake Keystone

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use openstack_auth::{AuthError, AuthOptions, AuthPlugin, Authenticator};
use serde_json::{Value, json};

async fn v3_tokens(Json(body): Json<Value>) -> axum::response::Response {
    let password = body
        .pointer("/auth/identity/password/user/password")
        .and_then(Value::as_str);
    if password != Some("secret") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "message": "The request you have made requires authentication."}})),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        [("X-Subject-Token", "tok-v3")],
        Json(json!({
            "token": {
                "expires_at": "2030-01-01T00:00:00.000000Z",
                "user": {"id": "u-1"},
                "project": {"id": "p-1"},
                "catalog": [{
                    "type": "compute",
                    "name": "nova",
                    "endpoints": [{"interface": "public", "region_id": "RegionOne", "url": "http://nova/v2.1"}]
                }]
            }
        })),
    )
        .into_response()
}

async fn v2_tokens() -> impl IntoResponse {
    Json(json!({
        "access": {
            "token": {"id": "tok-v2", "expires": "2030-01-01T00:00:00Z", "tenant": {"id": "t-1"}},
            "user": {"id": "u-2"},
            "serviceCatalog": []
        }
    }))
}

async fn spawn_keystone() -> String {
    let app = Router::new()
        .route("/v3/auth/tokens", post(v3_tokens))
        .route("/v2.0/tokens", post(v2_tokens));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn http() -> reqwest::Client {
    let _ = rustls::crypto::ring::default_provider().install_default();
    reqwest::Client::new()
}

fn opts(auth_url: String) -> AuthOptions {
    AuthOptions {
        auth_url: Some(auth_url),
        username: Some("demo".into()),
        password: Some("secret".into()),
        project_name: Some("demo".into()),
        ..AuthOptions::default()
    }
}

#[tokio::test]
async fn test_v3_password_issues_token_with_catalog() {
    let base = spawn_keystone().await;
    let session = Authenticator::new(AuthPlugin::V3Password, opts(base))
        .authenticate(&http())
        .await
        .unwrap();

    assert_eq!(session.token, "tok-v3");
    assert_eq!(session.project_id.as_deref(), Some("p-1"));
    assert_eq!(
        session.catalog.url_for(&["compute"], "public", None).unwrap(),
        "http://nova/v2.1"
    );
}

#[tokio::test]
async fn test_bad_password_is_authorization_failure() {
    let base = spawn_keystone().await;
    let mut o = opts(format!("{}/v3", base));
    o.password = Some("wrong".into());
    let err = Authenticator::new(AuthPlugin::V3Password, o)
        .authenticate(&http())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::AuthorizationFailure(_)));
    assert!(err.to_string().contains("requires authentication"));
}

#[tokio::test]
async fn test_generic_password_uses_v2_url() {
    let base = spawn_keystone().await;
    let session = Authenticator::new(AuthPlugin::Password, opts(format!("{}/v2.0", base)))
        .authenticate(&http())
        .await
        .unwrap();

    assert_eq!(session.token, "tok-v2");
    assert_eq!(session.user_id.as_deref(), Some("u-2"));
}

#[tokio::test]
async fn test_token_endpoint_skips_keystone() {
    let o = AuthOptions {
        url: Some("http://nova/v2.1".into()),
        token: Some("admin-token".into()),
        ..AuthOptions::default()
    };
    let session = Authenticator::new(AuthPlugin::TokenEndpoint, o)
        .authenticate(&http())
        .await
        .unwrap();

    assert_eq!(session.token, "admin-token");
    assert_eq!(session.endpoint_override.as_deref(), Some("http://nova/v2.1"));
    assert!(session.catalog.entries.is_empty());
}
