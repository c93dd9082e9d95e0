// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Token commands

use anyhow::Result;
use clap::Subcommand;
use openstack_auth::{AuthPlugin, AuthSession};
use serde_json::Value;

use crate::commands::Context;
use crate::error::CommandError;
use crate::output;

#[derive(Subcommand, Clone)]
pub enum TokenCommand {
    /// Issue new token
    Issue,
}

impl TokenCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Issue => issue(ctx).await,
        }
    }
}

async fn issue(ctx: &Context) -> Result<()> {
    if ctx.clients.plugin() == AuthPlugin::TokenEndpoint {
        return Err(CommandError::new("Only an authorized user may issue a new token.").into());
    }
    let auth = ctx.clients.auth().await?;
    let (columns, values) = token_fields(auth);
    output::show(&ctx.format, &columns, &values)
}

/// Fields shown for a token; scope IDs only when the token carries them
fn token_fields(auth: &AuthSession) -> (Vec<String>, Vec<Value>) {
    let mut fields: Vec<(&str, Value)> = vec![
        (
            "expires",
            auth.expires_at
                .map(|t| Value::from(t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)))
                .unwrap_or(Value::Null),
        ),
        ("id", Value::from(auth.token.clone())),
    ];
    if let Some(project) = &auth.project_id {
        fields.push(("project_id", Value::from(project.clone())));
    }
    if let Some(domain) = &auth.domain_id {
        fields.push(("domain_id", Value::from(domain.clone())));
    }
    if let Some(user) = &auth.user_id {
        fields.push(("user_id", Value::from(user.clone())));
    }
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use openstack_auth::ServiceCatalog;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_project_scoped_token_fields() {
        let auth = AuthSession {
            token: "gAAAA".into(),
            expires_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single(),
            user_id: Some("u1".into()),
            project_id: Some("p1".into()),
            domain_id: None,
            catalog: ServiceCatalog::default(),
            endpoint_override: None,
        };
        let (columns, values) = token_fields(&auth);
        assert_eq!(columns, vec!["expires", "id", "project_id", "user_id"]);
        assert_eq!(values[0], Value::from("2026-01-02T03:04:05Z"));
        assert_eq!(values[1], Value::from("gAAAA"));
    }
}
