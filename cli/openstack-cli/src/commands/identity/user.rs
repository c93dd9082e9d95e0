// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! User commands

use std::collections::BTreeSet;

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_auth::keystone::IdentityVersion;
use openstack_client::{IdentityClient, Manager, Resource};
use serde_json::{Map, Value};

use super::created_or_existing;
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::utils;

#[derive(Subcommand, Clone)]
pub enum UserCommand {
    /// List users
    List(ListArgs),
    /// Display user details
    Show(ShowArgs),
    /// Create new user
    Create(CreateArgs),
    /// Delete user(s)
    Delete(DeleteArgs),
    /// Set user properties
    Set(SetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Filter users by domain (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Filter users by project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// User to display (name or ID)
    pub user: String,

    /// Domain owning the user (name or ID)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New user name
    pub name: String,

    /// Default domain (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Default project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Set user password
    #[arg(long, conflicts_with = "password_prompt")]
    pub password: Option<String>,

    /// Prompt interactively for password
    #[arg(long)]
    pub password_prompt: bool,

    /// Set user email address
    #[arg(long)]
    pub email: Option<String>,

    /// User description
    #[arg(long)]
    pub description: Option<String>,

    /// Enable user (default)
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable user
    #[arg(long)]
    pub disable: bool,

    /// Return existing user
    #[arg(long)]
    pub or_show: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// User(s) to delete (name or ID)
    #[arg(required = true)]
    pub users: Vec<String>,

    /// Domain owning the user(s) (name or ID)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// User to modify (name or ID)
    pub user: String,

    /// Set user name
    #[arg(long)]
    pub name: Option<String>,

    /// Domain owning the user (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Set default project (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Domain the project belongs to
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Set user password
    #[arg(long, conflicts_with = "password_prompt")]
    pub password: Option<String>,

    /// Prompt interactively for password
    #[arg(long)]
    pub password_prompt: bool,

    /// Set user email address
    #[arg(long)]
    pub email: Option<String>,

    /// Set user description
    #[arg(long)]
    pub description: Option<String>,

    /// Enable user
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable user
    #[arg(long)]
    pub disable: bool,
}

impl UserCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Set(args) => set(args, ctx).await,
        }
    }
}

/// Attribute holding the default project for each API version
fn project_attr(identity: &IdentityClient) -> &'static str {
    match identity.version() {
        IdentityVersion::V3 => "default_project_id",
        IdentityVersion::V2 => "tenantId",
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let domain_id = commands::domain_id(identity, args.domain.as_deref()).await?;

    let mut users = identity
        .users()
        .list(&commands::query(&[("domain_id", domain_id)]))
        .await?;

    if let Some(project) = &args.project {
        let project = commands::find_project(identity, project, args.domain.as_deref()).await?;
        users = match identity.version() {
            IdentityVersion::V3 => {
                let assignments = identity
                    .role_assignments(&[("scope.project.id".to_string(), project.id().to_string())])
                    .await?;
                let ids = assigned_user_ids(&assignments);
                users.into_iter().filter(|u| ids.contains(u.id())).collect()
            }
            IdentityVersion::V2 => users
                .into_iter()
                .filter(|u| u.str_field("tenantId") == Some(project.id()))
                .collect(),
        };
    }

    let attr = project_attr(identity);
    let users: Vec<Resource> = users
        .into_iter()
        .map(|mut u| {
            if let Some(p) = u.get(attr).cloned() {
                u.insert("project", p);
            }
            if let Some(d) = u.get("domain_id").cloned() {
                u.insert("domain", d);
            }
            u
        })
        .collect();

    let columns: &[&str] = match (args.long, identity.version()) {
        (false, _) => &["ID", "Name"],
        (true, IdentityVersion::V3) => &["ID", "Name", "Project", "Domain", "Description", "Email", "Enabled"],
        (true, IdentityVersion::V2) => &["ID", "Name", "Project", "Email", "Enabled"],
    };
    let rows = output::rows(&users, columns, &[], &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

/// User IDs from role assignment records
fn assigned_user_ids(assignments: &[Resource]) -> BTreeSet<String> {
    assignments
        .iter()
        .filter_map(|a| a.get("user").and_then(|u| u.get("id")).and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let user = commands::find_user(identity, &args.user, args.domain.as_deref()).await?;
    output::show_resource(&ctx.format, &user, &["links", "password"], &[])
}

/// `--password` or the interactive prompt
fn password(password: Option<String>, prompt: bool) -> Result<Option<String>, CommandError> {
    if prompt {
        return utils::get_password("User Password:", true).map(Some);
    }
    Ok(password)
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name.clone()));
    body.insert(
        "enabled".into(),
        Value::Bool(commands::toggle(args.enable, args.disable).unwrap_or(true)),
    );
    commands::insert_opt(&mut body, "email", args.email.clone());
    let password = password(args.password.clone(), args.password_prompt)?;
    if password.is_none() {
        tracing::warn!("No password was supplied, authentication will fail when a user does not have a password.");
    }
    commands::insert_opt(&mut body, "password", password);

    if let Some(project) = &args.project {
        let project = commands::find_project(identity, project, args.project_domain.as_deref()).await?;
        body.insert(project_attr(identity).into(), Value::from(project.id()));
    }
    if identity.version() == IdentityVersion::V3 {
        let domain_id = commands::domain_id(identity, args.domain.as_deref()).await?;
        commands::insert_opt(&mut body, "domain_id", domain_id);
        commands::insert_opt(&mut body, "description", args.description.clone());
    }

    let created = identity.users().create(Value::Object(body)).await;
    let user = created_or_existing(created, args.or_show, &args.name, async || {
        commands::find_user(identity, &args.name, args.domain.as_deref()).await
    })
    .await?;

    output::show_resource(&ctx.format, &user, &["links", "password"], &[])
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let mut report = DeleteReport::new("user", args.users.len());
    for name in &args.users {
        let result: Result<(), CommandError> = async {
            let user = commands::find_user(identity, name, args.domain.as_deref()).await?;
            identity.users().delete(user.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let user = commands::find_user(identity, &args.user, args.domain.as_deref()).await?;

    let mut body = Map::new();
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "email", args.email);
    commands::insert_opt(&mut body, "enabled", commands::toggle(args.enable, args.disable));
    commands::insert_opt(&mut body, "password", password(args.password, args.password_prompt)?);
    if identity.version() == IdentityVersion::V3 {
        commands::insert_opt(&mut body, "description", args.description);
    }
    if let Some(project) = &args.project {
        let project = commands::find_project(identity, project, args.project_domain.as_deref()).await?;
        body.insert(project_attr(identity).into(), Value::from(project.id()));
    }

    if body.is_empty() {
        tracing::debug!("nothing to set on user {}", user.id());
        return Ok(());
    }
    identity.users().update(user.id(), Value::Object(body)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assigned_user_ids_skips_groups() {
        let assignments: Vec<Resource> = [
            json!({"user": {"id": "u1"}, "role": {"id": "r"}}),
            json!({"group": {"id": "g1"}, "role": {"id": "r"}}),
            json!({"user": {"id": "u2"}, "role": {"id": "r"}}),
            json!({"user": {"id": "u1"}, "role": {"id": "r2"}}),
        ]
        .into_iter()
        .map(|v| Resource::from_value(v).unwrap())
        .collect();

        let ids: Vec<String> = assigned_user_ids(&assignments).into_iter().collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }
}
