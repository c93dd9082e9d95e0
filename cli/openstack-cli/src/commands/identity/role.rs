// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Role commands

use anyhow::Result;
use clap::{ArgGroup, Args, Subcommand};
use openstack_auth::keystone::IdentityVersion;
use openstack_client::{IdentityClient, Manager, Resource, RoleActor, RoleScope};
use serde_json::{Map, Value};

use super::created_or_existing;
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::utils;

#[derive(Subcommand, Clone)]
pub enum RoleCommand {
    /// List roles
    List(ListArgs),
    /// Display role details
    Show(ShowArgs),
    /// Create new role
    Create(CreateArgs),
    /// Delete role(s)
    Delete(DeleteArgs),
    /// Adds a role assignment to a user or group on a domain or project
    Add(AssignmentArgs),
    /// Removes a role assignment from domain/project : user/group
    Remove(AssignmentArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Include domain-specific roles from this domain (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Only list roles the user holds on --project (name or ID)
    #[arg(long, requires = "project")]
    pub user: Option<String>,

    /// Project the --user roles apply to (name or ID)
    #[arg(long, requires = "user")]
    pub project: Option<String>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Role to display (name or ID)
    pub role: String,

    /// Domain the role belongs to (name or ID)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New role name
    pub name: String,

    /// Domain the role belongs to (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Add description about the role
    #[arg(long)]
    pub description: Option<String>,

    /// Return existing role
    #[arg(long)]
    pub or_show: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Role(s) to delete (name or ID)
    #[arg(required = true)]
    pub roles: Vec<String>,

    /// Domain the role belongs to (name or ID)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Clone)]
#[command(group(ArgGroup::new("scope").required(true).args(["project", "domain"])))]
#[command(group(ArgGroup::new("actor").required(true).args(["user", "group"])))]
pub struct AssignmentArgs {
    /// Role to add or remove (name or ID)
    pub role: String,

    /// Include <project> (name or ID)
    #[arg(long)]
    pub project: Option<String>,

    /// Include <domain> (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Include <user> (name or ID)
    #[arg(long)]
    pub user: Option<String>,

    /// Include <group> (name or ID)
    #[arg(long)]
    pub group: Option<String>,

    /// Domain the project belongs to (name or ID)
    #[arg(long, requires = "project")]
    pub project_domain: Option<String>,

    /// Domain the user or group belongs to (name or ID)
    #[arg(long)]
    pub user_domain: Option<String>,

    /// Domain the role belongs to (name or ID)
    #[arg(long)]
    pub role_domain: Option<String>,
}

impl RoleCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
            Self::Add(args) => assign(args, ctx, true).await,
            Self::Remove(args) => assign(args, ctx, false).await,
        }
    }
}

async fn find_role(identity: &IdentityClient, role: &str, domain: Option<&str>) -> Result<Resource, CommandError> {
    let filters = commands::query(&[("domain_id", commands::domain_id(identity, domain).await?)]);
    utils::find_resource_with(identity.roles(), role, &filters).await
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;

    let roles = match (&args.user, &args.project) {
        (Some(user), Some(project)) => {
            let user = commands::find_user(identity, user, None).await?;
            let project = commands::find_project(identity, project, None).await?;
            identity.user_roles_on_project(user.id(), project.id()).await?
        }
        _ => {
            let domain_id = commands::domain_id(identity, args.domain.as_deref()).await?;
            identity
                .roles()
                .list(&commands::query(&[("domain_id", domain_id)]))
                .await?
        }
    };

    let columns: &[&str] = if args.domain.is_some() {
        &["ID", "Name", "Domain ID"]
    } else {
        &["ID", "Name"]
    };
    let rows = output::rows(&roles, columns, &[], &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let role = find_role(identity, &args.role, args.domain.as_deref()).await?;
    output::show_resource(&ctx.format, &role, &["links"], &[])
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name.clone()));
    if identity.version() == IdentityVersion::V3 {
        let domain_id = commands::domain_id(identity, args.domain.as_deref()).await?;
        commands::insert_opt(&mut body, "domain_id", domain_id);
        commands::insert_opt(&mut body, "description", args.description.clone());
    }

    let created = identity.roles().create(Value::Object(body)).await;
    let role = created_or_existing(created, args.or_show, &args.name, async || {
        find_role(identity, &args.name, args.domain.as_deref()).await
    })
    .await?;

    output::show_resource(&ctx.format, &role, &["links"], &[])
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let mut report = DeleteReport::new("role", args.roles.len());
    for name in &args.roles {
        let result: Result<(), CommandError> = async {
            let role = find_role(identity, name, args.domain.as_deref()).await?;
            identity.roles().delete(role.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

/// `role add` and `role remove`
async fn assign(args: AssignmentArgs, ctx: &Context, grant: bool) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let role = find_role(identity, &args.role, args.role_domain.as_deref()).await?;

    let scope = match (&args.project, &args.domain) {
        (Some(project), _) => RoleScope::Project(
            commands::find_project(identity, project, args.project_domain.as_deref())
                .await?
                .id()
                .to_string(),
        ),
        (None, Some(domain)) => RoleScope::Domain(commands::find_domain(identity, domain).await?.id().to_string()),
        (None, None) => return Err(CommandError::new("Role not added, no project or domain specified").into()),
    };

    let actor = match (&args.user, &args.group) {
        (Some(user), _) => RoleActor::User(
            commands::find_user(identity, user, args.user_domain.as_deref())
                .await?
                .id()
                .to_string(),
        ),
        (None, Some(group)) => RoleActor::Group(
            commands::find_group(identity, group, args.user_domain.as_deref())
                .await?
                .id()
                .to_string(),
        ),
        (None, None) => return Err(CommandError::new("Role not added, no user or group specified").into()),
    };

    if grant {
        identity.grant_role(role.id(), &actor, &scope).await?;
        tracing::info!("granted role {} to {:?} on {:?}", role.name(), actor, scope);
    } else {
        identity.revoke_role(role.id(), &actor, &scope).await?;
        tracing::info!("revoked role {} from {:?} on {:?}", role.name(), actor, scope);
    }
    Ok(())
}
