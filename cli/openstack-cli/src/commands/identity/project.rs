// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Project commands

use anyhow::Result;
use clap::{Args, Subcommand};
use openstack_auth::keystone::IdentityVersion;
use openstack_client::Manager;
use serde_json::{Map, Value};

use super::created_or_existing;
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::parseractions::{KeyValue, parse_key_value};
use crate::utils::{self, format_list};

#[derive(Subcommand, Clone)]
pub enum ProjectCommand {
    /// List projects
    List(ListArgs),
    /// Display project details
    Show(ShowArgs),
    /// Create new project
    Create(CreateArgs),
    /// Delete project(s)
    Delete(DeleteArgs),
    /// Set project properties
    Set(SetArgs),
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Filter projects by domain (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Filter projects by user (name or ID)
    #[arg(long)]
    pub user: Option<String>,

    /// List projects for the authenticated user
    #[arg(long, conflicts_with = "user")]
    pub my_projects: bool,

    /// List additional fields in output
    #[arg(long)]
    pub long: bool,

    /// Sort output by selected keys and directions (asc or desc),
    /// multiple keys and directions can be specified separated by comma
    #[arg(long, value_name = "KEY[:DIRECTION]")]
    pub sort: Option<String>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Project to display (name or ID)
    pub project: String,

    /// Domain owning the project (name or ID)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New project name
    pub name: String,

    /// Domain owning the project (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Parent of the project (name or ID)
    #[arg(long)]
    pub parent: Option<String>,

    /// Project description
    #[arg(long)]
    pub description: Option<String>,

    /// Enable project (default)
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable project
    #[arg(long)]
    pub disable: bool,

    /// Add a property to the project (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,

    /// Tag to add to the project (repeat option to set multiple tags)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Return existing project
    #[arg(long)]
    pub or_show: bool,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Project(s) to delete (name or ID)
    #[arg(required = true)]
    pub projects: Vec<String>,

    /// Domain owning the project(s) (name or ID)
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// Project to modify (name or ID)
    pub project: String,

    /// Set project name
    #[arg(long)]
    pub name: Option<String>,

    /// Domain owning the project (name or ID)
    #[arg(long)]
    pub domain: Option<String>,

    /// Set project description
    #[arg(long)]
    pub description: Option<String>,

    /// Enable project
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable project
    #[arg(long)]
    pub disable: bool,

    /// Set a property on the project (repeat option to set multiple properties)
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<KeyValue>,
}

impl ProjectCommand {
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

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;

    let user_id = if args.my_projects {
        let auth = ctx.clients.auth().await?;
        Some(
            auth.user_id
                .clone()
                .ok_or_else(|| CommandError::new("The current token does not identify a user"))?,
        )
    } else {
        match &args.user {
            Some(u) => Some(
                commands::find_user(identity, u, args.domain.as_deref())
                    .await?
                    .id()
                    .to_string(),
            ),
            None => None,
        }
    };

    let mut projects = match user_id {
        Some(uid) => identity.user_projects(&uid).await?,
        None => {
            let domain_id = commands::domain_id(identity, args.domain.as_deref()).await?;
            identity
                .projects()
                .list(&commands::query(&[("domain_id", domain_id)]))
                .await?
        }
    };

    if let Some(sort) = &args.sort {
        utils::sort_items(&mut projects, sort)?;
    }

    let columns: &[&str] = match (args.long, identity.version()) {
        (false, _) => &["ID", "Name"],
        (true, IdentityVersion::V3) => &["ID", "Name", "Domain ID", "Description", "Enabled"],
        (true, IdentityVersion::V2) => &["ID", "Name", "Description", "Enabled"],
    };
    let rows = output::rows(&projects, columns, &[], &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let project = commands::find_project(identity, &args.project, args.domain.as_deref()).await?;
    output::show_resource(&ctx.format, &project, &["links"], &[("tags", format_list)])
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;

    let mut body: Map<String, Value> = commands::properties(&args.properties);
    body.insert("name".into(), Value::from(args.name.clone()));
    commands::insert_opt(&mut body, "description", args.description.clone());
    body.insert(
        "enabled".into(),
        Value::Bool(commands::toggle(args.enable, args.disable).unwrap_or(true)),
    );

    if identity.version() == IdentityVersion::V3 {
        let domain_id = commands::domain_id(identity, args.domain.as_deref()).await?;
        commands::insert_opt(&mut body, "domain_id", domain_id);
        if let Some(parent) = &args.parent {
            let parent = commands::find_project(identity, parent, args.domain.as_deref()).await?;
            body.insert("parent_id".into(), Value::from(parent.id()));
        }
        if !args.tags.is_empty() {
            body.insert("tags".into(), Value::from(args.tags.clone()));
        }
    }

    let created = identity.projects().create(Value::Object(body)).await;
    let project = created_or_existing(created, args.or_show, &args.name, async || {
        commands::find_project(identity, &args.name, args.domain.as_deref()).await
    })
    .await?;

    output::show_resource(&ctx.format, &project, &["links"], &[("tags", format_list)])
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let mut report = DeleteReport::new("project", args.projects.len());
    for name in &args.projects {
        let result: Result<(), CommandError> = async {
            let project = commands::find_project(identity, name, args.domain.as_deref()).await?;
            identity.projects().delete(project.id()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

async fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let identity = ctx.clients.identity().await?;
    let project = commands::find_project(identity, &args.project, args.domain.as_deref()).await?;

    let mut body: Map<String, Value> = commands::properties(&args.properties);
    commands::insert_opt(&mut body, "name", args.name);
    commands::insert_opt(&mut body, "description", args.description);
    commands::insert_opt(&mut body, "enabled", commands::toggle(args.enable, args.disable));

    if body.is_empty() {
        tracing::debug!("nothing to set on project {}", project.id());
        return Ok(());
    }
    identity.projects().update(project.id(), Value::Object(body)).await?;
    Ok(())
}
