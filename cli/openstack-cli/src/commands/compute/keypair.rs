// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Keypair commands

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use openstack_client::Manager;
use serde_json::{Map, Value};

use super::microversion_at_least;
use crate::commands::{self, Context};
use crate::error::{CommandError, DeleteReport};
use crate::output;
use crate::utils;

#[derive(Subcommand, Clone)]
pub enum KeypairCommand {
    /// List key fingerprints
    List(ListArgs),
    /// Display key details
    Show(ShowArgs),
    /// Create new public or private key for server ssh access
    Create(CreateArgs),
    /// Delete public or private key(s)
    Delete(DeleteArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum KeyType {
    Ssh,
    X509,
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Show keypairs for another user (admin only, name or ID)
    #[arg(long)]
    pub user: Option<String>,

    /// Domain the user belongs to
    #[arg(long, requires = "user")]
    pub user_domain: Option<String>,
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Public or private key to display (name only)
    pub name: String,

    /// Show only bare public key paired with the generated key
    #[arg(long)]
    pub public_key: bool,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// New public or private key name
    pub name: String,

    /// Filename for public key to add. If not used, creates a private key.
    #[arg(long, value_name = "FILE", conflicts_with = "private_key")]
    pub public_key: Option<PathBuf>,

    /// Filename for private key to save. If not used, print private key in console.
    #[arg(long, value_name = "FILE")]
    pub private_key: Option<PathBuf>,

    /// Keypair type (compute API 2.2 or later)
    #[arg(long = "type", value_enum)]
    pub key_type: Option<KeyType>,
}

#[derive(Args, Clone)]
pub struct DeleteArgs {
    /// Name of key(s) to delete (name only)
    #[arg(required = true)]
    pub names: Vec<String>,
}

impl KeypairCommand {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Self::List(args) => list(args, ctx).await,
            Self::Show(args) => show(args, ctx).await,
            Self::Create(args) => create(args, ctx).await,
            Self::Delete(args) => delete(args, ctx).await,
        }
    }
}

async fn list(args: ListArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;

    let user_id = match &args.user {
        Some(user) => {
            if !microversion_at_least(compute.version(), 2, 10) {
                return Err(CommandError::new(
                    "--os-compute-api-version 2.10 or greater is required to support the --user option",
                )
                .into());
            }
            let identity = ctx.clients.identity().await?;
            Some(
                commands::find_user(identity, user, args.user_domain.as_deref())
                    .await?
                    .id()
                    .to_string(),
            )
        }
        None => None,
    };

    let keypairs = compute
        .keypairs()
        .list(&commands::query(&[("user_id", user_id)]))
        .await?;

    let columns: &[&str] = if microversion_at_least(compute.version(), 2, 2) {
        &["Name", "Fingerprint", "Type"]
    } else {
        &["Name", "Fingerprint"]
    };
    let rows = output::rows(&keypairs, columns, &[], &[]);
    output::list(&ctx.format, &output::headers(columns), rows)
}

async fn show(args: ShowArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let keypair = utils::find_resource(compute.keypairs(), &args.name).await?;

    if args.public_key {
        println!("{}", keypair.str_field("public_key").unwrap_or_default());
        return Ok(());
    }
    output::show_resource(&ctx.format, &keypair, &["public_key", "private_key"], &[])
}

async fn create(args: CreateArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;

    let mut body = Map::new();
    body.insert("name".into(), Value::from(args.name.clone()));
    if let Some(path) = &args.public_key {
        let key = utils::read_blob_file_contents(path)?;
        body.insert("public_key".into(), Value::from(key.trim_end()));
    }
    if let Some(key_type) = args.key_type {
        if !microversion_at_least(compute.version(), 2, 2) {
            return Err(CommandError::new(
                "--os-compute-api-version 2.2 or greater is required to support the --type option",
            )
            .into());
        }
        body.insert("type".into(), Value::from(key_type.to_string()));
    }

    let keypair = compute.keypairs().create(Value::Object(body)).await?;
    tracing::info!("created keypair {}", keypair.name());

    // Generated keys come back once; save or print them.
    if let Some(private) = keypair.str_field("private_key") {
        match &args.private_key {
            Some(path) => {
                write_private_key(path, private)?;
                return output::show_resource(&ctx.format, &keypair, &["public_key", "private_key"], &[]);
            }
            None => {
                print!("{}", private);
                return Ok(());
            }
        }
    }

    output::show_resource(&ctx.format, &keypair, &["public_key", "private_key"], &[])
}

fn write_private_key(path: &Path, key: &str) -> Result<(), CommandError> {
    std::fs::write(path, key).map_err(|e| {
        CommandError::new(format!(
            "Key created but unable to save private key to {}: {}",
            path.display(),
            e
        ))
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
            CommandError::new(format!("Unable to restrict permissions on {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}

async fn delete(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let compute = ctx.clients.compute().await?;
    let mut report = DeleteReport::new("key", args.names.len());
    for name in &args.names {
        let result: Result<(), CommandError> = async {
            let keypair = utils::find_resource(compute.keypairs(), name).await?;
            compute.keypairs().delete(keypair.name()).await?;
            Ok(())
        }
        .await;
        report.record(name, result);
    }
    Ok(report.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_private_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_test");
        write_private_key(&path, "-----BEGIN KEY-----\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "-----BEGIN KEY-----\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
