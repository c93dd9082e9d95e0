// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Commands that work without a cloud connection

use anyhow::Result;
use clap::{Args, Subcommand};
use clap_complete::Shell;
use serde_json::Value;

use crate::config::CloudConfig;
use crate::output::{self, FormatArgs};

const REDACTED: &str = "<redacted>";

/// Settings that are never printed unless `--unmask` is given
const SECRETS: &[&str] = &["auth.password", "auth.token"];

#[derive(Subcommand, Clone)]
pub enum ConfigurationCommand {
    /// Display configuration details
    Show(ShowArgs),
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Show password in clear text
    #[arg(long, conflicts_with = "mask")]
    pub unmask: bool,

    /// Show password as <redacted> (default)
    #[arg(long)]
    pub mask: bool,
}

impl ConfigurationCommand {
    pub fn run(self, format: &FormatArgs, config: &CloudConfig) -> Result<()> {
        match self {
            Self::Show(args) => {
                let (columns, values) = configuration_fields(config, !args.unmask);
                output::show(format, &columns, &values)
            }
        }
    }
}

/// Resolved settings as sorted `(name, value)` pairs
pub fn configuration_fields(config: &CloudConfig, mask: bool) -> (Vec<String>, Vec<Value>) {
    let o = &config.options;
    let v = &config.versions;
    let mut fields: Vec<(&str, Option<String>)> = vec![
        ("auth.auth_url", o.auth_url.clone()),
        ("auth.url", o.url.clone()),
        ("auth.token", o.token.clone()),
        ("auth.username", o.username.clone()),
        ("auth.user_id", o.user_id.clone()),
        ("auth.password", o.password.clone()),
        ("auth.project_name", o.project_name.clone()),
        ("auth.project_id", o.project_id.clone()),
        ("auth.user_domain_name", o.user_domain_name.clone()),
        ("auth.user_domain_id", o.user_domain_id.clone()),
        ("auth.project_domain_name", o.project_domain_name.clone()),
        ("auth.project_domain_id", o.project_domain_id.clone()),
        ("auth.domain_name", o.domain_name.clone()),
        ("auth.domain_id", o.domain_id.clone()),
        ("auth_type", o.auth_type.clone()),
        ("cloud", config.name.clone()),
        ("region_name", o.region_name.clone()),
        ("interface", Some(o.interface.clone())),
        ("identity_api_version", Some(o.identity_api_version.clone())),
        ("compute_api_version", Some(v.compute.clone())),
        ("network_api_version", Some(v.network.clone())),
        ("volume_api_version", Some(v.volume.clone())),
        ("object_api_version", Some(v.object_store.clone())),
        ("verify", Some((!config.session.insecure).to_string())),
        (
            "cacert",
            config.session.cacert.as_ref().map(|p| p.display().to_string()),
        ),
    ];
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .filter_map(|(name, value)| {
            let value = value?;
            let value = if mask && SECRETS.contains(&name) {
                REDACTED.to_string()
            } else {
                value
            };
            Some((name.to_string(), Value::String(value)))
        })
        .unzip()
}

#[derive(Args, Clone)]
pub struct CompleteArgs {
    /// Shell to generate completions for
    #[arg(long, value_enum, default_value_t = Shell::Bash)]
    pub shell: Shell,
}

impl CompleteArgs {
    /// Write the completion script for `cmd` to stdout
    pub fn run(self, cmd: &mut clap::Command) -> Result<()> {
        let name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, cmd, name, &mut std::io::stdout().lock());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CloudEntry, GlobalArgs};
    use pretty_assertions::assert_eq;

    fn config() -> CloudConfig {
        let args = GlobalArgs {
            os_auth_url: Some("http://keystone:5000/v3".into()),
            os_username: Some("demo".into()),
            os_password: Some("s3cret".into()),
            ..GlobalArgs::default()
        };
        args.merge(CloudEntry::default())
    }

    fn lookup<'a>(fields: &'a (Vec<String>, Vec<Value>), name: &str) -> Option<&'a Value> {
        let (columns, values) = fields;
        columns.iter().position(|c| c == name).map(|i| &values[i])
    }

    #[test]
    fn test_password_masked_by_default() {
        let fields = configuration_fields(&config(), true);
        assert_eq!(lookup(&fields, "auth.password"), Some(&Value::from(REDACTED)));
        assert_eq!(lookup(&fields, "auth.username"), Some(&Value::from("demo")));
        assert_eq!(lookup(&fields, "auth.token"), None);
    }

    #[test]
    fn test_unmask_shows_password() {
        let fields = configuration_fields(&config(), false);
        assert_eq!(lookup(&fields, "auth.password"), Some(&Value::from("s3cret")));
    }

    #[test]
    fn test_fields_sorted() {
        let (columns, _) = configuration_fields(&config(), true);
        let mut sorted = columns.clone();
        sorted.sort();
        assert_eq!(columns, sorted);
    }
}
