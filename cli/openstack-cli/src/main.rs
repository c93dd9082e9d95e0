// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! OpenStack CLI - command-line client for OpenStack clouds

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use openstack_auth::select_auth_plugin;
use openstack_client::{ClientManager, install_crypto_provider};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod output;
mod parseractions;
mod utils;

use commands::{
    CompleteArgs, ConfigurationCommand, ContainerCommand, Context, FlavorCommand, KeypairCommand, NetworkCommand,
    ObjectCommand, PortCommand, ProjectCommand, RoleCommand, RouterCommand, SecurityCommand, ServerCommand,
    SubnetCommand, TokenCommand, UserCommand, VolumeCommand,
};
use config::GlobalArgs;
use output::FormatArgs;

#[derive(Parser)]
#[command(
    name = "openstack",
    version,
    about = "Command-line interface to the OpenStack APIs",
    long_about = "Command-line interface to the OpenStack compute, identity, network, volume and object-store APIs"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    format: FormatArgs,

    /// Increase verbosity of output. Can be repeated
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Show tracebacks on errors
    #[arg(long, global = true)]
    debug: bool,

    /// Specify a file to log output. Disabled by default
    #[arg(long, global = true, value_name = "LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute servers
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },

    /// Compute flavors
    Flavor {
        #[command(subcommand)]
        command: FlavorCommand,
    },

    /// Compute keypairs
    Keypair {
        #[command(subcommand)]
        command: KeypairCommand,
    },

    /// Identity projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Identity users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Identity roles and role assignments
    Role {
        #[command(subcommand)]
        command: RoleCommand,
    },

    /// Identity tokens
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },

    /// Networks
    Network {
        #[command(subcommand)]
        command: NetworkCommand,
    },

    /// Network subnets
    Subnet {
        #[command(subcommand)]
        command: SubnetCommand,
    },

    /// Network ports
    Port {
        #[command(subcommand)]
        command: PortCommand,
    },

    /// Network routers
    Router {
        #[command(subcommand)]
        command: RouterCommand,
    },

    /// Security groups and rules
    Security {
        #[command(subcommand)]
        command: SecurityCommand,
    },

    /// Block storage volumes, volume types and snapshots
    Volume {
        #[command(subcommand)]
        command: VolumeCommand,
    },

    /// Object store containers
    Container {
        #[command(subcommand)]
        command: ContainerCommand,
    },

    /// Object store objects
    Object {
        #[command(subcommand)]
        command: ObjectCommand,
    },

    /// Resolved client configuration
    Configuration {
        #[command(subcommand)]
        command: ConfigurationCommand,
    },

    /// Print shell completion script
    Complete(CompleteArgs),
}

impl Cli {
    /// Default log level from `-v`, `-q` and `--debug`
    fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.debug {
            "debug"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper_util=info,rustls=info", self.log_level())));
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

        match &self.log_file {
            Some(path) => match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => {
                    let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
                }
                Err(e) => {
                    let _ = builder.with_writer(std::io::stderr).try_init();
                    tracing::warn!("unable to open log file {}: {}", path.display(), e);
                }
            },
            None => {
                let _ = builder.with_writer(std::io::stderr).try_init();
            }
        }
    }
}

/// Build the client manager, prompting for a password when one is
/// needed and a terminal is attached
fn build_context(global: &GlobalArgs, format: FormatArgs) -> Result<Context> {
    let mut config = global.resolve()?;
    let plugin = select_auth_plugin(&config.options);
    if plugin.is_password() && config.options.password.is_none() && std::io::stdin().is_terminal() {
        config.options.password = Some(utils::get_password("Password: ", false)?);
    }
    tracing::debug!("auth plugin {} selected", plugin);

    let clients = ClientManager::new(config.options, plugin, config.session, config.versions);
    Ok(Context { clients, format })
}

async fn run(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Commands::Complete(args) => return args.run(&mut Cli::command()),
        Commands::Configuration { command } => {
            let config = cli.global.resolve()?;
            return command.run(&cli.format, &config);
        }
        other => other,
    };

    let ctx = build_context(&cli.global, cli.format)?;
    match command {
        Commands::Server { command } => command.run(&ctx).await,
        Commands::Flavor { command } => command.run(&ctx).await,
        Commands::Keypair { command } => command.run(&ctx).await,
        Commands::Project { command } => command.run(&ctx).await,
        Commands::User { command } => command.run(&ctx).await,
        Commands::Role { command } => command.run(&ctx).await,
        Commands::Token { command } => command.run(&ctx).await,
        Commands::Network { command } => command.run(&ctx).await,
        Commands::Subnet { command } => command.run(&ctx).await,
        Commands::Port { command } => command.run(&ctx).await,
        Commands::Router { command } => command.run(&ctx).await,
        Commands::Security { command } => command.run(&ctx).await,
        Commands::Volume { command } => command.run(&ctx).await,
        Commands::Container { command } => command.run(&ctx).await,
        Commands::Object { command } => command.run(&ctx).await,
        Commands::Complete(_) | Commands::Configuration { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();
    install_crypto_provider();

    let debug = cli.debug;
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if debug {
                eprintln!("{e:?}");
            } else {
                eprintln!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test_case(&["openstack", "server", "list"], "warn")]
    #[test_case(&["openstack", "-v", "server", "list"], "info")]
    #[test_case(&["openstack", "-vv", "server", "list"], "debug")]
    #[test_case(&["openstack", "-q", "server", "list"], "error")]
    #[test_case(&["openstack", "--debug", "server", "list"], "debug")]
    fn test_log_level(argv: &[&str], expected: &str) {
        let cli = Cli::try_parse_from(argv).unwrap();
        assert_eq!(cli.log_level(), expected);
    }
}
