//! # guardian-cli
//!
//! Command-line admin interface for a federation guardian — wires settings,
//! the client, and one subcommand per remote operation.

#![deny(unsafe_code)]

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use guardian_client::GuardianClient;

/// Federation guardian admin client.
#[derive(Parser, Debug)]
#[command(name = "guardian", about = "Admin client for a federation guardian")]
struct Cli {
    /// WebSocket URL of the guardian API (overrides settings).
    #[arg(long)]
    url: Option<String>,

    /// Admin password (overrides settings).
    #[arg(long, env = "GUARDIAN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the server lifecycle status.
    Status,
    /// Show core and module API versions.
    Version,
    /// Print the federation invite code.
    InviteCode,
    /// Fetch the client-facing federation config.
    Config,
    /// Run a balance-sheet audit.
    Audit,
    /// Show federation-wide status as seen by this guardian.
    FederationStatus,
    /// Show per-module configuration.
    ModulesConfig,
    /// Print the current block count from the wallet module.
    BlockCount,
    /// Verify a password against the server without changing anything.
    TestPassword {
        /// Candidate password.
        password: String,
    },
    /// Set the admin password on a fresh server.
    SetPassword {
        /// New admin password.
        password: String,
    },
    /// Register this guardian's name and, for followers, the leader URL.
    SetConnections {
        /// Display name of this guardian.
        #[arg(long)]
        name: String,
        /// API URL of the leader; omit when this guardian is the leader.
        #[arg(long)]
        leader_url: Option<String>,
    },
    /// Run distributed key generation.
    RunDkg,
    /// Fetch per-peer config hashes for cross-verification.
    VerifyHashes,
    /// Mark peer configs as verified.
    VerifiedConfigs,
    /// Start consensus and wait until the server confirms it is running.
    StartConsensus,
    /// Reset the setup process on the server.
    RestartSetup,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = guardian_settings::load_settings().context("failed to load settings")?;
    if let Some(url) = cli.url {
        settings.api.url = Some(url);
    }
    if let Some(password) = cli.password {
        settings.auth.password = Some(password);
    }
    let _ = guardian_settings::init_settings(settings);

    let client = GuardianClient::new(guardian_settings::get_settings());
    let outcome = run(&client, cli.command).await;
    let _ = client.shutdown().await;
    outcome
}

async fn run(client: &GuardianClient, command: Command) -> Result<()> {
    match command {
        Command::Status => print_json(&client.status().await?),
        Command::Version => print_json(&client.version().await?),
        Command::InviteCode => {
            println!("{}", client.invite_code().await?);
            Ok(())
        }
        Command::Config => print_json(&client.config().await?),
        Command::Audit => print_json(&client.audit().await?),
        Command::FederationStatus => print_json(&client.federation_status().await?),
        Command::ModulesConfig => print_json(&client.modules_config().await?),
        Command::BlockCount => {
            let config = client.config().await?;
            println!("{}", client.fetch_block_count(&config).await?);
            Ok(())
        }
        Command::TestPassword { password } => {
            if client.test_credential(password).await {
                println!("password accepted");
                Ok(())
            } else {
                bail!("password rejected");
            }
        }
        Command::SetPassword { password } => {
            client.set_password(password).await?;
            println!("password set");
            Ok(())
        }
        Command::SetConnections { name, leader_url } => {
            client.set_config_gen_connections(name, leader_url).await?;
            println!("connections registered");
            Ok(())
        }
        Command::RunDkg => {
            client.run_dkg().await?;
            println!("dkg complete");
            Ok(())
        }
        Command::VerifyHashes => print_json(&client.get_verify_config_hash().await?),
        Command::VerifiedConfigs => {
            client.verified_configs().await?;
            println!("configs marked verified");
            Ok(())
        }
        Command::StartConsensus => {
            client.start_consensus().await?;
            println!("consensus running");
            Ok(())
        }
        Command::RestartSetup => {
            client.restart_setup().await?;
            println!("setup restarted");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
