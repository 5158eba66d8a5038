mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, identity::IdentitySubcommand, profile::ProfileSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "grantctl",
    about = "Research-grant gateway: run grant operations against the ledger as an enrolled identity",
    version,
    propagate_version = true
)]
struct Cli {
    /// Gateway root holding gateway.yaml, profiles/ and wallet/ (default: auto-detect)
    #[arg(long, global = true, env = "GRANT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Channel name (overrides gateway.yaml)
    #[arg(long, global = true, env = "CHANNEL_NAME")]
    channel: Option<String>,

    /// Chaincode name (overrides gateway.yaml)
    #[arg(long, global = true, env = "CHAINCODE_NAME")]
    chaincode: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides gateway.yaml; 0 = OS-assigned)
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Perform one grant operation, e.g. '{"operation":"ReadGrant","grant_id":"g-1"}'
    Invoke {
        /// Organization acting (Grantor, Awardee, Auditor, Subawardee)
        #[arg(long)]
        org: String,
        /// Enrolled identity to act as
        #[arg(long)]
        user: String,
        /// Operation as JSON
        operation: String,
    },

    /// List the MSP ids joined to the configured channel
    MspIds {
        #[arg(long)]
        org: String,
        #[arg(long)]
        user: String,
    },

    /// Inspect organization wallets
    Identity {
        #[command(subcommand)]
        subcommand: IdentitySubcommand,
    },

    /// Inspect connection profiles
    Profile {
        #[command(subcommand)]
        subcommand: ProfileSubcommand,
    },

    /// Show or validate gateway.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let overrides = cmd::Overrides {
        channel: cli.channel,
        chaincode: cli.chaincode,
    };

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(&root, &overrides, port),
        Commands::Invoke {
            org,
            user,
            operation,
        } => cmd::invoke::run(&root, &overrides, &org, &user, &operation, cli.json),
        Commands::MspIds { org, user } => {
            cmd::msp_ids::run(&root, &overrides, &org, &user, cli.json)
        }
        Commands::Identity { subcommand } => {
            cmd::identity::run(&root, &overrides, subcommand, cli.json)
        }
        Commands::Profile { subcommand } => {
            cmd::profile::run(&root, &overrides, subcommand, cli.json)
        }
        Commands::Config { subcommand } => {
            cmd::config::run(&root, &overrides, subcommand, cli.json)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
