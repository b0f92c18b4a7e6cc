//! Zapway Audit CLI
//!
//! Verify a single round from the command line, print a seed commitment,
//! or serve the verification API.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use zapway_audit::{
    api::ApiServer,
    config::{generate_sample_config, AuditConfig, ConfigLoader},
    errors::AuditResult,
    games::{compute_commitment_hash, GameType, SeedConfiguration, Sha512Hasher, VerificationSession},
};

#[derive(Parser, Debug)]
#[command(name = "zapway-audit")]
#[command(about = "Provably-fair round verifier", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-derive one round's outcome from its seeds
    Verify {
        /// Revealed server seed
        #[arg(long)]
        server_seed: String,

        #[arg(long)]
        client_seed: String,

        #[arg(long)]
        nonce: u64,

        /// First stream position consumed by the round
        #[arg(long, default_value = "0")]
        cursor: u64,

        /// dice, float, plinko or mines
        #[arg(long)]
        game: GameType,

        /// Plinko rows (8, 10, 12, 14 or 16)
        #[arg(long)]
        rows: Option<u32>,

        /// Number of mines (1-24)
        #[arg(long)]
        count: Option<u32>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the SHA-512 commitment of a server seed
    Commit {
        #[arg(long)]
        server_seed: String,
    },

    /// Run the HTTP verification API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Write a configuration file populated with defaults
    InitConfig {
        path: String,
    },
}

fn load_config(path: Option<&str>) -> AuditResult<AuditConfig> {
    match path {
        Some(path) => ConfigLoader::new().with_path(path).load(),
        None => ConfigLoader::new().load(),
    }
}

fn init_tracing(config: &AuditConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        generate_sample_config(path)?;
        println!("Wrote default configuration to {}", path);
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Command::Verify { server_seed, client_seed, nonce, cursor, game, rows, count, json } => {
            // One-shot runs skip the console pacing delay
            config.engine.pacing_delay_ms = 0;
            let session = VerificationSession::with_hasher(
                SeedConfiguration::new(server_seed, client_seed, nonce, cursor),
                Arc::new(Sha512Hasher),
                config.engine,
            );
            let report = session.run_with_params(game, rows, count).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.display);
                println!("Commitment:  {}", report.commitment_hash);
                println!("Cursor:      {} -> {}", report.start_cursor, report.next_cursor);
            }
        }
        Command::Commit { server_seed } => {
            println!("{}", compute_commitment_hash(&Sha512Hasher, &server_seed)?);
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }
            ApiServer::new(config).run().await?;
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}
