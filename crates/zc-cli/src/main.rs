use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zc_cli::commands::{chain, sign};
use zc_cli::config::Config;

/// Tamper-evident, signed log chain.
#[derive(Parser, Debug)]
#[command(name = "zc", author = "zc Contributors", version)]
struct Cli {
    /// TOML config file with `chain_path` and `key_file`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Chain document to operate on.
    #[arg(long, global = true)]
    chain: Option<PathBuf>,

    /// Keypair file used for signing.
    #[arg(long, global = true)]
    keys: Option<PathBuf>,

    /// Emit debug logs on stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 keypair.
    Keygen {
        /// Replace an existing keypair file.
        #[arg(long)]
        force: bool,
    },
    /// Sign a message and append it to the chain.
    Log {
        message: String,
    },
    /// Check a hex signature over a message.
    Verify {
        message: String,
        signature: String,
        /// Hex public key; defaults to the local keypair.
        #[arg(long)]
        pubkey: Option<String>,
    },
    /// Verify every hash and link in the chain.
    ChainVerify {
        /// Also check each entry's signature against its pubkey.
        #[arg(long)]
        signatures: bool,
    },
    /// Show chain statistics.
    ChainStats,
    /// Print the chain entries as JSON.
    ChainExport,
    /// Print chain entries in human-readable form.
    ChainShow {
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::resolve(cli.config.as_deref(), cli.chain, cli.keys)?;
    tracing::debug!(?config, "resolved configuration");

    match cli.command {
        Commands::Keygen { force } => sign::cmd_keygen(&config, force),
        Commands::Log { message } => sign::cmd_log(&config, &message),
        Commands::Verify {
            message,
            signature,
            pubkey,
        } => sign::cmd_verify(&config, &message, &signature, pubkey),
        Commands::ChainVerify { signatures } => chain::cmd_verify(&config, signatures),
        Commands::ChainStats => chain::cmd_stats(&config),
        Commands::ChainExport => chain::cmd_export(&config),
        Commands::ChainShow { offset, limit } => chain::cmd_show(&config, offset, limit),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
