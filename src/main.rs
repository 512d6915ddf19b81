// src/main.rs
//! User accounts server entry point
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use user_accounts::{accounts::AppConfig, server::AccountServer};

#[derive(Parser)]
#[command(name = "user-accounts")]
#[command(about = "User account service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to a TOML config file (falls back to CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the account server
    Server {
        /// Port to bind the server to
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;

    info!("Starting user-accounts v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("CONFIG_PATH").ok().map(PathBuf::from));
    let mut config = AppConfig::load(config_path.as_deref())?;

    if let Some(Commands::Server { port: Some(port) }) = args.command {
        config.server.port = port;
    }

    if config.accounts.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET is not set; refusing to start without a signing secret");
    }

    let server = AccountServer::from_config(&config)
        .await
        .context("Failed to initialize account server")?;

    info!("Starting server on port {}", server.port);
    server.start().await
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
