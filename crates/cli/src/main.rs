use clap::{Parser, Subcommand};
use kalshi_bridge::Environment;
use kalshi_bridge_cli::commands::{self, CheckArgs, RunArgs};
use kalshi_bridge_cli::config::AppConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kalshi-bridge")]
#[command(about = "Run Kalshi REST operations with cached login and pagination", long_about = None)]
struct Cli {
    /// Extra config file, merged over config/Config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Target deployment (production or demo); overrides configuration
    #[arg(long, global = true)]
    environment: Option<Environment>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a file of operations and print their outputs as JSON
    Run(RunArgs),
    /// Log in and print the exchange status
    Check(CheckArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON output only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }

    match cli.command {
        Commands::Run(args) => commands::run_items(args, &config).await?,
        Commands::Check(args) => commands::run_check(args, &config).await?,
    }

    Ok(())
}
