//! voucherkit CLI - Main Entry Point
//!
//! Tooling around the voucher app's end-to-end suites: duplicate step
//! definition cleanup, sequential suite runs with a summary, and Playwright
//! storage-state fixtures.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::{auth, contract, run, steps, Context};
use voucherkit_common::{VoucherkitConfig, DEFAULT_CONFIG_FILE};

/// voucherkit - end-to-end suite tooling
#[derive(Parser)]
#[command(name = "vkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file
    #[arg(long, env = "VOUCHERKIT_CONFIG", default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find and fix duplicate step definitions
    #[command(subcommand)]
    Steps(steps::StepsCommands),

    /// Run spec files one at a time and summarize
    Run(run::RunArgs),

    /// Write Playwright storage-state fixtures
    AuthState(auth::AuthStateArgs),

    /// Show the routes, storage keys and statuses the suites rely on
    Contract(contract::ContractArgs),
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = VoucherkitConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let ctx = Context {
        config,
        format: cli.format,
    };

    match cli.command {
        Commands::Steps(cmd) => steps::execute(cmd, &ctx),
        Commands::Run(args) => run::execute(args, &ctx).await,
        Commands::AuthState(args) => auth::execute(args, &ctx),
        Commands::Contract(args) => contract::execute(args, &ctx),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            2
        }
    };
    std::process::exit(code);
}
