//! usermirror CLI - username service mirrored across two MariaDB stores
//!
//! Subcommands:
//! - `serve`: run the HTTP service (register, list, clear, greeting)
//! - `check`: ping both stores
//! - `config`: print or validate the config file

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "usermirror",
    author,
    version,
    about = "Username service mirrored across a local and a peer store",
    long_about = "Applies every register/clear to two independent MariaDB stores and \
                  reports which store failed when they diverge. Reads come from the local store."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Check connectivity to both stores
    Check(commands::check::CheckArgs),
    /// Print or validate configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await,
        Commands::Check(args) => commands::check::run_check(args).await,
        Commands::Config(args) => commands::config::run_config(args),
    }
}
