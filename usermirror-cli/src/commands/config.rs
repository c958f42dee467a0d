//! Config subcommands

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{MirrorConfig, EXAMPLE_CONFIG};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print an example config file
    Example,
    /// Load and validate a config file
    Validate {
        /// Config file (default: $USERMIRROR_CONFIG or ~/.usermirror/config.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Example => {
            print!("{}", EXAMPLE_CONFIG);
        }
        ConfigCommand::Validate { config } => {
            let loaded = MirrorConfig::load(config.as_deref())?;
            println!(
                "config ok: local {}:{}, peer {}:{}, policy {}",
                loaded.local.host,
                loaded.local.port,
                loaded.peer.host,
                loaded.peer.port,
                loaded.coordinator.policy
            );
        }
    }
    Ok(())
}
