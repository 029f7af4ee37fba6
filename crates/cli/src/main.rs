//! gcadapterctl - GameCube adapter tool
//!
//! Lists attached WUP-028 adapters, prints the virtual port descriptor,
//! monitors controller state per port and drives rumble through the effect
//! engine.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod config;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::CliConfig;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "gcadapterctl")]
#[command(about = "GameCube USB adapter tool - list adapters, monitor ports and test rumble")]
#[command(version)]
#[command(long_about = "
gcadapterctl talks to a Nintendo WUP-028 GameCube controller adapter.
The adapter's four ports are exposed as separate virtual controllers;
this tool shows what each of them reports and can rumble any of them.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML configuration file
    #[arg(long, global = true, env = "GCADAPTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached adapters
    List,

    /// Print the report descriptor given to every virtual port
    Descriptor,

    /// Print port connects, disconnects and controller state
    Monitor {
        /// Stop after this many reports
        #[arg(short, long)]
        count: Option<u64>,
    },

    /// Rumble one port
    Rumble {
        /// Port number as printed on the adapter (1-4)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
        port: u8,

        /// Length of one iteration; defaults to the configured duration
        #[arg(short, long)]
        duration_ms: Option<u32>,

        /// Number of back-to-back iterations
        #[arg(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(commands::rumble::MAX_ITERATIONS))
        )]
        iterations: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "gcadapterctl={level},gcadapter_engine={level},gcadapter_ffb={level},gcadapter_hid_common={level}",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let load = || CliConfig::load(cli.config.as_deref());

    match &cli.command {
        Commands::List => commands::list::execute(&load()?, cli.json)?,
        Commands::Descriptor => commands::descriptor::execute(cli.json),
        Commands::Monitor { count } => commands::monitor::execute(&load()?, *count, cli.json)?,
        Commands::Rumble {
            port,
            duration_ms,
            iterations,
        } => commands::rumble::execute(&load()?, *port, *duration_ms, *iterations, cli.json)?,
    }
    Ok(())
}
