// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk: print queue clearing, USB port cycling and default-printer
// assignment.
//
// Entry point. Loads settings, initialises logging, wires the backend
// services and runs the requested command.

mod commands;
mod services;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Command;
use services::app_services::{AppServices, load_config};

#[derive(Debug, Parser)]
#[command(name = "spoolwerk", version, about = "Clear print queues, cycle USB ports and set the default printer")]
struct Cli {
    /// Settings file (defaults to the per-user data directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run against a built-in sample spooler instead of the system's.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Printer to act on (defaults to the first preferred printer installed).
    #[arg(short, long, global = true)]
    printer: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(services::data_dir::config_path);
    let loaded = load_config(&config_path);
    let config = match loaded {
        Ok(ref config) => config.clone(),
        Err(_) => Default::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.log_filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Spoolwerk starting");
    if let Err(e) = loaded {
        tracing::warn!(error = %e, path = %config_path.display(), "settings unusable, using defaults");
    }

    let services = AppServices::init(config, config_path, cli.dry_run);
    match commands::run(&services, cli.command, cli.printer).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}", state::render_error(&e));
            ExitCode::FAILURE
        }
    }
}
