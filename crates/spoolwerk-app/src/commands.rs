// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command handlers. Each returns whether the command succeeded, so `main`
// can pick the exit code.

use clap::Subcommand;
use spoolwerk_core::error::{Result, SpoolwerkError};
use spoolwerk_print::QueueAction;
use tracing::{error, info};

use crate::services::app_services::AppServices;
use crate::state::PanelState;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List installed printers, marking the default.
    Printers,
    /// Show queue depth, port and default flag for the printer.
    Status,
    /// List pending jobs.
    Jobs,
    /// Delete every pending job.
    Clear,
    /// Move the printer to the next USB port.
    CyclePort,
    /// Make the printer the system default.
    SetDefault,
    /// Show the settings file; `--write` saves the current settings to it.
    Config {
        #[arg(long)]
        write: bool,
    },
}

pub async fn run(services: &AppServices, command: Command, printer: Option<String>) -> Result<bool> {
    match command {
        Command::Status => run_action(services, QueueAction::Refresh, printer).await,
        Command::Clear => run_action(services, QueueAction::Clear, printer).await,
        Command::CyclePort => run_action(services, QueueAction::CyclePort, printer).await,
        Command::SetDefault => run_action(services, QueueAction::SetDefault, printer).await,
        Command::Printers => list_printers(services),
        Command::Jobs => {
            let printer = services.select_printer(printer)?;
            list_jobs(services, &printer)
        }
        Command::Config { write } => show_config(services, write),
    }
}

/// Dispatch one action to the worker and wait for it, then show the panel.
async fn run_action(
    services: &AppServices,
    action: QueueAction,
    printer: Option<String>,
) -> Result<bool> {
    let printer = services.select_printer(printer)?;
    let handle = services.dispatcher().dispatch(action, printer)?;
    let outcome = handle.await.map_err(|e| {
        error!(error = %e, action = action.label(), "worker failed");
        SpoolwerkError::OperationFailed(format!("{} did not finish", action.label()))
    })?;

    let success = outcome.verdict.success;
    let panel = if outcome.action == QueueAction::Refresh && success {
        PanelState::new(outcome.status)
    } else {
        PanelState::new(outcome.status).with_verdict(outcome.verdict)
    };
    print!("{}", panel.render());
    Ok(success)
}

fn list_printers(services: &AppServices) -> Result<bool> {
    let controller = services.controller();
    let mut printers = controller.printers()?;
    printers.sort();
    let default = controller.default_printer().ok();
    for name in &printers {
        let mark = if default.as_deref() == Some(name.as_str()) { "*" } else { " " };
        println!("{mark} {name}");
    }
    info!(count = printers.len(), "printers listed");
    Ok(true)
}

fn list_jobs(services: &AppServices, printer: &str) -> Result<bool> {
    let jobs = services.controller().jobs(printer)?;
    if jobs.is_empty() {
        println!("{printer}: no pending jobs");
    }
    for job in &jobs {
        println!(
            "{:>8}  {:<16}  {}",
            job.id,
            job.user.as_deref().unwrap_or("-"),
            job.document.as_deref().unwrap_or("(untitled)")
        );
    }
    Ok(true)
}

fn show_config(services: &AppServices, write: bool) -> Result<bool> {
    if write {
        services.save_config()?;
        info!(path = %services.config_path().display(), "settings saved");
    }
    println!("# {}", services.config_path().display());
    println!("{}", serde_json::to_string_pretty(services.config())?);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoolwerk_core::AppConfig;
    use std::path::PathBuf;

    fn dry_run() -> AppServices {
        AppServices::init(AppConfig::default(), PathBuf::from("unused.json"), true)
    }

    #[tokio::test]
    async fn clear_on_sample_spooler_succeeds() {
        let services = dry_run();
        assert!(run(&services, Command::Clear, None).await.expect("run"));
        assert_eq!(services.controller().queue_depth("IMP1"), 0);
    }

    #[tokio::test]
    async fn set_default_on_unknown_printer_fails() {
        let services = dry_run();
        let ok = run(&services, Command::SetDefault, Some("Ghost".into()))
            .await
            .expect("run");
        assert!(!ok);
    }

    #[tokio::test]
    async fn status_of_unknown_printer_fails() {
        let services = dry_run();
        assert!(!run(&services, Command::Status, Some("Ghost".into())).await.expect("run"));
        assert!(run(&services, Command::Status, Some("IMP1".into())).await.expect("run"));
    }

    #[tokio::test]
    async fn jobs_for_unknown_printer_is_not_found() {
        let services = dry_run();
        let err = run(&services, Command::Jobs, Some("Ghost".into()))
            .await
            .expect_err("unknown printer");
        assert!(matches!(err, SpoolwerkError::NotFound(_)));
    }
}
