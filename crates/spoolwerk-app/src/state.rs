// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status panel state and its text rendering.

use std::fmt::Write as _;

use spoolwerk_core::human_errors::{Severity, humanize_error};
use spoolwerk_core::types::{PrinterStatus, Verdict};
use spoolwerk_core::SpoolwerkError;

/// What the panel shows for the selected printer.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub status: Option<PrinterStatus>,
    /// Result of the last action, if any.
    pub last_verdict: Option<Verdict>,
}

impl PanelState {
    pub fn new(status: PrinterStatus) -> Self {
        Self {
            status: Some(status),
            last_verdict: None,
        }
    }

    pub fn with_verdict(mut self, verdict: Verdict) -> Self {
        self.last_verdict = Some(verdict);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(ref verdict) = self.last_verdict {
            let mark = if verdict.success { "ok" } else { "failed" };
            let _ = writeln!(out, "[{mark}] {}", verdict.message);
        }
        if let Some(ref status) = self.status {
            let _ = writeln!(out, "Printer:  {}", status.name);
            let _ = writeln!(out, "Jobs:     {}", status.queue_depth);
            let _ = writeln!(
                out,
                "Port:     {}",
                status.port.as_deref().unwrap_or("unknown")
            );
            let _ = writeln!(
                out,
                "Default:  {}",
                if status.is_default { "yes" } else { "no" }
            );
            let _ = writeln!(
                out,
                "Updated:  {}",
                status.refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        out
    }
}

/// Operator-facing text for an error that ended a command.
pub fn render_error(err: &SpoolwerkError) -> String {
    let human = humanize_error(err);
    let label = match human.severity {
        Severity::Transient => "Problem",
        Severity::ActionRequired => "Action needed",
        Severity::Permanent => "Not possible",
    };
    format!("{label}: {}\n{}", human.message, human.suggestion)
}
