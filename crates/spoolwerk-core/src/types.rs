// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Spoolwerk spooler tool.

use chrono::{DateTime, Utc};

use crate::error::SpoolwerkError;

/// Spooler-assigned identifier of a print job, scoped to one printer's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job sitting in a printer's queue, as reported by the spooler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    pub id: JobId,
    /// Document title, if the submitting application set one.
    pub document: Option<String>,
    /// Account that submitted the job.
    pub user: Option<String>,
}

impl QueuedJob {
    pub fn new(id: u32) -> Self {
        Self {
            id: JobId(id),
            document: None,
            user: None,
        }
    }
}

/// One entry of the machine's serial-port map.
///
/// `device` is the kernel device path (e.g. `\Device\USBSER000`), `port` the
/// name a printer can be bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortEntry {
    pub device: String,
    pub port: String,
}

impl SerialPortEntry {
    pub fn new(device: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            port: port.into(),
        }
    }

    /// Whether either side of the entry carries `tag` (e.g. "USB").
    pub fn is_tagged(&self, tag: &str) -> bool {
        self.device.contains(tag) || self.port.contains(tag)
    }
}

/// Snapshot shown in the status panel. Re-fetched after every action.
#[derive(Debug, Clone)]
pub struct PrinterStatus {
    pub name: String,
    pub queue_depth: usize,
    /// `None` if the port could not be read.
    pub port: Option<String>,
    pub is_default: bool,
    pub refreshed_at: DateTime<Utc>,
}

/// Outcome of clearing a printer's queue.
#[derive(Debug)]
pub struct ClearReport {
    pub printer: String,
    /// Jobs the spooler accepted a delete for.
    pub deleted: usize,
    /// First permission failure, or the last generic one.
    pub failure: Option<SpoolwerkError>,
}

impl ClearReport {
    pub fn new(printer: impl Into<String>) -> Self {
        Self {
            printer: printer.into(),
            deleted: 0,
            failure: None,
        }
    }

    pub fn failed(printer: impl Into<String>, err: SpoolwerkError) -> Self {
        Self {
            printer: printer.into(),
            deleted: 0,
            failure: Some(err),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failure.is_none()
    }

    /// Error message, empty when every delete went through.
    pub fn message(&self) -> String {
        self.failure
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Outcome of moving a printer to the next USB port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCycle {
    Switched { from: String, to: String },
    /// The printer already sits on the only available port.
    Unchanged { port: String },
}

impl PortCycle {
    pub fn is_switched(&self) -> bool {
        matches!(self, Self::Switched { .. })
    }
}

impl std::fmt::Display for PortCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switched { from, to } => write!(f, "{from} -> {to}"),
            Self::Unchanged { port } => write!(f, "no new port (still on {port})"),
        }
    }
}

/// The success/message pair a front end displays after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    pub message: String,
}

impl Verdict {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<&SpoolwerkError> for Verdict {
    fn from(err: &SpoolwerkError) -> Self {
        Self::failed(err.to_string())
    }
}

impl From<&ClearReport> for Verdict {
    fn from(report: &ClearReport) -> Self {
        match report.failure {
            None => Self::ok(format!(
                "cleared {} job(s) from {}",
                report.deleted, report.printer
            )),
            Some(ref err) => Self::failed(format!(
                "cleared {} job(s) from {} before stopping: {err}",
                report.deleted, report.printer
            )),
        }
    }
}

impl From<&PortCycle> for Verdict {
    fn from(cycle: &PortCycle) -> Self {
        Self {
            success: cycle.is_switched(),
            message: cycle.to_string(),
        }
    }
}
