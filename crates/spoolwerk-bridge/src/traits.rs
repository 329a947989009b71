// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the print spooler and the
// serial-port map.
//
// Every call returns the raw `OsError` unclassified; mapping to user-facing
// kinds is the queue controller's job. Nothing here retries.

use spoolwerk_core::error::OsError;
use spoolwerk_core::types::{JobId, QueuedJob, SerialPortEntry};

pub type OsResult<T> = std::result::Result<T, OsError>;

/// Unified bridge that groups the spooler and the serial-port map.
pub trait PlatformBridge: SpoolerGateway + SerialPortRegistry {
    /// Human-readable platform name (e.g. "Windows (Win32 spooler)").
    fn platform_name(&self) -> &str;
}

/// The operating system's print spooler.
pub trait SpoolerGateway: Send + Sync {
    /// Open a printer by name. The returned queue closes its OS handle on drop.
    fn open_printer(&self, name: &str) -> OsResult<Box<dyn PrinterQueue + '_>>;

    /// Port the printer is currently bound to.
    fn printer_port(&self, name: &str) -> OsResult<String>;

    /// Rebind the printer to another port.
    fn set_printer_port(&self, name: &str, port: &str) -> OsResult<()>;

    /// Name of the system default printer.
    fn default_printer(&self) -> OsResult<String>;

    /// Make `name` the system default. `Ok(false)` if the OS refused the change
    /// for any reason other than access being denied.
    fn set_default_printer(&self, name: &str) -> OsResult<bool>;

    /// Local and connected printers, in the order the OS enumerates them.
    fn printers(&self) -> OsResult<Vec<String>>;
}

/// An open printer handle, scoped to a single operation.
pub trait PrinterQueue {
    /// Pending jobs, in the order the spooler reports them.
    fn jobs(&self) -> OsResult<Vec<QueuedJob>>;

    fn delete_job(&self, id: JobId) -> OsResult<()>;
}

/// Read-only view of the machine's serial-port map.
pub trait SerialPortRegistry: Send + Sync {
    fn serial_ports(&self) -> OsResult<Vec<SerialPortEntry>>;
}
