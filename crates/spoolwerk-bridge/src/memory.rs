// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory spooler.
//
// Behaves like a small local spooler: printers with a port and a job list, a
// default printer and a serial-port map. Failures can be injected per
// operation (or per job for deletes) so the controller's error paths can be
// exercised deterministically. Also backs the CLI's `--dry-run` mode.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use spoolwerk_core::error::OsError;
use spoolwerk_core::types::{JobId, QueuedJob, SerialPortEntry};
use tracing::debug;

use crate::traits::*;

/// Spooler calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    ListJobs,
    DeleteJob,
    ReadPort,
    WritePort,
    ReadDefault,
    WriteDefault,
    ListPrinters,
    ReadSerialPorts,
}

#[derive(Debug, Default)]
struct MemoryPrinter {
    port: String,
    jobs: Vec<QueuedJob>,
}

#[derive(Debug, Default)]
struct SpoolerState {
    printers: BTreeMap<String, MemoryPrinter>,
    /// Installation order, which is the order `printers()` reports.
    installed: Vec<String>,
    default: Option<String>,
    serial_ports: Vec<SerialPortEntry>,
    faults: HashMap<Operation, OsError>,
    job_faults: HashMap<JobId, OsError>,
    reject_default: bool,
    next_job: u32,
    mutations: usize,
    open_handles: usize,
}

/// Spooler held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemorySpooler {
    state: Mutex<SpoolerState>,
}

impl MemorySpooler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small shop setup: two receipt printers on USB and an office laser.
    pub fn sample() -> Self {
        Self::new()
            .with_printer("IMP1", "USB5", &[101, 102, 103])
            .with_printer("XP-80C", "USB3", &[])
            .with_printer("Office Laser", "IP_192.168.1.40", &[7])
            .with_default("Office Laser")
            .with_serial_port(r"\Device\USBSER000", "USB3")
            .with_serial_port(r"\Device\USBSER001", "USB5")
            .with_serial_port(r"\Device\USBSER002", "USB7")
            .with_serial_port(r"\Device\Serial0", "COM1")
    }

    // -- Builder -------------------------------------------------------------

    pub fn with_printer(
        mut self,
        name: &str,
        port: &str,
        jobs: &[u32],
    ) -> Self {
        let state = self.state_mut();
        let jobs: Vec<QueuedJob> = jobs.iter().copied().map(QueuedJob::new).collect();
        if let Some(highest) = jobs.iter().map(|j| j.id.0).max() {
            state.next_job = state.next_job.max(highest);
        }
        let previous = state.printers.insert(
            name.to_string(),
            MemoryPrinter {
                port: port.to_string(),
                jobs,
            },
        );
        if previous.is_none() {
            state.installed.push(name.to_string());
        }
        self
    }

    pub fn with_default(mut self, name: &str) -> Self {
        self.state_mut().default = Some(name.to_string());
        self
    }

    pub fn with_serial_port(mut self, device: &str, port: &str) -> Self {
        self.state_mut()
            .serial_ports
            .push(SerialPortEntry::new(device, port));
        self
    }

    // -- Fault injection -----------------------------------------------------

    /// Make every future call of `op` fail with `err`.
    pub fn fail(&self, op: Operation, err: OsError) {
        self.lock().faults.insert(op, err);
    }

    /// Make deleting one specific job fail with `err`.
    pub fn fail_delete_of(&self, id: u32, err: OsError) {
        self.lock().job_faults.insert(JobId(id), err);
    }

    /// Make `set_default_printer` report a refusal without an error code.
    pub fn reject_default_changes(&self) {
        self.lock().reject_default = true;
    }

    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.faults.clear();
        state.job_faults.clear();
        state.reject_default = false;
    }

    // -- Inspection ----------------------------------------------------------

    /// Queue a new job on `printer`, as an application printing would.
    pub fn submit(&self, printer: &str, document: &str) -> Option<JobId> {
        let mut state = self.lock();
        state.next_job += 1;
        let id = JobId(state.next_job);
        let queue = state.printers.get_mut(printer)?;
        queue.jobs.push(QueuedJob {
            id,
            document: Some(document.to_string()),
            user: None,
        });
        Some(id)
    }

    pub fn job_ids(&self, printer: &str) -> Vec<u32> {
        self.lock()
            .printers
            .get(printer)
            .map(|p| p.jobs.iter().map(|j| j.id.0).collect())
            .unwrap_or_default()
    }

    pub fn port_of(&self, printer: &str) -> Option<String> {
        self.lock().printers.get(printer).map(|p| p.port.clone())
    }

    pub fn current_default(&self) -> Option<String> {
        self.lock().default.clone()
    }

    /// Number of state-changing calls that went through.
    pub fn mutations(&self) -> usize {
        self.lock().mutations
    }

    /// Printer handles opened but not yet closed.
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    // -- Internals -----------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, SpoolerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut SpoolerState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SpoolerState {
    fn check(&self, op: Operation) -> OsResult<()> {
        match self.faults.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn printer(&self, name: &str) -> OsResult<&MemoryPrinter> {
        self.printers
            .get(name)
            .ok_or_else(OsError::invalid_printer_name)
    }

    fn printer_mut(&mut self, name: &str) -> OsResult<&mut MemoryPrinter> {
        self.printers
            .get_mut(name)
            .ok_or_else(OsError::invalid_printer_name)
    }
}

impl PlatformBridge for MemorySpooler {
    fn platform_name(&self) -> &str {
        "In-memory spooler"
    }
}

impl SpoolerGateway for MemorySpooler {
    fn open_printer(&self, name: &str) -> OsResult<Box<dyn PrinterQueue + '_>> {
        let mut state = self.lock();
        state.check(Operation::Open)?;
        state.printer(name)?;
        state.open_handles += 1;
        debug!(printer = name, "memory spooler: printer opened");
        Ok(Box::new(MemoryQueue {
            spooler: self,
            name: name.to_string(),
        }))
    }

    fn printer_port(&self, name: &str) -> OsResult<String> {
        let state = self.lock();
        state.check(Operation::ReadPort)?;
        Ok(state.printer(name)?.port.clone())
    }

    fn set_printer_port(&self, name: &str, port: &str) -> OsResult<()> {
        let mut state = self.lock();
        state.check(Operation::WritePort)?;
        state.printer_mut(name)?.port = port.to_string();
        state.mutations += 1;
        Ok(())
    }

    fn default_printer(&self) -> OsResult<String> {
        let state = self.lock();
        state.check(Operation::ReadDefault)?;
        state
            .default
            .clone()
            .ok_or_else(|| OsError::new(OsError::INVALID_PRINTER_NAME, "No default printer is set."))
    }

    fn set_default_printer(&self, name: &str) -> OsResult<bool> {
        let mut state = self.lock();
        state.check(Operation::WriteDefault)?;
        if state.reject_default || !state.printers.contains_key(name) {
            return Ok(false);
        }
        state.default = Some(name.to_string());
        state.mutations += 1;
        Ok(true)
    }

    fn printers(&self) -> OsResult<Vec<String>> {
        let state = self.lock();
        state.check(Operation::ListPrinters)?;
        Ok(state.installed.clone())
    }
}

impl SerialPortRegistry for MemorySpooler {
    fn serial_ports(&self) -> OsResult<Vec<SerialPortEntry>> {
        let state = self.lock();
        state.check(Operation::ReadSerialPorts)?;
        Ok(state.serial_ports.clone())
    }
}

/// Open handle on one in-memory printer.
struct MemoryQueue<'a> {
    spooler: &'a MemorySpooler,
    name: String,
}

impl PrinterQueue for MemoryQueue<'_> {
    fn jobs(&self) -> OsResult<Vec<QueuedJob>> {
        let state = self.spooler.lock();
        state.check(Operation::ListJobs)?;
        Ok(state.printer(&self.name)?.jobs.clone())
    }

    fn delete_job(&self, id: JobId) -> OsResult<()> {
        let mut state = self.spooler.lock();
        state.check(Operation::DeleteJob)?;
        if let Some(err) = state.job_faults.get(&id) {
            return Err(err.clone());
        }
        let printer = state.printer_mut(&self.name)?;
        let before = printer.jobs.len();
        printer.jobs.retain(|j| j.id != id);
        if printer.jobs.len() == before {
            return Err(OsError::new(87, "The parameter is incorrect."));
        }
        state.mutations += 1;
        Ok(())
    }
}

impl Drop for MemoryQueue<'_> {
    fn drop(&mut self) {
        let mut state = self.spooler.lock();
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_unknown_printer_is_invalid_name() {
        let spooler = MemorySpooler::new();
        let err = spooler.open_printer("Ghost").err().expect("should fail");
        assert_eq!(err.code, OsError::INVALID_PRINTER_NAME);
        assert_eq!(spooler.open_handles(), 0);
    }

    #[test]
    fn handle_is_released_on_drop() {
        let spooler = MemorySpooler::new().with_printer("IMP1", "USB3", &[1, 2]);
        {
            let queue = spooler.open_printer("IMP1").expect("open");
            assert_eq!(queue.jobs().expect("jobs").len(), 2);
            assert_eq!(spooler.open_handles(), 1);
        }
        assert_eq!(spooler.open_handles(), 0);
    }

    #[test]
    fn submitted_jobs_get_fresh_ids() {
        let spooler = MemorySpooler::new().with_printer("IMP1", "USB3", &[41]);
        let id = spooler.submit("IMP1", "receipt").expect("printer exists");
        assert_eq!(id, JobId(42));
        assert_eq!(spooler.job_ids("IMP1"), vec![41, 42]);
        assert!(spooler.submit("Ghost", "receipt").is_none());
    }

    #[test]
    fn injected_fault_applies_until_cleared() {
        let spooler = MemorySpooler::new().with_printer("IMP1", "USB3", &[]);
        spooler.fail(Operation::ReadPort, OsError::access_denied());
        assert!(spooler.printer_port("IMP1").is_err());
        spooler.clear_faults();
        assert_eq!(spooler.printer_port("IMP1").expect("port"), "USB3");
    }

    #[test]
    fn printers_are_listed_in_installation_order() {
        let spooler = MemorySpooler::new()
            .with_printer("XP-80C", "USB5", &[])
            .with_printer("IMP1", "USB3", &[])
            .with_printer("XP-80C", "USB7", &[1]);
        assert_eq!(spooler.printers().expect("printers"), vec!["XP-80C", "IMP1"]);
        assert_eq!(spooler.port_of("XP-80C").as_deref(), Some("USB7"));
    }

    #[test]
    fn refused_default_change_leaves_state_untouched() {
        let spooler = MemorySpooler::new()
            .with_printer("IMP1", "USB3", &[])
            .with_printer("XP-80C", "USB5", &[])
            .with_default("IMP1");
        spooler.reject_default_changes();
        assert!(!spooler.set_default_printer("XP-80C").expect("no os error"));
        assert_eq!(spooler.current_default().as_deref(), Some("IMP1"));
        assert_eq!(spooler.mutations(), 0);
    }
}
