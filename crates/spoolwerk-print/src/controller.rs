// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue controller.
//
// Orchestrates spooler bridge calls into the operator's verbs: queue depth,
// clear queue, cycle USB port and assign default printer. Every verb fetches
// fresh state from the spooler and keeps no handle beyond its own call. Raw
// OS errors are classified here; access-denied from any call becomes
// `PermissionDenied`.

use std::sync::Arc;

use chrono::Utc;
use spoolwerk_bridge::PlatformBridge;
use spoolwerk_core::error::{Result, SpoolwerkError};
use spoolwerk_core::types::{ClearReport, PortCycle, PrinterStatus, QueuedJob};
use tracing::{debug, info, instrument, warn};

use crate::ports;

/// Entry point for all queue and printer operations.
///
/// Cheap to clone; clones share the same bridge.
#[derive(Clone)]
pub struct QueueController {
    bridge: Arc<dyn PlatformBridge>,
    usb_tag: String,
}

impl QueueController {
    pub fn new(bridge: Arc<dyn PlatformBridge>) -> Self {
        Self {
            bridge,
            usb_tag: "USB".into(),
        }
    }

    /// Use a different marker for USB-attached serial ports.
    pub fn with_usb_tag(mut self, tag: impl Into<String>) -> Self {
        self.usb_tag = tag.into();
        self
    }

    pub fn platform_name(&self) -> &str {
        self.bridge.platform_name()
    }

    // -- Printers ------------------------------------------------------------

    /// Local and connected printers, in the spooler's enumeration order.
    pub fn printers(&self) -> Result<Vec<String>> {
        self.bridge
            .printers()
            .map_err(|e| e.classify("local machine", "listing printers"))
    }

    /// The system default printer. A machine without one yields
    /// `NoDefaultPrinter`.
    pub fn default_printer(&self) -> Result<String> {
        self.bridge
            .default_printer()
            .map_err(|e| match e.classify("local machine", "reading the default printer") {
                SpoolwerkError::NotFound(_) => SpoolwerkError::NoDefaultPrinter,
                other => other,
            })
    }

    /// Pending jobs on `printer`, in spooler order.
    #[instrument(skip(self))]
    pub fn jobs(&self, printer: &str) -> Result<Vec<QueuedJob>> {
        let queue = self
            .bridge
            .open_printer(printer)
            .map_err(|e| e.classify(printer, "opening printer"))?;
        queue.jobs().map_err(|e| e.classify(printer, "listing jobs"))
    }

    // -- Queue depth ---------------------------------------------------------

    /// Number of pending jobs on `printer`.
    pub fn try_queue_depth(&self, printer: &str) -> Result<usize> {
        let depth = self.jobs(printer)?.len();
        debug!(printer, depth, "queue depth read");
        Ok(depth)
    }

    /// Like [`Self::try_queue_depth`], but any failure reads as an empty queue.
    pub fn queue_depth(&self, printer: &str) -> usize {
        self.try_queue_depth(printer).unwrap_or_else(|err| {
            warn!(printer, error = %err, "queue depth unavailable, reporting 0");
            0
        })
    }

    // -- Clear ---------------------------------------------------------------

    /// Delete every pending job on `printer`.
    ///
    /// An empty name means the system default printer. Access-denied on any
    /// delete stops the loop; other delete failures are recorded and the
    /// remaining jobs are still attempted. The printer handle is released on
    /// every path.
    #[instrument(skip(self))]
    pub fn clear_queue(&self, printer: &str) -> ClearReport {
        let printer = if printer.is_empty() {
            match self.default_printer() {
                Ok(name) => name,
                Err(err) => return ClearReport::failed(printer, err),
            }
        } else {
            printer.to_string()
        };

        let queue = match self.bridge.open_printer(&printer) {
            Ok(queue) => queue,
            Err(e) => {
                let err = e.classify(&printer, "opening printer");
                return ClearReport::failed(printer, err);
            }
        };
        let jobs = match queue.jobs() {
            Ok(jobs) => jobs,
            Err(e) => {
                let err = e.classify(&printer, "listing jobs");
                return ClearReport::failed(printer, err);
            }
        };

        let mut report = ClearReport::new(printer.as_str());
        for job in &jobs {
            match queue.delete_job(job.id) {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    let denied = e.is_access_denied();
                    let err = e.classify(&printer, &format!("deleting job {}", job.id));
                    warn!(printer = %printer, job = %job.id, error = %err, "job delete failed");
                    report.failure = Some(err);
                    if denied {
                        break;
                    }
                }
            }
        }

        info!(
            printer = %printer,
            deleted = report.deleted,
            pending = jobs.len(),
            clean = report.is_clean(),
            "queue cleared"
        );
        report
    }

    // -- USB port cycling ----------------------------------------------------

    /// USB ports in cycling order; empty if the serial-port map is unreadable.
    pub fn usb_ports(&self) -> Vec<String> {
        ports::list_usb_ports(self.bridge.as_ref(), &self.usb_tag)
    }

    /// Move `printer` to the USB port after its current one.
    #[instrument(skip(self))]
    pub fn cycle_usb_port(&self, printer: &str) -> Result<PortCycle> {
        let ports = self.usb_ports();
        if ports.is_empty() {
            return Err(SpoolwerkError::NoPortsAvailable);
        }

        let current = self
            .bridge
            .printer_port(printer)
            .map_err(|e| e.classify(printer, "reading port"))?;
        let next = ports::next_port(&current, &ports).ok_or(SpoolwerkError::NoPortsAvailable)?;

        if next == current {
            debug!(printer, port = %current, "already on the only usb port");
            return Ok(PortCycle::Unchanged { port: current });
        }

        self.bridge
            .set_printer_port(printer, next)
            .map_err(|e| e.classify(printer, "changing port"))?;
        info!(printer, from = %current, to = next, "usb port cycled");
        Ok(PortCycle::Switched {
            from: current,
            to: next.to_string(),
        })
    }

    // -- Default printer -----------------------------------------------------

    /// Make `printer` the system default. Unknown names are refused before
    /// the spooler is asked to change anything.
    #[instrument(skip(self))]
    pub fn assign_default(&self, printer: &str) -> Result<()> {
        let printers = self
            .bridge
            .printers()
            .map_err(|e| e.classify(printer, "listing printers"))?;
        if !printers.iter().any(|p| p == printer) {
            return Err(SpoolwerkError::NotFound(printer.to_string()));
        }

        match self.bridge.set_default_printer(printer) {
            Ok(true) => {
                info!(printer, "default printer assigned");
                Ok(())
            }
            Ok(false) => Err(SpoolwerkError::OperationFailed(format!(
                "the system rejected making {printer} the default printer"
            ))),
            Err(e) => Err(e.classify(printer, "setting the default printer")),
        }
    }

    // -- Status panel --------------------------------------------------------

    /// Fresh snapshot of `printer` for the status panel.
    pub fn status(&self, printer: &str) -> PrinterStatus {
        let port = match self.bridge.printer_port(printer) {
            Ok(port) => Some(port),
            Err(e) => {
                warn!(printer, error = %e, "printer port unavailable");
                None
            }
        };
        let is_default = self
            .bridge
            .default_printer()
            .map(|name| name == printer)
            .unwrap_or(false);

        PrinterStatus {
            name: printer.to_string(),
            queue_depth: self.queue_depth(printer),
            port,
            is_default,
            refreshed_at: Utc::now(),
        }
    }
}

/// Initial picker selection: the first preferred printer that is installed,
/// otherwise the first printer in the list.
pub fn choose_printer(printers: &[String], preferences: &[String]) -> Option<String> {
    preferences
        .iter()
        .find(|wanted| printers.contains(wanted))
        .or_else(|| printers.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoolwerk_bridge::MemorySpooler;
    use spoolwerk_bridge::memory::Operation;
    use spoolwerk_core::error::OsError;

    fn controller(spooler: &Arc<MemorySpooler>) -> QueueController {
        QueueController::new(spooler.clone())
    }

    fn shop() -> Arc<MemorySpooler> {
        Arc::new(
            MemorySpooler::new()
                .with_printer("IMP1", "USB5", &[101, 102, 103])
                .with_printer("XP-80C", "USB3", &[])
                .with_default("XP-80C")
                .with_serial_port(r"\Device\USBSER000", "USB3")
                .with_serial_port(r"\Device\USBSER001", "USB5")
                .with_serial_port(r"\Device\USBSER002", "USB7")
                .with_serial_port(r"\Device\Serial0", "COM1"),
        )
    }

    // -- queue depth / clear -------------------------------------------------

    #[test]
    fn clearing_imp1_removes_all_three_jobs() {
        let spooler = shop();
        let ctl = controller(&spooler);

        let report = ctl.clear_queue("IMP1");
        assert_eq!(report.deleted, 3);
        assert_eq!(report.message(), "");
        assert_eq!(ctl.queue_depth("IMP1"), 0);
        assert!(spooler.job_ids("IMP1").is_empty());
        assert_eq!(spooler.open_handles(), 0);
    }

    #[test]
    fn empty_queue_reports_zero() {
        let spooler = shop();
        let ctl = controller(&spooler);

        assert_eq!(ctl.queue_depth("XP-80C"), 0);
        let report = ctl.clear_queue("XP-80C");
        assert_eq!(report.deleted, 0);
        assert_eq!(report.message(), "");
    }

    #[test]
    fn clears_any_number_of_jobs() {
        for n in 0..20u32 {
            let jobs: Vec<u32> = (1..=n).collect();
            let spooler = Arc::new(MemorySpooler::new().with_printer("P", "USB1", &jobs));
            let report = controller(&spooler).clear_queue("P");
            assert_eq!(report.deleted, n as usize);
            assert!(report.is_clean());
            assert!(spooler.job_ids("P").is_empty());
        }
    }

    #[test]
    fn access_denied_stops_the_loop() {
        let spooler = shop();
        spooler.fail_delete_of(102, OsError::access_denied());
        let ctl = controller(&spooler);

        let report = ctl.clear_queue("IMP1");
        assert_eq!(report.deleted, 1);
        assert!(matches!(report.failure, Some(SpoolwerkError::PermissionDenied(_))));
        // 103 was never attempted.
        assert_eq!(spooler.job_ids("IMP1"), vec![102, 103]);
        assert_eq!(spooler.open_handles(), 0);
    }

    #[test]
    fn generic_delete_failure_keeps_going() {
        let spooler = shop();
        spooler.fail_delete_of(101, OsError::new(1722, "The RPC server is unavailable."));
        let report = controller(&spooler).clear_queue("IMP1");

        assert_eq!(report.deleted, 2);
        assert!(matches!(report.failure, Some(SpoolwerkError::OperationFailed(_))));
        assert_eq!(spooler.job_ids("IMP1"), vec![101]);
    }

    #[test]
    fn open_failure_reports_reason_and_nothing_deleted() {
        let spooler = shop();
        let report = controller(&spooler).clear_queue("Ghost");
        assert_eq!(report.deleted, 0);
        assert!(matches!(report.failure, Some(SpoolwerkError::NotFound(_))));
        assert_eq!(report.message(), "printer not found: Ghost");
    }

    #[test]
    fn access_denied_on_open_is_permission_denied() {
        let spooler = shop();
        spooler.fail(Operation::Open, OsError::access_denied());
        let report = controller(&spooler).clear_queue("IMP1");
        assert!(matches!(report.failure, Some(SpoolwerkError::PermissionDenied(_))));
        assert_eq!(spooler.job_ids("IMP1").len(), 3);
    }

    #[test]
    fn empty_name_clears_the_default_printer() {
        let spooler = shop();
        spooler.submit("XP-80C", "receipt").expect("printer exists");
        let report = controller(&spooler).clear_queue("");
        assert_eq!(report.printer, "XP-80C");
        assert_eq!(report.deleted, 1);
    }

    #[test]
    fn empty_name_without_a_default_printer() {
        let spooler = Arc::new(MemorySpooler::new().with_printer("IMP1", "USB5", &[1]));
        let report = controller(&spooler).clear_queue("");
        assert_eq!(report.deleted, 0);
        assert!(matches!(report.failure, Some(SpoolwerkError::NoDefaultPrinter)));
        assert_eq!(report.message(), "no default printer is set");
        assert_eq!(spooler.job_ids("IMP1"), vec![1]);
    }

    #[test]
    fn list_jobs_failure_reports_reason_and_nothing_deleted() {
        let spooler = shop();
        spooler.fail(Operation::ListJobs, OsError::new(1722, "The RPC server is unavailable."));
        let report = controller(&spooler).clear_queue("IMP1");
        assert_eq!(report.deleted, 0);
        assert!(matches!(report.failure, Some(SpoolwerkError::OperationFailed(_))));
        assert_eq!(spooler.job_ids("IMP1").len(), 3);
        assert_eq!(spooler.open_handles(), 0);
    }

    #[test]
    fn list_jobs_denied_is_permission_denied() {
        let spooler = shop();
        spooler.fail(Operation::ListJobs, OsError::access_denied());
        let report = controller(&spooler).clear_queue("IMP1");
        assert_eq!(report.deleted, 0);
        assert_eq!(report.message(), "permission denied: listing jobs on IMP1");
        assert_eq!(spooler.mutations(), 0);
        assert_eq!(spooler.open_handles(), 0);
    }

    #[test]
    fn queue_depth_swallows_failures_but_try_variant_does_not() {
        let spooler = shop();
        spooler.fail(Operation::ListJobs, OsError::new(1722, "The RPC server is unavailable."));
        let ctl = controller(&spooler);
        assert_eq!(ctl.queue_depth("IMP1"), 0);
        assert!(matches!(
            ctl.try_queue_depth("IMP1"),
            Err(SpoolwerkError::OperationFailed(_))
        ));
    }

    // -- usb port cycling ----------------------------------------------------

    #[test]
    fn cycles_usb5_to_usb7() {
        let spooler = shop();
        let cycle = controller(&spooler).cycle_usb_port("IMP1").expect("cycle");
        assert_eq!(cycle.to_string(), "USB5 -> USB7");
        assert!(cycle.is_switched());
        assert_eq!(spooler.port_of("IMP1").as_deref(), Some("USB7"));
    }

    #[test]
    fn wraps_from_last_port_to_first() {
        let spooler = shop();
        let ctl = controller(&spooler);
        ctl.cycle_usb_port("IMP1").expect("USB5 -> USB7");
        let cycle = ctl.cycle_usb_port("IMP1").expect("USB7 -> USB3");
        assert_eq!(
            cycle,
            PortCycle::Switched {
                from: "USB7".into(),
                to: "USB3".into()
            }
        );
    }

    #[test]
    fn no_ports_available_regardless_of_printer() {
        let spooler = Arc::new(
            MemorySpooler::new()
                .with_printer("IMP1", "USB5", &[1])
                .with_serial_port(r"\Device\Serial0", "COM1"),
        );
        let ctl = controller(&spooler);
        for printer in ["IMP1", "Ghost", ""] {
            let err = ctl.cycle_usb_port(printer).expect_err("no usb ports");
            assert!(matches!(err, SpoolwerkError::NoPortsAvailable));
            assert_eq!(err.to_string(), "no ports available");
        }
        assert_eq!(spooler.mutations(), 0);
    }

    #[test]
    fn single_port_reports_no_new_port() {
        let spooler = Arc::new(
            MemorySpooler::new()
                .with_printer("IMP1", "USB3", &[])
                .with_serial_port(r"\Device\USBSER000", "USB3"),
        );
        let cycle = controller(&spooler).cycle_usb_port("IMP1").expect("cycle");
        assert_eq!(cycle, PortCycle::Unchanged { port: "USB3".into() });
        assert_eq!(spooler.mutations(), 0);
    }

    #[test]
    fn port_write_denied_is_permission_denied() {
        let spooler = shop();
        spooler.fail(Operation::WritePort, OsError::access_denied());
        let err = controller(&spooler).cycle_usb_port("IMP1").expect_err("denied");
        assert!(matches!(err, SpoolwerkError::PermissionDenied(_)));
        assert_eq!(spooler.port_of("IMP1").as_deref(), Some("USB5"));
    }

    #[test]
    fn port_read_denied_is_permission_denied() {
        let spooler = shop();
        spooler.fail(Operation::ReadPort, OsError::access_denied());
        let err = controller(&spooler).cycle_usb_port("IMP1").expect_err("denied");
        assert!(matches!(err, SpoolwerkError::PermissionDenied(ref what) if what == "reading port on IMP1"));
        assert_eq!(spooler.mutations(), 0);
    }

    // -- default printer -----------------------------------------------------

    #[test]
    fn assigns_default_printer() {
        let spooler = shop();
        controller(&spooler).assign_default("IMP1").expect("assign");
        assert_eq!(spooler.current_default().as_deref(), Some("IMP1"));
    }

    #[test]
    fn unknown_printer_is_not_found_and_nothing_changes() {
        let spooler = shop();
        let err = controller(&spooler)
            .assign_default("Ghost")
            .expect_err("unknown");
        assert!(matches!(err, SpoolwerkError::NotFound(ref name) if name == "Ghost"));
        assert_eq!(spooler.mutations(), 0);
        assert_eq!(spooler.current_default().as_deref(), Some("XP-80C"));
    }

    #[test]
    fn rejected_and_denied_defaults_are_distinct() {
        let spooler = shop();
        let ctl = controller(&spooler);

        spooler.reject_default_changes();
        let rejected = ctl.assign_default("IMP1").expect_err("rejected");
        assert!(matches!(rejected, SpoolwerkError::OperationFailed(_)));

        spooler.clear_faults();
        spooler.fail(Operation::WriteDefault, OsError::access_denied());
        let denied = ctl.assign_default("IMP1").expect_err("denied");
        assert!(matches!(denied, SpoolwerkError::PermissionDenied(_)));

        assert_ne!(rejected.to_string(), denied.to_string());
    }

    #[test]
    fn printer_list_denied_is_permission_denied() {
        let spooler = shop();
        spooler.fail(Operation::ListPrinters, OsError::access_denied());
        let err = controller(&spooler).assign_default("IMP1").expect_err("denied");
        assert!(matches!(err, SpoolwerkError::PermissionDenied(ref what) if what == "listing printers on IMP1"));
        assert_eq!(spooler.current_default().as_deref(), Some("XP-80C"));
        assert_eq!(spooler.mutations(), 0);
    }

    // -- status / picker -----------------------------------------------------

    #[test]
    fn status_snapshot_reflects_spooler() {
        let spooler = shop();
        let status = controller(&spooler).status("IMP1");
        assert_eq!(status.queue_depth, 3);
        assert_eq!(status.port.as_deref(), Some("USB5"));
        assert!(!status.is_default);
    }

    #[test]
    fn printers_keep_spooler_order_for_the_picker() {
        let spooler = Arc::new(
            MemorySpooler::new()
                .with_printer("Zebra Label", "USB9", &[])
                .with_printer("Office Laser", "IP_192.168.1.40", &[]),
        );
        let ctl = controller(&spooler);
        let printers = ctl.printers().expect("printers");
        assert_eq!(printers, vec!["Zebra Label", "Office Laser"]);
        let prefs = vec!["IMP1".to_string()];
        assert_eq!(choose_printer(&printers, &prefs).as_deref(), Some("Zebra Label"));
    }

    #[test]
    fn picker_prefers_configured_printers() {
        let printers = vec!["Office Laser".to_string(), "XP-80C".into(), "IMP1".into()];
        let prefs = vec!["IMP1".to_string(), "XP-80C".into()];
        assert_eq!(choose_printer(&printers, &prefs).as_deref(), Some("IMP1"));

        let printers = vec!["Office Laser".to_string(), "XP-80C".into()];
        assert_eq!(choose_printer(&printers, &prefs).as_deref(), Some("XP-80C"));

        let printers = vec!["Office Laser".to_string()];
        assert_eq!(choose_printer(&printers, &prefs).as_deref(), Some("Office Laser"));

        assert_eq!(choose_printer(&[], &prefs), None);
    }
}
