// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-worker action dispatch.
//
// Each operator action runs on one blocking worker so the front end stays
// responsive. While it runs the dispatcher is busy and refuses another
// action; the flag drops when the worker finishes, even if it panicked.
// There is no pool, no queueing and no cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use spoolwerk_core::error::{Result, SpoolwerkError};
use spoolwerk_core::types::{PrinterStatus, Verdict};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::controller::QueueController;

/// The operator actions offered by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    /// Re-read the status panel.
    Refresh,
    Clear,
    CyclePort,
    SetDefault,
}

impl QueueAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Refresh => "Refresh",
            Self::Clear => "Clear queue",
            Self::CyclePort => "Cycle USB port",
            Self::SetDefault => "Set as default",
        }
    }
}

/// What the front end shows once an action completes.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: QueueAction,
    pub verdict: Verdict,
    /// Status re-read after the action.
    pub status: PrinterStatus,
}

/// Run `action` against `printer` on the calling thread.
pub fn run_action(controller: &QueueController, action: QueueAction, printer: &str) -> Verdict {
    match action {
        QueueAction::Refresh => match controller.try_queue_depth(printer) {
            Ok(depth) => Verdict::ok(format!("{printer}: {depth} job(s) pending")),
            Err(err) => Verdict::from(&err),
        },
        QueueAction::Clear => Verdict::from(&controller.clear_queue(printer)),
        QueueAction::CyclePort => match controller.cycle_usb_port(printer) {
            Ok(cycle) => Verdict::from(&cycle),
            Err(err) => Verdict::from(&err),
        },
        QueueAction::SetDefault => match controller.assign_default(printer) {
            Ok(()) => Verdict::ok(format!("{printer} is now the default printer")),
            Err(err) => Verdict::from(&err),
        },
    }
}

/// Runs one action at a time on a blocking worker.
#[derive(Clone)]
pub struct ActionDispatcher {
    controller: QueueController,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the worker is done.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ActionDispatcher {
    pub fn new(controller: QueueController) -> Self {
        Self {
            controller,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn controller(&self) -> &QueueController {
        &self.controller
    }

    /// Run `action` on a worker, then refresh the printer's status.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(
        &self,
        action: QueueAction,
        printer: impl Into<String>,
    ) -> Result<JoinHandle<ActionOutcome>> {
        let printer = printer.into();
        info!(action = action.label(), printer = %printer, "dispatching action");
        self.spawn(move |controller| {
            let verdict = run_action(controller, action, &printer);
            let status = controller.status(&printer);
            ActionOutcome {
                action,
                verdict,
                status,
            }
        })
    }

    /// Run arbitrary work against the controller on the worker.
    ///
    /// Fails with `Busy` if another piece of work has not finished yet.
    pub fn spawn<T, F>(&self, work: F) -> Result<JoinHandle<T>>
    where
        T: Send + 'static,
        F: FnOnce(&QueueController) -> T + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("dispatch refused, worker busy");
            return Err(SpoolwerkError::Busy);
        }
        let guard = BusyGuard(self.busy.clone());
        let controller = self.controller.clone();
        Ok(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            work(&controller)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoolwerk_bridge::MemorySpooler;
    use std::sync::mpsc;

    fn is_busy(dispatcher: &ActionDispatcher) -> bool {
        dispatcher.busy.load(Ordering::Acquire)
    }

    fn dispatcher() -> (Arc<MemorySpooler>, ActionDispatcher) {
        let spooler = Arc::new(MemorySpooler::sample());
        let controller = QueueController::new(spooler.clone());
        (spooler, ActionDispatcher::new(controller))
    }

    #[tokio::test]
    async fn clear_runs_on_worker_and_refreshes_status() {
        let (spooler, dispatcher) = dispatcher();
        let outcome = dispatcher
            .dispatch(QueueAction::Clear, "IMP1")
            .expect("idle")
            .await
            .expect("worker finished");

        assert!(outcome.verdict.success);
        assert_eq!(outcome.verdict.message, "cleared 3 job(s) from IMP1");
        assert_eq!(outcome.status.queue_depth, 0);
        assert!(spooler.job_ids("IMP1").is_empty());
        assert!(!is_busy(&dispatcher));
    }

    #[tokio::test]
    async fn second_action_is_refused_while_busy() {
        let (_spooler, dispatcher) = dispatcher();
        let (release, wait) = mpsc::channel::<()>();

        let first = dispatcher
            .spawn(move |controller| {
                wait.recv().ok();
                controller.queue_depth("IMP1")
            })
            .expect("idle");
        assert!(is_busy(&dispatcher));
        assert!(matches!(
            dispatcher.dispatch(QueueAction::Refresh, "IMP1"),
            Err(SpoolwerkError::Busy)
        ));

        release.send(()).expect("worker waiting");
        assert_eq!(first.await.expect("worker finished"), 3);
        assert!(!is_busy(&dispatcher));
        assert!(dispatcher.dispatch(QueueAction::Refresh, "IMP1").is_ok());
    }

    #[tokio::test]
    async fn busy_flag_drops_after_panic() {
        let (_spooler, dispatcher) = dispatcher();
        let handle = dispatcher
            .spawn(|_| -> () { panic!("worker blew up") })
            .expect("idle");
        assert!(handle.await.is_err());
        assert!(!is_busy(&dispatcher));
    }

    #[test]
    fn refresh_of_unknown_printer_fails() {
        let (_spooler, dispatcher) = dispatcher();
        let verdict = run_action(dispatcher.controller(), QueueAction::Refresh, "Ghost");
        assert!(!verdict.success);
        assert_eq!(verdict.message, "printer not found: Ghost");

        let verdict = run_action(dispatcher.controller(), QueueAction::Refresh, "IMP1");
        assert!(verdict.success);
        assert_eq!(verdict.message, "IMP1: 3 job(s) pending");
    }

    #[test]
    fn cycle_action_reports_switch() {
        let (_spooler, dispatcher) = dispatcher();
        let verdict = run_action(dispatcher.controller(), QueueAction::CyclePort, "IMP1");
        assert!(verdict.success);
        assert_eq!(verdict.message, "USB5 -> USB7");
    }

    #[test]
    fn set_default_action_reports_unknown_printer() {
        let (_spooler, dispatcher) = dispatcher();
        let verdict = run_action(dispatcher.controller(), QueueAction::SetDefault, "Ghost");
        assert!(!verdict.success);
        assert_eq!(verdict.message, "printer not found: Ghost");
    }
}
