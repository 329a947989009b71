// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the operator at the till.
//
// Every error kind is mapped to plain English with a clear suggestion.
// Severity drives how the front end presents it.

use crate::error::SpoolwerkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Spooler hiccup or a busy front end; trying again may work.
    Transient,
    /// The operator must do something (pick another printer, run as admin).
    ActionRequired,
    /// Cannot be fixed from this tool.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `SpoolwerkError` into something an operator can act on.
pub fn humanize_error(err: &SpoolwerkError) -> HumanError {
    match err {
        SpoolwerkError::NotFound(name) => HumanError {
            message: format!("The printer \"{name}\" isn't installed on this computer."),
            suggestion: "Pick a printer from the list, or check the name in Windows printer settings.".into(),
            severity: Severity::ActionRequired,
        },

        SpoolwerkError::PermissionDenied(detail) => HumanError {
            message: "Windows didn't allow this change.".into(),
            suggestion: format!("Run Spoolwerk as administrator and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        SpoolwerkError::NoPortsAvailable => HumanError {
            message: "No USB ports were found.".into(),
            suggestion: "Check the printer's USB cable is plugged in and the printer is switched on.".into(),
            severity: Severity::ActionRequired,
        },

        SpoolwerkError::NoDefaultPrinter => HumanError {
            message: "This computer has no default printer.".into(),
            suggestion: "Pick a printer by name, or make one the default first.".into(),
            severity: Severity::ActionRequired,
        },

        SpoolwerkError::OperationFailed(detail) => HumanError {
            message: "The print spooler reported a problem.".into(),
            suggestion: format!("Try again. If it keeps happening, restart the Print Spooler service. ({detail})"),
            severity: Severity::Transient,
        },

        SpoolwerkError::Busy => HumanError {
            message: "Still working on the previous action.".into(),
            suggestion: "Wait for it to finish, then try again.".into(),
            severity: Severity::Transient,
        },

        SpoolwerkError::PlatformUnavailable => HumanError {
            message: "This only works with the Windows print spooler.".into(),
            suggestion: "Run Spoolwerk on Windows, or use --dry-run to try it out.".into(),
            severity: Severity::Permanent,
        },

        SpoolwerkError::Config(detail) => HumanError {
            message: "The settings file couldn't be used.".into(),
            suggestion: format!("Fix or delete the settings file; defaults will be used. ({detail})"),
            severity: Severity::ActionRequired,
        },

        SpoolwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Spoolwerk can't write its settings file.".into(),
                    suggestion: "Check the permissions of the settings folder.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        SpoolwerkError::Serialization(_) => HumanError {
            message: "The settings file is damaged.".into(),
            suggestion: "Delete the settings file; Spoolwerk will recreate it with defaults.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
