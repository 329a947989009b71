// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Spoolwerk.
//
// The spooler bridge hands back raw `OsError`s carrying the Win32 error code.
// The queue controller classifies them into `SpoolwerkError` kinds, and the
// front end only ever shows the resulting message.

use thiserror::Error;

/// Top-level error type for all Spoolwerk operations.
#[derive(Debug, Error)]
pub enum SpoolwerkError {
    // -- Spooler outcomes --
    #[error("printer not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("no ports available")]
    NoPortsAvailable,

    #[error("no default printer is set")]
    NoDefaultPrinter,

    #[error("{0}")]
    OperationFailed(String),

    // -- Front end --
    #[error("another action is still running")]
    Busy,

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpoolwerkError>;

/// A raw failure reported by the operating system's spooler or registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (os error {code})")]
pub struct OsError {
    /// Win32 error code (`GetLastError` / `WIN32_ERROR`).
    pub code: u32,
    /// System-provided or synthesized description.
    pub message: String,
}

impl OsError {
    pub const FILE_NOT_FOUND: u32 = 2;
    pub const ACCESS_DENIED: u32 = 5;
    pub const NOT_SUPPORTED: u32 = 50;
    pub const INVALID_PRINTER_NAME: u32 = 1801;

    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn access_denied() -> Self {
        Self::new(Self::ACCESS_DENIED, "Access is denied.")
    }

    pub fn invalid_printer_name() -> Self {
        Self::new(Self::INVALID_PRINTER_NAME, "The printer name is invalid.")
    }

    pub fn not_supported() -> Self {
        Self::new(Self::NOT_SUPPORTED, "The request is not supported.")
    }

    pub fn is_access_denied(&self) -> bool {
        self.code == Self::ACCESS_DENIED
    }

    /// Classify a raw OS failure raised while performing `action` on `printer`.
    ///
    /// Access-denied maps to `PermissionDenied` no matter which call raised it.
    pub fn classify(self, printer: &str, action: &str) -> SpoolwerkError {
        match self.code {
            Self::ACCESS_DENIED => SpoolwerkError::PermissionDenied(format!("{action} on {printer}")),
            Self::INVALID_PRINTER_NAME | Self::FILE_NOT_FOUND => {
                SpoolwerkError::NotFound(printer.to_string())
            }
            Self::NOT_SUPPORTED => SpoolwerkError::PlatformUnavailable,
            _ => SpoolwerkError::OperationFailed(format!("{action} on {printer} failed: {self}")),
        }
    }
}
