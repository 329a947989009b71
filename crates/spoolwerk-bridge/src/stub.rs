// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for platforms without the Win32 spooler.
//
// Every call fails with `ERROR_NOT_SUPPORTED`, which the controller reports as
// `PlatformUnavailable`.

use spoolwerk_core::error::OsError;
use spoolwerk_core::types::SerialPortEntry;

use crate::traits::*;

/// No-op bridge returned on non-Windows platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Unsupported platform (stub)"
    }
}

impl SpoolerGateway for StubBridge {
    fn open_printer(&self, _name: &str) -> OsResult<Box<dyn PrinterQueue + '_>> {
        tracing::warn!("SpoolerGateway::open_printer called on stub bridge");
        Err(OsError::not_supported())
    }

    fn printer_port(&self, _name: &str) -> OsResult<String> {
        Err(OsError::not_supported())
    }

    fn set_printer_port(&self, _name: &str, _port: &str) -> OsResult<()> {
        tracing::warn!("SpoolerGateway::set_printer_port called on stub bridge");
        Err(OsError::not_supported())
    }

    fn default_printer(&self) -> OsResult<String> {
        Err(OsError::not_supported())
    }

    fn set_default_printer(&self, _name: &str) -> OsResult<bool> {
        tracing::warn!("SpoolerGateway::set_default_printer called on stub bridge");
        Err(OsError::not_supported())
    }

    fn printers(&self) -> OsResult<Vec<String>> {
        Err(OsError::not_supported())
    }
}

impl SerialPortRegistry for StubBridge {
    fn serial_ports(&self) -> OsResult<Vec<SerialPortEntry>> {
        Err(OsError::not_supported())
    }
}
