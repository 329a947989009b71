// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Spoolwerk: OS spooler bridge abstractions.
//!
//! The queue controller never talks to the operating system directly. It goes
//! through the traits in [`traits`], implemented here for the Win32 spooler,
//! for platforms without one (a stub that refuses every call), and in memory
//! for tests and dry runs.

pub mod memory;
pub mod traits;

#[cfg(windows)]
pub mod win32;

#[cfg(not(windows))]
pub mod stub;

pub use memory::MemorySpooler;
pub use traits::{OsResult, PlatformBridge, PrinterQueue, SerialPortRegistry, SpoolerGateway};

/// Returns the bridge for the operating system this binary was built for.
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    #[cfg(windows)]
    {
        Box::new(win32::Win32Bridge::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(stub::StubBridge)
    }
}
