// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Printers to pre-select, in order of preference, when none is given.
    pub preferred_printers: Vec<String>,
    /// Substring that marks a serial port as USB-attached.
    pub usb_port_tag: String,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preferred_printers: vec!["IMP1".into(), "XP-80C".into()],
            usb_port_tag: "USB".into(),
            log_filter: "info".into(),
        }
    }
}
