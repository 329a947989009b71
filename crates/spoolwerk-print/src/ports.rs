// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// USB port selection.
//
// The serial-port map is filtered down to USB-tagged ports, ordered by the
// number at the end of the port name (USB3 before USB10), and walked in
// round-robin order when a printer is moved to its next port.

use spoolwerk_bridge::SerialPortRegistry;
use spoolwerk_core::error::OsError;
use tracing::{debug, warn};

/// Trailing decimal number of a port name: `USB007` → 7, `COM12` → 12.
pub fn numeric_suffix(name: &str) -> Option<u64> {
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    name[name.len() - digits..].parse().ok()
}

/// Sort port names by numeric suffix, ascending, dropping duplicates.
///
/// Names without a suffix go last, in lexical order.
pub fn sort_ports(mut ports: Vec<String>) -> Vec<String> {
    ports.sort_by(|a, b| {
        let (ka, kb) = (numeric_suffix(a), numeric_suffix(b));
        ka.is_none()
            .cmp(&kb.is_none())
            .then(ka.cmp(&kb))
            .then_with(|| a.cmp(b))
    });
    ports.dedup();
    ports
}

/// USB-tagged ports from the serial-port map, ordered for cycling.
pub fn try_list_usb_ports<R: SerialPortRegistry + ?Sized>(
    registry: &R,
    tag: &str,
) -> Result<Vec<String>, OsError> {
    let entries = registry.serial_ports()?;
    let ports = entries
        .into_iter()
        .filter(|entry| entry.is_tagged(tag))
        .map(|entry| entry.port)
        .collect();
    let ports = sort_ports(ports);
    debug!(count = ports.len(), "usb ports listed");
    Ok(ports)
}

/// Like [`try_list_usb_ports`], but a registry failure yields no ports.
pub fn list_usb_ports<R: SerialPortRegistry + ?Sized>(registry: &R, tag: &str) -> Vec<String> {
    try_list_usb_ports(registry, tag).unwrap_or_else(|err| {
        warn!(error = %err, "could not read the serial-port map, assuming no usb ports");
        Vec::new()
    })
}

/// The port after `current`, wrapping around; the first port if `current`
/// is not in the list. `None` only when there are no ports at all.
pub fn next_port<'a>(current: &str, ports: &'a [String]) -> Option<&'a str> {
    let next = match ports.iter().position(|p| p == current) {
        Some(i) => ports.get((i + 1) % ports.len()),
        None => ports.first(),
    };
    next.map(String::as_str)
}
