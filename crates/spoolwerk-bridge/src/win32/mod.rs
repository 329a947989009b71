// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Win32 print spooler bridge.
//
// Thin wrappers over winspool: every call opens what it needs, acts and
// closes. Printer handles are owned by `PrinterHandle`, which calls
// `ClosePrinter` on drop.

mod registry;

use std::ptr;

use spoolwerk_core::error::OsError;
use spoolwerk_core::types::{JobId, QueuedJob, SerialPortEntry};
use tracing::{debug, info};
use windows_sys::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, GetLastError};
use windows_sys::Win32::Graphics::Printing::{
    ClosePrinter, EnumJobsW, EnumPrintersW, GetDefaultPrinterW, GetPrinterW, JOB_INFO_1W,
    OpenPrinterW, PRINTER_DEFAULTSW, PRINTER_HANDLE, PRINTER_INFO_2W, PRINTER_INFO_4W,
    SetDefaultPrinterW, SetJobW, SetPrinterW,
};

use crate::traits::*;

const JOB_CONTROL_DELETE: u32 = 5;
const PRINTER_ENUM_LOCAL: u32 = 0x0000_0002;
const PRINTER_ENUM_CONNECTIONS: u32 = 0x0000_0004;
const PRINTER_ACCESS_USE: u32 = 0x0000_0008;
const PRINTER_ALL_ACCESS: u32 = 0x000F_000C;

/// Access for job queues. Deleting jobs needs only use rights on the
/// printer; the spooler checks each job's own permissions in `SetJobW`.
const QUEUE_ACCESS: u32 = PRINTER_ACCESS_USE;

/// Bridge to the local Win32 print spooler and the registry's serial-port map.
#[derive(Debug, Default)]
pub struct Win32Bridge;

impl Win32Bridge {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformBridge for Win32Bridge {
    fn platform_name(&self) -> &str {
        "Windows (Win32 spooler)"
    }
}

impl SpoolerGateway for Win32Bridge {
    fn open_printer(&self, name: &str) -> OsResult<Box<dyn PrinterQueue + '_>> {
        let handle = PrinterHandle::open(name, QUEUE_ACCESS)?;
        Ok(Box::new(Win32Queue {
            name: name.to_string(),
            handle,
        }))
    }

    fn printer_port(&self, name: &str) -> OsResult<String> {
        let handle = PrinterHandle::open(name, PRINTER_ACCESS_USE)?;
        let buf = handle.info(2)?;
        // SAFETY: GetPrinterW level 2 fills the buffer with a PRINTER_INFO_2W
        // followed by the strings it points into.
        let info = unsafe { &*(buf.as_ptr() as *const PRINTER_INFO_2W) };
        Ok(unsafe { from_wide_ptr(info.pPortName) }.unwrap_or_default())
    }

    fn set_printer_port(&self, name: &str, port: &str) -> OsResult<()> {
        let handle = PrinterHandle::open(name, PRINTER_ALL_ACCESS)?;
        let mut buf = handle.info(2)?;
        let port_w = wide(port);
        // SAFETY: as in `printer_port`; `port_w` outlives the SetPrinterW call.
        unsafe {
            let info = &mut *(buf.as_mut_ptr() as *mut PRINTER_INFO_2W);
            info.pPortName = port_w.as_ptr() as *mut u16;
            info.pSecurityDescriptor = ptr::null_mut();
            if SetPrinterW(handle.0, 2, buf.as_ptr() as *const u8, 0) == 0 {
                return Err(last_error("SetPrinterW"));
            }
        }
        info!(printer = name, port, "printer port changed");
        Ok(())
    }

    fn default_printer(&self) -> OsResult<String> {
        let mut len: u32 = 0;
        // SAFETY: first call only asks for the required length.
        unsafe {
            GetDefaultPrinterW(ptr::null_mut(), &mut len);
        }
        if len == 0 {
            return Err(last_error("GetDefaultPrinterW"));
        }
        let mut name = vec![0u16; len as usize];
        // SAFETY: `name` holds `len` UTF-16 units as requested.
        if unsafe { GetDefaultPrinterW(name.as_mut_ptr(), &mut len) } == 0 {
            return Err(last_error("GetDefaultPrinterW"));
        }
        Ok(from_wide(&name))
    }

    fn set_default_printer(&self, name: &str) -> OsResult<bool> {
        let name_w = wide(name);
        // SAFETY: `name_w` is NUL-terminated and lives across the call.
        if unsafe { SetDefaultPrinterW(name_w.as_ptr()) } != 0 {
            info!(printer = name, "default printer changed");
            return Ok(true);
        }
        let err = last_error("SetDefaultPrinterW");
        if err.is_access_denied() {
            Err(err)
        } else {
            debug!(printer = name, error = %err, "default printer change refused");
            Ok(false)
        }
    }

    fn printers(&self) -> OsResult<Vec<String>> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let (buf, count) = enumerate("EnumPrintersW", |data, size, needed, returned| unsafe {
            EnumPrintersW(flags, ptr::null(), 4, data, size, needed, returned)
        })?;
        // SAFETY: EnumPrintersW level 4 returns `count` PRINTER_INFO_4W records.
        let infos = unsafe {
            std::slice::from_raw_parts(buf.as_ptr() as *const PRINTER_INFO_4W, count as usize)
        };
        Ok(infos
            .iter()
            .filter_map(|info| unsafe { from_wide_ptr(info.pPrinterName) })
            .collect())
    }
}

impl SerialPortRegistry for Win32Bridge {
    fn serial_ports(&self) -> OsResult<Vec<SerialPortEntry>> {
        registry::serial_comm_entries()
    }
}

// ---------------------------------------------------------------------------
// Printer handle
// ---------------------------------------------------------------------------

struct PrinterHandle(PRINTER_HANDLE);

impl PrinterHandle {
    fn open(name: &str, access: u32) -> OsResult<Self> {
        let name_w = wide(name);
        let defaults = PRINTER_DEFAULTSW {
            pDatatype: ptr::null_mut(),
            pDevMode: ptr::null_mut(),
            DesiredAccess: access,
        };
        let mut handle: PRINTER_HANDLE = ptr::null_mut();
        // SAFETY: all pointers are valid for the duration of the call.
        if unsafe { OpenPrinterW(name_w.as_ptr(), &mut handle, &defaults) } == 0 {
            return Err(last_error("OpenPrinterW"));
        }
        debug!(printer = name, "printer opened");
        Ok(Self(handle))
    }

    /// `GetPrinterW` at `level`, returned in an 8-byte aligned buffer.
    fn info(&self, level: u32) -> OsResult<Vec<u64>> {
        let mut needed: u32 = 0;
        // SAFETY: sizing call with an empty buffer.
        unsafe {
            GetPrinterW(self.0, level, ptr::null_mut(), 0, &mut needed);
        }
        if needed == 0 {
            return Err(last_error("GetPrinterW"));
        }
        let mut buf = aligned_buffer(needed);
        // SAFETY: `buf` holds at least `needed` bytes.
        if unsafe { GetPrinterW(self.0, level, buf.as_mut_ptr() as *mut u8, needed, &mut needed) }
            == 0
        {
            return Err(last_error("GetPrinterW"));
        }
        Ok(buf)
    }
}

impl Drop for PrinterHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful OpenPrinterW.
        unsafe {
            ClosePrinter(self.0);
        }
    }
}

struct Win32Queue {
    name: String,
    handle: PrinterHandle,
}

impl PrinterQueue for Win32Queue {
    fn jobs(&self) -> OsResult<Vec<QueuedJob>> {
        let handle = self.handle.0;
        let (buf, count) = enumerate("EnumJobsW", |data, size, needed, returned| unsafe {
            EnumJobsW(handle, 0, u32::MAX, 1, data, size, needed, returned)
        })?;
        // SAFETY: EnumJobsW level 1 returns `count` JOB_INFO_1W records.
        let infos = unsafe {
            std::slice::from_raw_parts(buf.as_ptr() as *const JOB_INFO_1W, count as usize)
        };
        Ok(infos
            .iter()
            .map(|info| QueuedJob {
                id: JobId(info.JobId),
                document: unsafe { from_wide_ptr(info.pDocument) },
                user: unsafe { from_wide_ptr(info.pUserName) },
            })
            .collect())
    }

    fn delete_job(&self, id: JobId) -> OsResult<()> {
        // SAFETY: control-only SetJobW call, no info structure passed.
        if unsafe { SetJobW(self.handle.0, id.0, 0, ptr::null(), JOB_CONTROL_DELETE) } == 0 {
            return Err(last_error("SetJobW"));
        }
        debug!(printer = %self.name, job = %id, "job deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a winspool enumeration: size the buffer, then fill it. If the result
/// grew in between, size again with the new requirement.
fn enumerate(
    call: &str,
    mut f: impl FnMut(*mut u8, u32, *mut u32, *mut u32) -> i32,
) -> OsResult<(Vec<u64>, u32)> {
    let mut needed: u32 = 0;
    let mut returned: u32 = 0;
    if f(ptr::null_mut(), 0, &mut needed, &mut returned) != 0 {
        return Ok((Vec::new(), 0));
    }
    loop {
        // SAFETY: reading the thread's last-error value has no preconditions.
        let code = unsafe { GetLastError() };
        if code != ERROR_INSUFFICIENT_BUFFER {
            return Err(os_error(call, code));
        }
        let size = needed;
        let mut buf = aligned_buffer(size);
        if f(buf.as_mut_ptr() as *mut u8, size, &mut needed, &mut returned) != 0 {
            return Ok((buf, returned));
        }
        debug!(call, size, needed, "enumeration outgrew its buffer");
    }
}

fn aligned_buffer(bytes: u32) -> Vec<u64> {
    vec![0u64; (bytes as usize).div_ceil(8)]
}

pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

pub(crate) fn from_wide(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

/// # Safety
/// `p` must be null or point to a NUL-terminated UTF-16 string.
unsafe fn from_wide_ptr(p: *const u16) -> Option<String> {
    if p.is_null() {
        return None;
    }
    let mut len = 0;
    // SAFETY: guaranteed NUL-terminated by the caller.
    unsafe {
        while *p.add(len) != 0 {
            len += 1;
        }
        Some(String::from_utf16_lossy(std::slice::from_raw_parts(p, len)))
    }
}

pub(crate) fn last_error(call: &str) -> OsError {
    // SAFETY: reading the thread's last-error value has no preconditions.
    os_error(call, unsafe { GetLastError() })
}

pub(crate) fn os_error(call: &str, code: u32) -> OsError {
    let text = std::io::Error::from_raw_os_error(code as i32).to_string();
    let text = text.split(" (os error").next().unwrap_or(&text).trim();
    OsError::new(code, format!("{call}: {text}"))
}
