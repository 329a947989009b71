// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serial-port map from HKLM\HARDWARE\DEVICEMAP\SERIALCOMM.
//
// Each value maps a kernel device path (value name) to a port name (REG_SZ
// data). The map only lists devices that are currently present.

use std::ptr;

use spoolwerk_core::error::OsError;
use spoolwerk_core::types::SerialPortEntry;
use tracing::debug;
use windows_sys::Win32::Foundation::{ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{
    HKEY, HKEY_LOCAL_MACHINE, KEY_READ, REG_SZ, RegCloseKey, RegEnumValueW, RegOpenKeyExW,
};

use super::{from_wide, os_error, wide};

const SERIALCOMM_KEY: &str = r"HARDWARE\DEVICEMAP\SERIALCOMM";

// Value names are device paths, data are short port names.
const MAX_NAME: usize = 512;
const MAX_DATA: usize = 256;

struct RegKey(HKEY);

impl Drop for RegKey {
    fn drop(&mut self) {
        // SAFETY: the key came from a successful RegOpenKeyExW.
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

pub(super) fn serial_comm_entries() -> Result<Vec<SerialPortEntry>, OsError> {
    let path = wide(SERIALCOMM_KEY);
    let mut hkey: HKEY = ptr::null_mut();
    // SAFETY: `path` is NUL-terminated; `hkey` receives the opened key.
    let status = unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, path.as_ptr(), 0, KEY_READ, &mut hkey) };
    if status != ERROR_SUCCESS {
        return Err(os_error("RegOpenKeyExW", status));
    }
    let key = RegKey(hkey);

    let mut entries = Vec::new();
    let mut index = 0;
    loop {
        let mut name = [0u16; MAX_NAME];
        let mut data = [0u16; MAX_DATA];
        let mut name_len = MAX_NAME as u32;
        let mut data_len = (MAX_DATA * 2) as u32;
        let mut kind: u32 = 0;
        // SAFETY: buffer sizes are passed alongside their buffers.
        let status = unsafe {
            RegEnumValueW(
                key.0,
                index,
                name.as_mut_ptr(),
                &mut name_len,
                ptr::null(),
                &mut kind,
                data.as_mut_ptr() as *mut u8,
                &mut data_len,
            )
        };
        if status == ERROR_NO_MORE_ITEMS {
            break;
        }
        if status != ERROR_SUCCESS {
            return Err(os_error("RegEnumValueW", status));
        }
        index += 1;
        if kind != REG_SZ {
            continue;
        }
        let device = from_wide(&name[..name_len as usize]);
        let port = from_wide(&data[..(data_len as usize / 2)]);
        debug!(%device, %port, "serial port found");
        entries.push(SerialPortEntry { device, port });
    }
    Ok(entries)
}
