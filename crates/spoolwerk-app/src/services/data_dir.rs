// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "spoolwerk";
pub const CONFIG_FILE: &str = "config.json";

/// Return the application data directory. Not created until something is
/// written to it.
pub fn data_dir() -> PathBuf {
    base_dir(
        std::env::var_os("APPDATA").map(PathBuf::from),
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
    .join(APP_DIR)
}

/// Default location of the settings file.
pub fn config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE)
}

/// Roaming app data on Windows, then XDG, then `~/.local/share`, then the
/// temp directory.
fn base_dir(appdata: Option<PathBuf>, xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    appdata
        .or(xdg)
        .or_else(|| home.map(|h| h.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir)
}
