// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Picks the spooler bridge, wires the queue
// controller and dispatcher, and owns the loaded configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use spoolwerk_bridge::{MemorySpooler, PlatformBridge, platform_bridge};
use spoolwerk_core::AppConfig;
use spoolwerk_core::error::{Result, SpoolwerkError};
use spoolwerk_print::{ActionDispatcher, QueueController, choose_printer};
use tracing::info;

/// Everything a command needs.
#[derive(Clone)]
pub struct AppServices {
    dispatcher: ActionDispatcher,
    config: AppConfig,
    config_path: PathBuf,
}

impl AppServices {
    /// Wire services over the real spooler, or over the in-memory sample
    /// spooler when `dry_run` is set.
    pub fn init(config: AppConfig, config_path: PathBuf, dry_run: bool) -> Self {
        let bridge: Arc<dyn PlatformBridge> = if dry_run {
            Arc::new(MemorySpooler::sample())
        } else {
            Arc::from(platform_bridge())
        };
        let controller = QueueController::new(bridge).with_usb_tag(config.usb_port_tag.clone());
        info!(platform = controller.platform_name(), "spooler bridge ready");
        Self {
            dispatcher: ActionDispatcher::new(controller),
            config,
            config_path,
        }
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn controller(&self) -> &QueueController {
        self.dispatcher.controller()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The printer named on the command line, or the picker's initial choice.
    pub fn select_printer(&self, requested: Option<String>) -> Result<String> {
        if let Some(name) = requested {
            return Ok(name);
        }
        let printers = self.controller().printers()?;
        choose_printer(&printers, &self.config.preferred_printers)
            .ok_or_else(|| SpoolwerkError::NotFound("no printers installed".into()))
    }

    pub fn save_config(&self) -> Result<()> {
        persist_config(&self.config_path, &self.config)
    }
}

/// Load settings from `path`. A missing file means defaults.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(data) => Ok(serde_json::from_str(&data)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(SpoolwerkError::Config(format!("{}: {e}", path.display()))),
    }
}

pub fn persist_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
