/*
 * This file is part of Sensorprobe.
 *
 * Copyright (C) 2025 Sensorprobe contributors
 *
 * Sensorprobe is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorprobe is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorprobe. If not, see <https://www.gnu.org/licenses/>.
 */

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::provider::OHM_NAMESPACE;

const MIN_POLL_INTERVAL_MS: u64 = 100;
const MAX_POLL_INTERVAL_MS: u64 = 3_600_000;

fn default_provider_namespace() -> String { OHM_NAMESPACE.to_string() }
fn default_use_provider() -> bool { true }
fn default_poll_interval_ms() -> u64 { 1000 }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// Namespace of the third-party hardware monitor.
    #[serde(default = "default_provider_namespace")]
    pub provider_namespace: String,
    /// Set to false to read native schemas only.
    #[serde(default = "default_use_provider")]
    pub use_provider: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Event log destination; defaults to the system temp directory.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            provider_namespace: default_provider_namespace(),
            use_provider: default_use_provider(),
            poll_interval_ms: default_poll_interval_ms(),
            log_path: None,
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("sensorprobe").join("config.json");
    }
    if let Ok(appdata) = env::var("APPDATA") {
        return Path::new(&appdata).join("sensorprobe").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("sensorprobe")
            .join("config.json");
    }
    PathBuf::from("sensorprobe.json")
}

fn is_safe_namespace(s: &str) -> bool {
    if s.is_empty() || s.len() > 128 { return false; }
    let lower = s.to_ascii_lowercase();
    let Some(rest) = lower.strip_prefix("root\\") else { return false };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\\'))
}

pub fn validate_config(cfg: &ProbeConfig) -> Result<(), String> {
    if !is_safe_namespace(&cfg.provider_namespace) {
        return Err(format!("invalid provider namespace '{}'", cfg.provider_namespace));
    }
    if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&cfg.poll_interval_ms) {
        return Err(format!(
            "poll interval out of range ({}..{} ms)",
            MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS
        ));
    }
    if let Some(p) = &cfg.log_path {
        if p.as_os_str().is_empty() { return Err("empty log path".to_string()); }
    }
    Ok(())
}

/// Read and validate the config at `path`.
pub fn try_load_config(path: &Path) -> Result<ProbeConfig, String> {
    let data = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let cfg: ProbeConfig = serde_json::from_str(&data).map_err(|e| format!("parse error: {}", e))?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Config from [`config_path`], or defaults when there is none.
pub fn load_config() -> Result<ProbeConfig, String> {
    let path = config_path();
    if !path.exists() {
        return Ok(ProbeConfig::default());
    }
    try_load_config(&path)
}

pub fn save_config(path: &Path, cfg: &ProbeConfig) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(cfg).map_err(io::Error::other)?;
    fs::write(path, json)
}
