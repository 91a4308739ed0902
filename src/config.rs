use crate::registry::RegistryOptions;

use anyhow::{anyhow, Result};
use ini::{Ini, ParseOption};
use log::LevelFilter;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "hotkey-handler.ini";

#[derive(Debug, Clone)]
pub struct Config {
    pub enable: bool,
    pub no_repeat: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable: true,
            no_repeat: false,
            log_level: LevelFilter::Info,
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(ini_conf: &Ini) -> Self {
        let mut conf = Config::default();
        if let Some(section) = ini_conf.section(Some("hotkeys")) {
            if let Some(v) = section.get("enable").and_then(|v| read_bool("enable", v)) {
                conf.enable = v;
            }
            if let Some(v) = section.get("no_repeat").and_then(|v| read_bool("no_repeat", v)) {
                conf.no_repeat = v;
            }
        }
        if let Some(section) = ini_conf.section(Some("log")) {
            if let Some(v) = section.get("level") {
                match v.trim().parse::<LevelFilter>() {
                    Ok(level) => conf.log_level = level,
                    Err(_) => warn!("invalid log level '{v}', using {}", conf.log_level),
                }
            }
            if let Some(v) = section.get("path").map(str::trim) {
                if !v.is_empty() {
                    conf.log_file = Some(PathBuf::from(v));
                }
            }
        }
        conf
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        // Windows paths are full of backslashes, keep them literal.
        let opt = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini_conf = Ini::load_from_file_opt(path, opt)
            .map_err(|err| anyhow!("Failed to load config file '{}', {err}", path.display()))?;
        Ok(Self::load(&ini_conf))
    }

    pub fn to_bool(v: &str) -> Option<bool> {
        match v {
            "yes" | "true" | "on" | "1" => Some(true),
            "no" | "false" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            no_repeat: self.no_repeat,
        }
    }
}

fn read_bool(key: &str, value: &str) -> Option<bool> {
    let ret = Config::to_bool(&value.trim().to_ascii_lowercase());
    if ret.is_none() {
        warn!("invalid value '{value}' for {key}");
    }
    ret
}

/// Config file next to the running binary.
pub fn default_config_path() -> Result<PathBuf> {
    let path =
        std::env::current_exe().map_err(|err| anyhow!("Failed to get binary path, {err}"))?;
    let folder = path
        .parent()
        .ok_or_else(|| anyhow!("Failed to get binary folder"))?;
    Ok(folder.join(CONFIG_FILE_NAME))
}
