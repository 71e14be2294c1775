//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Default bind address when nothing else is configured
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `MEDFORM_DATA_DIR` environment variable
/// 3. TOML config file (`data_dir` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("MEDFORM_DATA_DIR") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = config_file_value("data_dir") {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent compiled default
    default_data_dir()
}

/// Bind address resolution: CLI > `MEDFORM_BIND` > config file > default
pub fn resolve_bind_addr(cli_arg: Option<&str>) -> String {
    if let Some(addr) = cli_arg {
        return addr.to_string();
    }
    if let Ok(addr) = std::env::var("MEDFORM_BIND") {
        return addr;
    }
    if let Some(addr) = config_file_value("bind_addr") {
        return addr;
    }
    DEFAULT_BIND_ADDR.to_string()
}

/// Database file location inside the data folder
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("medform.db")
}

/// Read a single string key from the config file, if both exist
fn config_file_value(key: &str) -> Option<String> {
    let config_path = load_config_file().ok()?;
    let toml_content = std::fs::read_to_string(&config_path).ok()?;
    let config = toml::from_str::<toml::Value>(&toml_content).ok()?;
    config.get(key).and_then(|v| v.as_str()).map(String::from)
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/medform/config.toml first, then /etc/medform/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("medform").join("config.toml"));
        let system_config = PathBuf::from("/etc/medform/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("medform").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", config_path)))
    }
}

/// Get OS-dependent default data folder path
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("medform"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/medform"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("medform"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/medform"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("medform"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\medform"))
    } else {
        PathBuf::from("./medform_data")
    }
}
