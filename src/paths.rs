//! Where geoforge keeps its config file and logs.
//!
//! Resolution order:
//! 1. `GEOFORGE_HOME`, when set, holds everything.
//! 2. Development builds (`cargo run`, debug assertions) use the working directory.
//! 3. Otherwise the platform directories from `dirs`, e.g. `~/.config/geoforge/`
//!    for config and `~/.local/share/geoforge/` for logs on Linux.

use std::path::PathBuf;

const APP_DIR: &str = "geoforge";
const HOME_VAR: &str = "GEOFORGE_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Config,
    Data,
}

/// True under `cargo run` or in any debug build
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

fn home_override() -> Option<PathBuf> {
    std::env::var_os(HOME_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn base_dir(kind: Kind) -> Option<PathBuf> {
    if let Some(home) = home_override() {
        return Some(home);
    }
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }
    let platform = match kind {
        Kind::Config => dirs::config_dir(),
        Kind::Data => dirs::data_dir(),
    };
    platform.map(|dir| dir.join(APP_DIR))
}

pub fn config_dir() -> Option<PathBuf> {
    base_dir(Kind::Config)
}

pub fn data_dir() -> Option<PathBuf> {
    base_dir(Kind::Data)
}

/// Editor config read at startup; falls back to a relative `config.json`
pub fn config_file() -> PathBuf {
    config_dir().unwrap_or_default().join("config.json")
}

pub fn logs_dir() -> PathBuf {
    data_dir().unwrap_or_default().join("logs")
}

/// Create the config and log directories if they are missing
pub fn ensure_directories() -> std::io::Result<()> {
    if let Some(config) = config_dir() {
        std::fs::create_dir_all(config)?;
    }
    std::fs::create_dir_all(logs_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_name() {
        assert_eq!(
            config_file().file_name().and_then(|name| name.to_str()),
            Some("config.json")
        );
    }

    #[test]
    fn test_logs_live_under_data_dir() {
        let data = data_dir().unwrap();
        assert_eq!(logs_dir(), data.join("logs"));
    }

    #[test]
    fn test_debug_build_is_dev_mode() {
        assert!(is_dev_mode());
        if home_override().is_none() {
            assert_eq!(config_dir(), Some(PathBuf::from(".")));
        }
    }
}
