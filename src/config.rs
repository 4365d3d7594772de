use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use eyre::{Result, WrapErr};
use log::LevelFilter;
use serde::Deserialize;

const APPLICATION: &str = "dockmate";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "dockmate.log";

/// Settings read from `<config dir>/dockmate/config.json`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Input poll interval. Values below 10 ms are raised to 10 ms.
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            tick_rate_ms: 200,
        }
    }
}

impl Config {
    /// Loads the user's config file, or the defaults when there is none.
    pub fn load() -> Result<Self> {
        match project_dirs() {
            Some(dirs) => Self::from_file(&dirs.config_dir().join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        Self::parse(&raw).wrap_err_with(|| format!("parsing {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Unknown level names fall back to `info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn log_path(&self) -> PathBuf {
        match (&self.log_file, project_dirs()) {
            (Some(path), _) => path.clone(),
            (None, Some(dirs)) => dirs.data_local_dir().join(LOG_FILE),
            (None, None) => std::env::temp_dir().join(LOG_FILE),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Config::parse("{}").expect("valid"), Config::default());
    }

    #[test]
    fn reads_known_keys() {
        let config = Config::parse(
            r#"{"log_level": "debug", "log_file": "/tmp/d.log", "tick_rate_ms": 50}"#,
        )
        .expect("valid");
        assert_eq!(config.level_filter(), LevelFilter::Debug);
        assert_eq!(config.log_path(), PathBuf::from("/tmp/d.log"));
        assert_eq!(config.tick_rate(), Duration::from_millis(50));
    }

    #[test]
    fn tick_rate_has_a_floor() {
        let config = Config::parse(r#"{"tick_rate_ms": 0}"#).expect("valid");
        assert_eq!(config.tick_rate(), Duration::from_millis(10));
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        let config = Config::parse(r#"{"log_level": "chatty"}"#).expect("valid");
        assert_eq!(config.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::parse("{ not json").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("dockmate-does-not-exist.json");
        assert_eq!(Config::from_file(&path).expect("defaults"), Config::default());
    }
}
