//! CLI configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/insdraw/config.toml`
//! - Windows: `%APPDATA%/insdraw/config.toml`

use std::path::{Path, PathBuf};

use insdraw_draw::DrawSettings;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path or name of the adb executable.
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// Timeout for device queries in seconds.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Wait for a device when none is attached instead of failing.
    #[serde(default = "default_true")]
    pub auto_detect: bool,

    /// Image pipeline and delivery tuning.
    #[serde(default)]
    pub draw: DrawSettings,
}

fn default_adb_path() -> String {
    "adb".into()
}

fn default_query_timeout_secs() -> u64 {
    insdraw_adb::DEFAULT_QUERY_TIMEOUT.as_secs()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            query_timeout_secs: default_query_timeout_secs(),
            auto_detect: default_true(),
            draw: DrawSettings::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `path` (the platform default when `None`),
    /// creating it with defaults if missing.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("insdraw").join("config.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("insdraw")
            .join("config.toml"))
    }
}
