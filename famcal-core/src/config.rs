//! Global famcal configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::grid::ViewMode;

static DEFAULT_API_URL: &str = "http://localhost:3001/api";
static DEFAULT_SESSION_FILE: &str = "~/.config/famcal/session.toml";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_EVENTS_PER_CELL: usize = 2;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_events_per_cell() -> usize {
    DEFAULT_MAX_EVENTS_PER_CELL
}

/// Configuration at ~/.config/famcal/config.toml, overridable with
/// `FAMCAL_*` environment variables (e.g. `FAMCAL_API_URL`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FamcalConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub default_view: ViewMode,

    /// Events listed per month cell before collapsing into "+N more"
    #[serde(default = "default_max_events_per_cell")]
    pub max_events_per_cell: usize,
}

impl Default for FamcalConfig {
    fn default() -> Self {
        FamcalConfig {
            api_url: default_api_url(),
            session_file: default_session_file(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_view: ViewMode::default(),
            max_events_per_cell: DEFAULT_MAX_EVENTS_PER_CELL,
        }
    }
}

impl FamcalConfig {
    pub fn config_path() -> CoreResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CoreError::Config("Could not determine config directory".into()))?
            .join("famcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented-out default on first run)
    /// and apply environment overrides.
    pub fn load() -> CoreResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CoreResult<Self> {
        let config: FamcalConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("FAMCAL").try_parsing(true))
            .build()
            .map_err(|e| CoreError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        tracing::debug!(api_url = %config.api_url, "loaded config from {}", path.display());
        Ok(config)
    }

    /// Session file path with `~` expanded.
    pub fn session_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.session_file.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    /// API base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CoreResult<()> {
        let contents = format!(
            "\
# famcal configuration

# Base URL of the family calendar API:
# api_url = \"{}\"

# Where the login session is stored:
# session_file = \"{}\"

# Request timeout in seconds:
# timeout_secs = {}

# View shown by `famcal calendar` (month, week or day):
# default_view = \"month\"

# Events listed per month cell before \"+N more\":
# max_events_per_cell = {}
",
            DEFAULT_API_URL, DEFAULT_SESSION_FILE, DEFAULT_TIMEOUT_SECS, DEFAULT_MAX_EVENTS_PER_CELL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CoreError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commented_default_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("famcal").join("config.toml");

        FamcalConfig::create_default_config(&path).unwrap();
        let config = FamcalConfig::load_from(&path).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.default_view, ViewMode::Month);
        assert_eq!(config.max_events_per_cell, DEFAULT_MAX_EVENTS_PER_CELL);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://calendar.example.com/api/\"\ndefault_view = \"week\"\n",
        )
        .unwrap();

        let config = FamcalConfig::load_from(&path).unwrap();
        assert_eq!(config.api_base(), "https://calendar.example.com/api");
        assert_eq!(config.default_view, ViewMode::Week);
    }

    #[test]
    fn session_path_expands_tilde() {
        let config = FamcalConfig::default();
        assert!(!config.session_path().to_string_lossy().starts_with('~'));
    }
}
