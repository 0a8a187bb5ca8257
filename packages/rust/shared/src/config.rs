//! Application configuration for EduTrack.
//!
//! User config lives at `~/.edutrack/edutrack.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EdutrackError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "edutrack.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".edutrack";

// ---------------------------------------------------------------------------
// Config structs (matching edutrack.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database location.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Base URLs for the government record source.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Dashboard statistics settings.
    #[serde(default)]
    pub stats: StatsConfig,
}

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file. `~/` is expanded.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.edutrack/edutrack.db".into()
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_lok_sabha")]
    pub lok_sabha: String,
    #[serde(default = "default_rajya_sabha")]
    pub rajya_sabha: String,
    #[serde(default = "default_upsc")]
    pub upsc: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            lok_sabha: default_lok_sabha(),
            rajya_sabha: default_rajya_sabha(),
            upsc: default_upsc(),
        }
    }
}

fn default_lok_sabha() -> String {
    "https://loksabha.nic.in".into()
}
fn default_rajya_sabha() -> String {
    "https://rajyasabha.nic.in".into()
}
fn default_upsc() -> String {
    "https://upsc.gov.in".into()
}

/// `[stats]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Education locations counted as "western" by the dashboard statistics.
    #[serde(default = "default_western_countries")]
    pub western_countries: Vec<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            western_countries: default_western_countries(),
        }
    }
}

fn default_western_countries() -> Vec<String> {
    ["USA", "UK", "Canada", "Australia", "Germany", "France"]
        .into_iter()
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.edutrack/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EdutrackError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.edutrack/edutrack.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EdutrackError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| EdutrackError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EdutrackError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EdutrackError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EdutrackError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the database path: an explicit override wins over the config value.
/// A leading `~/` is expanded to the home directory.
pub fn resolve_db_path(config: &AppConfig, override_path: Option<&str>) -> Result<PathBuf> {
    let raw = override_path.unwrap_or(&config.database.path);
    if raw.trim().is_empty() {
        return Err(EdutrackError::config("database path is empty"));
    }

    match raw.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| EdutrackError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(raw)),
    }
}
