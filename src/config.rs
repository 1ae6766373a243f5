use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geotag::Method;

/// Runtime configuration for photoanon.
///
/// Command-line flags override the values loaded from file.
///
/// ```rust,no_run
/// use photoanon::config::Config;
/// use photoanon::geotag::Method;
///
/// let mut config = Config::load(Some("photoanon.json".as_ref())).unwrap();
/// config.method = Method::Remove;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How unsafe tags are treated.
    pub method: Method,
    /// Prefix for anonymized copies when originals are preserved.
    pub preserve_prefix: String,
    /// Directory holding `safe_tags.txt` and `unsafe_tags.txt`. The built-in
    /// lists are used when unset.
    pub tags_dir: Option<PathBuf>,
    /// If `true`, report what would change without modifying any files.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: Method::Randomize,
            preserve_prefix: "anon_".to_string(),
            tags_dir: None,
            dry_run: false,
        }
    }
}

impl Config {
    /// Resolve the config file path, next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("photoanon.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}
