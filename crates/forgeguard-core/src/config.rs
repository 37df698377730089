//! Configuration management for ForgeGuard.
//!
//! Loads configuration from `${FORGEGUARD_HOME}/config.toml` with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Backend URL used when neither env nor config provide one.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Environment variable overriding the backend URL.
pub const API_URL_ENV: &str = "FORGEGUARD_API_URL";

pub mod paths {
    //! Path resolution for ForgeGuard configuration and data directories.
    //!
    //! `FORGEGUARD_HOME` resolution order:
    //! 1. `FORGEGUARD_HOME` environment variable (if set)
    //! 2. ~/.config/forgeguard (default)

    use std::path::PathBuf;

    /// Returns the ForgeGuard home directory.
    ///
    /// Checks `FORGEGUARD_HOME` first, falls back to ~/.config/forgeguard,
    /// and finally to a relative `.forgeguard` when no home directory exists.
    pub fn forgeguard_home() -> PathBuf {
        if let Ok(home) = std::env::var("FORGEGUARD_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".forgeguard"),
            |h| h.join(".config").join("forgeguard"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        forgeguard_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        forgeguard_home().join("session.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        forgeguard_home().join("logs")
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive (overridden by `FORGEGUARD_LOG`).
    pub level: String,
    /// Log file name inside `<home>/logs`.
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "forgeguard.log".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analysis backend
    pub api_url: String,
    /// Where downloads (archives, result images) are written. Defaults to
    /// the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            download_dir: None,
            log: LogConfig::default(),
        }
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from `default_config.toml` at compile time.
/// To update, run `cargo xtask update-default-config`.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Recursively merges items from source table into target table.
fn expand_home(dir: &str) -> PathBuf {
    let rest = match dir.strip_prefix('~') {
        Some("") => "",
        Some(rest) => match rest.strip_prefix(['/', '\\']) {
            Some(rest) => rest,
            None => return PathBuf::from(dir),
        },
        None => return PathBuf::from(dir),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(dir),
    }
}

fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

impl Config {
    /// Loads the config from the default location.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads the config from `path`, returning defaults when it is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the backend URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid absolute URL.
    pub fn resolve_api_url(&self) -> Result<String> {
        self.resolve_api_url_with(None)
    }

    /// Like [`Config::resolve_api_url`], with an explicit override (e.g. a
    /// command-line flag) taking precedence over everything else.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid absolute URL.
    pub fn resolve_api_url_with(&self, explicit: Option<&str>) -> Result<String> {
        let explicit = explicit.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        let from_env = std::env::var(API_URL_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let from_config = Some(self.api_url.trim().to_string()).filter(|v| !v.is_empty());

        let chosen = explicit
            .or(from_env)
            .or(from_config)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        url::Url::parse(&chosen).with_context(|| format!("Invalid API URL: {chosen}"))?;
        Ok(chosen.trim_end_matches('/').to_string())
    }

    /// Directory downloads are written to. A leading `~` is the home
    /// directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map_or_else(|| PathBuf::from("."), expand_home)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    ///
    /// # Errors
    /// Returns an error if the template or the generated values fail to parse.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}
