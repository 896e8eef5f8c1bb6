//! Application configuration loaded from defaults, a TOML file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "cardsheet";
/// Prefix for environment overrides, e.g. `CARDSHEET_OUTPUT_DIR`.
pub const ENV_PREFIX: &str = "CARDSHEET";

const DEFAULT_GAMES_DIR: &str = "Juegos";
const DEFAULT_OUTPUT_DIR: &str = "documentos";

const DEFAULT_CONFIG: &str = r#"# cardsheet configuration

# Folder holding one sub-folder of card images per game.
games_dir = "Juegos"

# Folder generated documents are written to.
output_dir = "documentos"
"#;

/// Runtime settings shared by every frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog root scanned for game folders.
    pub games_dir: PathBuf,
    /// Destination for generated documents.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            games_dir: PathBuf::from(DEFAULT_GAMES_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl AppConfig {
    /// Load from the default config file location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from `path`; a missing file falls back to the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .set_default("games_dir", DEFAULT_GAMES_DIR)?
            .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Create both configured directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.games_dir, &self.output_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

/// Default location of `config.toml`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join("config.toml")
}

/// Write a commented default config file unless one already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write config {}", path.display()))
}
