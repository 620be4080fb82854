use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::glottolog::GlottologCatalogue;

/// Configuration for the MultiTree converter.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (MULTITREE_* prefix)
/// 3. Config file (~/.config/multitree/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the MultiTree XML files.
    ///
    /// Can be set via:
    /// - CLI: --raw /path/to/raw
    /// - ENV: MULTITREE_RAW_DIR
    /// - Config: raw_dir = "/path/to/raw"
    /// - Default: raw
    pub raw_dir: PathBuf,

    /// Directory holding `sources.csv` and `sources.bib`.
    pub etc_dir: PathBuf,

    /// Output directory of the CLDF dataset.
    pub cldf_dir: PathBuf,

    /// Glottolog repository checkout or JSON snapshot.
    ///
    /// Without it every language is written unresolved.
    pub glottolog: Option<PathBuf>,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw"),
            etc_dir: PathBuf::from("etc"),
            cldf_dir: PathBuf::from("cldf"),
            glottolog: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logger settings, handed to the binary's logger setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of error, warn, info, debug, trace.
    pub level: String,
    pub coloured: bool,
    pub report_caller: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            coloured: true,
            report_caller: false,
        }
    }
}

/// Command-line values that take precedence over the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub raw_dir: Option<PathBuf>,
    pub etc_dir: Option<PathBuf>,
    pub cldf_dir: Option<PathBuf>,
    pub glottolog: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/multitree/config.toml
    /// Reads environment variables with MULTITREE_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific file (if it exists) and the
    /// environment.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("multitree");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;
        Ok(config)
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(raw_dir) = overrides.raw_dir {
            self.raw_dir = raw_dir;
        }
        if let Some(etc_dir) = overrides.etc_dir {
            self.etc_dir = etc_dir;
        }
        if let Some(cldf_dir) = overrides.cldf_dir {
            self.cldf_dir = cldf_dir;
        }
        if let Some(glottolog) = overrides.glottolog {
            self.glottolog = Some(glottolog);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }

    /// The configured languoid catalogue, if any.
    #[must_use]
    pub fn catalogue(&self) -> Option<GlottologCatalogue> {
        self.glottolog.as_deref().map(GlottologCatalogue::from_path)
    }

    #[must_use]
    pub fn citations_path(&self) -> PathBuf {
        self.etc_dir.join("sources.csv")
    }

    #[must_use]
    pub fn bibliography_path(&self) -> PathBuf {
        self.etc_dir.join("sources.bib")
    }

    /// Render the effective configuration as TOML-like text.
    #[must_use]
    pub fn display(&self) -> String {
        let glottolog = self
            .glottolog
            .as_ref()
            .map_or_else(|| "# not set".to_string(), |p| format!("{:?}", p.display().to_string()));
        format!(
            "raw_dir = {:?}\n\
             etc_dir = {:?}\n\
             cldf_dir = {:?}\n\
             glottolog = {glottolog}\n\
             \n\
             [logging]\n\
             level = {:?}\n\
             coloured = {}\n\
             report_caller = {}\n",
            self.raw_dir.display().to_string(),
            self.etc_dir.display().to_string(),
            self.cldf_dir.display().to_string(),
            self.logging.level,
            self.logging.coloured,
            self.logging.report_caller,
        )
    }
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/multitree/config.toml
/// - macOS: ~/Library/Application Support/multitree/config.toml
/// - Windows: %APPDATA%\multitree\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("multitree")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# MultiTree CLDF Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (MULTITREE_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory with the MultiTree XML tree files (<number>.xml)
#
# Can also be set via:
# - CLI: multitree makecldf --raw /path/to/raw
# - Environment: MULTITREE_RAW_DIR=/path/to/raw
raw_dir = "raw"

# Directory with sources.csv (citation -> source mapping) and sources.bib
etc_dir = "etc"

# Output directory for the CLDF dataset
cldf_dir = "cldf"

# Glottolog catalogue used to link languages to Glottocodes.
# Either a clone of https://github.com/glottolog/glottolog
# or a JSON snapshot file (*.json).
#
# Without it, languages are written without Glottolog data.
#glottolog = "/path/to/glottolog"

[logging]
# error, warn, info, debug or trace
level = "warn"
coloured = true
report_caller = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    ensure_config_file_at(&config_file_path())
}

pub fn ensure_config_file_at(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
