//! Layered application configuration.
//!
//! Settings are merged with `figment` in increasing priority:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config FILE`, or `config.toml` in the platform config dir)
//! 3. `DISTINCTPICS_*` environment variables (e.g. `DISTINCTPICS_IO_THREADS=8`)
//!
//! CLI flags are applied on top by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DISTINCTPICS_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads comparing size groups.
    pub io_threads: usize,
    /// Abort the scan on the first unreadable file during comparison.
    pub strict: bool,
    /// Skip unreadable directories during the walk instead of aborting.
    pub skip_unreadable: bool,
    /// Delete duplicates permanently instead of moving them to the trash.
    pub permanent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            strict: false,
            skip_unreadable: false,
            permanent: false,
        }
    }
}

impl Config {
    /// Load the merged configuration.
    ///
    /// `explicit` must exist when given; the default file is optional.
    ///
    /// # Errors
    ///
    /// Fails if the explicit file is missing, or if any layer holds a value
    /// of the wrong type.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path(),
        };

        let config: Self = Self::figment(path.as_deref())
            .extract()
            .context("Invalid configuration")?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Build the figment for the given file without extracting it.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            log::debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Write the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Fails if the parent directory cannot be created or the file written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(())
    }

    /// Platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "distinctpics").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
