//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! gitsync has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level settings
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GITSYNC_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitsync/config.toml`
//! 3. `~/.gitsync/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use gitsync::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! println!("Publishing to: {}", config.remote());
//! println!("Confirm force push: {}", config.confirm_force_push());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sync::RepoSettings;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply defaults; repo values override global ones.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `work_dir` is provided, also loads repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// fail validation. Missing config files are not an error.
    pub fn load(work_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = match Self::global_candidates()
            .into_iter()
            .find(|path| path.exists())
        {
            Some(path) => (Self::read_toml::<GlobalConfig>(&path)?, Some(path)),
            None => (GlobalConfig::default(), None),
        };

        let (repo, repo_path) = match work_dir.map(Self::repo_config_path) {
            Some(path) if path.exists() => {
                (Some(Self::read_toml::<RepoConfig>(&path)?), Some(path))
            }
            _ => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// Global config files in search order.
    fn global_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("GITSYNC_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("gitsync/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".gitsync/config.toml"));
        }
        candidates
    }

    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for repo config.
    ///
    /// Returns `.git/gitsync/config.toml` relative to the working directory.
    pub fn repo_config_path(work_dir: &Path) -> PathBuf {
        work_dir.join(".git/gitsync/config.toml")
    }

    /// Write repo config atomically.
    pub fn write_repo(work_dir: &Path, config: &RepoConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::repo_config_path(work_dir);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write to a sibling temp file, sync, then rename over the target.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        let write_err = |path: &Path, source: std::io::Error| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(path, e))?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| write_err(&temp_path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| write_err(&temp_path, e))?;
        file.sync_all().map_err(|e| write_err(&temp_path, e))?;

        fs::rename(&temp_path, path).map_err(|e| write_err(path, e))?;
        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Remote used for publishing.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.remote.as_deref())
            .unwrap_or("origin")
    }

    /// Whether untracked files count as changed.
    ///
    /// Defaults to `true`.
    pub fn count_untracked(&self) -> bool {
        self.repo
            .as_ref()
            .and_then(|r| r.count_untracked)
            .unwrap_or(true)
    }

    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Defaults to `true` if not configured.
    pub fn confirm_force_push(&self) -> bool {
        self.global.confirm_force_push.unwrap_or(true)
    }

    /// Git executable, defaulting to `git` on `PATH`.
    pub fn git_binary(&self) -> &str {
        self.global.git_binary.as_deref().unwrap_or("git")
    }

    /// Settings the synchronization core needs from this config.
    pub fn repo_settings(&self) -> RepoSettings {
        RepoSettings {
            default_remote: self.remote().to_string(),
            count_untracked: self.count_untracked(),
        }
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
