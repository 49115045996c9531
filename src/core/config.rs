//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Owner id used when nothing else is configured
pub const DEFAULT_OWNER: u32 = 1;

/// nutri configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Owner id for records created by imports
    pub owner: Option<u32>,

    /// Store location (relative paths are resolved against the project root)
    pub store: Option<PathBuf>,

    /// Skip the first row of every imported file
    pub skip_header: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/nutri/config.yaml)
        if let Some(global) = Self::global_config_path().and_then(|p| Self::read_file(&p)) {
            config.merge(global);
        }

        // 3. Project config (.nutri/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) =
                Self::read_file(&project.nutri_dir().join("config.yaml"))
            {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Some(owner) = std::env::var("NUTRI_OWNER")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            config.owner = Some(owner);
        }

        config
    }

    /// Parse a YAML config file; unreadable or invalid files are ignored
    fn read_file(path: &Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring invalid config: {}", e);
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "nutri")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.owner.is_some() {
            self.owner = other.owner;
        }
        if other.store.is_some() {
            self.store = other.store;
        }
        if other.skip_header.is_some() {
            self.skip_header = other.skip_header;
        }
    }

    pub fn owner(&self) -> u32 {
        self.owner.unwrap_or(DEFAULT_OWNER)
    }

    pub fn skip_header(&self) -> bool {
        self.skip_header.unwrap_or(false)
    }

    /// Store location: configured path, else the project's default store
    pub fn store_path(&self, project: Option<&Project>) -> Option<PathBuf> {
        match (&self.store, project) {
            (Some(path), Some(project)) if path.is_relative() => Some(project.root().join(path)),
            (Some(path), _) => Some(path.clone()),
            (None, Some(project)) => Some(project.store_path()),
            (None, None) => None,
        }
    }
}
