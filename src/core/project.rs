//! Project discovery and structure
//!
//! A project is any directory holding a `.nutri/` folder. The folder keeps
//! the project config and, unless configured otherwise, the entity store.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".nutri";

/// Default store file inside the project directory
pub const STORE_FILE: &str = "store.db";

/// Represents a nutri project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .nutri/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_structure(root)
    }

    /// Initialize even if .nutri/ exists; the config file is rewritten
    /// but an existing store is left untouched
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_structure(root)
    }

    fn write_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# nutri project configuration

# Owner id stamped on records created by imports
# owner: 1

# Entity store location, relative to the project root
# store: .nutri/store.db

# Treat the first CSV row as a header and skip it
# skip_header: false
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .nutri configuration directory
    pub fn nutri_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Default location of the entity store
    pub fn store_path(&self) -> PathBuf {
        self.nutri_dir().join(STORE_FILE)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a nutri project (searched from {searched_from:?}). Run 'nutri init' to create one, or pass --store.")]
    NotFound { searched_from: PathBuf },

    #[error("nutri project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
