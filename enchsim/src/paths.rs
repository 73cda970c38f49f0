//! Cross-platform application paths

use std::fs;
use std::path::{Path, PathBuf};

use crate::SimError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, SimError> {
        let config_dir = dirs::config_dir()
            .ok_or(SimError::NoAppDir("config"))?
            .join("enchcrack");
        let data_dir = dirs::data_dir()
            .ok_or(SimError::NoAppDir("data"))?
            .join("enchcrack");
        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Paths rooted under one directory, for tests and portable installs.
    pub fn rooted(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("enchsim.json")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join("last_session.json")
    }

    /// Ensure the data directory exists before writing into it.
    pub fn ensure_data_dir(&self) -> Result<(), SimError> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
