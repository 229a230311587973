//! Cross-platform application paths

use std::path::{Path, PathBuf};

use crate::error::{DaemonError, Result};

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir().ok_or(DaemonError::NoConfigDir)?;
        Ok(Self {
            config_dir: base.join("hopfield"),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}
