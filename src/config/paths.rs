//! Standard host configuration paths

use std::path::{Path, PathBuf};

/// Cloud configuration directory
pub const CONFIG_DIR: &str = "/etc/cloud";

/// Host configuration locations
#[derive(Debug, Clone)]
pub struct CloudPaths {
    /// Config directory (default: /etc/cloud)
    pub config: PathBuf,
}

impl Default for CloudPaths {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudPaths {
    /// Create with default paths
    pub fn new() -> Self {
        Self {
            config: PathBuf::from(CONFIG_DIR),
        }
    }

    /// Create with a custom config directory (useful for testing)
    pub fn with_config_dir(config: impl AsRef<Path>) -> Self {
        Self {
            config: config.as_ref().to_path_buf(),
        }
    }

    /// /etc/cloud/cloud.cfg - Main config file
    pub fn main_config(&self) -> PathBuf {
        self.config.join("cloud.cfg")
    }

    /// /etc/cloud/cloud.cfg.d - Drop-in config directory
    pub fn config_d(&self) -> PathBuf {
        self.config.join("cloud.cfg.d")
    }
}
