//! Host configuration loader
//!
//! Loads and merges host configs from standard locations.

use super::{CloudPaths, VultrSettings, merge};
use crate::CloudInitError;
use serde_yaml::Value;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Load and merge all host configs from standard locations
pub async fn load_system_config(paths: &CloudPaths) -> Result<Value, CloudInitError> {
    let mut documents = Vec::new();

    // 1. Load base config (/etc/cloud/cloud.cfg)
    if let Some(document) = load_config_file(paths.main_config()).await? {
        debug!("Loaded base config from {}", paths.main_config().display());
        documents.push(document);
    }

    // 2. Load drop-in configs (/etc/cloud/cloud.cfg.d/*.cfg)
    let dropins = load_dropin_configs(paths.config_d()).await?;
    documents.extend(dropins);

    Ok(merge::merge_all(&documents))
}

/// Load host configs and extract the Vultr datasource settings
pub async fn load_settings(paths: &CloudPaths) -> Result<VultrSettings, CloudInitError> {
    let system = load_system_config(paths).await?;
    VultrSettings::from_system_config(&system)
}

/// Load a YAML document from a single file
async fn load_config_file(path: impl AsRef<Path>) -> Result<Option<Value>, CloudInitError> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;

    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Null) => Ok(None),
        Ok(document) => Ok(Some(document)),
        Err(e) => {
            warn!("Failed to parse {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Load all drop-in configs from a directory (sorted alphabetically)
async fn load_dropin_configs(dir: impl AsRef<Path>) -> Result<Vec<Value>, CloudInitError> {
    let dir = dir.as_ref();

    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();

        // Only process .cfg files
        if path.extension().is_some_and(|e| e == "cfg") {
            entries.push(path);
        }
    }

    entries.sort();

    let mut documents = Vec::new();
    for path in entries {
        if let Some(document) = load_config_file(&path).await? {
            debug!("Loaded drop-in config from {}", path.display());
            documents.push(document);
        }
    }

    info!("Loaded {} drop-in configs", documents.len());
    Ok(documents)
}
