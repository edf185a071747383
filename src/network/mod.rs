//! Host network interfaces
//!
//! Maps the MAC addresses the host can see to local interface names, and
//! defines the network config v1 output in [`v1`].

pub mod v1;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, trace};

use crate::CloudInitError;

/// Default sysfs directory listing network interfaces
pub const SYSFS_NET_DIR: &str = "/sys/class/net";

const ZERO_MAC: &str = "00:00:00:00:00:00";

/// MAC address (lower-case, colon separated) to local interface name
pub type HostInterfaceMap = BTreeMap<String, String>;

/// Canonical form of a MAC address used as a map key
pub fn canonical_mac(mac: &str) -> String {
    mac.trim().to_ascii_lowercase()
}

/// Source of the host's interface inventory
#[async_trait]
pub trait InterfaceEnumerator: Send + Sync {
    /// Enumerate interfaces keyed by canonical MAC address
    async fn interfaces_by_mac(&self) -> Result<HostInterfaceMap, CloudInitError>;
}

/// Reads interfaces from sysfs (`/sys/class/net/<name>/address`)
#[derive(Debug, Clone)]
pub struct SysfsInterfaces {
    root: PathBuf,
}

impl SysfsInterfaces {
    pub fn new() -> Self {
        Self::with_root(SYSFS_NET_DIR)
    }

    /// Read from a custom directory (for testing)
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl Default for SysfsInterfaces {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InterfaceEnumerator for SysfsInterfaces {
    async fn interfaces_by_mac(&self) -> Result<HostInterfaceMap, CloudInitError> {
        let mut by_mac = HostInterfaceMap::new();

        if !self.root.exists() {
            debug!("No interface directory at {}", self.root.display());
            return Ok(by_mac);
        }

        let mut names = Vec::new();
        let mut read_dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        for name in names {
            if name == "lo" {
                continue;
            }

            let address = match fs::read_to_string(self.root.join(&name).join("address")).await {
                Ok(address) => canonical_mac(&address),
                Err(e) => {
                    trace!("Skipping {}: {}", name, e);
                    continue;
                }
            };

            if address.is_empty() || address == ZERO_MAC {
                continue;
            }

            if let Some(existing) = by_mac.get(&address) {
                return Err(CloudInitError::InvalidData(format!(
                    "duplicate mac {} found on {} and {}",
                    address, existing, name
                )));
            }

            by_mac.insert(address, name);
        }

        debug!("nic mapping: {:?}", by_mac);
        Ok(by_mac)
    }
}
