//! Vultr datasource
//!
//! Fetches metadata from the Vultr metadata service and derives the network
//! configuration from it.
//! <https://www.vultr.com/metadata/>

pub mod metadata;
pub mod network;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::info;

use super::Datasource;
use crate::config::VultrSettings;
use crate::network::v1::NetworkConfigV1;
use crate::network::{InterfaceEnumerator, SysfsInterfaces};
use crate::{CloudInitError, InstanceMetadata};

pub use metadata::{InterfaceDescriptor, MetadataDocument, MetadataFetcher};
pub use network::build_network_config;

/// DMI directory exposing the system vendor
const DMI_DIR: &str = "/sys/class/dmi/id";

/// Vultr datasource
///
/// Owns the per-boot state: metadata is fetched once and the network config
/// is built once, on first request. A failed build is retried on the next
/// call.
pub struct Vultr {
    settings: VultrSettings,
    fetcher: MetadataFetcher,
    interfaces: Box<dyn InterfaceEnumerator>,
    dmi_dir: PathBuf,
    metadata: OnceCell<InstanceMetadata>,
    network_config: OnceCell<NetworkConfigV1>,
}

impl Vultr {
    /// Create with host interfaces read from sysfs
    pub fn new(settings: VultrSettings) -> Result<Self, CloudInitError> {
        Self::with_interfaces(settings, Box::new(SysfsInterfaces::new()))
    }

    /// Create with a custom interface source
    pub fn with_interfaces(
        settings: VultrSettings,
        interfaces: Box<dyn InterfaceEnumerator>,
    ) -> Result<Self, CloudInitError> {
        let fetcher = MetadataFetcher::new(&settings)?;

        Ok(Self {
            settings,
            fetcher,
            interfaces,
            dmi_dir: PathBuf::from(DMI_DIR),
            metadata: OnceCell::new(),
            network_config: OnceCell::new(),
        })
    }

    /// Read DMI data from a custom directory (for testing)
    pub fn with_dmi_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dmi_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn settings(&self) -> &VultrSettings {
        &self.settings
    }

    /// Check DMI data for the Vultr vendor string
    async fn check_dmi_data(&self) -> bool {
        match tokio::fs::read_to_string(self.dmi_dir.join("sys_vendor")).await {
            Ok(content) => content.to_lowercase().contains("vultr"),
            Err(_) => false,
        }
    }

    async fn load_metadata(&self) -> Result<InstanceMetadata, CloudInitError> {
        let document = self.fetcher.fetch().await?;
        Ok(InstanceMetadata::from_vultr(document, self.settings.region_lookup))
    }

    async fn generate_network_config(&self) -> Result<NetworkConfigV1, CloudInitError> {
        let metadata = self.metadata().await?;
        let host_interfaces = self.interfaces.interfaces_by_mac().await?;
        let config = build_network_config(metadata, &host_interfaces, &self.settings.dns_servers)?;
        info!("Generated network configuration for {} interfaces", config.physical().count());
        Ok(config)
    }

    /// Instance metadata, fetched on first use
    pub async fn metadata(&self) -> Result<&InstanceMetadata, CloudInitError> {
        self.metadata.get_or_try_init(|| self.load_metadata()).await
    }

    /// Network configuration, built on first use
    pub async fn network(&self) -> Result<&NetworkConfigV1, CloudInitError> {
        self.network_config
            .get_or_try_init(|| self.generate_network_config())
            .await
    }
}

#[async_trait]
impl Datasource for Vultr {
    fn name(&self) -> &'static str {
        "Vultr"
    }

    async fn is_available(&self) -> bool {
        self.check_dmi_data().await
    }

    async fn get_metadata(&self) -> Result<InstanceMetadata, CloudInitError> {
        self.metadata().await.cloned()
    }

    async fn network_config(&self) -> Result<Option<NetworkConfigV1>, CloudInitError> {
        self.network().await.cloned().map(Some)
    }
}
