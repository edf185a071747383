//! Datasource implementations
//!
//! Datasources provide instance metadata and network configuration from the
//! cloud provider.

pub mod vultr;

use async_trait::async_trait;

use crate::config::VultrSettings;
use crate::network::v1::NetworkConfigV1;
use crate::{CloudInitError, InstanceMetadata};

/// Trait for cloud metadata datasources
#[async_trait]
pub trait Datasource: Send + Sync {
    /// Name of this datasource (e.g., "Vultr")
    fn name(&self) -> &'static str;

    /// Check if this datasource is available
    ///
    /// This should be a quick, local check (e.g., DMI data).
    async fn is_available(&self) -> bool;

    /// Fetch instance metadata from this datasource
    async fn get_metadata(&self) -> Result<InstanceMetadata, CloudInitError>;

    /// Network configuration derived from the metadata, if the datasource
    /// provides one
    async fn network_config(&self) -> Result<Option<NetworkConfigV1>, CloudInitError>;
}

/// Detect and return the appropriate datasource for this instance
pub async fn detect_datasource(
    settings: VultrSettings,
) -> Result<Box<dyn Datasource>, CloudInitError> {
    let datasources: Vec<Box<dyn Datasource>> = vec![Box::new(vultr::Vultr::new(settings)?)];

    for ds in datasources {
        if ds.is_available().await {
            tracing::info!("Detected datasource: {}", ds.name());
            return Ok(ds);
        }
    }

    Err(CloudInitError::NoDatasource)
}
