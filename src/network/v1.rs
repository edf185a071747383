//! Network config v1 output
//!
//! The list-based network configuration format handed to the host's network
//! renderer. Only the item types this datasource emits are modelled.

use serde::{Deserialize, Serialize};

use crate::CloudInitError;

/// Network config v1 format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfigV1 {
    /// Version (always 1)
    pub version: u8,
    /// Network configuration items, in emission order
    #[serde(default)]
    pub config: Vec<ConfigItem>,
}

/// Individual configuration item in v1 format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConfigItem {
    /// Physical network interface
    #[serde(rename = "physical")]
    Physical(PhysicalConfig),
    /// Nameserver configuration
    #[serde(rename = "nameserver")]
    Nameserver(NameserverConfigV1),
}

/// Physical interface configuration (v1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalConfig {
    /// MAC address for matching
    pub mac_address: String,
    /// Interface name
    pub name: String,
    /// Subnets (IP configuration)
    #[serde(default)]
    pub subnets: Vec<SubnetConfig>,
}

/// Subnet/IP configuration (v1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConfig {
    /// Subnet type: dhcp, static, ...
    #[serde(rename = "type")]
    pub subnet_type: String,
    /// Activation mode: auto, hotplug, manual
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
}

impl SubnetConfig {
    /// DHCP subnet brought up automatically at boot
    pub fn dhcp_auto() -> Self {
        Self {
            subnet_type: "dhcp".to_string(),
            control: Some("auto".to_string()),
        }
    }
}

/// Nameserver configuration (v1)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameserverConfigV1 {
    /// DNS server addresses
    #[serde(default)]
    pub address: Vec<String>,
}

impl NetworkConfigV1 {
    pub const VERSION: u8 = 1;

    /// Physical entries, in order
    pub fn physical(&self) -> impl Iterator<Item = &PhysicalConfig> {
        self.config.iter().filter_map(|item| match item {
            ConfigItem::Physical(phys) => Some(phys),
            _ => None,
        })
    }

    /// Serialize as JSON
    pub fn to_json(&self) -> Result<String, CloudInitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> Result<String, CloudInitError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
