//! vultr-cloud-init library
//!
//! Early-boot datasource for Vultr instances: retrieves the instance metadata
//! document from the link-local metadata service and turns its interface list
//! into a network config v1 description for the host's network renderer.
//!
//! # Design Principles
//!
//! - **Safety First**: No unsafe code (`#![forbid(unsafe_code)]`)
//! - **Bounded Boot Delay**: Metadata retries are attempt-bounded
//! - **No Partial Results**: Metadata and network config are complete or an error

pub mod config;
pub mod datasources;
pub mod network;

mod error;

pub use error::CloudInitError;

use serde::Serialize;

use crate::config::RegionLookup;
use crate::datasources::vultr::{InterfaceDescriptor, MetadataDocument};

/// Instance metadata retrieved from datasource
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstanceMetadata {
    pub instance_id: String,
    pub local_hostname: String,
    /// Provider interface list; `None` when the provider sent none
    pub interfaces: Option<Vec<InterfaceDescriptor>>,
    pub public_keys: Vec<String>,
    pub availability_zone: String,
    pub cloud_name: String,
    pub platform: String,
}

impl InstanceMetadata {
    /// Project a Vultr metadata document
    pub fn from_vultr(document: MetadataDocument, lookup: RegionLookup) -> Self {
        let availability_zone = document.availability_zone(lookup);

        Self {
            instance_id: document.instanceid,
            local_hostname: document.hostname,
            interfaces: document.interfaces,
            public_keys: document.public_keys,
            availability_zone,
            cloud_name: "vultr".to_string(),
            platform: "vultr".to_string(),
        }
    }
}
