//! Vultr metadata document and fetcher
//!
//! The endpoint serves a single JSON document (`/v1.json`). The service may not
//! answer yet during early boot, so the fetcher retries a bounded number of
//! times before giving up.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::CloudInitError;
use crate::config::{RegionLookup, VultrSettings};

/// Fallback availability zone when the region cannot be resolved
pub const UNKNOWN_ZONE: &str = "unknown";

/// Parsed `/v1.json` document
///
/// Keys this datasource does not consume are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub instanceid: String,
    pub hostname: String,
    /// `None` when the provider sent no interface data
    #[serde(default)]
    pub interfaces: Option<Vec<InterfaceDescriptor>>,
    #[serde(rename = "public-keys", default)]
    pub public_keys: Vec<String>,
    #[serde(default)]
    pub region: Option<Map<String, Value>>,
}

impl MetadataDocument {
    /// Parse a raw response body
    pub fn from_bytes(body: &[u8]) -> Result<Self, CloudInitError> {
        let text = std::str::from_utf8(body).map_err(|e| {
            CloudInitError::InvalidData(format!("metadata is not valid UTF-8: {}", e))
        })?;
        Ok(serde_json::from_str(text)?)
    }

    /// Availability zone derived from `region`, or `"unknown"`
    pub fn availability_zone(&self, lookup: RegionLookup) -> String {
        self.region
            .as_ref()
            .and_then(|region| region.get(lookup.key()))
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ZONE)
            .to_string()
    }
}

/// One NIC as described by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub mac: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Info>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Info>,
    #[serde(rename = "network-type", default, skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv4Info {
    pub address: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub additional: Vec<Ipv4Additional>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv4Additional {
    pub address: Option<String>,
    pub netmask: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv6Info {
    pub address: Option<String>,
    pub network: Option<String>,
    pub prefix: Option<String>,
    pub additional: Vec<Ipv6Additional>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipv6Additional {
    pub network: Option<String>,
    pub prefix: Option<String>,
}

/// Bounded-retry client for the metadata endpoint
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    client: Client,
    url: String,
    retries: u32,
    wait_retry: std::time::Duration,
}

impl MetadataFetcher {
    pub fn new(settings: &VultrSettings) -> Result<Self, CloudInitError> {
        settings.validate()?;
        let timeout = settings.timeout()?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: settings.metadata_url.clone(),
            retries: settings.retries,
            wait_retry: settings.wait_retry()?,
        })
    }

    /// Endpoint this fetcher reads from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the metadata document
    ///
    /// Makes at most `retries + 1` attempts, pausing `wait_retry` between
    /// them. A response that arrives but does not parse is not retried.
    pub async fn fetch(&self) -> Result<MetadataDocument, CloudInitError> {
        let attempts = self.retries.saturating_add(1);

        for attempt in 1..=attempts {
            debug!("Fetching Vultr metadata from {} (attempt {}/{})", self.url, attempt, attempts);

            match self.try_fetch().await {
                Ok(body) => {
                    let document = MetadataDocument::from_bytes(&body)?;
                    info!("Retrieved Vultr metadata for instance {}", document.instanceid);
                    debug!("Vultr metadata: {:#?}", document);
                    return Ok(document);
                }
                Err(reason) => {
                    warn!("Metadata attempt {}/{} failed: {}", attempt, attempts, reason);
                }
            }

            if attempt < attempts {
                sleep(self.wait_retry).await;
            }
        }

        Err(CloudInitError::metadata_unavailable(&self.url))
    }

    /// A single GET; any non-success outcome is reported as a retryable reason
    async fn try_fetch(&self) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(body.to_vec())
    }
}
