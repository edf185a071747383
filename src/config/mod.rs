//! Datasource settings
//!
//! The Vultr datasource reads its settings from the `datasource: Vultr:`
//! section of the merged host configuration. Every key is optional and falls
//! back to the built-in default.

pub mod loader;
pub mod merge;
pub mod paths;

pub use paths::CloudPaths;

use crate::CloudInitError;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::time::Duration;

/// Vultr metadata endpoint (link-local address)
pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/v1.json";

/// Resolver handed out by the Vultr private network
pub const DEFAULT_DNS_SERVER: &str = "10.61.10.10";

/// Key of the datasource section inside `datasource:`
pub const DATASOURCE_KEY: &str = "Vultr";

/// How the availability zone is derived from the `region` mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLookup {
    /// Read `region["EWR"]`, the key older images looked up
    #[default]
    Legacy,
    /// Read `region["regioncode"]`, the key the endpoint actually reports
    Regioncode,
}

impl RegionLookup {
    /// Key read from the `region` mapping
    pub fn key(self) -> &'static str {
        match self {
            Self::Legacy => "EWR",
            Self::Regioncode => "regioncode",
        }
    }
}

/// Settings for the Vultr datasource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VultrSettings {
    /// Metadata endpoint URL
    pub metadata_url: String,

    /// DNS servers written into the nameserver entry
    pub dns_servers: Vec<String>,

    /// Additional attempts after the first one
    pub retries: u32,

    /// Per-attempt timeout in seconds
    pub timeout: f64,

    /// Pause between attempts in seconds
    pub wait_retry: f64,

    /// Availability zone derivation
    pub region_lookup: RegionLookup,
}

impl Default for VultrSettings {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            dns_servers: vec![DEFAULT_DNS_SERVER.to_string()],
            retries: 10,
            timeout: 1.0,
            wait_retry: 1.0,
            region_lookup: RegionLookup::default(),
        }
    }
}

impl VultrSettings {
    /// Extract settings from a merged host configuration
    ///
    /// A missing `datasource.Vultr` section yields the defaults.
    pub fn from_system_config(system: &Value) -> Result<Self, CloudInitError> {
        let section = system
            .get("datasource")
            .and_then(|ds| ds.get(DATASOURCE_KEY))
            .cloned()
            .unwrap_or(Value::Null);

        let settings: Self = match section {
            Value::Null => Self::default(),
            value => serde_yaml::from_value(value).map_err(|e| {
                CloudInitError::Config(format!("invalid datasource.{}: {}", DATASOURCE_KEY, e))
            })?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the fetcher cannot run with
    pub fn validate(&self) -> Result<(), CloudInitError> {
        if self.metadata_url.trim().is_empty() {
            return Err(CloudInitError::Config("metadata_url must not be empty".into()));
        }
        if self.timeout()?.is_zero() {
            return Err(CloudInitError::Config(format!(
                "timeout must be a positive number of seconds, got {}",
                self.timeout
            )));
        }
        self.wait_retry()?;
        Ok(())
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Result<Duration, CloudInitError> {
        seconds("timeout", self.timeout)
    }

    /// Pause between attempts
    pub fn wait_retry(&self) -> Result<Duration, CloudInitError> {
        seconds("wait_retry", self.wait_retry)
    }
}

/// Convert a seconds value, rejecting negative, non-finite and overflowing input
fn seconds(key: &str, value: f64) -> Result<Duration, CloudInitError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        CloudInitError::Config(format!(
            "{} must be a non-negative number of seconds, got {}",
            key, value
        ))
    })
}
