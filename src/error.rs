//! Error types for vultr-cloud-init

use thiserror::Error;

/// Main error type for vultr-cloud-init operations
#[derive(Error, Debug)]
pub enum CloudInitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No datasource found")]
    NoDatasource,

    /// Every attempt against the metadata endpoint failed
    #[error("Unable to read metadata at {url}")]
    MetadataUnavailable { url: String },

    /// Metadata was fetched but carried no interface list
    #[error("No interface data in instance metadata")]
    NoInterfaceData,

    /// The provider described a NIC the host cannot see
    #[error("Did not find network interface on system with mac '{mac}'")]
    InterfaceNotFound { mac: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl CloudInitError {
    /// Create a metadata-unavailable error for the given endpoint
    pub fn metadata_unavailable(url: impl Into<String>) -> Self {
        Self::MetadataUnavailable { url: url.into() }
    }

    /// Create an interface-not-found error for the given MAC
    pub fn interface_not_found(mac: impl Into<String>) -> Self {
        Self::InterfaceNotFound { mac: mac.into() }
    }
}

impl From<reqwest::Error> for CloudInitError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = CloudInitError::metadata_unavailable("http://169.254.169.254/v1.json");
        assert!(err.to_string().contains("http://169.254.169.254/v1.json"));

        let err = CloudInitError::interface_not_found("56:00:00:aa:bb:cc");
        assert!(err.to_string().contains("56:00:00:aa:bb:cc"));
    }
}
