//! Fleet endpoint configuration
//!
//! The Fleet API lives under the Kibana URL at `api/fleet/`. Only URLs are
//! derived here; sending requests is up to the transport.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// Environment variable holding the Kibana base URL.
pub const KIBANA_URL_ENV: &str = "FLEET_KIBANA_URL";

const FLEET_PATH: &str = "api/fleet/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetEndpoint {
    pub kibana_url: String,
}

impl FleetEndpoint {
    pub fn new(kibana_url: impl Into<String>) -> Result<Self, ClientError> {
        let kibana_url = kibana_url.into();
        if kibana_url.trim().is_empty() {
            return Err(ClientError::Config("kibana_url is empty".to_string()));
        }
        Ok(Self { kibana_url })
    }

    /// Load the endpoint from a YAML document (`kibana_url: https://...`).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ClientError> {
        let endpoint: Self =
            serde_yaml::from_str(yaml).map_err(|e| ClientError::Config(e.to_string()))?;
        Self::new(endpoint.kibana_url)
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let url = std::env::var(KIBANA_URL_ENV)
            .map_err(|_| ClientError::Config(format!("{} is not set", KIBANA_URL_ENV)))?;
        Self::new(url)
    }

    /// `<kibana_url>/api/fleet/`
    pub fn fleet_base_url(&self) -> String {
        let mut url = self.kibana_url.clone();
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(FLEET_PATH);
        url
    }

    pub fn package_policies_url(&self) -> String {
        format!("{}package_policies", self.fleet_base_url())
    }

    pub fn package_policy_url(&self, id: &str) -> String {
        format!("{}/{}", self.package_policies_url(), id)
    }

    /// Deletion always forces removal, even from managed agent policies.
    pub fn delete_package_policy_url(&self, id: &str) -> String {
        format!("{}?force=true", self.package_policy_url(id))
    }
}
