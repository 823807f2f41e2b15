//! Configuration types for the RentCast client.

use crate::error::{RentcastError, RentcastResult};
use rentcast_core::GatewayConfig;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Identifying `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("rentcast-mcp/", env!("CARGO_PKG_VERSION"));

/// Configuration for the RentCast client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL including the API version, e.g. `https://api.rentcast.io/v1`.
    pub base_url: Url,
    /// Sent as `X-Api-Key`.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with the default timeout.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Take the provider settings out of a validated gateway configuration.
    pub fn from_gateway(config: &GatewayConfig) -> RentcastResult<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| RentcastError::Config("api_key is required".to_string()))?;
        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            timeout: config.timeout(),
            ..Self::new(base_url, api_key)
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentcast_core::ConfigOverrides;

    #[test]
    fn test_client_config_defaults() {
        let url = Url::parse("https://api.rentcast.io/v1").unwrap();
        let config = ClientConfig::new(url.clone(), "key");

        assert_eq!(config.base_url, url);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("rentcast-mcp/"));
    }

    #[test]
    fn test_from_gateway_config() {
        let gateway = GatewayConfig::default().with_overrides(ConfigOverrides {
            api_key: Some("key-123".to_string()),
            timeout_secs: Some(5),
            ..Default::default()
        });

        let config = ClientConfig::from_gateway(&gateway).unwrap();
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.base_url.as_str(), "https://api.rentcast.io/v1");
    }

    #[test]
    fn test_from_gateway_config_without_key() {
        let err = ClientConfig::from_gateway(&GatewayConfig::default()).unwrap_err();
        assert!(matches!(err, RentcastError::Config(_)));
    }
}
