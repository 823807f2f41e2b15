//! Main client for the RentCast API.

use crate::config::{ClientConfig, USER_AGENT};
use crate::error::{RentcastError, RentcastResult};
use crate::transport::{HttpGet, HttpTransport};
use rentcast_core::config::DEFAULT_BASE_URL;
use rentcast_core::endpoints::{PathSegment, ID_PARAM};
use rentcast_core::{ApiCallResult, EndpointRegistry, GatewayConfig, ValidatedArgs};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// A fully resolved provider request.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Resolved path, e.g. `/properties/123`.
    pub endpoint: String,
    pub url: Url,
}

/// Client for the RentCast API.
///
/// Cheap to clone; clones share the transport and registry.
#[derive(Clone)]
pub struct RentcastClient {
    config: Arc<ClientConfig>,
    registry: Arc<EndpointRegistry>,
    headers: HeaderMap,
    http: Arc<dyn HttpGet>,
}

impl RentcastClient {
    /// Create a new client builder.
    pub fn builder() -> RentcastClientBuilder {
        RentcastClientBuilder::new()
    }

    /// Create a client from the gateway configuration with the default transport.
    pub fn from_gateway_config(config: &GatewayConfig) -> RentcastResult<Self> {
        let config = ClientConfig::from_gateway(config)?;
        Self::from_parts(config, EndpointRegistry::rentcast(), Arc::new(HttpTransport::new()?))
    }

    fn from_parts(
        config: ClientConfig,
        registry: EndpointRegistry,
        http: Arc<dyn HttpGet>,
    ) -> RentcastResult<Self> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| RentcastError::Config("Invalid API key format".to_string()))?;
        api_key.set_sensitive(true);
        headers.insert(HeaderName::from_static("x-api-key"), api_key);
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|_| RentcastError::Config("Invalid user agent".to_string()))?,
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        if config.base_url.cannot_be_a_base() {
            return Err(RentcastError::Config(format!(
                "base_url {} cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            headers,
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Call `logical_name` with `args`.
    ///
    /// Every failure, from an unknown endpoint to a timeout, comes back as an
    /// `ApiCallResult` with `success == false`.
    pub async fn invoke(&self, logical_name: &str, args: &ValidatedArgs) -> ApiCallResult {
        let prepared = match self.prepare(logical_name, args) {
            Ok(prepared) => prepared,
            Err(e) => {
                let endpoint = self
                    .registry
                    .lookup(logical_name)
                    .map(|d| d.path_template.to_string())
                    .unwrap_or_else(|_| logical_name.to_string());
                warn!(endpoint = %endpoint, error = %e, "Could not build RentCast request");
                return ApiCallResult::failed(endpoint, e.to_string());
            }
        };

        match self.send(&prepared).await {
            Ok(data) => {
                info!(endpoint = %prepared.endpoint, "RentCast request succeeded");
                ApiCallResult::ok(prepared.endpoint, data)
            }
            Err(e) => {
                warn!(
                    endpoint = %prepared.endpoint,
                    status = e.status(),
                    error = %e,
                    "RentCast request failed"
                );
                ApiCallResult::failed(prepared.endpoint, e.to_string())
            }
        }
    }

    /// Resolve the endpoint, merge defaults and build the URL.
    pub fn prepare(
        &self,
        logical_name: &str,
        args: &ValidatedArgs,
    ) -> RentcastResult<PreparedRequest> {
        let descriptor = self.registry.lookup(logical_name)?;
        let mut args = args.clone().merged_with_defaults(&descriptor.default_overrides);

        let id = if descriptor.has_path_param() {
            args.remove(ID_PARAM).map(|value| value.to_string())
        } else {
            None
        };
        let endpoint = EndpointRegistry::resolve_path(descriptor, id.as_deref())?;

        for required in descriptor.required_params {
            let in_path = descriptor.has_path_param() && *required == ID_PARAM;
            if !in_path && !args.contains(required) {
                return Err(RentcastError::MissingParameter {
                    endpoint: descriptor.logical_name.to_string(),
                    param: required.to_string(),
                });
            }
        }

        let mut url = self.config.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RentcastError::Config("base_url cannot carry a path".to_string()))?;
            segments.pop_if_empty();
            for segment in descriptor.path_segments() {
                match segment {
                    PathSegment::Literal(literal) => segments.push(literal),
                    PathSegment::Placeholder => segments.push(id.as_deref().unwrap_or_default()),
                };
            }
        }

        let query: Vec<(&str, String)> = args
            .iter()
            .filter(|(name, _)| {
                let forwarded = descriptor.accepts_query_param(name);
                if !forwarded {
                    debug!(param = *name, endpoint = descriptor.logical_name, "Parameter not forwarded");
                }
                forwarded
            })
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        debug!(endpoint = %endpoint, url = %url, "Prepared RentCast request");
        Ok(PreparedRequest { endpoint, url })
    }

    async fn send(&self, request: &PreparedRequest) -> RentcastResult<serde_json::Value> {
        let response = self
            .http
            .get(&request.url, &self.headers, self.config.timeout)
            .await?;

        if !response.is_success() {
            return Err(RentcastError::Api {
                status: response.status,
                body: response.text(),
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Builder for creating a RentcastClient.
pub struct RentcastClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    user_agent: String,
    registry: Option<EndpointRegistry>,
    transport: Option<Arc<dyn HttpGet>>,
}

impl RentcastClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
            registry: None,
            transport: None,
        }
    }

    /// Set the API base URL. Defaults to the public v1 API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the endpoint table.
    pub fn registry(mut self, registry: EndpointRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the HTTP capability.
    pub fn transport(mut self, transport: Arc<dyn HttpGet>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> RentcastResult<RentcastClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RentcastError::Config("api_key is required".to_string()))?;

        let base_url = Url::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let config = ClientConfig {
            base_url,
            api_key,
            timeout: self.timeout,
            user_agent: self.user_agent,
        };

        let transport: Arc<dyn HttpGet> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        RentcastClient::from_parts(
            config,
            self.registry.unwrap_or_else(EndpointRegistry::rentcast),
            transport,
        )
    }
}

impl Default for RentcastClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentcast_core::ValidationError;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RentcastClient {
        RentcastClient::builder()
            .base_url(format!("{}/v1", server.uri()))
            .api_key("test-key")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    fn offline_client() -> RentcastClient {
        RentcastClient::builder()
            .base_url("https://api.rentcast.io/v1")
            .api_key("test-key")
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_api_key() {
        let result = RentcastClient::builder().build();
        assert!(matches!(result, Err(RentcastError::Config(_))));
    }

    #[test]
    fn test_prepare_keeps_base_path() {
        let client = offline_client();
        let args = ValidatedArgs::new()
            .with("city", "Austin")
            .with("state", "TX")
            .with("limit", 50);

        let prepared = client.prepare("properties", &args).unwrap();
        assert_eq!(prepared.endpoint, "/properties");
        assert_eq!(
            prepared.url.as_str(),
            "https://api.rentcast.io/v1/properties?city=Austin&state=TX&limit=50"
        );
    }

    #[test]
    fn test_prepare_substitutes_and_encodes_id() {
        let client = offline_client();
        let args = ValidatedArgs::new().with("id", "5500 Grand Lake Dr, San Antonio, TX 78238");

        let prepared = client.prepare("properties/{id}", &args).unwrap();
        assert_eq!(
            prepared.endpoint,
            "/properties/5500 Grand Lake Dr, San Antonio, TX 78238"
        );
        assert_eq!(
            prepared.url.path(),
            "/v1/properties/5500%20Grand%20Lake%20Dr,%20San%20Antonio,%20TX%2078238"
        );
        assert!(prepared.url.query().is_none());
    }

    #[tokio::test]
    async fn test_dot_segment_id_never_leaves_the_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;
        let client = client_for(&server);

        let err = client
            .prepare("properties/{id}", &ValidatedArgs::new().with("id", ".."))
            .unwrap_err();
        assert!(matches!(
            err,
            RentcastError::Validation(ValidationError::InvalidPathSegment { .. })
        ));

        let result = client
            .invoke("properties/{id}", &ValidatedArgs::new().with("id", "."))
            .await;
        assert!(!result.success);
        assert_eq!(result.endpoint, "/properties/{id}");
        assert_eq!(result.error.as_deref(), Some("id cannot be '.'"));
    }

    #[test]
    fn test_prepare_merges_defaults_and_drops_undeclared_params() {
        let client = offline_client();

        let prepared = client
            .prepare("properties/random", &ValidatedArgs::new().with("city", "Denver"))
            .unwrap();
        assert_eq!(prepared.url.query(), Some("city=Denver&limit=10"));

        let prepared = client
            .prepare(
                "listings/sale/{id}",
                &ValidatedArgs::new().with("id", "sale123").with("listingType", "sale"),
            )
            .unwrap();
        assert_eq!(prepared.url.path(), "/v1/listings/sale/sale123");
        assert!(prepared.url.query().is_none());
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/properties"))
            .and(query_param("city", "Austin"))
            .and(query_param("limit", "15"))
            .and(header("x-api-key", "test-key"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": "12345", "city": "Austin", "state": "TX"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let args = ValidatedArgs::new().with("city", "Austin").with("limit", 15);
        let result = client.invoke("properties", &args).await;

        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.endpoint, "/properties");
        assert_eq!(result.data.unwrap()[0]["id"], "12345");
    }

    #[tokio::test]
    async fn test_invoke_caller_value_beats_default() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/markets"))
            .and(query_param("zipCode", "78701"))
            .and(query_param("dataType", "Sale"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "78701"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let args = ValidatedArgs::new()
            .with("zipCode", "78701")
            .with("dataType", "Sale");
        let result = client.invoke("markets", &args).await;

        assert!(result.success);
    }

    #[tokio::test]
    async fn test_invoke_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/properties/123"))
            .and(query_param_is_missing("id"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .invoke("properties/{id}", &ValidatedArgs::new().with("id", "123"))
            .await;

        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error.as_deref(), Some("API Error 404: Not found"));
        assert_eq!(result.endpoint, "/properties/123");
    }

    #[tokio::test]
    async fn test_invoke_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/avm/value"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"price": 1}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = RentcastClient::builder()
            .base_url(format!("{}/v1", server.uri()))
            .api_key("test-key")
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let result = client
            .invoke("avm/value", &ValidatedArgs::new().with("address", "1 Main St"))
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Request timed out"));
        assert_eq!(result.endpoint, "/avm/value");
    }

    #[tokio::test]
    async fn test_invoke_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/listings/sale"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .invoke("listings/sale", &ValidatedArgs::new().with("city", "Miami"))
            .await;

        assert!(!result.success);
        assert!(result
            .error
            .unwrap()
            .starts_with("Invalid JSON response:"));
    }

    #[tokio::test]
    async fn test_invoke_unknown_endpoint_and_missing_id() {
        let client = offline_client();

        let result = client.invoke("owners", &ValidatedArgs::new()).await;
        assert!(!result.success);
        assert_eq!(result.endpoint, "owners");
        assert_eq!(result.error.as_deref(), Some("Unknown endpoint: owners"));

        let result = client.invoke("properties/{id}", &ValidatedArgs::new()).await;
        assert!(!result.success);
        assert_eq!(result.endpoint, "/properties/{id}");
        assert!(result.error.unwrap().contains("requires path parameter 'id'"));
    }
}
