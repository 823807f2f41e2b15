//! HTTP transport layer for the RentCast SDK.

use crate::error::{RentcastError, RentcastResult, TransportError};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Status and body of a completed HTTP exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The one network capability the client needs: a GET with headers and a
/// timeout. Non-success statuses are returned, not raised.
#[async_trait::async_trait]
pub trait HttpGet: Send + Sync {
    async fn get(
        &self,
        url: &Url,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed [`HttpGet`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> RentcastResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| RentcastError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpGet for HttpTransport {
    async fn get(
        &self,
        url: &Url,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "GET request");

        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_get_passes_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/markets"))
            .and(header("x-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"78701"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("test-key"),
        );

        let transport = HttpTransport::new().unwrap();
        let response = transport
            .get(&url(&server, "/v1/markets"), &headers, Duration::from_secs(5))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.text(), r#"{"id":"78701"}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/properties/123"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let response = transport
            .get(
                &url(&server, "/v1/properties/123"),
                &HeaderMap::new(),
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(response.text(), "Not found");
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let err = transport
            .get(
                &url(&server, "/v1/slow"),
                &HeaderMap::new(),
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on port 1.
        let target = Url::parse("http://127.0.0.1:1/v1/properties").unwrap();

        let transport = HttpTransport::new().unwrap();
        let err = transport
            .get(&target, &HeaderMap::new(), Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request(_)));
    }
}
