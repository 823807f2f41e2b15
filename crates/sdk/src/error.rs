//! Error types for the RentCast SDK.

use rentcast_core::{RegistryError, ValidationError};

/// Result type for SDK operations.
pub type RentcastResult<T> = Result<T, RentcastError>;

/// Failure below the HTTP status level: nothing usable came back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The per-call timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// DNS, connect, TLS or body read failure.
    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Error types that can occur when calling the RentCast API.
///
/// [`crate::RentcastClient::invoke`] renders these into the `error` field of
/// an `ApiCallResult`; they never escape it.
#[derive(Debug, thiserror::Error)]
pub enum RentcastError {
    /// Provider answered with a non-success status.
    #[error("API Error {status}: {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Success status with a body that is not JSON.
    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownEndpoint(#[from] RegistryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Endpoint {endpoint} requires parameter '{param}'")]
    MissingParameter { endpoint: String, param: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RentcastError {
    /// Status code of a provider error response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = RentcastError::Api {
            status: 404,
            body: "Not found".to_string(),
        };
        assert_eq!(err.to_string(), "API Error 404: Not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_transport_error_messages() {
        assert_eq!(
            RentcastError::from(TransportError::Timeout).to_string(),
            "Request timed out"
        );
        assert_eq!(
            RentcastError::from(TransportError::Request("connection reset".into())).to_string(),
            "Request failed: connection reset"
        );
    }
}
