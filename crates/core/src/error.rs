use std::path::PathBuf;

/// Rejection of caller-supplied tool arguments. Never reaches the network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {got}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        got: f64,
    },

    #[error("{field} must be one of [{}], got '{got}'", .allowed.join(", "))]
    InvalidEnum {
        field: String,
        allowed: Vec<String>,
        got: String,
    },

    #[error("{field} must be {expected}")]
    InvalidType { field: String, expected: String },

    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("Must provide propertyId, address, or both latitude and longitude")]
    MissingIdentifier,

    #[error("At least one location parameter (city, state, zipCode) is required")]
    MissingLocation,

    #[error("Endpoint {endpoint} requires path parameter '{param}'")]
    MissingPathParameter { endpoint: String, param: String },

    #[error("{field} cannot be '{got}'")]
    InvalidPathSegment { field: String, got: String },
}

impl ValidationError {
    /// Stable identifier used in structured tool errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidEnum { .. } => "invalid_enum",
            Self::InvalidType { .. } => "invalid_type",
            Self::MissingRequiredParameter(_) => "missing_required_parameter",
            Self::MissingIdentifier => "missing_identifier",
            Self::MissingLocation => "missing_location",
            Self::MissingPathParameter { .. } => "missing_path_parameter",
            Self::InvalidPathSegment { .. } => "invalid_path_segment",
        }
    }
}

/// Admission refused by the quota guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaError {
    #[error("Session quota exceeded: {ceiling} calls allowed per session")]
    SessionQuotaExceeded { ceiling: u64 },

    #[error("Rate limit exceeded: {limit} calls per minute, retry in {retry_after_secs}s")]
    RateLimited { limit: u32, retry_after_secs: u64 },
}

impl QuotaError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionQuotaExceeded { .. } => "session_quota_exceeded",
            Self::RateLimited { .. } => "rate_limited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),
}

/// Startup-time configuration failure. Fatal: no tool is served without a key.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("RentCast API key is not configured (set RENTCAST_API_KEY or api_key)")]
    MissingApiKey,

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Any error that stops a tool call before the provider is contacted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl GatewayError {
    /// Lets a client tell "bad request" apart from "ask again later".
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Quota(_) => "quota",
            Self::Registry(_) => "registry",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.kind(),
            Self::Quota(e) => e.kind(),
            Self::Registry(RegistryError::UnknownEndpoint(_)) => "unknown_endpoint",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Quota(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = ValidationError::OutOfRange {
            field: "bedrooms".to_string(),
            min: 0.0,
            max: 10.0,
            got: 12.0,
        };
        assert_eq!(err.to_string(), "bedrooms must be between 0 and 10, got 12");
    }

    #[test]
    fn test_invalid_enum_lists_allowed_values() {
        let err = ValidationError::InvalidEnum {
            field: "dataType".to_string(),
            allowed: vec!["All".into(), "Sale".into(), "Rental".into()],
            got: "Bogus".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "dataType must be one of [All, Sale, Rental], got 'Bogus'"
        );
    }

    #[test]
    fn test_gateway_error_categories() {
        let validation: GatewayError = ValidationError::MissingIdentifier.into();
        assert_eq!(validation.category(), "validation");
        assert_eq!(validation.kind(), "missing_identifier");
        assert!(!validation.is_retryable());

        let quota: GatewayError = QuotaError::SessionQuotaExceeded { ceiling: 40 }.into();
        assert_eq!(quota.category(), "quota");
        assert_eq!(quota.kind(), "session_quota_exceeded");
        assert!(quota.is_retryable());
    }
}
