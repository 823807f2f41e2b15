// Core of the RentCast MCP gateway: what can be called, with which
// arguments, and how often.

pub mod config;
pub mod endpoints;
pub mod error;
pub mod quota;
pub mod records;
pub mod schema;
pub mod types;

pub use config::{ConfigOverrides, GatewayConfig};
pub use endpoints::{EndpointDescriptor, EndpointRegistry, HttpMethod, ResponseShape};
pub use error::{ConfigError, GatewayError, QuotaError, RegistryError, ValidationError};
pub use quota::{Admission, QuotaConfig, QuotaGuard, QuotaSnapshot};
pub use records::ProviderData;
pub use schema::{ToolName, ToolSpec};
pub use types::*;
