//! # RentCast SDK
//!
//! Async client for the RentCast property data API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rentcast_sdk::{RentcastClient, RentcastResult};
//! use rentcast_core::ValidatedArgs;
//!
//! #[tokio::main]
//! async fn main() -> RentcastResult<()> {
//!     let client = RentcastClient::builder()
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     let args = ValidatedArgs::new().with("city", "Austin").with("state", "TX");
//!     let result = client.invoke("properties", &args).await;
//!     if result.success {
//!         println!("{}", result.data.unwrap_or_default());
//!     } else {
//!         eprintln!("{} failed: {:?}", result.endpoint, result.error);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! [`RentcastClient::invoke`] never returns an error: provider, transport and
//! decoding failures all arrive as an [`ApiCallResult`] with `success == false`.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::{PreparedRequest, RentcastClient, RentcastClientBuilder};
pub use config::ClientConfig;
pub use error::{RentcastError, RentcastResult, TransportError};
pub use transport::{HttpGet, HttpTransport, RawResponse};

pub use rentcast_core::{ApiCallResult, EndpointRegistry, ValidatedArgs};
