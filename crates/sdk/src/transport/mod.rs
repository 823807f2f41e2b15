pub mod http;

pub use http::{HttpGet, HttpTransport, RawResponse};

// Types in the `HttpGet` signature, re-exported for implementors.
pub use reqwest::header::HeaderMap;
pub use url::Url;
