//! Transport Adapter
//!
//! Everything that touches the wire lives here:
//!
//! - **HttpTransport**: base URL handling, auth header injection, JSON and binary requests
//! - **ApiError**: uniform error channel for connectivity, status and decode failures
//!
//! The transport never retries and never swallows an error. Each failure is
//! logged with `tracing` and handed back to the caller as-is.

mod error;
mod http;

pub use error::{ApiError, ApiResult, GENERIC_ERROR_MESSAGE};
pub use http::{HttpTransport, ImageBlob, Page, TransportConfig};
