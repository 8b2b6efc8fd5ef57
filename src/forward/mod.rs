//! Request forwarding.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → target.rs (base + prefix + sub path + query)
//!     → headers.rs (drop Host and hop-by-hop headers)
//!     → forwarder.rs (stream body unless GET/HEAD, one outbound call)
//!     → headers.rs (drop hop-by-hop headers from the response)
//!     → streamed response back to the caller
//! ```
//!
//! Failures reaching the backend are not retried; they surface as
//! `ForwardError::UpstreamUnreachable`.

pub mod error;
pub mod forwarder;
pub mod headers;
pub mod target;

pub use error::{ForwardError, ForwardResult};
pub use forwarder::Forwarder;
pub use target::{API_PREFIX, HEALTH_PATH};
