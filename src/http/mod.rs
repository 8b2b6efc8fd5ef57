//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace span, request timeout)
//!     → route match: /api, /api/{*path}, /health
//!     → forward::Forwarder (one outbound call)
//!     → streamed backend response to the client
//! ```

pub mod server;

pub use server::{AppState, HttpServer, Upstream};
