//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (built by a forwarder)
//!     → client.rs (single HTTP exchange)
//!     → UpstreamResponse (status + JSON body)
//!       or UpstreamError (transport / invalid JSON)
//! ```

pub mod client;

pub use client::{OutboundRequest, UpstreamClient, UpstreamError, UpstreamResponse};
