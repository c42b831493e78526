//! FHIR proxy library.
//!
//! Forwards OAuth token exchanges and FHIR resource reads from browser
//! clients to a single upstream API.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
