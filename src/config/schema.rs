//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;

/// Root configuration for the FHIR proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream FHIR API the forwarders talk to.
    pub upstream: UpstreamConfig,

    /// Token exchange policy.
    pub token: TokenConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Replace the port of the bind address, keeping the host.
    ///
    /// The address is left untouched when it is not a socket address.
    pub fn set_port(&mut self, port: u16) -> Result<(), ValidationError> {
        let mut addr = self
            .bind_address
            .parse::<SocketAddr>()
            .map_err(|_| ValidationError::InvalidBindAddress(self.bind_address.clone()))?;
        addr.set_port(port);
        self.bind_address = addr.to_string();
        Ok(())
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every outbound path is appended to.
    pub base_url: String,

    /// User-Agent sent on token exchange requests.
    pub user_agent: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time allowed for one upstream exchange in seconds.
    pub request_timeout_secs: u64,

    /// Maximum redirects followed per request (0 disables redirects).
    pub max_redirects: usize,

    /// Honor HTTP(S)_PROXY environment variables for outbound calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dev.ipes.tech".to_string(),
            user_agent: "Dart/Flutter".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            max_redirects: 10,
            use_system_proxy: true,
        }
    }
}

/// Token exchange configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TokenConfig {
    /// Percent-encode structured form fields.
    ///
    /// Off by default: fields are joined as raw `key=value` pairs.
    pub percent_encode_form: bool,
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time to answer the caller) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 90 }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_dev_upstream() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.upstream.base_url, "https://dev.ipes.tech");
        assert_eq!(config.upstream.user_agent, "Dart/Flutter");
        assert!(!config.token.percent_encode_form);
        assert!(config.upstream.use_system_proxy);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn set_port_keeps_host() {
        let mut listener = ListenerConfig {
            bind_address: "127.0.0.1:3000".to_string(),
        };
        listener.set_port(8088).unwrap();
        assert_eq!(listener.bind_address, "127.0.0.1:8088");
    }

    #[test]
    fn set_port_rejects_host_names() {
        let mut listener = ListenerConfig {
            bind_address: "localhost:3000".to_string(),
        };
        assert_eq!(
            listener.set_port(4000),
            Err(ValidationError::InvalidBindAddress("localhost:3000".into()))
        );
        assert_eq!(listener.bind_address, "localhost:3000");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            base_url = "http://localhost:9000"
            use_system_proxy = false

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.base_url, "http://localhost:9000");
        assert_eq!(config.upstream.request_timeout_secs, 60);
        assert!(!config.upstream.use_system_proxy);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }
}
