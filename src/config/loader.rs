//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::ValidationError;

/// Environment variable selecting the listen port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable selecting the upstream base URL.
pub const BASE_URL_ENV: &str = "FHIR_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value `{value}` for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Apply `PORT` and `FHIR_BASE_URL` on top of a loaded configuration.
///
/// `lookup` abstracts the process environment so callers can inject values.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
        let port = value.trim().parse::<u16>().map_err(|_| ConfigError::Env {
            var: PORT_ENV,
            value: value.clone(),
        })?;
        config
            .listener
            .set_port(port)
            .map_err(|e| ConfigError::Validation(vec![e]))?;
    }

    if let Some(value) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.upstream.base_url = value.trim().to_string();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn port_env_overrides_bind_port() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, env(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn unset_env_leaves_defaults() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.upstream.base_url, "https://dev.ipes.tech");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = ProxyConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn port_env_on_host_name_bind_is_rejected() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "localhost:3000".to_string();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "8080")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref errors)
                if errors == &[ValidationError::InvalidBindAddress("localhost:3000".into())]
        ));
        assert_eq!(config.listener.bind_address, "localhost:3000");
    }

    #[test]
    fn base_url_env_overrides_upstream() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("FHIR_BASE_URL", "http://localhost:9999")]),
        )
        .unwrap();
        assert_eq!(config.upstream.base_url, "http://localhost:9999");
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            parse_config("listener = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec![
            ValidationError::Zero("timeouts.request_secs"),
            ValidationError::InvalidUserAgent,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.request_secs must be greater than zero, \
             upstream.user_agent is not a valid header value"
        );
    }
}
