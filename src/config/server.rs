//! Listener, logging and browser-origin settings

use serde::Deserialize;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

/// Where the hub listens and how it logs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Comma-separated browser origins allowed to open the socket.
    /// Empty means any origin, which production refuses.
    pub cors_origins: Option<String>,
}

/// Deployment stage. Staging and production log as JSON.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ValidationError::InvalidBindAddress(raw))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Structured output for log shippers outside local development.
    pub fn json_logs(&self) -> bool {
        self.environment != Environment::Development
    }

    /// The `RUST_LOG` filter when set, otherwise `log_level`.
    pub fn log_filter(&self) -> Result<EnvFilter, ValidationError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.log_level)
                .map_err(|_| ValidationError::InvalidLogFilter(self.log_level.clone())),
        }
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;

        EnvFilter::try_new(&self.log_level)
            .map_err(|_| ValidationError::InvalidLogFilter(self.log_level.clone()))?;

        let origins = self.cors_origins_list();
        if let Some(bad) = origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(ValidationError::InvalidCorsOrigin(bad.clone()));
        }
        if self.is_production() && origins.is_empty() {
            return Err(ValidationError::MissingRequired("server.cors_origins"));
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,classroom_hub=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production(origins: Option<&str>) -> ServerConfig {
        ServerConfig {
            environment: Environment::Production,
            cors_origins: origins.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_listen_on_all_interfaces_with_hub_debug_logs() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.log_level, "info,classroom_hub=debug");
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unparseable_host_is_rejected() {
        let config = ServerConfig {
            host: "classroom hub".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidBindAddress("classroom hub:8080".to_string()))
        );
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn broken_log_directive_is_rejected() {
        let config = ServerConfig {
            log_level: "classroom_hub=loud".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidLogFilter("classroom_hub=loud".to_string()))
        );
    }

    #[test]
    fn origin_list_skips_blanks() {
        let config = ServerConfig {
            cors_origins: Some(" https://class.example.edu , ,http://localhost:5173,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.cors_origins_list(),
            vec!["https://class.example.edu", "http://localhost:5173"]
        );
    }

    #[test]
    fn origin_without_scheme_is_rejected() {
        let config = ServerConfig {
            cors_origins: Some("class.example.edu".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidCorsOrigin("class.example.edu".to_string()))
        );
    }

    #[test]
    fn production_requires_explicit_origins() {
        assert_eq!(
            production(None).validate(),
            Err(ValidationError::MissingRequired("server.cors_origins"))
        );
        assert!(production(Some("https://class.example.edu"))
            .validate()
            .is_ok());
    }

    #[test]
    fn staging_and_production_log_as_json() {
        let staging = ServerConfig {
            environment: Environment::Staging,
            ..Default::default()
        };
        assert!(staging.json_logs());
        assert!(!staging.is_production());
        assert!(production(None).json_logs());
    }
}
