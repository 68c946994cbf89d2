//! Listener, logging and browser-facing settings for the chat gateway

use axum::http::HeaderValue;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

/// Upper bound for `request_timeout_secs`
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// HTTP listener and process-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `tracing_subscriber::EnvFilter` directives, e.g. `info,recruit_chat=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Timeout applied to REST calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated origins allowed to call the REST and socket endpoints
    /// from a browser. Empty means same-origin only.
    pub cors_origins: Option<String>,
}

/// Deployment stage; production tightens secret checks
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Shape of the log lines written to stdout
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ValidationError::InvalidBindAddress(addr))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Log filter for the subscriber; falls back to `info` when
    /// `log_level` does not parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Origins from `cors_origins` as header values, skipping blanks.
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, ValidationError> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| ValidationError::InvalidCorsOrigin(origin.to_string()))
            })
            .collect()
    }

    /// CORS policy for the router. Origins were checked by `validate`, so a
    /// bad entry here only drops that entry.
    pub fn cors_layer(&self) -> CorsLayer {
        let origins = self.allowed_origins().unwrap_or_default();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        self.socket_addr()?;
        self.allowed_origins()?;
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
            log_format: LogFormat::default(),
            request_timeout_secs: default_request_timeout(),
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
    "info,recruit_chat=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn with_origins(origins: &str) -> ServerConfig {
        ServerConfig {
            cors_origins: Some(origins.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn binds_all_interfaces_on_8080_by_default() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn hostname_that_is_not_an_ip_is_rejected() {
        let config = ServerConfig {
            host: "chat.internal".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidBindAddress("chat.internal:8080".to_string()))
        );
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let config = with_origins(" https://jobs.example.com ,, http://localhost:5173,");
        let origins = config.allowed_origins().unwrap();
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://jobs.example.com"),
                HeaderValue::from_static("http://localhost:5173"),
            ]
        );
    }

    #[test]
    fn no_origins_configured_means_empty_allow_list() {
        assert!(ServerConfig::default().allowed_origins().unwrap().is_empty());
    }

    #[test]
    fn origin_with_control_characters_fails_validation() {
        let config = with_origins("https://ok.example.com,https://bad\n.example.com");
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCorsOrigin(origin)) if origin.contains("bad")
        ));
    }

    #[test]
    fn request_timeout_must_be_within_five_minutes() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout), "{}s", secs);
        }

        let config = ServerConfig {
            request_timeout_secs: MAX_REQUEST_TIMEOUT_SECS,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
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
    fn malformed_log_filter_falls_back_to_info() {
        let config = ServerConfig {
            log_level: "recruit_chat=loud".to_string(),
            ..Default::default()
        };
        assert_eq!(config.env_filter().max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            ServerConfig::default().env_filter().max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }

    #[test]
    fn environment_and_log_format_parse_lowercase() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"environment":"production","log_format":"json"}"#).unwrap();
        assert!(config.is_production());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.port, 8080);
    }
}
