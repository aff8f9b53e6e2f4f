//! Web configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHIPDESK_BACKEND_URL` - Base URL of the shipping REST API
//! - `SHIPDESK_BASE_URL` - Public URL of this site
//!
//! ## Optional
//! - `SHIPDESK_SOCKET_URL` - Notification WebSocket URL (default: derived from the backend URL)
//! - `SHIPDESK_HOST` - Bind address (default: 127.0.0.1)
//! - `SHIPDESK_PORT` - Listen port (default: 3000)
//! - `SHIPDESK_CACHE_TTL_SECS` - Query cache lifetime (default: 30)
//! - `SHIPDESK_CACHE_CAPACITY` - Query cache size (default: 1000)
//! - `SHIPDESK_REDIRECT_DELAY_MS` - Delay before leaving the wizard success page (default: 1200)
//! - `SHIPDESK_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use shipdesk_api::{BackendConfig, derive_socket_url};
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CACHE_TTL_SECS: u64 = 30;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;
const DEFAULT_REDIRECT_DELAY_MS: u64 = 1200;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Base URL of the shipping REST API
    pub backend_url: Url,
    /// Notification WebSocket URL
    pub socket_url: Url,
    /// Public base URL of this site
    pub base_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Query cache lifetime
    pub cache_ttl: Duration,
    /// Maximum number of cached query responses
    pub cache_capacity: u64,
    /// Delay before the wizard success page moves on to the shipment list
    pub redirect_delay: Duration,
    /// Emit JSON logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl WebConfig {
    /// Configuration with defaults for everything but the two URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if a socket URL cannot be derived from `backend_url`.
    pub fn new(backend_url: Url, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let socket_url = derive_socket_url(&backend_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHIPDESK_BACKEND_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            backend_url,
            socket_url,
            base_url: base_url.into(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let backend_url = get_url("SHIPDESK_BACKEND_URL")?;
        let base_url = get_required_env("SHIPDESK_BASE_URL")?;
        let mut config = Self::new(backend_url, base_url)?;

        if get_optional_env("SHIPDESK_SOCKET_URL").is_some() {
            config.socket_url = get_url("SHIPDESK_SOCKET_URL")?;
        }
        config.host = get_parsed("SHIPDESK_HOST", "127.0.0.1")?;
        config.port = get_parsed("SHIPDESK_PORT", &DEFAULT_PORT.to_string())?;
        config.cache_ttl = Duration::from_secs(get_parsed(
            "SHIPDESK_CACHE_TTL_SECS",
            &DEFAULT_CACHE_TTL_SECS.to_string(),
        )?);
        config.cache_capacity = get_parsed(
            "SHIPDESK_CACHE_CAPACITY",
            &DEFAULT_CACHE_CAPACITY.to_string(),
        )?;
        config.redirect_delay = Duration::from_millis(get_parsed(
            "SHIPDESK_REDIRECT_DELAY_MS",
            &DEFAULT_REDIRECT_DELAY_MS.to_string(),
        )?);
        config.log_json = get_optional_env("SHIPDESK_LOG_JSON")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        config.sentry_dsn = get_optional_env("SENTRY_DSN");
        config.sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        config.sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        config.sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(config)
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Settings for the backend client.
    #[must_use]
    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.backend_url.clone(),
            socket_url: self.socket_url.clone(),
            cache_ttl: self.cache_ttl,
            cache_capacity: self.cache_capacity,
        }
    }

    /// The redirect delay in seconds, as used by the `Refresh` header.
    #[must_use]
    pub fn redirect_delay_secs(&self) -> String {
        let millis = self.redirect_delay.as_millis();
        let secs = millis / 1000;
        let rest = millis % 1000;
        if rest == 0 {
            secs.to_string()
        } else {
            format!("{secs}.{}", format!("{rest:03}").trim_end_matches('0'))
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get and parse an environment variable, falling back to `default`.
fn get_parsed<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a required environment variable as a URL.
fn get_url(key: &str) -> Result<Url, ConfigError> {
    Url::parse(&get_required_env(key)?)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> WebConfig {
        WebConfig::new(
            Url::parse("https://api.example.com/api/").unwrap(),
            "https://ship.example.com",
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.port, 3000);
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.redirect_delay, Duration::from_millis(1200));
        assert_eq!(config.socket_url.as_str(), "wss://api.example.com/socket");
        assert!(config.is_secure());
    }

    #[test]
    fn test_socket_addr() {
        let config = config();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_redirect_delay_secs() {
        let mut config = config();
        assert_eq!(config.redirect_delay_secs(), "1.2");
        config.redirect_delay = Duration::from_millis(2000);
        assert_eq!(config.redirect_delay_secs(), "2");
        config.redirect_delay = Duration::from_millis(250);
        assert_eq!(config.redirect_delay_secs(), "0.25");
    }

    #[test]
    fn test_backend_settings_follow_config() {
        let mut config = config();
        config.cache_capacity = 5;
        let backend = config.backend();
        assert_eq!(backend.cache_capacity, 5);
        assert_eq!(backend.base_url.as_str(), "https://api.example.com/api/");
    }
}
