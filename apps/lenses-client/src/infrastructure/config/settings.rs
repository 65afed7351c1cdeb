//! Client settings loaded from `LENSES_*` environment variables.

use std::time::Duration;

use crate::infrastructure::live::{DEFAULT_ERROR_BUFFER, DEFAULT_HANDSHAKE_TIMEOUT, LiveConfig};
use crate::infrastructure::rest::RestConfig;

/// Lenses session token.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self { token }
    }

    /// Get the token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Live session tuning.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Upgrade handshake timeout.
    pub handshake_timeout: Duration,
    /// Transport read buffer size (0 = transport default).
    pub read_buffer_size: usize,
    /// Transport write buffer size (0 = transport default).
    pub write_buffer_size: usize,
    /// Error channel capacity.
    pub error_buffer: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            read_buffer_size: 0,
            write_buffer_size: 0,
            error_buffer: DEFAULT_ERROR_BUFFER,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host including scheme.
    pub host: String,
    /// Authentication.
    pub credentials: Credentials,
    /// REST request timeout.
    pub timeout: Duration,
    /// Live session tuning.
    pub session: SessionSettings,
    /// Prometheus exporter port, disabled when unset or zero.
    pub metrics_port: Option<u16>,
}

impl ClientConfig {
    /// Default REST request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create configuration from environment variables.
    ///
    /// `host` and `token`, when given, take precedence over `LENSES_HOST`
    /// and `LENSES_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host or token is missing or empty.
    pub fn from_env(host: Option<String>, token: Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(host, token, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(
        host: Option<String>,
        token: Option<String>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = host
            .or_else(|| env("LENSES_HOST"))
            .ok_or_else(|| ConfigError::MissingEnvVar("LENSES_HOST".to_string()))?;

        let token = token
            .or_else(|| env("LENSES_TOKEN"))
            .ok_or_else(|| ConfigError::MissingEnvVar("LENSES_TOKEN".to_string()))?;

        if host.trim().is_empty() {
            return Err(ConfigError::EmptyValue("LENSES_HOST".to_string()));
        }

        if token.is_empty() {
            return Err(ConfigError::EmptyValue("LENSES_TOKEN".to_string()));
        }

        let defaults = SessionSettings::default();
        let session = SessionSettings {
            handshake_timeout: parse_env_duration_secs(
                &env,
                "LENSES_HANDSHAKE_TIMEOUT_SECS",
                defaults.handshake_timeout,
            ),
            read_buffer_size: parse_env_usize(
                &env,
                "LENSES_READ_BUFFER_SIZE",
                defaults.read_buffer_size,
            ),
            write_buffer_size: parse_env_usize(
                &env,
                "LENSES_WRITE_BUFFER_SIZE",
                defaults.write_buffer_size,
            ),
            error_buffer: parse_env_usize(&env, "LENSES_ERROR_BUFFER", defaults.error_buffer),
        };

        Ok(Self {
            host: host.trim().to_string(),
            credentials: Credentials::new(token),
            timeout: parse_env_duration_secs(&env, "LENSES_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT),
            session,
            metrics_port: env("LENSES_METRICS_PORT")
                .and_then(|v| v.parse().ok())
                .filter(|port| *port != 0),
        })
    }

    /// Live session configuration for a query.
    #[must_use]
    pub fn live_config(&self, sql: impl Into<String>) -> LiveConfig {
        let mut config = LiveConfig::new(self.host.clone(), self.credentials.token(), sql)
            .with_handshake_timeout(self.session.handshake_timeout);
        config.read_buffer_size = self.session.read_buffer_size;
        config.write_buffer_size = self.session.write_buffer_size;
        config.error_buffer = self.session.error_buffer;
        config
    }

    /// REST client configuration.
    #[must_use]
    pub fn rest_config(&self) -> RestConfig {
        RestConfig {
            host: self.host.clone(),
            token: self.credentials.token().to_string(),
            timeout: self.timeout,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_env_usize<F: Fn(&str) -> Option<String>>(env: &F, key: &str, default: usize) -> usize {
    env(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_env_duration_secs<F: Fn(&str) -> Option<String>>(
    env: &F,
    key: &str,
    default: Duration,
) -> Duration {
    env(key)
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
