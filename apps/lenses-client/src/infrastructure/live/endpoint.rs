//! Live Session Configuration
//!
//! Session settings and construction of the SQL execution endpoint.
//!
//! # Endpoint
//!
//! ```text
//! wss://<host>/api/ws/v1/sql/execute?sql=<query>&token=<token>[&stats=<n>][&live=true]
//! ```
//!
//! An `https://` host is rewritten to `wss://` and `http://` to `ws://`.

use std::sync::Arc;
use std::time::Duration;

/// Path of the SQL execution WebSocket endpoint.
pub const EXECUTE_PATH: &str = "/api/ws/v1/sql/execute";

/// Handshake timeout applied when none is configured.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(45);

/// Error surface capacity applied when none is configured.
pub const DEFAULT_ERROR_BUFFER: usize = 1;

/// TLS policy for `wss://` endpoints.
#[derive(Clone, Default)]
pub enum TlsPolicy {
    /// Verify the server against the bundled WebPKI roots.
    #[default]
    WebPkiRoots,
    /// Use a caller supplied rustls configuration.
    Custom(Arc<rustls::ClientConfig>),
}

impl std::fmt::Debug for TlsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WebPkiRoots => f.write_str("WebPkiRoots"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configuration of a single live query session.
#[derive(Clone)]
pub struct LiveConfig {
    /// Server host including scheme, e.g. `https://lenses.example.com`.
    pub host: String,
    /// Authentication token.
    pub token: String,
    /// SQL text to execute.
    pub sql: String,
    /// Keep the query running and stream new records as they arrive.
    pub live: bool,
    /// Stats interval in seconds (0 = server default).
    pub stats: u32,
    /// Enable debug logging for the session.
    pub debug: bool,
    /// Upgrade handshake timeout (zero = [`DEFAULT_HANDSHAKE_TIMEOUT`]).
    pub handshake_timeout: Duration,
    /// Transport read buffer size in bytes (0 = transport default).
    pub read_buffer_size: usize,
    /// Transport write buffer size in bytes (0 = transport default).
    pub write_buffer_size: usize,
    /// TLS policy for secure endpoints.
    pub tls: TlsPolicy,
    /// Error surface capacity (0 = [`DEFAULT_ERROR_BUFFER`]).
    pub error_buffer: usize,
}

impl LiveConfig {
    /// Create a configuration with default tuning.
    #[must_use]
    pub fn new(host: impl Into<String>, token: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            sql: sql.into(),
            live: false,
            stats: 0,
            debug: false,
            handshake_timeout: Duration::ZERO,
            read_buffer_size: 0,
            write_buffer_size: 0,
            tls: TlsPolicy::default(),
            error_buffer: 0,
        }
    }

    /// Request a live (continuous) query.
    #[must_use]
    pub const fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Set the stats interval in seconds.
    #[must_use]
    pub const fn with_stats(mut self, stats: u32) -> Self {
        self.stats = stats;
        self
    }

    /// Set the handshake timeout.
    #[must_use]
    pub const fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Set the TLS policy.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// Handshake timeout with the default applied.
    #[must_use]
    pub fn effective_handshake_timeout(&self) -> Duration {
        if self.handshake_timeout.is_zero() {
            DEFAULT_HANDSHAKE_TIMEOUT
        } else {
            self.handshake_timeout
        }
    }

    /// Error surface capacity with the default applied.
    #[must_use]
    pub const fn effective_error_buffer(&self) -> usize {
        if self.error_buffer == 0 {
            DEFAULT_ERROR_BUFFER
        } else {
            self.error_buffer
        }
    }

    /// Host with an HTTP scheme rewritten to its WebSocket equivalent.
    #[must_use]
    pub fn ws_host(&self) -> String {
        normalize_host(&self.host)
    }

    /// Fully qualified SQL execution endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let mut endpoint = format!(
            "{}{EXECUTE_PATH}?sql={}&token={}",
            self.ws_host(),
            urlencoding::encode(&self.sql),
            urlencoding::encode(&self.token),
        );

        if self.stats > 0 {
            endpoint.push_str(&format!("&stats={}", self.stats));
        }

        if self.live {
            endpoint.push_str("&live=true");
        }

        endpoint
    }
}

impl std::fmt::Debug for LiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConfig")
            .field("host", &self.host)
            .field("token", &"[REDACTED]")
            .field("sql", &self.sql)
            .field("live", &self.live)
            .field("stats", &self.stats)
            .field("debug", &self.debug)
            .field("handshake_timeout", &self.handshake_timeout)
            .field("read_buffer_size", &self.read_buffer_size)
            .field("write_buffer_size", &self.write_buffer_size)
            .field("tls", &self.tls)
            .field("error_buffer", &self.error_buffer)
            .finish()
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');

    if let Some(rest) = host.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = host.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        host.to_string()
    }
}
