#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Lenses Client - Streaming SQL and Administration
//!
//! Client for a Lenses server: live SQL queries streamed over a WebSocket
//! and quota administration over REST.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core types
//!   - `quota`: Quota configuration, listing entries and targets
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Frame transport and quota API interfaces
//!   - `services`: Quota commands
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `live`: Live query session (endpoint, read loop, listeners)
//!   - `rest`: HTTP client for the administration API
//!   - `config`: Environment configuration
//!   - `cli`: `lenses` command line
//!
//! # Data Flow
//!
//! ```text
//!                  ┌──────────────┐     ┌─────────────┐
//! Lenses WS ──────►│  Read Loop   │────►│  Listeners  │──► caller
//!                  └──────┬───────┘     └──────┬──────┘
//!                         │ faults             │ faults
//!                         ▼                    ▼
//!                  ┌──────────────────────────────────┐
//!                  │          Error Channel           │──► caller
//!                  └──────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::quota::{Quota, QuotaConfig, QuotaTarget};

// Ports and services
pub use application::ports::{Frame, FrameTransport, QuotaError, QuotaPort, TransportError};
pub use application::services::{CommandError, QuotaCommands};

// Live sessions
pub use infrastructure::live::{
    CodecError, ConnectError, Data, Decoded, JsonCodec, ListenerRegistry, LiveConfig,
    LiveConnection, LiveError, LiveResponse, Metadata, ResponseType, Subscription, TlsPolicy,
    WsTransport,
};

// REST client
pub use infrastructure::rest::{LensesHttpClient, RestConfig};

// Configuration
pub use infrastructure::config::{ClientConfig, ConfigError, Credentials, SessionSettings};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
