//! Live session errors.

use std::time::Duration;

use super::codec::CodecError;
use super::messages::ResponseType;
use crate::application::ports::TransportError;

/// Why the upgrade handshake failed.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// WebSocket handshake or socket error.
    #[error("{0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// The handshake did not finish in time.
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),
}

/// Faults raised by a live session.
///
/// `Connect` is returned from `LiveConnection::open`; every other variant
/// is delivered through the session's error channel.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// The session could not be established.
    #[error("connect failure for [{host}]: {source}")]
    Connect {
        /// Configured host.
        host: String,
        /// Underlying failure.
        #[source]
        source: ConnectError,
    },

    /// Error reported by the transport while reading.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be decoded.
    #[error("live: read json: [{0}]")]
    Decode(#[from] CodecError),

    /// A listener returned an error.
    #[error("listener for {typ} failed: {error:#}")]
    Listener {
        /// Type of the message being dispatched.
        typ: ResponseType,
        /// Error returned by the listener.
        error: anyhow::Error,
    },
}

impl LiveError {
    /// Metric label for the fault kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Listener { .. } => "listener",
        }
    }
}
