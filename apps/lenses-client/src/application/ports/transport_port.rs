//! Frame Transport Port (Driven Port)
//!
//! Interface for the duplex connection a live session reads from. The
//! WebSocket adapter lives in `infrastructure::live::transport`.

use async_trait::async_trait;

/// One inbound data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

/// Errors raised by a transport while reading or releasing.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying socket failed.
    #[error("connection interrupted: {0}")]
    Io(#[from] std::io::Error),

    /// The peer violated the framing protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A frame exceeded the configured limits.
    #[error("capacity exceeded: {0}")]
    Capacity(String),

    /// The connection is already closed.
    #[error("connection closed")]
    Closed,

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the connection is unusable after this error.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Closed)
    }
}

/// A duplex connection delivering inbound frames.
///
/// `next_frame` must be cancel safe: the read loop races it against
/// session shutdown and drops the pending future when the session closes.
#[async_trait]
pub trait FrameTransport: Send + 'static {
    /// Wait for the next data frame.
    ///
    /// Returns `None` once the peer has closed the connection.
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;

    /// Release the connection. Called exactly once per session.
    async fn release(&mut self) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(TransportError::Io(io).is_terminal());
        assert!(TransportError::Closed.is_terminal());
        assert!(!TransportError::Protocol("bad opcode".to_string()).is_terminal());
        assert!(!TransportError::Capacity("too big".to_string()).is_terminal());
        assert!(!TransportError::Other("x".to_string()).is_terminal());
    }
}
