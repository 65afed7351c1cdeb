//! WebSocket Transport
//!
//! Dials the SQL execution endpoint and adapts the resulting
//! `tokio-tungstenite` stream to [`FrameTransport`].

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};

use super::endpoint::{LiveConfig, TlsPolicy};
use super::error::{ConnectError, LiveError};
use crate::application::ports::{Frame, FrameTransport, TransportError};

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::Closed
            }
            tungstenite::Error::Io(e) => Self::Io(e),
            tungstenite::Error::Protocol(e) => Self::Protocol(e.to_string()),
            tungstenite::Error::Capacity(e) => Self::Capacity(e.to_string()),
            other => Self::Other(other.to_string()),
        }
    }
}

/// A WebSocket connection to the SQL execution endpoint.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    /// Perform the upgrade handshake for a session.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Connect`] if the handshake fails or does not
    /// complete within the configured handshake timeout.
    pub async fn dial(config: &LiveConfig) -> Result<Self, LiveError> {
        let endpoint = config.endpoint();
        let timeout = config.effective_handshake_timeout();

        let mut ws_config = WebSocketConfig::default();
        if config.read_buffer_size > 0 {
            ws_config.read_buffer_size = config.read_buffer_size;
        }
        if config.write_buffer_size > 0 {
            ws_config.write_buffer_size = config.write_buffer_size;
        }

        let connector = match &config.tls {
            TlsPolicy::WebPkiRoots => None,
            TlsPolicy::Custom(tls) => Some(Connector::Rustls(Arc::clone(tls))),
        };

        tracing::info!(host = %config.host, live = config.live, "Connecting to SQL stream");

        let connect = tokio_tungstenite::connect_async_tls_with_config(
            endpoint.as_str(),
            Some(ws_config),
            false,
            connector,
        );

        let source = match tokio::time::timeout(timeout, connect).await {
            Ok(Ok((stream, response))) => {
                tracing::debug!(status = %response.status(), "WebSocket upgrade complete");
                return Ok(Self { stream });
            }
            Ok(Err(e)) => ConnectError::WebSocket(Box::new(e)),
            Err(_) => ConnectError::Timeout(timeout),
        };

        let err = LiveError::Connect {
            host: config.host.clone(),
            source,
        };
        tracing::debug!(error = %err, "SQL stream connect failed");
        Err(err)
    }
}

#[async_trait]
impl FrameTransport for WsTransport {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(Frame::Text(text.as_str().to_owned()))),
                Ok(Message::Binary(data)) => return Some(Ok(Frame::Binary(data.to_vec()))),
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!(frame = ?frame, "Server sent close frame");
                    return None;
                }
                Ok(Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn release(&mut self) -> Result<(), TransportError> {
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
