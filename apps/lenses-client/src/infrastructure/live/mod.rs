//! Live SQL Streaming
//!
//! Client for the SQL execution WebSocket endpoint.
//!
//! - `endpoint`: session configuration and URL construction
//! - `messages`: response envelope and payload types
//! - `codec`: JSON frame decoding
//! - `listeners`: per-type listener registry
//! - `transport`: tokio-tungstenite adapter for [`FrameTransport`]
//! - `connection`: session lifecycle, read loop and error channel
//!
//! [`FrameTransport`]: crate::application::ports::FrameTransport

pub mod codec;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod listeners;
pub mod messages;
pub mod transport;

pub use codec::{CodecError, Decoded, JsonCodec};
pub use connection::LiveConnection;
pub use endpoint::{DEFAULT_ERROR_BUFFER, DEFAULT_HANDSHAKE_TIMEOUT, EXECUTE_PATH, LiveConfig, TlsPolicy};
pub use error::{ConnectError, LiveError};
pub use listeners::{Listener, ListenerRegistry};
pub use messages::{Data, LiveResponse, Metadata, ResponseType, Subscription};
pub use transport::WsTransport;
