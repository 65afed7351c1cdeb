//! Live Connection
//!
//! A single streaming SQL session: one transport, one read loop task, one
//! listener registry and one error channel.
//!
//! # Lifecycle
//!
//! ```text
//! open ──► read loop ──► dispatch ──► listeners
//!   │          │
//!   │          └─ faults ──► error channel ──► caller
//!   │
//!   └─ close / wait(signal) / transport end ──► teardown (once)
//! ```
//!
//! # Error channel policy
//!
//! The error channel is bounded (`LiveConfig::error_buffer`, default 1).
//! When it is full the read loop waits for the caller to drain it, which
//! also pauses message delivery. Closing the session cancels a pending
//! push; that fault is logged and dropped. Faults raised after the
//! receiver was dropped are logged and discarded.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::codec::{Decoded, JsonCodec};
use super::endpoint::LiveConfig;
use super::error::LiveError;
use super::listeners::{Listener, ListenerRegistry};
use super::messages::{LiveResponse, ResponseType, Subscription};
use super::transport::WsTransport;
use crate::application::ports::{Frame, FrameTransport, TransportError};
use crate::infrastructure::metrics;

// =============================================================================
// Shared Session State
// =============================================================================

#[derive(Debug)]
struct SessionState {
    id: Uuid,
    registry: ListenerRegistry,
    closed: AtomicBool,
    /// Stop signal observed by the read loop.
    stop: CancellationToken,
    /// Fired once the read loop has released the transport.
    done: CancellationToken,
}

impl SessionState {
    /// Transition open → closed. Only the first caller gets `true`.
    fn mark_closed(&self) -> bool {
        self.closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Runs the read loop's teardown on every exit path, including unwinding
/// out of a panicking listener.
struct TeardownGuard(Arc<SessionState>);

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        if self.0.mark_closed() {
            tracing::debug!(session = %self.0.id, "Read loop ended, session self-closed");
        }
        self.0.stop.cancel();
        self.0.done.cancel();
        metrics::record_session_closed();
    }
}

// =============================================================================
// Live Connection
// =============================================================================

/// A live SQL streaming session.
///
/// Listeners may be registered at any time; a message only reaches the
/// listeners registered before it was dispatched.
///
/// # Example
///
/// ```no_run
/// use lenses_client::{LiveConfig, LiveConnection, ResponseType, Subscription};
///
/// # async fn run() -> Result<(), lenses_client::LiveError> {
/// let config = LiveConfig::new("https://lenses.example.com", "token", "SELECT * FROM orders")
///     .with_live(true);
/// let conn = LiveConnection::open(config).await?;
///
/// conn.on(ResponseType::Record, |msg| {
///     println!("{}", msg.data.value_json().unwrap_or("null"));
///     Ok(())
/// });
/// conn.on(Subscription::Wildcard, |msg| {
///     tracing::debug!(typ = %msg.typ, "message");
///     Ok(())
/// });
///
/// conn.wait(async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await
/// # }
/// ```
pub struct LiveConnection {
    state: Arc<SessionState>,
    config: LiveConfig,
    reader: Mutex<Option<JoinHandle<Result<(), TransportError>>>>,
    errors: Mutex<Option<mpsc::Receiver<LiveError>>>,
}

impl LiveConnection {
    /// Connect to the SQL execution endpoint and start reading.
    ///
    /// Returns as soon as the upgrade handshake completes; messages are
    /// read on a separate task.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Connect`] if the handshake fails. No read loop
    /// is started in that case.
    pub async fn open(config: LiveConfig) -> Result<Self, LiveError> {
        let transport = WsTransport::dial(&config).await?;
        Ok(Self::start(config, transport))
    }

    /// Start a session over an already established transport.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start<T: FrameTransport>(config: LiveConfig, transport: T) -> Self {
        let state = Arc::new(SessionState {
            id: Uuid::new_v4(),
            registry: ListenerRegistry::new(),
            closed: AtomicBool::new(false),
            stop: CancellationToken::new(),
            done: CancellationToken::new(),
        });

        let (error_tx, error_rx) = mpsc::channel(config.effective_error_buffer());

        let read_loop = ReadLoop {
            transport,
            dispatcher: Dispatcher {
                state: Arc::clone(&state),
                errors: error_tx,
                codec: JsonCodec::new(),
                debug: config.debug,
            },
        };

        tracing::info!(session = %state.id, live = config.live, "Live session started");
        metrics::record_session_opened();

        let span = tracing::info_span!("live_session", session = %state.id);
        let reader = tokio::spawn(read_loop.run().instrument(span));

        Self {
            state,
            config,
            reader: Mutex::new(Some(reader)),
            errors: Mutex::new(Some(error_rx)),
        }
    }

    /// Session identifier used in logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.state.id
    }

    /// Configuration the session was opened with.
    #[must_use]
    pub const fn config(&self) -> &LiveConfig {
        &self.config
    }

    /// Take the error channel.
    ///
    /// Returns `None` after the first call.
    pub fn take_errors(&self) -> Option<mpsc::Receiver<LiveError>> {
        self.errors.lock().take()
    }

    /// Register a listener for a message type, or for every type with
    /// [`Subscription::Wildcard`].
    pub fn on<F>(&self, subscription: impl Into<Subscription>, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.state.registry.register(subscription.into(), listener);
    }

    /// Register a listener for `ERROR` messages.
    pub fn on_error<F>(&self, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(ResponseType::Error, listener);
    }

    /// Register a listener for `INVALIDREQUEST` messages.
    pub fn on_invalid_request<F>(&self, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(ResponseType::InvalidRequest, listener);
    }

    /// Register a listener for `RECORD` messages.
    pub fn on_record<F>(&self, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(ResponseType::Record, listener);
    }

    /// Register a listener for `HEARTBEAT` messages.
    pub fn on_heartbeat<F>(&self, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(ResponseType::Heartbeat, listener);
    }

    /// Register a listener for `SUCCESS` messages.
    pub fn on_success<F>(&self, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(ResponseType::Success, listener);
    }

    /// Register a listener for `STATS` messages.
    pub fn on_stats<F>(&self, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(ResponseType::Stats, listener);
    }

    /// Register a listener for `END` messages.
    pub fn on_end<F>(&self, listener: F)
    where
        F: Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on(ResponseType::End, listener);
    }

    /// Whether the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    /// Resolves once the read loop has stopped and released the transport.
    pub async fn closed(&self) {
        self.state.done.cancelled().await;
    }

    /// Stop reading and release the transport.
    ///
    /// Only the first call performs the teardown; later calls, and calls
    /// made after the session closed itself, return `Ok(())` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Transport`] if releasing the transport failed.
    pub async fn close(&self) -> Result<(), LiveError> {
        if !self.state.mark_closed() {
            tracing::trace!(session = %self.state.id, "Live session already closed");
            return Ok(());
        }

        tracing::debug!(session = %self.state.id, "Terminating live session");
        self.state.stop.cancel();

        let reader = self.reader.lock().take();
        let Some(reader) = reader else {
            return Ok(());
        };

        match reader.await {
            Ok(released) => released.map_err(LiveError::from),
            Err(e) => {
                tracing::warn!(session = %self.state.id, error = %e, "Read loop task failed");
                Ok(())
            }
        }
    }

    /// Wait until `signal` fires, then close the session.
    ///
    /// Returns early, without error, if the session closes on its own
    /// first.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Self::close`].
    pub async fn wait<S>(&self, signal: S) -> Result<(), LiveError>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            () = signal => {
                tracing::info!(session = %self.state.id, "Interrupt received, closing live session");
                self.close().await
            }
            () = self.closed() => Ok(()),
        }
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        self.state.stop.cancel();
    }
}

impl std::fmt::Debug for LiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConnection")
            .field("id", &self.state.id)
            .field("closed", &self.is_closed())
            .field("registry", &self.state.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Read Loop
// =============================================================================

struct ReadLoop<T> {
    transport: T,
    dispatcher: Dispatcher,
}

impl<T: FrameTransport> ReadLoop<T> {
    /// Read and dispatch until stopped or the transport ends, then
    /// release the transport.
    async fn run(mut self) -> Result<(), TransportError> {
        let state = Arc::clone(&self.dispatcher.state);
        let _teardown = TeardownGuard(Arc::clone(&state));
        let session = state.id;

        loop {
            if state.stop.is_cancelled() {
                tracing::debug!(session = %session, "Stop receiving by signal");
                break;
            }

            let frame = tokio::select! {
                biased;
                () = state.stop.cancelled() => {
                    tracing::debug!(session = %session, "Stop receiving by signal");
                    break;
                }
                frame = self.transport.next_frame() => frame,
            };

            match frame {
                None => {
                    tracing::info!(session = %session, "SQL stream ended");
                    break;
                }
                Some(Err(e)) => {
                    let terminal = e.is_terminal();
                    self.dispatcher.report(LiveError::Transport(e)).await;
                    if terminal {
                        tracing::warn!(session = %session, "Transport unusable, closing session");
                        break;
                    }
                }
                Some(Ok(frame)) => self.dispatcher.handle(frame).await,
            }
        }

        state.mark_closed();
        state.stop.cancel();

        let released = self.transport.release().await;
        if let Err(e) = &released {
            tracing::warn!(session = %session, error = %e, "Failed to release transport");
        }
        released
    }
}

/// Decodes frames, runs listeners and pushes faults.
struct Dispatcher {
    state: Arc<SessionState>,
    errors: mpsc::Sender<LiveError>,
    codec: JsonCodec,
    debug: bool,
}

impl Dispatcher {
    async fn handle(&self, frame: Frame) {
        let decoded = match frame {
            Frame::Text(text) => self.codec.decode(&text),
            Frame::Binary(data) => self.codec.decode_bytes(&data),
        };

        match decoded {
            Ok(Decoded::Message(response)) => self.dispatch(&response).await,
            Ok(Decoded::Unknown(tag)) => {
                tracing::debug!(session = %self.state.id, tag = %tag, "Skipping message with unknown type");
            }
            Err(e) => self.report(LiveError::Decode(e)).await,
        }
    }

    /// Invoke the listeners for a message in registration order.
    async fn dispatch(&self, response: &LiveResponse) {
        let started = Instant::now();
        metrics::record_message_received(response.typ);

        if self.debug {
            tracing::debug!(
                session = %self.state.id,
                typ = %response.typ,
                row = response.data.row_num,
                "read"
            );
        }

        for listener in self.state.registry.listeners_for(response.typ) {
            if let Err(error) = listener(response) {
                self.report(LiveError::Listener {
                    typ: response.typ,
                    error,
                })
                .await;
            }
        }

        metrics::record_dispatch_duration(response.typ, started.elapsed());
    }

    /// Push a fault to the error channel.
    async fn report(&self, err: LiveError) {
        metrics::record_fault(err.kind());
        tracing::debug!(session = %self.state.id, error = %err, "Live session fault");

        tokio::select! {
            biased;
            () = self.state.stop.cancelled() => {
                tracing::debug!(session = %self.state.id, "Session closing, fault dropped");
            }
            sent = self.errors.send(err) => {
                if sent.is_err() {
                    tracing::trace!(session = %self.state.id, "Error receiver dropped");
                }
            }
        }
    }
}
