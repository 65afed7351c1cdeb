//! `lenses query` handler.
//!
//! Every message is printed to `out` as one JSON line. Faults from the
//! error channel go to `err`. A non-live query finishes on `END`; a live
//! query runs until the signal fires or the server closes the stream.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::live::{JsonCodec, LiveConnection, LiveError, ResponseType, Subscription};

/// Writer shared between listeners.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Summary of a finished query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryReport {
    /// Number of `RECORD` messages received.
    pub records: usize,
    /// Whether the server answered with `ERROR` or `INVALIDREQUEST`.
    pub failed: bool,
}

/// Print a session's messages until it finishes.
///
/// # Errors
///
/// Returns the error from closing the session.
pub async fn run_query<S>(
    conn: &LiveConnection,
    out: SharedWriter,
    err: SharedWriter,
    signal: S,
) -> Result<QueryReport, LiveError>
where
    S: Future<Output = ()>,
{
    let ended = CancellationToken::new();
    let records = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicBool::new(false));

    let codec = JsonCodec::new();
    conn.on(Subscription::Wildcard, move |msg| {
        let line = codec.encode(msg)?;
        writeln!(out.lock(), "{line}")?;
        Ok(())
    });

    let counter = Arc::clone(&records);
    conn.on_record(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(())
    });

    for failure in [ResponseType::Error, ResponseType::InvalidRequest] {
        let failed = Arc::clone(&failed);
        conn.on(failure, move |_| {
            failed.store(true, Ordering::Relaxed);
            Ok(())
        });
    }

    if !conn.config().live {
        let ended = ended.clone();
        conn.on_end(move |_| {
            ended.cancel();
            Ok(())
        });
    }

    let drain = conn.take_errors().map(|mut faults| {
        tokio::spawn(async move {
            while let Some(fault) = faults.recv().await {
                let _ = writeln!(err.lock(), "{fault}");
            }
        })
    });

    conn.wait(async {
        tokio::select! {
            () = signal => {}
            () = ended.cancelled() => tracing::debug!("Query finished"),
        }
    })
    .await?;

    if let Some(drain) = drain {
        let _ = drain.await;
    }

    Ok(QueryReport {
        records: records.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
    })
}
