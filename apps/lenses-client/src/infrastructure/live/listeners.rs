//! Listener Registry
//!
//! Maps each [`ResponseType`] to the ordered list of listeners registered
//! for it. Registration takes the write lock; the read loop snapshots the
//! list for a message under the read lock and invokes it after releasing
//! the lock, so a listener may register further listeners without
//! deadlocking. Those only see later messages.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::messages::{LiveResponse, ResponseType, Subscription};

/// A message listener.
///
/// Listeners run on the read loop task, one message at a time. A listener
/// that blocks stalls delivery for the whole session.
pub type Listener = Arc<dyn Fn(&LiveResponse) -> anyhow::Result<()> + Send + Sync>;

/// Per-type listener lists.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<ResponseType, Vec<Listener>>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    ///
    /// [`Subscription::Wildcard`] registers the same listener under every
    /// message type.
    pub fn register(&self, subscription: Subscription, listener: Listener) {
        let mut listeners = self.listeners.write();

        match subscription {
            Subscription::Type(typ) => {
                listeners.entry(typ).or_default().push(listener);
            }
            Subscription::Wildcard => {
                for typ in ResponseType::ALL {
                    listeners.entry(typ).or_default().push(Arc::clone(&listener));
                }
            }
        }
    }

    /// Snapshot of the listeners for a message type, in registration order.
    #[must_use]
    pub fn listeners_for(&self, typ: ResponseType) -> Vec<Listener> {
        self.listeners.read().get(&typ).cloned().unwrap_or_default()
    }

    /// Number of listeners registered for a message type.
    #[must_use]
    pub fn count(&self, typ: ResponseType) -> usize {
        self.listeners.read().get(&typ).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<_> = ResponseType::ALL
            .into_iter()
            .map(|typ| (typ, self.count(typ)))
            .filter(|(_, n)| *n > 0)
            .collect();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &counts)
            .finish()
    }
}
