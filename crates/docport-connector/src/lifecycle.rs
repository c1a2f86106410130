//! Connection state of a connector.
//!
//! The store is opened by a background task. Its outcome is published once
//! through a `watch` channel, so an observer that subscribes late still sees
//! the final state.

use std::sync::{Arc, OnceLock};

use docport_storage::{DocumentStore, StorageError, StorageResult};
use tokio::sync::watch;

use crate::error::{ConnectorError, ConnectorResult};

/// Where a connector is in its lifetime.
///
/// `Ready` and `Failed` are terminal.
#[derive(Debug, Clone)]
pub enum ConnectionState {
    /// The store is being opened.
    Opening,
    /// The store is open; operations may be issued.
    Ready,
    /// The store could not be opened. There is no retry.
    Failed(Arc<StorageError>),
}

impl ConnectionState {
    /// Whether operations may be issued.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether the state will never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Opening)
    }
}

pub(crate) struct Lifecycle {
    state: watch::Sender<ConnectionState>,
    store: OnceLock<Arc<dyn DocumentStore>>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Opening);
        Self {
            state,
            store: OnceLock::new(),
        }
    }

    /// Leave `Opening` with the outcome of the open attempt.
    ///
    /// Returns `false` (and changes nothing visible) if the state already
    /// left `Opening`.
    pub(crate) fn complete(&self, outcome: StorageResult<Arc<dyn DocumentStore>>) -> bool {
        if self.state.borrow().is_terminal() {
            return false;
        }
        let next = match outcome {
            Ok(store) => {
                if self.store.set(store).is_err() {
                    return false;
                }
                ConnectionState::Ready
            },
            Err(e) => ConnectionState::Failed(Arc::new(e)),
        };
        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            *state = next;
            true
        })
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// The open store, once `Ready`.
    pub(crate) fn store(&self) -> Option<Arc<dyn DocumentStore>> {
        if !self.state.borrow().is_ready() {
            return None;
        }
        self.store.get().cloned()
    }

    pub(crate) async fn wait(&self) -> ConnectorResult<()> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(ConnectionState::is_terminal)
            .await
            .map_err(|_| ConnectorError::NotReady)?
            .clone();
        match state {
            ConnectionState::Ready => Ok(()),
            ConnectionState::Failed(cause) => Err(ConnectorError::Connection(cause)),
            ConnectionState::Opening => Err(ConnectorError::NotReady),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docport_storage::KvDocumentStore;

    fn memory() -> StorageResult<Arc<dyn DocumentStore>> {
        Ok(Arc::new(KvDocumentStore::in_memory()))
    }

    #[test]
    fn test_starts_opening() {
        let lifecycle = Lifecycle::new();
        assert!(matches!(lifecycle.state(), ConnectionState::Opening));
        assert!(lifecycle.store().is_none());
    }

    #[test]
    fn test_ready_is_final() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.complete(memory()));
        assert!(lifecycle.state().is_ready());
        assert!(lifecycle.store().is_some());

        assert!(!lifecycle.complete(Err(StorageError::Connection("late".into()))));
        assert!(lifecycle.state().is_ready());
    }

    #[test]
    fn test_failure_is_final() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.complete(Err(StorageError::Connection("nope".into()))));
        assert!(!lifecycle.complete(memory()));
        assert!(matches!(lifecycle.state(), ConnectionState::Failed(_)));
        assert!(lifecycle.store().is_none());
    }

    #[tokio::test]
    async fn test_wait_reports_outcome() {
        let lifecycle = Arc::new(Lifecycle::new());
        let mut rx = lifecycle.subscribe();

        let completer = Arc::clone(&lifecycle);
        tokio::spawn(async move {
            completer.complete(Err(StorageError::Connection("gone".into())));
        });

        let err = lifecycle.wait().await.unwrap_err();
        assert!(matches!(err, ConnectorError::Connection(ref cause)
            if matches!(**cause, StorageError::Connection(ref m) if m == "gone")));

        assert!(rx.has_changed().unwrap());
        drop(rx.borrow_and_update());
        assert!(!rx.has_changed().unwrap());
    }
}
