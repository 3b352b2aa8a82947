//! Application state for the web layer.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::services::ObservationWindow;
use crate::snapshot::{BuildStatus, NetworkSnapshot};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
pub struct AppState<S> {
    /// Rail data store
    pub store: Arc<S>,

    /// Station and connection snapshots
    pub snapshot: NetworkSnapshot,

    /// Window used for per-station adjacency
    pub window: ObservationWindow,

    /// HTTP response cache
    pub cache: ResponseCache,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            snapshot: self.snapshot.clone(),
            window: self.window,
            cache: self.cache.clone(),
        }
    }
}

impl<S> AppState<S> {
    /// Create a new app state.
    pub fn new(
        store: Arc<S>,
        snapshot: NetworkSnapshot,
        window: ObservationWindow,
        cache: ResponseCache,
    ) -> Self {
        Self {
            store,
            snapshot,
            window,
            cache,
        }
    }
}

impl<S> AppState<S> {
    /// Clear cached responses whenever a snapshot build completes, so
    /// station listings and connections reflect the new snapshot.
    ///
    /// The task ends when the snapshot is dropped.
    pub fn spawn_cache_invalidation(&self) -> JoinHandle<()> {
        let mut status = self.snapshot.subscribe();
        let cache = self.cache.clone();

        tokio::spawn(async move {
            while status.changed().await.is_ok() {
                let finished = matches!(
                    *status.borrow_and_update(),
                    BuildStatus::Ready | BuildStatus::Disabled
                );
                if finished {
                    debug!("snapshot replaced, clearing response cache");
                    cache.invalidate_all();
                }
            }
        })
    }
}
