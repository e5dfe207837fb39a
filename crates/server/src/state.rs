//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::AddressStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// address store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Box<dyn AddressStore>,
}

impl AppState {
    /// Create a new application state over the given store.
    #[must_use]
    pub fn new(store: impl AddressStore + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Box::new(store),
            }),
        }
    }

    /// Get a reference to the address store.
    #[must_use]
    pub fn store(&self) -> &dyn AddressStore {
        self.inner.store.as_ref()
    }
}
