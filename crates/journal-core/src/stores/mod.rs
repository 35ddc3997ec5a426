//! Client-side stores: state plus the operations that mutate it.
//!
//! Store actions follow one pattern: mark loading, clear the previous error,
//! make a single API call, reconcile local state, and record the error message
//! on failure before handing the error back to the caller.

mod auth;
mod cache;
mod diary;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub use auth::AuthStore;
pub use cache::EntryCache;
pub use diary::{DiarySnapshot, DiaryStore};

/// Counts in-flight actions of one store.
#[derive(Debug, Clone, Default)]
struct LoadingTracker {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingTracker {
    fn begin(&self) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Marks one action as settled when dropped, including when its future is
/// dropped before completion.
struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
