//! Memoization of in-flight loads.
//!
//! Both caches store the shared future of a load rather than its value, so a
//! caller arriving while the load is still running attaches to it instead of
//! starting another one. A future that resolves to an error is evicted by the
//! first caller that observes the failure; the next request starts over.
//!
//! Locks are only held while a slot is read or replaced, never across an
//! await point.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use crate::core::Result;

pub(crate) type SharedLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>>>>;

/// A single memoized value, used for the manifest snapshot.
pub(crate) struct MemoCell<T> {
    slot: Mutex<Option<SharedLoad<T>>>,
}

impl<T: Send + Sync + 'static> MemoCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<SharedLoad<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the cell, starting the load with `start` if it is empty.
    pub(crate) async fn resolve<F>(&self, start: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Arc<T>>>,
    {
        let load = {
            let mut slot = self.lock();
            match slot.as_ref() {
                Some(load) => {
                    trace!("Joining cached load");
                    load.clone()
                }
                None => {
                    let load = start().shared();
                    *slot = Some(load.clone());
                    load
                }
            }
        };

        let result = load.clone().await;
        if result.is_err() {
            let mut slot = self.lock();
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&load)) {
                *slot = None;
            }
        }
        result
    }

    pub(crate) fn clear(&self) {
        *self.lock() = None;
    }
}

/// Memoized values keyed by slug.
pub(crate) struct MemoMap<T> {
    entries: DashMap<String, SharedLoad<T>>,
}

impl<T: Send + Sync + 'static> MemoMap<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Resolve `key`, starting the load with `start` if it has no entry.
    pub(crate) async fn resolve<F>(&self, key: &str, start: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Arc<T>>>,
    {
        let load = match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                trace!("Joining cached load for '{}'", key);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let load = start().shared();
                entry.insert(load.clone());
                load
            }
        };

        let result = load.clone().await;
        if result.is_err() {
            self.entries.remove_if(key, |_, current| current.ptr_eq(&load));
        }
        result
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub(crate) fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
