//! In-memory cache of compiled templates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::Result;
use crate::template::Template;

/// Maps filenames to compiled templates.
///
/// The map lock is held only long enough to find or create a key's slot.
/// Compilation runs on the slot itself, so distinct keys compile in parallel
/// while each key compiles at most once.
#[derive(Default)]
pub struct TemplateStore {
    slots: Mutex<HashMap<String, Arc<OnceCell<Template>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Store counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the template stored under `key`, compiling it with `init` if absent.
    ///
    /// Concurrent callers for the same key wait for a single `init`. A failed
    /// `init` stores nothing; the next caller tries again.
    pub fn get_or_try_insert_with<F>(&self, key: &str, init: F) -> Result<Template>
    where
        F: FnOnce() -> Result<Template>,
    {
        let slot = self.slot(key);

        let mut compiled = false;
        let template = match slot.get_or_try_init(|| {
            compiled = true;
            init()
        }) {
            Ok(template) => template,
            Err(err) => {
                self.evict_empty(key, &slot);
                return Err(err);
            }
        };

        if compiled {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = key, "Template cache hit");
        }

        Ok(template.clone())
    }

    /// The stored template for `key`, if one has been compiled.
    pub fn get(&self, key: &str) -> Option<Template> {
        self.slots.lock().get(key).and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of compiled entries.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of compiled entries, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn slot(&self, key: &str) -> Arc<OnceCell<Template>> {
        let mut slots = self.slots.lock();
        match slots.get(key) {
            Some(slot) => Arc::clone(slot),
            None => {
                let slot = Arc::new(OnceCell::new());
                slots.insert(key.to_string(), Arc::clone(&slot));
                slot
            }
        }
    }

    /// Drop `key`'s slot if it is still `slot` and was never filled.
    fn evict_empty(&self, key: &str, slot: &Arc<OnceCell<Template>>) {
        let mut slots = self.slots.lock();
        if let Some(current) = slots.get(key) {
            if Arc::ptr_eq(current, slot) && current.get().is_none() {
                slots.remove(key);
            }
        }
    }
}

impl std::fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateStore")
            .field("keys", &self.keys())
            .field("stats", &self.stats())
            .finish()
    }
}
