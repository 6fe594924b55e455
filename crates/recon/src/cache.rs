//! Per-run memoization of catalog lookups.
//!
//! One `LookupCache` is built per run and shared by reference with every
//! worker. Concurrent callers asking for the same identifier block on a
//! single in-flight fetch instead of issuing their own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;

use crate::catalog::{CatalogClient, CatalogId};
use crate::model::Lookup;

/// Counters reported in the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub fetches: usize,
    pub failures: usize,
    pub evictions: usize,
}

struct Slot {
    cell: Arc<OnceCell<Lookup>>,
    last_used: u64,
}

#[derive(Default)]
struct Slots {
    by_key: HashMap<String, Slot>,
    clock: u64,
}

pub struct LookupCache<C> {
    client: C,
    capacity: usize,
    slots: Mutex<Slots>,
    hits: AtomicUsize,
    fetches: AtomicUsize,
    failures: AtomicUsize,
    evictions: AtomicUsize,
}

impl<C: CatalogClient> LookupCache<C> {
    /// `capacity` is clamped to at least one entry.
    pub fn new(client: C, capacity: usize) -> Self {
        Self {
            client,
            capacity: capacity.max(1),
            slots: Mutex::new(Slots::default()),
            hits: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            evictions: AtomicUsize::new(0),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Return the memoized lookup for `id`, fetching it on first use.
    ///
    /// Catalog errors are logged and memoized as `NotFound`.
    pub fn get_or_fetch(&self, id: &CatalogId) -> Lookup {
        let key = id.cache_key();
        let cell = self.slot(&key);

        let mut fetched = false;
        let lookup = cell.get_or_init(|| {
            fetched = true;
            self.fetch(id)
        });
        if !fetched {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        lookup.clone()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, key: &str) -> Arc<OnceCell<Lookup>> {
        let mut slots = self.slots.lock();
        slots.clock += 1;
        let now = slots.clock;

        if let Some(slot) = slots.by_key.get_mut(key) {
            slot.last_used = now;
            return Arc::clone(&slot.cell);
        }

        // In-flight cells are never evicted; the map may briefly exceed
        // capacity when every slot is still being filled.
        while slots.by_key.len() >= self.capacity {
            let victim = slots
                .by_key
                .iter()
                .filter(|(_, slot)| slot.cell.get().is_some())
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone());
            let Some(victim) = victim else {
                break;
            };
            tracing::debug!(key = %victim, "evicting least recently used catalog entry");
            slots.by_key.remove(&victim);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        let cell = Arc::new(OnceCell::new());
        slots.by_key.insert(
            key.to_string(),
            Slot {
                cell: Arc::clone(&cell),
                last_used: now,
            },
        );
        cell
    }

    fn fetch(&self, id: &CatalogId) -> Lookup {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        match self.client.lookup(id) {
            Ok(Some(entry)) => {
                tracing::debug!(%id, groups = entry.total_group_count, "catalog match");
                Lookup::Found(Arc::new(entry))
            }
            Ok(None) => {
                tracing::debug!(%id, "no catalog match");
                Lookup::NotFound
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(%id, error = %e, "catalog lookup failed");
                Lookup::NotFound
            }
        }
    }
}
