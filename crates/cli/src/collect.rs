//! Per-item detail fetch + reconciliation on a bounded worker pool.
//!
//! Workers pull items off a shared index, fetch the item's group unit counts,
//! resolve the catalog entry through the shared [`LookupCache`] and send the
//! finished result over a channel. The collecting thread re-associates
//! results with their items by inventory key, so output follows input order
//! no matter which worker finished first.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::{info, warn};

use mediagrid_recon::{
    reconcile, CatalogClient, CatalogId, GroupUnitCount, InventoryItem, Lookup, LookupCache, ReconciliationResult,
};

use crate::fetch::{FetchError, PlexClient};

/// Where per-item group unit counts come from.
pub trait InventorySource: Sync {
    fn group_unit_counts(&self, item: &InventoryItem) -> Result<GroupUnitCount, FetchError>;
}

impl InventorySource for PlexClient {
    fn group_unit_counts(&self, item: &InventoryItem) -> Result<GroupUnitCount, FetchError> {
        PlexClient::group_unit_counts(self, item)
    }
}

/// Reconcile one grouped item. Never fails: a detail-fetch failure makes the
/// item UNKNOWN with no local counts.
pub fn reconcile_item<S, C>(source: &S, cache: &LookupCache<C>, item: &InventoryItem) -> ReconciliationResult
where
    S: InventorySource + ?Sized,
    C: CatalogClient,
{
    info!("Processing: {}", item.title);
    let counts = match source.group_unit_counts(item) {
        Ok(counts) => counts,
        Err(e) => {
            warn!(key = %item.key, "failed to fetch details for {}: {e}", item.title);
            return reconcile(item, &GroupUnitCount::new(), &Lookup::NotFound);
        }
    };

    let lookup = cache.get_or_fetch(&CatalogId::for_item(item));
    if !lookup.is_found() {
        warn!("could not find catalog info for {}", item.title);
    }
    reconcile(item, &counts, &lookup)
}

/// Reconcile `items` on up to `workers` threads. Results come back in input
/// order.
pub fn reconcile_items<S, C>(
    source: &S,
    cache: &LookupCache<C>,
    items: &[InventoryItem],
    workers: usize,
) -> Vec<ReconciliationResult>
where
    S: InventorySource + ?Sized,
    C: CatalogClient,
{
    if items.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, items.len());
    let next = AtomicUsize::new(0);

    let mut by_key: HashMap<String, ReconciliationResult> = thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || loop {
                let Some(item) = items.get(next.fetch_add(1, Ordering::Relaxed)) else {
                    break;
                };
                if tx.send(reconcile_item(source, cache, item)).is_err() {
                    break;
                }
            });
        }
        drop(tx);
        rx.into_iter().map(|r| (r.key.clone(), r)).collect()
    });

    items.iter().filter_map(|item| by_key.remove(&item.key)).collect()
}
