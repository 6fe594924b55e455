use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

/// Text rendered for any inventory attribute the source did not report.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// External ids an inventory item may carry, as reported by the local source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalIds {
    pub imdb: Option<String>,
    pub tvdb: Option<u32>,
}

/// Flat attributes of an ungrouped item (a standalone movie file).
///
/// Every field is optional; the report renders absent values as [`UNKNOWN`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAttributes {
    pub resolution: Option<String>,
    pub year: Option<i32>,
    pub studio: Option<String>,
    pub content_rating: Option<String>,
    pub file: Option<String>,
    pub container: Option<String>,
    pub bitrate_kbps: Option<u32>,
}

/// One item enumerated from a local library section.
///
/// `key` is the inventory source's own identity for the item and is what
/// concurrent detail fetches are re-associated by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub key: String,
    pub title: String,
    pub ids: ExternalIds,
    pub attributes: MediaAttributes,
}

impl InventoryItem {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            ids: ExternalIds::default(),
            attributes: MediaAttributes::default(),
        }
    }
}

/// Locally-held unit count per group number.
///
/// Group 0 (specials) is kept so it still counts toward the item's unit total,
/// but it is never rendered as a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUnitCount {
    counts: BTreeMap<u32, u32>,
}

impl GroupUnitCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from one group number per held unit.
    pub fn from_units(groups: impl IntoIterator<Item = u32>) -> Self {
        let mut counts = BTreeMap::new();
        for group in groups {
            *counts.entry(group).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn set(&mut self, group: u32, units: u32) {
        if units == 0 {
            self.counts.remove(&group);
        } else {
            self.counts.insert(group, units);
        }
    }

    pub fn get(&self, group: u32) -> u32 {
        self.counts.get(&group).copied().unwrap_or(0)
    }

    /// Number of positive-numbered groups holding at least one unit.
    pub fn held_groups(&self) -> u32 {
        self.counts.iter().filter(|(g, n)| **g > 0 && **n > 0).count() as u32
    }

    /// Highest positive group number holding a unit, or 0.
    pub fn max_group(&self) -> u32 {
        self.counts
            .iter()
            .rev()
            .find(|(g, n)| **g > 0 && **n > 0)
            .map(|(g, _)| *g)
            .unwrap_or(0)
    }

    /// Every held unit, including groups outside any catalog range.
    pub fn total_units(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts.iter().map(|(g, n)| (*g, *n))
    }
}

impl FromIterator<(u32, u32)> for GroupUnitCount {
    fn from_iter<T: IntoIterator<Item = (u32, u32)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (group, units) in iter {
            out.set(group, units);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Expected units per group according to the external catalog.
///
/// A group missing from `group_counts` expects 0 units. `total_group_count` is
/// the highest group number observed, 0 when the catalog listed no units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub catalog_id: u64,
    pub name: String,
    pub total_group_count: u32,
    pub group_counts: BTreeMap<u32, u32>,
}

impl CatalogEntry {
    /// Aggregate a unit listing (one group number per unit) into an entry.
    /// Group 0 is dropped: the catalog's specials are not a numbered group.
    pub fn from_units(
        catalog_id: u64,
        name: impl Into<String>,
        groups: impl IntoIterator<Item = u32>,
    ) -> Self {
        let mut group_counts = BTreeMap::new();
        for group in groups.into_iter().filter(|g| *g > 0) {
            *group_counts.entry(group).or_insert(0) += 1;
        }
        let total_group_count = group_counts.keys().next_back().copied().unwrap_or(0);
        Self {
            catalog_id,
            name: name.into(),
            total_group_count,
            group_counts,
        }
    }

    pub fn expected(&self, group: u32) -> u32 {
        self.group_counts.get(&group).copied().unwrap_or(0)
    }
}

/// Outcome of a catalog lookup. `NotFound` covers both "no match" and any
/// failure while asking; it is a value, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Arc<CatalogEntry>),
    NotFound,
}

impl Lookup {
    pub fn entry(&self) -> Option<&CatalogEntry> {
        match self {
            Self::Found(entry) => Some(entry),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Completeness of one group, or of an item as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Missing,
    Partial,
    Complete,
    /// Catalog lists no units for this group.
    Nonexistent,
    /// No catalog baseline to judge against.
    Unknown,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Partial => write!(f, "partial"),
            Self::Complete => write!(f, "complete"),
            Self::Nonexistent => write!(f, "nonexistent"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStatus {
    pub group: u32,
    pub status: Status,
    pub local: u32,
    /// `None` when there is no catalog baseline.
    pub expected: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub key: String,
    pub title: String,
    /// Groups 1..=total_group_count when the catalog is known, otherwise
    /// 1..=highest locally-held group.
    pub groups: Vec<GroupStatus>,
    pub aggregate: Status,
    pub complete_count: u32,
    pub local_group_count: u32,
    pub expected_group_count: Option<u32>,
    pub local_unit_total: u32,
}

impl ReconciliationResult {
    /// Column label for the aggregate: `complete/total` or `held/?`.
    pub fn aggregate_label(&self) -> String {
        match self.expected_group_count {
            Some(total) => format!("{}/{}", self.complete_count, total),
            None => format!("{}/?", self.local_group_count),
        }
    }

    pub fn group(&self, group: u32) -> Option<&GroupStatus> {
        self.groups.iter().find(|g| g.group == group)
    }
}
