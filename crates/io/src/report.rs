//! Grid builders for the two sheet shapes: grouped completeness sheets and
//! flat inventory listings.

use std::collections::HashMap;

use mediagrid_recon::model::UNKNOWN;
use mediagrid_recon::{GroupStatus, InventoryItem, ReconciliationResult, Status};

use crate::grid::{Alignment, CellValue, Grid, GridCell, Highlight};

pub const DEFAULT_PADDING: usize = 2;

// ---------------------------------------------------------------------------
// Quality classifier
// ---------------------------------------------------------------------------

/// Maps a quality tier (e.g. a video resolution) to a row highlight.
///
/// Tier values come from configuration; matching is case-insensitive and
/// ignores surrounding whitespace. Unlisted tiers get no highlight.
#[derive(Debug, Clone, Default)]
pub struct QualityClassifier {
    tiers: HashMap<String, Highlight>,
}

impl QualityClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tiers` as belonging to `highlight`. Later registrations win.
    pub fn with_tiers<I, S>(mut self, highlight: Highlight, tiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tier in tiers {
            self.tiers.insert(normalize_tier(tier.as_ref()), highlight);
        }
        self
    }

    pub fn classify(&self, tier: Option<&str>) -> Highlight {
        tier.and_then(|t| self.tiers.get(&normalize_tier(t)))
            .copied()
            .unwrap_or(Highlight::None)
    }
}

fn normalize_tier(tier: &str) -> String {
    tier.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Grouped sheet
// ---------------------------------------------------------------------------

/// Build a completeness sheet: `[Title, Complete Series, Season 1 … Season max]`.
///
/// `max` is the largest catalog group count over all results, so every row
/// has the same width; seasons past an item's own range render as empty
/// nonexistent cells. Rows keep the order of `results`.
pub fn build_grouped_grid(name: &str, results: &[ReconciliationResult], padding: usize) -> Grid {
    let max_groups = results
        .iter()
        .filter_map(|r| r.expected_group_count)
        .max()
        .unwrap_or(0);

    let mut header = vec![GridCell::header("Show Title"), GridCell::header("Complete Series")];
    header.extend((1..=max_groups).map(|g| GridCell::header(format!("Season {g}"))));

    let body = results
        .iter()
        .map(|r| {
            let mut row = Vec::with_capacity(max_groups as usize + 2);
            row.push(GridCell::body(r.title.as_str(), Alignment::Start));
            row.push(GridCell::body(r.aggregate_label(), Alignment::Center).with_highlight(aggregate_highlight(r.aggregate)));
            row.extend((1..=max_groups).map(|g| group_cell(r, g)));
            row
        })
        .collect();

    Grid::new(name, header, body, padding)
}

fn aggregate_highlight(status: Status) -> Highlight {
    match status {
        Status::Complete => Highlight::Complete,
        Status::Partial => Highlight::Partial,
        _ => Highlight::None,
    }
}

fn group_cell(result: &ReconciliationResult, group: u32) -> GridCell {
    let Some(gs) = result.group(group) else {
        // Past this item's range. Without a catalog there is no range to
        // be outside of, so leave it plain.
        let highlight = if result.expected_group_count.is_some() {
            Highlight::Nonexistent
        } else {
            Highlight::None
        };
        return GridCell::body(CellValue::Empty, Alignment::Center).with_highlight(highlight);
    };
    GridCell::body(group_value(gs), Alignment::Center).with_highlight(group_highlight(gs.status))
}

fn group_value(gs: &GroupStatus) -> CellValue {
    match (gs.status, gs.expected) {
        (Status::Nonexistent, _) => CellValue::Empty,
        (Status::Unknown, _) if gs.local > 0 => CellValue::Number(f64::from(gs.local)),
        (Status::Unknown, _) => CellValue::Empty,
        (_, Some(expected)) => CellValue::Text(format!("{}/{}", gs.local, expected)),
        (_, None) => CellValue::Empty,
    }
}

fn group_highlight(status: Status) -> Highlight {
    match status {
        Status::Complete => Highlight::Complete,
        Status::Partial => Highlight::Partial,
        Status::Nonexistent => Highlight::Nonexistent,
        Status::Missing | Status::Unknown => Highlight::None,
    }
}

// ---------------------------------------------------------------------------
// Flat sheet
// ---------------------------------------------------------------------------

/// Columns of a flat inventory sheet, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatColumn {
    Title,
    VideoResolution,
    Year,
    Studio,
    ContentRating,
    File,
    Container,
    Bitrate,
}

impl FlatColumn {
    pub const ALL: [FlatColumn; 8] = [
        Self::Title,
        Self::VideoResolution,
        Self::Year,
        Self::Studio,
        Self::ContentRating,
        Self::File,
        Self::Container,
        Self::Bitrate,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::VideoResolution => "Video Resolution",
            Self::Year => "Year",
            Self::Studio => "Studio",
            Self::ContentRating => "Content Rating",
            Self::File => "File",
            Self::Container => "Container",
            Self::Bitrate => "Bitrate (kbps)",
        }
    }

    /// Title and path columns read left to right; everything else is centered.
    pub fn alignment(self) -> Alignment {
        match self {
            Self::Title | Self::File => Alignment::Start,
            _ => Alignment::Center,
        }
    }

    fn value(self, item: &InventoryItem) -> CellValue {
        let a = &item.attributes;
        let text = |v: &Option<String>| CellValue::Text(v.clone().unwrap_or_else(|| UNKNOWN.to_string()));
        match self {
            Self::Title => CellValue::Text(item.title.clone()),
            Self::VideoResolution => text(&a.resolution),
            Self::Year => a.year.map_or_else(|| UNKNOWN.into(), |y| CellValue::Number(f64::from(y))),
            Self::Studio => text(&a.studio),
            Self::ContentRating => text(&a.content_rating),
            Self::File => text(&a.file),
            Self::Container => text(&a.container),
            Self::Bitrate => a.bitrate_kbps.map_or_else(|| UNKNOWN.into(), |b| CellValue::Number(f64::from(b))),
        }
    }
}

/// Sort key for titles: case-insensitive first, original text as tiebreak.
fn title_sort_key(title: &str) -> (String, String) {
    (title.to_lowercase(), title.to_string())
}

/// Sort reconciliation results alphabetically by title, the order used for
/// grouped sheets.
pub fn sort_results_by_title(results: &mut [ReconciliationResult]) {
    results.sort_by_cached_key(|r| title_sort_key(&r.title));
}

/// Build a flat listing, one row per item sorted by title. Each row carries
/// the highlight its resolution tier maps to.
pub fn build_flat_grid(name: &str, items: &[InventoryItem], classifier: &QualityClassifier, padding: usize) -> Grid {
    let header = FlatColumn::ALL.iter().map(|c| GridCell::header(c.header())).collect();

    let mut sorted: Vec<&InventoryItem> = items.iter().collect();
    sorted.sort_by_cached_key(|item| title_sort_key(&item.title));

    let body = sorted
        .into_iter()
        .map(|item| {
            let highlight = classifier.classify(item.attributes.resolution.as_deref());
            FlatColumn::ALL
                .iter()
                .map(|col| GridCell::body(col.value(item), col.alignment()).with_highlight(highlight))
                .collect()
        })
        .collect();

    Grid::new(name, header, body, padding)
}
