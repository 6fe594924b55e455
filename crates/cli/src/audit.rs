//! `mgrid audit`: inventory vs. catalog completeness report.
//!
//! Order matters: the output path is checked before the server is contacted,
//! and the server connection is verified before any section is enumerated.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use mediagrid_config::{PaletteSettings, QualitySettings, Settings};
use mediagrid_io::{
    build_flat_grid, build_grouped_grid, check_writable, export, parse_hex_color, sort_results_by_title, Grid,
    Highlight, Palette, QualityClassifier,
};
use mediagrid_recon::{compute_summary, CacheStats, LookupCache, ReconSummary};

use crate::collect::reconcile_items;
use crate::fetch::plex::find_section;
use crate::fetch::{PlexClient, Section, SectionKind, TvMazeClient};
use crate::CliError;

pub struct AuditOptions {
    pub server: String,
    pub token: String,
    /// Section titles from `--section`; empty falls back to config, then all.
    pub sections: Vec<String>,
    pub output: PathBuf,
    pub workers: usize,
    pub register_table: bool,
}

#[derive(Debug, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub kind: SectionKind,
    pub items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReconSummary>,
}

#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub output: String,
    pub sheets: Vec<SheetSummary>,
    pub cells: usize,
    pub cache: CacheStats,
    pub duration_ms: u128,
}

/// `<prefix>_<YYYYMMDD>.xlsx` in the working directory.
pub fn default_output(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}_{}.xlsx", chrono::Local::now().format("%Y%m%d")))
}

pub fn palette(settings: &PaletteSettings) -> Result<Palette, CliError> {
    let color = |name: &str, value: &str| {
        parse_hex_color(value).ok_or_else(|| CliError::args(format!("palette.{name}: invalid color \"{value}\"")))
    };
    Ok(Palette {
        complete: color("complete", &settings.complete)?,
        partial: color("partial", &settings.partial)?,
        nonexistent: color("nonexistent", &settings.nonexistent)?,
        low_quality: color("low_quality", &settings.low_quality)?,
        high_quality: color("high_quality", &settings.high_quality)?,
    })
}

pub fn quality_classifier(settings: &QualitySettings) -> QualityClassifier {
    QualityClassifier::new()
        .with_tiers(Highlight::LowQuality, &settings.low)
        .with_tiers(Highlight::HighQuality, &settings.high)
}

/// Resolve requested section names against the server's sections.
/// No names selects every movie and show section.
pub fn select_sections<'a>(available: &'a [Section], names: &[String]) -> Result<Vec<&'a Section>, CliError> {
    if names.is_empty() {
        return Ok(available.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            find_section(available, name).ok_or_else(|| {
                CliError::args(format!("unknown library section: {name}"))
                    .with_hint("run `mgrid sections` to list movie and show sections")
            })
        })
        .collect()
}

pub fn run_audit(settings: &Settings, opts: &AuditOptions) -> Result<AuditReport, CliError> {
    let started = Instant::now();

    // Fail before any network work if the report can't be written
    check_writable(&opts.output)?;
    let palette = palette(&settings.palette)?;

    let plex = PlexClient::new(&opts.server, &opts.token, Duration::from_secs(settings.inventory.timeout_secs))
        .map_err(CliError::connect)?;
    let identity = plex.connect().map_err(CliError::connect)?;
    debug!(server = %opts.server, version = ?identity.version, "connected to inventory server");

    let available = plex.sections().map_err(CliError::connect)?;
    let names = if opts.sections.is_empty() { &settings.inventory.sections } else { &opts.sections };
    let selected = select_sections(&available, names)?;
    if selected.is_empty() {
        return Err(CliError::general("server has no movie or show sections to report"));
    }

    let catalog = TvMazeClient::with_base_url(&settings.catalog.base_url, Duration::from_secs(settings.catalog.timeout_secs))
        .map_err(|e| CliError::general(e.to_string()))?;
    let cache = LookupCache::new(catalog, settings.catalog.cache_capacity);
    let classifier = quality_classifier(&settings.quality);
    let padding = settings.report.column_padding;

    let mut grids: Vec<Grid> = Vec::with_capacity(selected.len());
    let mut sheets = Vec::with_capacity(selected.len());
    for section in selected {
        let items = plex.list_items(section).map_err(CliError::connect)?;
        info!(section = %section.title, items = items.len(), "listed section");

        let (grid, status) = match section.kind {
            SectionKind::Movie => (build_flat_grid(&section.title, &items, &classifier, padding), None),
            SectionKind::Show => {
                let mut results = reconcile_items(&plex, &cache, &items, opts.workers);
                sort_results_by_title(&mut results);
                let summary = compute_summary(&results);
                (build_grouped_grid(&section.title, &results, padding), Some(summary))
            }
        };
        grids.push(grid.with_table(opts.register_table));
        sheets.push(SheetSummary { name: section.title.clone(), kind: section.kind, items: items.len(), status });
    }

    let exported = export(&grids, &opts.output, &palette)?;
    info!("{}", exported.summary());

    Ok(AuditReport {
        output: opts.output.display().to_string(),
        sheets,
        cells: exported.cells_exported,
        cache: cache.stats(),
        duration_ms: started.elapsed().as_millis(),
    })
}

/// Human-readable run summary on stderr.
pub fn print_summary(report: &AuditReport) {
    for sheet in &report.sheets {
        match &sheet.status {
            Some(s) => eprintln!(
                "{}: {} {}s ({} complete, {} partial, {} missing, {} unknown)",
                sheet.name,
                sheet.items,
                sheet.kind.as_str(),
                s.complete,
                s.partial,
                s.missing,
                s.unknown,
            ),
            None => eprintln!("{}: {} {}s", sheet.name, sheet.items, sheet.kind.as_str()),
        }
    }
    if report.cache.fetches > 0 || report.cache.hits > 0 {
        eprintln!(
            "catalog: {} lookups, {} cached, {} failed",
            report.cache.fetches, report.cache.hits, report.cache.failures,
        );
    }
    eprintln!("Export complete: {} ({} cells, {}ms)", report.output, report.cells, report.duration_ms);
}

/// Resolve `--output`, falling back to the dated default.
pub fn resolve_output(output: Option<&Path>, settings: &Settings) -> PathBuf {
    output.map(Path::to_path_buf).unwrap_or_else(|| default_output(&settings.report.file_prefix))
}
