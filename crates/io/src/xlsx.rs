//! Excel export of report grids.
//!
//! The workbook is rendered to memory and then moved into place through a
//! temp file in the destination directory, so a failed run never leaves a
//! half-written report behind.

use std::collections::HashSet;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rust_xlsxwriter::{Table, TableColumn, Workbook, Worksheet};

use crate::grid::{CellValue, Grid};
use crate::xlsx_styles::{FormatCache, Palette};

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME: usize = 31;

#[derive(Debug)]
pub enum ExportError {
    /// Destination cannot be written; detected before any work is done.
    NotWritable { path: PathBuf, reason: String },
    /// A worksheet operation was rejected.
    Sheet { sheet: String, message: String },
    /// Serializing or persisting the workbook failed.
    Save(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotWritable { path, reason } => {
                write!(f, "cannot write to {}: {reason}", path.display())
            }
            Self::Sheet { sheet, message } => write!(f, "sheet '{sheet}': {message}"),
            Self::Save(msg) => write!(f, "failed to save workbook: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Result of an Excel export operation
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Number of sheets exported
    pub sheets_exported: usize,
    /// Total non-empty cells written
    pub cells_exported: usize,
    /// Sheets registered as Excel tables
    pub tables_registered: usize,
    /// Export duration in milliseconds
    pub export_duration_ms: u128,
}

impl ExportResult {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} sheet{}, {} cells",
            self.sheets_exported,
            if self.sheets_exported == 1 { "" } else { "s" },
            self.cells_exported,
        )
    }
}

/// Fail early if `path` could not be created or replaced.
pub fn check_writable(path: &Path) -> Result<(), ExportError> {
    let not_writable = |reason: String| ExportError::NotWritable {
        path: path.to_path_buf(),
        reason,
    };

    if path.is_dir() {
        return Err(not_writable("path is a directory".into()));
    }

    let dir = parent_dir(path);
    if !dir.is_dir() {
        return Err(not_writable(format!("directory {} does not exist", dir.display())));
    }

    if path.exists() {
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| not_writable(e.to_string()))?;
    }

    // The final write goes through a temp file in the same directory.
    tempfile::Builder::new()
        .prefix(".mediagrid-probe-")
        .tempfile_in(dir)
        .map_err(|e| not_writable(e.to_string()))?;

    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Export grids to an XLSX file, one worksheet per grid in order.
pub fn export(grids: &[Grid], path: &Path, palette: &Palette) -> Result<ExportResult, ExportError> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();
    let mut workbook = Workbook::new();
    let mut formats = FormatCache::new(*palette);
    let mut used_names = HashSet::new();

    for grid in grids {
        let name = sheet_name(&grid.name, &mut used_names);
        let sheet_err = |e: rust_xlsxwriter::XlsxError| ExportError::Sheet {
            sheet: name.clone(),
            message: e.to_string(),
        };

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name).map_err(sheet_err)?;

        result.cells_exported += write_cells(worksheet, grid, &mut formats).map_err(sheet_err)?;
        apply_layout(worksheet, grid).map_err(sheet_err)?;
        if register_table(worksheet, grid, &mut formats).map_err(sheet_err)? {
            result.tables_registered += 1;
        }

        tracing::debug!(sheet = %name, rows = grid.rows.len(), cols = grid.column_count(), "sheet written");
        result.sheets_exported += 1;
    }

    let bytes = workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Save(e.to_string()))?;
    persist(path, &bytes)?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

fn persist(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".mediagrid-")
        .suffix(".xlsx.tmp")
        .tempfile_in(parent_dir(path))
        .map_err(|e| ExportError::Save(e.to_string()))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| ExportError::Save(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| ExportError::Save(e.error.to_string()))?;
    Ok(())
}

fn write_cells(
    worksheet: &mut Worksheet,
    grid: &Grid,
    formats: &mut FormatCache,
) -> Result<usize, rust_xlsxwriter::XlsxError> {
    let mut written = 0;
    for (r, row) in grid.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32, c as u16);
            let format = formats.for_cell(cell);
            match &cell.value {
                CellValue::Empty => {
                    worksheet.write_blank(r, c, format)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string_with_format(r, c, s, format)?;
                    written += 1;
                }
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(r, c, *n, format)?;
                    written += 1;
                }
            }
        }
    }
    Ok(written)
}

fn apply_layout(worksheet: &mut Worksheet, grid: &Grid) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (col, width) in grid.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width as f64)?;
    }
    if grid.frozen_rows > 0 {
        worksheet.set_freeze_panes(grid.frozen_rows, 0)?;
    }
    Ok(())
}

/// Register the grid as a table when asked to and there is data under the
/// header. Returns whether a table was added.
fn register_table(
    worksheet: &mut Worksheet,
    grid: &Grid,
    formats: &mut FormatCache,
) -> Result<bool, rust_xlsxwriter::XlsxError> {
    if !grid.as_table || grid.body_len() == 0 || grid.column_count() == 0 {
        return Ok(false);
    }

    // The table writes its own header row, so carry the header text and
    // format through the column definitions.
    let columns: Vec<TableColumn> = grid
        .header()
        .iter()
        .map(|cell| {
            TableColumn::new()
                .set_header(cell.value.display())
                .set_header_format(formats.for_cell(cell).clone())
        })
        .collect();

    let table = Table::new().set_columns(&columns);
    worksheet.add_table(
        0,
        0,
        grid.body_len() as u32,
        (grid.column_count() - 1) as u16,
        &table,
    )?;
    Ok(true)
}

/// Make `raw` a valid, unique worksheet name.
///
/// Excel rejects `[]:*?/\`, leading/trailing apostrophes, empty names and
/// names over 31 characters, and compares names case-insensitively.
pub fn sheet_name(raw: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME).collect()
    };

    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}
