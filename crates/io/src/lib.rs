// Report grids and spreadsheet output

pub mod grid;
pub mod report;
pub mod xlsx;
pub mod xlsx_styles;

pub use grid::{Alignment, Border, CellValue, Grid, GridCell, Highlight};
pub use report::{build_flat_grid, build_grouped_grid, sort_results_by_title, FlatColumn, QualityClassifier};
pub use xlsx::{check_writable, export, ExportError, ExportResult};
pub use xlsx_styles::{parse_hex_color, Palette};
