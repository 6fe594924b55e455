//! Abstract report grid: styled cells independent of any file format.

use serde::Serialize;

/// Horizontal alignment of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Alignment {
    #[default]
    Start,
    Center,
}

/// Fill class of a cell. The writer maps each class to a palette color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    #[default]
    None,
    LowQuality,
    HighQuality,
    Complete,
    Partial,
    Nonexistent,
}

/// Border/weight class of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Border {
    /// Bold text, thick bottom edge.
    Header,
    #[default]
    Body,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// The string a reader sees, used for width estimation.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridCell {
    pub value: CellValue,
    pub alignment: Alignment,
    pub highlight: Highlight,
    pub border: Border,
}

impl GridCell {
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            value: CellValue::Text(text.into()),
            alignment: Alignment::Center,
            highlight: Highlight::None,
            border: Border::Header,
        }
    }

    pub fn body(value: impl Into<CellValue>, alignment: Alignment) -> Self {
        Self {
            value: value.into(),
            alignment,
            highlight: Highlight::None,
            border: Border::Body,
        }
    }

    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = highlight;
        self
    }
}

/// A rectangular sheet of cells. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub name: String,
    pub rows: Vec<Vec<GridCell>>,
    /// Suggested width per column, in characters.
    pub column_widths: Vec<usize>,
    /// Rows kept visible while scrolling.
    pub frozen_rows: u32,
    /// Ask the writer to register the cells as a filterable table.
    pub as_table: bool,
}

impl Grid {
    /// Build a grid from a header row and body rows, computing column widths.
    ///
    /// Body rows must have the header's length.
    pub fn new(name: impl Into<String>, header: Vec<GridCell>, body: Vec<Vec<GridCell>>, padding: usize) -> Self {
        let mut rows = Vec::with_capacity(body.len() + 1);
        rows.push(header);
        rows.extend(body);
        debug_assert!(rows.iter().all(|r| r.len() == rows[0].len()), "ragged grid");
        let column_widths = column_widths(&rows, padding);
        Self {
            name: name.into(),
            rows,
            column_widths,
            frozen_rows: 1,
            as_table: true,
        }
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of rows below the header.
    pub fn body_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn header(&self) -> &[GridCell] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn with_table(mut self, as_table: bool) -> Self {
        self.as_table = as_table;
        self
    }
}

/// Widest displayed string per column plus `padding`.
pub fn column_widths(rows: &[Vec<GridCell>], padding: usize) -> Vec<usize> {
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    (0..cols)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|cell| cell.value.display().chars().count())
                .max()
                .unwrap_or(0)
                + padding
        })
        .collect()
}
