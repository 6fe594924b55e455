//! Mapping from grid style classes to Excel formats.

use std::collections::HashMap;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern};

use crate::grid::{Alignment, Border, GridCell, Highlight};

/// Fill colors per highlight class, as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub complete: u32,
    pub partial: u32,
    pub nonexistent: u32,
    pub low_quality: u32,
    pub high_quality: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            complete: 0x90EE90,
            partial: 0xFFB6B6,
            nonexistent: 0xD3D3D3,
            low_quality: 0xFFFFCC,
            high_quality: 0xE3F4EA,
        }
    }
}

impl Palette {
    pub fn fill(&self, highlight: Highlight) -> Option<u32> {
        match highlight {
            Highlight::None => None,
            Highlight::Complete => Some(self.complete),
            Highlight::Partial => Some(self.partial),
            Highlight::Nonexistent => Some(self.nonexistent),
            Highlight::LowQuality => Some(self.low_quality),
            Highlight::HighQuality => Some(self.high_quality),
        }
    }
}

/// Parse `RRGGBB` or `#RRGGBB`.
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

type StyleKey = (Alignment, Highlight, Border);

/// Builds each distinct format once per workbook.
pub struct FormatCache {
    palette: Palette,
    formats: HashMap<StyleKey, Format>,
}

impl FormatCache {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            formats: HashMap::new(),
        }
    }

    pub fn for_cell(&mut self, cell: &GridCell) -> &Format {
        let key = (cell.alignment, cell.highlight, cell.border);
        let palette = self.palette;
        self.formats
            .entry(key)
            .or_insert_with(|| build_format(&palette, key))
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

fn build_format(palette: &Palette, (alignment, highlight, border): StyleKey) -> Format {
    let mut format = Format::new();

    format = match alignment {
        Alignment::Start => format.set_align(FormatAlign::Left),
        Alignment::Center => format.set_align(FormatAlign::Center),
    };

    format = match border {
        Border::Header => format
            .set_bold()
            .set_border(FormatBorder::Thin)
            .set_border_bottom(FormatBorder::Thick),
        Border::Body => format.set_border(FormatBorder::Thin),
    };

    if let Some(rgb) = palette.fill(highlight) {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(rgb));
    }

    format
}
