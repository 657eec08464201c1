//! Values produced by the parsing engine.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Document-level information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Number of pages
    pub page_count: usize,
}

/// A rendered page image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePreview {
    /// Image width in pixels
    pub width: f64,
    /// Image height in pixels
    pub height: f64,
    /// Encoded image bytes
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl PagePreview {
    /// Create a preview with dimensions and no image bytes.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            data: Vec::new(),
        }
    }
}

/// An image embedded in a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// One cell of an extracted table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTableCell {
    /// Row index
    pub row: usize,
    /// Column index
    pub column: usize,
    /// Cell text
    pub text: String,
}

impl PageTableCell {
    /// Create a cell.
    pub fn new(row: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            row,
            column,
            text: text.into(),
        }
    }
}

/// Extracted content of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageArea {
    /// Text region
    Text {
        /// Extracted text
        text: String,
        /// Region on the page, if reported
        rectangle: Option<Rect>,
    },

    /// Table region
    Table {
        /// Cells in row-major order
        cells: Vec<PageTableCell>,
        /// Region on the page, if reported
        rectangle: Option<Rect>,
    },

    /// Barcode region
    Barcode {
        /// Decoded value
        value: String,
        /// Region on the page, if reported
        rectangle: Option<Rect>,
    },
}

impl PageArea {
    /// Create a text area.
    pub fn text(text: impl Into<String>) -> Self {
        PageArea::Text {
            text: text.into(),
            rectangle: None,
        }
    }

    /// Create a table area.
    pub fn table(cells: Vec<PageTableCell>) -> Self {
        PageArea::Table {
            cells,
            rectangle: None,
        }
    }

    /// Create a barcode area.
    pub fn barcode(value: impl Into<String>) -> Self {
        PageArea::Barcode {
            value: value.into(),
            rectangle: None,
        }
    }

    /// Text to show for this area: verbatim text, tab-joined cells, or the
    /// decoded barcode value.
    pub fn display_text(&self) -> String {
        match self {
            PageArea::Text { text, .. } => text.clone(),
            PageArea::Table { cells, .. } => cells
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\t"),
            PageArea::Barcode { value, .. } => value.clone(),
        }
    }
}

/// A named extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    /// Template item name
    pub name: String,
    /// Page the value was found on (0-based)
    pub page_index: usize,
    /// Extracted content
    pub area: PageArea,
}

impl FieldData {
    /// Create a result.
    pub fn new(name: impl Into<String>, page_index: usize, area: PageArea) -> Self {
        Self {
            name: name.into(),
            page_index,
            area,
        }
    }

    /// Shorthand for [`PageArea::display_text`].
    pub fn text(&self) -> String {
        self.area.display_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text() {
        assert_eq!(PageArea::text("Hello").display_text(), "Hello");
        assert_eq!(PageArea::barcode("12345").display_text(), "12345");

        let table = PageArea::table(vec![
            PageTableCell::new(0, 0, "Name"),
            PageTableCell::new(0, 1, "Qty"),
            PageTableCell::new(1, 0, "Bolt"),
        ]);
        assert_eq!(table.display_text(), "Name\tQty\tBolt");
    }

    #[test]
    fn test_empty_table_text() {
        assert_eq!(PageArea::table(Vec::new()).display_text(), "");
    }
}
