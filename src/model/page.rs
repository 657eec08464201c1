//! Page-level types.

use super::FieldId;
use crate::geometry::{to_display, Size};

/// One rendered document page and the fields placed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    index: usize,
    document_index: usize,
    original_width: f64,
    original_height: f64,
    scale: f64,
    fields: Vec<FieldId>,
}

impl Page {
    /// Create a new empty page with original (scale 1.0) dimensions.
    pub fn new(index: usize, original_width: f64, original_height: f64, scale: f64) -> Self {
        Self {
            index,
            document_index: index,
            original_width,
            original_height,
            scale,
            fields: Vec::new(),
        }
    }

    /// Set the page's index in the source document.
    pub fn with_document_index(mut self, document_index: usize) -> Self {
        self.document_index = document_index;
        self
    }

    /// Position in the session (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the page in the source document. Equals [`Page::index`]
    /// unless earlier document pages were skipped.
    pub fn document_index(&self) -> usize {
        self.document_index
    }

    /// Width at scale 1.0.
    pub fn original_width(&self) -> f64 {
        self.original_width
    }

    /// Height at scale 1.0.
    pub fn original_height(&self) -> f64 {
        self.original_height
    }

    /// Original dimensions.
    pub fn original_size(&self) -> Size {
        Size::new(self.original_width, self.original_height)
    }

    /// Current zoom factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Width on screen.
    pub fn display_width(&self) -> f64 {
        to_display(self.original_width, self.scale)
    }

    /// Height on screen.
    pub fn display_height(&self) -> f64 {
        to_display(self.original_height, self.scale)
    }

    /// Fields placed on this page, in placement order.
    pub fn field_ids(&self) -> &[FieldId] {
        &self.fields
    }

    /// Number of fields on the page.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Check if the page has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub(crate) fn push_field(&mut self, id: FieldId) {
        self.fields.push(id);
    }

    pub(crate) fn remove_field(&mut self, id: FieldId) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| *f != id);
        self.fields.len() != before
    }

    pub(crate) fn clear_fields(&mut self) {
        self.fields.clear();
    }
}
