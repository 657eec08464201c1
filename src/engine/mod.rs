//! Document parsing engine abstraction.
//!
//! Rendering, OCR, barcode recognition and data extraction live in an
//! external engine. This module defines the calls the designer makes into it,
//! without tying the crate to any concrete implementation.

mod data;
mod options;

pub use data::{DocumentInfo, FieldData, PageArea, PageImage, PagePreview, PageTableCell};
pub use options::{
    next_ocr_dpi, previous_ocr_dpi, AdjustmentFieldsOptions, OcrOptions, PagePreviewOptions,
    ParseByTemplateOptions, PreviewFormat, TextOptions, DEFAULT_OCR_DPI, OCR_DPIS, PREVIEW_DPI,
};

use crate::error::Result;
use crate::template::Template;
use std::path::Path;

/// Lines of extracted text, produced lazily.
pub type TextLines<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Abstract interface to a document parsing engine.
///
/// Implementations are shared with background workers, so they must be
/// `Send + Sync`. Every call names the document it operates on.
pub trait ParsingEngine: Send + Sync {
    /// Return document-level information.
    fn document_info(&self, path: &Path) -> Result<DocumentInfo>;

    /// Render a page. `None` when the page cannot be rendered.
    fn page_preview(
        &self,
        path: &Path,
        page_index: usize,
        options: &PagePreviewOptions,
    ) -> Result<Option<PagePreview>>;

    /// Images embedded in a page. `None` when image extraction is unsupported.
    fn images(&self, path: &Path, page_index: usize) -> Result<Option<Vec<PageImage>>>;

    /// Stream the document's text line by line.
    fn text_lines<'a>(&'a self, path: &'a Path, options: &TextOptions) -> Result<TextLines<'a>>;

    /// Extract data for every template item.
    fn parse_by_template(
        &self,
        path: &Path,
        template: &Template,
        options: &ParseByTemplateOptions,
    ) -> Result<Vec<FieldData>>;

    /// Propose a template from the layout of one page.
    fn generate_adjustment_fields(
        &self,
        path: &Path,
        options: &AdjustmentFieldsOptions,
    ) -> Result<Template>;
}
