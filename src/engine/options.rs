//! Options passed to the parsing engine.

/// OCR rendering resolutions, in ascending order.
pub const OCR_DPIS: [u32; 7] = [72, 144, 216, 288, 360, 432, 504];

/// Default OCR resolution.
pub const DEFAULT_OCR_DPI: u32 = 288;

/// Resolution used for page previews.
pub const PREVIEW_DPI: u32 = 144;

/// Next OCR resolution above `dpi`, or `dpi` itself at the top or when it is
/// not one of [`OCR_DPIS`].
pub fn next_ocr_dpi(dpi: u32) -> u32 {
    match OCR_DPIS.iter().position(|d| *d == dpi) {
        Some(index) if index + 1 < OCR_DPIS.len() => OCR_DPIS[index + 1],
        _ => dpi,
    }
}

/// Next OCR resolution below `dpi`, or `dpi` itself at the bottom or when it
/// is not one of [`OCR_DPIS`].
pub fn previous_ocr_dpi(dpi: u32) -> u32 {
    match OCR_DPIS.iter().position(|d| *d == dpi) {
        Some(index) if index > 0 => OCR_DPIS[index - 1],
        _ => dpi,
    }
}

/// Image format of a page preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewFormat {
    /// PNG
    #[default]
    Png,
    /// JPEG
    Jpeg,
}

/// Options for rendering a page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePreviewOptions {
    /// Output format
    pub format: PreviewFormat,

    /// Rendering resolution
    pub dpi: u32,
}

impl PagePreviewOptions {
    /// Create preview options at a resolution.
    pub fn new(dpi: u32) -> Self {
        Self {
            format: PreviewFormat::Png,
            dpi,
        }
    }

    /// Set output format.
    pub fn with_format(mut self, format: PreviewFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for PagePreviewOptions {
    fn default() -> Self {
        Self::new(PREVIEW_DPI)
    }
}

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OcrOptions {
    /// How pages are rendered before recognition
    pub preview: PagePreviewOptions,
}

impl OcrOptions {
    /// Create OCR options rendering at `dpi`.
    pub fn new(dpi: u32) -> Self {
        Self {
            preview: PagePreviewOptions::new(dpi),
        }
    }
}

/// Options for extracting data by template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseByTemplateOptions {
    /// Page the template is applied to
    pub page_index: usize,

    /// Whether to run OCR
    pub use_ocr: bool,

    /// OCR settings
    pub ocr: OcrOptions,
}

impl ParseByTemplateOptions {
    /// Create options for a page.
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            use_ocr: false,
            ocr: OcrOptions::new(DEFAULT_OCR_DPI),
        }
    }

    /// Enable or disable OCR.
    pub fn with_ocr(mut self, use_ocr: bool) -> Self {
        self.use_ocr = use_ocr;
        self
    }

    /// Set OCR resolution.
    pub fn with_ocr_dpi(mut self, dpi: u32) -> Self {
        self.ocr = OcrOptions::new(dpi);
        self
    }
}

/// Options for plain-text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextOptions {
    /// Keep raw text layout
    pub raw: bool,

    /// Whether to run OCR
    pub use_ocr: bool,
}

impl TextOptions {
    /// Create text options.
    pub fn new(raw: bool, use_ocr: bool) -> Self {
        Self { raw, use_ocr }
    }
}

/// Options for generating a template from a page's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentFieldsOptions {
    /// Page to analyse
    pub page_index: usize,

    /// OCR settings
    pub ocr: OcrOptions,
}

impl AdjustmentFieldsOptions {
    /// Create options for a page.
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            ocr: OcrOptions::new(DEFAULT_OCR_DPI),
        }
    }

    /// Set OCR resolution.
    pub fn with_ocr_dpi(mut self, dpi: u32) -> Self {
        self.ocr = OcrOptions::new(dpi);
        self
    }
}
