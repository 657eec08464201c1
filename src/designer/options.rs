//! Designer configuration.

use crate::engine::{DEFAULT_OCR_DPI, PREVIEW_DPI};
use crate::error::Result;
use crate::geometry::Scale;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for a [`Designer`](super::Designer).
///
/// Missing keys in a settings file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignerOptions {
    /// Resolution page previews are rendered at
    pub preview_dpi: u32,

    /// Initial OCR resolution
    pub ocr_dpi: u32,

    /// Maximum number of activity log entries kept
    pub log_capacity: usize,

    /// Initial zoom level
    pub initial_scale: Scale,

    /// Display x of newly added fields
    pub new_field_x: f64,

    /// Display width of newly added fields
    pub new_field_width: f64,

    /// Display height of newly added fields
    pub new_field_height: f64,
}

impl DesignerOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON settings file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let options = Self::from_json_str(&json)?;
        log::debug!("Loaded designer options from {}", path.as_ref().display());
        Ok(options)
    }

    /// Set preview resolution.
    pub fn with_preview_dpi(mut self, dpi: u32) -> Self {
        self.preview_dpi = dpi;
        self
    }

    /// Set initial OCR resolution.
    pub fn with_ocr_dpi(mut self, dpi: u32) -> Self {
        self.ocr_dpi = dpi;
        self
    }

    /// Set activity log capacity.
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Set initial zoom level.
    pub fn with_initial_scale(mut self, scale: Scale) -> Self {
        self.initial_scale = scale;
        self
    }

    /// Set the display x, width and height of new fields.
    pub fn with_new_field_geometry(mut self, x: f64, width: f64, height: f64) -> Self {
        self.new_field_x = x;
        self.new_field_width = width;
        self.new_field_height = height;
        self
    }
}

impl Default for DesignerOptions {
    fn default() -> Self {
        Self {
            preview_dpi: PREVIEW_DPI,
            ocr_dpi: DEFAULT_OCR_DPI,
            log_capacity: 1000,
            initial_scale: Scale::default(),
            new_field_x: 10.0,
            new_field_width: 80.0,
            new_field_height: 40.0,
        }
    }
}
