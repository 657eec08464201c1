//! JSON rendering for templates.

use super::Template;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a template to JSON.
pub fn to_json(template: &Template, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(template),
        JsonFormat::Compact => serde_json::to_string(template),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
