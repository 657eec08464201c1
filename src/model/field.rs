//! Field types.

use crate::error::{Error, Result};
use crate::geometry::{to_display, to_original, Rect};
use serde::{Deserialize, Serialize};

/// Session-unique identifier of a live field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub(crate) u64);

impl FieldId {
    /// Raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pages a field applies to when binding extraction results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageScope {
    /// Results from any page
    #[default]
    Any,
    /// Results from one page (0-based)
    Page(usize),
}

impl PageScope {
    /// Check whether a result from `page_index` may update this field.
    pub fn matches(self, page_index: usize) -> bool {
        match self {
            PageScope::Any => true,
            PageScope::Page(index) => index == page_index,
        }
    }

    /// Signed index with `-1` for [`PageScope::Any`].
    pub fn as_index(self) -> i64 {
        match self {
            PageScope::Any => -1,
            PageScope::Page(index) => index as i64,
        }
    }

    /// Build from a signed index where any negative value means "any page".
    pub fn from_index(index: i64) -> Self {
        if index < 0 {
            PageScope::Any
        } else {
            PageScope::Page(index as usize)
        }
    }
}

/// A vertical subdivision inside a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Separator {
    /// Offset from the table's left edge, in original coordinates
    pub original_position: f64,
}

impl Separator {
    /// Create a separator at an original offset.
    pub fn new(original_position: f64) -> Self {
        Self { original_position }
    }

    /// Create a separator from a display offset.
    pub fn from_display(display_position: f64, scale: f64) -> Self {
        Self::new(to_original(display_position, scale))
    }

    /// Offset from the table's left edge in display coordinates.
    pub fn display_position(&self, scale: f64) -> f64 {
        to_display(self.original_position, scale)
    }
}

/// Kind of extraction region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// A text region
    Text,

    /// A table region split vertically by separators
    Table {
        /// Separators in insertion order
        separators: Vec<Separator>,
    },

    /// A barcode region
    Barcode,
}

impl FieldKind {
    /// Create a table kind with no separators.
    pub fn table() -> Self {
        FieldKind::Table {
            separators: Vec::new(),
        }
    }

    /// Prefix used when generating names for this kind.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::Table { .. } => "Table",
            FieldKind::Barcode => "Barcode",
        }
    }

    /// Check if this is a text field.
    pub fn is_text(&self) -> bool {
        matches!(self, FieldKind::Text)
    }

    /// Check if this is a table field.
    pub fn is_table(&self) -> bool {
        matches!(self, FieldKind::Table { .. })
    }

    /// Check if this is a barcode field.
    pub fn is_barcode(&self) -> bool {
        matches!(self, FieldKind::Barcode)
    }
}

/// A placed extraction region.
///
/// The original (scale-independent) rectangle is the durable state. Display
/// geometry is always derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    scope: PageScope,
    selected: bool,
    hidden: bool,
    original: Rect,
    text: String,
    kind: FieldKind,
}

impl Field {
    /// Create a field from a rectangle in original coordinates.
    pub fn from_original(
        kind: FieldKind,
        name: impl Into<String>,
        scope: PageScope,
        original: Rect,
    ) -> Self {
        Self {
            name: name.into(),
            scope,
            selected: false,
            hidden: false,
            original,
            text: String::new(),
            kind,
        }
    }

    /// Create a field from a rectangle in display coordinates at `scale`.
    pub fn from_display(
        kind: FieldKind,
        name: impl Into<String>,
        scope: PageScope,
        display: Rect,
        scale: f64,
    ) -> Self {
        Self::from_original(kind, name, scope, display.to_original(scale))
    }

    /// Create a text field in original coordinates.
    pub fn text(name: impl Into<String>, scope: PageScope, original: Rect) -> Self {
        Self::from_original(FieldKind::Text, name, scope, original)
    }

    /// Create a table field in original coordinates.
    pub fn table(name: impl Into<String>, scope: PageScope, original: Rect) -> Self {
        Self::from_original(FieldKind::table(), name, scope, original)
    }

    /// Create a barcode field in original coordinates.
    pub fn barcode(name: impl Into<String>, scope: PageScope, original: Rect) -> Self {
        Self::from_original(FieldKind::Barcode, name, scope, original)
    }

    /// Mark as hidden with a fixed value, returning self.
    pub fn hidden_with_value(mut self, value: impl Into<String>) -> Self {
        self.hidden = true;
        self.text = value.into();
        self
    }

    /// Add a separator at an original offset, returning self.
    pub fn with_separator(mut self, original_position: f64) -> Result<Self> {
        self.push_separator(original_position)?;
        Ok(self)
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Page scope.
    pub fn scope(&self) -> PageScope {
        self.scope
    }

    /// Whether this field is the session's selected field.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether this field holds a fixed value instead of extracted text.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Rectangle in original coordinates.
    pub fn original_rect(&self) -> Rect {
        self.original
    }

    /// Rectangle in display coordinates.
    pub fn display_rect(&self, scale: f64) -> Rect {
        self.original.to_display(scale)
    }

    /// Last extracted text, or the fixed value of a hidden field.
    pub fn text_value(&self) -> &str {
        &self.text
    }

    /// Field kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Table separators; empty for other kinds.
    pub fn separators(&self) -> &[Separator] {
        match &self.kind {
            FieldKind::Table { separators } => separators,
            _ => &[],
        }
    }

    /// Append a separator at an original offset from the left edge.
    ///
    /// The offset must lie strictly inside the table. Duplicates are kept.
    pub fn push_separator(&mut self, original_position: f64) -> Result<()> {
        let width = self.original.width;
        let inside = self.original.contains_offset_x(original_position);
        match &mut self.kind {
            FieldKind::Table { separators } if inside => {
                separators.push(Separator::new(original_position));
                Ok(())
            }
            FieldKind::Table { .. } => Err(Error::SeparatorOutOfBounds {
                table: self.name.clone(),
                position: original_position,
                width,
            }),
            _ => Err(Error::Other(format!("Field '{}' is not a table", self.name))),
        }
    }

    /// Remove the separator at `index`.
    pub(crate) fn remove_separator(&mut self, index: usize) -> Option<Separator> {
        match &mut self.kind {
            FieldKind::Table { separators } if index < separators.len() => {
                Some(separators.remove(index))
            }
            _ => None,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) -> bool {
        replace_if_changed(&mut self.name, name)
    }

    pub(crate) fn set_text(&mut self, text: String) -> bool {
        replace_if_changed(&mut self.text, text)
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) -> bool {
        replace_if_changed(&mut self.hidden, hidden)
    }

    pub(crate) fn set_selected(&mut self, selected: bool) -> bool {
        replace_if_changed(&mut self.selected, selected)
    }

    pub(crate) fn set_original_rect(&mut self, rect: Rect) -> bool {
        replace_if_changed(&mut self.original, rect)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
