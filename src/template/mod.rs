//! Persistable, resolution-independent templates.
//!
//! A [`Template`] is an ordered list of [`TemplateItem`]s, each recording the
//! page width it was authored against so it can be rescaled onto pages of a
//! different width. Templates are produced from a [`Session`](crate::Session)
//! by [`build_template`] and turned back into live fields by
//! [`apply_template`].

mod applier;
mod builder;
mod json;
pub mod xml;

pub use applier::apply_template;
pub use builder::build_template;
pub use json::{to_json, JsonFormat};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Vertical and horizontal separator coordinates of a table region.
///
/// The first and last coordinate on each axis are the table's outer bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTableLayout {
    /// X coordinates, left bound first and right bound last
    pub vertical_separators: Vec<f64>,
    /// Y coordinates, top bound first and bottom bound last
    pub horizontal_separators: Vec<f64>,
}

impl TemplateTableLayout {
    /// Create a layout. Each axis needs at least its two outer bounds, and
    /// every interior vertical separator must lie strictly between them.
    pub fn new(vertical_separators: Vec<f64>, horizontal_separators: Vec<f64>) -> Result<Self> {
        if vertical_separators.len() < 2 || horizontal_separators.len() < 2 {
            return Err(Error::InvalidTemplate(format!(
                "table layout needs at least two separators per axis, got {} vertical and {} horizontal",
                vertical_separators.len(),
                horizontal_separators.len()
            )));
        }
        let left = vertical_separators[0];
        let right = vertical_separators[vertical_separators.len() - 1];
        let interior = &vertical_separators[1..vertical_separators.len() - 1];
        if let Some(position) = interior.iter().find(|&&x| !(x > left && x < right)) {
            return Err(Error::InvalidTemplate(format!(
                "column separator {} is outside the table bounds {}..{}",
                position, left, right
            )));
        }
        Ok(Self {
            vertical_separators,
            horizontal_separators,
        })
    }

    /// Outer rectangle spanned by the first and last separators.
    pub fn rectangle(&self) -> Rect {
        let left = self.vertical_separators.first().copied().unwrap_or(0.0);
        let right = self.vertical_separators.last().copied().unwrap_or(left);
        let top = self.horizontal_separators.first().copied().unwrap_or(0.0);
        let bottom = self.horizontal_separators.last().copied().unwrap_or(top);
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Vertical separators strictly between the outer bounds.
    pub fn interior_vertical(&self) -> &[f64] {
        let len = self.vertical_separators.len();
        if len <= 2 {
            &[]
        } else {
            &self.vertical_separators[1..len - 1]
        }
    }

    /// Multiply every coordinate by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            vertical_separators: self.vertical_separators.iter().map(|v| v * factor).collect(),
            horizontal_separators: self
                .horizontal_separators
                .iter()
                .map(|h| h * factor)
                .collect(),
        }
    }
}

/// A text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Field name
    pub name: String,
    /// Width of the page the item was authored against
    pub page_width: f64,
    /// Fixed-position rectangle
    pub rectangle: Rect,
    /// Whether the field holds a fixed value instead of extracted text
    pub is_hidden: bool,
    /// Fixed value for hidden fields
    pub value: String,
}

/// A table region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTable {
    /// Field name
    pub name: String,
    /// Width of the page the item was authored against
    pub page_width: f64,
    /// Separator layout
    pub layout: TemplateTableLayout,
}

/// A barcode region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBarcode {
    /// Field name
    pub name: String,
    /// Width of the page the item was authored against
    pub page_width: f64,
    /// Region rectangle
    pub rectangle: Rect,
}

/// One extraction region of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateItem {
    /// Text field
    Field(TemplateField),
    /// Table
    Table(TemplateTable),
    /// Barcode
    Barcode(TemplateBarcode),
}

impl TemplateItem {
    /// Create a text item.
    pub fn field(name: impl Into<String>, page_width: f64, rectangle: Rect) -> Self {
        TemplateItem::Field(TemplateField {
            name: name.into(),
            page_width,
            rectangle,
            is_hidden: false,
            value: String::new(),
        })
    }

    /// Create a hidden text item with a fixed value.
    pub fn hidden_field(
        name: impl Into<String>,
        page_width: f64,
        rectangle: Rect,
        value: impl Into<String>,
    ) -> Self {
        TemplateItem::Field(TemplateField {
            name: name.into(),
            page_width,
            rectangle,
            is_hidden: true,
            value: value.into(),
        })
    }

    /// Create a table item.
    pub fn table(name: impl Into<String>, page_width: f64, layout: TemplateTableLayout) -> Self {
        TemplateItem::Table(TemplateTable {
            name: name.into(),
            page_width,
            layout,
        })
    }

    /// Create a barcode item.
    pub fn barcode(name: impl Into<String>, page_width: f64, rectangle: Rect) -> Self {
        TemplateItem::Barcode(TemplateBarcode {
            name: name.into(),
            page_width,
            rectangle,
        })
    }

    /// Item name.
    pub fn name(&self) -> &str {
        match self {
            TemplateItem::Field(f) => &f.name,
            TemplateItem::Table(t) => &t.name,
            TemplateItem::Barcode(b) => &b.name,
        }
    }

    /// Width of the page the item was authored against.
    pub fn page_width(&self) -> f64 {
        match self {
            TemplateItem::Field(f) => f.page_width,
            TemplateItem::Table(t) => t.page_width,
            TemplateItem::Barcode(b) => b.page_width,
        }
    }

    /// Short kind label (`field`, `table`, `barcode`).
    pub fn kind_name(&self) -> &'static str {
        match self {
            TemplateItem::Field(_) => "field",
            TemplateItem::Table(_) => "table",
            TemplateItem::Barcode(_) => "barcode",
        }
    }

    /// Outer rectangle of the item.
    pub fn rectangle(&self) -> Rect {
        match self {
            TemplateItem::Field(f) => f.rectangle,
            TemplateItem::Table(t) => t.layout.rectangle(),
            TemplateItem::Barcode(b) => b.rectangle,
        }
    }

    /// Multiply every coordinate, and the page width, by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            TemplateItem::Field(f) => TemplateItem::Field(TemplateField {
                page_width: f.page_width * factor,
                rectangle: f.rectangle.scaled(factor),
                ..f.clone()
            }),
            TemplateItem::Table(t) => TemplateItem::Table(TemplateTable {
                name: t.name.clone(),
                page_width: t.page_width * factor,
                layout: t.layout.scaled(factor),
            }),
            TemplateItem::Barcode(b) => TemplateItem::Barcode(TemplateBarcode {
                name: b.name.clone(),
                page_width: b.page_width * factor,
                rectangle: b.rectangle.scaled(factor),
            }),
        }
    }

    /// Check that the item can be rescaled and instantiated.
    pub fn validate(&self) -> Result<()> {
        let width = self.page_width();
        if !(width > 0.0 && width.is_finite()) {
            return Err(Error::InvalidPageWidth {
                name: self.name().to_string(),
                width,
            });
        }
        if let TemplateItem::Table(t) = self {
            TemplateTableLayout::new(
                t.layout.vertical_separators.clone(),
                t.layout.horizontal_separators.clone(),
            )?;
        }
        Ok(())
    }
}

/// An ordered sequence of template items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Items in authoring order
    pub items: Vec<TemplateItem>,
}

impl Template {
    /// Create an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a template from items.
    pub fn from_items(items: Vec<TemplateItem>) -> Self {
        Self { items }
    }

    /// Append an item.
    pub fn push(&mut self, item: TemplateItem) {
        self.items.push(item);
    }

    /// Iterate over items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TemplateItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the template has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check every item.
    pub fn validate(&self) -> Result<()> {
        self.items.iter().try_for_each(TemplateItem::validate)
    }

    /// Write the template as XML.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        xml::save(self, path)
    }

    /// Read a template from XML.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        xml::load(path)
    }
}

impl<'a> IntoIterator for &'a Template {
    type Item = &'a TemplateItem;
    type IntoIter = std::slice::Iter<'a, TemplateItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Template {
    type Item = TemplateItem;
    type IntoIter = std::vec::IntoIter<TemplateItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<TemplateItem> for Template {
    fn from_iter<I: IntoIterator<Item = TemplateItem>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_rectangle() {
        let layout =
            TemplateTableLayout::new(vec![10.0, 40.0, 70.0, 200.0], vec![5.0, 55.0]).unwrap();
        assert_eq!(layout.rectangle(), Rect::new(10.0, 5.0, 190.0, 50.0));
        assert_eq!(layout.interior_vertical(), &[40.0, 70.0]);
    }

    #[test]
    fn test_layout_requires_bounds() {
        assert!(TemplateTableLayout::new(vec![10.0], vec![0.0, 1.0]).is_err());
        assert!(TemplateTableLayout::new(vec![0.0, 1.0], vec![]).is_err());

        let layout = TemplateTableLayout::new(vec![0.0, 100.0], vec![0.0, 10.0]).unwrap();
        assert!(layout.interior_vertical().is_empty());
    }

    #[test]
    fn test_layout_rejects_separator_outside_bounds() {
        assert!(TemplateTableLayout::new(vec![10.0, 10.0, 200.0], vec![0.0, 1.0]).is_err());
        assert!(TemplateTableLayout::new(vec![10.0, 40.0, 250.0, 200.0], vec![0.0, 1.0]).is_err());
        assert!(TemplateTableLayout::new(vec![10.0, f64::NAN, 200.0], vec![0.0, 1.0]).is_err());
        assert!(TemplateTableLayout::new(vec![10.0, 199.0, 200.0], vec![0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_item_scaled() {
        let item = TemplateItem::field("Text1", 800.0, Rect::new(20.0, 40.0, 160.0, 80.0));
        let scaled = item.scaled(2.0);
        assert_eq!(scaled.page_width(), 1600.0);
        assert_eq!(scaled.rectangle(), Rect::new(40.0, 80.0, 320.0, 160.0));
        assert_eq!(scaled.name(), "Text1");
    }

    #[test]
    fn test_validate_page_width() {
        let item = TemplateItem::barcode("Barcode1", 0.0, Rect::default());
        assert!(matches!(
            item.validate(),
            Err(Error::InvalidPageWidth { .. })
        ));

        let template: Template = vec![
            TemplateItem::field("Text1", 800.0, Rect::default()),
            TemplateItem::barcode("Barcode1", -1.0, Rect::default()),
        ]
        .into_iter()
        .collect();
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_kind_names() {
        let layout = TemplateTableLayout::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        assert_eq!(TemplateItem::table("T", 1.0, layout).kind_name(), "table");
        assert_eq!(
            TemplateItem::hidden_field("F", 1.0, Rect::default(), "v").kind_name(),
            "field"
        );
    }
}
