//! # pagefields
//!
//! Template-driven field mapping for document data extraction.
//!
//! Users place named regions (text, table and barcode fields) over rendered
//! document pages. The layout is captured as a resolution-independent
//! [`Template`], persisted as XML, and re-applied to other documents whose
//! pages may have a different width. Extraction results from a parsing
//! engine are bound back onto the matching fields.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagefields::{apply_template, build_template, load_template, Session};
//!
//! fn main() -> pagefields::Result<()> {
//!     let template = load_template("invoice.template.xml")?;
//!
//!     // A page rendered twice as wide as the one the template was made on
//!     let mut session = Session::new();
//!     let page = session.add_page(1600.0, 2260.0);
//!     apply_template(&mut session, &template, page);
//!
//!     let rescaled = build_template(&session);
//!     rescaled.save("invoice-hires.template.xml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Coordinate model**: fields store original coordinates; zoom only
//!   changes the derived display geometry
//! - **Portable templates**: items are rescaled by page width on apply
//! - **Result binding**: engine results are matched by name and page scope
//! - **Designer**: a controller that runs engine calls on a background thread

pub mod binder;
pub mod designer;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod naming;
pub mod template;

// Re-export commonly used types
pub use binder::bind_results;
pub use designer::{Completion, Designer, DesignerOptions, Operation};
pub use engine::{
    DocumentInfo, FieldData, PageArea, PageImage, PagePreview, PageTableCell, ParsingEngine,
};
pub use error::{Error, Result};
pub use export::{results_to_xml_string, save_results};
pub use geometry::{Point, Rect, Scale, Size};
pub use model::{ChangeEvent, Field, FieldId, FieldKind, Page, PageScope, Separator, Session};
pub use naming::NameGenerator;
pub use template::{
    apply_template, build_template, JsonFormat, Template, TemplateBarcode, TemplateField,
    TemplateItem, TemplateTable, TemplateTableLayout,
};

use std::path::Path;

/// Load a template from an XML file.
///
/// # Example
///
/// ```no_run
/// use pagefields::load_template;
///
/// let template = load_template("invoice.template.xml").unwrap();
/// println!("Items: {}", template.len());
/// ```
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<Template> {
    template::xml::load(path)
}

/// Save a template as an XML file.
pub fn save_template<P: AsRef<Path>>(template: &Template, path: P) -> Result<()> {
    template::xml::save(template, path)
}

/// Convert a template file to JSON.
///
/// # Example
///
/// ```no_run
/// use pagefields::{template_file_to_json, JsonFormat};
///
/// let json = template_file_to_json("invoice.template.xml", JsonFormat::Pretty).unwrap();
/// std::fs::write("invoice.json", json).unwrap();
/// ```
pub fn template_file_to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let template = load_template(path)?;
    template::to_json(&template, format)
}

/// Re-author a template for pages of a different width.
///
/// The template is applied to a blank page of `page_width` and rebuilt, so
/// every item comes back with `page_width` and proportionally scaled geometry.
///
/// # Example
///
/// ```
/// use pagefields::{rescale_template, Rect, Template, TemplateItem};
///
/// let template = Template::from_items(vec![TemplateItem::field(
///     "Total",
///     800.0,
///     Rect::new(20.0, 40.0, 160.0, 80.0),
/// )]);
/// let rescaled = rescale_template(&template, 1600.0)?;
/// assert_eq!(rescaled.iter().next().unwrap().rectangle(), Rect::new(40.0, 80.0, 320.0, 160.0));
/// # Ok::<(), pagefields::Error>(())
/// ```
pub fn rescale_template(template: &Template, page_width: f64) -> Result<Template> {
    if !(page_width.is_finite() && page_width > 0.0) {
        return Err(Error::InvalidPageWidth {
            name: "target page".to_string(),
            width: page_width,
        });
    }

    let mut session = Session::new();
    let page = session.add_page(page_width, page_width);
    apply_template(&mut session, template, page);
    Ok(build_template(&session))
}
