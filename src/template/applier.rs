//! Instantiating live fields from a template.

use super::{Template, TemplateItem};
use crate::geometry::rescale_factor;
use crate::model::{Field, FieldId, PageScope, Session};

/// Create fields for every template item on the page at `page_index`.
///
/// New fields are scoped to the page's document index, which is what the
/// engine reports results against.
///
/// Each item is rescaled by `page.original_width / item.page_width` before
/// instantiation. Existing fields are kept; clear the session first for a
/// clean slate. An out-of-range page index makes this a no-op, and items with
/// a non-positive page width are skipped.
///
/// Returns the ids of the created fields in template order.
pub fn apply_template(session: &mut Session, template: &Template, page_index: usize) -> Vec<FieldId> {
    let (page_width, document_index) = match session.page(page_index) {
        Some(page) => (page.original_width(), page.document_index()),
        None => {
            log::debug!(
                "Template not applied: page {} out of range ({} pages)",
                page_index,
                session.page_count()
            );
            return Vec::new();
        }
    };

    let mut created = Vec::with_capacity(template.len());
    for item in template {
        let Some(factor) = rescale_factor(page_width, item.page_width()) else {
            log::warn!(
                "Skipping template item '{}': invalid page width {}",
                item.name(),
                item.page_width()
            );
            continue;
        };

        let field = instantiate(&item.scaled(factor), document_index);
        match session.add_field(page_index, field) {
            Ok(id) => created.push(id),
            Err(e) => log::warn!("Failed to add field '{}': {}", item.name(), e),
        }
    }

    log::debug!(
        "Applied {} of {} template items to page {}",
        created.len(),
        template.len(),
        page_index
    );
    created
}

fn instantiate(item: &TemplateItem, document_index: usize) -> Field {
    let scope = PageScope::Page(document_index);
    match item {
        TemplateItem::Field(f) => {
            let field = Field::text(f.name.clone(), scope, f.rectangle);
            if f.is_hidden {
                field.hidden_with_value(f.value.clone())
            } else {
                field
            }
        }
        TemplateItem::Table(t) => {
            let rect = t.layout.rectangle();
            let mut table = Field::table(t.name.clone(), scope, rect);
            for position in t.layout.interior_vertical() {
                if let Err(e) = table.push_separator(position - rect.left()) {
                    log::warn!("Dropping separator: {}", e);
                }
            }
            table
        }
        TemplateItem::Barcode(b) => Field::barcode(b.name.clone(), scope, b.rectangle),
    }
}
