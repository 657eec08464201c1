//! Template construction from a live session.

use super::{Template, TemplateItem, TemplateTableLayout};
use crate::model::{Field, FieldKind, Page, Session};

/// Build a template from every field on every page.
///
/// Items are emitted in page order, then in per-page placement order, so the
/// output is deterministic. Coordinates are the fields' original rectangles
/// and `page_width` is the owning page's original width.
pub fn build_template(session: &Session) -> Template {
    let mut template = Template::new();
    for page in session.pages() {
        for (_, field) in session.page_fields(page.index()) {
            template.push(build_item(page, field));
        }
    }
    log::debug!(
        "Built template with {} items from {} pages",
        template.len(),
        session.page_count()
    );
    template
}

fn build_item(page: &Page, field: &Field) -> TemplateItem {
    let rect = field.original_rect();
    let page_width = page.original_width();
    match field.kind() {
        FieldKind::Text => {
            let mut item = TemplateItem::field(field.name(), page_width, rect);
            if let TemplateItem::Field(f) = &mut item {
                f.is_hidden = field.is_hidden();
                f.value = field.text_value().to_string();
            }
            item
        }
        FieldKind::Table { separators } => {
            let left = rect.left();
            let vertical = std::iter::once(left)
                .chain(separators.iter().map(|s| s.original_position + left))
                .chain(std::iter::once(rect.right()))
                .collect();
            let horizontal = vec![rect.top(), rect.bottom()];
            TemplateItem::table(
                field.name(),
                page_width,
                TemplateTableLayout {
                    vertical_separators: vertical,
                    horizontal_separators: horizontal,
                },
            )
        }
        FieldKind::Barcode => TemplateItem::barcode(field.name(), page_width, rect),
    }
}
