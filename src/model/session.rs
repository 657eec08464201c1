//! Session state: pages, the field index and the single selection.

use super::events::{ChangeEvent, FieldProperty, Observers, SubscriptionId};
use super::{Field, FieldId, Page};
use crate::error::{Error, Result};
use crate::geometry::{Rect, Scale};
use crate::naming::NameGenerator;

#[derive(Debug)]
struct FieldSlot {
    id: FieldId,
    page_index: usize,
    field: Field,
}

/// Live, resolution-bound projection of a document's field layout.
///
/// A session owns every page and field, keeps at most one field selected and
/// tracks whether the layout has changed since the last save. All mutation
/// goes through the session so registered listeners see every change.
#[derive(Debug)]
pub struct Session {
    pages: Vec<Page>,
    fields: Vec<FieldSlot>,
    next_field_id: u64,
    selected: Option<FieldId>,
    scale: Scale,
    names: NameGenerator,
    show_hidden_fields: bool,
    unsaved_changes: bool,
    observers: Observers,
}

impl Session {
    /// Create an empty session at scale 1.0.
    pub fn new() -> Self {
        Self::with_scale(Scale::default())
    }

    /// Create an empty session at the given scale.
    pub fn with_scale(scale: Scale) -> Self {
        Self {
            pages: Vec::new(),
            fields: Vec::new(),
            next_field_id: 0,
            selected: None,
            scale,
            names: NameGenerator::new(),
            show_hidden_fields: false,
            unsaved_changes: false,
            observers: Observers::default(),
        }
    }

    // ==================== Change notification ====================

    /// Register a change listener.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.observers.subscribe(Box::new(callback))
    }

    /// Remove a change listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn notify(&mut self, event: ChangeEvent) {
        if event.is_field_mutation() {
            self.unsaved_changes = true;
        }
        self.observers.notify(&event);
    }

    /// Whether the layout changed since the session was created or last saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Clear the unsaved-changes flag.
    pub fn mark_saved(&mut self) {
        self.unsaved_changes = false;
    }

    // ==================== Scale ====================

    /// Current zoom level.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Set the zoom level and propagate it to every page.
    pub fn set_scale(&mut self, scale: Scale) {
        if self.scale == scale {
            return;
        }
        self.scale = scale;
        for page in &mut self.pages {
            page.set_scale(scale.value());
        }
        self.notify(ChangeEvent::ScaleChanged {
            scale: scale.value(),
        });
    }

    /// Whether hidden (fixed-value) fields are shown by the host.
    pub fn show_hidden_fields(&self) -> bool {
        self.show_hidden_fields
    }

    /// Toggle visibility of hidden fields.
    pub fn set_show_hidden_fields(&mut self, visible: bool) {
        if self.show_hidden_fields != visible {
            self.show_hidden_fields = visible;
            self.notify(ChangeEvent::HiddenVisibilityChanged { visible });
        }
    }

    // ==================== Pages ====================

    /// Append a page with original dimensions. Returns its index.
    pub fn add_page(&mut self, original_width: f64, original_height: f64) -> usize {
        let index = self.pages.len();
        self.add_document_page(index, original_width, original_height)
    }

    /// Append a page rendered from `document_index` of the source document.
    /// Returns its session index.
    pub fn add_document_page(
        &mut self,
        document_index: usize,
        original_width: f64,
        original_height: f64,
    ) -> usize {
        let index = self.pages.len();
        self.pages.push(
            Page::new(index, original_width, original_height, self.scale.value())
                .with_document_index(document_index),
        );
        self.notify(ChangeEvent::PageAdded { page_index: index });
        index
    }

    /// All pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page by index.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Remove every page and field.
    pub fn clear(&mut self) {
        self.set_selected(None);
        self.pages.clear();
        self.fields.clear();
        self.notify(ChangeEvent::SessionCleared);
    }

    // ==================== Fields ====================

    /// Generate a name unique among live fields.
    pub fn generate_name(&mut self, prefix: &str) -> String {
        let fields = &self.fields;
        self.names
            .generate(prefix, |candidate| fields.iter().any(|s| s.field.name() == candidate))
    }

    /// Add a field to a page and to the field index.
    pub fn add_field(&mut self, page_index: usize, field: Field) -> Result<FieldId> {
        let page_count = self.pages.len();
        let page = self
            .pages
            .get_mut(page_index)
            .ok_or(Error::PageOutOfRange(page_index, page_count))?;

        self.next_field_id += 1;
        let id = FieldId(self.next_field_id);
        page.push_field(id);
        log::debug!("Added field '{}' ({}) to page {}", field.name(), id, page_index);
        self.fields.push(FieldSlot {
            id,
            page_index,
            field,
        });
        self.notify(ChangeEvent::FieldAdded { id, page_index });
        Ok(id)
    }

    /// Remove a field from its page and the field index.
    pub fn remove_field(&mut self, id: FieldId) -> Result<Field> {
        let position = self
            .fields
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))?;

        if self.selected == Some(id) {
            self.set_selected(None);
        }
        for page in &mut self.pages {
            page.remove_field(id);
        }
        let slot = self.fields.remove(position);
        self.notify(ChangeEvent::FieldRemoved { id });
        Ok(slot.field)
    }

    /// Remove every field from every page; pages are kept.
    pub fn clear_fields(&mut self) {
        self.set_selected(None);
        for page in &mut self.pages {
            page.clear_fields();
        }
        self.fields.clear();
        self.notify(ChangeEvent::FieldsCleared);
    }

    /// Field by id.
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.slot(id).map(|s| &s.field)
    }

    /// First field with the given name, in insertion order.
    pub fn field_by_name(&self, name: &str) -> Option<(FieldId, &Field)> {
        self.fields
            .iter()
            .find(|s| s.field.name() == name)
            .map(|s| (s.id, &s.field))
    }

    /// Page a field was placed on.
    pub fn field_page(&self, id: FieldId) -> Option<usize> {
        self.slot(id).map(|s| s.page_index)
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &Field)> + '_ {
        self.fields.iter().map(|s| (s.id, &s.field))
    }

    /// Fields on one page, in placement order.
    pub fn page_fields(&self, page_index: usize) -> impl Iterator<Item = (FieldId, &Field)> + '_ {
        self.pages
            .get(page_index)
            .map(|p| p.field_ids())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |id| self.field(*id).map(|f| (*id, f)))
    }

    /// Number of live fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn slot(&self, id: FieldId) -> Option<&FieldSlot> {
        self.fields.iter().find(|s| s.id == id)
    }

    fn field_mut(&mut self, id: FieldId) -> Result<&mut Field> {
        self.fields
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| &mut s.field)
            .ok_or_else(|| Error::FieldNotFound(id.to_string()))
    }

    fn changed(&mut self, id: FieldId, property: FieldProperty, changed: bool) {
        if changed {
            self.notify(ChangeEvent::FieldChanged { id, property });
        }
    }

    // ==================== Selection ====================

    /// Currently selected field.
    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    /// Select a field, deselecting the previous one. `None` clears the selection.
    pub fn select(&mut self, id: Option<FieldId>) -> Result<()> {
        if let Some(id) = id {
            if self.slot(id).is_none() {
                return Err(Error::FieldNotFound(id.to_string()));
            }
        }
        self.set_selected(id);
        Ok(())
    }

    fn set_selected(&mut self, id: Option<FieldId>) {
        let previous = self.selected;
        if previous == id {
            return;
        }
        if let Some(prev) = previous {
            if let Ok(field) = self.field_mut(prev) {
                let changed = field.set_selected(false);
                self.changed(prev, FieldProperty::Selected, changed);
            }
        }
        self.selected = id;
        if let Some(current) = id {
            if let Ok(field) = self.field_mut(current) {
                let changed = field.set_selected(true);
                self.changed(current, FieldProperty::Selected, changed);
            }
        }
        self.notify(ChangeEvent::SelectionChanged {
            previous,
            current: id,
        });
    }

    // ==================== Field mutation ====================

    /// Rename a field.
    pub fn set_field_name(&mut self, id: FieldId, name: impl Into<String>) -> Result<()> {
        let changed = self.field_mut(id)?.set_name(name.into());
        self.changed(id, FieldProperty::Name, changed);
        Ok(())
    }

    /// Set a field's text.
    pub fn set_field_text(&mut self, id: FieldId, text: impl Into<String>) -> Result<()> {
        let changed = self.field_mut(id)?.set_text(text.into());
        self.changed(id, FieldProperty::Text, changed);
        Ok(())
    }

    /// Mark a field as hidden (fixed value) or live.
    pub fn set_field_hidden(&mut self, id: FieldId, hidden: bool) -> Result<()> {
        let changed = self.field_mut(id)?.set_hidden(hidden);
        self.changed(id, FieldProperty::Hidden, changed);
        Ok(())
    }

    /// Move or resize a field from a display rectangle at the current scale.
    pub fn set_field_display_rect(&mut self, id: FieldId, display: Rect) -> Result<()> {
        let original = display.to_original(self.scale.value());
        let changed = self.field_mut(id)?.set_original_rect(original);
        self.changed(id, FieldProperty::Bounds, changed);
        Ok(())
    }

    /// Add a table separator at a display offset from the table's left edge.
    pub fn add_separator(&mut self, id: FieldId, display_position: f64) -> Result<()> {
        let original = display_position / self.scale.value();
        self.field_mut(id)?.push_separator(original)?;
        self.changed(id, FieldProperty::Separators, true);
        Ok(())
    }

    /// Remove a table separator by index.
    pub fn remove_separator(&mut self, id: FieldId, index: usize) -> Result<()> {
        let removed = self.field_mut(id)?.remove_separator(index).is_some();
        self.changed(id, FieldProperty::Separators, removed);
        Ok(())
    }

    /// Reset the text of every non-hidden field to empty.
    pub fn clear_extracted_text(&mut self) {
        let live: Vec<FieldId> = self
            .fields
            .iter()
            .filter(|s| !s.field.is_hidden())
            .map(|s| s.id)
            .collect();
        for id in live {
            // ids were collected from the index above
            let _ = self.set_field_text(id, String::new());
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageScope;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session_with_page() -> Session {
        let mut session = Session::new();
        session.add_page(800.0, 1000.0);
        session
    }

    fn text_field(name: &str) -> Field {
        Field::text(name, PageScope::Page(0), Rect::new(10.0, 10.0, 80.0, 40.0))
    }

    #[test]
    fn test_add_and_remove_field() {
        let mut session = session_with_page();
        let id = session.add_field(0, text_field("Text1")).unwrap();
        assert_eq!(session.field_count(), 1);
        assert_eq!(session.page(0).unwrap().field_ids(), &[id]);
        assert_eq!(session.field_page(id), Some(0));

        let removed = session.remove_field(id).unwrap();
        assert_eq!(removed.name(), "Text1");
        assert_eq!(session.field_count(), 0);
        assert!(session.page(0).unwrap().is_empty());
        assert!(matches!(session.remove_field(id), Err(Error::FieldNotFound(_))));
    }

    #[test]
    fn test_add_document_page() {
        let mut session = Session::new();
        let index = session.add_document_page(4, 612.0, 792.0);
        assert_eq!(index, 0);
        assert_eq!(session.page(0).unwrap().document_index(), 4);
        assert_eq!(session.add_page(612.0, 792.0), 1);
        assert_eq!(session.page(1).unwrap().document_index(), 1);
    }

    #[test]
    fn test_add_field_page_out_of_range() {
        let mut session = session_with_page();
        let result = session.add_field(3, text_field("Text1"));
        assert!(matches!(result, Err(Error::PageOutOfRange(3, 1))));
    }

    #[test]
    fn test_single_selection() {
        let mut session = session_with_page();
        let a = session.add_field(0, text_field("A")).unwrap();
        let b = session.add_field(0, text_field("B")).unwrap();

        session.select(Some(a)).unwrap();
        assert!(session.field(a).unwrap().is_selected());

        session.select(Some(b)).unwrap();
        assert!(!session.field(a).unwrap().is_selected());
        assert!(session.field(b).unwrap().is_selected());
        assert_eq!(session.selected(), Some(b));

        let selected = session.fields().filter(|(_, f)| f.is_selected()).count();
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut session = session_with_page();
        let a = session.add_field(0, text_field("A")).unwrap();
        session.select(Some(a)).unwrap();
        session.remove_field(a).unwrap();
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_generate_name_avoids_live_names() {
        let mut session = session_with_page();
        session.add_field(0, text_field("Text1")).unwrap();
        assert_eq!(session.generate_name("Text"), "Text2");
        assert_eq!(session.generate_name("Table"), "Table3");
    }

    #[test]
    fn test_unsaved_changes() {
        let mut session = session_with_page();
        assert!(!session.has_unsaved_changes());

        let id = session.add_field(0, text_field("Text1")).unwrap();
        assert!(session.has_unsaved_changes());

        session.mark_saved();
        session.set_field_text(id, "value").unwrap();
        assert!(session.has_unsaved_changes());

        session.mark_saved();
        session.set_scale(Scale::new(2.0));
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_scale_propagates_to_pages() {
        let mut session = session_with_page();
        session.add_page(600.0, 800.0);
        session.set_scale(Scale::new(0.5));
        assert!(session.pages().iter().all(|p| p.scale() == 0.5));
        assert_eq!(session.page(1).unwrap().display_width(), 300.0);
    }

    #[test]
    fn test_add_separator_uses_scale() {
        let mut session = Session::with_scale(Scale::new(0.5));
        session.add_page(800.0, 1000.0);
        let table = Field::table("Table1", PageScope::Page(0), Rect::new(10.0, 0.0, 190.0, 50.0));
        let id = session.add_field(0, table).unwrap();

        session.add_separator(id, 15.0).unwrap();
        assert_eq!(session.field(id).unwrap().separators()[0].original_position, 30.0);

        session.remove_separator(id, 0).unwrap();
        assert!(session.field(id).unwrap().separators().is_empty());
    }

    #[test]
    fn test_set_display_rect() {
        let mut session = Session::with_scale(Scale::new(2.0));
        session.add_page(800.0, 1000.0);
        let id = session.add_field(0, text_field("Text1")).unwrap();
        session
            .set_field_display_rect(id, Rect::new(20.0, 20.0, 100.0, 50.0))
            .unwrap();
        assert_eq!(
            session.field(id).unwrap().original_rect(),
            Rect::new(10.0, 10.0, 50.0, 25.0)
        );
    }

    #[test]
    fn test_clear_extracted_text_keeps_hidden() {
        let mut session = session_with_page();
        let live = session.add_field(0, text_field("Live")).unwrap();
        let fixed = session
            .add_field(0, text_field("Fixed").hidden_with_value("constant"))
            .unwrap();
        session.set_field_text(live, "old").unwrap();

        session.clear_extracted_text();
        assert_eq!(session.field(live).unwrap().text_value(), "");
        assert_eq!(session.field(fixed).unwrap().text_value(), "constant");
    }

    #[test]
    fn test_clear_fields_keeps_pages() {
        let mut session = session_with_page();
        let id = session.add_field(0, text_field("A")).unwrap();
        session.select(Some(id)).unwrap();

        session.clear_fields();
        assert_eq!(session.field_count(), 0);
        assert_eq!(session.page_count(), 1);
        assert_eq!(session.selected(), None);

        session.clear();
        assert_eq!(session.page_count(), 0);
    }

    #[test]
    fn test_notifications() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut session = session_with_page();
        let sink = Rc::clone(&events);
        session.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let id = session.add_field(0, text_field("A")).unwrap();
        session.select(Some(id)).unwrap();
        session.set_field_text(id, "x").unwrap();
        session.set_field_text(id, "x").unwrap();

        let events = events.borrow();
        assert_eq!(events[0], ChangeEvent::FieldAdded { id, page_index: 0 });
        assert!(events.contains(&ChangeEvent::SelectionChanged {
            previous: None,
            current: Some(id)
        }));
        let text_changes = events
            .iter()
            .filter(|e| {
                **e == ChangeEvent::FieldChanged {
                    id,
                    property: FieldProperty::Text,
                }
            })
            .count();
        assert_eq!(text_changes, 1);
    }
}
