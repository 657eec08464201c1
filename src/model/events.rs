//! Change notification for session state.
//!
//! Hosts register callbacks with [`Session::subscribe`](super::Session::subscribe)
//! to keep their views in sync with the model.

use super::FieldId;

/// Field attribute that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProperty {
    /// Field name
    Name,
    /// Extracted or fixed text
    Text,
    /// Hidden flag
    Hidden,
    /// Selection flag
    Selected,
    /// Original rectangle
    Bounds,
    /// Table separators
    Separators,
}

/// A change to session state.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A page was added.
    PageAdded {
        /// 0-based page index
        page_index: usize,
    },

    /// A field was added to a page and to the field index.
    FieldAdded {
        /// New field
        id: FieldId,
        /// Page the field was placed on
        page_index: usize,
    },

    /// A field was removed.
    FieldRemoved {
        /// Removed field
        id: FieldId,
    },

    /// A field attribute changed.
    FieldChanged {
        /// Changed field
        id: FieldId,
        /// Which attribute
        property: FieldProperty,
    },

    /// The selected field changed.
    SelectionChanged {
        /// Previously selected field
        previous: Option<FieldId>,
        /// Newly selected field
        current: Option<FieldId>,
    },

    /// The zoom level changed.
    ScaleChanged {
        /// New scale factor
        scale: f64,
    },

    /// Visibility of hidden fields was toggled.
    HiddenVisibilityChanged {
        /// Whether hidden fields are shown
        visible: bool,
    },

    /// Every field was removed; pages were kept.
    FieldsCleared,

    /// Every page and field was removed.
    SessionCleared,
}

impl ChangeEvent {
    /// Check if this event changes template content.
    pub fn is_field_mutation(&self) -> bool {
        matches!(
            self,
            ChangeEvent::FieldAdded { .. }
                | ChangeEvent::FieldRemoved { .. }
                | ChangeEvent::FieldChanged { .. }
                | ChangeEvent::FieldsCleared
        )
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ChangeEvent)>;

/// Registered change listeners.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    pub(crate) fn notify(&mut self, event: &ChangeEvent) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
