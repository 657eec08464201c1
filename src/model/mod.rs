//! Live field layout types.
//!
//! This module defines the in-memory, resolution-bound projection of a
//! template: pages, the fields placed on them, and the session that owns
//! both. Fields keep their rectangles in original coordinates so that
//! zooming never changes durable state.

pub mod events;
mod field;
mod page;
mod session;

pub use events::{ChangeEvent, FieldProperty, SubscriptionId};
pub use field::{Field, FieldId, FieldKind, PageScope, Separator};
pub use page::Page;
pub use session::Session;
