//! Binding of extraction results back onto session fields.

use crate::engine::FieldData;
use crate::model::{FieldId, Session};

/// Write extraction results into the session's fields.
///
/// Every non-hidden field's text is reset first. Each result then goes to the
/// first field, in insertion order, whose name matches and whose page scope
/// covers the result's page. A hidden field that matches absorbs the result
/// without changing. Results with no matching field are dropped.
///
/// Returns the fields whose text was set.
pub fn bind_results(session: &mut Session, results: &[FieldData]) -> Vec<FieldId> {
    session.clear_extracted_text();

    let mut bound = Vec::new();
    for result in results {
        let target = session
            .fields()
            .find(|(_, f)| f.name() == result.name && f.scope().matches(result.page_index))
            .map(|(id, f)| (id, f.is_hidden()));

        match target {
            Some((_, true)) => {
                log::debug!("Result '{}' matched a hidden field", result.name);
            }
            Some((id, false)) => {
                if session.set_field_text(id, result.text()).is_ok() {
                    bound.push(id);
                }
            }
            None => {
                log::debug!(
                    "No field for result '{}' on page {}",
                    result.name,
                    result.page_index
                );
            }
        }
    }
    bound
}
