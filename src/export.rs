//! Export of extracted field values as XML.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <fields>
//!   <field name="Total">42.00</field>
//! </fields>
//! ```

use crate::error::{Error, Result};
use crate::model::Session;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;

/// Serialize every field's name and current text, in insertion order.
pub fn results_to_xml_string(session: &Session) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("fields")))?;

    for (_, field) in session.fields() {
        let mut start = BytesStart::new("field");
        start.push_attribute(("name", field.name()));
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(field.text_value())))?;
        writer.write_event(Event::End(BytesEnd::new("field")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("fields")))?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

/// Write the results document to a file.
pub fn save_results<P: AsRef<Path>>(session: &Session, path: P) -> Result<()> {
    let xml = results_to_xml_string(session)?;
    fs::write(path.as_ref(), xml)?;
    log::info!(
        "Saved {} field values to {}",
        session.field_count(),
        path.as_ref().display()
    );
    Ok(())
}
