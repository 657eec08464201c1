//! Template persistence as XML.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <template>
//!   <field name="Total" pageWidth="800" isHidden="false" value="">
//!     <rectangle x="20" y="40" width="160" height="80"/>
//!   </field>
//!   <table name="Items" pageWidth="800">
//!     <vertical>
//!       <separator position="10"/>
//!       <separator position="200"/>
//!     </vertical>
//!     <horizontal>
//!       <separator position="5"/>
//!       <separator position="55"/>
//!     </horizontal>
//!   </table>
//!   <barcode name="Code" pageWidth="800">
//!     <rectangle x="300" y="10" width="50" height="50"/>
//!   </barcode>
//! </template>
//! ```

use super::{Template, TemplateItem, TemplateTableLayout};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const ROOT: &str = "template";
const FIELD: &str = "field";
const TABLE: &str = "table";
const BARCODE: &str = "barcode";
const RECTANGLE: &str = "rectangle";
const VERTICAL: &str = "vertical";
const HORIZONTAL: &str = "horizontal";
const SEPARATOR: &str = "separator";

/// Write a template to a file.
pub fn save<P: AsRef<Path>>(template: &Template, path: P) -> Result<()> {
    let xml = to_xml_string(template)?;
    fs::write(path.as_ref(), xml)?;
    log::info!("Saved template with {} items to {}", template.len(), path.as_ref().display());
    Ok(())
}

/// Read and validate a template from a file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Template> {
    let xml = fs::read_to_string(path.as_ref())?;
    let template = from_xml_str(&xml)?;
    log::info!("Loaded template with {} items from {}", template.len(), path.as_ref().display());
    Ok(template)
}

/// Serialize a template to an XML string.
pub fn to_xml_string(template: &Template) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

    for item in template {
        write_item(&mut writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

fn write_item(writer: &mut Writer<Vec<u8>>, item: &TemplateItem) -> Result<()> {
    let tag = match item {
        TemplateItem::Field(_) => FIELD,
        TemplateItem::Table(_) => TABLE,
        TemplateItem::Barcode(_) => BARCODE,
    };
    let page_width = item.page_width().to_string();
    let mut start = BytesStart::new(tag);
    start.push_attribute(("name", item.name()));
    start.push_attribute(("pageWidth", page_width.as_str()));
    if let TemplateItem::Field(f) = item {
        start.push_attribute(("isHidden", if f.is_hidden { "true" } else { "false" }));
        start.push_attribute(("value", f.value.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    match item {
        TemplateItem::Field(f) => write_rectangle(writer, &f.rectangle)?,
        TemplateItem::Barcode(b) => write_rectangle(writer, &b.rectangle)?,
        TemplateItem::Table(t) => {
            write_axis(writer, VERTICAL, &t.layout.vertical_separators)?;
            write_axis(writer, HORIZONTAL, &t.layout.horizontal_separators)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_rectangle(writer: &mut Writer<Vec<u8>>, rect: &Rect) -> Result<()> {
    let (x, y, w, h) = (
        rect.x.to_string(),
        rect.y.to_string(),
        rect.width.to_string(),
        rect.height.to_string(),
    );
    let mut start = BytesStart::new(RECTANGLE);
    start.push_attribute(("x", x.as_str()));
    start.push_attribute(("y", y.as_str()));
    start.push_attribute(("width", w.as_str()));
    start.push_attribute(("height", h.as_str()));
    writer.write_event(Event::Empty(start))?;
    Ok(())
}

fn write_axis(writer: &mut Writer<Vec<u8>>, tag: &str, positions: &[f64]) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    for position in positions {
        let value = position.to_string();
        let mut start = BytesStart::new(SEPARATOR);
        start.push_attribute(("position", value.as_str()));
        writer.write_event(Event::Empty(start))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Parse and validate a template from an XML string.
pub fn from_xml_str(xml: &str) -> Result<Template> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = TemplateReader::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => parser.open(&e, false)?,
            Event::Empty(e) => parser.open(&e, true)?,
            Event::End(e) => parser.close(e.name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Vertical,
    Horizontal,
}

#[derive(Debug)]
enum PendingItem {
    Field {
        name: String,
        page_width: f64,
        is_hidden: bool,
        value: String,
        rectangle: Option<Rect>,
    },
    Table {
        name: String,
        page_width: f64,
        vertical: Vec<f64>,
        horizontal: Vec<f64>,
    },
    Barcode {
        name: String,
        page_width: f64,
        rectangle: Option<Rect>,
    },
}

#[derive(Debug, Default)]
struct TemplateReader {
    seen_root: bool,
    current: Option<PendingItem>,
    axis: Option<Axis>,
    items: Vec<TemplateItem>,
}

impl TemplateReader {
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let attrs = attributes(e)?;

        match tag.as_str() {
            ROOT => self.seen_root = true,
            FIELD | TABLE | BARCODE => {
                if !self.seen_root {
                    return Err(invalid(format!("<{}> outside <{}>", tag, ROOT)));
                }
                if self.current.is_some() {
                    return Err(invalid(format!("nested <{}> element", tag)));
                }
                let name = required(&attrs, "name", &tag)?.to_string();
                let page_width = number(&attrs, "pageWidth", &tag)?;
                self.current = Some(match tag.as_str() {
                    FIELD => PendingItem::Field {
                        name,
                        page_width,
                        is_hidden: boolean(&attrs, "isHidden", &tag)?,
                        value: attrs.get("value").cloned().unwrap_or_default(),
                        rectangle: None,
                    },
                    TABLE => PendingItem::Table {
                        name,
                        page_width,
                        vertical: Vec::new(),
                        horizontal: Vec::new(),
                    },
                    _ => PendingItem::Barcode {
                        name,
                        page_width,
                        rectangle: None,
                    },
                });
                if empty {
                    self.close(tag.as_bytes())?;
                }
            }
            RECTANGLE => {
                let rect = Rect::new(
                    number(&attrs, "x", &tag)?,
                    number(&attrs, "y", &tag)?,
                    number(&attrs, "width", &tag)?,
                    number(&attrs, "height", &tag)?,
                );
                match &mut self.current {
                    Some(PendingItem::Field { rectangle, .. })
                    | Some(PendingItem::Barcode { rectangle, .. }) => *rectangle = Some(rect),
                    _ => return Err(invalid("<rectangle> outside <field> or <barcode>")),
                }
            }
            VERTICAL | HORIZONTAL => {
                if !matches!(self.current, Some(PendingItem::Table { .. })) {
                    return Err(invalid(format!("<{}> outside <{}>", tag, TABLE)));
                }
                if !empty {
                    self.axis = Some(if tag == VERTICAL {
                        Axis::Vertical
                    } else {
                        Axis::Horizontal
                    });
                }
            }
            SEPARATOR => {
                let position = number(&attrs, "position", &tag)?;
                match (&mut self.current, self.axis) {
                    (Some(PendingItem::Table { vertical, .. }), Some(Axis::Vertical)) => {
                        vertical.push(position)
                    }
                    (Some(PendingItem::Table { horizontal, .. }), Some(Axis::Horizontal)) => {
                        horizontal.push(position)
                    }
                    _ => return Err(invalid("<separator> outside <vertical> or <horizontal>")),
                }
            }
            other => log::debug!("Ignoring unknown template element <{}>", other),
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"vertical" | b"horizontal" => self.axis = None,
            b"field" | b"table" | b"barcode" => {
                let pending = self
                    .current
                    .take()
                    .ok_or_else(|| invalid("unexpected closing item tag"))?;
                let item = pending.into_item()?;
                item.validate()?;
                self.items.push(item);
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Template> {
        if !self.seen_root {
            return Err(invalid(format!("missing <{}> root element", ROOT)));
        }
        if let Some(pending) = self.current {
            return Err(invalid(format!("unterminated item {:?}", pending)));
        }
        Ok(Template::from_items(self.items))
    }
}

impl PendingItem {
    fn into_item(self) -> Result<TemplateItem> {
        match self {
            PendingItem::Field {
                name,
                page_width,
                is_hidden,
                value,
                rectangle,
            } => {
                let rectangle = rectangle
                    .ok_or_else(|| invalid(format!("field '{}' has no <rectangle>", name)))?;
                let mut item = TemplateItem::field(name, page_width, rectangle);
                if let TemplateItem::Field(f) = &mut item {
                    f.is_hidden = is_hidden;
                    f.value = value;
                }
                Ok(item)
            }
            PendingItem::Table {
                name,
                page_width,
                vertical,
                horizontal,
            } => {
                let layout = TemplateTableLayout::new(vertical, horizontal)
                    .map_err(|e| invalid(format!("table '{}': {}", name, e)))?;
                Ok(TemplateItem::table(name, page_width, layout))
            }
            PendingItem::Barcode {
                name,
                page_width,
                rectangle,
            } => {
                let rectangle = rectangle
                    .ok_or_else(|| invalid(format!("barcode '{}' has no <rectangle>", name)))?;
                Ok(TemplateItem::barcode(name, page_width, rectangle))
            }
        }
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidTemplate(message.into())
}

fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn required<'a>(attrs: &'a HashMap<String, String>, key: &str, tag: &str) -> Result<&'a str> {
    attrs
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| invalid(format!("<{}> is missing attribute '{}'", tag, key)))
}

fn number(attrs: &HashMap<String, String>, key: &str, tag: &str) -> Result<f64> {
    let raw = required(attrs, key, tag)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| invalid(format!("<{}> attribute '{}' is not a number: {}", tag, key, raw)))
}

fn boolean(attrs: &HashMap<String, String>, key: &str, tag: &str) -> Result<bool> {
    match attrs.get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) if v == "false" || v == "0" => Ok(false),
        Some(v) => Err(invalid(format!(
            "<{}> attribute '{}' is not a boolean: {}",
            tag, key, v
        ))),
    }
}
