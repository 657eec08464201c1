//! Integration tests for the designer controller.

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver};

use pagefields::engine::{
    AdjustmentFieldsOptions, PagePreviewOptions, ParseByTemplateOptions, TextLines, TextOptions,
};
use pagefields::error::{Error, Result};
use pagefields::{
    Completion, Designer, DesignerOptions, DocumentInfo, FieldData, FieldKind, Operation,
    PageArea, PageImage, PagePreview, PageScope, ParsingEngine, Rect, Scale, Template,
    TemplateItem,
};

/// Mock engine for testing.
#[derive(Default)]
struct MockEngine {
    previews: Vec<Option<(f64, f64)>>,
    images: Option<Vec<PageImage>>,
    results: Vec<FieldData>,
    generated: Template,
    lines: Vec<String>,
    fail_open: bool,
    fail_parse: bool,
    gate: Mutex<Option<Receiver<()>>>,
    seen_template: Mutex<Option<Template>>,
    seen_options: Mutex<Option<ParseByTemplateOptions>>,
}

impl MockEngine {
    fn with_pages(count: usize) -> Self {
        Self {
            previews: vec![Some((800.0, 1000.0)); count],
            ..Default::default()
        }
    }

    fn wait_for_gate(&self) {
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.recv();
        }
    }
}

impl ParsingEngine for MockEngine {
    fn document_info(&self, _path: &Path) -> Result<DocumentInfo> {
        if self.fail_open {
            return Err(Error::engine_with_source(
                "Cannot open document",
                io::Error::new(io::ErrorKind::NotFound, "file not found"),
            ));
        }
        Ok(DocumentInfo {
            page_count: self.previews.len(),
        })
    }

    fn page_preview(
        &self,
        _path: &Path,
        page_index: usize,
        _options: &PagePreviewOptions,
    ) -> Result<Option<PagePreview>> {
        Ok(self.previews[page_index].map(|(w, h)| PagePreview::new(w, h)))
    }

    fn images(&self, _path: &Path, _page_index: usize) -> Result<Option<Vec<PageImage>>> {
        Ok(self.images.clone())
    }

    fn text_lines<'a>(&'a self, _path: &'a Path, _options: &TextOptions) -> Result<TextLines<'a>> {
        Ok(Box::new(self.lines.iter().cloned().map(Ok)))
    }

    fn parse_by_template(
        &self,
        _path: &Path,
        template: &Template,
        options: &ParseByTemplateOptions,
    ) -> Result<Vec<FieldData>> {
        self.wait_for_gate();
        *self.seen_template.lock().unwrap() = Some(template.clone());
        *self.seen_options.lock().unwrap() = Some(options.clone());
        if self.fail_parse {
            return Err(Error::engine_with_source(
                "License is not set",
                io::Error::new(io::ErrorKind::NotFound, "license.lic missing"),
            ));
        }
        Ok(self.results.clone())
    }

    fn generate_adjustment_fields(
        &self,
        _path: &Path,
        _options: &AdjustmentFieldsOptions,
    ) -> Result<Template> {
        self.wait_for_gate();
        Ok(self.generated.clone())
    }
}

fn open(engine: MockEngine) -> (Designer, Arc<MockEngine>) {
    let engine = Arc::new(engine);
    let mut designer = Designer::new(engine.clone());
    designer.open_document("invoice.pdf").unwrap();
    (designer, engine)
}

fn log_messages(designer: &Designer) -> Vec<String> {
    designer
        .activity()
        .entries()
        .map(|e| e.message.clone())
        .collect()
}

#[test]
fn test_open_document_creates_pages() {
    let engine = MockEngine {
        previews: vec![Some((800.0, 1000.0)), None, Some((612.0, 792.0))],
        ..Default::default()
    };
    let (designer, _) = open(engine);

    let session = designer.session();
    assert_eq!(session.page_count(), 2);
    assert_eq!(session.pages()[1].original_width(), 612.0);
    assert_eq!(designer.document(), Some(Path::new("invoice.pdf")));

    let log = log_messages(&designer);
    assert_eq!(log[0], "Opened a file: invoice.pdf");
    assert!(log.contains(&"Page 0: Width=800.00, Height=1000.00".to_string()));
    assert!(log.contains(&"Generating preview is completed.".to_string()));
}

#[test]
fn test_ocr_detection() {
    let scanned = MockEngine {
        images: Some(vec![PageImage {
            width: 2480,
            height: 3508,
        }]),
        ..MockEngine::with_pages(1)
    };
    let (designer, _) = open(scanned);
    assert!(designer.is_ocr_used());

    let two_images = MockEngine {
        images: Some(vec![
            PageImage {
                width: 2480,
                height: 3508,
            },
            PageImage {
                width: 100,
                height: 100,
            },
        ]),
        ..MockEngine::with_pages(1)
    };
    let (designer, _) = open(two_images);
    assert!(!designer.is_ocr_used());

    let small = MockEngine {
        images: Some(vec![PageImage {
            width: 500,
            height: 500,
        }]),
        ..MockEngine::with_pages(1)
    };
    let (designer, _) = open(small);
    assert!(!designer.is_ocr_used());
}

#[test]
fn test_open_failure_is_reported() {
    let engine = Arc::new(MockEngine {
        fail_open: true,
        ..Default::default()
    });
    let mut designer = Designer::new(engine);

    assert!(designer.open_document("broken.pdf").is_err());
    assert!(designer.document().is_none());
    assert!(designer.is_enabled());
    assert_eq!(
        designer.take_last_error().as_deref(),
        Some("Opening File Error : Cannot open document(file not found)")
    );
}

#[test]
fn test_add_fields_at_viewport() {
    let (mut designer, _) = open(MockEngine::with_pages(3));
    designer.set_viewport_fraction(0.5);
    assert_eq!(designer.current_page_index(), Some(1));

    let text = designer.add_text_field().unwrap();
    let table = designer.add_table_field().unwrap();
    let barcode = designer.add_barcode_field().unwrap();

    let session = designer.session();
    let field = session.field(text).unwrap();
    assert_eq!(field.name(), "Text1");
    assert_eq!(field.original_rect(), Rect::new(10.0, 500.0, 80.0, 40.0));
    assert_eq!(session.field_page(text), Some(1));
    assert_eq!(session.field(table).unwrap().name(), "Table2");
    assert!(session.field(table).unwrap().kind().is_table());
    assert_eq!(session.field(barcode).unwrap().name(), "Barcode3");
    assert_eq!(session.page(1).unwrap().field_count(), 3);
}

#[test]
fn test_add_field_uses_current_scale() {
    let (mut designer, _) = open(MockEngine::with_pages(1));
    designer.set_scale(Scale::new(2.0));

    let id = designer.add_field(FieldKind::Text).unwrap();
    let field = designer.session().field(id).unwrap();
    assert_eq!(field.original_rect(), Rect::new(5.0, 0.0, 40.0, 20.0));
}

#[test]
fn test_viewport_edges() {
    let (mut designer, _) = open(MockEngine::with_pages(2));

    designer.set_viewport_fraction(1.0);
    assert_eq!(designer.current_page_index(), Some(1));

    designer.set_viewport_fraction(-0.1);
    assert_eq!(designer.current_page_index(), None);
    assert!(designer.add_text_field().is_none());
}

#[test]
fn test_no_document_operations_are_noops() {
    let mut designer = Designer::new(Arc::new(MockEngine::default()));

    assert!(designer.add_text_field().is_none());
    designer.start_parse_fields().unwrap();
    designer.start_generate_template().unwrap();
    assert!(designer.is_enabled());
    assert!(designer.wait().is_none());
    assert!(designer.poll().is_none());
    assert_eq!(designer.suggested_template_file_name(), "Templates.xml");
}

#[test]
fn test_zoom_and_dpi() {
    let (mut designer, _) = open(MockEngine::with_pages(1));

    designer.zoom_in();
    assert_eq!(designer.scale().percent_text(), "110%");
    for _ in 0..40 {
        designer.zoom_in();
    }
    assert_eq!(designer.scale().value(), 3.0);
    assert_eq!(designer.session().pages()[0].display_width(), 2400.0);

    assert_eq!(designer.ocr_dpi(), 288);
    designer.increase_dpi();
    assert_eq!(designer.ocr_dpi(), 360);
    for _ in 0..10 {
        designer.decrease_dpi();
    }
    assert_eq!(designer.ocr_dpi(), 72);
}

#[test]
fn test_parse_fields_binds_results() {
    let engine = MockEngine {
        results: vec![
            FieldData::new("Text1", 0, PageArea::text("ACME Corp")),
            FieldData::new("Unknown", 0, PageArea::text("dropped")),
        ],
        ..MockEngine::with_pages(1)
    };
    let (mut designer, engine) = open(engine);
    designer.set_ocr(true);
    let id = designer.add_text_field().unwrap();

    designer.start_parse_fields().unwrap();
    let completion = designer.wait().unwrap();

    assert_eq!(completion, Completion::Succeeded(Operation::ParseFields));
    assert!(designer.is_enabled());
    assert_eq!(designer.session().field(id).unwrap().text_value(), "ACME Corp");

    let template = engine.seen_template.lock().unwrap().clone().unwrap();
    assert_eq!(template.len(), 1);
    let options = engine.seen_options.lock().unwrap().clone().unwrap();
    assert_eq!(options.page_index, 0);
    assert!(options.use_ocr);
    assert_eq!(options.ocr.preview.dpi, 288);

    let log = log_messages(&designer);
    assert!(log.contains(&"Started parsing by template.".to_string()));
    assert!(log.contains(&"Text1: ACME Corp".to_string()));
    assert_eq!(log.last().unwrap(), "Parsing by template is completed.");
}

#[test]
fn test_only_one_operation_at_a_time() {
    let (tx, rx) = unbounded();
    let engine = MockEngine {
        gate: Mutex::new(Some(rx)),
        ..MockEngine::with_pages(1)
    };
    let (mut designer, _) = open(engine);

    designer.start_parse_fields().unwrap();
    assert!(!designer.is_enabled());
    assert_eq!(designer.running(), Some(Operation::ParseFields));
    assert!(matches!(designer.start_generate_template(), Err(Error::Busy)));
    assert!(matches!(designer.load_template("any.xml"), Err(Error::Busy)));

    tx.send(()).unwrap();
    let completion = designer.wait().unwrap();
    assert!(completion.is_success());
    assert!(designer.is_enabled());
    assert!(designer.running().is_none());
}

#[test]
fn test_edits_rejected_while_generating() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = unbounded();
    let engine = MockEngine {
        gate: Mutex::new(Some(rx)),
        generated: Template::from_items(vec![TemplateItem::field(
            "Date",
            800.0,
            Rect::new(10.0, 20.0, 30.0, 10.0),
        )]),
        ..MockEngine::with_pages(1)
    };
    let (mut designer, _) = open(engine);
    let existing = designer.add_text_field().unwrap();
    designer.session_mut().select(Some(existing)).unwrap();

    designer.start_generate_template().unwrap();
    assert!(!designer.is_enabled());

    assert!(designer.add_text_field().is_none());
    assert!(designer.add_table_field().is_none());
    assert!(designer.delete_selected().is_none());
    assert!(matches!(designer.remove_field(existing), Err(Error::Busy)));
    assert!(matches!(designer.clear_template(), Err(Error::Busy)));
    assert!(matches!(
        designer.apply_to_current_page(&Template::new()),
        Err(Error::Busy)
    ));
    assert!(matches!(
        designer.save_template(dir.path().join("t.xml")),
        Err(Error::Busy)
    ));
    assert!(matches!(
        designer.export_template(dir.path().join("t.xml")),
        Err(Error::Busy)
    ));
    assert!(matches!(
        designer.save_results(dir.path().join("r.xml")),
        Err(Error::Busy)
    ));
    assert!(matches!(designer.close_document(), Err(Error::Busy)));
    assert_eq!(designer.session().field_count(), 1);
    assert!(!dir.path().join("t.xml").exists());

    tx.send(()).unwrap();
    assert!(designer.wait().unwrap().is_success());
    assert!(designer.session().field_by_name("Date").is_some());
    assert!(designer.add_text_field().is_some());
    designer.close_document().unwrap();
    assert_eq!(designer.session().page_count(), 0);
}

#[test]
fn test_skipped_preview_keeps_document_page_index() {
    let engine = MockEngine {
        previews: vec![None, Some((800.0, 1000.0))],
        results: vec![FieldData::new("Text1", 1, PageArea::text("found"))],
        generated: Template::from_items(vec![TemplateItem::field(
            "Date",
            800.0,
            Rect::new(10.0, 20.0, 30.0, 10.0),
        )]),
        ..Default::default()
    };
    let (mut designer, engine) = open(engine);
    assert_eq!(designer.session().page_count(), 1);
    assert_eq!(designer.current_page_index(), Some(0));
    assert_eq!(designer.current_document_page_index(), Some(1));

    let id = designer.add_text_field().unwrap();
    assert_eq!(designer.session().field(id).unwrap().scope(), PageScope::Page(1));

    designer.start_parse_fields().unwrap();
    assert!(designer.wait().unwrap().is_success());
    let options = engine.seen_options.lock().unwrap().clone().unwrap();
    assert_eq!(options.page_index, 1);
    assert_eq!(designer.session().field(id).unwrap().text_value(), "found");

    designer.start_generate_template().unwrap();
    assert!(designer.wait().unwrap().is_success());
    let (date, field) = designer.session().field_by_name("Date").unwrap();
    assert_eq!(field.scope(), PageScope::Page(1));
    assert_eq!(designer.session().field_page(date), Some(0));
    assert!(log_messages(&designer).contains(&"Generating template for page: 1".to_string()));
}

#[test]
fn test_save_failure_line_names_io_cause_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("t.xml");
    let io_message = std::fs::write(&path, "").unwrap_err().to_string();

    let (mut designer, _) = open(MockEngine::with_pages(1));
    assert!(designer.save_template(&path).is_err());

    let error = designer.take_last_error().unwrap();
    assert_eq!(error, format!("Saving Template Error : I/O error: {}", io_message));
    assert_eq!(error.matches(io_message.as_str()).count(), 1);
}

#[test]
fn test_parse_failure_reenables_designer() {
    let engine = MockEngine {
        fail_parse: true,
        ..MockEngine::with_pages(1)
    };
    let (mut designer, _) = open(engine);

    designer.start_parse_fields().unwrap();
    let completion = designer.wait().unwrap();

    assert_eq!(
        completion,
        Completion::Failed {
            operation: Operation::ParseFields,
            message: "Parsing Fields Error : License is not set(license.lic missing)".to_string(),
        }
    );
    assert!(designer.is_enabled());
    assert!(designer.take_last_error().is_some());
}

#[test]
fn test_generate_template_replaces_layout() {
    let engine = MockEngine {
        generated: Template::from_items(vec![TemplateItem::field(
            "Date",
            400.0,
            Rect::new(10.0, 20.0, 30.0, 10.0),
        )]),
        ..MockEngine::with_pages(1)
    };
    let (mut designer, _) = open(engine);
    designer.add_text_field().unwrap();

    designer.start_generate_template().unwrap();
    let completion = designer.wait().unwrap();
    assert!(completion.is_success());

    let session = designer.session();
    assert_eq!(session.field_count(), 1);
    let (_, field) = session.field_by_name("Date").unwrap();
    assert_eq!(field.original_rect(), Rect::new(20.0, 40.0, 60.0, 20.0));

    let log = log_messages(&designer);
    assert!(log.contains(&"Generating template for page: 0".to_string()));
    assert!(log.contains(&"Generated template for page: 0".to_string()));
}

#[test]
fn test_parse_document_writes_text() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("Document.txt");
    let engine = MockEngine {
        lines: vec!["INVOICE".to_string(), "Total 42.00".to_string()],
        ..MockEngine::with_pages(1)
    };
    let (mut designer, _) = open(engine);

    designer.start_parse_document(&output).unwrap();
    let completion = designer.wait().unwrap();
    assert_eq!(completion, Completion::Succeeded(Operation::ParseDocument));

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text, "INVOICE\nTotal 42.00\n");
}

#[test]
fn test_poll_eventually_completes() {
    let (mut designer, _) = open(MockEngine::with_pages(1));
    designer.start_parse_fields().unwrap();

    let completion = loop {
        if let Some(c) = designer.poll() {
            break c;
        }
        std::thread::yield_now();
    };
    assert!(completion.is_success());
    assert!(designer.poll().is_none());
}

#[test]
fn test_template_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let (mut designer, _) = open(MockEngine::with_pages(2));
    assert_eq!(designer.suggested_template_file_name(), "invoice.template.xml");

    let text = designer.add_text_field().unwrap();
    let table = designer.add_table_field().unwrap();
    designer.session_mut().add_separator(table, 30.0).unwrap();
    designer.session_mut().set_field_hidden(text, true).unwrap();
    designer.session_mut().set_field_text(text, "EUR").unwrap();
    assert!(designer.session().has_unsaved_changes());

    let path = dir.path().join(designer.suggested_template_file_name());
    designer.export_template(&path).unwrap();
    assert!(!designer.session().has_unsaved_changes());

    designer.clear_template().unwrap();
    assert_eq!(designer.session().field_count(), 0);

    let created = designer.load_template(&path).unwrap();
    assert_eq!(created.len(), 2);
    let session = designer.session();
    let (_, restored) = session.field_by_name("Text1").unwrap();
    assert!(restored.is_hidden());
    assert_eq!(restored.text_value(), "EUR");
    let (_, restored_table) = session.field_by_name("Table2").unwrap();
    assert_eq!(restored_table.separators().len(), 1);
    assert_eq!(restored_table.separators()[0].original_position, 30.0);
}

#[test]
fn test_load_missing_template_is_reported() {
    let (mut designer, _) = open(MockEngine::with_pages(1));
    designer.add_text_field().unwrap();

    assert!(designer.load_template("/nonexistent/templates.xml").is_err());
    assert_eq!(designer.session().field_count(), 1);
    let error = designer.take_last_error().unwrap();
    assert!(error.starts_with("Loading Template Error : "));
}

#[test]
fn test_save_results() {
    let dir = tempfile::tempdir().unwrap();
    let (mut designer, _) = open(MockEngine::with_pages(1));
    let id = designer.add_text_field().unwrap();
    designer.session_mut().set_field_text(id, "42").unwrap();

    let path = dir.path().join("Results.xml");
    designer.save_results(&path).unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains(r#"<field name="Text1">42</field>"#));
}

#[test]
fn test_delete_selected() {
    let (mut designer, _) = open(MockEngine::with_pages(1));
    let first = designer.add_text_field().unwrap();
    let second = designer.add_text_field().unwrap();

    assert!(designer.delete_selected().is_none());

    designer.session_mut().select(Some(first)).unwrap();
    let removed = designer.delete_selected().unwrap();
    assert_eq!(removed.name(), "Text1");
    assert!(designer.session().selected().is_none());
    assert_eq!(designer.session().field_count(), 1);
    assert!(designer.session().field(second).is_some());
}

#[test]
fn test_options_from_settings() {
    let options = DesignerOptions::from_json_str(r#"{"ocrDpi": 144, "logCapacity": 5}"#).unwrap();
    let mut designer = Designer::with_options(
        Arc::new(MockEngine::with_pages(3)),
        options,
    );
    designer.open_document("a.pdf").unwrap();

    assert_eq!(designer.ocr_dpi(), 144);
    assert_eq!(designer.activity().len(), 5);
}
