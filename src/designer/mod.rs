//! Interactive template designer.
//!
//! [`Designer`] owns a [`Session`] for the open document and exposes the
//! operations a host UI triggers: opening a document, zooming, placing and
//! removing fields, template persistence, and the long-running engine calls
//! that run on a background thread.
//!
//! # Example
//!
//! ```no_run
//! use pagefields::designer::Designer;
//! # fn engine() -> std::sync::Arc<dyn pagefields::engine::ParsingEngine> { unimplemented!() }
//!
//! let mut designer = Designer::new(engine());
//! designer.open_document("invoice.pdf")?;
//! designer.add_text_field();
//! designer.start_parse_fields()?;
//! if let Some(completion) = designer.wait() {
//!     println!("{:?}", completion);
//! }
//! # Ok::<(), pagefields::Error>(())
//! ```

mod activity;
mod operations;
mod options;

pub use activity::{ActivityEntry, ActivityLog};
pub use operations::{Completion, Operation};
pub use options::DesignerOptions;

use crate::binder::bind_results;
use crate::engine::{
    next_ocr_dpi, previous_ocr_dpi, AdjustmentFieldsOptions, PagePreviewOptions,
    ParseByTemplateOptions, ParsingEngine, TextOptions,
};
use crate::error::{Error, Result};
use crate::export;
use crate::geometry::{Rect, Scale};
use crate::model::{Field, FieldId, FieldKind, PageScope, Session};
use crate::template::{apply_template, build_template, Template};
use operations::{Outcome, Worker, WorkerEvent};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Minimum height of the single page-0 image that marks a scanned document.
const SCANNED_IMAGE_MIN_HEIGHT: u32 = 500;

/// Format a failure as `"<label> : <message>(<inner message>)"`.
pub fn failure_line(label: &str, error: &Error) -> String {
    format!("{} : {}", label, error.chained_message())
}

/// Controller for one designer window.
pub struct Designer {
    engine: Arc<dyn ParsingEngine>,
    options: DesignerOptions,
    session: Session,
    document: Option<PathBuf>,
    use_ocr: bool,
    ocr_dpi: u32,
    viewport_fraction: f64,
    activity: ActivityLog,
    worker: Option<Worker>,
}

impl Designer {
    /// Create a designer with default options.
    pub fn new(engine: Arc<dyn ParsingEngine>) -> Self {
        Self::with_options(engine, DesignerOptions::default())
    }

    /// Create a designer with custom options.
    pub fn with_options(engine: Arc<dyn ParsingEngine>, options: DesignerOptions) -> Self {
        Self {
            engine,
            session: Session::with_scale(options.initial_scale),
            document: None,
            use_ocr: false,
            ocr_dpi: options.ocr_dpi,
            viewport_fraction: 0.0,
            activity: ActivityLog::new(options.log_capacity),
            worker: None,
            options,
        }
    }

    // ==================== State ====================

    /// The live field layout.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access for direct field edits (move, resize, rename, select).
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Options this designer was created with.
    pub fn options(&self) -> &DesignerOptions {
        &self.options
    }

    /// Path of the open document.
    pub fn document(&self) -> Option<&Path> {
        self.document.as_deref()
    }

    /// Activity log.
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Take the most recent failure for a blocking notification.
    pub fn take_last_error(&mut self) -> Option<String> {
        self.activity.take_last_error()
    }

    /// Whether the designer accepts new operations.
    pub fn is_enabled(&self) -> bool {
        self.worker.is_none()
    }

    /// Operation currently running in the background.
    pub fn running(&self) -> Option<Operation> {
        self.worker.as_ref().map(Worker::operation)
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(Error::Busy)
        }
    }

    fn report<T>(&mut self, label: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.activity.push_error(failure_line(label, e));
        }
        result
    }

    // ==================== Document ====================

    /// Open a document: detect whether it needs OCR and create one page per
    /// rendered preview.
    pub fn open_document<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_enabled()?;
        let path = path.as_ref().to_path_buf();
        self.activity.push(format!("Opened a file: {}", path.display()));
        let result = self.load_document(path);
        self.report("Opening File Error", result)
    }

    fn load_document(&mut self, path: PathBuf) -> Result<()> {
        self.session.clear();
        self.document = None;
        self.viewport_fraction = 0.0;

        self.use_ocr = self.detect_ocr(&path)?;
        self.generate_preview(&path)?;
        self.document = Some(path);
        Ok(())
    }

    fn detect_ocr(&mut self, path: &Path) -> Result<bool> {
        self.activity.push("Detecting OCR.");
        let scanned = match self.engine.images(path, 0)? {
            Some(images) => {
                images.len() == 1 && images[0].height > SCANNED_IMAGE_MIN_HEIGHT
            }
            None => false,
        };
        if scanned {
            log::debug!("Page 0 is a single large image; enabling OCR");
        }
        Ok(scanned)
    }

    fn generate_preview(&mut self, path: &Path) -> Result<()> {
        self.activity.push("Started generating preview.");
        let info = self.engine.document_info(path)?;
        let options = PagePreviewOptions::new(self.options.preview_dpi);

        for page_index in 0..info.page_count {
            match self.engine.page_preview(path, page_index, &options)? {
                Some(preview) => {
                    self.activity.push(format!(
                        "Page {}: Width={:.2}, Height={:.2}",
                        page_index, preview.width, preview.height
                    ));
                    self.session
                        .add_document_page(page_index, preview.width, preview.height);
                }
                None => log::warn!("No preview for page {}; skipped", page_index),
            }
        }

        self.activity.push("Generating preview is completed.");
        Ok(())
    }

    /// Close the document and drop every page and field.
    pub fn close_document(&mut self) -> Result<()> {
        self.ensure_enabled()?;
        self.session.clear();
        self.document = None;
        self.viewport_fraction = 0.0;
        Ok(())
    }

    // ==================== View ====================

    /// Current zoom level.
    pub fn scale(&self) -> Scale {
        self.session.scale()
    }

    /// Set the zoom level.
    pub fn set_scale(&mut self, scale: Scale) {
        self.session.set_scale(scale);
    }

    /// Zoom in one step.
    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale().zoomed_in());
    }

    /// Zoom out one step.
    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale().zoomed_out());
    }

    /// Whether hidden fields are shown.
    pub fn show_hidden_fields(&self) -> bool {
        self.session.show_hidden_fields()
    }

    /// Show or hide hidden fields.
    pub fn set_show_hidden_fields(&mut self, visible: bool) {
        self.session.set_show_hidden_fields(visible);
    }

    /// Record the vertical scroll position as a fraction of the whole document.
    pub fn set_viewport_fraction(&mut self, fraction: f64) {
        self.viewport_fraction = fraction;
    }

    /// Vertical scroll position as a fraction of the whole document.
    pub fn viewport_fraction(&self) -> f64 {
        self.viewport_fraction
    }

    /// Session index of the page under the viewport, clamped to the last
    /// page. `None` with no pages or a negative position.
    pub fn current_page_index(&self) -> Option<usize> {
        let count = self.session.page_count();
        let position = self.viewport_fraction * count as f64;
        if count == 0 || position.is_nan() || position < 0.0 {
            return None;
        }
        Some((position.floor() as usize).min(count - 1))
    }

    /// Document index of the page under the viewport.
    pub fn current_document_page_index(&self) -> Option<usize> {
        let page_index = self.current_page_index()?;
        self.session.page(page_index).map(|p| p.document_index())
    }

    // ==================== OCR ====================

    /// Whether extraction uses OCR.
    pub fn is_ocr_used(&self) -> bool {
        self.use_ocr
    }

    /// Enable or disable OCR.
    pub fn set_ocr(&mut self, use_ocr: bool) {
        self.use_ocr = use_ocr;
    }

    /// OCR resolution.
    pub fn ocr_dpi(&self) -> u32 {
        self.ocr_dpi
    }

    /// Step the OCR resolution up.
    pub fn increase_dpi(&mut self) {
        self.ocr_dpi = next_ocr_dpi(self.ocr_dpi);
    }

    /// Step the OCR resolution down.
    pub fn decrease_dpi(&mut self) {
        self.ocr_dpi = previous_ocr_dpi(self.ocr_dpi);
    }

    // ==================== Fields ====================

    /// Place a text field under the viewport.
    pub fn add_text_field(&mut self) -> Option<FieldId> {
        self.add_field(FieldKind::Text)
    }

    /// Place a table field under the viewport.
    pub fn add_table_field(&mut self) -> Option<FieldId> {
        self.add_field(FieldKind::table())
    }

    /// Place a barcode field under the viewport.
    pub fn add_barcode_field(&mut self) -> Option<FieldId> {
        self.add_field(FieldKind::Barcode)
    }

    /// Place a new field on the current page with a generated name.
    ///
    /// The field goes at the default display x, and at a y proportional to
    /// how far the viewport has scrolled into the page. `None` while an
    /// operation is running or when there is no current page.
    pub fn add_field(&mut self, kind: FieldKind) -> Option<FieldId> {
        self.ensure_enabled().ok()?;
        let page_index = self.current_page_index()?;
        let page = self.session.page(page_index)?;
        let page_height = page.original_height();
        let scope = PageScope::Page(page.document_index());
        let offset = (self.viewport_fraction * self.session.page_count() as f64).fract();

        let display = Rect::new(
            self.options.new_field_x,
            offset * page_height,
            self.options.new_field_width,
            self.options.new_field_height,
        );
        let name = self.session.generate_name(kind.name_prefix());
        let field = Field::from_display(
            kind,
            name,
            scope,
            display,
            self.scale().value(),
        );
        self.session.add_field(page_index, field).ok()
    }

    /// Remove a field.
    pub fn remove_field(&mut self, id: FieldId) -> Result<Field> {
        self.ensure_enabled()?;
        self.session.remove_field(id)
    }

    /// Remove the selected field, if any. `None` while an operation is
    /// running.
    pub fn delete_selected(&mut self) -> Option<Field> {
        self.ensure_enabled().ok()?;
        let id = self.session.selected()?;
        self.session.remove_field(id).ok()
    }

    /// Remove every field from every page.
    pub fn clear_template(&mut self) -> Result<()> {
        self.ensure_enabled()?;
        self.session.clear_fields();
        Ok(())
    }

    // ==================== Templates ====================

    /// Template describing the current layout.
    pub fn template(&self) -> Template {
        build_template(&self.session)
    }

    /// Save the current layout as a template file.
    pub fn save_template<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_enabled()?;
        let path = path.as_ref();
        self.activity.push(format!("Saved a file: {}", path.display()));
        let result = self.template().save(path);
        if result.is_ok() {
            self.session.mark_saved();
        }
        self.report("Saving Template Error", result)
    }

    /// Same as [`Designer::save_template`], typically to
    /// [`Designer::suggested_template_file_name`].
    pub fn export_template<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.save_template(path)
    }

    /// File name offered when exporting: `<document stem>.template.xml`, or
    /// `Templates.xml` with no document.
    pub fn suggested_template_file_name(&self) -> String {
        match self
            .document
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
        {
            Some(stem) => format!("{}.template.xml", stem),
            None => "Templates.xml".to_string(),
        }
    }

    /// Replace the layout with a template file applied to the current page.
    pub fn load_template<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<FieldId>> {
        self.ensure_enabled()?;
        let path = path.as_ref();
        self.activity.push(format!("Opened a file: {}", path.display()));
        let result = Template::load(path).map(|template| self.replace_layout(&template));
        if result.is_ok() {
            self.session.mark_saved();
        }
        self.report("Loading Template Error", result)
    }

    /// Clear the layout and apply `template` to the current page.
    pub fn apply_to_current_page(&mut self, template: &Template) -> Result<Vec<FieldId>> {
        self.ensure_enabled()?;
        Ok(self.replace_layout(template))
    }

    fn replace_layout(&mut self, template: &Template) -> Vec<FieldId> {
        self.session.clear_fields();
        match self.current_page_index() {
            Some(page_index) => apply_template(&mut self.session, template, page_index),
            None => Vec::new(),
        }
    }

    /// Write every field's current text to a results file.
    pub fn save_results<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_enabled()?;
        let path = path.as_ref();
        self.activity.push(format!("Saved a file: {}", path.display()));
        let result = export::save_results(&self.session, path);
        self.report("Saving Results Error", result)
    }

    // ==================== Background operations ====================

    /// Extract data for every field on a background thread.
    ///
    /// The template is built here; the results are bound when the completion
    /// is drained with [`Designer::poll`] or [`Designer::wait`]. Without a
    /// document this does nothing.
    pub fn start_parse_fields(&mut self) -> Result<()> {
        self.ensure_enabled()?;
        let Some(path) = self.document.clone() else {
            return Ok(());
        };

        let template = self.template();
        let options = ParseByTemplateOptions::new(self.current_document_page_index().unwrap_or(0))
            .with_ocr(self.use_ocr)
            .with_ocr_dpi(self.ocr_dpi);
        let engine = Arc::clone(&self.engine);

        self.start(Operation::ParseFields, move |_| {
            let results = engine.parse_by_template(&path, &template, &options)?;
            Ok(Outcome::Parsed(results))
        });
        Ok(())
    }

    /// Generate a template from the current page on a background thread.
    ///
    /// On completion the layout is replaced by the generated template.
    pub fn start_generate_template(&mut self) -> Result<()> {
        self.ensure_enabled()?;
        let Some(path) = self.document.clone() else {
            return Ok(());
        };

        let page_index = self.current_page_index().unwrap_or(0);
        let document_index = self.current_document_page_index().unwrap_or(0);
        let options = AdjustmentFieldsOptions::new(document_index).with_ocr_dpi(self.ocr_dpi);
        let engine = Arc::clone(&self.engine);

        self.start(Operation::GenerateTemplate, move |progress| {
            progress.log(format!("Generating template for page: {}", document_index));
            let template = engine.generate_adjustment_fields(&path, &options)?;
            progress.log(format!("Generated template for page: {}", document_index));
            Ok(Outcome::Generated {
                page_index,
                template,
            })
        });
        Ok(())
    }

    /// Write the document's text to `output` on a background thread.
    pub fn start_parse_document<P: AsRef<Path>>(&mut self, output: P) -> Result<()> {
        self.ensure_enabled()?;
        let Some(path) = self.document.clone() else {
            return Ok(());
        };

        let output = output.as_ref().to_path_buf();
        let options = TextOptions::new(false, self.use_ocr);
        let engine = Arc::clone(&self.engine);

        self.start(Operation::ParseDocument, move |_| {
            let mut writer = BufWriter::new(File::create(&output)?);
            let mut lines = 0;
            for line in engine.text_lines(&path, &options)? {
                writeln!(writer, "{}", line?)?;
                lines += 1;
            }
            writer.flush()?;
            Ok(Outcome::TextWritten {
                path: output,
                lines,
            })
        });
        Ok(())
    }

    fn start<F>(&mut self, operation: Operation, job: F)
    where
        F: FnOnce(&operations::Progress) -> Result<Outcome> + Send + 'static,
    {
        self.activity.push(operation.started_message());
        self.worker = Some(Worker::spawn(operation, job));
    }

    /// Apply a finished background operation, if any, without blocking.
    pub fn poll(&mut self) -> Option<Completion> {
        loop {
            let event = self.worker.as_mut()?.try_next()?;
            if let Some(completion) = self.handle_event(event) {
                return Some(completion);
            }
        }
    }

    /// Block until the running operation finishes and apply it. `None` when
    /// nothing is running.
    pub fn wait(&mut self) -> Option<Completion> {
        loop {
            let event = self.worker.as_mut()?.next();
            if let Some(completion) = self.handle_event(event) {
                return Some(completion);
            }
        }
    }

    fn handle_event(&mut self, event: WorkerEvent) -> Option<Completion> {
        match event {
            WorkerEvent::Log(line) => {
                self.activity.push(line);
                None
            }
            WorkerEvent::Finished(result) => {
                let operation = self.worker.take()?.operation();
                let completion = match result.and_then(|outcome| self.complete(outcome)) {
                    Ok(()) => {
                        self.activity.push(operation.completed_message());
                        Completion::Succeeded(operation)
                    }
                    Err(e) => {
                        let message = failure_line(operation.failure_label(), &e);
                        self.activity.push_error(message.clone());
                        Completion::Failed { operation, message }
                    }
                };
                Some(completion)
            }
        }
    }

    fn complete(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Parsed(results) => {
                bind_results(&mut self.session, &results);
                for result in &results {
                    self.activity.push(format!("{}: {}", result.name, result.text()));
                }
            }
            Outcome::Generated {
                page_index,
                template,
            } => {
                self.session.clear_fields();
                apply_template(&mut self.session, &template, page_index);
            }
            Outcome::TextWritten { path, lines } => {
                self.activity
                    .push(format!("Saved {} lines to {}", lines, path.display()));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Designer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Designer")
            .field("document", &self.document)
            .field("pages", &self.session.page_count())
            .field("fields", &self.session.field_count())
            .field("use_ocr", &self.use_ocr)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("running", &self.running())
            .finish()
    }
}
