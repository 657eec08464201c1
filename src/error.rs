//! Error types for pagefields library.

use std::io;
use thiserror::Error;

/// Result type alias for pagefields operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building, applying or persisting templates.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed XML in a template or results file.
    #[error("XML error: {0}")]
    Xml(String),

    /// The template file is well-formed XML but does not describe a valid template.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A template item was authored against a non-positive page width.
    #[error("Invalid page width {width} for template item '{name}'")]
    InvalidPageWidth {
        /// Item name
        name: String,
        /// Offending width
        width: f64,
    },

    /// A separator does not lie strictly inside its table.
    #[error("Separator at {position} is outside table '{table}' (width {width})")]
    SeparatorOutOfBounds {
        /// Table field name
        table: String,
        /// Requested position, relative to the table's left edge
        position: f64,
        /// Table width in original coordinates
        width: f64,
    },

    /// No live field has the given identifier.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Page index is out of range.
    #[error("Page {0} is out of range (session has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// A background operation is already running.
    #[error("Another operation is in progress")]
    Busy,

    /// The parsing engine reported a failure.
    #[error("{message}")]
    Engine {
        /// Outer message
        message: String,
        /// Inner cause, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A background worker exited without reporting a result.
    #[error("Worker thread terminated unexpectedly")]
    WorkerLost,

    /// Error during rendering (JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Settings file could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an engine error with no inner cause.
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine {
            message: message.into(),
            source: None,
        }
    }

    /// Create an engine error wrapping an inner cause.
    pub fn engine_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Engine {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Format as `message(inner message)` when an engine error carries an
    /// inner cause. Other variants already include their cause in `Display`.
    pub fn chained_message(&self) -> String {
        match self {
            Error::Engine {
                message,
                source: Some(inner),
            } => format!("{}({})", message, inner),
            _ => self.to_string(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(e) => Error::Io(io::Error::new(e.kind(), e.to_string())),
            _ => Error::Xml(err.to_string()),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
