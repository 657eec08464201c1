//! Background operations.
//!
//! A worker thread runs one engine call and reports progress lines and its
//! final result over a channel. The owning thread drains the channel and
//! applies every session mutation itself.

use crate::engine::FieldData;
use crate::error::{Error, Result};
use crate::template::Template;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::fmt;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

/// Long-running designer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Extract data for every field
    ParseFields,
    /// Propose a template from the current page
    GenerateTemplate,
    /// Write the document's text to a file
    ParseDocument,
}

impl Operation {
    /// Label used when reporting a failure.
    pub fn failure_label(self) -> &'static str {
        match self {
            Operation::ParseFields => "Parsing Fields Error",
            Operation::GenerateTemplate => "Generating Template Error",
            Operation::ParseDocument => "Parsing Document Error",
        }
    }

    pub(crate) fn started_message(self) -> &'static str {
        match self {
            Operation::ParseFields => "Started parsing by template.",
            Operation::GenerateTemplate => "Started generating template.",
            Operation::ParseDocument => "Started parsing the document.",
        }
    }

    pub(crate) fn completed_message(self) -> &'static str {
        match self {
            Operation::ParseFields => "Parsing by template is completed.",
            Operation::GenerateTemplate => "Generating template is completed.",
            Operation::ParseDocument => "Parsing the document is completed.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ParseFields => "parse fields",
            Operation::GenerateTemplate => "generate template",
            Operation::ParseDocument => "parse document",
        };
        f.write_str(name)
    }
}

/// How a background operation ended, as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The operation finished and its results were applied.
    Succeeded(Operation),
    /// The operation failed; `message` is the logged line.
    Failed {
        /// Which operation failed
        operation: Operation,
        /// Formatted failure line
        message: String,
    },
}

impl Completion {
    /// The operation this completion belongs to.
    pub fn operation(&self) -> Operation {
        match self {
            Completion::Succeeded(op) => *op,
            Completion::Failed { operation, .. } => *operation,
        }
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Completion::Succeeded(_))
    }
}

/// Value computed by a worker, applied on the owning thread.
#[derive(Debug)]
pub(crate) enum Outcome {
    Parsed(Vec<FieldData>),
    Generated { page_index: usize, template: Template },
    TextWritten { path: PathBuf, lines: usize },
}

enum Message {
    Log(String),
    Done(Result<Outcome>),
}

/// Progress reporting handle given to a worker job.
pub(crate) struct Progress {
    sender: Sender<Message>,
}

impl Progress {
    /// Queue an activity log line.
    pub(crate) fn log(&self, message: impl Into<String>) {
        let _ = self.sender.send(Message::Log(message.into()));
    }
}

pub(crate) enum WorkerEvent {
    Log(String),
    Finished(Result<Outcome>),
}

/// A running background operation.
pub(crate) struct Worker {
    operation: Operation,
    receiver: Receiver<Message>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn<F>(operation: Operation, job: F) -> Self
    where
        F: FnOnce(&Progress) -> Result<Outcome> + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let handle = thread::spawn(move || {
            let progress = Progress { sender };
            let result = job(&progress);
            let _ = progress.sender.send(Message::Done(result));
        });
        log::debug!("Spawned worker for {}", operation);

        Self {
            operation,
            receiver,
            handle: Some(handle),
        }
    }

    pub(crate) fn operation(&self) -> Operation {
        self.operation
    }

    /// Next event, or `None` while the worker has nothing to report.
    pub(crate) fn try_next(&mut self) -> Option<WorkerEvent> {
        match self.receiver.try_recv() {
            Ok(message) => Some(self.event(message)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.lost()),
        }
    }

    /// Block until the next event.
    pub(crate) fn next(&mut self) -> WorkerEvent {
        match self.receiver.recv() {
            Ok(message) => self.event(message),
            Err(_) => self.lost(),
        }
    }

    fn event(&mut self, message: Message) -> WorkerEvent {
        match message {
            Message::Log(line) => WorkerEvent::Log(line),
            Message::Done(result) => {
                self.join();
                WorkerEvent::Finished(result)
            }
        }
    }

    fn lost(&mut self) -> WorkerEvent {
        self.join();
        WorkerEvent::Finished(Err(Error::WorkerLost))
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Worker for {} panicked", self.operation);
            }
        }
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}
