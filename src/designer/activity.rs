//! Timestamped activity log.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// One log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    /// When the entry was recorded
    pub time: DateTime<Local>,
    /// Message text
    pub message: String,
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time.format("%H:%M:%S"), self.message)
    }
}

/// Bounded, in-memory activity log.
///
/// Entries beyond the capacity push out the oldest ones. Each entry is also
/// forwarded to the `log` facade.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    last_error: Option<String>,
}

impl ActivityLog {
    /// Create a log keeping at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            last_error: None,
        }
    }

    /// Record a message now.
    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(Local::now(), message);
    }

    /// Record a message at a given time.
    pub fn push_at(&mut self, time: DateTime<Local>, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.record(time, message);
    }

    /// Record a failure and keep it as the last error.
    pub fn push_error(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::error!("{}", line);
        self.record(Local::now(), line.clone());
        self.last_error = Some(line);
    }

    fn record(&mut self, time: DateTime<Local>, message: String) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry { time, message });
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.back()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent failure, if not yet taken.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Take the most recent failure for display.
    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }
}
