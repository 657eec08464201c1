//! Unique field name generation.
//!
//! Names are `prefix + counter`, with one counter shared across all prefixes
//! for the lifetime of a session. Names that arrive from a loaded template
//! do not advance the counter; the collision check at generation time is what
//! keeps live names unique.

/// Session-wide field name generator.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    counter: u64,
}

impl NameGenerator {
    /// Create a generator starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last counter value handed out (0 before the first call).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Generate a name not rejected by `is_taken`.
    ///
    /// The counter advances on every attempt, including rejected candidates.
    pub fn generate<F>(&mut self, prefix: &str, mut is_taken: F) -> String
    where
        F: FnMut(&str) -> bool,
    {
        loop {
            self.counter += 1;
            let candidate = format!("{}{}", prefix, self.counter);
            if !is_taken(&candidate) {
                return candidate;
            }
        }
    }
}
