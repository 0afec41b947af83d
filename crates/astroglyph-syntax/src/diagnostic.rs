//! Recoverable parse errors.
//!
//! The parser never aborts on malformed input. Every problem it recovers from
//! is recorded here as a message attached to a source range, next to a tree
//! that is still complete.

use std::fmt;

use rowan::{TextRange, TextSize};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
}

/// A message attached to a range of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub message: String,
    pub range: TextRange,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
            severity: Severity::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
        };
        write!(
            f,
            "{severity}[{}..{}]: {}",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )
    }
}

/// Collects diagnostics for one parse.
///
/// Ranges are clamped to the document so that every reported range lies
/// within it, even for zero-width reports at end of input.
#[derive(Debug)]
pub struct Diagnostics {
    document: TextRange,
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(document_len: TextSize) -> Self {
        Self {
            document: TextRange::up_to(document_len),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>, range: TextRange) {
        let range = self.clamp(range);
        let diagnostic = Diagnostic::error(message, range);
        log::debug!("{diagnostic}");
        self.items.push(diagnostic);
    }

    fn clamp(&self, range: TextRange) -> TextRange {
        let end = self.document.end();
        TextRange::new(range.start().min(end), range.end().min(end))
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
