//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree building.
//! Instead of building the tree directly, the parser emits a **flat sequence**
//! of events that describe the tree structure.
//!
//! ```text
//! Start(HTML_TAG)
//!   Token(LT)
//!   Token(NAME)
//!   Token(GT)
//!   Start(EMBEDDED_EXPRESSION)
//!     Token(L_CURLY)
//!     ...
//!   Finish
//! Finish
//! ```
//!
//! The Sink processes these in order, maintaining a stack of open nodes.
//! Start pushes, Finish pops.
//!
//! ## Forward Parent Links
//!
//! The `forward_parent` field in `Start` handles cases where we need to wrap
//! an already-parsed node (`CompletedMarker::precede`). The Sink resolves
//! these links by opening nodes outermost-first.
//!
//! ## Early Finishes
//!
//! `Marker::complete_before` ends a node where a *later* marker begins. The
//! finish cannot be pushed at the end of the list, so it is recorded on the
//! later marker's event instead (`finishes_before`). The Sink closes that many
//! nodes before it processes the event.

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    ///
    /// `forward_parent` points to another `Start` that becomes this node's
    /// parent. `finishes_before` counts nodes that must be closed right
    /// before this one opens.
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
        finishes_before: u16,
    },

    /// Add `n_raw_tokens` lexer tokens to the current node as one token of `kind`.
    Token { kind: SyntaxKind, n_raw_tokens: u8 },

    /// Finish the current node.
    Finish,

    /// A marker that has not been completed yet, or was abandoned.
    ///
    /// Abandoned placeholders still honour their `finishes_before`.
    Placeholder { finishes_before: u16 },
}

impl Event {
    /// Create a start event with no forward parent.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start {
            kind,
            forward_parent: None,
            finishes_before: 0,
        }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }

    /// A fresh placeholder.
    pub fn placeholder() -> Self {
        Event::Placeholder { finishes_before: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_start_creation() {
        let event = Event::start(SyntaxKind::HTML_TAG);
        assert_eq!(
            event,
            Event::Start {
                kind: SyntaxKind::HTML_TAG,
                forward_parent: None,
                finishes_before: 0,
            }
        );
    }

    #[test]
    fn event_token_creation() {
        let event = Event::token(SyntaxKind::TEXT);
        assert_eq!(
            event,
            Event::Token {
                kind: SyntaxKind::TEXT,
                n_raw_tokens: 1
            }
        );
    }
}
