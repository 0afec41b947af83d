//! Sink for converting parser events into a Rowan green tree.

use rowan::{GreenNode, GreenNodeBuilder};

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax_kind::SyntaxKind;

/// Converts parser events and tokens into a Rowan green tree.
pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: &'t [Token<'input>],
    cursor: usize,
    depth: usize,
    events: Vec<Event>,
}

impl<'t, 'input> Sink<'t, 'input> {
    /// Create a new sink.
    pub fn new(tokens: &'t [Token<'input>], events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            cursor: 0,
            depth: 0,
            events,
        }
    }

    /// Consume the sink and build the green tree.
    ///
    /// Panics if the events are unbalanced or do not consume every token;
    /// both mean a grammar rule is broken.
    pub fn finish(mut self) -> GreenNode {
        let mut forward_parents = Vec::new();

        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::placeholder()) {
                Event::Start {
                    kind,
                    forward_parent,
                    finishes_before,
                } => {
                    let mut finishes = finishes_before;
                    forward_parents.push(kind);
                    let mut fp = forward_parent;

                    while let Some(parent_idx) = fp {
                        match std::mem::replace(&mut self.events[parent_idx], Event::placeholder()) {
                            Event::Start {
                                kind,
                                forward_parent,
                                finishes_before,
                            } => {
                                fp = forward_parent;
                                finishes += finishes_before;
                                forward_parents.push(kind);
                            }
                            _ => unreachable!(),
                        }
                    }

                    // A preceding parent begins where its child begins
                    self.finish_nodes(finishes);
                    for kind in forward_parents.drain(..).rev() {
                        self.builder.start_node(kind.into());
                        self.depth += 1;
                    }
                }
                Event::Token { kind, n_raw_tokens } => {
                    self.token(kind, n_raw_tokens as usize);
                }
                Event::Finish => self.finish_nodes(1),
                Event::Placeholder { finishes_before } => self.finish_nodes(finishes_before),
            }
        }

        assert_eq!(self.depth, 0, "unbalanced parser events");
        assert_eq!(self.cursor, self.tokens.len(), "tokens left outside the tree");
        self.builder.finish()
    }

    fn finish_nodes(&mut self, n: u16) {
        for _ in 0..n {
            assert!(self.depth > 0, "finish without a matching start");
            self.builder.finish_node();
            self.depth -= 1;
        }
    }

    fn token(&mut self, kind: SyntaxKind, n_raw_tokens: usize) {
        let start = self.cursor;
        self.cursor += n_raw_tokens;
        let text: String = self.tokens[start..self.cursor]
            .iter()
            .map(|t| t.text)
            .collect();
        self.builder.token(kind.into(), &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LexMode, lex};
    use crate::syntax_kind::SyntaxNode;

    fn build(tokens: &[Token<'_>], events: Vec<Event>) -> SyntaxNode {
        SyntaxNode::new_root(Sink::new(tokens, events).finish())
    }

    #[test]
    fn sink_builds_simple_tree() {
        let tokens = lex(LexMode::Text, "hello");
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::start(SyntaxKind::XML_TEXT),
            Event::token(SyntaxKind::TEXT),
            Event::Finish,
            Event::Finish,
        ];

        let tree = build(&tokens, events);

        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.children().count(), 1);
        assert_eq!(tree.text().to_string(), "hello");
    }

    #[test]
    fn finishes_before_closes_node_early() {
        // ROOT [ TAG [ a ] ERROR [ b ] ] where TAG was closed before ERROR began
        let tokens = lex(LexMode::Script, "a b");
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::start(SyntaxKind::HTML_TAG),
            Event::token(SyntaxKind::IDENT),
            Event::Start {
                kind: SyntaxKind::ERROR,
                forward_parent: None,
                finishes_before: 1,
            },
            Event::token(SyntaxKind::WHITESPACE),
            Event::token(SyntaxKind::IDENT),
            Event::Finish,
            Event::Finish,
        ];

        let tree = build(&tokens, events);
        let kinds: Vec<_> = tree.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::HTML_TAG, SyntaxKind::ERROR]);
        assert_eq!(tree.text().to_string(), "a b");
    }

    #[test]
    fn abandoned_placeholder_keeps_its_finishes() {
        let tokens = lex(LexMode::Script, "a b");
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::start(SyntaxKind::HTML_TAG),
            Event::token(SyntaxKind::IDENT),
            Event::Placeholder { finishes_before: 1 },
            Event::token(SyntaxKind::WHITESPACE),
            Event::token(SyntaxKind::IDENT),
            Event::Finish,
        ];

        let tree = build(&tokens, events);
        let tag = tree.children().next().unwrap();
        assert_eq!(tag.text().to_string(), "a");
        assert_eq!(tree.text().to_string(), "a b");
    }

    #[test]
    #[should_panic(expected = "unbalanced parser events")]
    fn unbalanced_events_panic() {
        let tokens = lex(LexMode::Text, "x");
        let events = vec![Event::start(SyntaxKind::ROOT), Event::token(SyntaxKind::TEXT)];
        build(&tokens, events);
    }
}
