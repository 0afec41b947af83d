//! # Token Cursor
//!
//! The cursor sits between the [`lexer`](crate::lexer) and the parser. Unlike a
//! lexer that tokenizes the whole file up front, the cursor lexes **on demand
//! in the mode the parser asks for**, so markup, script and template code can
//! interleave in one pass.
//!
//! ```text
//!          consumed                lookahead (current mode)
//! ┌──────────────────────────┐┌──────────────────────┐
//! │ <  p  >  {                ││ items  .  map  (     │ ... unlexed source
//! └──────────────────────────┘└──────────────────────┘
//!                             ^ offset
//! ```
//!
//! Consumed tokens are final: the [`Sink`](crate::parser::sink::Sink) replays
//! them in order. Lookahead tokens are provisional: switching modes discards
//! them and the source is re-lexed from the end of the last consumed token.

use std::collections::VecDeque;

use rowan::TextRange;

use crate::lexer::{LexMode, Token, lex_token, to_size};
use crate::syntax_kind::SyntaxKind;

/// Mode-aware token cursor over one source document.
pub struct Cursor<'i> {
    source: &'i str,
    mode: LexMode,
    /// Byte offset just past the last consumed token
    offset: usize,
    consumed: Vec<Token<'i>>,
    lookahead: VecDeque<Token<'i>>,
}

impl<'i> Cursor<'i> {
    /// Create a cursor positioned at the start of `source`.
    pub fn new(source: &'i str, mode: LexMode) -> Self {
        Self {
            source,
            mode,
            offset: 0,
            consumed: Vec::new(),
            lookahead: VecDeque::new(),
        }
    }

    /// The lexical mode used for lookahead.
    pub fn mode(&self) -> LexMode {
        self.mode
    }

    /// Switch lexical mode, returning the previous one.
    ///
    /// Switching discards lookahead lexed in the old mode.
    pub fn set_mode(&mut self, mode: LexMode) -> LexMode {
        let previous = self.mode;
        if previous != mode {
            log::trace!("lex mode {previous:?} -> {mode:?} at {}", self.offset);
            self.mode = mode;
            self.lookahead.clear();
        }
        previous
    }

    /// Look ahead `n` tokens in the current mode, or `EOF` past the end.
    pub fn nth(&mut self, n: usize) -> SyntaxKind {
        self.peek(n).map(|t| t.kind).unwrap_or(SyntaxKind::EOF)
    }

    /// Text of the token `n` positions ahead, or `""` past the end.
    pub fn nth_text(&mut self, n: usize) -> &'i str {
        self.peek(n).map(|t| t.text).unwrap_or("")
    }

    /// Range of the token `n` positions ahead; empty at the end of input.
    pub fn nth_range(&mut self, n: usize) -> TextRange {
        match self.peek(n) {
            Some(token) => token.range,
            None => TextRange::empty(to_size(self.source.len())),
        }
    }

    fn peek(&mut self, n: usize) -> Option<&Token<'i>> {
        while self.lookahead.len() <= n {
            let from = self
                .lookahead
                .back()
                .map(|t| usize::from(t.range.end()))
                .unwrap_or(self.offset);
            let token = lex_token(self.mode, self.source, from)?;
            self.lookahead.push_back(token);
        }
        self.lookahead.get(n)
    }

    /// Check if all input has been consumed.
    pub fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Consume the current token and return its kind.
    pub fn bump(&mut self) -> Option<SyntaxKind> {
        self.peek(0)?;
        let token = self.lookahead.pop_front()?;
        let kind = token.kind;
        self.offset = usize::from(token.range.end());
        self.consumed.push(token);
        Some(kind)
    }

    /// Consume everything up to (not including) the first case-insensitive
    /// occurrence of `needle` as a single token of `kind`.
    ///
    /// Consumes nothing when the needle is right at the cursor.
    pub fn bump_until(&mut self, needle: &str, kind: SyntaxKind) -> bool {
        let rest = self.rest();
        let len = find_ignore_ascii_case(rest, needle).unwrap_or(rest.len());
        if len == 0 {
            return false;
        }
        self.lookahead.clear();
        let start = self.offset;
        let end = start + len;
        self.consumed.push(Token {
            kind,
            text: &self.source[start..end],
            range: TextRange::new(to_size(start), to_size(end)),
        });
        self.offset = end;
        true
    }

    /// Source text from the current position to the end.
    pub fn rest(&self) -> &'i str {
        &self.source[self.offset..]
    }

    /// Byte offset of the current position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of the source.
    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    /// Number of tokens consumed so far.
    pub fn consumed_len(&self) -> usize {
        self.consumed.len()
    }

    /// A consumed token by index.
    pub fn consumed(&self, index: usize) -> Option<&Token<'i>> {
        self.consumed.get(index)
    }

    /// Give up the consumed tokens, for the sink.
    pub fn into_tokens(self) -> Vec<Token<'i>> {
        self.consumed
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookahead_does_not_consume() {
        let mut cursor = Cursor::new("a b", LexMode::Script);
        assert_eq!(cursor.nth(2), SyntaxKind::IDENT);
        assert_eq!(cursor.nth_text(2), "b");
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.consumed_len(), 0);
    }

    #[test]
    fn nth_past_end_is_eof() {
        let mut cursor = Cursor::new("a", LexMode::Script);
        assert_eq!(cursor.nth(5), SyntaxKind::EOF);
        assert_eq!(cursor.nth_text(5), "");
    }

    #[test]
    fn mode_switch_relexes_from_offset() {
        let mut cursor = Cursor::new("x='y'", LexMode::Text);
        assert_eq!(cursor.nth(0), SyntaxKind::TEXT);

        cursor.set_mode(LexMode::Tag);
        assert_eq!(cursor.nth(0), SyntaxKind::NAME);
        cursor.bump();
        cursor.bump();

        cursor.set_mode(LexMode::Script);
        assert_eq!(cursor.nth(0), SyntaxKind::STRING);
        assert_eq!(cursor.nth_text(0), "'y'");
    }

    #[test]
    fn bump_until_is_case_insensitive() {
        let mut cursor = Cursor::new("let a = 1;</SCRIPT>", LexMode::Text);
        assert!(cursor.bump_until("</script", SyntaxKind::RAW_TEXT));
        assert_eq!(cursor.rest(), "</SCRIPT>");
        assert_eq!(cursor.consumed(0).map(|t| t.text), Some("let a = 1;"));
        assert!(!cursor.bump_until("</script", SyntaxKind::RAW_TEXT));
    }

    #[test]
    fn bump_until_runs_to_end_without_needle() {
        let mut cursor = Cursor::new("body { }", LexMode::Text);
        assert!(cursor.bump_until("</style", SyntaxKind::RAW_TEXT));
        assert!(cursor.at_end());
    }

    #[test]
    fn consumed_tokens_cover_input() {
        let input = "<p>{a}</p>";
        let mut cursor = Cursor::new(input, LexMode::Text);
        while !cursor.at_end() {
            cursor.bump();
        }
        let text: String = cursor.into_tokens().iter().map(|t| t.text).collect();
        assert_eq!(text, input);
    }
}
