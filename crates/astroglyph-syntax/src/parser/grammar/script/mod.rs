//! # Script Grammar
//!
//! Frontmatter statements and embedded expressions are parsed by a
//! [`ScriptGrammar`]. The markup driver only relies on the three entry points
//! of the trait; hosts with their own JS/TS parser can plug it in through
//! [`parse_with`](crate::parse_with).
//!
//! [`EcmaScript`] is the bundled implementation: a recursive-descent parser
//! for the subset of JavaScript and TypeScript that shows up in templates.
//! It builds expression and statement nodes but does not validate semantics.
//!
//! ## Trivia
//!
//! Whitespace, newlines and comments are real tokens in the stream. Script
//! rules look past them with `nth_non_trivia` and consume them right before
//! the next significant token, so nodes never start or end with trivia.
//!
//! ## Boundaries
//!
//! Script rules never consume a token that belongs to the surrounding
//! document: the `}` closing an embedded expression, a frontmatter fence, or
//! the `</` of a close tag. Lists and blocks stop in front of them.

mod expr;
mod stmt;
mod types;

use crate::parser::{CompletedMarker, Marker, Parser};
use crate::syntax_kind::SyntaxKind;

/// Script grammar used for frontmatter and embedded expressions.
///
/// Implementations advance the shared parser and build nodes through it.
/// Every entry point returns `false` without consuming anything when nothing
/// of the requested kind starts at the cursor.
pub trait ScriptGrammar {
    /// Parse one expression.
    fn expression(&self, p: &mut Parser<'_, '_>) -> bool;

    /// Parse one statement of frontmatter code.
    fn statement(&self, p: &mut Parser<'_, '_>) -> bool;

    /// Parse a template literal starting at the opening backtick.
    ///
    /// The caller owns the `TEMPLATE_LITERAL` node; this only consumes the
    /// literal's tokens. Template literals met while parsing an expression must
    /// go through [`Parser::string_template`] instead of calling this directly.
    fn string_template(&self, p: &mut Parser<'_, '_>) -> bool;
}

/// The bundled JavaScript/TypeScript subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcmaScript;

impl ScriptGrammar for EcmaScript {
    fn expression(&self, p: &mut Parser<'_, '_>) -> bool {
        expr::expression(p).is_some()
    }

    fn statement(&self, p: &mut Parser<'_, '_>) -> bool {
        stmt::statement(p)
    }

    fn string_template(&self, p: &mut Parser<'_, '_>) -> bool {
        expr::template_body(p)
    }
}

/// Words that start a statement and can never be an expression.
const STATEMENT_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "const", "continue", "default", "do", "else", "export", "finally",
    "for", "if", "import", "interface", "let", "return", "switch", "throw", "try", "var", "while",
];

fn is_statement_keyword(text: &str) -> bool {
    STATEMENT_KEYWORDS.contains(&text)
}

fn at(p: &mut Parser<'_, '_>, kind: SyntaxKind) -> bool {
    p.nth_non_trivia(0) == kind
}

fn at_keyword(p: &mut Parser<'_, '_>, keyword: &str) -> bool {
    p.nth_non_trivia(0) == SyntaxKind::IDENT && p.nth_non_trivia_text(0) == keyword
}

/// Consume pending trivia and the next token.
fn bump(p: &mut Parser<'_, '_>) {
    p.bump_trivia();
    p.bump();
}

fn eat(p: &mut Parser<'_, '_>, kind: SyntaxKind) -> bool {
    if at(p, kind) {
        bump(p);
        true
    } else {
        false
    }
}

fn eat_keyword(p: &mut Parser<'_, '_>, keyword: &str) -> bool {
    if at_keyword(p, keyword) {
        bump(p);
        true
    } else {
        false
    }
}

/// Start a node at the next significant token.
fn start(p: &mut Parser<'_, '_>) -> Marker {
    p.bump_trivia();
    p.start()
}

/// Report `message` on the next significant token.
fn error_at_next(p: &mut Parser<'_, '_>, message: impl Into<String>) {
    let range = p.nth_non_trivia_range(0);
    p.error_at(range, message);
}

fn expect(p: &mut Parser<'_, '_>, kind: SyntaxKind, what: &str) -> bool {
    if eat(p, kind) {
        return true;
    }
    error_at_next(p, format!("expected {what}"));
    false
}

/// Tokens that end any script construct: closers, the frontmatter fence, end
/// of input and the start of a markup close tag.
fn at_stop(p: &mut Parser<'_, '_>) -> bool {
    match p.nth_non_trivia(0) {
        SyntaxKind::R_CURLY
        | SyntaxKind::R_PAREN
        | SyntaxKind::R_BRACK
        | SyntaxKind::FRONTMATTER_FENCE
        | SyntaxKind::EOF => true,
        SyntaxKind::LT => p.nth_non_trivia(1) == SyntaxKind::SLASH,
        _ => false,
    }
}

/// Parse `open element, element, ... close`, starting at `open`.
///
/// `element` returns `false` without consuming when no element starts at the
/// cursor; such tokens are skipped as errors. Stops in front of a foreign
/// closer or boundary token after reporting the missing `close`.
fn comma_list(
    p: &mut Parser<'_, '_>,
    close: SyntaxKind,
    close_name: &str,
    mut element: impl FnMut(&mut Parser<'_, '_>) -> bool,
) {
    bump(p);
    loop {
        let kind = p.nth_non_trivia(0);
        if kind == close {
            bump(p);
            return;
        }
        if at_stop(p) {
            error_at_next(p, format!("expected {close_name}"));
            return;
        }
        if kind == SyntaxKind::COMMA {
            bump(p);
            continue;
        }
        if !element(p) {
            p.bump_trivia();
            p.err_and_bump("unexpected token");
            continue;
        }
        let kind = p.nth_non_trivia(0);
        if kind == SyntaxKind::COMMA {
            bump(p);
        } else if kind != close && !at_stop(p) {
            error_at_next(p, "expected ','");
        }
    }
}

/// Report a construct nested deeper than [`MAX_NESTING`](crate::parser::MAX_NESTING)
/// and skip it into an `ERROR` node started by `m`.
///
/// Skipping runs to the closer or `;` ending the enclosing construct, keeping
/// brackets inside paired.
fn too_deep(p: &mut Parser<'_, '_>, m: Marker) -> CompletedMarker {
    log::debug!("nesting limit reached at {}", p.position());
    error_at_next(p, "nesting is too deep");
    let mut open = 0usize;
    loop {
        match p.nth_non_trivia(0) {
            SyntaxKind::EOF => break,
            SyntaxKind::L_PAREN | SyntaxKind::L_BRACK | SyntaxKind::L_CURLY => open += 1,
            SyntaxKind::R_PAREN | SyntaxKind::R_BRACK | SyntaxKind::R_CURLY if open == 0 => break,
            SyntaxKind::R_PAREN | SyntaxKind::R_BRACK | SyntaxKind::R_CURLY => open -= 1,
            SyntaxKind::SEMICOLON if open == 0 => break,
            SyntaxKind::FRONTMATTER_FENCE if p.in_frontmatter => break,
            SyntaxKind::LT if open == 0 && p.nth_non_trivia(1) == SyntaxKind::SLASH => break,
            _ => {}
        }
        bump(p);
    }
    m.complete(p, SyntaxKind::ERROR)
}

/// Raw-token lookahead that skips trivia, for scans longer than a few tokens.
#[derive(Default)]
struct Lookahead {
    index: usize,
}

impl Lookahead {
    fn next(&mut self, p: &mut Parser<'_, '_>) -> SyntaxKind {
        loop {
            let kind = p.nth(self.index);
            self.index += 1;
            if !kind.is_trivia() {
                return kind;
            }
        }
    }

    /// Text of the token last returned by `next`.
    fn text<'i>(&self, p: &mut Parser<'_, 'i>) -> &'i str {
        p.nth_text(self.index.saturating_sub(1))
    }
}
