//! # Grammar Rules
//!
//! This module contains the grammar rules that drive parsing. Each function
//! takes a `&mut Parser` and uses its methods to:
//!
//! 1. Select the lexical mode it needs (`p.set_mode()`, `p.with_mode()`)
//! 2. Inspect the current token (`p.current()`, `p.at()`, `p.nth()`)
//! 3. Consume tokens (`p.bump()`, `p.eat()`)
//! 4. Build tree structure (`p.start()` → marker → `complete()`/`abandon()`)
//!
//! ## Module Structure
//!
//! - [`frontmatter`] - the leading `---` script block
//! - [`markup`] - tags, attributes, text, comments and the tag stack
//! - [`embedded`] - `{expr}` regions and the template-literal nesting guard
//! - [`html`] - void and optional-end element tables
//! - [`script`] - the bundled JS/TS grammar behind [`ScriptGrammar`](script::ScriptGrammar)
//!
//! ## Error Recovery
//!
//! Grammar functions are lenient: they always produce a tree. Unexpected
//! tokens are wrapped in `ERROR` nodes or absorbed into the current node, and
//! a diagnostic is recorded. Every loop must consume at least one token per
//! iteration or stop.

pub(crate) mod embedded;
mod frontmatter;
mod html;
pub(crate) mod markup;
pub mod script;

use crate::lexer::LexMode;
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root document.
///
/// Creates a ROOT node holding the optional frontmatter followed by markup.
/// Elements still open at the end of input are force-closed.
pub(crate) fn document(p: &mut Parser<'_, '_>) {
    let m = p.start();

    if p.options().frontmatter && at_frontmatter(p) {
        p.bump_trivia();
        frontmatter::frontmatter(p);
    }

    while !p.at_end() {
        if p.check_cancelled() {
            break;
        }
        markup::content_step(p);
    }
    markup::unwind_to(p, 0);

    m.complete(p, SyntaxKind::ROOT);
}

/// A fence preceded only by blank space starts the document.
fn at_frontmatter(p: &mut Parser<'_, '_>) -> bool {
    p.set_mode(LexMode::Text);
    let mut i = 0;
    while matches!(p.nth(i), SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE) {
        i += 1;
    }
    p.nth(i) == SyntaxKind::FRONTMATTER_FENCE
}
