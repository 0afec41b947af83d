//! # astroglyph-syntax
//!
//! A lossless syntax tree for Astro-style component templates using [Rowan] +
//! [Logos], following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## The Template Language
//!
//! A document has three layers that nest inside each other:
//!
//! ```text
//! ---
//! const { items } = Astro.props;        ← frontmatter script
//! ---
//! <ul class="list">                     ← markup
//!   {items.map(i => <li>{i}</li>)}      ← embedded expression, with markup inside
//! </ul>
//! ```
//!
//! The parser produces a Concrete Syntax Tree that preserves **every byte** of
//! the source, plus a list of [`Diagnostic`]s. Malformed input never fails:
//! unclosed tags, stray closers and broken expressions are recovered from and
//! reported.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Cursor (modal Logos lexer) → Parser → Events → Sink → Rowan Tree
//!                                            (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ### 1. Lexer ([`lexer`] and [`cursor`] modules)
//!
//! Markup text, tag headers, script code and template literal bodies have
//! incompatible token rules, so there is one Logos token set per
//! [`LexMode`](lexer::LexMode). The [`Cursor`](cursor::Cursor) lexes on demand
//! in the mode the grammar asks for.
//!
//! ### 2. Parser ([`parser`] module)
//!
//! The parser emits **events** (Start, Token, Finish) through a **marker
//! system**. Markup rules keep a stack of open elements so that a close tag
//! can force-close the elements left open inside it, ending each of them right
//! before the close tag with [`Marker::complete_before`](parser::Marker::complete_before).
//!
//! Script code is parsed by a pluggable [`ScriptGrammar`]; [`EcmaScript`] is
//! the bundled JavaScript/TypeScript subset.
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! The sink replays the events into a Rowan `GreenNodeBuilder`.
//!
//! ## Module Structure
//!
//! ```text
//! astroglyph-syntax/
//! ├── lib.rs           # This file - public API, tree dump and snapshot tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos token sets, one per lexical mode
//! ├── cursor.rs        # Lazy modal token stream
//! ├── diagnostic.rs    # Diagnostic type and collector
//! ├── options.rs       # ParseOptions
//! ├── stack.rs         # Stack growth for deep recursion
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, public parse functions
//!     ├── event.rs     # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/
//!         ├── mod.rs         # Root document parsing
//!         ├── frontmatter.rs # Leading `---` script block
//!         ├── markup.rs      # Tags, attributes, text and the element stack
//!         ├── embedded.rs    # `{expr}` regions and template literal guard
//!         ├── html.rs        # Void and optional-end element tables
//!         └── script/        # Bundled JS/TS grammar
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use astroglyph_syntax::{parse, SyntaxKind};
//!
//! let parse = parse("<div><span></div>");
//!
//! // The tree preserves all text
//! assert_eq!(parse.syntax().text().to_string(), "<div><span></div>");
//!
//! // The unclosed span is reported, and closed right before `</div>`
//! assert_eq!(parse.diagnostics().len(), 1);
//! let div = parse.syntax().first_child().unwrap();
//! assert_eq!(div.kind(), SyntaxKind::HTML_TAG);
//! assert_eq!(div.first_child().unwrap().text().to_string(), "<span>");
//! ```

pub mod cursor;
pub mod diagnostic;
pub mod lexer;
pub mod options;
pub mod parser;
mod stack;
pub mod syntax_kind;

pub use diagnostic::{Diagnostic, Severity};
pub use options::ParseOptions;
pub use parser::{
    Cancelled, EcmaScript, MAX_NESTING, Parse, Parser, ScriptGrammar, parse, parse_with,
    parse_with_cancel,
};
pub use syntax_kind::{AstroLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Render a tree as indented `KIND@start..end` lines, with token text.
///
/// ```
/// let tree = astroglyph_syntax::parse("<br>").syntax();
/// assert_eq!(
///     astroglyph_syntax::debug_tree(&tree),
///     "ROOT@0..4\n  HTML_TAG@0..4\n    LT@0..1 \"<\"\n    NAME@1..3 \"br\"\n    GT@3..4 \">\"\n"
/// );
/// ```
pub fn debug_tree(node: &SyntaxNode) -> String {
    format_tree(node, 0)
}

fn format_tree(node: &SyntaxNode, indent: usize) -> String {
    let prefix = "  ".repeat(indent);
    let mut result = format!("{prefix}{:?}@{:?}\n", node.kind(), node.text_range());

    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => result.push_str(&format_tree(&n, indent + 1)),
            rowan::NodeOrToken::Token(t) => {
                result.push_str(&format!(
                    "{prefix}  {:?}@{:?} {:?}\n",
                    t.kind(),
                    t.text_range(),
                    t.text()
                ));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn snapshot_element_with_attribute_and_expression() {
        let parse = parse(r#"<p class="a">{x}</p>"#);
        assert!(parse.diagnostics().is_empty());
        assert_snapshot!(debug_tree(&parse.syntax()), @r#"
        ROOT@0..20
          HTML_TAG@0..20
            LT@0..1 "<"
            NAME@1..2 "p"
            WHITESPACE@2..3 " "
            XML_ATTRIBUTE@3..12
              NAME@3..8 "class"
              EQ@8..9 "="
              ATTR_VALUE@9..12 "\"a\""
            GT@12..13 ">"
            EMBEDDED_EXPRESSION@13..16
              L_CURLY@13..14 "{"
              NAME_REF@14..15
                IDENT@14..15 "x"
              R_CURLY@15..16 "}"
            LT_SLASH@16..18 "</"
            NAME@18..19 "p"
            GT@19..20 ">"
        "#);
    }

    #[test]
    fn snapshot_frontmatter() {
        let parse = parse("---\nconst a = 1\n---\n<p/>");
        assert!(parse.diagnostics().is_empty());
        assert_snapshot!(debug_tree(&parse.syntax()), @r#"
        ROOT@0..24
          FRONTMATTER_SCRIPT@0..19
            FRONTMATTER_FENCE@0..3 "---"
            NEWLINE@3..4 "\n"
            VAR_DECL@4..15
              IDENT@4..9 "const"
              WHITESPACE@9..10 " "
              VAR_DECLARATOR@10..15
                IDENT@10..11 "a"
                WHITESPACE@11..12 " "
                EQ@12..13 "="
                WHITESPACE@13..14 " "
                LITERAL@14..15
                  NUMBER@14..15 "1"
            NEWLINE@15..16 "\n"
            FRONTMATTER_FENCE@16..19 "---"
          XML_TEXT@19..20
            NEWLINE@19..20 "\n"
          HTML_TAG@20..24
            LT@20..21 "<"
            NAME@21..22 "p"
            SLASH_GT@22..24 "/>"
        "#);
    }

    #[test]
    fn snapshot_auto_recovered_close() {
        let parse = parse("<div><span></div>");
        assert_snapshot!(debug_tree(&parse.syntax()), @r#"
        ROOT@0..17
          HTML_TAG@0..17
            LT@0..1 "<"
            NAME@1..4 "div"
            GT@4..5 ">"
            HTML_TAG@5..11
              LT@5..6 "<"
              NAME@6..10 "span"
              GT@10..11 ">"
            LT_SLASH@11..13 "</"
            NAME@13..16 "div"
            GT@16..17 ">"
        "#);
        let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.to_string()).collect();
        assert_eq!(messages, vec!["error[6..10]: Element <span> is not closed"]);
    }

    #[test]
    fn roundtrip_preserves_text() {
        let inputs = [
            "",
            "plain text\n",
            "---\nconst a = 1;\n---\n<h1>{a}</h1>\n",
            "<Card title={`Hi ${name}`} {...rest} />",
            "<ul>{items.map(item => <li>{item}</li>)}</ul>",
            "<!DOCTYPE html><!-- note --><p>a &amp; b</p>",
            "<div><span></div>",
            "<p>{a b</p>",
            "<script>if (a < b) {}</script>",
            "</orphan> text } { ",
            "<a href='x",
        ];

        for input in inputs {
            let parse = parse(input);
            assert_eq!(
                parse.syntax().text().to_string(),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
        }
    }

    #[test]
    fn diagnostics_stay_inside_the_document() {
        let inputs = ["<p>{", "<div", "<a b=\"", "---\nconst = \n", "<!--", "{`${"];
        for input in inputs {
            let parse = parse(input);
            let len = input.len() as u32;
            for diagnostic in parse.diagnostics() {
                assert!(u32::from(diagnostic.range.end()) <= len, "{input:?}: {diagnostic}");
            }
        }
    }
}
