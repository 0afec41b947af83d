//! # Embedded Expressions
//!
//! `{expr}` regions in markup and attribute values, backtick attribute
//! values, and the guard that rejects nested template literals where they are
//! ambiguous.
//!
//! An embedded expression is parsed by the injected script grammar. When the
//! grammar stops before the closing `}`, the rest of the region is skipped
//! into an `ERROR` node:
//!
//! ```text
//! {a b}        EMBEDDED_EXPRESSION [ { NAME_REF(a) ERROR(b) } ]
//! {a b</div>   EMBEDDED_EXPRESSION [ { NAME_REF(a) ]  ERROR(b)  </div> closes the outer div
//! ```
//!
//! In the second case the expression node must end before the skipped tail,
//! which is only known after skipping, so it is closed with
//! [`Marker::complete_before`](crate::parser::Marker::complete_before).

use super::markup::{self, CloseTarget, StackItem};
use crate::lexer::LexMode;
use crate::parser::{Marker, Parser, TemplateMode};
use crate::syntax_kind::SyntaxKind;

/// Where an embedded expression appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpressionSite {
    /// Element content or top-level markup.
    Body,
    /// `name={expr}`.
    AttributeValue,
    /// `{expr}` or `{...spread}` directly in a tag header; may be empty.
    Shorthand,
}

/// Parse `{ expr }` at the cursor into an `EMBEDDED_EXPRESSION` node.
pub(crate) fn embedded_expression(p: &mut Parser<'_, '_>, site: ExpressionSite) {
    let m = p.start();
    p.bump(); // {
    p.set_mode(LexMode::Script);

    if at_empty(p) {
        while !p.at(SyntaxKind::R_CURLY) {
            p.bump();
        }
        p.bump();
        if site != ExpressionSite::Shorthand {
            let range = m.range(p);
            p.error_at(range, "empty expression");
        }
        m.complete(p, SyntaxKind::EMBEDDED_EXPRESSION);
        return;
    }

    p.stack.push(StackItem::Expression(m));
    let template = TemplateMode::default();
    let parsed = p.with_template_mode(template, |p| {
        p.bump_trivia();
        let parsed = if p.at(SyntaxKind::R_CURLY) {
            // only comments between the braces
            true
        } else if site == ExpressionSite::Shorthand && p.at(SyntaxKind::DOT3) {
            spread(p)
        } else {
            p.expression()
        };
        if !parsed {
            p.error("expected expression");
        }
        p.set_mode(LexMode::Script);
        p.bump_trivia();
        parsed
    });

    if p.at(SyntaxKind::R_CURLY) {
        let m = pop_barrier(p);
        p.bump();
        m.complete(p, SyntaxKind::EMBEDDED_EXPRESSION);
        return;
    }

    let junk = p.start();
    let found = p.with_template_mode(template, skip_to_closing_curly);
    let m = pop_barrier(p);
    log::debug!("recovered embedded expression, closing brace found: {found}");

    if junk.is_empty(p) {
        junk.abandon(p);
        p.error("'}' expected");
        m.complete(p, SyntaxKind::EMBEDDED_EXPRESSION);
    } else if found {
        close_junk(p, junk, parsed);
        p.bump();
        m.complete(p, SyntaxKind::EMBEDDED_EXPRESSION);
    } else {
        m.complete_before(p, SyntaxKind::EMBEDDED_EXPRESSION, &junk);
        close_junk(p, junk, parsed);
    }
}

/// Only blank space between the braces.
fn at_empty(p: &mut Parser<'_, '_>) -> bool {
    let mut i = 0;
    while matches!(p.nth(i), SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE) {
        i += 1;
    }
    p.nth(i) == SyntaxKind::R_CURLY
}

fn spread(p: &mut Parser<'_, '_>) -> bool {
    let m = p.start();
    p.bump(); // ...
    if !p.expression() {
        p.error("expected expression");
    }
    m.complete(p, SyntaxKind::SPREAD_ELEMENT);
    true
}

/// Skip tokens until the `}` closing the expression.
///
/// Stops without consuming at end of input or at a close tag that belongs to
/// an element outside the expression. Orphan close tags inside the region are
/// reported and skipped. Returns whether a `}` was reached.
fn skip_to_closing_curly(p: &mut Parser<'_, '_>) -> bool {
    loop {
        p.set_mode(LexMode::Script);
        p.bump_trivia();
        if p.at(SyntaxKind::R_CURLY) {
            return true;
        }
        if p.at_end() || (p.in_frontmatter && p.at(SyntaxKind::FRONTMATTER_FENCE)) {
            return false;
        }
        match markup::close_target(p) {
            Some(CloseTarget::Outer) => return false,
            Some(_) => {
                markup::close_tag(p);
                continue;
            }
            None => {}
        }

        let before = p.position();
        p.set_mode(LexMode::Script);
        p.expression();
        if p.position() == before {
            p.bump();
        }
    }
}

fn close_junk(p: &mut Parser<'_, '_>, junk: Marker, parsed: bool) {
    if parsed {
        junk.error(p, "'}' expected");
    } else {
        // already reported as a missing expression
        junk.complete(p, SyntaxKind::ERROR);
    }
}

fn pop_barrier(p: &mut Parser<'_, '_>) -> Marker {
    match p.stack.pop() {
        Some(StackItem::Expression(m)) => m,
        _ => panic!("expression barrier is not on top of the markup stack"),
    }
}

/// ``name=`...` `` attribute value: a template literal in which another
/// template literal may not appear.
///
/// Substitutions are expressions, so the literal is a barrier on the markup
/// stack like a braced expression.
pub(crate) fn attribute_template(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.stack.push(StackItem::Expression(m));
    let mode = TemplateMode {
        nested_allowed: false,
        top_level_in_progress: false,
    };
    p.with_template_mode(mode, |p| p.string_template());
    let m = pop_barrier(p);
    m.complete(p, SyntaxKind::TEMPLATE_LITERAL);
}

/// Template-literal entry point shared by every context.
///
/// Where nesting is disallowed, the first literal is tracked as top-level
/// for the duration of its parse; a literal that starts inside it is reported
/// on its opening backtick and consumed into an `ERROR` node.
pub(crate) fn string_template(p: &mut Parser<'_, '_>) -> bool {
    let mode = p.template_mode();
    if mode.nested_allowed {
        return script_template(p);
    }

    if mode.top_level_in_progress {
        log::debug!("nested template literal at {}", p.position());
        let m = p.start();
        p.error("nested template literals are not supported");
        p.with_template_mode(TemplateMode::default(), script_template);
        m.complete(p, SyntaxKind::ERROR);
        return true;
    }

    let top_level = TemplateMode {
        nested_allowed: false,
        top_level_in_progress: true,
    };
    p.with_template_mode(top_level, script_template)
}

fn script_template(p: &mut Parser<'_, '_>) -> bool {
    let script = p.script();
    script.string_template(p)
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::SyntaxKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn messages(input: &str) -> Vec<String> {
        parse(input)
            .diagnostics()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    fn nodes(input: &str, kind: SyntaxKind) -> Vec<String> {
        parse(input)
            .syntax()
            .descendants()
            .filter(|n| n.kind() == kind)
            .map(|n| n.text().to_string())
            .collect()
    }

    #[rstest]
    #[case("<p>{}</p>")]
    #[case("<p>{ }</p>")]
    #[case("{\n}")]
    #[case("<a href={}>x</a>")]
    fn empty_expression_is_rejected(#[case] input: &str) {
        assert_eq!(messages(input), vec!["empty expression"]);
        let expr = nodes(input, SyntaxKind::EMBEDDED_EXPRESSION);
        assert_eq!(expr.len(), 1);
        assert!(expr[0].starts_with('{') && expr[0].ends_with('}'));
    }

    #[test]
    fn empty_expression_range_spans_braces() {
        let parse = parse("<p>{}</p>");
        let range = parse.diagnostics()[0].range;
        assert_eq!((u32::from(range.start()), u32::from(range.end())), (3, 5));
    }

    #[test]
    fn empty_shorthand_attribute_is_allowed() {
        let input = "<div {} >x</div>";
        assert!(messages(input).is_empty());
        assert_eq!(nodes(input, SyntaxKind::XML_ATTRIBUTE), vec!["{}"]);
    }

    #[test]
    fn comment_only_expression_is_not_empty() {
        assert!(messages("<p>{/* todo */}</p>").is_empty());
    }

    #[test]
    fn nested_template_in_backtick_attribute_is_rejected() {
        let input = "<div title=`outer ${`inner`} end`></div>";
        let parse = parse(input);
        let diagnostics = parse.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "nested template literals are not supported");
        let inner = input.find("`inner").unwrap() as u32;
        let range = diagnostics[0].range;
        assert_eq!((u32::from(range.start()), u32::from(range.end())), (inner, inner + 1));
        assert_eq!(nodes(input, SyntaxKind::ERROR), vec!["`inner`"]);
    }

    #[test]
    fn nested_template_in_body_is_allowed() {
        let input = "<p>{`outer ${`inner`} end`}</p>";
        assert!(messages(input).is_empty());
        assert_eq!(
            nodes(input, SyntaxKind::TEMPLATE_LITERAL),
            vec!["`outer ${`inner`} end`", "`inner`"]
        );
    }

    #[test]
    fn nested_template_in_braced_attribute_is_allowed() {
        assert!(messages("<p title={`a ${`b`}`}></p>").is_empty());
    }

    #[test]
    fn flat_backtick_attribute() {
        let input = "<p class=`a ${b} c`></p>";
        assert!(messages(input).is_empty());
        assert_eq!(nodes(input, SyntaxKind::TEMPLATE_SUBSTITUTION), vec!["${b}"]);
    }

    #[test]
    fn junk_before_closing_brace() {
        let input = "<p>{a b}</p>";
        assert_eq!(messages(input), vec!["'}' expected"]);
        assert_eq!(nodes(input, SyntaxKind::EMBEDDED_EXPRESSION), vec!["{a b}"]);
        assert_eq!(nodes(input, SyntaxKind::ERROR), vec!["b"]);
    }

    #[test]
    fn unterminated_expression_at_eof() {
        let input = "<p>{a";
        assert_eq!(messages(input), vec!["'}' expected"]);
        assert_eq!(nodes(input, SyntaxKind::EMBEDDED_EXPRESSION), vec!["{a"]);
    }

    #[test]
    fn expression_tail_before_outer_close_tag() {
        let input = "<div>{a b</div>";
        let parse = parse(input);
        let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["'}' expected"]);

        let div = parse.syntax().first_child().unwrap();
        let children: Vec<_> = div.children().map(|n| (n.kind(), n.text().to_string())).collect();
        assert_eq!(
            children,
            vec![
                (SyntaxKind::EMBEDDED_EXPRESSION, "{a ".to_string()),
                (SyntaxKind::ERROR, "b".to_string()),
            ]
        );
        assert_eq!(div.text(), input);
    }

    #[test]
    fn orphan_closer_inside_expression() {
        let input = "<div>{a </span> }</div>";
        let parse = parse(input);
        let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["closing tag matches nothing", "'}' expected"]);
        assert_eq!(nodes(input, SyntaxKind::EMBEDDED_EXPRESSION), vec!["{a </span> }"]);
    }

    #[test]
    fn missing_expression_is_reported_once() {
        let input = "<p>{)}</p>";
        assert_eq!(messages(input), vec!["expected expression"]);
        assert_eq!(nodes(input, SyntaxKind::ERROR), vec![")"]);
    }
}
