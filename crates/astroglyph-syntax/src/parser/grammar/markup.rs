//! # Markup Grammar
//!
//! Tags, attributes, text runs and comments, plus the bookkeeping for open
//! elements.
//!
//! Open elements live on [`Parser::stack`] as [`StackItem::Tag`]. An embedded
//! expression pushes a [`StackItem::Expression`] barrier while its script is
//! parsed: markup that appears inside the expression can only close elements
//! opened above the barrier, so a stray `</div>` inside `{...}` never closes
//! the `<div>` around the expression.
//!
//! ```text
//! <ul>{items.map(i => <li>{i}</li>)}</ul>
//!
//! stack while parsing the inner {i}:
//!   Tag(ul) | Expression | Tag(li) | Expression
//! ```
//!
//! Elements closed by something other than their own close tag end exactly
//! where that something begins, using [`Marker::complete_before`].

use rowan::TextRange;

use super::embedded::{self, ExpressionSite};
use super::html;
use crate::lexer::LexMode;
use crate::parser::{CompletedMarker, Marker, Parser};
use crate::syntax_kind::SyntaxKind;

/// One entry of the open-element stack.
pub(crate) enum StackItem {
    Tag(TagItem),
    /// Barrier for an embedded expression; holds the expression's marker.
    Expression(Marker),
}

/// An element whose start tag has been parsed but which is not closed yet.
pub(crate) struct TagItem {
    /// Name as written, empty for fragments
    name: String,
    /// Lower-cased name used for HTML table lookups
    normalized: String,
    kind: SyntaxKind,
    name_range: TextRange,
    /// Whether leaving the element open is an error
    requires_close: bool,
    marker: Marker,
}

/// How a tag header ended.
enum HeaderEnd {
    Body,
    SelfClosing,
    Unclosed,
}

/// What a closing tag at the cursor would close.
pub(crate) enum CloseTarget {
    /// An element above the nearest expression barrier, by stack index.
    Open(usize),
    /// Only an element outside the enclosing expression.
    Outer,
    Nothing,
}

/// Parse one item of element content or top-level markup.
///
/// Always consumes at least one token.
pub(crate) fn content_step(p: &mut Parser<'_, '_>) {
    p.set_mode(LexMode::Text);
    match p.current() {
        SyntaxKind::LT if at_open_tag(p) => {
            open_tag(p);
        }
        SyntaxKind::LT_SLASH if at_close_tag(p) => close_tag(p),
        SyntaxKind::L_CURLY => embedded::embedded_expression(p, ExpressionSite::Body),
        SyntaxKind::COMMENT => comment(p),
        SyntaxKind::DOCTYPE => p.bump(),
        _ => text(p),
    }
}

/// Parse an element that starts inside a script expression.
///
/// The element's content runs until its close tag, a `}` that ends the
/// surrounding expression, a close tag belonging to an element outside the
/// expression, or end of input.
pub(crate) fn element_in_expression(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    if !at_open_tag(p) {
        return None;
    }
    let depth = p.stack.len();
    let element = open_tag(p);

    while p.stack.len() > depth {
        p.set_mode(LexMode::Text);
        let leaves_expression = p.at_end()
            || p.at(SyntaxKind::R_CURLY)
            || (p.in_frontmatter && p.at(SyntaxKind::FRONTMATTER_FENCE))
            || matches!(close_target(p), Some(CloseTarget::Outer));
        if leaves_expression {
            log::debug!("markup in expression ends at {}", p.position());
            unwind_to(p, depth);
            break;
        }
        content_step(p);
    }

    Some(element)
}

fn inside_barrier(p: &Parser<'_, '_>) -> bool {
    p.stack
        .iter()
        .any(|item| matches!(item, StackItem::Expression(_)))
}

/// `<` followed by a tag name or `>`.
fn at_open_tag(p: &mut Parser<'_, '_>) -> bool {
    p.with_mode(LexMode::Tag, |p| {
        p.at(SyntaxKind::LT)
            && (p.nth(1) == SyntaxKind::GT
                || (p.nth(1) == SyntaxKind::NAME && starts_with_letter(p.nth_text(1))))
    })
}

/// `</` followed by a tag name or `>`.
pub(crate) fn at_close_tag(p: &mut Parser<'_, '_>) -> bool {
    p.with_mode(LexMode::Tag, |p| {
        p.at(SyntaxKind::LT_SLASH)
            && (p.nth(1) == SyntaxKind::GT
                || (p.nth(1) == SyntaxKind::NAME && starts_with_letter(p.nth_text(1))))
    })
}

fn starts_with_letter(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_alphabetic)
}

fn is_component(name: &str) -> bool {
    name.is_empty()
        || name.contains('.')
        || name.chars().next().is_some_and(char::is_uppercase)
}

/// Parse a start tag; pushes the element when it has content.
///
/// Returns the element's node, which is still open when it has a body.
fn open_tag(p: &mut Parser<'_, '_>) -> CompletedMarker {
    p.set_mode(LexMode::Tag);
    let (name, name_range) = if p.nth(1) == SyntaxKind::NAME {
        (p.nth_text(1).to_string(), p.nth_range(1))
    } else {
        let range = p.nth_range(0).cover(p.nth_range(1));
        (String::new(), range)
    };
    let normalized = name.to_ascii_lowercase();
    let kind = if is_component(&name) {
        SyntaxKind::COMPONENT_TAG
    } else {
        SyntaxKind::HTML_TAG
    };

    let m = p.start();
    if kind == SyntaxKind::HTML_TAG {
        unwind_while(p, Some(&m), |_, open| {
            open.kind == SyntaxKind::HTML_TAG && html::closes_implicitly(&open.normalized, &normalized)
        });
        p.set_mode(LexMode::Tag);
    }
    p.bump(); // <
    if !name.is_empty() {
        p.bump();
    }

    let end = tag_header(p, name_range);
    let element = m.handle();
    let is_void = kind == SyntaxKind::HTML_TAG && html::is_void(&normalized);
    let has_body = match end {
        HeaderEnd::Body => !is_void,
        HeaderEnd::SelfClosing => false,
        HeaderEnd::Unclosed => !is_void && !p.at_end(),
    };
    if !has_body {
        return m.complete(p, kind);
    }
    if p.nesting_exhausted() {
        log::debug!("nesting limit reached at <{name}>");
        p.error_at(name_range, "nesting is too deep");
        return m.complete(p, kind);
    }

    let raw_text = matches!(end, HeaderEnd::Body)
        && kind == SyntaxKind::HTML_TAG
        && p.options().is_raw_text_element(&normalized);
    let raw_text_end = raw_text.then(|| format!("</{normalized}"));
    let requires_close = kind == SyntaxKind::COMPONENT_TAG || !html::has_optional_end(&normalized);
    log::trace!("open <{name}> at depth {}", p.stack.len());
    p.stack.push(StackItem::Tag(TagItem {
        name,
        normalized,
        kind,
        name_range,
        requires_close,
        marker: m,
    }));
    if let Some(needle) = raw_text_end {
        p.bump_until(&needle, SyntaxKind::RAW_TEXT);
    }
    element
}

/// Attributes up to and including `>` or `/>`.
fn tag_header(p: &mut Parser<'_, '_>, name_range: TextRange) -> HeaderEnd {
    loop {
        p.set_mode(LexMode::Tag);
        match p.current() {
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE => p.bump(),
            SyntaxKind::NAME => attribute(p),
            SyntaxKind::L_CURLY => {
                let a = p.start();
                embedded::embedded_expression(p, ExpressionSite::Shorthand);
                a.complete(p, SyntaxKind::XML_ATTRIBUTE);
            }
            SyntaxKind::GT => {
                p.bump();
                return HeaderEnd::Body;
            }
            SyntaxKind::SLASH_GT => {
                p.bump();
                return HeaderEnd::SelfClosing;
            }
            SyntaxKind::LT | SyntaxKind::LT_SLASH | SyntaxKind::EOF => {
                p.error_at(name_range, "tag start is not closed");
                return HeaderEnd::Unclosed;
            }
            _ => p.err_and_bump("attribute name expected"),
        }
    }
}

/// `name`, `name=value`, `name={expr}` or ``name=`template` ``.
fn attribute(p: &mut Parser<'_, '_>) {
    let a = p.start();
    p.bump();

    let mut i = 0;
    while matches!(p.nth(i), SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE) {
        i += 1;
    }
    if p.nth(i) == SyntaxKind::EQ {
        for _ in 0..=i {
            p.bump();
        }
        while matches!(p.current(), SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE) {
            p.bump();
        }
        attribute_value(p);
    }

    a.complete(p, SyntaxKind::XML_ATTRIBUTE);
}

fn attribute_value(p: &mut Parser<'_, '_>) {
    match p.current() {
        SyntaxKind::ATTR_VALUE => {
            if !is_closed_quote(p.current_text()) {
                p.error("missing closing quote");
            }
            p.bump();
        }
        SyntaxKind::NAME => p.bump_remap(SyntaxKind::ATTR_VALUE),
        SyntaxKind::L_CURLY => embedded::embedded_expression(p, ExpressionSite::AttributeValue),
        SyntaxKind::BACKTICK => embedded::attribute_template(p),
        _ => p.error("attribute value expected"),
    }
}

fn is_closed_quote(value: &str) -> bool {
    let mut chars = value.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) => open == close,
        _ => false,
    }
}

/// What the close tag at the cursor closes, or `None` when not at one.
pub(crate) fn close_target(p: &mut Parser<'_, '_>) -> Option<CloseTarget> {
    if !at_close_tag(p) {
        return None;
    }
    let name = p.with_mode(LexMode::Tag, |p| match p.nth(1) {
        SyntaxKind::NAME => p.nth_text(1),
        _ => "",
    });
    let matches_any = name.is_empty() && p.options().empty_closing_tag_matches_any;
    let matches = |item: &StackItem| match item {
        StackItem::Tag(tag) => matches_any || tag.name.eq_ignore_ascii_case(name),
        StackItem::Expression(_) => false,
    };

    let barrier = p
        .stack
        .iter()
        .rposition(|item| matches!(item, StackItem::Expression(_)));
    let open_from = barrier.map_or(0, |b| b + 1);
    if matches_any {
        // `</>` closes whatever is on top
        if p.stack.len() > open_from {
            return Some(CloseTarget::Open(p.stack.len() - 1));
        }
    } else if let Some(index) = p.stack[open_from..].iter().rposition(matches) {
        return Some(CloseTarget::Open(open_from + index));
    }
    match barrier {
        Some(b) if p.stack[..b].iter().any(matches) => Some(CloseTarget::Outer),
        _ => Some(CloseTarget::Nothing),
    }
}

/// Parse `</name>` and close the element it matches.
///
/// Elements left open above the match are force-closed right before the
/// close tag. A close tag that matches nothing becomes an `ERROR` node.
pub(crate) fn close_tag(p: &mut Parser<'_, '_>) {
    let target = close_target(p);
    p.set_mode(LexMode::Tag);
    let close = p.start();
    p.bump(); // </
    if p.at(SyntaxKind::NAME) {
        p.bump();
    }
    while matches!(p.current(), SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE) {
        p.bump();
    }
    if !p.eat(SyntaxKind::GT) {
        p.error("'>' expected");
    }

    match target {
        Some(CloseTarget::Open(index)) => {
            unwind_while(p, Some(&close), |depth, _| depth > index + 1);
            close.abandon(p);
            if let Some(StackItem::Tag(item)) = p.stack.pop() {
                log::trace!("close <{}>", item.name);
                item.marker.complete(p, item.kind);
            }
        }
        _ => {
            log::debug!("closing tag at {} matches nothing", p.position());
            close.error(p, "closing tag matches nothing");
        }
    }
}

/// Force-close open elements above `depth` at the current position.
pub(crate) fn unwind_to(p: &mut Parser<'_, '_>, depth: usize) {
    unwind_while(p, None, |len, _| len > depth);
}

/// Pop and close elements from the top of the stack while `keep_going`
/// holds, stopping at an expression barrier.
///
/// `keep_going` sees the stack length before the pop and the element on top.
/// With a `boundary`, each element ends where the boundary marker begins.
fn unwind_while(
    p: &mut Parser<'_, '_>,
    boundary: Option<&Marker>,
    mut keep_going: impl FnMut(usize, &TagItem) -> bool,
) {
    loop {
        let depth = p.stack.len();
        match p.stack.last() {
            Some(StackItem::Tag(item)) if keep_going(depth, item) => {}
            _ => break,
        }
        let Some(StackItem::Tag(item)) = p.stack.pop() else {
            break;
        };

        if item.requires_close {
            p.error_at(item.name_range, format!("Element <{}> is not closed", item.name));
        } else {
            log::trace!("implicitly closing <{}>", item.name);
        }
        match boundary {
            Some(boundary) => item.marker.complete_before(p, item.kind, boundary),
            None => item.marker.complete(p, item.kind),
        };
    }
}

fn comment(p: &mut Parser<'_, '_>) {
    let text = p.current_text();
    if text.len() < "<!---->".len() || !text.ends_with("-->") {
        p.error("comment is not closed");
    }
    p.bump();
}

/// A run of character data, references and stray markup punctuation.
fn text(p: &mut Parser<'_, '_>) {
    let in_expression = inside_barrier(p);
    let m = p.start();
    loop {
        p.set_mode(LexMode::Text);
        match p.current() {
            SyntaxKind::TEXT
            | SyntaxKind::WHITESPACE
            | SyntaxKind::NEWLINE
            | SyntaxKind::ENTITY_REF
            | SyntaxKind::CHAR_REF => p.bump(),
            SyntaxKind::FRONTMATTER_FENCE if !p.in_frontmatter => p.bump_remap(SyntaxKind::TEXT),
            SyntaxKind::R_CURLY if !in_expression => p.bump_remap(SyntaxKind::TEXT),
            SyntaxKind::LT if !at_open_tag(p) => p.bump_remap(SyntaxKind::TEXT),
            SyntaxKind::LT_SLASH if !at_close_tag(p) => p.bump_remap(SyntaxKind::TEXT),
            _ => break,
        }
    }
    if m.is_empty(p) {
        m.abandon(p);
    } else {
        m.complete(p, SyntaxKind::XML_TEXT);
    }
}
