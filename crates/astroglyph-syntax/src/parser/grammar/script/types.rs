//! TypeScript types.
//!
//! Types are kept as opaque `TYPE` nodes: unions and intersections of
//! operands, where bracketed parts are skipped with balanced delimiters.

use super::{at, at_keyword, at_stop, bump, error_at_next, start, too_deep};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind::{self, *};

/// `: T`
pub(super) fn type_annotation(p: &mut Parser<'_, '_>) {
    let m = start(p);
    bump(p); // :
    type_expr(p);
    m.complete(p, TYPE_ANNOTATION);
}

pub(super) fn type_expr(p: &mut Parser<'_, '_>) {
    if p.nested(union_type).is_none() {
        let m = start(p);
        too_deep(p, m);
    }
}

/// Operands joined by `|` or `&`, with an optional conditional tail.
fn union_type(p: &mut Parser<'_, '_>) {
    let m = start(p);
    if at(p, PIPE) || at(p, AMP) {
        bump(p);
    }
    loop {
        if !type_operand(p) {
            error_at_next(p, "expected type");
            break;
        }
        if at(p, PIPE) || at(p, AMP) {
            bump(p);
            continue;
        }
        if at_keyword(p, "extends") && !p.newline_before_next() {
            conditional_tail(p);
        }
        break;
    }
    m.complete(p, TYPE);
}

/// `extends U ? X : Y`
fn conditional_tail(p: &mut Parser<'_, '_>) {
    bump(p);
    type_operand(p);
    if at(p, QUESTION) {
        bump(p);
        type_expr(p);
        if at(p, COLON) {
            bump(p);
            type_expr(p);
        } else {
            error_at_next(p, "expected ':'");
        }
    }
}

fn type_operand(p: &mut Parser<'_, '_>) -> bool {
    while matches!(
        p.nth_non_trivia_text(0),
        "keyof" | "typeof" | "readonly" | "unique" | "infer"
    ) && p.nth_non_trivia(1) != PIPE
    {
        bump(p);
    }

    match p.nth_non_trivia(0) {
        IDENT => {
            bump(p);
            while at(p, DOT) && p.nth_non_trivia(1) == IDENT {
                bump(p);
                bump(p);
            }
            if p.nth(0) == LT {
                balanced(p, LT, GT);
            }
        }
        STRING | NUMBER => bump(p),
        MINUS if p.nth_non_trivia(1) == NUMBER => {
            bump(p);
            bump(p);
        }
        BACKTICK => {
            let m = start(p);
            p.string_template();
            m.complete(p, TEMPLATE_LITERAL);
        }
        L_CURLY => balanced(p, L_CURLY, R_CURLY),
        L_BRACK => balanced(p, L_BRACK, R_BRACK),
        L_PAREN => {
            balanced(p, L_PAREN, R_PAREN);
            if at(p, FAT_ARROW) {
                bump(p);
                type_expr(p);
            }
        }
        LT => {
            // generic function type
            type_params(p);
            if at(p, L_PAREN) {
                balanced(p, L_PAREN, R_PAREN);
            }
            if at(p, FAT_ARROW) {
                bump(p);
                type_expr(p);
            }
        }
        _ => return false,
    }

    while at(p, L_BRACK) && !p.newline_before_next() {
        balanced(p, L_BRACK, R_BRACK);
    }
    true
}

/// `<T, U extends V>`
pub(super) fn type_params(p: &mut Parser<'_, '_>) {
    balanced(p, LT, GT);
}

/// Object type body of an interface.
pub(super) fn object_type(p: &mut Parser<'_, '_>) {
    let m = start(p);
    balanced(p, L_CURLY, R_CURLY);
    m.complete(p, TYPE);
}

/// Skip from `open` to its matching `close`, pairing every bracket inside.
///
/// Template literals inside are parsed so that their backticks pair up.
fn balanced(p: &mut Parser<'_, '_>, open: SyntaxKind, close: SyntaxKind) {
    bump(p);
    let mut pending = vec![close];
    while let Some(&expected) = pending.last() {
        let kind = p.nth_non_trivia(0);
        match kind {
            _ if kind == expected => {
                pending.pop();
            }
            L_PAREN => pending.push(R_PAREN),
            L_BRACK => pending.push(R_BRACK),
            L_CURLY => pending.push(R_CURLY),
            LT if open == LT => pending.push(GT),
            BACKTICK => {
                let m = start(p);
                p.string_template();
                m.complete(p, TEMPLATE_LITERAL);
                continue;
            }
            _ if at_stop(p) => {
                error_at_next(p, format!("expected {}", closer_name(expected)));
                return;
            }
            _ => {}
        }
        bump(p);
    }
}

fn closer_name(kind: SyntaxKind) -> &'static str {
    match kind {
        GT => "'>'",
        R_CURLY => "'}'",
        R_BRACK => "']'",
        _ => "')'",
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::SyntaxKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn annotation(ty: &str) -> (String, usize) {
        let input = format!("---\nlet a: {ty} = b\n---\n");
        let parse = parse(&input);
        let node = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::TYPE)
            .unwrap();
        (node.text().to_string(), parse.diagnostics().len())
    }

    #[rstest]
    #[case("string")]
    #[case("string | null")]
    #[case("Array<Record<string, number>>")]
    #[case("{ a: string; b?: number }")]
    #[case("Array<{ id: number }>")]
    #[case("[number, string]")]
    #[case("(a: number) => void")]
    #[case("keyof typeof obj")]
    #[case("Item[]")]
    #[case("'a' | 'b'")]
    #[case("T extends string ? A : B")]
    #[case("astroHTML.JSX.AnchorHTMLAttributes")]
    fn types_are_skipped_whole(#[case] ty: &str) {
        let (text, errors) = annotation(ty);
        assert_eq!(text, ty);
        assert_eq!(errors, 0);
    }

    #[test]
    fn unclosed_generic_stops_at_fence() {
        let parse = parse("---\nlet a: Array<string\n---\n<p/>");
        let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["expected '>'"]);
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::FRONTMATTER_SCRIPT, SyntaxKind::XML_TEXT, SyntaxKind::HTML_TAG]
        );
    }
}
