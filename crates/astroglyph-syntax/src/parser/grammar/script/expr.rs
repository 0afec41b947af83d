//! Expressions, from comma sequences down to primaries.
//!
//! Binary operators use precedence climbing. Arrow functions are detected by
//! scanning ahead to the `=>` before committing.

use rowan::TextRange;

use super::{
    Lookahead, at, at_keyword, at_stop, bump, comma_list, eat, eat_keyword, error_at_next, expect,
    is_statement_keyword, start, stmt, too_deep, types,
};
use crate::lexer::{LexMode, to_size};
use crate::parser::{CompletedMarker, Parser, ScriptContext};
use crate::syntax_kind::SyntaxKind::{self, *};

const AWAIT_NOT_ALLOWED: &str = "'await' is only allowed in frontmatter and async functions";

type Rule = fn(&mut Parser<'_, '_>) -> Option<CompletedMarker>;

/// `a, b, c`
pub(super) fn expression(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    let depth = p.depth();
    let mut lhs = assignment(p)?;
    while at(p, COMMA) && !at_sequence_end(p) {
        if !p.deepen() {
            let m = lhs.precede(p);
            lhs = too_deep(p, m);
            break;
        }
        let m = lhs.precede(p);
        bump(p);
        operand(p, assignment);
        lhs = m.complete(p, BIN_EXPR);
    }
    p.restore_depth(depth);
    Some(lhs)
}

/// A trailing comma before a closer is left for the enclosing list.
fn at_sequence_end(p: &mut Parser<'_, '_>) -> bool {
    matches!(p.nth_non_trivia(1), R_CURLY | R_PAREN | R_BRACK | EOF)
}

/// Parse `rule`, reporting a missing expression when it matches nothing.
fn operand(p: &mut Parser<'_, '_>, rule: Rule) {
    if rule(p).is_none() {
        error_at_next(p, "expected expression");
    }
}

pub(super) fn assignment(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    match p.nested(assignment_expr) {
        Some(done) => done,
        None => {
            let m = start(p);
            Some(too_deep(p, m))
        }
    }
}

fn assignment_expr(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    if at_arrow_function(p) {
        return Some(arrow_function(p));
    }
    if at_keyword(p, "yield") {
        return Some(yield_expr(p));
    }

    let lhs = conditional(p)?;
    if matches!(p.nth_non_trivia(0), EQ | ASSIGN_OP) {
        let m = lhs.precede(p);
        bump(p);
        operand(p, assignment);
        return Some(m.complete(p, ASSIGN_EXPR));
    }
    Some(lhs)
}

fn conditional(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    let condition = binary(p, 0)?;
    if !at(p, QUESTION) {
        return Some(condition);
    }
    let m = condition.precede(p);
    bump(p);
    operand(p, assignment);
    expect(p, COLON, "':'");
    operand(p, assignment);
    Some(m.complete(p, COND_EXPR))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Infix {
    Binary,
    RightBinary,
    /// `as` and `satisfies`, followed by a type.
    Cast,
}

fn infix(p: &mut Parser<'_, '_>) -> Option<(u8, Infix)> {
    let bp = match p.nth_non_trivia(0) {
        QUESTION2 | PIPE2 => 1,
        AMP2 => 2,
        PIPE => 3,
        CARET => 4,
        AMP => 5,
        EQ2 | EQ3 | NEQ | NEQ2 => 6,
        // `</` is the start of a close tag
        LT if p.nth_non_trivia(1) == SLASH => return None,
        LT | GT | LTEQ | GTEQ => 7,
        IDENT => match p.nth_non_trivia_text(0) {
            "instanceof" | "in" => 7,
            "as" | "satisfies" if !p.newline_before_next() => return Some((8, Infix::Cast)),
            _ => return None,
        },
        PLUS | MINUS => 9,
        STAR | SLASH | PERCENT => 10,
        STAR2 => return Some((11, Infix::RightBinary)),
        _ => return None,
    };
    Some((bp, Infix::Binary))
}

fn binary(p: &mut Parser<'_, '_>, min_bp: u8) -> Option<CompletedMarker> {
    let depth = p.depth();
    let mut lhs = unary(p)?;
    while let Some((bp, op)) = infix(p) {
        if bp < min_bp {
            break;
        }
        if !p.deepen() {
            let m = lhs.precede(p);
            lhs = too_deep(p, m);
            break;
        }
        let m = lhs.precede(p);
        bump(p);
        if op == Infix::Cast {
            types::type_expr(p);
            lhs = m.complete(p, AS_EXPR);
            continue;
        }
        let rhs_bp = if op == Infix::RightBinary { bp } else { bp + 1 };
        match p.nested(|p| binary(p, rhs_bp)) {
            Some(Some(_)) => {}
            Some(None) => error_at_next(p, "expected expression"),
            None => {
                let rest = start(p);
                too_deep(p, rest);
            }
        }
        lhs = m.complete(p, BIN_EXPR);
    }
    p.restore_depth(depth);
    Some(lhs)
}

fn unary(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    match p.nested(unary_expr) {
        Some(done) => done,
        None => {
            let m = start(p);
            Some(too_deep(p, m))
        }
    }
}

fn unary_expr(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    match p.nth_non_trivia(0) {
        BANG | TILDE | PLUS | MINUS | PLUS2 | MINUS2 => Some(prefix(p)),
        IDENT => match p.nth_non_trivia_text(0) {
            "typeof" | "void" | "delete" => Some(prefix(p)),
            "await" => Some(await_expr(p)),
            _ => postfix(p),
        },
        _ => postfix(p),
    }
}

fn prefix(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = start(p);
    p.bump();
    operand(p, unary);
    m.complete(p, PREFIX_EXPR)
}

fn await_expr(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = start(p);
    if !p.script_context().await_allowed {
        p.error(AWAIT_NOT_ALLOWED);
    }
    p.bump();
    operand(p, unary);
    m.complete(p, AWAIT_EXPR)
}

fn yield_expr(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = start(p);
    p.bump();
    eat(p, STAR);
    let ends = p.newline_before_next()
        || at_stop(p)
        || matches!(p.nth_non_trivia(0), COMMA | SEMICOLON | COLON);
    if !ends {
        assignment(p);
    }
    m.complete(p, PREFIX_EXPR)
}

fn postfix(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    let depth = p.depth();
    let mut lhs = primary(p)?;
    loop {
        let newline = p.newline_before_next();
        let link = match p.nth_non_trivia(0) {
            DOT | QUESTION_DOT => true,
            BANG => p.nth(0) == BANG,
            L_BRACK | L_PAREN | BACKTICK | PLUS2 | MINUS2 => !newline,
            _ => false,
        };
        if link && !p.deepen() {
            let m = lhs.precede(p);
            lhs = too_deep(p, m);
            break;
        }
        lhs = match p.nth_non_trivia(0) {
            DOT | QUESTION_DOT => member(p, lhs),
            L_BRACK if !newline => index(p, lhs),
            L_PAREN if !newline => call(p, lhs),
            BACKTICK if !newline => tagged_template(p, lhs),
            // non-null assertion, only directly after the operand
            BANG if p.nth(0) == BANG => {
                let m = lhs.precede(p);
                p.bump();
                m.complete(p, POSTFIX_EXPR)
            }
            PLUS2 | MINUS2 if !newline => {
                let m = lhs.precede(p);
                bump(p);
                m.complete(p, POSTFIX_EXPR)
            }
            _ => break,
        };
    }
    p.restore_depth(depth);
    Some(lhs)
}

fn member(p: &mut Parser<'_, '_>, lhs: CompletedMarker) -> CompletedMarker {
    let m = lhs.precede(p);
    let optional = at(p, QUESTION_DOT);
    bump(p);
    if optional && at(p, L_PAREN) {
        arg_list(p);
        return m.complete(p, CALL_EXPR);
    }
    if optional && at(p, L_BRACK) {
        bracket(p);
        return m.complete(p, INDEX_EXPR);
    }
    if at(p, IDENT) {
        bump(p);
    } else {
        error_at_next(p, "expected property name");
    }
    m.complete(p, MEMBER_EXPR)
}

fn index(p: &mut Parser<'_, '_>, lhs: CompletedMarker) -> CompletedMarker {
    let m = lhs.precede(p);
    bracket(p);
    m.complete(p, INDEX_EXPR)
}

fn bracket(p: &mut Parser<'_, '_>) {
    bump(p);
    operand(p, expression);
    expect(p, R_BRACK, "']'");
}

fn call(p: &mut Parser<'_, '_>, lhs: CompletedMarker) -> CompletedMarker {
    let m = lhs.precede(p);
    arg_list(p);
    m.complete(p, CALL_EXPR)
}

fn arg_list(p: &mut Parser<'_, '_>) {
    let m = start(p);
    comma_list(p, R_PAREN, "')'", spread_or_assignment);
    m.complete(p, ARG_LIST);
}

fn spread_or_assignment(p: &mut Parser<'_, '_>) -> bool {
    if at(p, DOT3) {
        spread(p);
        return true;
    }
    assignment(p).is_some()
}

fn spread(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    operand(p, assignment);
    m.complete(p, SPREAD_ELEMENT);
}

fn tagged_template(p: &mut Parser<'_, '_>, lhs: CompletedMarker) -> CompletedMarker {
    let m = lhs.precede(p);
    template_literal(p);
    m.complete(p, TAGGED_TEMPLATE)
}

fn template_literal(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = start(p);
    p.string_template();
    m.complete(p, TEMPLATE_LITERAL)
}

fn primary(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    p.bump_trivia();
    let done = match p.current() {
        NUMBER | STRING => literal(p),
        BACKTICK => template_literal(p),
        L_PAREN => paren(p),
        L_BRACK => array(p),
        L_CURLY => object(p),
        LT => return p.markup_element(),
        IDENT => return ident_primary(p),
        _ => return None,
    };
    Some(done)
}

fn literal(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    m.complete(p, LITERAL)
}

fn ident_primary(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    let done = match p.current_text() {
        "true" | "false" | "null" => literal(p),
        "function" => function_expr(p),
        "async" if p.nth_non_trivia(1) == IDENT && p.nth_non_trivia_text(1) == "function" => {
            function_expr(p)
        }
        "new" => new_expr(p),
        "import" if matches!(p.nth_non_trivia(1), L_PAREN | DOT) => name_ref(p),
        word if is_statement_keyword(word) => return None,
        _ => name_ref(p),
    };
    Some(done)
}

fn name_ref(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    m.complete(p, NAME_REF)
}

fn paren(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    operand(p, expression);
    expect(p, R_PAREN, "')'");
    m.complete(p, PAREN_EXPR)
}

/// `[a, ...b]`, also used as a destructuring pattern.
pub(super) fn array(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = start(p);
    comma_list(p, R_BRACK, "']'", spread_or_assignment);
    m.complete(p, ARRAY_EXPR)
}

/// `{ a, b: c }`, also used as a destructuring pattern.
pub(super) fn object(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = start(p);
    comma_list(p, R_CURLY, "'}'", property);
    m.complete(p, OBJECT_EXPR)
}

fn is_property_key(kind: SyntaxKind) -> bool {
    matches!(kind, IDENT | STRING | NUMBER | L_BRACK)
}

fn property(p: &mut Parser<'_, '_>) -> bool {
    if at(p, DOT3) {
        spread(p);
        return true;
    }

    let m = start(p);
    let mut is_async = false;
    if matches!(p.nth_non_trivia_text(0), "get" | "set" | "async")
        && p.nth_non_trivia(0) == IDENT
        && (is_property_key(p.nth_non_trivia(1)) || p.nth_non_trivia(1) == STAR)
    {
        is_async = p.nth_non_trivia_text(0) == "async";
        bump(p);
    }
    eat(p, STAR);

    if !property_key(p) {
        if m.is_empty(p) {
            m.abandon(p);
            return false;
        }
        error_at_next(p, "expected property name");
        m.complete(p, PROPERTY);
        return true;
    }

    match p.nth_non_trivia(0) {
        COLON => {
            bump(p);
            operand(p, assignment);
        }
        L_PAREN | LT => function_tail(p, is_async),
        // shorthand with default, only valid in patterns
        EQ => {
            bump(p);
            operand(p, assignment);
        }
        _ => {}
    }
    m.complete(p, PROPERTY);
    true
}

fn property_key(p: &mut Parser<'_, '_>) -> bool {
    match p.nth_non_trivia(0) {
        IDENT | STRING | NUMBER => {
            bump(p);
            true
        }
        L_BRACK => {
            bracket(p);
            true
        }
        _ => false,
    }
}

fn new_expr(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    if eat(p, DOT) {
        // new.target
        expect(p, IDENT, "'target'");
        return m.complete(p, MEMBER_EXPR);
    }

    match primary(p) {
        Some(mut callee) => loop {
            callee = match p.nth_non_trivia(0) {
                DOT => member(p, callee),
                L_BRACK => index(p, callee),
                _ => break,
            };
        },
        None => error_at_next(p, "expected expression"),
    }
    if at(p, L_PAREN) && !p.newline_before_next() {
        arg_list(p);
    }
    m.complete(p, NEW_EXPR)
}

fn function_expr(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = p.start();
    let is_async = eat_keyword(p, "async");
    bump(p); // function
    eat(p, STAR);
    if at(p, IDENT) {
        bump(p);
    }
    function_tail(p, is_async);
    m.complete(p, FUNCTION_EXPR)
}

/// Type parameters, parameters, return type and body.
pub(super) fn function_tail(p: &mut Parser<'_, '_>, is_async: bool) {
    if at(p, LT) {
        types::type_params(p);
    }
    param_list(p);
    if at(p, COLON) {
        types::type_annotation(p);
    }
    if at(p, L_CURLY) {
        function_body(p, is_async);
    } else {
        error_at_next(p, "expected '{'");
    }
}

fn function_body(p: &mut Parser<'_, '_>, is_async: bool) {
    let context = ScriptContext {
        await_allowed: is_async,
    };
    p.with_script_context(context, stmt::block);
}

fn param_list(p: &mut Parser<'_, '_>) {
    if !at(p, L_PAREN) {
        error_at_next(p, "expected '('");
        return;
    }
    let m = start(p);
    comma_list(p, R_PAREN, "')'", param);
    m.complete(p, PARAM_LIST);
}

fn param(p: &mut Parser<'_, '_>) -> bool {
    let m = start(p);
    eat(p, DOT3);
    while matches!(
        p.nth_non_trivia_text(0),
        "public" | "private" | "protected" | "readonly"
    ) && p.nth_non_trivia(1) == IDENT
    {
        bump(p);
    }
    if !binding_pattern(p) {
        if m.is_empty(p) {
            m.abandon(p);
            return false;
        }
        error_at_next(p, "expected parameter name");
    }
    eat(p, QUESTION);
    if at(p, COLON) {
        types::type_annotation(p);
    }
    if eat(p, EQ) {
        operand(p, assignment);
    }
    m.complete(p, PARAM);
    true
}

/// Identifier, object pattern or array pattern.
pub(super) fn binding_pattern(p: &mut Parser<'_, '_>) -> bool {
    match p.nth_non_trivia(0) {
        IDENT => {
            bump(p);
            true
        }
        L_CURLY => {
            object(p);
            true
        }
        L_BRACK => {
            array(p);
            true
        }
        _ => false,
    }
}

fn at_arrow_function(p: &mut Parser<'_, '_>) -> bool {
    let mut la = Lookahead::default();
    let mut kind = la.next(p);
    if kind == IDENT && la.text(p) == "async" {
        match la.next(p) {
            next @ (IDENT | L_PAREN) => kind = next,
            next => return next == FAT_ARROW,
        }
    }

    match kind {
        IDENT => !is_statement_keyword(la.text(p)) && la.next(p) == FAT_ARROW,
        L_PAREN => {
            let mut depth = 1usize;
            while depth > 0 {
                match la.next(p) {
                    L_PAREN | L_BRACK | L_CURLY => depth += 1,
                    R_PAREN | R_BRACK | R_CURLY => depth -= 1,
                    EOF | FRONTMATTER_FENCE => return false,
                    _ => {}
                }
            }
            match la.next(p) {
                FAT_ARROW => true,
                COLON => return_type_then_arrow(p, &mut la),
                _ => false,
            }
        }
        _ => false,
    }
}

/// After `(...):`, whether a return type is followed by `=>`.
fn return_type_then_arrow(p: &mut Parser<'_, '_>, la: &mut Lookahead) -> bool {
    let mut depth = 0usize;
    loop {
        match la.next(p) {
            FAT_ARROW if depth == 0 => return true,
            L_PAREN | L_BRACK | L_CURLY | LT => depth += 1,
            R_PAREN | R_BRACK | R_CURLY | GT => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            SEMICOLON | COMMA | EQ | QUESTION | COLON if depth == 0 => return false,
            EOF | FRONTMATTER_FENCE => return false,
            _ => {}
        }
    }
}

fn arrow_function(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = start(p);
    let is_async = at_keyword(p, "async") && p.nth_non_trivia(1) != FAT_ARROW;
    if is_async {
        bump(p);
    }

    if at(p, IDENT) {
        let params = start(p);
        let param = p.start();
        p.bump();
        param.complete(p, PARAM);
        params.complete(p, PARAM_LIST);
    } else {
        param_list(p);
    }
    if at(p, COLON) {
        types::type_annotation(p);
    }
    expect(p, FAT_ARROW, "'=>'");

    if at(p, L_CURLY) {
        function_body(p, is_async);
    } else {
        let context = ScriptContext {
            await_allowed: is_async,
        };
        p.with_script_context(context, |p| operand(p, assignment));
    }
    m.complete(p, ARROW_FN)
}

/// Tokens of a template literal, from the opening backtick to the closing
/// one. The caller owns the `TEMPLATE_LITERAL` node.
///
/// Inside frontmatter an unterminated literal ends before the closing fence.
pub(super) fn template_body(p: &mut Parser<'_, '_>) -> bool {
    p.with_mode(LexMode::Template, |p| {
        if !p.at(BACKTICK) {
            return false;
        }
        p.bump();
        loop {
            match p.current() {
                TEMPLATE_CHUNK if p.in_frontmatter && p.current_text().contains(FENCE_LINE) => {
                    p.bump_until(FENCE_LINE, TEMPLATE_CHUNK);
                    unterminated_template(p);
                    return true;
                }
                TEMPLATE_CHUNK => p.bump(),
                DOLLAR_L_CURLY => {
                    if !substitution(p) {
                        unterminated_template(p);
                        return true;
                    }
                }
                BACKTICK => {
                    p.bump();
                    return true;
                }
                _ => {
                    unterminated_template(p);
                    return true;
                }
            }
        }
    })
}

const FENCE_LINE: &str = "\n---";

fn unterminated_template(p: &mut Parser<'_, '_>) {
    let here = TextRange::empty(to_size(p.position()));
    p.error_at(here, "unterminated template literal");
}

/// `${ expr }` inside a template literal. Returns whether the closing `}`
/// was found.
fn substitution(p: &mut Parser<'_, '_>) -> bool {
    let m = p.start();
    p.bump();
    let closed = p.with_mode(LexMode::Script, |p| {
        if expression(p).is_none() {
            error_at_next(p, "expected expression");
        }
        if eat(p, R_CURLY) {
            return true;
        }

        let junk = start(p);
        while !substitution_ends(p) {
            let before = p.position();
            expression(p);
            if p.position() == before {
                p.bump_trivia();
                p.bump();
            }
        }
        let skipped = !junk.is_empty(p);
        if skipped {
            junk.error(p, "'}' expected");
        } else {
            junk.abandon(p);
        }
        let closed = eat(p, R_CURLY);
        if !closed && !skipped {
            error_at_next(p, "'}' expected");
        }
        closed
    });
    m.complete(p, TEMPLATE_SUBSTITUTION);
    closed
}

/// A `}`, the end of input, a close tag, or the fence ending the frontmatter.
fn substitution_ends(p: &mut Parser<'_, '_>) -> bool {
    match p.nth_non_trivia(0) {
        R_CURLY | EOF => true,
        FRONTMATTER_FENCE => p.in_frontmatter,
        LT => p.nth_non_trivia(1) == SLASH,
        _ => false,
    }
}
