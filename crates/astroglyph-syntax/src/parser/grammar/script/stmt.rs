//! Statements and declarations.
//!
//! Statements end at `;`, at a line break, or in front of a token that closes
//! the surrounding construct.

use super::expr::{self, assignment, binding_pattern, function_tail};
use super::{
    at, at_keyword, at_stop, bump, eat, eat_keyword, error_at_next, expect, start, too_deep, types,
};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind::*;

/// Parse one statement. Returns `false` without consuming anything when no
/// statement starts at the cursor.
pub(super) fn statement(p: &mut Parser<'_, '_>) -> bool {
    match p.nested(statement_kind) {
        Some(parsed) => parsed,
        None => {
            let m = start(p);
            too_deep(p, m);
            true
        }
    }
}

fn statement_kind(p: &mut Parser<'_, '_>) -> bool {
    match p.nth_non_trivia(0) {
        SEMICOLON => {
            let m = start(p);
            p.bump();
            m.complete(p, EMPTY_STMT);
            true
        }
        L_CURLY => {
            block(p);
            true
        }
        IDENT => keyword_statement(p).unwrap_or_else(|| expression_statement(p)),
        _ if at_stop(p) => false,
        _ => expression_statement(p),
    }
}

/// Statements introduced by a keyword, or `None` to parse an expression.
fn keyword_statement(p: &mut Parser<'_, '_>) -> Option<bool> {
    let next = p.nth_non_trivia(1);
    match p.nth_non_trivia_text(0) {
        "import" if !matches!(next, L_PAREN | DOT) => import_decl(p),
        "export" => export_decl(p),
        "const" | "var" => var_decl(p, true),
        "let" if matches!(next, IDENT | L_CURLY | L_BRACK) => var_decl(p, true),
        "function" => function_decl(p),
        "async" if next == IDENT && p.nth_non_trivia_text(1) == "function" => function_decl(p),
        "interface" if next == IDENT => interface_decl(p),
        "type" if next == IDENT => type_alias(p),
        "if" => if_stmt(p),
        "for" => for_stmt(p),
        "while" => while_stmt(p),
        "do" => do_while_stmt(p),
        "switch" => switch_stmt(p),
        "return" => return_stmt(p),
        "throw" => throw_stmt(p),
        "try" => try_stmt(p),
        "break" | "continue" => jump_stmt(p),
        _ => return None,
    }
    Some(true)
}

fn expression_statement(p: &mut Parser<'_, '_>) -> bool {
    let m = start(p);
    if expr::expression(p).is_none() {
        m.abandon(p);
        return false;
    }
    semi(p);
    m.complete(p, EXPR_STMT);
    true
}

/// Statement terminator: `;`, a line break, or a closing token.
fn semi(p: &mut Parser<'_, '_>) {
    if eat(p, SEMICOLON) || p.newline_before_next() || at_stop(p) {
        return;
    }
    error_at_next(p, "expected ';'");
}

fn sub_statement(p: &mut Parser<'_, '_>) {
    if !statement(p) {
        error_at_next(p, "expected statement");
    }
}

/// `{ statements }`
pub(super) fn block(p: &mut Parser<'_, '_>) {
    if !at(p, L_CURLY) {
        error_at_next(p, "expected '{'");
        return;
    }
    let m = start(p);
    p.bump();
    loop {
        if eat(p, R_CURLY) {
            break;
        }
        if matches!(p.nth_non_trivia(0), EOF | FRONTMATTER_FENCE)
            || (at(p, LT) && p.nth_non_trivia(1) == SLASH)
        {
            error_at_next(p, "expected '}'");
            break;
        }
        p.bump_trivia();
        let before = p.position();
        statement(p);
        if p.position() == before {
            p.err_and_bump("unexpected token");
        }
    }
    m.complete(p, BLOCK_STMT);
}

fn import_decl(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    if at_keyword(p, "type") && matches!(p.nth_non_trivia(1), IDENT | L_CURLY | STAR) {
        bump(p);
    }

    if at(p, STRING) {
        bump(p);
    } else {
        loop {
            match p.nth_non_trivia(0) {
                IDENT if p.nth_non_trivia_text(0) == "from" => break,
                IDENT | STAR | COMMA => bump(p),
                L_CURLY => named_clause(p),
                _ => break,
            }
        }
        if eat_keyword(p, "from") {
            expect(p, STRING, "module specifier");
        } else {
            error_at_next(p, "expected 'from'");
        }
    }

    if at_keyword(p, "with") || at_keyword(p, "assert") {
        bump(p);
        if at(p, L_CURLY) {
            expr::object(p);
        }
    }
    semi(p);
    m.complete(p, IMPORT_DECL);
}

/// `{ a, b as c }` in imports and exports.
fn named_clause(p: &mut Parser<'_, '_>) {
    bump(p);
    loop {
        match p.nth_non_trivia(0) {
            R_CURLY => {
                bump(p);
                break;
            }
            IDENT | STRING | COMMA => bump(p),
            _ if at_stop(p) => {
                error_at_next(p, "expected '}'");
                break;
            }
            _ => {
                p.bump_trivia();
                p.err_and_bump("unexpected token");
            }
        }
    }
}

fn export_decl(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();

    if eat_keyword(p, "default") {
        let declaration = at_keyword(p, "function")
            || (at_keyword(p, "async") && p.nth_non_trivia_text(1) == "function");
        if declaration {
            function_decl(p);
        } else {
            if assignment(p).is_none() {
                error_at_next(p, "expected expression");
            }
            semi(p);
        }
    } else if at(p, L_CURLY) || at(p, STAR) || (at_keyword(p, "type") && p.nth_non_trivia(1) == L_CURLY) {
        eat_keyword(p, "type");
        if at(p, STAR) {
            bump(p);
            if eat_keyword(p, "as") {
                expect(p, IDENT, "name");
            }
        } else {
            named_clause(p);
        }
        if eat_keyword(p, "from") {
            expect(p, STRING, "module specifier");
        }
        semi(p);
    } else if !statement(p) {
        error_at_next(p, "expected declaration");
    }
    m.complete(p, EXPORT_DECL);
}

/// `const a = 1, { b } = c`. Without `semi`, as used in `for` headers.
fn var_decl(p: &mut Parser<'_, '_>, with_semi: bool) {
    let m = start(p);
    p.bump();
    loop {
        declarator(p);
        if !eat(p, COMMA) {
            break;
        }
    }
    if with_semi {
        semi(p);
    }
    m.complete(p, VAR_DECL);
}

fn declarator(p: &mut Parser<'_, '_>) {
    let m = start(p);
    if !binding_pattern(p) {
        error_at_next(p, "expected binding name");
    }
    if p.nth(0) == BANG {
        p.bump();
    }
    if at(p, COLON) {
        types::type_annotation(p);
    }
    if eat(p, EQ) && assignment(p).is_none() {
        error_at_next(p, "expected expression");
    }
    m.complete(p, VAR_DECLARATOR);
}

fn function_decl(p: &mut Parser<'_, '_>) {
    let m = start(p);
    let is_async = eat_keyword(p, "async");
    bump(p); // function
    eat(p, STAR);
    if !eat(p, IDENT) {
        error_at_next(p, "expected function name");
    }
    function_tail(p, is_async);
    m.complete(p, FUNCTION_DECL);
}

fn interface_decl(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    bump(p); // name
    if p.nth(0) == LT {
        types::type_params(p);
    }
    if eat_keyword(p, "extends") {
        loop {
            types::type_expr(p);
            if !eat(p, COMMA) {
                break;
            }
        }
    }
    if at(p, L_CURLY) {
        types::object_type(p);
    } else {
        error_at_next(p, "expected '{'");
    }
    m.complete(p, TYPE_DECL);
}

fn type_alias(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    bump(p); // name
    if p.nth(0) == LT {
        types::type_params(p);
    }
    if expect(p, EQ, "'='") {
        types::type_expr(p);
    }
    semi(p);
    m.complete(p, TYPE_DECL);
}

/// `( expr )` after `if` and `while`.
fn condition(p: &mut Parser<'_, '_>) {
    if !expect(p, L_PAREN, "'('") {
        return;
    }
    if expr::expression(p).is_none() {
        error_at_next(p, "expected expression");
    }
    expect(p, R_PAREN, "')'");
}

fn if_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    condition(p);
    sub_statement(p);
    if eat_keyword(p, "else") {
        sub_statement(p);
    }
    m.complete(p, IF_STMT);
}

fn for_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    eat_keyword(p, "await");
    if expect(p, L_PAREN, "'('") {
        if matches!(p.nth_non_trivia_text(0), "const" | "let" | "var") && p.nth_non_trivia(0) == IDENT {
            var_decl(p, false);
        } else if !at(p, SEMICOLON) {
            expr::expression(p);
        }

        if eat_keyword(p, "of") || eat_keyword(p, "in") {
            if expr::expression(p).is_none() {
                error_at_next(p, "expected expression");
            }
        } else if expect(p, SEMICOLON, "';'") {
            if !at(p, SEMICOLON) {
                expr::expression(p);
            }
            expect(p, SEMICOLON, "';'");
            if !at(p, R_PAREN) {
                expr::expression(p);
            }
        }
        expect(p, R_PAREN, "')'");
    }
    sub_statement(p);
    m.complete(p, FOR_STMT);
}

fn while_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    condition(p);
    sub_statement(p);
    m.complete(p, WHILE_STMT);
}

fn do_while_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    sub_statement(p);
    if eat_keyword(p, "while") {
        condition(p);
    } else {
        error_at_next(p, "expected 'while'");
    }
    eat(p, SEMICOLON);
    m.complete(p, WHILE_STMT);
}

fn switch_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    condition(p);
    if expect(p, L_CURLY, "'{'") {
        loop {
            if eat(p, R_CURLY) {
                break;
            }
            if matches!(p.nth_non_trivia(0), EOF | FRONTMATTER_FENCE)
                || (at(p, LT) && p.nth_non_trivia(1) == SLASH)
            {
                error_at_next(p, "expected '}'");
                break;
            }
            p.bump_trivia();
            if !switch_case(p) {
                p.err_and_bump("expected 'case' or 'default'");
            }
        }
    }
    m.complete(p, SWITCH_STMT);
}

/// `case expr:` or `default:`, then statements up to the next clause.
fn switch_case(p: &mut Parser<'_, '_>) -> bool {
    let m = start(p);
    if eat_keyword(p, "case") {
        if expr::expression(p).is_none() {
            error_at_next(p, "expected expression");
        }
    } else if !eat_keyword(p, "default") {
        m.abandon(p);
        return false;
    }
    expect(p, COLON, "':'");
    while !(at_keyword(p, "case") || at_keyword(p, "default") || at_stop(p)) {
        p.bump_trivia();
        let before = p.position();
        statement(p);
        if p.position() == before {
            p.err_and_bump("unexpected token");
        }
    }
    m.complete(p, SWITCH_CASE);
    true
}

fn return_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    let bare = p.newline_before_next() || at(p, SEMICOLON) || at_stop(p);
    if !bare && expr::expression(p).is_none() {
        error_at_next(p, "expected expression");
    }
    semi(p);
    m.complete(p, RETURN_STMT);
}

fn throw_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    if expr::expression(p).is_none() {
        error_at_next(p, "expected expression");
    }
    semi(p);
    m.complete(p, THROW_STMT);
}

fn try_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    block(p);
    if eat_keyword(p, "catch") {
        if eat(p, L_PAREN) {
            if !binding_pattern(p) {
                error_at_next(p, "expected binding name");
            }
            if at(p, COLON) {
                types::type_annotation(p);
            }
            expect(p, R_PAREN, "')'");
        }
        block(p);
    }
    if eat_keyword(p, "finally") {
        block(p);
    }
    m.complete(p, TRY_STMT);
}

/// `break` and `continue`, with an optional label.
fn jump_stmt(p: &mut Parser<'_, '_>) {
    let m = start(p);
    p.bump();
    if at(p, IDENT) && !p.newline_before_next() {
        bump(p);
    }
    semi(p);
    m.complete(p, JUMP_STMT);
}
