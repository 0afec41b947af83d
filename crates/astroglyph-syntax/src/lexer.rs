//! # Lexer - Tokenizing Astro Source
//!
//! This module breaks source text into tokens using the [Logos] lexer
//! generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## Lexical Modes
//!
//! An Astro document mixes grammars whose token rules contradict each other.
//! An apostrophe is plain text in `<p>don't</p>` but starts a string literal in
//! `{'a' + b}`; `a=b` is text in a paragraph but an attribute inside a tag
//! header. A single context-free token set cannot describe both, so there is
//! one Logos enum per [`LexMode`]:
//!
//! | Mode | Used for | Example tokens |
//! |------|----------|----------------|
//! | [`LexMode::Text`] | markup content | `TEXT`, `LT`, `L_CURLY`, `ENTITY_REF`, `COMMENT` |
//! | [`LexMode::Tag`] | tag headers | `NAME`, `EQ`, `ATTR_VALUE`, `SLASH_GT` |
//! | [`LexMode::Script`] | frontmatter and expressions | `IDENT`, `STRING`, `FAT_ARROW` |
//! | [`LexMode::Template`] | template literal bodies | `TEMPLATE_CHUNK`, `DOLLAR_L_CURLY` |
//!
//! The parser picks the mode; the [`Cursor`](crate::cursor::Cursor) lexes one
//! token at a time in whichever mode is active.
//!
//! ## The Lossless Guarantee
//!
//! In every mode, **every byte of the input appears in exactly one token**.
//! Characters no rule accepts become a single-character fallback token
//! (`TEXT`, `NAME`, `UNKNOWN` or `TEMPLATE_CHUNK` depending on the mode).
//!
//! ```
//! use astroglyph_syntax::lexer::{lex, LexMode};
//!
//! let input = "<p>Hello & welcome</p>\n";
//! let tokens = lex(LexMode::Text, input);
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```

use logos::Logos;
use rowan::{TextRange, TextSize};

use crate::syntax_kind::SyntaxKind;

/// Which token set the lexer uses at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexMode {
    /// Markup content between tags.
    Text,
    /// Inside `<name ... >`.
    Tag,
    /// Frontmatter statements and embedded expressions.
    Script,
    /// Between the backticks of a template literal.
    Template,
}

/// Token kinds for markup content.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[token("---")]
    Fence,

    #[token("<")]
    Lt,

    #[token("</")]
    LtSlash,

    #[token("{")]
    LCurly,

    #[token("}")]
    RCurly,

    #[regex(r"&[a-zA-Z][a-zA-Z0-9]*;")]
    EntityRef,

    #[regex(r"&#[0-9]+;")]
    #[regex(r"&#[xX][0-9a-fA-F]+;")]
    CharRef,

    #[token("<!--", comment)]
    Comment,

    #[regex(r"<![^-][^>]*>?")]
    Doctype,

    #[regex(r"[^\s<{}&]+")]
    Text,
}

/// Consume a markup comment up to and including `-->`, or to end of input.
fn comment(lex: &mut logos::Lexer<'_, TextToken>) {
    let rest = lex.remainder();
    let len = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
    lex.bump(len);
}

/// Token kinds for tag headers.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[token(">")]
    Gt,

    #[token("/>")]
    SlashGt,

    #[token("/")]
    Slash,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token("</")]
    LtSlash,

    #[token("{")]
    LCurly,

    #[token("}")]
    RCurly,

    #[token("`")]
    Backtick,

    #[regex(r#""[^"]*"?"#)]
    #[regex(r"'[^']*'?")]
    AttrValue,

    #[regex(r#"[^\s<>/="'{}`]+"#)]
    Name,
}

/// Token kinds for script code.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[token("---")]
    Fence,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[\p{L}_$][\p{L}\p{N}_$]*")]
    Ident,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?n?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+n?")]
    #[regex(r"0[bB][01_]+n?")]
    #[regex(r"0[oO][0-7_]+n?")]
    Number,

    #[regex(r#""([^"\\\n]|\\[\s\S])*"?"#)]
    #[regex(r"'([^'\\\n]|\\[\s\S])*'?")]
    String,

    #[token("`")]
    Backtick,

    #[token("{")]
    LCurly,

    #[token("}")]
    RCurly,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBrack,

    #[token("]")]
    RBrack,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    #[token("...")]
    Dot3,

    #[token("?")]
    Question,

    #[token("?.")]
    QuestionDot,

    #[token("??")]
    Question2,

    #[token("!")]
    Bang,

    #[token("=")]
    Eq,

    #[token("==")]
    Eq2,

    #[token("===")]
    Eq3,

    #[token("!=")]
    Neq,

    #[token("!==")]
    Neq2,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("**")]
    Star2,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("&")]
    Amp,

    #[token("&&")]
    Amp2,

    #[token("|")]
    Pipe,

    #[token("||")]
    Pipe2,

    #[token("^")]
    Caret,

    #[token("~")]
    Tilde,

    #[token("=>")]
    FatArrow,

    #[token("++")]
    Plus2,

    #[token("--")]
    Minus2,

    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("**=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("&&=")]
    #[token("||=")]
    #[token("??=")]
    AssignOp,
}

/// Consume a block comment up to and including `*/`, or to end of input.
fn block_comment(lex: &mut logos::Lexer<'_, ScriptToken>) {
    let rest = lex.remainder();
    let len = rest.find("*/").map(|i| i + 2).unwrap_or(rest.len());
    lex.bump(len);
}

/// Token kinds between the backticks of a template literal.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateToken {
    #[token("`")]
    Backtick,

    #[token("${")]
    DollarLCurly,

    #[regex(r"([^`$\\]|\\[\s\S]|\$[^{`\\])+")]
    #[token("$")]
    Chunk,
}

/// Conversion from a mode-specific Logos enum to [`SyntaxKind`].
trait ModeToken: Copy {
    /// Kind used for characters no rule of this mode accepts.
    const FALLBACK: SyntaxKind;

    fn to_syntax_kind(self) -> SyntaxKind;
}

impl ModeToken for TextToken {
    const FALLBACK: SyntaxKind = SyntaxKind::TEXT;

    fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TextToken::Whitespace => SyntaxKind::WHITESPACE,
            TextToken::Newline => SyntaxKind::NEWLINE,
            TextToken::Fence => SyntaxKind::FRONTMATTER_FENCE,
            TextToken::Lt => SyntaxKind::LT,
            TextToken::LtSlash => SyntaxKind::LT_SLASH,
            TextToken::LCurly => SyntaxKind::L_CURLY,
            TextToken::RCurly => SyntaxKind::R_CURLY,
            TextToken::EntityRef => SyntaxKind::ENTITY_REF,
            TextToken::CharRef => SyntaxKind::CHAR_REF,
            TextToken::Comment => SyntaxKind::COMMENT,
            TextToken::Doctype => SyntaxKind::DOCTYPE,
            TextToken::Text => SyntaxKind::TEXT,
        }
    }
}

impl ModeToken for TagToken {
    const FALLBACK: SyntaxKind = SyntaxKind::NAME;

    fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TagToken::Whitespace => SyntaxKind::WHITESPACE,
            TagToken::Newline => SyntaxKind::NEWLINE,
            TagToken::Gt => SyntaxKind::GT,
            TagToken::SlashGt => SyntaxKind::SLASH_GT,
            TagToken::Slash => SyntaxKind::SLASH,
            TagToken::Eq => SyntaxKind::EQ,
            TagToken::Lt => SyntaxKind::LT,
            TagToken::LtSlash => SyntaxKind::LT_SLASH,
            TagToken::LCurly => SyntaxKind::L_CURLY,
            TagToken::RCurly => SyntaxKind::R_CURLY,
            TagToken::Backtick => SyntaxKind::BACKTICK,
            TagToken::AttrValue => SyntaxKind::ATTR_VALUE,
            TagToken::Name => SyntaxKind::NAME,
        }
    }
}

impl ModeToken for ScriptToken {
    const FALLBACK: SyntaxKind = SyntaxKind::UNKNOWN;

    fn to_syntax_kind(self) -> SyntaxKind {
        use ScriptToken as T;
        match self {
            T::Whitespace => SyntaxKind::WHITESPACE,
            T::Newline => SyntaxKind::NEWLINE,
            T::Fence => SyntaxKind::FRONTMATTER_FENCE,
            T::LineComment => SyntaxKind::LINE_COMMENT,
            T::BlockComment => SyntaxKind::BLOCK_COMMENT,
            T::Ident => SyntaxKind::IDENT,
            T::Number => SyntaxKind::NUMBER,
            T::String => SyntaxKind::STRING,
            T::Backtick => SyntaxKind::BACKTICK,
            T::LCurly => SyntaxKind::L_CURLY,
            T::RCurly => SyntaxKind::R_CURLY,
            T::LParen => SyntaxKind::L_PAREN,
            T::RParen => SyntaxKind::R_PAREN,
            T::LBrack => SyntaxKind::L_BRACK,
            T::RBrack => SyntaxKind::R_BRACK,
            T::Comma => SyntaxKind::COMMA,
            T::Semicolon => SyntaxKind::SEMICOLON,
            T::Colon => SyntaxKind::COLON,
            T::Dot => SyntaxKind::DOT,
            T::Dot3 => SyntaxKind::DOT3,
            T::Question => SyntaxKind::QUESTION,
            T::QuestionDot => SyntaxKind::QUESTION_DOT,
            T::Question2 => SyntaxKind::QUESTION2,
            T::Bang => SyntaxKind::BANG,
            T::Eq => SyntaxKind::EQ,
            T::Eq2 => SyntaxKind::EQ2,
            T::Eq3 => SyntaxKind::EQ3,
            T::Neq => SyntaxKind::NEQ,
            T::Neq2 => SyntaxKind::NEQ2,
            T::Lt => SyntaxKind::LT,
            T::Gt => SyntaxKind::GT,
            T::LtEq => SyntaxKind::LTEQ,
            T::GtEq => SyntaxKind::GTEQ,
            T::Plus => SyntaxKind::PLUS,
            T::Minus => SyntaxKind::MINUS,
            T::Star => SyntaxKind::STAR,
            T::Star2 => SyntaxKind::STAR2,
            T::Slash => SyntaxKind::SLASH,
            T::Percent => SyntaxKind::PERCENT,
            T::Amp => SyntaxKind::AMP,
            T::Amp2 => SyntaxKind::AMP2,
            T::Pipe => SyntaxKind::PIPE,
            T::Pipe2 => SyntaxKind::PIPE2,
            T::Caret => SyntaxKind::CARET,
            T::Tilde => SyntaxKind::TILDE,
            T::FatArrow => SyntaxKind::FAT_ARROW,
            T::Plus2 => SyntaxKind::PLUS2,
            T::Minus2 => SyntaxKind::MINUS2,
            T::AssignOp => SyntaxKind::ASSIGN_OP,
        }
    }
}

impl ModeToken for TemplateToken {
    const FALLBACK: SyntaxKind = SyntaxKind::TEMPLATE_CHUNK;

    fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TemplateToken::Backtick => SyntaxKind::BACKTICK,
            TemplateToken::DollarLCurly => SyntaxKind::DOLLAR_L_CURLY,
            TemplateToken::Chunk => SyntaxKind::TEMPLATE_CHUNK,
        }
    }
}

/// A lexed token with its kind, text slice and position in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Lex the single token that starts at `offset`, or `None` at end of input.
pub fn lex_token(mode: LexMode, input: &str, offset: usize) -> Option<Token<'_>> {
    match mode {
        LexMode::Text => first::<TextToken>(input, offset),
        LexMode::Tag => first::<TagToken>(input, offset),
        LexMode::Script => first::<ScriptToken>(input, offset),
        LexMode::Template => first::<TemplateToken>(input, offset),
    }
}

fn first<'a, T>(input: &'a str, offset: usize) -> Option<Token<'a>>
where
    T: Logos<'a, Source = str> + ModeToken,
    T::Extras: Default,
{
    let mut lexer = T::lexer(&input[offset..]);
    let result = lexer.next()?;
    let span = lexer.span();
    let kind = match result {
        Ok(token) => token.to_syntax_kind(),
        // Unrecognized character - keep it as a fallback token so nothing is lost
        Err(_) => T::FALLBACK,
    };
    let start = offset + span.start;
    let end = offset + span.end;
    Some(Token {
        kind,
        text: &input[start..end],
        range: TextRange::new(to_size(start), to_size(end)),
    })
}

pub(crate) fn to_size(offset: usize) -> TextSize {
    TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX))
}

/// Lex the whole input in one mode.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(mode: LexMode, input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while let Some(token) = lex_token(mode, input, offset) {
        offset = usize::from(token.range.end());
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(mode: LexMode, input: &str) -> Vec<(SyntaxKind, &str)> {
        lex(mode, input).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(LexMode::Text, ""), vec![]);
    }

    #[test]
    fn lex_markup_text() {
        assert_eq!(
            kinds(LexMode::Text, "Hi <b>don't</b>"),
            vec![
                (SyntaxKind::TEXT, "Hi"),
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::LT, "<"),
                (SyntaxKind::TEXT, "b>don't"),
                (SyntaxKind::LT_SLASH, "</"),
                (SyntaxKind::TEXT, "b>"),
            ]
        );
    }

    #[test]
    fn lex_references() {
        assert_eq!(
            kinds(LexMode::Text, "&amp;&#123;&#x7B;&"),
            vec![
                (SyntaxKind::ENTITY_REF, "&amp;"),
                (SyntaxKind::CHAR_REF, "&#123;"),
                (SyntaxKind::CHAR_REF, "&#x7B;"),
                (SyntaxKind::TEXT, "&"),
            ]
        );
    }

    #[test]
    fn lex_comment_and_doctype() {
        assert_eq!(
            kinds(LexMode::Text, "<!DOCTYPE html><!-- a -- b -->"),
            vec![
                (SyntaxKind::DOCTYPE, "<!DOCTYPE html>"),
                (SyntaxKind::COMMENT, "<!-- a -- b -->"),
            ]
        );
    }

    #[test]
    fn lex_unterminated_comment_runs_to_end() {
        assert_eq!(
            kinds(LexMode::Text, "<!-- open\n<p>"),
            vec![(SyntaxKind::COMMENT, "<!-- open\n<p>")]
        );
    }

    #[test]
    fn lex_fence_only_when_exact() {
        assert_eq!(
            kinds(LexMode::Text, "---\n----"),
            vec![
                (SyntaxKind::FRONTMATTER_FENCE, "---"),
                (SyntaxKind::NEWLINE, "\n"),
                (SyntaxKind::TEXT, "----"),
            ]
        );
    }

    #[test]
    fn lex_tag_header() {
        assert_eq!(
            kinds(LexMode::Tag, r#"div class="a b" client:load {x} />"#),
            vec![
                (SyntaxKind::NAME, "div"),
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::NAME, "class"),
                (SyntaxKind::EQ, "="),
                (SyntaxKind::ATTR_VALUE, "\"a b\""),
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::NAME, "client:load"),
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::L_CURLY, "{"),
                (SyntaxKind::NAME, "x"),
                (SyntaxKind::R_CURLY, "}"),
                (SyntaxKind::WHITESPACE, " "),
                (SyntaxKind::SLASH_GT, "/>"),
            ]
        );
    }

    #[rstest]
    #[case("a => b", &[SyntaxKind::IDENT, SyntaxKind::WHITESPACE, SyntaxKind::FAT_ARROW, SyntaxKind::WHITESPACE, SyntaxKind::IDENT])]
    #[case("x?.y ?? z", &[SyntaxKind::IDENT, SyntaxKind::QUESTION_DOT, SyntaxKind::IDENT, SyntaxKind::WHITESPACE, SyntaxKind::QUESTION2, SyntaxKind::WHITESPACE, SyntaxKind::IDENT])]
    #[case("a !== b", &[SyntaxKind::IDENT, SyntaxKind::WHITESPACE, SyntaxKind::NEQ2, SyntaxKind::WHITESPACE, SyntaxKind::IDENT])]
    #[case("n ??= 1.5e3", &[SyntaxKind::IDENT, SyntaxKind::WHITESPACE, SyntaxKind::ASSIGN_OP, SyntaxKind::WHITESPACE, SyntaxKind::NUMBER])]
    #[case("'it\\'s' // done", &[SyntaxKind::STRING, SyntaxKind::WHITESPACE, SyntaxKind::LINE_COMMENT])]
    #[case("/* a */---", &[SyntaxKind::BLOCK_COMMENT, SyntaxKind::FRONTMATTER_FENCE])]
    #[case("...rest", &[SyntaxKind::DOT3, SyntaxKind::IDENT])]
    fn lex_script(#[case] input: &str, #[case] expected: &[SyntaxKind]) {
        let actual: Vec<_> = lex(LexMode::Script, input).into_iter().map(|t| t.kind).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn lex_template_body() {
        assert_eq!(
            kinds(LexMode::Template, "a $b \\` ${x}`"),
            vec![
                (SyntaxKind::TEMPLATE_CHUNK, "a $b \\` "),
                (SyntaxKind::DOLLAR_L_CURLY, "${"),
                (SyntaxKind::TEMPLATE_CHUNK, "x}"),
                (SyntaxKind::BACKTICK, "`"),
            ]
        );
    }

    #[test]
    fn lex_token_at_offset_reports_document_range() {
        let input = "<p>{x}</p>";
        let token = lex_token(LexMode::Script, input, 4).unwrap();
        assert_eq!(token.kind, SyntaxKind::IDENT);
        assert_eq!(token.text, "x");
        assert_eq!(token.range, TextRange::new(4.into(), 5.into()));
    }

    #[rstest]
    #[case(LexMode::Text)]
    #[case(LexMode::Tag)]
    #[case(LexMode::Script)]
    #[case(LexMode::Template)]
    fn all_bytes_preserved(#[case] mode: LexMode) {
        let input = "---\nconst a = `x${1}`;\n---\n<p class='c'>héllo {a} &amp; <!-- c --></p>\r\n\u{a0}";
        let tokens = lex(mode, input);
        let reconstructed: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }
}
