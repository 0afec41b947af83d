//! Frontmatter script: statements between a leading `---` and the next one.

use crate::lexer::LexMode;
use crate::parser::{Parser, ScriptContext};
use crate::syntax_kind::SyntaxKind;

/// Parse `--- statements ---` into a `FRONTMATTER_SCRIPT` node.
///
/// A missing closing fence is not diagnosed: the node simply runs to the end
/// of input and keeps whatever statements were parsed.
pub(super) fn frontmatter(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // opening fence

    let context = ScriptContext {
        await_allowed: true,
    };
    p.in_frontmatter = true;
    p.with_script_context(context, |p| {
        p.with_mode(LexMode::Script, |p| {
            loop {
                p.bump_trivia();
                if p.at(SyntaxKind::FRONTMATTER_FENCE) {
                    p.bump();
                    break;
                }
                if p.at_end() {
                    log::debug!("frontmatter runs to end of input");
                    break;
                }
                let before = p.position();
                p.statement();
                if p.position() == before {
                    p.err_and_bump("unexpected token in frontmatter");
                }
            }
        })
    });
    p.in_frontmatter = false;

    m.complete(p, SyntaxKind::FRONTMATTER_SCRIPT);
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::SyntaxKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn frontmatter_wraps_statements() {
        let parse = parse("---\nconst a = 1;\nlet b = a\n---\n<p/>");
        assert!(parse.diagnostics().is_empty(), "{:?}", parse.diagnostics());
        let fm = parse.syntax().first_child().unwrap();
        assert_eq!(fm.kind(), SyntaxKind::FRONTMATTER_SCRIPT);
        assert_eq!(fm.text(), "---\nconst a = 1;\nlet b = a\n---");
        let kinds: Vec<_> = fm.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::VAR_DECL, SyntaxKind::VAR_DECL]);
    }

    #[test]
    fn unclosed_frontmatter_is_not_diagnosed() {
        let input = "---\nconst a = 1;\n";
        let parse = parse(input);
        assert!(parse.diagnostics().is_empty());
        let fm = parse.syntax().first_child().unwrap();
        assert_eq!(fm.kind(), SyntaxKind::FRONTMATTER_SCRIPT);
        assert_eq!(fm.text(), input);
    }

    #[test]
    fn top_level_await_is_allowed() {
        let parse = parse("---\nconst data = await fetch(url);\n---\n");
        assert!(parse.diagnostics().is_empty(), "{:?}", parse.diagnostics());
    }

    #[test]
    fn await_in_markup_expression_is_diagnosed() {
        let parse = parse("<p>{await x}</p>");
        let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["'await' is only allowed in frontmatter and async functions"]
        );
    }

    #[test]
    fn leading_blank_lines_before_fence() {
        let parse = parse("\n  \n---\nconst a = 1\n---\n");
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::FRONTMATTER_SCRIPT, SyntaxKind::XML_TEXT]);
    }

    #[test]
    fn fence_later_in_document_is_text() {
        let parse = parse("<hr>\n---\n");
        assert!(parse.diagnostics().is_empty());
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::HTML_TAG, SyntaxKind::XML_TEXT]);
    }

    #[test]
    fn markup_in_frontmatter_stops_at_fence() {
        let parse = parse("---\nconst a = <p>text\n---\n<div></div>");
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::FRONTMATTER_SCRIPT, SyntaxKind::XML_TEXT, SyntaxKind::HTML_TAG]
        );
        let fm = parse.syntax().first_child().unwrap();
        assert!(fm.text().to_string().ends_with("text\n---"));
    }

    #[test]
    fn unclosed_substitution_stops_at_fence() {
        let input = "---\nconst a = `${x y\n---\n<p>{z}</p>\n";
        let parse = parse(input);
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::FRONTMATTER_SCRIPT,
                SyntaxKind::XML_TEXT,
                SyntaxKind::HTML_TAG,
                SyntaxKind::XML_TEXT,
            ]
        );
        let fm = parse.syntax().first_child().unwrap();
        assert_eq!(fm.text(), "---\nconst a = `${x y\n---");

        let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["'}' expected", "unterminated template literal"]);
        assert_eq!(parse.syntax().text(), input);
    }

    #[test]
    fn unclosed_template_stops_at_fence() {
        let input = "---\nconst a = `abc\n---\n<p>{z}</p>";
        let parse = parse(input);
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::FRONTMATTER_SCRIPT, SyntaxKind::XML_TEXT, SyntaxKind::HTML_TAG]
        );
        let fm = parse.syntax().first_child().unwrap();
        assert_eq!(fm.text(), "---\nconst a = `abc\n---");

        let messages: Vec<_> = parse.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["unterminated template literal"]);
    }

    #[test]
    fn stray_token_in_frontmatter_recovers() {
        let parse = parse("---\n) const a = 1\n---\n");
        assert_eq!(parse.diagnostics().len(), 1);
        let fm = parse.syntax().first_child().unwrap();
        let kinds: Vec<_> = fm.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::ERROR, SyntaxKind::VAR_DECL]);
    }
}
