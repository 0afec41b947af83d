//! Property-based tests for the parser.
//!
//! Arbitrary and adversarial inputs must always produce a tree that covers
//! the whole source, and well-formed markup must parse without diagnostics.

use astroglyph_syntax::{SyntaxKind, parse};
use proptest::prelude::*;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Fragments that exercise every lexical mode and recovery path.
fn arb_fragment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("<div>"),
        Just("</div>"),
        Just("<span "),
        Just("</Span>"),
        Just("<Card"),
        Just("<>"),
        Just("</>"),
        Just("/>"),
        Just(">"),
        Just("{"),
        Just("}"),
        Just("`"),
        Just("${"),
        Just("---\n"),
        Just("<!--"),
        Just("-->"),
        Just("=\""),
        Just("='"),
        Just("&amp;"),
        Just("("),
        Just(")"),
        Just("=>"),
        Just("<script>"),
        Just("</script>"),
        Just("<li>"),
        Just("<p>"),
        Just("await "),
        Just("a"),
        Just(" "),
        Just("\n"),
    ]
}

/// Tag soup built from [`arb_fragment`].
fn arb_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_fragment(), 0..40).prop_map(|parts| parts.concat())
}

/// Identifier that can never be a keyword
fn arb_ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_map(|s| format!("v_{s}"))
}

/// Balanced markup with text, expressions and void or self-closing leaves.
fn arb_markup() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z][a-z ]{0,10}",
        arb_ident().prop_map(|i| format!("{{{i}}}")),
        arb_ident().prop_map(|i| format!("{{`${{{i}}}`}}")),
        Just("<br>".to_string()),
        Just("<Icon name=\"x\" />".to_string()),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop_oneof![Just("div"), Just("span"), Just("section"), Just("Card")],
            arb_ident(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, attr, children)| {
                format!("<{tag} data-{attr}={{{attr}}}>{}</{tag}>", children.concat())
            })
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn tree_covers_arbitrary_input(input in ".{0,200}") {
        let parse = parse(&input);
        prop_assert_eq!(parse.syntax().text().to_string(), input);
    }

    #[test]
    fn tree_covers_tag_soup(input in arb_soup()) {
        let parse = parse(&input);
        prop_assert_eq!(parse.syntax().text().to_string(), input.as_str());

        for node in parse.syntax().descendants() {
            let range = node.text_range();
            let slice = &input[usize::from(range.start())..usize::from(range.end())];
            prop_assert_eq!(node.text().to_string(), slice);
        }
    }

    #[test]
    fn reparse_is_identical(input in arb_soup()) {
        prop_assert_eq!(parse(&input), parse(&input));
    }

    #[test]
    fn diagnostics_are_inside_the_document(input in arb_soup()) {
        let parse = parse(&input);
        for diagnostic in parse.diagnostics() {
            prop_assert!(usize::from(diagnostic.range.end()) <= input.len());
            prop_assert!(diagnostic.range.start() <= diagnostic.range.end());
        }
    }

    #[test]
    fn well_formed_markup_has_no_diagnostics(input in arb_markup()) {
        let parse = parse(&input);
        prop_assert!(parse.diagnostics().is_empty(), "{:?}: {:?}", input, parse.diagnostics());

        let tags = parse
            .syntax()
            .descendants()
            .filter(|n| n.kind().is_tag())
            .count();
        let opened = input.matches('<').count() - input.matches("</").count();
        prop_assert_eq!(tags, opened);
    }
}
