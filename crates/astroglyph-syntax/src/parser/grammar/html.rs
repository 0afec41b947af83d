//! HTML element tables: void elements and optional end tags.
//!
//! Lookups take the normalized (lower-case) tag name and only ever apply to
//! plain HTML tags; component tags are never void and always need a close.

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const OPTIONAL_END_ELEMENTS: &[&str] = &[
    "li", "p", "dt", "dd", "option", "optgroup", "tr", "td", "th", "thead", "tbody", "tfoot",
    "colgroup", "rp", "rt", "html", "head", "body",
];

/// Elements whose start tag implicitly closes an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub(crate) fn has_optional_end(name: &str) -> bool {
    OPTIONAL_END_ELEMENTS.contains(&name)
}

/// Whether a start tag `incoming` implicitly ends the open element `open`.
pub(crate) fn closes_implicitly(open: &str, incoming: &str) -> bool {
    match open {
        "li" => incoming == "li",
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        "p" => CLOSES_PARAGRAPH.contains(&incoming),
        "option" => matches!(incoming, "option" | "optgroup"),
        "optgroup" => incoming == "optgroup",
        "rp" | "rt" => matches!(incoming, "rp" | "rt"),
        "td" | "th" => matches!(incoming, "td" | "th" | "tr" | "tbody" | "tfoot"),
        "tr" => matches!(incoming, "tr" | "tbody" | "tfoot"),
        "thead" | "tbody" => matches!(incoming, "tbody" | "tfoot"),
        "colgroup" => matches!(incoming, "colgroup" | "thead" | "tbody" | "tfoot" | "tr"),
        "head" => incoming == "body",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("br", true)]
    #[case("img", true)]
    #[case("div", false)]
    #[case("Br", false)]
    fn void_elements(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_void(name), expected);
    }

    #[rstest]
    #[case("li", "li", true)]
    #[case("li", "ul", false)]
    #[case("p", "div", true)]
    #[case("p", "span", false)]
    #[case("td", "tr", true)]
    #[case("tr", "td", false)]
    #[case("head", "body", true)]
    #[case("div", "div", false)]
    fn implicit_closes(#[case] open: &str, #[case] incoming: &str, #[case] expected: bool) {
        assert_eq!(closes_implicitly(open, incoming), expected);
    }

    #[test]
    fn every_implicitly_closed_element_has_optional_end() {
        for open in ["li", "dt", "dd", "p", "option", "optgroup", "rp", "rt", "td", "th", "tr"] {
            assert!(has_optional_end(open), "{open}");
        }
    }
}
