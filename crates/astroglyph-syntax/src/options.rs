//! Parser options.

use serde::{Deserialize, Serialize};

/// Knobs that change how a document is parsed.
///
/// All fields have defaults so a partial `[parser]` table in a config file
/// deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Recognise a leading `---` block as frontmatter script.
    pub frontmatter: bool,
    /// Let `</>` close whatever element is currently open.
    pub empty_closing_tag_matches_any: bool,
    /// HTML elements whose content is raw text up to their closing tag.
    pub raw_text_elements: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            frontmatter: true,
            empty_closing_tag_matches_any: true,
            raw_text_elements: vec!["script".to_string(), "style".to_string()],
        }
    }
}

impl ParseOptions {
    pub(crate) fn is_raw_text_element(&self, normalized_name: &str) -> bool {
        self.raw_text_elements
            .iter()
            .any(|name| name.eq_ignore_ascii_case(normalized_name))
    }
}
