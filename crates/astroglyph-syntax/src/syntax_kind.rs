//! SyntaxKind enum for all tokens and nodes in the Astro CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Tokens from every lexical mode (markup text, tag headers, script, template
//! literals) live side by side. Every byte in the source must appear as a token
//! in the tree.

/// All syntax kinds for the Astro CST.
///
/// This enum represents both tokens (lexer output) and composite nodes (parser output).
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Shared tokens ===
    /// Horizontal whitespace (spaces, tabs)
    WHITESPACE,
    /// Line ending
    NEWLINE,
    /// `---` frontmatter fence
    FRONTMATTER_FENCE,
    /// `{`
    L_CURLY,
    /// `}`
    R_CURLY,
    /// `` ` ``
    BACKTICK,
    /// `<`
    LT,
    /// `>`
    GT,
    /// `/`
    SLASH,
    /// `=`
    EQ,

    // === Markup tokens ===
    /// Plain markup text
    TEXT,
    /// `</`
    LT_SLASH,
    /// `/>`
    SLASH_GT,
    /// Tag or attribute name inside a tag header
    NAME,
    /// Quoted or unquoted attribute value
    ATTR_VALUE,
    /// `&amp;`
    ENTITY_REF,
    /// `&#123;` or `&#x7b;`
    CHAR_REF,
    /// `<!-- ... -->`
    COMMENT,
    /// `<!DOCTYPE html>`
    DOCTYPE,
    /// Content of a raw text element such as `<script>` or `<style>`
    RAW_TEXT,

    // === Template literal tokens ===
    /// Literal text between backticks
    TEMPLATE_CHUNK,
    /// `${`
    DOLLAR_L_CURLY,

    // === Script tokens ===
    /// Identifier or keyword
    IDENT,
    /// Numeric literal
    NUMBER,
    /// Single or double quoted string literal
    STRING,
    /// `// ...`
    LINE_COMMENT,
    /// `/* ... */`
    BLOCK_COMMENT,
    /// `(`
    L_PAREN,
    /// `)`
    R_PAREN,
    /// `[`
    L_BRACK,
    /// `]`
    R_BRACK,
    /// `,`
    COMMA,
    /// `;`
    SEMICOLON,
    /// `:`
    COLON,
    /// `.`
    DOT,
    /// `...`
    DOT3,
    /// `?`
    QUESTION,
    /// `?.`
    QUESTION_DOT,
    /// `??`
    QUESTION2,
    /// `!`
    BANG,
    /// `==`
    EQ2,
    /// `===`
    EQ3,
    /// `!=`
    NEQ,
    /// `!==`
    NEQ2,
    /// `<=`
    LTEQ,
    /// `>=`
    GTEQ,
    /// `+`
    PLUS,
    /// `-`
    MINUS,
    /// `*`
    STAR,
    /// `**`
    STAR2,
    /// `%`
    PERCENT,
    /// `&`
    AMP,
    /// `&&`
    AMP2,
    /// `|`
    PIPE,
    /// `||`
    PIPE2,
    /// `^`
    CARET,
    /// `~`
    TILDE,
    /// `=>`
    FAT_ARROW,
    /// `++`
    PLUS2,
    /// `--`
    MINUS2,
    /// Compound assignment such as `+=` or `??=`
    ASSIGN_OP,
    /// Unrecognised character
    UNKNOWN,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root document node
    ROOT,
    /// `--- ... ---` script block at the start of the document
    FRONTMATTER_SCRIPT,
    /// Plain HTML element
    HTML_TAG,
    /// Component element (capitalised or dotted name, or a fragment)
    COMPONENT_TAG,
    /// Attribute inside a tag header
    XML_ATTRIBUTE,
    /// `{ ... }` embedded in markup
    EMBEDDED_EXPRESSION,
    /// Run of text, whitespace and references between markup constructs
    XML_TEXT,

    // === Script nodes ===
    /// `true`, `false`, `null`, numbers and strings
    LITERAL,
    /// Identifier used as an expression
    NAME_REF,
    /// `` `...${expr}...` ``
    TEMPLATE_LITERAL,
    /// `${expr}` inside a template literal
    TEMPLATE_SUBSTITUTION,
    /// `tag`...``
    TAGGED_TEMPLATE,
    /// `[a, b]`
    ARRAY_EXPR,
    /// `{ a: 1 }`
    OBJECT_EXPR,
    /// Member of an object literal
    PROPERTY,
    /// `...expr`
    SPREAD_ELEMENT,
    /// `(expr)`
    PAREN_EXPR,
    /// `a.b` or `a?.b`
    MEMBER_EXPR,
    /// `a[b]`
    INDEX_EXPR,
    /// `f(a)`
    CALL_EXPR,
    /// `(a, b)` arguments of a call
    ARG_LIST,
    /// `new Foo()`
    NEW_EXPR,
    /// `!a`, `-a`, `typeof a`
    PREFIX_EXPR,
    /// `a++`, `a!`
    POSTFIX_EXPR,
    /// `a + b`
    BIN_EXPR,
    /// `a ? b : c`
    COND_EXPR,
    /// `a = b`
    ASSIGN_EXPR,
    /// `a as T`
    AS_EXPR,
    /// `await a`
    AWAIT_EXPR,
    /// `(a) => b`
    ARROW_FN,
    /// `function (a) {}`
    FUNCTION_EXPR,
    /// Parameter list of a function or arrow function
    PARAM_LIST,
    /// Single parameter
    PARAM,
    /// TypeScript type annotation (`: T`)
    TYPE_ANNOTATION,
    /// TypeScript type
    TYPE,

    // === Statement nodes ===
    /// `import ... from "..."`
    IMPORT_DECL,
    /// `export ...`
    EXPORT_DECL,
    /// `const a = 1`
    VAR_DECL,
    /// Single binding inside a variable declaration
    VAR_DECLARATOR,
    /// `function f() {}`
    FUNCTION_DECL,
    /// `interface` or `type` declaration
    TYPE_DECL,
    /// `if (...) ... else ...`
    IF_STMT,
    /// `for (...) ...`
    FOR_STMT,
    /// `while (...) ...` and `do ... while (...)`
    WHILE_STMT,
    /// `switch (...) { ... }`
    SWITCH_STMT,
    /// `case ...:` or `default:` with its statements
    SWITCH_CASE,
    /// `return ...`
    RETURN_STMT,
    /// `throw ...`
    THROW_STMT,
    /// `try {} catch {} finally {}`
    TRY_STMT,
    /// `break` or `continue`
    JUMP_STMT,
    /// `{ ... }`
    BLOCK_STMT,
    /// Expression followed by an optional `;`
    EXPR_STMT,
    /// `;`
    EMPTY_STMT,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia in script code.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::NEWLINE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Returns true for the two element node kinds.
    pub fn is_tag(self) -> bool {
        matches!(self, Self::HTML_TAG | Self::COMPONENT_TAG)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AstroLang {}

impl rowan::Language for AstroLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<AstroLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<AstroLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<AstroLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_kinds_are_tokens() {
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::TEMPLATE_CHUNK.is_token());
        assert!(SyntaxKind::EOF.is_token());
    }

    #[test]
    fn node_kinds_are_nodes() {
        assert!(SyntaxKind::ROOT.is_node());
        assert!(SyntaxKind::EMBEDDED_EXPRESSION.is_node());
        assert!(SyntaxKind::ERROR.is_node());
    }

    #[test]
    fn trivia_detection() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::BLOCK_COMMENT.is_trivia());
        assert!(!SyntaxKind::TEXT.is_trivia());
        assert!(!SyntaxKind::COMMENT.is_trivia());
    }

    #[test]
    fn rowan_conversion_roundtrip() {
        let kind = SyntaxKind::COMPONENT_TAG;
        let raw: rowan::SyntaxKind = kind.into();
        let back = AstroLang::kind_from_raw(raw);
        assert_eq!(kind, back);
    }
}
