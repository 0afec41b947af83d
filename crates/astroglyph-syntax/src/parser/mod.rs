//! # Parser - Event-Based Tree Construction
//!
//! This module implements the core parsing logic, transforming source text
//! into a syntax tree using the **event-based** architecture from rust-analyzer.
//!
//! ## The Event Model
//!
//! Parsing produces a flat list of [`Event`]s (Start, Token, Finish). The
//! [`Sink`] replays them into a Rowan green tree.
//!
//! ## The Marker System
//!
//! When you call `parser.start()`, you get a [`Marker`]. This marker **must**
//! be consumed exactly once:
//!
//! - `marker.complete(p, KIND)` - the node spans everything consumed since `start()`
//! - `marker.complete_before(p, KIND, &later)` - the node ends where `later` begins
//! - `marker.error(p, message)` - an `ERROR` node plus a diagnostic over its span
//! - `marker.abandon(p)` - no node at all
//!
//! If you drop a marker without doing any of these, **the program panics**.
//!
//! ```ignore
//! let m = p.start();
//! p.bump();
//! m.complete(p, SyntaxKind::XML_TEXT);
//! ```
//!
//! ## Sharing the Cursor Between Grammars
//!
//! Markup rules and script rules drive the same [`Cursor`]. Each rule selects
//! the [`LexMode`] it needs before inspecting tokens; the script grammar itself
//! is injected as a [`ScriptGrammar`] trait object so hosts can substitute
//! their own.
//!
//! ## Public API
//!
//! ```
//! use astroglyph_syntax::parse;
//!
//! let parse = parse("---\nconst a = 1;\n---\n<p>{a}</p>\n");
//! assert!(parse.diagnostics().is_empty());
//! println!("{:#?}", parse.syntax());
//! ```

pub mod event;
pub mod sink;

mod grammar;

pub use grammar::script::{EcmaScript, ScriptGrammar};

use rowan::{GreenNode, TextRange};

use crate::cursor::Cursor;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::lexer::{LexMode, to_size};
use crate::options::ParseOptions;
use crate::stack::ensure_sufficient_stack;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use grammar::markup::StackItem;
use sink::Sink;

/// State of template-literal parsing.
///
/// Only changed through [`Parser::with_template_mode`], which restores the
/// previous value when the scope ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateMode {
    /// Whether a template literal may appear inside another template literal.
    pub nested_allowed: bool,
    /// Set while a template literal that forbids nesting is being parsed.
    pub top_level_in_progress: bool,
}

impl Default for TemplateMode {
    fn default() -> Self {
        Self {
            nested_allowed: true,
            top_level_in_progress: false,
        }
    }
}

/// Context flags understood by the script grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptContext {
    /// `await` is legal outside an `async` function.
    pub await_allowed: bool,
}

/// Deepest nesting of elements, expressions and statements that is parsed.
///
/// Counts recursive rules and tree levels added by operator, member and call
/// chains. Anything deeper is reported once and kept as an `ERROR` node, which
/// also bounds the depth of the finished tree.
pub const MAX_NESTING: usize = 512;

/// Returned when a host callback cancels parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("parsing was cancelled")]
pub struct Cancelled;

/// The parser state machine.
///
/// Holds the token cursor, the accumulated events and diagnostics, and the
/// markup stack. Grammar functions receive `&mut Parser` and use its methods to:
///
/// - Inspect tokens: `current()`, `nth()`, `at()`, `at_end()`
/// - Consume tokens: `bump()`, `eat()`
/// - Build structure: `start()` → `Marker` → `complete()`/`abandon()`
pub struct Parser<'g, 'i> {
    cursor: Cursor<'i>,
    events: Vec<Event>,
    diagnostics: Diagnostics,
    script: &'g dyn ScriptGrammar,
    options: &'g ParseOptions,
    template: TemplateMode,
    context: ScriptContext,
    pub(crate) stack: Vec<StackItem>,
    /// Inside the frontmatter block, where a fence ends all markup
    pub(crate) in_frontmatter: bool,
    /// Current nesting of recursive rules and chains, see [`MAX_NESTING`]
    depth: usize,
    cancel: Option<&'g dyn Fn() -> bool>,
    cancelled: bool,
}

impl<'g, 'i> Parser<'g, 'i> {
    /// Create a new parser over `source`.
    pub fn new(source: &'i str, options: &'g ParseOptions, script: &'g dyn ScriptGrammar) -> Self {
        Self {
            cursor: Cursor::new(source, LexMode::Text),
            events: Vec::new(),
            diagnostics: Diagnostics::new(to_size(source.len())),
            script,
            options,
            template: TemplateMode::default(),
            context: ScriptContext::default(),
            stack: Vec::new(),
            in_frontmatter: false,
            depth: 0,
            cancel: None,
            cancelled: false,
        }
    }

    /// Poll `cancel` once per markup dispatch step.
    pub fn with_cancel(mut self, cancel: &'g dyn Fn() -> bool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Parse the document and return the tree with its diagnostics.
    pub fn parse(mut self) -> Result<Parse, Cancelled> {
        log::trace!("parsing {} bytes", self.cursor.source_len());
        grammar::document(&mut self);
        if self.cancelled {
            log::debug!("parse cancelled at offset {}", self.cursor.offset());
            return Err(Cancelled);
        }
        assert!(self.stack.is_empty(), "markup stack not unwound");

        let tokens = self.cursor.into_tokens();
        let green = Sink::new(&tokens, self.events).finish();
        Ok(Parse {
            green,
            diagnostics: self.diagnostics.into_vec(),
        })
    }

    pub fn options(&self) -> &'g ParseOptions {
        self.options
    }

    /// The injected script grammar.
    pub fn script(&self) -> &'g dyn ScriptGrammar {
        self.script
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::placeholder());
        Marker {
            pos,
            token_pos: self.cursor.consumed_len(),
            completed: false,
        }
    }

    // === Token inspection ===

    /// Current token kind, or EOF if past end.
    pub fn current(&mut self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens in the current lexical mode.
    pub fn nth(&mut self, n: usize) -> SyntaxKind {
        if self.cancelled {
            return SyntaxKind::EOF;
        }
        self.cursor.nth(n)
    }

    /// Text of the token n positions ahead.
    pub fn nth_text(&mut self, n: usize) -> &'i str {
        self.cursor.nth_text(n)
    }

    /// Get the text of the current token.
    pub fn current_text(&mut self) -> &'i str {
        self.nth_text(0)
    }

    /// Range of the current token (empty at end of input).
    pub fn current_range(&mut self) -> TextRange {
        self.nth_range(0)
    }

    /// Range of the token n positions ahead.
    pub fn nth_range(&mut self, n: usize) -> TextRange {
        self.cursor.nth_range(n)
    }

    /// Check if at end of input.
    pub fn at_end(&self) -> bool {
        self.cancelled || self.cursor.at_end()
    }

    /// Check if current token is of given kind.
    pub fn at(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Check for an identifier with the given text.
    pub fn at_keyword(&mut self, keyword: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.current_text() == keyword
    }

    /// Source text from the current position to the end.
    pub fn rest(&self) -> &'i str {
        self.cursor.rest()
    }

    /// Byte offset just past the last consumed token.
    pub fn position(&self) -> usize {
        self.cursor.offset()
    }

    // === Consuming ===

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        let kind = self.current();
        self.bump_remap(kind);
    }

    /// Consume the current token, recording it as `kind`.
    pub fn bump_remap(&mut self, kind: SyntaxKind) {
        if self.at_end() {
            return;
        }
        if self.cursor.bump().is_some() {
            self.events.push(Event::token(kind));
        }
    }

    /// Consume source text up to `needle` as one token of `kind`.
    pub fn bump_until(&mut self, needle: &str, kind: SyntaxKind) {
        if !self.cancelled && self.cursor.bump_until(needle, kind) {
            self.events.push(Event::token(kind));
        }
    }

    // === Lexical mode ===

    pub fn mode(&self) -> LexMode {
        self.cursor.mode()
    }

    /// Switch the lexical mode, returning the previous one.
    pub fn set_mode(&mut self, mode: LexMode) -> LexMode {
        self.cursor.set_mode(mode)
    }

    // === Script trivia ===

    /// Kind of the n-th token that is not trivia.
    pub fn nth_non_trivia(&mut self, n: usize) -> SyntaxKind {
        let index = self.non_trivia_index(n);
        self.nth(index)
    }

    /// Text of the n-th token that is not trivia.
    pub fn nth_non_trivia_text(&mut self, n: usize) -> &'i str {
        let index = self.non_trivia_index(n);
        self.nth_text(index)
    }

    fn non_trivia_index(&mut self, n: usize) -> usize {
        let mut seen = 0;
        let mut i = 0;
        loop {
            let kind = self.nth(i);
            if !kind.is_trivia() {
                if seen == n || kind == SyntaxKind::EOF {
                    return i;
                }
                seen += 1;
            }
            i += 1;
        }
    }

    /// Range of the n-th token that is not trivia.
    pub fn nth_non_trivia_range(&mut self, n: usize) -> TextRange {
        let index = self.non_trivia_index(n);
        self.cursor.nth_range(index)
    }

    /// Whether the trivia before the next significant token contains a line break.
    pub fn newline_before_next(&mut self) -> bool {
        let mut i = 0;
        loop {
            match self.nth(i) {
                SyntaxKind::NEWLINE => return true,
                SyntaxKind::BLOCK_COMMENT if self.nth_text(i).contains('\n') => return true,
                kind if kind.is_trivia() => i += 1,
                _ => return false,
            }
        }
    }

    /// Consume whitespace, newlines and script comments.
    pub fn bump_trivia(&mut self) {
        while self.current().is_trivia() {
            self.bump();
        }
    }

    // === Diagnostics ===

    /// Report an error on the current token.
    pub fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.diagnostics.push(message, range);
    }

    /// Report an error on an explicit range.
    pub fn error_at(&mut self, range: TextRange, message: impl Into<String>) {
        self.diagnostics.push(message, range);
    }

    /// Wrap the current token in an `ERROR` node and report it.
    pub fn err_and_bump(&mut self, message: impl Into<String>) {
        let m = self.start();
        self.bump();
        m.error(self, message);
    }

    /// Range covering tokens consumed since `token_pos`.
    fn range_since(&self, token_pos: usize) -> TextRange {
        let end = to_size(self.cursor.offset());
        match self.cursor.consumed(token_pos) {
            Some(first) => TextRange::new(first.range.start(), end),
            None => TextRange::empty(end),
        }
    }

    // === Scoped state ===

    pub fn template_mode(&self) -> TemplateMode {
        self.template
    }

    /// Run `f` with the template-literal flags set to `mode`, restoring the
    /// previous flags afterwards.
    pub fn with_template_mode<R>(&mut self, mode: TemplateMode, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.template, mode);
        let result = f(self);
        self.template = saved;
        result
    }

    pub fn script_context(&self) -> ScriptContext {
        self.context
    }

    /// Run `f` with `context` active, restoring the previous context afterwards.
    pub fn with_script_context<R>(&mut self, context: ScriptContext, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.context, context);
        let result = f(self);
        self.context = saved;
        result
    }

    /// Run `f` in lexical mode `mode`, restoring the previous mode afterwards.
    pub fn with_mode<R>(&mut self, mode: LexMode, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.set_mode(mode);
        let result = f(self);
        self.set_mode(saved);
        result
    }

    // === Nesting ===

    /// Whether one more level of nesting would exceed [`MAX_NESTING`].
    pub fn nesting_exhausted(&self) -> bool {
        self.depth + self.stack.len() >= MAX_NESTING
    }

    /// Run a recursive rule one nesting level deeper.
    ///
    /// Returns `None` without running `rule` once the limit is reached; the
    /// caller reports the construct and skips it.
    pub fn nested<R>(&mut self, rule: impl FnOnce(&mut Self) -> R) -> Option<R> {
        if self.nesting_exhausted() {
            return None;
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| rule(self));
        self.depth -= 1;
        Some(result)
    }

    /// Count one tree level added by a loop, such as one link of a binary
    /// operator chain. Returns `false` once the limit is reached.
    ///
    /// The loop restores the depth it started from with [`Parser::restore_depth`].
    pub fn deepen(&mut self) -> bool {
        if self.nesting_exhausted() {
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn restore_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    // === Entry points shared with the script grammar ===

    /// Parse one expression with the injected script grammar.
    pub fn expression(&mut self) -> bool {
        let script = self.script;
        self.with_mode(LexMode::Script, |p| script.expression(p))
    }

    /// Parse one statement with the injected script grammar.
    pub fn statement(&mut self) -> bool {
        let script = self.script;
        self.with_mode(LexMode::Script, |p| script.statement(p))
    }

    /// Parse the template literal at the current backtick.
    ///
    /// Script grammars must route every backtick through here so that the
    /// nesting guard applies wherever a template literal appears.
    pub fn string_template(&mut self) -> bool {
        grammar::embedded::string_template(self)
    }

    /// Parse a markup element that appears inside an expression.
    ///
    /// Expects the cursor at `<`.
    pub fn markup_element(&mut self) -> Option<CompletedMarker> {
        let element = self.with_mode(LexMode::Text, grammar::markup::element_in_expression);
        self.set_mode(LexMode::Script);
        element
    }

    /// Check the host's cancellation callback.
    pub(crate) fn check_cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancel.is_some_and(|cancel| cancel()) {
            self.cancelled = true;
        }
        self.cancelled
    }
}

/// A marker for a node being constructed.
///
/// When you call `parser.start()`, a `Placeholder` event is pushed and you get
/// a `Marker` pointing to it.
///
/// ## The Must-Use Contract
///
/// The `#[must_use]` attribute and the `Drop` impl together enforce that every
/// marker is consumed exactly once. Dropping a live marker panics, which
/// catches leaked spans at runtime rather than producing corrupt trees.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    /// Number of tokens consumed when the marker was created
    token_pos: usize,
    /// Tracks whether the marker was consumed
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        self.set_start(p, kind);
        p.events.push(Event::Finish);
        self.handle()
    }

    /// Complete this marker so that the node ends exactly where `later` begins.
    ///
    /// `later` must have been started after `self` and still be open. The
    /// tokens between the two markers become the node's content; everything
    /// after belongs to `later` or its ancestors.
    pub fn complete_before(
        mut self,
        p: &mut Parser<'_, '_>,
        kind: SyntaxKind,
        later: &Marker,
    ) -> CompletedMarker {
        assert!(later.pos > self.pos, "complete_before needs a later marker");
        self.completed = true;
        self.set_start(p, kind);
        match &mut p.events[later.pos] {
            Event::Placeholder { finishes_before } => *finishes_before += 1,
            event => panic!("complete_before boundary is no longer open: {event:?}"),
        }
        self.handle()
    }

    /// Complete this marker as an `ERROR` node and report `message` over its span.
    pub fn error(self, p: &mut Parser<'_, '_>, message: impl Into<String>) -> CompletedMarker {
        let range = p.range_since(self.token_pos);
        p.error_at(range, message);
        self.complete(p, SyntaxKind::ERROR)
    }

    /// Abandon this marker without creating a node.
    ///
    /// The placeholder is removed if nothing was pushed after it; otherwise it
    /// stays inert in the event list.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1
            && matches!(p.events[self.pos], Event::Placeholder { finishes_before: 0 })
        {
            p.events.pop();
        }
    }

    /// Whether no token was consumed since the marker was started.
    pub fn is_empty(&self, p: &Parser<'_, '_>) -> bool {
        p.cursor.consumed_len() == self.token_pos
    }

    /// Range of the tokens consumed since the marker was started.
    pub fn range(&self, p: &Parser<'_, '_>) -> TextRange {
        p.range_since(self.token_pos)
    }

    /// Handle for the node this marker becomes, usable once the marker has
    /// been completed elsewhere.
    pub(crate) fn handle(&self) -> CompletedMarker {
        CompletedMarker {
            pos: self.pos,
            token_pos: self.token_pos,
        }
    }

    fn set_start(&self, p: &mut Parser<'_, '_>, kind: SyntaxKind) {
        let event_at_pos = &mut p.events[self.pos];
        let finishes_before = match event_at_pos {
            Event::Placeholder { finishes_before } => *finishes_before,
            event => panic!("marker already completed: {event:?}"),
        };
        *event_at_pos = Event::Start {
            kind,
            forward_parent: None,
            finishes_before,
        };
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A marker for a node that has been completed.
///
/// The only thing you can do with a `CompletedMarker` is call `precede()`
/// to wrap the completed node in a new parent, which is how binary and
/// postfix expressions are built after their left operand.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    /// Position of the Start event for this completed node
    pos: usize,
    /// Number of tokens consumed before the node started
    token_pos: usize,
}

impl CompletedMarker {
    /// Create a new parent node that will contain this node.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::placeholder());

        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(new_pos);
        }

        // The parent starts where the child started
        Marker {
            pos: new_pos,
            token_pos: self.token_pos,
            completed: false,
        }
    }

    /// Kind the node was completed with.
    pub fn kind(&self, p: &Parser<'_, '_>) -> SyntaxKind {
        match p.events[self.pos] {
            Event::Start { kind, .. } => kind,
            _ => SyntaxKind::ERROR,
        }
    }
}

/// The result of parsing one document.
///
/// The tree is always complete; problems are reported as diagnostics next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    green: GreenNode,
    diagnostics: Vec<Diagnostic>,
}

impl Parse {
    /// The root `ROOT` node.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse an Astro document with default options and the bundled script grammar.
pub fn parse(source: &str) -> Parse {
    parse_with(source, &ParseOptions::default(), &EcmaScript)
}

/// Parse with explicit options and script grammar.
pub fn parse_with(source: &str, options: &ParseOptions, script: &dyn ScriptGrammar) -> Parse {
    match Parser::new(source, options, script).parse() {
        Ok(parse) => parse,
        Err(Cancelled) => unreachable!("no cancellation callback installed"),
    }
}

/// Parse, polling `cancel` once per markup dispatch step.
pub fn parse_with_cancel(
    source: &str,
    options: &ParseOptions,
    script: &dyn ScriptGrammar,
    cancel: &dyn Fn() -> bool,
) -> Result<Parse, Cancelled> {
    Parser::new(source, options, script).with_cancel(cancel).parse()
}
