//! Shared parser state: token lookahead over one reader, tree frames and
//! span annotation

use rowan::{GreenNode, NodeOrToken};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::config::RazorParserOptions;
use crate::cst::{
    AnnotationTable, ChunkGenerator, GreenElement, SpanContext, SyntaxAnnotation, SyntaxKind,
    green_node, green_span,
};
use crate::diagnostics::RazorDiagnostic;
use crate::edit::{AcceptedCharacters, EditHandler};
use crate::lexer::{CSharpTokenizer, HtmlTokenizer, SpanTokenizer, Token, Tokenizer, TokenizerState};
use crate::source::{SourceDocument, SourceReader, SourceSpan};

pub(crate) struct ParserContext<'a> {
    pub(crate) source: &'a SourceDocument,
    pub(crate) options: Arc<RazorParserOptions>,
    reader: SourceReader<'a>,
    html: HtmlTokenizer,
    csharp: CSharpTokenizer,
    mode: SpanTokenizer,
    /// Tokens lexed in the current mode but not consumed, with their offsets
    lookahead: VecDeque<(usize, Token<'a>)>,
    /// Consumed tokens waiting to become a span
    pending: Vec<Token<'a>>,
    /// Offset just past the last consumed token
    position: usize,
    frames: Vec<(SyntaxKind, Vec<GreenElement>)>,
    root: Option<GreenNode>,
    pub(crate) annotations: AnnotationTable,
    pub(crate) diagnostics: Vec<RazorDiagnostic>,
    /// Names of elements whose end tag may close the current body
    pub(crate) open_elements: Vec<String>,
    /// Unmatched `{` count inside a `@section` body
    pub(crate) section_braces: Option<usize>,
    /// Every element must be closed (markup inside code, component files)
    pub(crate) strict_elements: bool,
    pub(crate) seen_directives: HashSet<String>,
}

impl<'a> ParserContext<'a> {
    pub(crate) fn new(source: &'a SourceDocument, options: Arc<RazorParserOptions>) -> Self {
        let strict_elements = options.file_kind.is_component();
        Self {
            source,
            options,
            reader: SourceReader::new(source),
            html: HtmlTokenizer::new(),
            csharp: CSharpTokenizer::new(),
            mode: SpanTokenizer::Markup,
            lookahead: VecDeque::new(),
            pending: Vec::new(),
            position: 0,
            frames: Vec::new(),
            root: None,
            annotations: AnnotationTable::new(),
            diagnostics: Vec::new(),
            open_elements: Vec::new(),
            section_braces: None,
            strict_elements,
            seen_directives: HashSet::new(),
        }
    }

    pub(crate) fn mode(&self) -> SpanTokenizer {
        self.mode
    }

    /// Switch grammars; unconsumed lookahead is discarded and re-lexed
    pub(crate) fn set_mode(&mut self, mode: SpanTokenizer) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.rewind();
    }

    pub(crate) fn set_split_braces(&mut self, split: bool) {
        self.html.set_split_braces(split);
        if self.mode == SpanTokenizer::Markup {
            self.rewind();
        }
    }

    fn rewind(&mut self) {
        self.lookahead.clear();
        self.reader.set_position(self.position);
        self.html.set_state(TokenizerState::Data);
        self.csharp.set_state(TokenizerState::Data);
    }

    fn fill(&mut self, n: usize) {
        while self.lookahead.len() <= n {
            let start = self.reader.position();
            let token = match self.mode {
                SpanTokenizer::Markup => self.html.next_token(&mut self.reader),
                SpanTokenizer::CSharp => self.csharp.next_token(&mut self.reader),
            };
            match token {
                Some(token) => self.lookahead.push_back((start, token)),
                None => break,
            }
        }
    }

    pub(crate) fn peek(&mut self, n: usize) -> Option<&Token<'a>> {
        self.fill(n);
        self.lookahead.get(n).map(|(_, token)| token)
    }

    pub(crate) fn peek_kind(&mut self, n: usize) -> Option<SyntaxKind> {
        self.peek(n).map(|token| token.kind)
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    /// Next token is `kind` with exactly `text`
    pub(crate) fn at_text(&mut self, n: usize, kind: SyntaxKind, text: &str) -> bool {
        self.peek(n).is_some_and(|token| token.is(kind, text))
    }

    pub(crate) fn at_end(&mut self) -> bool {
        self.peek(0).is_none()
    }

    /// Number of whitespace and newline tokens starting at lookahead `n`
    pub(crate) fn trivia_run(&mut self, n: usize) -> usize {
        let mut count = 0;
        while self.peek_kind(n + count).is_some_and(SyntaxKind::is_trivia) {
            count += 1;
        }
        count
    }

    /// Consume the next token into the pending span
    pub(crate) fn bump(&mut self) {
        self.fill(0);
        if let Some((start, mut token)) = self.lookahead.pop_front() {
            self.position = start + token.len();
            self.diagnostics.append(&mut token.diagnostics);
            self.pending.push(token);
        }
    }

    pub(crate) fn bump_n(&mut self, count: usize) {
        for _ in 0..count {
            self.bump();
        }
    }

    /// Offset just past the consumed input
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Start offset of lookahead token `n`, or the end of input
    pub(crate) fn peek_position(&mut self, n: usize) -> usize {
        self.fill(n);
        self.lookahead
            .get(n)
            .map_or(self.source.len(), |(start, _)| *start)
    }

    pub(crate) fn peek_len(&mut self, n: usize) -> usize {
        self.peek(n).map_or(0, Token::len)
    }

    pub(crate) fn peek_text(&mut self, n: usize) -> Option<String> {
        self.peek(n).map(|token| token.text().to_string())
    }

    /// `@` between two alphanumerics reads as an e-mail address
    pub(crate) fn is_email_transition(&self, at: usize) -> bool {
        self.char_before(at).is_some_and(char::is_alphanumeric)
            && self.char_at(at + 1).is_some_and(char::is_alphanumeric)
    }

    /// Source text between two offsets
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.text().get(start..end).unwrap_or_default()
    }

    pub(crate) fn char_at(&self, offset: usize) -> Option<char> {
        self.source.text().get(offset..)?.chars().next()
    }

    pub(crate) fn char_before(&self, offset: usize) -> Option<char> {
        self.source.text().get(..offset)?.chars().next_back()
    }

    pub(crate) fn source_span(&self, start: usize, length: usize) -> SourceSpan {
        self.source.span(start, length)
    }

    pub(crate) fn error(&mut self, diagnostic: RazorDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        debug_assert!(
            self.pending.is_empty(),
            "pending tokens must become a span before opening {kind}"
        );
        self.frames.push((kind, Vec::new()));
    }

    pub(crate) fn finish_node(&mut self) -> Option<GreenNode> {
        let (kind, children) = self.frames.pop()?;
        let node = green_node(kind, children);
        self.push_child(node.clone());
        Some(node)
    }

    fn push_child(&mut self, node: GreenNode) {
        match self.frames.last_mut() {
            Some((_, children)) => children.push(NodeOrToken::Node(node)),
            None => self.root = Some(node),
        }
    }

    /// Turn pending tokens into a span; nothing is emitted when none are
    /// pending
    pub(crate) fn span(&mut self, kind: SyntaxKind, context: SpanContext) -> Option<GreenNode> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.span_always(kind, context))
    }

    /// Like [`span`](Self::span) but emits an empty span when nothing is
    /// pending
    pub(crate) fn span_always(&mut self, kind: SyntaxKind, context: SpanContext) -> GreenNode {
        let node = green_span(kind, self.pending.drain(..));
        self.annotations
            .set_annotation(&node, SyntaxAnnotation::span_context(Arc::new(context)));
        self.push_child(node.clone());
        node
    }

    pub(crate) fn set_span_context(&mut self, span: &GreenNode, context: SpanContext) {
        self.annotations
            .set_annotation(span, SyntaxAnnotation::span_context(Arc::new(context)));
    }

    pub(crate) fn markup_span(&mut self) -> Option<GreenNode> {
        self.span(SyntaxKind::MarkupTextLiteral, markup_context())
    }

    pub(crate) fn statement_span(&mut self) -> Option<GreenNode> {
        self.span(SyntaxKind::CSharpStatementLiteral, statement_context())
    }

    /// Close every open frame and hand back the tree parts
    pub(crate) fn finish(mut self) -> (GreenNode, AnnotationTable, Vec<RazorDiagnostic>) {
        self.markup_span();
        while !self.frames.is_empty() {
            self.finish_node();
        }
        let root = self
            .root
            .unwrap_or_else(|| green_node(SyntaxKind::RazorDocument, Vec::new()));
        (root, self.annotations, self.diagnostics)
    }
}

pub(crate) fn markup_context() -> SpanContext {
    SpanContext::new(
        ChunkGenerator::Markup,
        EditHandler::plain(SpanTokenizer::Markup, AcceptedCharacters::Any),
    )
}

pub(crate) fn statement_context() -> SpanContext {
    SpanContext::new(
        ChunkGenerator::Statement,
        EditHandler::code_block(SpanTokenizer::CSharp, AcceptedCharacters::Any),
    )
}

/// Razor punctuation that generates nothing
pub(crate) fn none_context(tokenizer: SpanTokenizer, accepted: AcceptedCharacters) -> SpanContext {
    SpanContext::new(ChunkGenerator::None, EditHandler::plain(tokenizer, accepted))
}

pub(crate) fn transition_context() -> SpanContext {
    none_context(SpanTokenizer::CSharp, AcceptedCharacters::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch_relexes_lookahead() {
        let source = SourceDocument::new("a.b <p>", None);
        let mut context = ParserContext::new(&source, Arc::new(RazorParserOptions::default()));
        context.set_mode(SpanTokenizer::CSharp);
        assert_eq!(context.peek_kind(0), Some(SyntaxKind::Identifier));
        assert_eq!(context.peek_kind(1), Some(SyntaxKind::Dot));
        context.bump();
        context.set_mode(SpanTokenizer::Markup);
        // ".b" is markup text now
        assert_eq!(context.peek_kind(0), Some(SyntaxKind::Text));
        assert_eq!(context.peek(0).map(|t| t.text().to_string()).as_deref(), Some(".b"));
        assert_eq!(context.position(), 1);
    }

    #[test]
    fn test_span_drains_pending_and_annotates() {
        let source = SourceDocument::new("hi there", None);
        let mut context = ParserContext::new(&source, Arc::new(RazorParserOptions::default()));
        context.start_node(SyntaxKind::MarkupBlock);
        context.bump_n(3);
        let span = context.markup_span().unwrap();
        assert!(context.pending.is_empty());
        assert!(context.annotations.span_context_of(&span).is_some());
        assert!(context.markup_span().is_none());
        let (root, _, _) = context.finish();
        assert_eq!(root.to_string(), "hi there");
    }

    #[test]
    fn test_trivia_run() {
        let source = SourceDocument::new("  \n x", None);
        let mut context = ParserContext::new(&source, Arc::new(RazorParserOptions::default()));
        assert_eq!(context.trivia_run(0), 3);
    }
}
