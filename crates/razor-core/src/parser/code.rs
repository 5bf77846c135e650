//! Code grammar: `@` transitions, expressions, statement blocks, keyword
//! blocks, directives and Razor comments

use std::sync::Arc;

use super::context::{ParserContext, none_context, transition_context};
use super::directives::{
    ADD_TAG_HELPER, DirectiveDescriptor, DirectiveKind, DirectiveTokenDescriptor,
    DirectiveTokenKind, DirectiveUsage, REMOVE_TAG_HELPER,
};
use super::markup::MarkupStop;
use crate::cst::{ChunkGenerator, SpanContext, SyntaxKind};
use crate::diagnostics::{RazorDiagnostic, factory};
use crate::edit::{AcceptedCharacters, EditHandler};
use crate::lexer::SpanTokenizer;
use crate::source::SourceSpan;

/// Keywords that open a statement with a block body
const BLOCK_KEYWORDS: &[&str] = &[
    "if", "for", "foreach", "while", "do", "switch", "lock", "try", "using",
];

/// What follows an `@`
enum CodeConstruct {
    Statement,
    Explicit,
    Directive(Arc<DirectiveDescriptor>),
    Using,
    Keyword(String),
    Implicit,
    Invalid(RazorDiagnostic),
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn expression_context(accepted: AcceptedCharacters) -> SpanContext {
    SpanContext::new(
        ChunkGenerator::Expression,
        EditHandler::plain(SpanTokenizer::CSharp, accepted),
    )
}

fn meta_context() -> SpanContext {
    none_context(SpanTokenizer::CSharp, AcceptedCharacters::None)
}

fn directive_whitespace_context() -> SpanContext {
    none_context(SpanTokenizer::CSharp, AcceptedCharacters::Whitespace)
}

/// Context of an opening brace; an unterminated block asks the editor to
/// insert the closing one
fn open_brace_context(terminated: bool, at_end_of_span_only: bool) -> SpanContext {
    SpanContext::new(
        ChunkGenerator::None,
        EditHandler::auto_complete(
            SpanTokenizer::CSharp,
            AcceptedCharacters::Any,
            at_end_of_span_only,
            (!terminated).then(|| "}".to_string()),
        ),
    )
}

/// `type, assembly` halves of tag helper lookup text
pub(crate) fn split_lookup_text(text: &str) -> Option<(String, String)> {
    let (type_pattern, assembly) = text.split_once(',')?;
    let (type_pattern, assembly) = (type_pattern.trim(), assembly.trim());
    if type_pattern.is_empty() || assembly.is_empty() {
        return None;
    }
    Some((type_pattern.to_string(), assembly.to_string()))
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

impl ParserContext<'_> {
    /// Parse the construct introduced by the `@` at the next token, from
    /// either mode; the previous mode is restored afterwards
    pub(crate) fn parse_code_transition(&mut self) {
        let outer_mode = self.mode();
        let open_elements = std::mem::take(&mut self.open_elements);
        let section_braces = self.section_braces.take();

        let at = self.peek_position(0);
        let construct = self.classify(at);
        self.start_node(SyntaxKind::CSharpCodeBlock);
        match construct {
            CodeConstruct::Statement => self.parse_statement_block(),
            CodeConstruct::Explicit => self.parse_explicit_expression(),
            CodeConstruct::Directive(descriptor) => self.parse_directive(&descriptor),
            CodeConstruct::Using => self.parse_using(),
            CodeConstruct::Keyword(keyword) => self.parse_keyword_block(&keyword),
            CodeConstruct::Implicit => self.parse_implicit_expression(true),
            CodeConstruct::Invalid(diagnostic) => {
                self.error(diagnostic);
                self.parse_implicit_expression(false);
            }
        }
        self.finish_node();

        self.set_mode(outer_mode);
        self.open_elements = open_elements;
        self.section_braces = section_braces;
    }

    fn classify(&self, at: usize) -> CodeConstruct {
        let next = at + 1;
        match self.char_at(next) {
            Some('{') => CodeConstruct::Statement,
            Some('(') => CodeConstruct::Explicit,
            Some(c) if is_identifier_start(c) => {
                let word = self.identifier_at(next);
                if let Some(descriptor) = self.options.directive(word) {
                    return CodeConstruct::Directive(descriptor.clone());
                }
                if word == "using" {
                    let rest = self.slice(next + word.len(), self.source.len());
                    if !rest.trim_start().starts_with('(') {
                        return CodeConstruct::Using;
                    }
                }
                if BLOCK_KEYWORDS.contains(&word) {
                    return CodeConstruct::Keyword(word.to_string());
                }
                CodeConstruct::Implicit
            }
            Some(c) if c.is_whitespace() => CodeConstruct::Invalid(
                factory::unexpected_whitespace_at_start_of_code_block(
                    self.source_span(next, c.len_utf8()),
                ),
            ),
            Some(c) => CodeConstruct::Invalid(factory::unexpected_character_at_start_of_code_block(
                self.source_span(next, c.len_utf8()),
                &c.to_string(),
            )),
            None => CodeConstruct::Invalid(factory::unexpected_end_of_file_at_start_of_code_block(
                self.source_span(next.min(self.source.len()), 0),
            )),
        }
    }

    fn identifier_at(&self, offset: usize) -> &str {
        let rest = self.slice(offset, self.source.len());
        let end = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(rest.len(), |(index, _)| index);
        &rest[..end]
    }

    /// Consume the `@` as a transition span and switch to code
    fn transition(&mut self) {
        self.bump();
        self.span(SyntaxKind::CSharpTransition, transition_context());
        self.set_mode(SpanTokenizer::CSharp);
    }

    fn parse_implicit_expression(&mut self, has_identifier: bool) {
        self.start_node(SyntaxKind::CSharpImplicitExpression);
        self.transition();
        self.start_node(SyntaxKind::CSharpImplicitExpressionBody);
        if has_identifier {
            self.bump_implicit_expression();
        }
        self.span_always(
            SyntaxKind::CSharpExpressionLiteral,
            expression_context(AcceptedCharacters::NonWhitespace),
        );
        self.finish_node();
        self.finish_node();
    }

    /// Identifier followed by member access, calls, indexers and
    /// null-conditional access
    fn bump_implicit_expression(&mut self) {
        let awaits = self
            .peek(0)
            .is_some_and(|token| token.text() == "await");
        self.bump();
        if awaits
            && self.at(SyntaxKind::Whitespace)
            && matches!(
                self.peek_kind(1),
                Some(SyntaxKind::Identifier | SyntaxKind::Keyword)
            )
        {
            self.bump_n(2);
        }
        let null_forgiving = self.options.feature_flags.allow_null_forgiving_operator;
        loop {
            match self.peek_kind(0) {
                Some(SyntaxKind::Dot) if self.at_identifier(1) => self.bump_n(2),
                Some(SyntaxKind::LeftParenthesis) => {
                    let open = self.peek_position(0);
                    if !self.bump_balanced(SyntaxKind::LeftParenthesis, SyntaxKind::RightParenthesis) {
                        let span = self.source_span(open, 1);
                        self.error(factory::expected_close_parenthesis(span));
                    }
                }
                Some(SyntaxKind::LeftBracket) => {
                    self.bump_balanced(SyntaxKind::LeftBracket, SyntaxKind::RightBracket);
                }
                Some(SyntaxKind::CSharpOperator) if self.at_text(0, SyntaxKind::CSharpOperator, "?") => {
                    match self.peek_kind(1) {
                        Some(SyntaxKind::Dot) if self.at_identifier(2) => self.bump_n(3),
                        Some(SyntaxKind::LeftBracket) => {
                            self.bump();
                            self.bump_balanced(SyntaxKind::LeftBracket, SyntaxKind::RightBracket);
                        }
                        _ => break,
                    }
                }
                Some(SyntaxKind::CSharpOperator)
                    if null_forgiving
                        && self.at_text(0, SyntaxKind::CSharpOperator, "!")
                        && matches!(
                            self.peek_kind(1),
                            Some(SyntaxKind::Dot | SyntaxKind::LeftBracket | SyntaxKind::LeftParenthesis)
                        ) =>
                {
                    self.bump()
                }
                _ => break,
            }
        }
    }

    fn at_identifier(&mut self, n: usize) -> bool {
        matches!(
            self.peek_kind(n),
            Some(SyntaxKind::Identifier | SyntaxKind::Keyword)
        )
    }

    /// Consume from an `open` token through its matching `close`; false
    /// when the input ends first
    fn bump_balanced(&mut self, open: SyntaxKind, close: SyntaxKind) -> bool {
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind(0) {
            self.bump();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return true;
                }
            }
        }
        false
    }

    fn parse_explicit_expression(&mut self) {
        self.start_node(SyntaxKind::CSharpExplicitExpression);
        self.transition();
        self.start_node(SyntaxKind::CSharpExplicitExpressionBody);
        let open = self.peek_position(0);
        self.bump();
        self.span(SyntaxKind::RazorMetaCode, meta_context());

        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind(0) {
            match kind {
                SyntaxKind::LeftParenthesis => depth += 1,
                SyntaxKind::RightParenthesis if depth == 0 => break,
                SyntaxKind::RightParenthesis => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        self.span_always(
            SyntaxKind::CSharpExpressionLiteral,
            expression_context(AcceptedCharacters::Any),
        );

        if self.at(SyntaxKind::RightParenthesis) {
            self.bump();
            self.span(SyntaxKind::RazorMetaCode, meta_context());
        } else {
            let span = self.source_span(open, 1);
            self.error(factory::expected_close_parenthesis(span));
        }
        self.finish_node();
        self.finish_node();
    }

    fn parse_statement_block(&mut self) {
        self.start_node(SyntaxKind::CSharpStatement);
        self.transition();
        self.start_node(SyntaxKind::CSharpStatementBody);
        let open = self.peek_position(0);
        self.bump();
        let brace = self.span_always(SyntaxKind::RazorMetaCode, meta_context());

        self.start_node(SyntaxKind::CSharpCodeBlock);
        self.parse_code_body();
        self.finish_node();

        let terminated = self.at(SyntaxKind::RightBrace);
        self.set_span_context(&brace, open_brace_context(terminated, true));
        if terminated {
            self.bump();
            self.span(SyntaxKind::RazorMetaCode, meta_context());
        } else {
            let span = self.source_span(open, 1);
            self.error(factory::expected_end_of_block_before_eof(span, "code", '}', '{'));
        }
        self.finish_node();
        self.finish_node();
    }

    /// Statements up to the `}` that closes the enclosing block, switching to
    /// markup where a tag starts a statement
    pub(crate) fn parse_code_body(&mut self) {
        let mut depth = 0usize;
        let mut statement_start = true;
        while let Some(kind) = self.peek_kind(0) {
            match kind {
                SyntaxKind::LeftBrace => {
                    depth += 1;
                    self.bump();
                    statement_start = true;
                }
                SyntaxKind::RightBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.bump();
                    statement_start = true;
                }
                SyntaxKind::Semicolon | SyntaxKind::Colon => {
                    self.bump();
                    statement_start = true;
                }
                SyntaxKind::Whitespace | SyntaxKind::NewLine | SyntaxKind::CSharpComment => {
                    self.bump()
                }
                SyntaxKind::RazorCommentTransition => {
                    self.statement_span();
                    self.parse_razor_comment();
                }
                SyntaxKind::Transition => {
                    self.statement_span();
                    self.parse_transition_in_code();
                    statement_start = true;
                }
                SyntaxKind::CSharpOperator if statement_start && self.at_markup_start() => {
                    self.statement_span();
                    self.parse_markup_in_code();
                    statement_start = true;
                }
                _ => {
                    self.bump();
                    statement_start = false;
                }
            }
        }
        self.statement_span();
    }

    /// `<` followed by a tag name, `/` or `!`
    fn at_markup_start(&mut self) -> bool {
        if !self.at_text(0, SyntaxKind::CSharpOperator, "<") {
            return false;
        }
        let at = self.peek_position(0);
        self.char_at(at + 1)
            .is_some_and(|c| c.is_alphabetic() || c == '/' || c == '!')
    }

    fn parse_transition_in_code(&mut self) {
        let at = self.peek_position(0);
        if self.char_at(at + 1) == Some(':') {
            self.parse_markup_line();
        } else {
            self.parse_code_transition();
        }
    }

    /// `@:` writes the rest of the line as markup
    fn parse_markup_line(&mut self) {
        self.start_node(SyntaxKind::MarkupBlock);
        self.bump();
        self.span(
            SyntaxKind::MarkupTransition,
            none_context(SpanTokenizer::Markup, AcceptedCharacters::None),
        );
        self.bump();
        self.span(SyntaxKind::RazorMetaCode, meta_context());
        self.set_mode(SpanTokenizer::Markup);
        self.parse_markup_nodes(MarkupStop::LineEnd);
        self.set_mode(SpanTokenizer::CSharp);
        self.finish_node();
    }

    /// One markup element inside code, plus the rest of its line when that
    /// is only whitespace
    fn parse_markup_in_code(&mut self) {
        self.set_mode(SpanTokenizer::Markup);
        let strict = std::mem::replace(&mut self.strict_elements, true);
        self.start_node(SyntaxKind::MarkupBlock);
        if self.at_text_tag() {
            self.parse_text_tag();
        } else {
            match self.tag_start() {
                Some(start) => self.parse_tag_construct(start),
                None => {
                    self.bump();
                    self.markup_span();
                }
            }
        }
        let whitespace = usize::from(self.at(SyntaxKind::Whitespace));
        if self.peek_kind(whitespace) == Some(SyntaxKind::NewLine) {
            self.bump_n(whitespace + 1);
            self.markup_span();
        }
        self.finish_node();
        self.strict_elements = strict;
        self.set_mode(SpanTokenizer::CSharp);
    }

    fn at_text_tag(&mut self) -> bool {
        self.at(SyntaxKind::OpenAngle)
            && self.at_text(1, SyntaxKind::Text, "text")
            && self.peek_kind(2) == Some(SyntaxKind::CloseAngle)
    }

    /// `<text>` only groups markup; its tags are transitions, not output
    fn parse_text_tag(&mut self) {
        let context = none_context(SpanTokenizer::Markup, AcceptedCharacters::None);
        let name_position = self.peek_position(1);
        self.start_node(SyntaxKind::MarkupElement);
        self.start_node(SyntaxKind::MarkupStartTag);
        for _ in 0..3 {
            self.bump();
            self.span(SyntaxKind::MarkupTransition, context.clone());
        }
        self.finish_node();

        self.open_elements.push("text".to_string());
        self.parse_markup_nodes(MarkupStop::EndTag);
        self.open_elements.pop();

        if self.end_tag_name(0).as_deref() == Some("text") {
            self.parse_end_tag(SyntaxKind::MarkupTransition);
        } else {
            let span = self.source_span(name_position, "text".len());
            self.error(factory::unclosed_tag(span, "text"));
        }
        self.finish_node();
    }

    /// `if (...) { } else { }` and the other block statements, as statement
    /// spans with markup where the bodies contain it
    fn parse_keyword_block(&mut self, keyword: &str) {
        self.transition();
        loop {
            let mut depth = 0usize;
            loop {
                match self.peek_kind(0) {
                    None => break,
                    Some(SyntaxKind::LeftBrace | SyntaxKind::Semicolon) if depth == 0 => break,
                    Some(SyntaxKind::Transition) if depth == 0 => break,
                    Some(SyntaxKind::CSharpOperator) if depth == 0 && self.at_markup_start() => {
                        break;
                    }
                    Some(SyntaxKind::LeftParenthesis) => depth += 1,
                    Some(SyntaxKind::RightParenthesis) => depth = depth.saturating_sub(1),
                    _ => {}
                }
                self.bump();
            }
            match self.peek_kind(0) {
                Some(SyntaxKind::LeftBrace) => {
                    let open = self.peek_position(0);
                    self.bump();
                    self.statement_span();
                    self.parse_code_body();
                    if self.at(SyntaxKind::RightBrace) {
                        self.bump();
                    } else {
                        let span = self.source_span(open, 1);
                        self.error(factory::expected_end_of_block_before_eof(
                            span, keyword, '}', '{',
                        ));
                        return;
                    }
                }
                Some(SyntaxKind::Semicolon) => self.bump(),
                _ => break,
            }

            let trivia = self.trivia_run(0);
            let continues = self.peek(trivia).is_some_and(|token| {
                token.kind == SyntaxKind::Keyword
                    && (matches!(token.text(), "else" | "catch" | "finally")
                        || (keyword == "do" && token.text() == "while"))
            });
            if !continues {
                break;
            }
            self.bump_n(trivia);
        }
        self.statement_span();
    }

    /// `@using Namespace` imports; `@using (...)` is a keyword block
    fn parse_using(&mut self) {
        self.start_node(SyntaxKind::RazorDirective);
        self.transition();
        self.start_node(SyntaxKind::RazorDirectiveBody);
        let start = self.peek_position(0);
        let mut count = 0;
        let mut content = 0;
        loop {
            match self.peek_kind(count) {
                None | Some(SyntaxKind::NewLine) => break,
                Some(SyntaxKind::Semicolon) => {
                    content = count + 1;
                    break;
                }
                Some(SyntaxKind::Whitespace) => count += 1,
                Some(_) => {
                    count += 1;
                    content = count;
                }
            }
        }
        self.bump_n(content);
        let text = self.slice(start, self.position());
        let namespace = text
            .strip_prefix("using")
            .unwrap_or(text)
            .trim()
            .trim_end_matches(';')
            .trim();
        let (is_static, namespace) = match namespace.strip_prefix("static ") {
            Some(rest) => (true, rest.trim()),
            None => (false, namespace),
        };
        let generator = ChunkGenerator::AddImport {
            namespace: namespace.to_string(),
            is_static,
        };
        self.span_always(
            SyntaxKind::CSharpStatementLiteral,
            SpanContext::new(
                generator,
                EditHandler::plain(SpanTokenizer::CSharp, AcceptedCharacters::AnyExceptNewline),
            ),
        );
        self.finish_node();
        self.finish_node();
    }

    fn parse_directive(&mut self, descriptor: &Arc<DirectiveDescriptor>) {
        let name = descriptor.directive.as_str();
        self.start_node(SyntaxKind::RazorDirective);
        let at = self.peek_position(0);
        self.transition();
        self.start_node(SyntaxKind::RazorDirectiveBody);
        self.bump();
        self.span(
            SyntaxKind::RazorMetaCode,
            SpanContext::new(
                ChunkGenerator::Directive {
                    descriptor: descriptor.clone(),
                },
                EditHandler::plain(SpanTokenizer::CSharp, AcceptedCharacters::None),
            ),
        );
        let keyword_span = self.source_span(at, name.len() + 1);
        if descriptor.usage == DirectiveUsage::FileScopedSinglyOccurring
            && !self.seen_directives.insert(name.to_string())
        {
            self.error(factory::duplicate_directive(keyword_span.clone(), name));
        }

        self.start_node(SyntaxKind::CSharpCodeBlock);
        if descriptor.is_tag_helper_directive() {
            self.parse_tag_helper_directive(name, keyword_span);
        } else if self.parse_directive_tokens(descriptor) {
            match descriptor.kind {
                DirectiveKind::SingleLine => self.finish_single_line_directive(name),
                DirectiveKind::RazorBlock | DirectiveKind::CodeBlock => {
                    self.parse_directive_block(descriptor)
                }
            }
        }
        self.finish_node();
        self.finish_node();
        self.finish_node();
    }

    fn directive_whitespace_span(&mut self) {
        self.span(
            SyntaxKind::UnclassifiedTextLiteral,
            directive_whitespace_context(),
        );
    }

    /// Tokens named by the descriptor; false once one is missing or malformed
    fn parse_directive_tokens(&mut self, descriptor: &DirectiveDescriptor) -> bool {
        let name = descriptor.directive.as_str();
        for token in &descriptor.tokens {
            let has_whitespace = self.at(SyntaxKind::Whitespace);
            if has_whitespace {
                self.bump();
                self.directive_whitespace_span();
            }
            let position = self.peek_position(0);
            let expected = token.kind.to_string();
            match self.peek_kind(0) {
                None => {
                    if token.optional {
                        return true;
                    }
                    let span = self.source_span(position, 0);
                    self.error(factory::unexpected_eof_after_directive(span, name, &expected));
                    return false;
                }
                Some(SyntaxKind::NewLine) if token.optional => return true,
                _ if !has_whitespace && token.optional => return true,
                _ => {}
            }
            let length = self.peek_len(0);
            if !has_whitespace || !self.bump_directive_token(token) {
                let span = self.source_span(position, length);
                self.error(factory::directive_expects_token(span, name, &expected));
                return false;
            }
            self.span(
                SyntaxKind::CSharpStatementLiteral,
                SpanContext::new(
                    ChunkGenerator::DirectiveToken {
                        descriptor: token.clone(),
                    },
                    EditHandler::plain(SpanTokenizer::CSharp, AcceptedCharacters::NonWhitespace),
                ),
            );
        }
        true
    }

    fn bump_directive_token(&mut self, token: &DirectiveTokenDescriptor) -> bool {
        match token.kind {
            DirectiveTokenKind::Type => self.bump_type(),
            DirectiveTokenKind::Namespace => {
                if !self.at_identifier(0) {
                    return false;
                }
                self.bump();
                while self.at(SyntaxKind::Dot) && self.at_identifier(1) {
                    self.bump_n(2);
                }
                true
            }
            DirectiveTokenKind::Member => {
                let member = self.at(SyntaxKind::Identifier);
                if member {
                    self.bump();
                }
                member
            }
            DirectiveTokenKind::String => {
                let string = self.peek(0).is_some_and(|t| {
                    t.kind == SyntaxKind::StringLiteral && t.text().starts_with('"')
                });
                if string {
                    self.bump();
                }
                string
            }
            DirectiveTokenKind::Attribute => {
                self.at(SyntaxKind::LeftBracket)
                    && self.bump_balanced(SyntaxKind::LeftBracket, SyntaxKind::RightBracket)
            }
            DirectiveTokenKind::Boolean => {
                let boolean = self.at_text(0, SyntaxKind::Keyword, "true")
                    || self.at_text(0, SyntaxKind::Keyword, "false");
                if boolean {
                    self.bump();
                }
                boolean
            }
            DirectiveTokenKind::GenericTypeConstraint => {
                if !self.at_text(0, SyntaxKind::Identifier, "where") {
                    return false;
                }
                loop {
                    match self.peek_kind(0) {
                        None | Some(SyntaxKind::NewLine) => break,
                        Some(SyntaxKind::Whitespace)
                            if matches!(self.peek_kind(1), None | Some(SyntaxKind::NewLine)) =>
                        {
                            break;
                        }
                        _ => self.bump(),
                    }
                }
                true
            }
        }
    }

    /// `Name.Space.Type<Args>[]?` or a tuple type
    fn bump_type(&mut self) -> bool {
        if self.at(SyntaxKind::LeftParenthesis) {
            return self.bump_balanced(SyntaxKind::LeftParenthesis, SyntaxKind::RightParenthesis);
        }
        if !self.at_identifier(0) {
            return false;
        }
        self.bump();
        loop {
            match self.peek_kind(0) {
                Some(SyntaxKind::Dot) if self.at_identifier(1) => self.bump_n(2),
                Some(SyntaxKind::CSharpOperator) if self.at_text(0, SyntaxKind::CSharpOperator, "::") => {
                    self.bump()
                }
                Some(SyntaxKind::CSharpOperator) if self.at_text(0, SyntaxKind::CSharpOperator, "<") => {
                    if !self.bump_generic_arguments() {
                        return false;
                    }
                }
                Some(SyntaxKind::CSharpOperator) if self.at_text(0, SyntaxKind::CSharpOperator, "?") => {
                    self.bump()
                }
                Some(SyntaxKind::LeftBracket) => {
                    self.bump_balanced(SyntaxKind::LeftBracket, SyntaxKind::RightBracket);
                }
                _ => return true,
            }
        }
    }

    /// `<...>` with nesting, stopping at the end of the line
    fn bump_generic_arguments(&mut self) -> bool {
        let mut depth = 0usize;
        loop {
            match self.peek_kind(0) {
                None | Some(SyntaxKind::NewLine) => return false,
                Some(SyntaxKind::CSharpOperator) if self.at_text(0, SyntaxKind::CSharpOperator, "<") => {
                    depth += 1
                }
                Some(SyntaxKind::CSharpOperator) if self.at_text(0, SyntaxKind::CSharpOperator, ">") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return true;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// After the last token only whitespace and a line break may follow
    fn finish_single_line_directive(&mut self, name: &str) {
        let whitespace = usize::from(self.at(SyntaxKind::Whitespace));
        match self.peek_kind(whitespace) {
            None => {
                self.bump_n(whitespace);
                self.directive_whitespace_span();
            }
            Some(SyntaxKind::NewLine) => {
                self.bump_n(whitespace + 1);
                self.directive_whitespace_span();
            }
            Some(_) => {
                self.bump_n(whitespace);
                self.directive_whitespace_span();
                let position = self.peek_position(0);
                let length = self.peek_len(0);
                let span = self.source_span(position, length);
                self.error(factory::unexpected_directive_literal(span, name));
            }
        }
    }

    /// `{ ... }` body of a section (markup) or of `functions`/`code`
    fn parse_directive_block(&mut self, descriptor: &DirectiveDescriptor) {
        let name = descriptor.directive.as_str();
        let trivia = self.trivia_run(0);
        if trivia > 0 {
            self.bump_n(trivia);
            self.directive_whitespace_span();
        }
        let open = self.peek_position(0);
        if !self.at(SyntaxKind::LeftBrace) {
            let diagnostic = if self.at_end() {
                factory::unexpected_eof_after_directive(self.source_span(open, 0), name, "{")
            } else {
                let length = self.peek_len(0);
                factory::directive_expects_token(self.source_span(open, length), name, "\"{\"")
            };
            self.error(diagnostic);
            return;
        }
        self.bump();
        let brace = self.span_always(SyntaxKind::RazorMetaCode, meta_context());

        if descriptor.kind == DirectiveKind::RazorBlock {
            let open_elements = std::mem::take(&mut self.open_elements);
            let braces = self.section_braces.replace(0);
            self.set_mode(SpanTokenizer::Markup);
            self.set_split_braces(true);
            self.start_node(SyntaxKind::MarkupBlock);
            self.parse_markup_nodes(MarkupStop::Eof);
            self.finish_node();
            self.set_split_braces(false);
            self.set_mode(SpanTokenizer::CSharp);
            self.section_braces = braces;
            self.open_elements = open_elements;
        } else {
            self.parse_code_body();
        }

        let terminated = self.at(SyntaxKind::RightBrace);
        self.set_span_context(&brace, open_brace_context(terminated, false));
        if terminated {
            self.bump();
            self.span(SyntaxKind::RazorMetaCode, meta_context());
        } else {
            let span = self.source_span(open, 1);
            self.error(factory::expected_end_of_block_before_eof(span, name, '}', '{'));
        }
    }

    /// Lookup text runs to the end of the line, quoted or not
    fn parse_tag_helper_directive(&mut self, name: &str, keyword_span: SourceSpan) {
        if self.at(SyntaxKind::Whitespace) {
            self.bump();
            self.directive_whitespace_span();
        }
        let start = self.peek_position(0);
        let mut count = 0;
        let mut content = 0;
        loop {
            match self.peek_kind(count) {
                None | Some(SyntaxKind::NewLine) => break,
                Some(SyntaxKind::Whitespace) => count += 1,
                Some(_) => {
                    count += 1;
                    content = count;
                }
            }
        }
        self.bump_n(content);
        let raw = self.slice(start, self.position());
        let text = unquote(raw).trim().to_string();

        if text.is_empty() {
            self.error(factory::directive_must_have_value(keyword_span, name));
        }
        let generator = if name == ADD_TAG_HELPER || name == REMOVE_TAG_HELPER {
            let parts = split_lookup_text(&text);
            if parts.is_none() && !text.is_empty() {
                let span = self.source_span(start, raw.len());
                self.error(factory::invalid_tag_helper_lookup_text(span, &text));
            }
            let (type_pattern, assembly_name) = parts.unzip();
            if name == ADD_TAG_HELPER {
                ChunkGenerator::AddTagHelper {
                    lookup_text: text,
                    type_pattern,
                    assembly_name,
                }
            } else {
                ChunkGenerator::RemoveTagHelper {
                    lookup_text: text,
                    type_pattern,
                    assembly_name,
                }
            }
        } else {
            ChunkGenerator::TagHelperPrefix { prefix: text }
        };
        self.span_always(
            SyntaxKind::CSharpStatementLiteral,
            SpanContext::new(
                generator,
                EditHandler::plain(SpanTokenizer::CSharp, AcceptedCharacters::NonWhitespace),
            ),
        );

        if self.at(SyntaxKind::Whitespace) {
            self.bump();
        }
        if self.at(SyntaxKind::NewLine) {
            self.bump();
        }
        self.directive_whitespace_span();
    }

    /// `@* ... *@` as one span in either mode
    pub(crate) fn parse_razor_comment(&mut self) {
        let start = self.peek_position(0);
        let tokenizer = self.mode();
        self.bump();
        if self.at(SyntaxKind::RazorCommentStar) {
            self.bump();
        }
        if self.at(SyntaxKind::RazorCommentLiteral) {
            self.bump();
        }
        if self.at(SyntaxKind::RazorCommentStar)
            && self.peek_kind(1) == Some(SyntaxKind::RazorCommentTransition)
        {
            self.bump_n(2);
        } else {
            let span = self.source_span(start, 2);
            self.error(factory::unterminated_razor_comment(span));
        }
        self.span(
            SyntaxKind::RazorCommentBlock,
            none_context(tokenizer, AcceptedCharacters::None),
        );
    }
}
