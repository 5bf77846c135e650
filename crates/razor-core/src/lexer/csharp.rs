//! Code tokenizer
//!
//! Identifiers, numbers and punctuation come from [`CSharpLexeme`]; trivia,
//! literals with delimiters, comments and `@` are scanned here so that Razor
//! comments and unterminated-literal diagnostics stay under our control.

use logos::Logos;

use super::{
    CSharpLexeme, StateResult, Token, Tokenizer, TokenizerState, is_newline, is_whitespace,
};
use crate::cst::SyntaxKind;
use crate::diagnostics::factory;
use crate::source::SourceReader;

/// Tokenizer for C# code fragments
#[derive(Debug, Default)]
pub struct CSharpTokenizer {
    state: TokenizerState,
    buffer: String,
}

impl CSharpTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, reader: &mut SourceReader<'_>, count: usize) {
        for _ in 0..count {
            if let Some(ch) = reader.read() {
                self.buffer.push(ch);
            }
        }
    }

    /// `"..."` and `'...'`; both end at the closing delimiter or before a line break
    fn quoted<'a>(
        &mut self,
        reader: &mut SourceReader<'a>,
        prefix_len: usize,
        quote: char,
    ) -> StateResult<'a> {
        let start = reader.position();
        self.push(reader, prefix_len);
        let mut terminated = false;
        while let Some(ch) = reader.peek() {
            if is_newline(ch) {
                break;
            }
            self.push(reader, 1);
            if ch == '\\' {
                if reader.peek().is_some_and(|next| !is_newline(next)) {
                    self.push(reader, 1);
                }
            } else if ch == quote {
                terminated = true;
                break;
            }
        }
        let kind = if quote == '"' {
            SyntaxKind::StringLiteral
        } else {
            SyntaxKind::CharacterLiteral
        };
        let mut token = self.take_token(kind);
        if !terminated {
            let span = reader.document().span(start, prefix_len);
            token = token.with_diagnostic(if quote == '"' {
                factory::unterminated_string_literal(span)
            } else {
                factory::unterminated_character_literal(span)
            });
        }
        StateResult::stay_with(TokenizerState::Data, token)
    }

    /// `@"..."` and `$@"..."`; may span lines, `""` escapes a quote
    fn verbatim_string<'a>(
        &mut self,
        reader: &mut SourceReader<'a>,
        prefix_len: usize,
    ) -> StateResult<'a> {
        let start = reader.position();
        self.push(reader, prefix_len);
        let mut terminated = false;
        while let Some(ch) = reader.peek() {
            self.push(reader, 1);
            if ch == '"' {
                if reader.peek() == Some('"') {
                    self.push(reader, 1);
                } else {
                    terminated = true;
                    break;
                }
            }
        }
        let mut token = self.take_token(SyntaxKind::StringLiteral);
        if !terminated {
            token = token.with_diagnostic(factory::unterminated_string_literal(
                reader.document().span(start, prefix_len),
            ));
        }
        StateResult::stay_with(TokenizerState::Data, token)
    }

    /// `$"..."`; quotes inside `{ }` holes belong to nested strings
    fn interpolated_string<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        let start = reader.position();
        self.push(reader, 2);
        let mut depth = 0usize;
        let mut terminated = false;
        while let Some(ch) = reader.peek() {
            if is_newline(ch) && depth == 0 {
                break;
            }
            match ch {
                '\\' if depth == 0 => {
                    self.push(reader, 1);
                    if reader.peek().is_some_and(|next| !is_newline(next)) {
                        self.push(reader, 1);
                    }
                }
                '{' if depth == 0 && reader.starts_with("{{") => self.push(reader, 2),
                '{' => {
                    depth += 1;
                    self.push(reader, 1);
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    self.push(reader, 1);
                }
                '"' if depth > 0 => {
                    self.push(reader, 1);
                    while let Some(inner) = reader.peek() {
                        if is_newline(inner) {
                            break;
                        }
                        self.push(reader, 1);
                        if inner == '"' {
                            break;
                        }
                    }
                }
                '"' => {
                    self.push(reader, 1);
                    terminated = true;
                    break;
                }
                _ => self.push(reader, 1),
            }
        }
        let mut token = self.take_token(SyntaxKind::StringLiteral);
        if !terminated {
            token = token.with_diagnostic(factory::unterminated_string_literal(
                reader.document().span(start, 2),
            ));
        }
        StateResult::stay_with(TokenizerState::Data, token)
    }

    fn line_comment<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        while let Some(ch) = reader.peek() {
            if is_newline(ch) {
                break;
            }
            self.push(reader, 1);
        }
        let token = self.take_token(SyntaxKind::CSharpComment);
        StateResult::stay_with(TokenizerState::Data, token)
    }

    fn block_comment<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        let start = reader.position();
        self.push(reader, 2);
        let mut terminated = false;
        while !reader.is_at_end() {
            if reader.starts_with("*/") {
                self.push(reader, 2);
                terminated = true;
                break;
            }
            self.push(reader, 1);
        }
        let mut token = self.take_token(SyntaxKind::CSharpComment);
        if !terminated {
            token = token.with_diagnostic(factory::unterminated_block_comment(
                reader.document().span(start, 2),
            ));
        }
        StateResult::stay_with(TokenizerState::Data, token)
    }

    /// Identifiers, keywords, numbers and punctuation
    fn lexeme<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        let remaining = reader.remaining();
        let mut lexer = CSharpLexeme::lexer(remaining);
        match lexer.next() {
            Some(Ok(lexeme)) => {
                let text: &'a str = lexer.slice();
                reader.advance(text.len());
                let kind = lexeme.syntax_kind(text);
                StateResult::stay_with(TokenizerState::Data, Token::new(kind, text))
            }
            Some(Err(())) => {
                self.push(reader, 1);
                let token = self.take_token(SyntaxKind::Text);
                StateResult::stay_with(TokenizerState::Data, token)
            }
            None => StateResult::end(),
        }
    }
}

impl Tokenizer for CSharpTokenizer {
    fn state(&self) -> TokenizerState {
        self.state
    }

    fn set_state(&mut self, state: TokenizerState) {
        self.state = state;
    }

    fn buffer(&mut self) -> &mut String {
        &mut self.buffer
    }

    fn dispatch_data<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        let Some(ch) = reader.peek() else {
            return StateResult::end();
        };
        match ch {
            '@' if reader.starts_with("@\"") => self.verbatim_string(reader, 2),
            '@' if reader.starts_with("@$\"") => self.verbatim_string(reader, 3),
            '@' => self.at_transition(reader),
            '$' if reader.starts_with("$@\"") => self.verbatim_string(reader, 3),
            '$' if reader.starts_with("$\"") => self.interpolated_string(reader),
            '"' => self.quoted(reader, 1, '"'),
            '\'' => self.quoted(reader, 1, '\''),
            '/' if reader.starts_with("//") => self.line_comment(reader),
            '/' if reader.starts_with("/*") => self.block_comment(reader),
            c if is_newline(c) => self.newline(reader),
            c if is_whitespace(c) => self.whitespace(reader),
            _ => self.lexeme(reader),
        }
    }
}
