//! Tokenizers for the two embedded grammars
//!
//! [`HtmlTokenizer`] lexes markup and [`CSharpTokenizer`] lexes code. Both are
//! state machines driven by the [`Tokenizer`] shell: `dispatch` runs the
//! handler for the current [`TokenizerState`] and returns a [`StateResult`]
//! that either stays in the state or transitions, optionally emitting a
//! token. The Razor comment mini-grammar (`@* ... *@`) and the `@@` escape are
//! shared by both tokenizers.

mod csharp;
mod lexeme;
mod markup;
pub mod symbols;

pub use csharp::CSharpTokenizer;
pub use lexeme::{CSharpLexeme, is_keyword};
pub use markup::HtmlTokenizer;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::cst::SyntaxKind;
use crate::diagnostics::RazorDiagnostic;
use crate::source::{SourceDocument, SourceReader};

/// A lexical atom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    /// Shared constant for common short tokens, a source slice for code
    /// lexemes, owned otherwise
    pub text: Cow<'a, str>,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl<'a> Token<'a> {
    pub fn new(kind: SyntaxKind, text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            kind,
            text: text.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: RazorDiagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is(&self, kind: SyntaxKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn into_owned(self) -> Token<'static> {
        Token {
            kind: self.kind,
            text: Cow::Owned(self.text.into_owned()),
            diagnostics: self.diagnostics,
        }
    }
}

/// States shared by both tokenizers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenizerState {
    #[default]
    Start,
    Data,
    AfterRazorCommentTransition,
    EscapedRazorCommentTransition,
    RazorCommentBody,
    StarAfterRazorCommentBody,
    AtTokenAfterRazorCommentBody,
}

/// Outcome of one dispatch step
#[derive(Debug)]
pub struct StateResult<'a> {
    /// `None` ends tokenization
    pub next: Option<TokenizerState>,
    pub token: Option<Token<'a>>,
}

impl<'a> StateResult<'a> {
    pub fn stay(state: TokenizerState) -> Self {
        Self {
            next: Some(state),
            token: None,
        }
    }

    pub fn stay_with(state: TokenizerState, token: Token<'a>) -> Self {
        Self {
            next: Some(state),
            token: Some(token),
        }
    }

    pub fn transition(state: TokenizerState) -> Self {
        Self::stay(state)
    }

    pub fn transition_with(state: TokenizerState, token: Token<'a>) -> Self {
        Self::stay_with(state, token)
    }

    pub fn end() -> Self {
        Self {
            next: None,
            token: None,
        }
    }
}

/// The state-machine shell shared by the markup and code tokenizers
pub trait Tokenizer {
    fn state(&self) -> TokenizerState;

    fn set_state(&mut self, state: TokenizerState);

    /// Scratch buffer reused for every token the tokenizer builds
    fn buffer(&mut self) -> &mut String;

    /// Handle the `Data` state, the only state that differs between grammars
    fn dispatch_data<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a>;

    fn dispatch<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        match self.state() {
            TokenizerState::Start => {
                if reader.is_at_end() {
                    StateResult::end()
                } else {
                    StateResult::transition(TokenizerState::Data)
                }
            }
            TokenizerState::Data => self.dispatch_data(reader),
            TokenizerState::AfterRazorCommentTransition => {
                if reader.peek() == Some('*') {
                    reader.read();
                    StateResult::transition_with(
                        TokenizerState::RazorCommentBody,
                        Token::new(SyntaxKind::RazorCommentStar, "*"),
                    )
                } else {
                    StateResult::transition(TokenizerState::Data)
                }
            }
            TokenizerState::EscapedRazorCommentTransition => {
                if reader.peek() == Some('@') {
                    reader.read();
                    StateResult::transition_with(
                        TokenizerState::Data,
                        Token::new(SyntaxKind::Transition, "@"),
                    )
                } else {
                    StateResult::transition(TokenizerState::Data)
                }
            }
            TokenizerState::RazorCommentBody => self.razor_comment_body(reader),
            TokenizerState::StarAfterRazorCommentBody => {
                if reader.peek() == Some('*') {
                    reader.read();
                    StateResult::transition_with(
                        TokenizerState::AtTokenAfterRazorCommentBody,
                        Token::new(SyntaxKind::RazorCommentStar, "*"),
                    )
                } else {
                    StateResult::transition(TokenizerState::Data)
                }
            }
            TokenizerState::AtTokenAfterRazorCommentBody => {
                if reader.peek() == Some('@') {
                    reader.read();
                    StateResult::transition_with(
                        TokenizerState::Data,
                        Token::new(SyntaxKind::RazorCommentTransition, "@"),
                    )
                } else {
                    StateResult::transition(TokenizerState::Data)
                }
            }
        }
    }

    /// Comment text up to `*@` or the end of input
    fn razor_comment_body<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        while !reader.is_at_end() && !reader.starts_with("*@") {
            if let Some(ch) = reader.read() {
                self.buffer().push(ch);
            }
        }
        let next = if reader.is_at_end() {
            TokenizerState::Data
        } else {
            TokenizerState::StarAfterRazorCommentBody
        };
        if self.buffer().is_empty() {
            StateResult::transition(next)
        } else {
            let token = self.take_token(SyntaxKind::RazorCommentLiteral);
            StateResult::transition_with(next, token)
        }
    }

    /// Handle `@` in the `Data` state: Razor comment start, `@@` escape or a
    /// plain transition
    fn at_transition<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        reader.read();
        match reader.peek() {
            Some('*') => StateResult::transition_with(
                TokenizerState::AfterRazorCommentTransition,
                Token::new(SyntaxKind::RazorCommentTransition, "@"),
            ),
            Some('@') => StateResult::transition_with(
                TokenizerState::EscapedRazorCommentTransition,
                Token::new(SyntaxKind::Transition, "@"),
            ),
            _ => StateResult::stay_with(
                TokenizerState::Data,
                Token::new(SyntaxKind::Transition, "@"),
            ),
        }
    }

    /// Emit the buffer contents as a token and clear the buffer for reuse
    fn take_token<'a>(&mut self, kind: SyntaxKind) -> Token<'a> {
        let buffer = self.buffer();
        let text = match symbols::shared(buffer) {
            Some(shared) => Cow::Borrowed(shared),
            None => Cow::Owned(buffer.clone()),
        };
        buffer.clear();
        Token::new(kind, text)
    }

    /// Read a run of spaces and tabs into the buffer
    fn whitespace<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        while let Some(ch) = reader.peek() {
            if !is_whitespace(ch) {
                break;
            }
            reader.read();
            self.buffer().push(ch);
        }
        let token = self.take_token(SyntaxKind::Whitespace);
        StateResult::stay_with(TokenizerState::Data, token)
    }

    /// Read one `\r\n`, `\n` or `\r`
    fn newline<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        let text = if reader.starts_with("\r\n") {
            reader.advance(2);
            "\r\n"
        } else if reader.read() == Some('\r') {
            "\r"
        } else {
            "\n"
        };
        StateResult::stay_with(TokenizerState::Data, Token::new(SyntaxKind::NewLine, text))
    }

    /// Pull the next token, running the state machine until one is emitted.
    ///
    /// Returns `None` at the end of input. Every dispatch either emits a
    /// token, changes state or consumes input; a step that does none of those
    /// terminates tokenization instead of spinning.
    fn next_token<'a>(&mut self, reader: &mut SourceReader<'a>) -> Option<Token<'a>> {
        loop {
            let position = reader.position();
            let state = self.state();
            let StateResult { next, token } = self.dispatch(reader);
            match next {
                Some(next) => self.set_state(next),
                None => {
                    self.set_state(TokenizerState::Data);
                    return token;
                }
            }
            if token.is_some() {
                return token;
            }
            if reader.position() == position && self.state() == state {
                debug_assert!(false, "tokenizer made no progress in state {state:?}");
                return None;
            }
        }
    }
}

pub(crate) fn is_whitespace(ch: char) -> bool {
    ch.is_whitespace() && !is_newline(ch)
}

pub(crate) fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r')
}

/// Which tokenizer re-lexes a span's content after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanTokenizer {
    Markup,
    CSharp,
}

impl SpanTokenizer {
    /// Tokenize a complete document with a fresh tokenizer
    pub fn tokenize(self, document: &SourceDocument) -> Vec<Token<'_>> {
        let mut reader = SourceReader::new(document);
        match self {
            SpanTokenizer::Markup => collect_tokens(&mut HtmlTokenizer::new(), &mut reader),
            SpanTokenizer::CSharp => collect_tokens(&mut CSharpTokenizer::new(), &mut reader),
        }
    }
}

/// Drain a tokenizer
pub fn collect_tokens<'a, T: Tokenizer>(
    tokenizer: &mut T,
    reader: &mut SourceReader<'a>,
) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token(reader) {
        tokens.push(token);
    }
    tracing::trace!(count = tokens.len(), "tokenized");
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokenizer: SpanTokenizer, text: &str) -> Vec<(SyntaxKind, String)> {
        let document = SourceDocument::new(text, None);
        tokenizer
            .tokenize(&document)
            .into_iter()
            .map(|t| (t.kind, t.text.into_owned()))
            .collect()
    }

    #[test]
    fn test_razor_comment_in_both_grammars() {
        for tokenizer in [SpanTokenizer::Markup, SpanTokenizer::CSharp] {
            let tokens = kinds(tokenizer, "@* hi *@");
            assert_eq!(
                tokens,
                vec![
                    (SyntaxKind::RazorCommentTransition, "@".to_string()),
                    (SyntaxKind::RazorCommentStar, "*".to_string()),
                    (SyntaxKind::RazorCommentLiteral, " hi ".to_string()),
                    (SyntaxKind::RazorCommentStar, "*".to_string()),
                    (SyntaxKind::RazorCommentTransition, "@".to_string()),
                ]
            );
        }
    }

    #[test]
    fn test_unterminated_razor_comment_stops_at_eof() {
        let tokens = kinds(SpanTokenizer::Markup, "@* open");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].0, SyntaxKind::RazorCommentLiteral);
    }

    #[test]
    fn test_empty_razor_comment() {
        let tokens = kinds(SpanTokenizer::Markup, "@**@");
        let kinds: Vec<_> = tokens.iter().map(|t| t.0).collect();
        assert_eq!(
            kinds,
            [
                SyntaxKind::RazorCommentTransition,
                SyntaxKind::RazorCommentStar,
                SyntaxKind::RazorCommentStar,
                SyntaxKind::RazorCommentTransition,
            ]
        );
    }

    #[test]
    fn test_escaped_transition() {
        let tokens = kinds(SpanTokenizer::Markup, "@@x");
        assert_eq!(tokens[0].0, SyntaxKind::Transition);
        assert_eq!(tokens[1].0, SyntaxKind::Transition);
        assert_eq!(tokens[2], (SyntaxKind::Text, "x".to_string()));
    }

    #[test]
    fn test_empty_input() {
        assert!(kinds(SpanTokenizer::Markup, "").is_empty());
        assert!(kinds(SpanTokenizer::CSharp, "").is_empty());
    }

    #[test]
    fn test_tokens_cover_input() {
        let text = "<p class=\"a\">@Model.Name @* c *@ x@@y</p>\r\n";
        for tokenizer in [SpanTokenizer::Markup, SpanTokenizer::CSharp] {
            let joined: String = kinds(tokenizer, text).into_iter().map(|t| t.1).collect();
            assert_eq!(joined, text);
        }
    }
}
