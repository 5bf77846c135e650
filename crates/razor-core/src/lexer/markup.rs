//! Markup tokenizer

use super::{StateResult, Token, Tokenizer, TokenizerState, is_newline, is_whitespace};
use crate::cst::SyntaxKind;
use crate::source::SourceReader;

/// Tokenizer for HTML-like markup
#[derive(Debug, Default)]
pub struct HtmlTokenizer {
    state: TokenizerState,
    buffer: String,
    split_braces: bool,
}

impl HtmlTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `{` and `}` as separate text tokens.
    ///
    /// Used while parsing the markup body of a `@section` block, where the
    /// parser has to find the closing brace.
    pub fn set_split_braces(&mut self, split: bool) {
        self.split_braces = split;
    }

    fn is_text_terminator(&self, ch: char) -> bool {
        matches!(
            ch,
            '<' | '>' | '/' | '=' | '"' | '\'' | '!' | '?' | '[' | ']' | '@'
        ) || (self.split_braces && matches!(ch, '{' | '}'))
            || ch.is_whitespace()
    }

    fn single<'a>(&mut self, reader: &mut SourceReader<'a>, kind: SyntaxKind) -> StateResult<'a> {
        if let Some(ch) = reader.read() {
            self.buffer.push(ch);
        }
        let token = self.take_token(kind);
        StateResult::stay_with(TokenizerState::Data, token)
    }

    fn text<'a>(&mut self, reader: &mut SourceReader<'a>) -> StateResult<'a> {
        while let Some(ch) = reader.peek() {
            if self.is_text_terminator(ch) || reader.starts_with("--") {
                break;
            }
            reader.read();
            self.buffer.push(ch);
        }
        if self.buffer.is_empty() {
            // `-` followed by something other than `-`, or a lone brace
            return self.single(reader, SyntaxKind::Text);
        }
        let token = self.take_token(SyntaxKind::Text);
        StateResult::stay_with(TokenizerState::Data, token)
    }
}

impl Tokenizer for HtmlTokenizer {
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
            '@' => self.at_transition(reader),
            c if is_newline(c) => self.newline(reader),
            c if is_whitespace(c) => self.whitespace(reader),
            '<' => self.single(reader, SyntaxKind::OpenAngle),
            '>' => self.single(reader, SyntaxKind::CloseAngle),
            '/' => self.single(reader, SyntaxKind::ForwardSlash),
            '!' => self.single(reader, SyntaxKind::Bang),
            '?' => self.single(reader, SyntaxKind::QuestionMark),
            '=' => self.single(reader, SyntaxKind::Equals),
            '"' => self.single(reader, SyntaxKind::DoubleQuote),
            '\'' => self.single(reader, SyntaxKind::SingleQuote),
            '[' => self.single(reader, SyntaxKind::LeftBracket),
            ']' => self.single(reader, SyntaxKind::RightBracket),
            '-' if reader.starts_with("--") => {
                reader.advance(2);
                StateResult::stay_with(
                    TokenizerState::Data,
                    Token::new(SyntaxKind::DoubleHyphen, "--"),
                )
            }
            '{' | '}' if self.split_braces => self.single(reader, SyntaxKind::Text),
            _ => self.text(reader),
        }
    }
}
