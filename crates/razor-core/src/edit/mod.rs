//! Edit handlers: per-span policies for absorbing text changes
//!
//! A handler decides whether a change that lands inside its span can be
//! applied by re-lexing that span alone. Anything it refuses forces a wider
//! reparse.

mod partial;

pub use partial::PartialParseOutcome;

use rowan::GreenNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitOr, BitOrAssign};

use crate::cst::{RazorNodeExt, SyntaxKind, SyntaxNode, green_span};
use crate::diagnostics::RazorDiagnostic;
use crate::error::RazorError;
use crate::lexer::SpanTokenizer;
use crate::result::Result;
use crate::source::{SourceChange, SourceDocument};

/// Which trailing characters a span may take ownership of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcceptedCharacters {
    /// Nothing; a change at the span's end belongs to the next span
    None,
    NewLine,
    Whitespace,
    NonWhitespace,
    AllWhitespace,
    AnyExceptNewline,
    #[default]
    Any,
}

/// Outcome flags of a partial parse attempt
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PartialParseResult(u8);

impl PartialParseResult {
    pub const REJECTED: Self = Self(1);
    pub const ACCEPTED: Self = Self(2);
    pub const PROVISIONAL: Self = Self(4);
    pub const SPAN_CONTEXT_CHANGED: Self = Self(8);
    pub const AUTO_COMPLETE_BLOCK: Self = Self(16);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_accepted(self) -> bool {
        self.contains(Self::ACCEPTED)
    }

    pub fn is_rejected(self) -> bool {
        self.contains(Self::REJECTED)
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for PartialParseResult {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PartialParseResult {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for PartialParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::REJECTED, "Rejected"),
            (Self::ACCEPTED, "Accepted"),
            (Self::PROVISIONAL, "Provisional"),
            (Self::SPAN_CONTEXT_CHANGED, "SpanContextChanged"),
            (Self::AUTO_COMPLETE_BLOCK, "AutoCompleteBlock"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", set.join(" | "))
        }
    }
}

/// Absorption policy of a handler
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditHandlerKind {
    /// Never absorbs a change
    Plain,
    /// Opening brace of a block; a newline typed at its end signals that the
    /// closing brace should be inserted
    AutoComplete {
        at_end_of_span_only: bool,
        auto_complete_string: Option<String>,
    },
    /// Statement code; absorbs edits that touch no `{ } @ < *`
    CodeBlock,
}

/// Characters whose insertion or removal changes the block structure
const STRUCTURAL_CHARACTERS: [char; 5] = ['{', '}', '@', '<', '*'];

/// Edit policy of one span.
///
/// Equality and hashing cover the policy and accepted characters only; the
/// tokenizer used to re-lex the span is not part of a handler's identity.
#[derive(Debug, Clone)]
pub struct EditHandler {
    pub kind: EditHandlerKind,
    pub accepted_characters: AcceptedCharacters,
    pub tokenizer: SpanTokenizer,
}

impl PartialEq for EditHandler {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.accepted_characters == other.accepted_characters
    }
}

impl Eq for EditHandler {}

impl Hash for EditHandler {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.accepted_characters.hash(state);
    }
}

impl fmt::Display for EditHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EditHandlerKind::Plain => {
                write!(f, "SpanEditHandler;Accepts:{:?}", self.accepted_characters)
            }
            EditHandlerKind::AutoComplete {
                at_end_of_span_only,
                auto_complete_string,
            } => {
                write!(
                    f,
                    "AutoCompleteEditHandler;Accepts:{:?},AutoComplete:[{}]",
                    self.accepted_characters,
                    auto_complete_string.as_deref().unwrap_or("<null>")
                )?;
                if *at_end_of_span_only {
                    write!(f, ";AtEOL")?;
                }
                Ok(())
            }
            EditHandlerKind::CodeBlock => {
                write!(f, "CodeBlockEditHandler;Accepts:{:?}", self.accepted_characters)
            }
        }
    }
}

/// Result of [`EditHandler::apply_change`]
#[derive(Debug, Clone)]
pub struct EditResult {
    pub result: PartialParseResult,
    /// Rebuilt span when accepted, the original green otherwise
    pub span: GreenNode,
    /// Lexer diagnostics of the rebuilt span, offsets relative to its start
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl EditHandler {
    pub fn new(kind: EditHandlerKind, tokenizer: SpanTokenizer, accepted: AcceptedCharacters) -> Self {
        Self {
            kind,
            accepted_characters: accepted,
            tokenizer,
        }
    }

    pub fn plain(tokenizer: SpanTokenizer, accepted: AcceptedCharacters) -> Self {
        Self::new(EditHandlerKind::Plain, tokenizer, accepted)
    }

    pub fn auto_complete(
        tokenizer: SpanTokenizer,
        accepted: AcceptedCharacters,
        at_end_of_span_only: bool,
        auto_complete_string: Option<String>,
    ) -> Self {
        Self::new(
            EditHandlerKind::AutoComplete {
                at_end_of_span_only,
                auto_complete_string,
            },
            tokenizer,
            accepted,
        )
    }

    pub fn code_block(tokenizer: SpanTokenizer, accepted: AcceptedCharacters) -> Self {
        Self::new(EditHandlerKind::CodeBlock, tokenizer, accepted)
    }

    /// The span owns a change that starts inside it and ends before its end,
    /// or exactly at its end when it accepts trailing characters
    pub fn owns_change(&self, span: &SyntaxNode, change: &SourceChange) -> bool {
        let end = span.end_position();
        let change_end = change.end();
        change.start() >= span.position()
            && (change_end < end
                || (change_end == end && self.accepted_characters != AcceptedCharacters::None))
    }

    pub fn can_accept_change(&self, span: &SyntaxNode, change: &SourceChange) -> PartialParseResult {
        match &self.kind {
            EditHandlerKind::Plain => PartialParseResult::REJECTED,
            EditHandlerKind::AutoComplete {
                at_end_of_span_only,
                auto_complete_string,
            } => {
                let at_end = span.end_position() == change.start();
                let placed = if *at_end_of_span_only {
                    at_end
                } else {
                    at_end || is_at_end_of_first_line(span, change)
                };
                if placed
                    && change.is_insert()
                    && is_newline(&change.new_text)
                    && auto_complete_string.is_some()
                {
                    PartialParseResult::REJECTED | PartialParseResult::AUTO_COMPLETE_BLOCK
                } else {
                    PartialParseResult::REJECTED
                }
            }
            EditHandlerKind::CodeBlock => {
                if is_acceptable_deletion(span, change)
                    || is_acceptable_replacement(span, change)
                    || is_acceptable_insertion(change)
                {
                    PartialParseResult::ACCEPTED
                } else {
                    PartialParseResult::REJECTED
                }
            }
        }
    }

    /// Decide on `change` and rebuild the span when it is accepted.
    ///
    /// `force` skips the policy check.
    pub fn apply_change(
        &self,
        span: &SyntaxNode,
        change: &SourceChange,
        force: bool,
    ) -> Result<EditResult> {
        let result = if force {
            PartialParseResult::ACCEPTED
        } else {
            self.can_accept_change(span, change)
        };
        if result.is_accepted() {
            let (green, diagnostics) = self.update_span(span, change)?;
            return Ok(EditResult {
                result,
                span: green,
                diagnostics,
            });
        }
        Ok(EditResult {
            result,
            span: span.green().into_owned(),
            diagnostics: Vec::new(),
        })
    }

    /// Apply `change` to the span's text and re-lex it into a span of the
    /// same kind
    pub fn update_span(
        &self,
        span: &SyntaxNode,
        change: &SourceChange,
    ) -> Result<(GreenNode, Vec<RazorDiagnostic>)> {
        let kind = span.kind();
        if !kind.is_span() {
            return Err(RazorError::invalid_argument(
                "span",
                format!("{kind} is not a span"),
            ));
        }
        match kind {
            SyntaxKind::MarkupTextLiteral
            | SyntaxKind::MarkupEphemeralTextLiteral
            | SyntaxKind::MarkupTransition
            | SyntaxKind::CSharpStatementLiteral
            | SyntaxKind::CSharpExpressionLiteral
            | SyntaxKind::CSharpEphemeralTextLiteral
            | SyntaxKind::CSharpTransition
            | SyntaxKind::RazorMetaCode
            | SyntaxKind::UnclassifiedTextLiteral
            | SyntaxKind::RazorCommentBlock => {}
            other => {
                debug_assert!(false, "update_span called on {other}");
                return Err(RazorError::internal_error(format!(
                    "cannot rebuild a span of kind {other}"
                )));
            }
        }

        let content = span.content();
        let edited = change
            .get_edited_content(&content, span.position())
            .ok_or_else(|| {
                RazorError::invalid_argument("change", "change does not fall inside the span")
            })?;
        let document = SourceDocument::new(edited, None);
        let mut diagnostics = Vec::new();
        let tokens: Vec<_> = self
            .tokenizer
            .tokenize(&document)
            .into_iter()
            .map(|mut token| {
                diagnostics.append(&mut token.diagnostics);
                token
            })
            .collect();
        Ok((green_span(kind, tokens), diagnostics))
    }
}

fn is_newline(text: &str) -> bool {
    matches!(text, "\n" | "\r\n" | "\r")
}

fn is_at_end_of_first_line(span: &SyntaxNode, change: &SourceChange) -> bool {
    let content = span.content();
    let Some(relative) = change.start().checked_sub(span.position()) else {
        return false;
    };
    let first_line_end = content.find(['\r', '\n']).unwrap_or(content.len());
    relative == first_line_end
}

fn contains_structural(text: &str) -> bool {
    text.contains(STRUCTURAL_CHARACTERS)
}

/// The replaced or deleted region of the span holds a structural character
fn modifies_structure(span: &SyntaxNode, change: &SourceChange) -> bool {
    let content = span.content();
    change
        .old_text(&content, span.position())
        .is_none_or(contains_structural)
}

fn is_acceptable_insertion(change: &SourceChange) -> bool {
    change.is_insert() && !contains_structural(&change.new_text)
}

fn is_acceptable_deletion(span: &SyntaxNode, change: &SourceChange) -> bool {
    change.is_delete() && !modifies_structure(span, change)
}

fn is_acceptable_replacement(span: &SyntaxNode, change: &SourceChange) -> bool {
    change.is_replace() && !contains_structural(&change.new_text) && !modifies_structure(span, change)
}
