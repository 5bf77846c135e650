//! Text edits against a source document

use serde::{Deserialize, Serialize};

use super::SourceSpan;

/// A replacement of `span` with `new_text`.
///
/// Insertions have an empty span, deletions an empty `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceChange {
    pub span: SourceSpan,
    pub new_text: String,
}

impl SourceChange {
    pub fn new(span: SourceSpan, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }

    pub fn start(&self) -> usize {
        self.span.absolute_index
    }

    pub fn end(&self) -> usize {
        self.span.absolute_index + self.span.length
    }

    pub fn is_insert(&self) -> bool {
        self.span.length == 0 && !self.new_text.is_empty()
    }

    pub fn is_delete(&self) -> bool {
        self.span.length > 0 && self.new_text.is_empty()
    }

    pub fn is_replace(&self) -> bool {
        self.span.length > 0 && !self.new_text.is_empty()
    }

    /// Apply the change to `content`, a region that begins at `content_start`.
    ///
    /// Returns `None` when the change does not fall inside the region.
    pub fn get_edited_content(&self, content: &str, content_start: usize) -> Option<String> {
        let relative = self.start().checked_sub(content_start)?;
        let relative_end = relative + self.span.length;
        if relative_end > content.len()
            || !content.is_char_boundary(relative)
            || !content.is_char_boundary(relative_end)
        {
            return None;
        }

        let mut edited =
            String::with_capacity(content.len() - self.span.length + self.new_text.len());
        edited.push_str(&content[..relative]);
        edited.push_str(&self.new_text);
        edited.push_str(&content[relative_end..]);
        Some(edited)
    }

    /// Text the change removes from `content`, a region that begins at `content_start`
    pub fn old_text<'a>(&self, content: &'a str, content_start: usize) -> Option<&'a str> {
        let relative = self.start().checked_sub(content_start)?;
        content.get(relative..relative + self.span.length)
    }
}
