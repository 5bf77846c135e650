//! Immutable source text with a precomputed line table

use std::path::Path;
use std::sync::Arc;

use super::{SourceChange, SourceLocation, SourceSpan};
use crate::error::RazorError;
use crate::result::Result;

/// Text encoding reported for documents read from disk or created in memory
pub const DEFAULT_ENCODING: &str = "utf-8";

/// A single compilation unit's text.
///
/// Lines include their terminator (`\r\n`, `\n` or a lone `\r`). A document
/// ending in a line break has a trailing empty line, so the end-of-document
/// offset always maps to the last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    text: String,
    file_path: Option<Arc<str>>,
    relative_path: Option<Arc<str>>,
    encoding: &'static str,
    line_starts: Vec<usize>,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>, file_path: Option<&str>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self {
            text,
            file_path: file_path.map(Arc::from),
            relative_path: None,
            encoding: DEFAULT_ENCODING,
            line_starts,
        }
    }

    /// Attach the project-relative path of the document
    pub fn with_relative_path(mut self, relative_path: &str) -> Self {
        self.relative_path = Some(Arc::from(relative_path));
        self
    }

    /// Read a document from disk
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| RazorError::io_error(path, e))?;
        Ok(Self::new(text, Some(&path.to_string_lossy())))
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

    pub fn file_path(&self) -> Option<&Arc<str>> {
        self.file_path.as_ref()
    }

    pub fn relative_path(&self) -> Option<&Arc<str>> {
        self.relative_path.as_ref()
    }

    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Start offset and length (terminator included) of a line
    pub fn line_bounds(&self, line_index: usize) -> (usize, usize) {
        let start = self.line_starts[line_index];
        let end = self
            .line_starts
            .get(line_index + 1)
            .copied()
            .unwrap_or(self.text.len());
        (start, end - start)
    }

    /// Line containing `absolute_index`; offsets past the end pin to the last line
    pub fn line_index(&self, absolute_index: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= absolute_index)
            .saturating_sub(1)
    }

    pub fn get_location(&self, absolute_index: usize) -> SourceLocation {
        let absolute_index = absolute_index.min(self.text.len());
        let line = self.line_index(absolute_index);
        SourceLocation::new(
            self.file_path.clone(),
            absolute_index,
            line,
            absolute_index - self.line_starts[line],
        )
    }

    /// Column of `absolute_index` counted in characters rather than bytes
    pub fn char_column(&self, absolute_index: usize) -> usize {
        let location = self.get_location(absolute_index);
        let line_start = location.absolute_index - location.character_index;
        self.text
            .get(line_start..location.absolute_index)
            .map_or(location.character_index, |prefix| prefix.chars().count())
    }

    pub fn span(&self, absolute_index: usize, length: usize) -> SourceSpan {
        let start = self.get_location(absolute_index);
        let end = self.get_location(absolute_index + length);
        SourceSpan::new(
            self.file_path.clone(),
            start.absolute_index,
            start.line_index,
            start.character_index,
            end.absolute_index - start.absolute_index,
            end.line_index - start.line_index,
            end.character_index,
        )
    }

    /// Produce a new document with `change` applied
    pub fn with_change(&self, change: &SourceChange) -> Result<Self> {
        let end = change.span.absolute_index + change.span.length;
        if end > self.text.len()
            || !self.text.is_char_boundary(change.span.absolute_index)
            || !self.text.is_char_boundary(end)
        {
            return Err(RazorError::invalid_argument(
                "change",
                format!(
                    "span {}..{} is outside the document or splits a character",
                    change.span.absolute_index, end
                ),
            ));
        }

        let mut text = String::with_capacity(self.text.len() + change.new_text.len());
        text.push_str(&self.text[..change.span.absolute_index]);
        text.push_str(&change.new_text);
        text.push_str(&self.text[end..]);

        let mut document = Self::new(text, None);
        document.file_path = self.file_path.clone();
        document.relative_path = self.relative_path.clone();
        Ok(document)
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                i += 2;
                starts.push(i);
            }
            b'\r' | b'\n' => {
                i += 1;
                starts.push(i);
            }
            _ => i += 1,
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_table_handles_all_terminators() {
        let document = SourceDocument::new("a\r\nb\nc\rd", None);
        assert_eq!(document.line_count(), 4);
        assert_eq!(document.line_bounds(0), (0, 3));
        assert_eq!(document.line_bounds(3), (7, 1));
    }

    #[test]
    fn test_char_column_counts_multibyte_characters() {
        let document = SourceDocument::new("x\néé@y", None);
        let at = document.text().find('@').unwrap();
        assert_eq!(document.get_location(at).character_index, 4);
        assert_eq!(document.char_column(at), 2);
        assert_eq!(document.char_column(0), 0);
    }

    #[test]
    fn test_get_location() {
        let document = SourceDocument::new("<p>\n  @name\n</p>", Some("Index.cshtml"));
        let location = document.get_location(6);
        assert_eq!(location.line_index, 1);
        assert_eq!(location.character_index, 2);
        assert_eq!(location.file_path.as_deref(), Some("Index.cshtml"));
    }

    #[test]
    fn test_end_of_document_pins_to_last_line() {
        let document = SourceDocument::new("ab\n", None);
        let location = document.get_location(3);
        assert_eq!(location.line_index, 1);
        assert_eq!(location.character_index, 0);

        let empty = SourceDocument::new("", None);
        assert_eq!(empty.get_location(0).line_index, 0);
    }

    #[test]
    fn test_absolute_index_is_sum_of_previous_lines() {
        let document = SourceDocument::new("one\ntwo\r\nthree", None);
        for offset in 0..=document.len() {
            let location = document.get_location(offset);
            let previous: usize = (0..location.line_index)
                .map(|line| document.line_bounds(line).1)
                .sum();
            assert_eq!(previous + location.character_index, offset);
        }
    }

    #[test]
    fn test_multi_line_span() {
        let document = SourceDocument::new("ab\ncd\nef", None);
        let span = document.span(1, 6);
        assert_eq!(span.line_index, 0);
        assert_eq!(span.line_count, 2);
        assert_eq!(span.end_character_index, 1);
    }

    #[test]
    fn test_with_change() {
        let document = SourceDocument::new("Hello @name", Some("a.cshtml"));
        let change = SourceChange::new(document.span(6, 0), "x");
        let edited = document.with_change(&change).unwrap();
        assert_eq!(edited.text(), "Hello x@name");
        assert_eq!(edited.file_path().map(|p| &**p), Some("a.cshtml"));
    }

    #[test]
    fn test_with_change_out_of_range() {
        let document = SourceDocument::new("abc", None);
        let change = SourceChange::new(SourceSpan::new(None, 2, 0, 2, 5, 0, 7), "");
        assert!(document.with_change(&change).is_err());
    }
}
