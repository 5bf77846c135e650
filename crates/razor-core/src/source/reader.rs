//! Seekable character cursor used by both tokenizers

use super::{SourceDocument, SourceLocation};

/// Cached bounds of the line containing the cursor
#[derive(Debug, Clone, Copy)]
struct LineWindow {
    index: usize,
    start: usize,
    end: usize,
}

/// A character cursor over a [`SourceDocument`].
///
/// The line containing the cursor is cached, so sequential reads and seeks to
/// the neighbouring lines never touch the document's line table.
#[derive(Debug, Clone)]
pub struct SourceReader<'a> {
    document: &'a SourceDocument,
    position: usize,
    line: LineWindow,
}

impl<'a> SourceReader<'a> {
    pub fn new(document: &'a SourceDocument) -> Self {
        let (start, length) = document.line_bounds(0);
        Self {
            document,
            position: 0,
            line: LineWindow {
                index: 0,
                start,
                end: start + length,
            },
        }
    }

    pub fn document(&self) -> &'a SourceDocument {
        self.document
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Seek to an absolute byte offset, clamped to the document length.
    pub fn set_position(&mut self, position: usize) {
        let position = position.min(self.document.len());
        debug_assert!(self.document.text().is_char_boundary(position));
        self.position = position;
        self.update_line();
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.document.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Character `n` places ahead of the cursor (`peek_nth(0) == peek()`)
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    pub fn read(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        if self.position >= self.line.end {
            self.update_line();
        }
        Some(ch)
    }

    /// Advance by `len` bytes, which must end on a character boundary
    pub fn advance(&mut self, len: usize) {
        self.set_position(self.position + len);
    }

    pub fn remaining(&self) -> &'a str {
        &self.document.text()[self.position..]
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(
            self.document.file_path().cloned(),
            self.position,
            self.line.index,
            self.position - self.line.start,
        )
    }

    fn update_line(&mut self) {
        let position = self.position;
        if self.window_contains(self.line, position) {
            return;
        }

        let last = self.document.line_count() - 1;
        let candidates = [
            (self.line.index < last).then(|| self.line.index + 1),
            self.line.index.checked_sub(1),
        ];
        for index in candidates.into_iter().flatten() {
            let window = self.window(index);
            if self.window_contains(window, position) {
                self.line = window;
                return;
            }
        }

        self.line = self.window(self.document.line_index(position));
    }

    fn window(&self, index: usize) -> LineWindow {
        let (start, length) = self.document.line_bounds(index);
        LineWindow {
            index,
            start,
            end: start + length,
        }
    }

    fn window_contains(&self, window: LineWindow, position: usize) -> bool {
        let is_last = window.index + 1 == self.document.line_count();
        position >= window.start && (position < window.end || (is_last && position == window.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let document = SourceDocument::new("", None);
        let mut reader = SourceReader::new(&document);
        assert_eq!(reader.peek(), None);
        assert_eq!(reader.read(), None);
        assert_eq!(reader.location().line_index, 0);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_sequential_reads_track_lines() {
        let document = SourceDocument::new("ab\r\ncd\ne", None);
        let mut reader = SourceReader::new(&document);
        let mut seen = Vec::new();
        while let Some(ch) = reader.read() {
            let location = reader.location();
            seen.push((ch, location.line_index, location.character_index));
        }
        assert_eq!(seen[1], ('b', 0, 2));
        assert_eq!(seen[3], ('\n', 1, 0));
        assert_eq!(seen[6], ('\n', 2, 0));
        assert_eq!(seen[7], ('e', 2, 1));
    }

    #[test]
    fn test_seek_matches_document_lookup() {
        let text = "line one\nline two\r\n\nline four\rfive";
        let document = SourceDocument::new(text, None);
        let mut reader = SourceReader::new(&document);
        for position in [30, 3, 12, 19, 20, 0, text.len(), 9, 8] {
            reader.set_position(position);
            assert_eq!(reader.location(), document.get_location(position));
        }
    }

    #[test]
    fn test_seek_to_end_pins_last_line() {
        let document = SourceDocument::new("a\nb\n", None);
        let mut reader = SourceReader::new(&document);
        reader.set_position(4);
        assert_eq!(reader.peek(), None);
        assert_eq!(reader.location().line_index, 2);
        reader.set_position(100);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_peek_nth_multibyte() {
        let document = SourceDocument::new("é@*", None);
        let mut reader = SourceReader::new(&document);
        assert_eq!(reader.peek_nth(1), Some('@'));
        reader.read();
        assert_eq!(reader.position(), 2);
        assert!(reader.starts_with("@*"));
    }
}
