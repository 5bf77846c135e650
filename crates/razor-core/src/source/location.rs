//! Source locations and spans
//!
//! All indices are UTF-8 byte offsets into the owning [`SourceDocument`](super::SourceDocument).
//! `character_index` is the byte distance from the start of the line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A single point in a source document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_path: Option<Arc<str>>,
    pub absolute_index: usize,
    pub line_index: usize,
    /// Byte column; see [`SourceDocument::char_column`](super::SourceDocument::char_column)
    pub character_index: usize,
}

impl SourceLocation {
    pub fn new(
        file_path: Option<Arc<str>>,
        absolute_index: usize,
        line_index: usize,
        character_index: usize,
    ) -> Self {
        Self {
            file_path,
            absolute_index,
            line_index,
            character_index,
        }
    }

    /// A location that does not belong to any document
    pub fn undefined() -> Self {
        Self::new(None, 0, 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_path {
            Some(path) => write!(
                f,
                "{}({},{})",
                path,
                self.line_index + 1,
                self.character_index + 1
            ),
            None => write!(f, "({},{})", self.line_index + 1, self.character_index + 1),
        }
    }
}

/// A range of source text starting at a location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpan {
    pub file_path: Option<Arc<str>>,
    pub absolute_index: usize,
    pub line_index: usize,
    pub character_index: usize,
    pub length: usize,
    /// Number of line breaks crossed by the span
    pub line_count: usize,
    /// Byte offset of the span end within its last line
    pub end_character_index: usize,
}

impl SourceSpan {
    pub fn new(
        file_path: Option<Arc<str>>,
        absolute_index: usize,
        line_index: usize,
        character_index: usize,
        length: usize,
        line_count: usize,
        end_character_index: usize,
    ) -> Self {
        Self {
            file_path,
            absolute_index,
            line_index,
            character_index,
            length,
            line_count,
            end_character_index,
        }
    }

    /// A single-line span starting at `location`
    pub fn from_location(location: &SourceLocation, length: usize) -> Self {
        Self::new(
            location.file_path.clone(),
            location.absolute_index,
            location.line_index,
            location.character_index,
            length,
            0,
            location.character_index + length,
        )
    }

    pub fn undefined() -> Self {
        Self::new(None, 0, 0, 0, 0, 0, 0)
    }

    pub fn end(&self) -> usize {
        self.absolute_index + self.length
    }

    pub fn start_location(&self) -> SourceLocation {
        SourceLocation::new(
            self.file_path.clone(),
            self.absolute_index,
            self.line_index,
            self.character_index,
        )
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.absolute_index && offset < self.end()
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{},{} [{}])",
            self.absolute_index, self.line_index, self.character_index, self.length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display_is_one_based() {
        let location = SourceLocation::new(Some("Index.cshtml".into()), 12, 1, 4);
        assert_eq!(location.to_string(), "Index.cshtml(2,5)");
    }

    #[test]
    fn test_span_from_location() {
        let location = SourceLocation::new(None, 10, 2, 3);
        let span = SourceSpan::from_location(&location, 4);
        assert_eq!(span.end(), 14);
        assert_eq!(span.end_character_index, 7);
        assert!(span.contains(13));
        assert!(!span.contains(14));
    }

    #[test]
    fn test_span_serializes_camel_case() {
        let span = SourceSpan::new(None, 1, 0, 1, 1, 0, 2);
        let json = serde_json::to_string(&span).unwrap();
        assert!(json.contains("\"absoluteIndex\":1"));
        assert!(json.contains("\"endCharacterIndex\":2"));
    }
}
