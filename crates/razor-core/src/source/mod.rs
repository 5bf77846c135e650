//! Source text model
//!
//! [`SourceDocument`] owns the text of one compilation unit and maps byte
//! offsets to line/column pairs. [`SourceReader`] is the cursor the tokenizers
//! lex from, and [`SourceChange`] describes an editor edit.

mod change;
mod document;
mod location;
mod reader;

pub use change::SourceChange;
pub use document::{DEFAULT_ENCODING, SourceDocument};
pub use location::{SourceLocation, SourceSpan};
pub use reader::SourceReader;
