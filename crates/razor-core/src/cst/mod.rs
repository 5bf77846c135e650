//! Concrete syntax tree for Razor documents
//!
//! The tree uses rowan's green/red split:
//!
//! - **Green nodes** are immutable, positionless and reference counted. Every
//!   edit produces a new root that shares all untouched subtrees with the old
//!   one.
//! - **Red nodes** add absolute positions and parent links. They are built
//!   lazily while walking and are never cached across tree versions.
//!
//! Leaf nodes are *spans*: blocks whose children are tokens. The chunk
//! generator and edit handler of a span live in an [`AnnotationTable`] keyed by
//! green node identity, so attaching metadata never reshapes the tree.
//!
//! ## Example
//!
//! ```rust
//! use razor_core::config::RazorParserOptions;
//! use razor_core::cst::{RazorNodeExt, RazorSyntaxTree};
//! use razor_core::source::SourceDocument;
//!
//! let text = "<p>@DateTime.Now</p>";
//! let tree = RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default());
//!
//! let joined: String = tree.root().spans().iter().map(|s| s.content()).collect();
//! assert_eq!(joined, text);
//! ```

mod annotations;
mod language;
mod nodes;
mod span_context;
mod syntax_kind;
mod tree;

pub mod ast;
pub mod dump;
pub mod navigation;

pub use annotations::{
    AnnotationTable, AnnotationValue, NodeKey, SPAN_CONTEXT, SyntaxAnnotation,
    TAG_HELPER_ATTRIBUTE_INFO, TAG_HELPER_INFO,
};
pub use language::{RazorLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use navigation::{ScratchPool, SpanNavigator, locate_owner};
pub use nodes::{GreenElement, RazorNodeExt, green_node, green_span};
pub use span_context::{ChunkGenerator, SpanContext};
pub use syntax_kind::SyntaxKind;
pub use tree::RazorSyntaxTree;
