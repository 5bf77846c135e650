//! Green node construction and red node helpers

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::{SyntaxKind, SyntaxNode};
use crate::lexer::Token;

/// Green child of a block: a node or a token
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Build a green block.
///
/// Nodes are built without rowan's node cache, so two structurally equal
/// spans never share an allocation and keep distinct annotation keys.
pub fn green_node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenNode {
    GreenNode::new(kind.into(), children)
}

/// Build a green span from lexer tokens
pub fn green_span<'a>(kind: SyntaxKind, tokens: impl IntoIterator<Item = Token<'a>>) -> GreenNode {
    debug_assert!(kind.is_span());
    let children: Vec<GreenElement> = tokens
        .into_iter()
        .map(|token| NodeOrToken::Token(GreenToken::new(token.kind.into(), &token.text)))
        .collect();
    GreenNode::new(kind.into(), children)
}

/// Position and content helpers for red nodes
pub trait RazorNodeExt {
    /// Absolute offset of the node
    fn position(&self) -> usize;
    /// `position() + full_width()`
    fn end_position(&self) -> usize;
    fn full_width(&self) -> usize;
    /// Concatenated token text
    fn content(&self) -> String;
    fn is_span(&self) -> bool;
    /// Depth-first span descendants, `self` included when it is a span
    fn spans(&self) -> Vec<SyntaxNode>;
}

impl RazorNodeExt for SyntaxNode {
    fn position(&self) -> usize {
        u32::from(self.text_range().start()) as usize
    }

    fn end_position(&self) -> usize {
        u32::from(self.text_range().end()) as usize
    }

    fn full_width(&self) -> usize {
        u32::from(self.text_range().len()) as usize
    }

    fn content(&self) -> String {
        self.text().to_string()
    }

    fn is_span(&self) -> bool {
        self.kind().is_span()
    }

    fn spans(&self) -> Vec<SyntaxNode> {
        self.descendants().filter(|node| node.kind().is_span()).collect()
    }
}
