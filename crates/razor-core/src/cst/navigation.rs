//! Span lookup: which span owns an edit, and which spans surround a node

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use super::{AnnotationTable, NodeKey, RazorNodeExt, SpanContext, SyntaxNode};
use crate::lexer::SpanTokenizer;
use crate::source::SourceChange;

/// Find the span that should absorb `change`.
///
/// Subtrees that start after the change, or end before it, are skipped
/// without being visited. A span owns the change according to its edit
/// handler; unannotated spans use the plain handler.
pub fn locate_owner(
    node: &SyntaxNode,
    change: &SourceChange,
    annotations: &AnnotationTable,
) -> Option<SyntaxNode> {
    let start = change.start();
    if start < node.position() || start > node.end_position() {
        return None;
    }

    if node.is_span() {
        let owns = match annotations.span_context(node) {
            Some(context) => context.edit_handler.owns_change(node, change),
            None => {
                let tokenizer = if node.kind().is_code_span() {
                    SpanTokenizer::CSharp
                } else {
                    SpanTokenizer::Markup
                };
                SpanContext::default_for(tokenizer)
                    .edit_handler
                    .owns_change(node, change)
            }
        };
        return owns.then(|| node.clone());
    }

    for child in node.children() {
        if child.position() > start {
            break;
        }
        if let Some(owner) = locate_owner(&child, change, annotations) {
            return Some(owner);
        }
    }
    None
}

/// Pool of reusable traversal stacks.
///
/// A stack is handed out as a [`ScratchStack`] guard and comes back empty
/// when the guard drops, on every exit path.
#[derive(Debug, Default)]
pub struct ScratchPool {
    free: RefCell<Vec<Vec<SyntaxNode>>>,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> ScratchStack<'_> {
        let stack = self.free.borrow_mut().pop().unwrap_or_default();
        debug_assert!(stack.is_empty());
        ScratchStack { pool: self, stack }
    }

    /// Stacks currently available for reuse
    pub fn available(&self) -> usize {
        self.free.borrow().len()
    }
}

/// A stack borrowed from a [`ScratchPool`]
#[derive(Debug)]
pub struct ScratchStack<'p> {
    pool: &'p ScratchPool,
    stack: Vec<SyntaxNode>,
}

impl Deref for ScratchStack<'_> {
    type Target = Vec<SyntaxNode>;

    fn deref(&self) -> &Self::Target {
        &self.stack
    }
}

impl DerefMut for ScratchStack<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stack
    }
}

impl Drop for ScratchStack<'_> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.stack);
        stack.clear();
        self.pool.free.borrow_mut().push(stack);
    }
}

type NavigationKey = (NodeKey, usize);

/// Previous/next span lookups with per-node memoization.
///
/// A navigator belongs to one caller and one tree version; answers never go
/// stale because the tree it walks is immutable.
#[derive(Debug, Default)]
pub struct SpanNavigator {
    pool: ScratchPool,
    previous: RefCell<HashMap<NavigationKey, Option<SyntaxNode>>>,
    next: RefCell<HashMap<NavigationKey, Option<SyntaxNode>>>,
}

impl SpanNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(node: &SyntaxNode) -> NavigationKey {
        (AnnotationTable::node_key(node), node.position())
    }

    /// Nearest span that ends at or before `node` starts
    pub fn previous_span(&self, node: &SyntaxNode) -> Option<SyntaxNode> {
        let key = Self::key(node);
        if let Some(cached) = self.previous.borrow().get(&key) {
            return cached.clone();
        }
        let mut found = None;
        let mut parent = node.parent();
        while let Some(ancestor) = parent {
            let spans = self.flatten_spans(&ancestor);
            found = spans
                .into_iter()
                .rev()
                .find(|span| span.end_position() <= node.position() && span != node);
            if found.is_some() {
                break;
            }
            parent = ancestor.parent();
        }
        self.previous.borrow_mut().insert(key, found.clone());
        found
    }

    /// Nearest span that starts at or after `node` ends
    pub fn next_span(&self, node: &SyntaxNode) -> Option<SyntaxNode> {
        let key = Self::key(node);
        if let Some(cached) = self.next.borrow().get(&key) {
            return cached.clone();
        }
        let mut found = None;
        let mut parent = node.parent();
        while let Some(ancestor) = parent {
            let spans = self.flatten_spans(&ancestor);
            found = spans
                .into_iter()
                .find(|span| span.position() >= node.end_position() && span != node);
            if found.is_some() {
                break;
            }
            parent = ancestor.parent();
        }
        self.next.borrow_mut().insert(key, found.clone());
        found
    }

    /// Spans under `node` in document order
    pub fn flatten_spans(&self, node: &SyntaxNode) -> Vec<SyntaxNode> {
        let mut stack = self.pool.acquire();
        let mut spans = Vec::new();
        stack.push(node.clone());
        while let Some(current) = stack.pop() {
            if current.is_span() {
                spans.push(current);
                continue;
            }
            let children: Vec<_> = current.children().collect();
            stack.extend(children.into_iter().rev());
        }
        spans
    }

    pub fn pool(&self) -> &ScratchPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RazorParserOptions;
    use crate::cst::{RazorSyntaxTree, SyntaxKind};
    use crate::source::{SourceDocument, SourceSpan};

    fn parse(text: &str) -> RazorSyntaxTree {
        RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default())
    }

    fn change(tree: &RazorSyntaxTree, start: usize, len: usize, text: &str) -> SourceChange {
        SourceChange::new(tree.source().span(start, len), text)
    }

    #[test]
    fn test_owner_of_code_insertion() {
        let tree = parse("@{ var x = 1; }");
        let owner = locate_owner(&tree.root(), &change(&tree, 8, 0, "y"), tree.annotations())
            .expect("statement span owns insertion");
        assert_eq!(owner.kind(), SyntaxKind::CSharpStatementLiteral);
        assert!(owner.position() <= 8 && 8 <= owner.end_position());
    }

    #[test]
    fn test_change_past_end_has_no_owner() {
        let tree = parse("<p>x</p>");
        let beyond = SourceChange::new(SourceSpan::new(None, 20, 0, 20, 0, 0, 20), "y");
        assert!(locate_owner(&tree.root(), &beyond, tree.annotations()).is_none());
    }

    #[test]
    fn test_insertion_at_document_end_belongs_to_last_span() {
        let tree = parse("<p>x</p>");
        // offsets past the end clamp to the document length
        let at_end = change(&tree, 20, 0, "y");
        assert_eq!(at_end.start(), 8);
        let owner = locate_owner(&tree.root(), &at_end, tree.annotations())
            .expect("last span owns end-of-document insertion");
        assert_eq!(owner.end_position(), 8);
    }

    #[test]
    fn test_previous_and_next_span() {
        let tree = parse("<p>@x</p>");
        let root = tree.root();
        let spans = root.spans();
        let navigator = SpanNavigator::new();
        let transition = spans
            .iter()
            .find(|s| s.kind() == SyntaxKind::CSharpTransition)
            .expect("transition span");
        let previous = navigator.previous_span(transition).expect("previous");
        assert_eq!(previous.end_position(), transition.position());
        let next = navigator.next_span(transition).expect("next");
        assert_eq!(next.position(), transition.end_position());
        assert!(navigator.previous_span(&spans[0]).is_none());

        // second lookup is served from the cache
        assert_eq!(navigator.next_span(transition), Some(next));
    }

    #[test]
    fn test_scratch_stack_returns_cleared() {
        let pool = ScratchPool::new();
        {
            let tree = parse("<p>x</p>");
            let mut stack = pool.acquire();
            stack.push(tree.root());
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);
        assert!(pool.acquire().is_empty());
    }
}
