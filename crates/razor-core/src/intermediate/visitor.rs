//! Read-only traversal of intermediate nodes

use super::node::{IntermediateNode, NodeKind};

/// Visitor over an intermediate node tree.
///
/// [`visit`](Self::visit) dispatches on the node kind; every hook defaults
/// to [`visit_default`](Self::visit_default), which walks the children.
/// Override only the kinds you care about.
pub trait IntermediateNodeVisitor {
    fn visit(&mut self, node: &IntermediateNode) {
        match &node.kind {
            NodeKind::Document => self.visit_document(node),
            NodeKind::Namespace { .. } => self.visit_namespace(node),
            NodeKind::Class { .. } => self.visit_class(node),
            NodeKind::Method { .. } => self.visit_method(node),
            NodeKind::Directive { .. } | NodeKind::MalformedDirective { .. } => {
                self.visit_directive(node)
            }
            NodeKind::UsingDirective { .. } => self.visit_using_directive(node),
            NodeKind::HtmlContent | NodeKind::HtmlAttribute { .. } => self.visit_html(node),
            NodeKind::CSharpCode | NodeKind::CSharpExpression => self.visit_csharp(node),
            NodeKind::IntermediateToken { .. } => self.visit_token(node),
            NodeKind::TagHelper { .. } => self.visit_tag_helper(node),
            NodeKind::TagHelperProperty { .. } => self.visit_tag_helper_property(node),
            _ => self.visit_default(node),
        }
    }

    fn visit_default(&mut self, node: &IntermediateNode) {
        for child in &node.children {
            self.visit(child);
        }
    }

    fn visit_document(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_namespace(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_class(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_method(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    /// Well-formed and malformed directives alike
    fn visit_directive(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_using_directive(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_html(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_csharp(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_token(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_tag_helper(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }

    fn visit_tag_helper_property(&mut self, node: &IntermediateNode) {
        self.visit_default(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intermediate::TokenKind;

    #[derive(Default)]
    struct TokenCounter {
        csharp: usize,
        html: usize,
    }

    impl IntermediateNodeVisitor for TokenCounter {
        fn visit_token(&mut self, node: &IntermediateNode) {
            match node.kind {
                NodeKind::IntermediateToken { kind: TokenKind::CSharp, .. } => self.csharp += 1,
                NodeKind::IntermediateToken { kind: TokenKind::Html, .. } => self.html += 1,
                _ => {}
            }
        }
    }

    #[test]
    fn test_default_hooks_reach_every_token() {
        let document = IntermediateNode::new(NodeKind::Document).with_children(vec![
            IntermediateNode::new(NodeKind::HtmlContent)
                .with_children(vec![IntermediateNode::token(TokenKind::Html, "<p>")]),
            IntermediateNode::new(NodeKind::CSharpExpression)
                .with_children(vec![IntermediateNode::token(TokenKind::CSharp, "x")]),
            IntermediateNode::new(NodeKind::TagHelperBody)
                .with_children(vec![IntermediateNode::token(TokenKind::CSharp, "y")]),
        ]);
        let mut counter = TokenCounter::default();
        counter.visit(&document);
        assert_eq!((counter.html, counter.csharp), (1, 2));
    }
}
