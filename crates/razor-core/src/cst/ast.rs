//! Typed views over CST nodes
//!
//! Each wrapper checks the node kind in `cast()` and exposes the pieces of the
//! node's layout by name, so the rewriter and lowering never index children
//! by position.
//!
//! # Example
//!
//! ```rust
//! use razor_core::config::RazorParserOptions;
//! use razor_core::cst::ast::{AstNode, MarkupElement};
//! use razor_core::cst::RazorSyntaxTree;
//! use razor_core::source::SourceDocument;
//!
//! let tree = RazorSyntaxTree::parse(
//!     SourceDocument::new("<a href=\"/\">x</a>", None),
//!     RazorParserOptions::default(),
//! );
//! let element = tree.root().descendants().find_map(MarkupElement::cast).unwrap();
//! let start = element.start_tag().unwrap();
//! assert_eq!(start.name(), "a");
//! assert_eq!(start.attributes().next().unwrap().name(), "href");
//! ```

use std::sync::Arc;

use super::{AnnotationTable, ChunkGenerator, RazorNodeExt, SyntaxKind, SyntaxNode, SyntaxToken};
use crate::parser::directives::DirectiveDescriptor;
use crate::tag_helpers::AttributeStructure;

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

/// Tokens of a span
pub fn span_tokens(span: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    span.children_with_tokens().filter_map(|e| e.into_token())
}

/// A span made only of whitespace and newlines
pub fn is_trivia_span(node: &SyntaxNode) -> bool {
    node.is_span()
        && span_tokens(node).next().is_some()
        && span_tokens(node).all(|t| t.kind().is_trivia())
}

fn has_token(span: &SyntaxNode, kind: SyntaxKind) -> bool {
    span_tokens(span).any(|t| t.kind() == kind)
}

fn is_quote_span(node: &SyntaxNode) -> bool {
    let mut tokens = span_tokens(node);
    matches!(
        (tokens.next(), tokens.next()),
        (Some(t), None) if matches!(t.kind(), SyntaxKind::DoubleQuote | SyntaxKind::SingleQuote)
    )
}

ast_node!(
    /// Root of every tree
    RazorDocument, RazorDocument
);

impl RazorDocument {
    pub fn block(&self) -> Option<SyntaxNode> {
        self.syntax.first_child()
    }
}

ast_node!(
    /// An element, plain or rewritten into a tag helper
    MarkupElement, MarkupElement | MarkupTagHelperElement
);

impl MarkupElement {
    pub fn is_tag_helper(&self) -> bool {
        self.syntax.kind() == SyntaxKind::MarkupTagHelperElement
    }

    pub fn start_tag(&self) -> Option<StartTag> {
        self.syntax.children().find_map(StartTag::cast)
    }

    pub fn end_tag(&self) -> Option<EndTag> {
        self.syntax.children().find_map(EndTag::cast)
    }

    /// Children between the start and end tag
    pub fn body(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax
            .children()
            .filter(|child| !StartTag::can_cast(child.kind()) && !EndTag::can_cast(child.kind()))
    }

    /// Tag name, taken from the start tag or, for a stray end tag, the end tag
    pub fn name(&self) -> String {
        match (self.start_tag(), self.end_tag()) {
            (Some(start), _) => start.name(),
            (None, Some(end)) => end.name(),
            (None, None) => String::new(),
        }
    }
}

ast_node!(
    /// `<name attr=value ...>`; children are `<`, an optional `!`, the name,
    /// attribute blocks and the closing `>` or `/>`
    StartTag, MarkupStartTag | MarkupTagHelperStartTag
);

impl StartTag {
    fn spans(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax.children().filter(|c| c.is_span())
    }

    /// The `<!` opt-out marker
    pub fn bang(&self) -> Option<SyntaxNode> {
        self.spans()
            .nth(1)
            .filter(|span| span.kind() == SyntaxKind::RazorMetaCode && has_token(span, SyntaxKind::Bang))
    }

    pub fn is_bang_escaped(&self) -> bool {
        self.bang().is_some()
    }

    pub fn name_node(&self) -> Option<SyntaxNode> {
        let skip = if self.is_bang_escaped() { 2 } else { 1 };
        self.spans().nth(skip)
    }

    pub fn name(&self) -> String {
        self.name_node()
            .map(|node| node.content())
            .unwrap_or_default()
    }

    /// `<text>` tags in code, whose spans are transitions
    pub fn is_markup_transition(&self) -> bool {
        self.spans()
            .next()
            .is_some_and(|span| span.kind() == SyntaxKind::MarkupTransition)
    }

    pub fn attributes(&self) -> impl Iterator<Item = AttributeBlock> + use<> {
        self.syntax.children().filter_map(AttributeBlock::cast)
    }

    /// Every child after the name: attributes, code in the attribute area and
    /// stray content
    pub fn attribute_area(&self) -> Vec<SyntaxNode> {
        let close = self.close();
        let skip = if self.is_bang_escaped() { 3 } else { 2 };
        self.syntax
            .children()
            .skip(skip)
            .filter(|child| Some(child) != close.as_ref())
            .collect()
    }

    /// The span holding `>` or `/>`
    pub fn close(&self) -> Option<SyntaxNode> {
        self.syntax
            .last_child()
            .filter(|last| last.is_span() && has_token(last, SyntaxKind::CloseAngle))
    }

    pub fn is_self_closing(&self) -> bool {
        self.close()
            .is_some_and(|close| has_token(&close, SyntaxKind::ForwardSlash))
    }

    /// Missing its closing `>`
    pub fn is_partial(&self) -> bool {
        self.close().is_none()
    }
}

ast_node!(
    /// `</name>` as a single span, or a tag helper end tag wrapping it
    EndTag, MarkupEndTag | MarkupTagHelperEndTag
);

impl EndTag {
    pub fn span(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|c| c.is_span())
    }

    pub fn name(&self) -> String {
        self.span()
            .and_then(|span| {
                span_tokens(&span)
                    .find(|t| t.kind() == SyntaxKind::Text)
                    .map(|t| t.text().to_string())
            })
            .unwrap_or_default()
    }

    pub fn is_partial(&self) -> bool {
        !self
            .span()
            .is_some_and(|span| has_token(&span, SyntaxKind::CloseAngle))
    }
}

ast_node!(
    /// `name="value"`, minimized `name`, and their tag helper forms
    AttributeBlock,
    MarkupAttributeBlock
        | MarkupMinimizedAttributeBlock
        | MarkupTagHelperAttribute
        | MarkupMinimizedTagHelperAttribute
);

impl AttributeBlock {
    fn spans(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax.children().filter(|c| c.is_span())
    }

    pub fn is_minimized(&self) -> bool {
        matches!(
            self.syntax.kind(),
            SyntaxKind::MarkupMinimizedAttributeBlock | SyntaxKind::MarkupMinimizedTagHelperAttribute
        )
    }

    /// Whitespace before the name
    pub fn prefix(&self) -> Option<SyntaxNode> {
        self.spans().next().filter(is_trivia_span)
    }

    pub fn name_node(&self) -> Option<SyntaxNode> {
        self.spans().find(|span| !is_trivia_span(span))
    }

    pub fn name(&self) -> String {
        self.name_node()
            .map(|node| node.content())
            .unwrap_or_default()
    }

    /// `=` with the whitespace around it
    pub fn equals(&self) -> Option<SyntaxNode> {
        self.spans().find(|span| has_token(span, SyntaxKind::Equals))
    }

    pub fn open_quote(&self) -> Option<SyntaxNode> {
        let value = self.value()?;
        self.spans()
            .find(|span| is_quote_span(span) && span.position() < value.position())
    }

    pub fn close_quote(&self) -> Option<SyntaxNode> {
        let value = self.value()?;
        self.spans()
            .find(|span| is_quote_span(span) && span.position() >= value.end_position())
    }

    /// The value block: a `GenericBlock` on plain attributes
    pub fn value(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|c| {
            matches!(
                c.kind(),
                SyntaxKind::GenericBlock | SyntaxKind::MarkupTagHelperAttributeValue
            )
        })
    }

    pub fn structure(&self) -> AttributeStructure {
        if self.is_minimized() {
            return AttributeStructure::Minimized;
        }
        match self.open_quote().map(|q| q.content()) {
            Some(quote) if quote == "'" => AttributeStructure::SingleQuotes,
            Some(_) => AttributeStructure::DoubleQuotes,
            None => AttributeStructure::NoQuotes,
        }
    }

    /// Value contains code
    pub fn has_dynamic_value(&self) -> bool {
        self.value().is_some_and(|value| {
            value.descendants().any(|d| {
                matches!(
                    d.kind(),
                    SyntaxKind::MarkupDynamicAttributeValue | SyntaxKind::CSharpCodeBlock
                )
            })
        })
    }

    /// Literal value text, or `None` when the value contains code
    pub fn literal_value(&self) -> Option<String> {
        if self.has_dynamic_value() {
            return None;
        }
        Some(
            self.value()
                .map(|value| value.spans().iter().map(|s| s.content()).collect())
                .unwrap_or_default(),
        )
    }
}

ast_node!(
    /// A piece of an attribute value: literal text or code
    AttributeValue, MarkupLiteralAttributeValue | MarkupDynamicAttributeValue
);

impl AttributeValue {
    pub fn is_dynamic(&self) -> bool {
        self.syntax.kind() == SyntaxKind::MarkupDynamicAttributeValue
    }

    /// Whitespace separating this piece from the previous one
    pub fn prefix(&self) -> Option<SyntaxNode> {
        self.syntax.first_child().filter(is_trivia_span)
    }

    /// Literal text, or the code block of a dynamic piece
    pub fn content(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|c| !is_trivia_span(c))
    }
}

ast_node!(
    /// `@name tokens...` and block directives
    RazorDirective, RazorDirective
);

impl RazorDirective {
    fn body(&self) -> Option<SyntaxNode> {
        self.syntax
            .children()
            .find(|c| c.kind() == SyntaxKind::RazorDirectiveBody)
    }

    pub fn keyword(&self) -> Option<SyntaxNode> {
        self.body()?
            .children()
            .find(|c| c.kind() == SyntaxKind::RazorMetaCode)
    }

    pub fn name(&self) -> String {
        self.keyword().map(|k| k.content()).unwrap_or_default()
    }

    /// Code block holding the tokens and the optional braced body
    pub fn content(&self) -> Option<SyntaxNode> {
        self.body()?
            .children()
            .find(|c| c.kind() == SyntaxKind::CSharpCodeBlock)
    }

    pub fn descriptor(&self, annotations: &AnnotationTable) -> Option<Arc<DirectiveDescriptor>> {
        let keyword = self.keyword()?;
        match &annotations.span_context(&keyword)?.chunk_generator {
            ChunkGenerator::Directive { descriptor } => Some(descriptor.clone()),
            _ => None,
        }
    }

    /// Spans carrying directive token values, in order
    pub fn token_spans(&self, annotations: &AnnotationTable) -> Vec<SyntaxNode> {
        let Some(content) = self.content() else {
            return Vec::new();
        };
        content
            .children()
            .filter(|child| {
                child.is_span()
                    && annotations.span_context(child).is_some_and(|context| {
                        matches!(
                            context.chunk_generator,
                            ChunkGenerator::DirectiveToken { .. }
                                | ChunkGenerator::AddTagHelper { .. }
                                | ChunkGenerator::RemoveTagHelper { .. }
                                | ChunkGenerator::TagHelperPrefix { .. }
                        )
                    })
            })
            .collect()
    }
}

ast_node!(
    /// `@expr`, `@(expr)` or `@{ ... }`
    CSharpTransitionBlock, CSharpImplicitExpression | CSharpExplicitExpression | CSharpStatement
);

impl CSharpTransitionBlock {
    pub fn transition(&self) -> Option<SyntaxNode> {
        self.syntax
            .first_child()
            .filter(|c| c.kind() == SyntaxKind::CSharpTransition)
    }

    /// The expression body, or the statement block body
    pub fn body(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|c| {
            matches!(
                c.kind(),
                SyntaxKind::CSharpImplicitExpressionBody
                    | SyntaxKind::CSharpExplicitExpressionBody
                    | SyntaxKind::CSharpStatementBody
            )
        })
    }

    /// Code spans of the body, meta code excluded
    pub fn code(&self) -> String {
        self.body()
            .map(|body| {
                body.spans()
                    .iter()
                    .filter(|s| s.kind() != SyntaxKind::RazorMetaCode)
                    .map(|s| s.content())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RazorParserOptions;
    use crate::cst::RazorSyntaxTree;
    use crate::source::SourceDocument;

    fn parse(text: &str) -> RazorSyntaxTree {
        RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default())
    }

    fn first_element(tree: &RazorSyntaxTree) -> MarkupElement {
        tree.root()
            .descendants()
            .find_map(MarkupElement::cast)
            .expect("element")
    }

    #[test]
    fn test_start_tag_layout() {
        let tree = parse("<input type='text' disabled />");
        let start = first_element(&tree).start_tag().unwrap();
        assert_eq!(start.name(), "input");
        assert!(start.is_self_closing());
        assert!(!start.is_partial());
        let attributes: Vec<_> = start.attributes().collect();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name(), "type");
        assert_eq!(attributes[0].structure(), AttributeStructure::SingleQuotes);
        assert_eq!(attributes[0].literal_value().as_deref(), Some("text"));
        assert!(attributes[1].is_minimized());
        assert_eq!(attributes[1].name(), "disabled");
    }

    #[test]
    fn test_dynamic_attribute_value() {
        let tree = parse("<a href=\"~/@Model.Id\">x</a>");
        let element = first_element(&tree);
        let attribute = element.start_tag().unwrap().attributes().next().unwrap();
        assert!(attribute.has_dynamic_value());
        assert_eq!(attribute.literal_value(), None);
        assert_eq!(element.end_tag().unwrap().name(), "a");
    }

    #[test]
    fn test_bang_escaped_tag() {
        let tree = parse("<!p>x</!p>");
        let start = first_element(&tree).start_tag().unwrap();
        assert!(start.is_bang_escaped());
        assert_eq!(start.name(), "p");
    }

    #[test]
    fn test_partial_start_tag() {
        let tree = parse("<p class=\"a\"");
        let start = first_element(&tree).start_tag().unwrap();
        assert!(start.is_partial());
    }

    #[test]
    fn test_directive_view() {
        let tree = parse("@inherits Base<T>\n");
        let directive = tree
            .root()
            .descendants()
            .find_map(RazorDirective::cast)
            .expect("directive");
        assert_eq!(directive.name(), "inherits");
        assert_eq!(
            directive.descriptor(tree.annotations()).unwrap().directive,
            "inherits"
        );
        let tokens = directive.token_spans(tree.annotations());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content(), "Base<T>");
    }

    #[test]
    fn test_expression_code() {
        let tree = parse("@(1 + 2)");
        let block = tree
            .root()
            .descendants()
            .find_map(CSharpTransitionBlock::cast)
            .unwrap();
        assert_eq!(block.code(), "1 + 2");
        assert!(block.transition().is_some());
    }
}
