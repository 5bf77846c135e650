//! Lowering a rewritten syntax tree into intermediate nodes
//!
//! The walk is driven by each span's chunk generator: markup spans become
//! `HtmlContent`, statement and expression spans become C# nodes, and spans
//! that generate nothing (transitions, meta code, comments) are dropped.
//! Directives, tag helpers and attributes with code in their values get
//! structured nodes of their own.

use std::ops::Range;

use super::node::{IntermediateNode, IntermediateNodeBuilder, NodeKind, TokenKind};
use crate::cst::ast::{AstNode, AttributeBlock, AttributeValue, MarkupElement, RazorDirective};
use crate::cst::{ChunkGenerator, RazorNodeExt, RazorSyntaxTree, SyntaxKind, SyntaxNode};
use crate::source::SourceSpan;
use crate::tag_helpers::TagHelperInfo;

/// Lower `tree` into a flat document node; classification into
/// namespace, class and method happens in the passes
pub fn lower_document(tree: &RazorSyntaxTree) -> IntermediateNode {
    let mut lowering = Lowering {
        tree,
        builder: IntermediateNodeBuilder::new(IntermediateNode::new(NodeKind::Document)),
    };
    lowering.visit(&tree.root());
    let document = lowering.builder.build();
    tracing::debug!(nodes = document.descendants().count(), "lowered document");
    document
}

/// One piece of an attribute value
enum ValuePiece {
    Literal { prefix: String, text: String },
    Code { prefix: String, code: String },
}

struct Lowering<'a> {
    tree: &'a RazorSyntaxTree,
    builder: IntermediateNodeBuilder,
}

impl Lowering<'_> {
    fn source_span(&self, node: &SyntaxNode) -> SourceSpan {
        self.tree.source().span(node.position(), node.full_width())
    }

    fn generator(&self, span: &SyntaxNode) -> ChunkGenerator {
        self.tree.span_context(span).chunk_generator.clone()
    }

    fn visit(&mut self, node: &SyntaxNode) {
        match node.kind() {
            SyntaxKind::RazorDirective => self.lower_directive(node),
            SyntaxKind::MarkupTagHelperElement => self.lower_tag_helper(node),
            SyntaxKind::MarkupAttributeBlock => self.lower_markup_attribute(node),
            SyntaxKind::CSharpImplicitExpression | SyntaxKind::CSharpExplicitExpression => {
                self.lower_expression(node)
            }
            _ if node.is_span() => self.lower_span(node),
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            self.visit(&child);
        }
    }

    fn lower_span(&mut self, span: &SyntaxNode) {
        let content = span.content();
        if content.is_empty() {
            return;
        }
        match self.generator(span) {
            ChunkGenerator::Markup => self.add_html(span, content),
            ChunkGenerator::Statement => {
                let node = IntermediateNode::new(NodeKind::CSharpCode)
                    .with_source(self.source_span(span))
                    .with_children(vec![IntermediateNode::token(TokenKind::CSharp, content)]);
                self.builder.add(node);
            }
            ChunkGenerator::Expression => {
                let node = IntermediateNode::new(NodeKind::CSharpExpression)
                    .with_source(self.source_span(span))
                    .with_children(vec![IntermediateNode::token(TokenKind::CSharp, content)]);
                self.builder.add(node);
            }
            ChunkGenerator::AddImport {
                namespace,
                is_static,
            } => {
                let node = IntermediateNode::new(NodeKind::UsingDirective {
                    content: namespace,
                    is_static,
                })
                .with_source(self.source_span(span));
                self.builder.add(node);
            }
            _ => {}
        }
    }

    /// Adjacent markup merges into one `HtmlContent`
    fn add_html(&mut self, span: &SyntaxNode, content: String) {
        let source = self.source_span(span);
        let document = self.tree.source().clone();
        let current = self.builder.current();
        if let Some(last) = current.children.last_mut() {
            let adjacent = last.kind == NodeKind::HtmlContent
                && last
                    .source
                    .as_ref()
                    .is_some_and(|previous| previous.end() == source.absolute_index);
            if adjacent {
                if let Some(NodeKind::IntermediateToken { content: text, .. }) =
                    last.children.first_mut().map(|token| &mut token.kind)
                {
                    text.push_str(&content);
                }
                let start = last.source.as_ref().map_or(source.absolute_index, |s| s.absolute_index);
                last.source = Some(document.span(start, source.end() - start));
                return;
            }
        }
        current.children.push(
            IntermediateNode::new(NodeKind::HtmlContent)
                .with_source(source)
                .with_children(vec![IntermediateNode::token(TokenKind::Html, content)]),
        );
    }

    fn lower_expression(&mut self, node: &SyntaxNode) {
        let code = self.code_of(node);
        let expression = IntermediateNode::new(NodeKind::CSharpExpression)
            .with_source(self.source_span(node))
            .with_children(vec![IntermediateNode::token(TokenKind::CSharp, code)]);
        self.builder.add(expression);
    }

    /// Text of the expression and statement spans under `node`
    fn code_of(&self, node: &SyntaxNode) -> String {
        node.spans()
            .iter()
            .filter(|span| {
                matches!(
                    self.generator(span),
                    ChunkGenerator::Expression | ChunkGenerator::Statement
                )
            })
            .map(|span| span.content())
            .collect()
    }

    fn lower_directive(&mut self, node: &SyntaxNode) {
        let Some(directive) = RazorDirective::cast(node.clone()) else {
            return self.visit_children(node);
        };
        let annotations = self.tree.annotations();
        let Some(descriptor) = directive.descriptor(annotations) else {
            // `@using` and other directive-shaped imports
            return self.visit_children(node);
        };

        let source = self.source_span(node);
        let body = directive.content().as_ref().and_then(brace_body_range);
        let diagnostics: Vec<_> = self
            .tree
            .diagnostics()
            .iter()
            .filter(|diagnostic| {
                let at = diagnostic.span.absolute_index;
                at >= source.absolute_index
                    && at <= source.end()
                    && !body.as_ref().is_some_and(|body| body.contains(&at))
            })
            .cloned()
            .collect();

        let name = descriptor.directive.clone();
        let kind = if diagnostics.is_empty() {
            NodeKind::Directive { name, descriptor }
        } else {
            NodeKind::MalformedDirective { name, descriptor }
        };
        let mut directive_node = IntermediateNode::new(kind).with_source(source);
        directive_node.diagnostics = diagnostics;
        self.builder.push(directive_node);

        for token in directive.token_spans(annotations) {
            let descriptor = match self.generator(&token) {
                ChunkGenerator::DirectiveToken { descriptor } => Some(descriptor),
                _ => None,
            };
            let content = token.content();
            let token_node = IntermediateNode::new(NodeKind::DirectiveToken { content, descriptor })
                .with_source(self.source_span(&token));
            self.builder.add(token_node);
        }
        if let Some(content) = directive.content() {
            self.visit_children(&content);
        }
        self.builder.pop();
    }

    /// Attributes of plain elements; only values with code need structure
    fn lower_markup_attribute(&mut self, node: &SyntaxNode) {
        let Some(attribute) = AttributeBlock::cast(node.clone()) else {
            return self.visit_children(node);
        };
        let Some(value) = attribute.value().filter(|_| attribute.has_dynamic_value()) else {
            return self.visit_children(node);
        };

        let mut prefix = String::new();
        let mut suffix = String::new();
        for child in node.children() {
            if child.position() < value.position() {
                prefix.push_str(&child.content());
            } else if child.position() >= value.end_position() && child != value {
                suffix.push_str(&child.content());
            }
        }
        let html_attribute = IntermediateNode::new(NodeKind::HtmlAttribute {
            attribute_name: attribute.name(),
            prefix,
            suffix,
        })
        .with_source(self.source_span(node));
        self.builder.push(html_attribute);

        for (piece, source) in self.value_pieces(&value) {
            let node = match piece {
                ValuePiece::Literal { prefix, text } => {
                    IntermediateNode::new(NodeKind::HtmlAttributeValue { prefix })
                        .with_children(vec![IntermediateNode::token(TokenKind::Html, text)])
                }
                ValuePiece::Code { prefix, code } => {
                    IntermediateNode::new(NodeKind::CSharpExpressionAttributeValue { prefix })
                        .with_children(vec![IntermediateNode::token(TokenKind::CSharp, code)])
                }
            };
            self.builder.add(node.with_source(source));
        }
        self.builder.pop();
    }

    fn value_pieces(&self, value: &SyntaxNode) -> Vec<(ValuePiece, SourceSpan)> {
        let mut pieces = Vec::new();
        for child in value.children() {
            let source = self.source_span(&child);
            let piece = match AttributeValue::cast(child.clone()) {
                Some(piece) => {
                    let prefix = piece.prefix().map(|p| p.content()).unwrap_or_default();
                    let content = piece.content();
                    if piece.is_dynamic() {
                        let code = content.map(|c| self.code_of(&c)).unwrap_or_default();
                        ValuePiece::Code { prefix, code }
                    } else {
                        let text = content.map(|c| c.content()).unwrap_or_default();
                        ValuePiece::Literal { prefix, text }
                    }
                }
                None => ValuePiece::Literal {
                    prefix: String::new(),
                    text: child.content(),
                },
            };
            pieces.push((piece, source));
        }
        pieces
    }

    fn lower_tag_helper(&mut self, node: &SyntaxNode) {
        let info = self.tree.annotations().tag_helper_info(node).cloned();
        let (Some(info), Some(element)) = (info, MarkupElement::cast(node.clone())) else {
            return self.visit_children(node);
        };

        let tag_helper = IntermediateNode::new(NodeKind::TagHelper {
            tag_name: info.tag_name.clone(),
            tag_mode: info.tag_mode,
            descriptors: info.binding.descriptors().cloned().collect(),
        })
        .with_source(self.source_span(node));
        self.builder.push(tag_helper);

        self.builder.push(IntermediateNode::new(NodeKind::TagHelperBody));
        for child in element.body() {
            self.visit(&child);
        }
        self.builder.pop();

        if let Some(start) = element.start_tag() {
            for attribute in start.attributes() {
                self.lower_tag_helper_attribute(&attribute, &info);
            }
        }
        self.builder.pop();
    }

    fn lower_tag_helper_attribute(&mut self, attribute: &AttributeBlock, info: &TagHelperInfo) {
        let name = attribute.name();
        let structure = self
            .tree
            .annotations()
            .tag_helper_attribute_info(attribute.syntax())
            .map_or_else(|| attribute.structure(), |info| info.attribute_structure);
        let source = self.source_span(attribute.syntax());
        let pieces = attribute
            .value()
            .map(|value| self.value_pieces(&value))
            .unwrap_or_default();

        let mut bound_any = false;
        for descriptor in info.binding.descriptors() {
            let Some(bound) = descriptor.bound_attribute(&name) else {
                continue;
            };
            bound_any = true;
            let is_indexer_name_match = !bound.matches_name(&name);
            let is_string = if is_indexer_name_match {
                bound.is_indexer_string_property()
            } else {
                bound.is_string_property()
            };
            let children = if is_string {
                html_value(&pieces)
            } else {
                csharp_value(&pieces)
            };
            let property = IntermediateNode::new(NodeKind::TagHelperProperty {
                attribute_name: name.clone(),
                attribute_structure: structure,
                bound_attribute: bound.clone(),
                descriptor: descriptor.clone(),
                is_indexer_name_match,
            })
            .with_source(source.clone())
            .with_children(children);
            self.builder.add(property);
        }

        if !bound_any {
            let html = IntermediateNode::new(NodeKind::TagHelperHtmlAttribute {
                attribute_name: name,
                attribute_structure: structure,
            })
            .with_source(source)
            .with_children(html_value(&pieces));
            self.builder.add(html);
        }
    }
}

/// Literal runs as `HtmlContent`, code as `CSharpExpression`
fn html_value(pieces: &[(ValuePiece, SourceSpan)]) -> Vec<IntermediateNode> {
    let mut nodes: Vec<IntermediateNode> = Vec::new();
    for (piece, source) in pieces {
        match piece {
            ValuePiece::Literal { prefix, text } => {
                let text = format!("{prefix}{text}");
                if let Some(last) = nodes.last_mut().filter(|n| n.kind == NodeKind::HtmlContent) {
                    if let Some(NodeKind::IntermediateToken { content, .. }) =
                        last.children.first_mut().map(|token| &mut token.kind)
                    {
                        content.push_str(&text);
                    }
                    continue;
                }
                nodes.push(
                    IntermediateNode::new(NodeKind::HtmlContent)
                        .with_source(source.clone())
                        .with_children(vec![IntermediateNode::token(TokenKind::Html, text)]),
                );
            }
            ValuePiece::Code { prefix, code } => {
                if !prefix.is_empty() {
                    nodes.push(
                        IntermediateNode::new(NodeKind::HtmlContent)
                            .with_children(vec![IntermediateNode::token(TokenKind::Html, prefix.clone())]),
                    );
                }
                nodes.push(
                    IntermediateNode::new(NodeKind::CSharpExpression)
                        .with_source(source.clone())
                        .with_children(vec![IntermediateNode::token(TokenKind::CSharp, code.clone())]),
                );
            }
        }
    }
    nodes
}

/// Every piece as a C# token; the value of a non-string property is code
fn csharp_value(pieces: &[(ValuePiece, SourceSpan)]) -> Vec<IntermediateNode> {
    pieces
        .iter()
        .map(|(piece, source)| {
            let content = match piece {
                ValuePiece::Literal { prefix, text } => format!("{prefix}{text}"),
                ValuePiece::Code { prefix, code } => format!("{prefix}{code}"),
            };
            IntermediateNode::token(TokenKind::CSharp, content).with_source(source.clone())
        })
        .collect()
}

/// Offsets strictly between a directive's `{` and `}`
fn brace_body_range(content: &SyntaxNode) -> Option<Range<usize>> {
    let braces: Vec<SyntaxNode> = content
        .children()
        .filter(|child| child.kind() == SyntaxKind::RazorMetaCode)
        .collect();
    let open = braces.iter().find(|brace| brace.content() == "{")?;
    let close = braces
        .iter()
        .rev()
        .find(|brace| brace.content() == "}")
        .map_or(content.end_position(), |close| close.position());
    Some(open.end_position()..close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RazorParserOptions;
    use crate::source::SourceDocument;

    fn lower(text: &str) -> IntermediateNode {
        let tree = RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default());
        lower_document(&tree)
    }

    fn names(node: &IntermediateNode) -> Vec<&'static str> {
        node.children.iter().map(|child| child.name()).collect()
    }

    #[test]
    fn test_markup_merges_into_one_html_content() {
        let document = lower("<p class=\"a\">hello</p>");
        assert_eq!(names(&document), ["HtmlContent"]);
        assert_eq!(document.content(), "<p class=\"a\">hello</p>");
        let source = document.children[0].source.as_ref().unwrap();
        assert_eq!((source.absolute_index, source.length), (0, 22));
    }

    #[test]
    fn test_expressions() {
        let document = lower("a @Name b @(1 + 2)");
        assert_eq!(
            names(&document),
            ["HtmlContent", "CSharpExpression", "HtmlContent", "CSharpExpression"]
        );
        assert_eq!(document.children[1].content(), "Name");
        assert_eq!(document.children[3].content(), "1 + 2");
    }

    #[test]
    fn test_statement_block_lowers_to_code() {
        let document = lower("@{ var x = 1; }");
        let code: String = document
            .find_descendants(|n| n.kind == NodeKind::CSharpCode)
            .map(|n| n.content())
            .collect();
        assert_eq!(code, " var x = 1; ");
    }

    #[test]
    fn test_escaped_transition_keeps_one_at() {
        let document = lower("a@@b");
        assert_eq!(document.content(), "a@b");
    }

    #[test]
    fn test_using_directive() {
        let document = lower("@using System.Text\n");
        let using = document
            .find_descendants(|n| matches!(n.kind, NodeKind::UsingDirective { .. }))
            .next()
            .unwrap();
        assert_eq!(
            using.kind,
            NodeKind::UsingDirective {
                content: "System.Text".to_string(),
                is_static: false
            }
        );
    }

    #[test]
    fn test_directive_tokens() {
        let document = lower("@model MyApp.Models.Person\n");
        let directive = &document.children[0];
        assert_eq!(directive.kind.directive_name(), Some("model"));
        assert_eq!(names(directive), ["DirectiveToken"]);
        match &directive.children[0].kind {
            NodeKind::DirectiveToken { content, descriptor } => {
                assert_eq!(content, "MyApp.Models.Person");
                assert!(descriptor.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_trailing_literal_makes_directive_malformed() {
        let document = lower("@page \"/route\" Invalid");
        let directive = &document.children[0];
        assert!(matches!(directive.kind, NodeKind::MalformedDirective { .. }));
        assert_eq!(directive.diagnostics[0].id, "RZ1017");
    }

    #[test]
    fn test_dynamic_attribute_value() {
        let document = lower("<a href=\"~/x/@id\"></a>");
        let attribute = document
            .find_descendants(|n| matches!(n.kind, NodeKind::HtmlAttribute { .. }))
            .next()
            .unwrap();
        match &attribute.kind {
            NodeKind::HtmlAttribute { attribute_name, prefix, suffix } => {
                assert_eq!(attribute_name, "href");
                assert_eq!(prefix, " href=\"");
                assert_eq!(suffix, "\"");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            names(attribute),
            ["HtmlAttributeValue", "CSharpExpressionAttributeValue"]
        );
        assert_eq!(attribute.children[1].content(), "id");
    }

    #[test]
    fn test_section_directive_keeps_body() {
        let document = lower("@section Scripts { <p>x</p> }\n");
        let directive = document
            .find_descendants(|n| n.kind.is_directive())
            .next()
            .unwrap();
        assert!(matches!(directive.kind, NodeKind::Directive { .. }));
        assert!(matches!(
            &directive.children[0].kind,
            NodeKind::DirectiveToken { content, .. } if content == "Scripts"
        ));
        assert!(directive.content().contains("<p>x</p>"));
    }
}
