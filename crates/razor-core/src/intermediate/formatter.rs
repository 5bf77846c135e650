//! Indented text rendering of intermediate nodes, used by tests and
//! `razor lower`

use std::fmt::Write;

use super::node::{IntermediateNode, NodeKind};

const INDENT: &str = "  ";

/// Render `node` one line per node; `with_spans` appends source spans
pub fn format_node(node: &IntermediateNode, with_spans: bool) -> String {
    let mut out = String::new();
    write_node(&mut out, node, with_spans, 0);
    out
}

fn write_node(out: &mut String, node: &IntermediateNode, with_spans: bool, depth: usize) {
    let _ = write!(out, "{}{}", INDENT.repeat(depth), node.name());
    if let Some(details) = details(&node.kind) {
        let _ = write!(out, " - {details}");
    }
    if with_spans {
        if let Some(source) = &node.source {
            let _ = write!(out, " {source}");
        }
    }
    for diagnostic in &node.diagnostics {
        let _ = write!(out, " !{}", diagnostic.id);
    }
    out.push('\n');
    for child in &node.children {
        write_node(out, child, with_spans, depth + 1);
    }
}

fn details(kind: &NodeKind) -> Option<String> {
    let details = match kind {
        NodeKind::Document
        | NodeKind::HtmlContent
        | NodeKind::CSharpCode
        | NodeKind::CSharpExpression
        | NodeKind::TagHelperBody => return None,
        NodeKind::Namespace { content } => content.clone(),
        NodeKind::Class {
            class_name,
            base_type,
            modifiers,
        } => {
            let mut text = format!("{} {class_name}", modifiers.join(" "));
            if let Some(base_type) = base_type {
                let _ = write!(text, " : {base_type}");
            }
            text
        }
        NodeKind::Method {
            method_name,
            return_type,
            modifiers,
        } => format!("{} {return_type} {method_name}", modifiers.join(" ")),
        NodeKind::Directive { name, .. } | NodeKind::MalformedDirective { name, .. } => {
            name.clone()
        }
        NodeKind::DirectiveToken { content, .. } => escape(content),
        NodeKind::UsingDirective { content, is_static } => {
            if *is_static {
                format!("static {content}")
            } else {
                content.clone()
            }
        }
        NodeKind::HtmlAttribute {
            attribute_name,
            prefix,
            suffix,
        } => format!("{attribute_name} - {} - {}", escape(prefix), escape(suffix)),
        NodeKind::HtmlAttributeValue { prefix }
        | NodeKind::CSharpExpressionAttributeValue { prefix } => escape(prefix),
        NodeKind::IntermediateToken { kind, content } => format!("{kind} - {}", escape(content)),
        NodeKind::Section { section_name } => section_name.clone(),
        NodeKind::TagHelper { tag_name, tag_mode, .. } => format!("{tag_name} - {tag_mode}"),
        NodeKind::TagHelperProperty {
            attribute_name,
            attribute_structure,
            bound_attribute,
            descriptor,
            ..
        } => format!(
            "{attribute_name} - {}.{} - {attribute_structure}",
            descriptor.display_name(),
            bound_attribute.property_name
        ),
        NodeKind::TagHelperHtmlAttribute {
            attribute_name,
            attribute_structure,
        } => format!("{attribute_name} - {attribute_structure}"),
        NodeKind::ViewComponentTagHelper { class_name, .. } => class_name.clone(),
    };
    Some(details)
}

fn escape(text: &str) -> String {
    text.replace('\r', "\\r")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intermediate::TokenKind;

    #[test]
    fn test_format_nests_and_escapes() {
        let document = IntermediateNode::new(NodeKind::Document).with_children(vec![
            IntermediateNode::new(NodeKind::HtmlContent)
                .with_children(vec![IntermediateNode::token(TokenKind::Html, "<p>\n")]),
            IntermediateNode::new(NodeKind::UsingDirective {
                content: "System.Math".into(),
                is_static: true,
            }),
        ]);
        insta::assert_snapshot!(format_node(&document, false), @r"
        DocumentIntermediateNode
          HtmlContent
            IntermediateToken - Html - <p>\n
          UsingDirective - static System.Math
        ");
    }

    #[test]
    fn test_spans_are_optional() {
        let source = crate::source::SourceDocument::new("abc", None);
        let node = IntermediateNode::new(NodeKind::CSharpExpression).with_source(source.span(1, 2));
        assert_eq!(format_node(&node, false), "CSharpExpression\n");
        assert_eq!(format_node(&node, true), "CSharpExpression (1:0,1 [2])\n");
    }
}
