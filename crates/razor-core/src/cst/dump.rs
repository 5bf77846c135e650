//! Indented text rendering of a syntax tree, used by tests and `razor parse`

use std::fmt::Write;

use super::{AnnotationTable, RazorNodeExt, RazorSyntaxTree, SyntaxNode};

const INDENT: &str = "  ";

/// Render `tree` with its span contexts and tag helper annotations
pub fn dump_tree(tree: &RazorSyntaxTree) -> String {
    dump_node(&tree.root(), tree.annotations())
}

pub fn dump_node(node: &SyntaxNode, annotations: &AnnotationTable) -> String {
    let mut out = String::new();
    write_node(&mut out, node, annotations, 0);
    out
}

fn write_node(out: &mut String, node: &SyntaxNode, annotations: &AnnotationTable, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = write!(
        out,
        "{indent}{} - [{}..{})::{}",
        node.kind(),
        node.position(),
        node.end_position(),
        node.full_width()
    );

    if node.is_span() {
        let _ = write!(out, " - [{}]", escape(&node.content()));
        if let Some(context) = annotations.span_context(node) {
            let _ = write!(
                out,
                " - {} - {}",
                context.chunk_generator, context.edit_handler
            );
        }
    }
    if let Some(info) = annotations.tag_helper_info(node) {
        let names: Vec<&str> = info
            .binding
            .descriptors()
            .map(|descriptor| descriptor.name.as_ref())
            .collect();
        let _ = write!(
            out,
            " - {}[{}] - {}",
            info.tag_name,
            info.tag_mode,
            names.join(", ")
        );
    }
    if let Some(info) = annotations.tag_helper_attribute_info(node) {
        let _ = write!(out, " - {} - {}", info.name, info.attribute_structure);
        if info.bound {
            out.push_str(" - bound");
        }
    }
    out.push('\n');

    if node.is_span() {
        let token_indent = INDENT.repeat(depth + 1);
        for token in node.children_with_tokens().filter_map(|e| e.into_token()) {
            let _ = writeln!(
                out,
                "{token_indent}{};[{}];",
                token.kind(),
                escape(token.text())
            );
        }
        return;
    }
    for child in node.children() {
        write_node(out, &child, annotations, depth + 1);
    }
}

fn escape(text: &str) -> String {
    text.replace('\r', "\\r")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RazorParserOptions;
    use crate::source::SourceDocument;

    #[test]
    fn test_dump_lists_every_token_once() {
        let text = "<p>hi</p>";
        let tree =
            RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default());
        let dump = dump_tree(&tree);
        assert!(dump.starts_with("RazorDocument - [0..9)::9\n"));
        assert_eq!(dump.matches("OpenAngle;[<];").count(), 2);
        assert!(dump.contains("Text;[hi];"));
    }

    #[test]
    fn test_escape_line_breaks() {
        assert_eq!(escape("a\r\n\tb"), "a\\r\\n\\tb");
    }
}
