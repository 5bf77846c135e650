//! Razor parser
//!
//! Turns a [`SourceDocument`] into a [`RazorSyntaxTree`]. A single reader is
//! shared by the markup and code tokenizers; the parser switches between
//! them at `@` transitions and at tags inside code, re-lexing whatever
//! lookahead the other grammar had produced.
//!
//! The parser never fails. Malformed input produces a complete tree whose
//! text equals the source, plus diagnostics.

mod code;
mod context;
pub mod directives;
mod markup;

use std::sync::Arc;

use crate::config::RazorParserOptions;
use crate::cst::RazorSyntaxTree;
use crate::source::SourceDocument;
use context::ParserContext;

pub use markup::{VOID_ELEMENTS, is_void_element};

/// Parser for one configuration of file kind and language version
#[derive(Debug, Clone)]
pub struct RazorParser {
    options: Arc<RazorParserOptions>,
}

impl RazorParser {
    pub fn new(options: Arc<RazorParserOptions>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Arc<RazorParserOptions> {
        &self.options
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = source.file_path().map(|p| p.as_ref())))]
    pub fn parse(&self, source: Arc<SourceDocument>) -> RazorSyntaxTree {
        let (green, annotations, diagnostics) = {
            let mut context = ParserContext::new(&source, self.options.clone());
            context.parse_document();
            context.finish()
        };
        tracing::debug!(
            length = source.len(),
            diagnostics = diagnostics.len(),
            "parsed document"
        );
        RazorSyntaxTree::new(green, annotations, diagnostics, source, self.options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileKind, RazorLanguageVersion};
    use crate::cst::{ChunkGenerator, RazorNodeExt, SyntaxKind, SyntaxNode, dump::dump_tree};
    use crate::edit::{AcceptedCharacters, EditHandlerKind};

    fn parse(text: &str) -> RazorSyntaxTree {
        RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default())
    }

    fn parse_component(text: &str) -> RazorSyntaxTree {
        let options = RazorParserOptions::new(FileKind::Component, RazorLanguageVersion::LATEST);
        RazorSyntaxTree::parse(SourceDocument::new(text, None), options)
    }

    fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|child| child.kind()).collect()
    }

    fn find(tree: &RazorSyntaxTree, kind: SyntaxKind) -> SyntaxNode {
        tree.root()
            .descendants()
            .find(|node| node.kind() == kind)
            .unwrap_or_else(|| panic!("no {kind} in\n{}", dump_tree(tree)))
    }

    fn ids(tree: &RazorSyntaxTree) -> Vec<String> {
        tree.diagnostics().iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn test_implicit_expression() {
        let tree = parse("<p>@Model.Items[0].Name(1)</p>");
        let implicit = find(&tree, SyntaxKind::CSharpImplicitExpression);
        assert_eq!(
            kinds(&implicit),
            [
                SyntaxKind::CSharpTransition,
                SyntaxKind::CSharpImplicitExpressionBody
            ]
        );
        let literal = find(&tree, SyntaxKind::CSharpExpressionLiteral);
        assert_eq!(literal.text().to_string(), "Model.Items[0].Name(1)");
        let context = tree.span_context(&literal);
        assert_eq!(context.chunk_generator, ChunkGenerator::Expression);
        assert_eq!(
            context.edit_handler.accepted_characters,
            AcceptedCharacters::NonWhitespace
        );
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_implicit_expression_stops_at_trailing_dot() {
        let tree = parse("@name. Next");
        let literal = find(&tree, SyntaxKind::CSharpExpressionLiteral);
        assert_eq!(literal.text().to_string(), "name");
        assert_eq!(tree.text(), "@name. Next");
    }

    #[test]
    fn test_null_conditional_and_await() {
        let tree = parse("@user?.Name x");
        assert_eq!(
            find(&tree, SyntaxKind::CSharpExpressionLiteral).text().to_string(),
            "user?.Name"
        );
        let tree = parse("@await Component.InvokeAsync(\"x\") y");
        assert_eq!(
            find(&tree, SyntaxKind::CSharpExpressionLiteral).text().to_string(),
            "await Component.InvokeAsync(\"x\")"
        );
    }

    #[test]
    fn test_transition_followed_by_whitespace() {
        let tree = parse("@ x");
        assert_eq!(ids(&tree), ["RZ1003"]);
        let literal = find(&tree, SyntaxKind::CSharpExpressionLiteral);
        assert_eq!(literal.text().to_string(), "");
        assert_eq!(tree.text(), "@ x");
        assert_eq!(ids(&parse("@")), ["RZ1004"]);
        assert_eq!(ids(&parse("@!")), ["RZ1005"]);
    }

    #[test]
    fn test_explicit_expression() {
        let tree = parse("@(a + (b * 2))!");
        let body = find(&tree, SyntaxKind::CSharpExplicitExpressionBody);
        assert_eq!(
            kinds(&body),
            [
                SyntaxKind::RazorMetaCode,
                SyntaxKind::CSharpExpressionLiteral,
                SyntaxKind::RazorMetaCode
            ]
        );
        assert_eq!(
            find(&tree, SyntaxKind::CSharpExpressionLiteral).text().to_string(),
            "a + (b * 2)"
        );

        let tree = parse("x @(a");
        assert_eq!(ids(&tree), ["RZ1027"]);
        assert_eq!(tree.diagnostics()[0].span.absolute_index, 3);
    }

    #[test]
    fn test_statement_block_with_markup() {
        let tree = parse("@{ var x = 1; <p>@x</p> }");
        let body = find(&tree, SyntaxKind::CSharpStatementBody);
        assert_eq!(
            kinds(&body),
            [
                SyntaxKind::RazorMetaCode,
                SyntaxKind::CSharpCodeBlock,
                SyntaxKind::RazorMetaCode
            ]
        );
        let code = body.children().nth(1).unwrap();
        assert_eq!(
            kinds(&code),
            [
                SyntaxKind::CSharpStatementLiteral,
                SyntaxKind::MarkupBlock,
                SyntaxKind::CSharpStatementLiteral
            ]
        );
        assert!(tree.diagnostics().is_empty());

        let open = body.first_child().unwrap();
        let handler = &tree.span_context(&open).edit_handler;
        assert_eq!(
            handler.kind,
            EditHandlerKind::AutoComplete {
                at_end_of_span_only: true,
                auto_complete_string: None
            }
        );
    }

    #[test]
    fn test_unterminated_statement_block() {
        let tree = parse("@{ var x = 1;");
        assert_eq!(ids(&tree), ["RZ1006"]);
        let open = find(&tree, SyntaxKind::RazorMetaCode);
        let handler = &tree.span_context(&open).edit_handler;
        assert_eq!(
            handler.kind,
            EditHandlerKind::AutoComplete {
                at_end_of_span_only: true,
                auto_complete_string: Some("}".to_string())
            }
        );
    }

    #[test]
    fn test_unclosed_element_in_code_block() {
        let tree = parse("@{ <div> }");
        assert!(ids(&tree).contains(&"RZ1025".to_string()));
    }

    #[test]
    fn test_text_tag_and_markup_line() {
        let tree = parse("@{ <text>hi</text>\n@:line @x\nvar y = 2; }");
        let transitions: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::MarkupTransition)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(transitions, ["<", "text", ">", "</text>", "@"]);
        assert!(tree.diagnostics().is_empty());
        assert_eq!(tree.text(), "@{ <text>hi</text>\n@:line @x\nvar y = 2; }");
    }

    #[test]
    fn test_keyword_blocks() {
        let tree = parse("@if (a) { <b>x</b> } else { <i>y</i> }\n<p></p>");
        let block = tree.root().first_child().unwrap();
        assert_eq!(
            kinds(&block),
            [
                SyntaxKind::CSharpCodeBlock,
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupElement
            ]
        );
        let code = block.first_child().unwrap();
        assert_eq!(code.first_child().unwrap().kind(), SyntaxKind::CSharpTransition);
        assert_eq!(
            code.children()
                .filter(|n| n.kind() == SyntaxKind::MarkupBlock)
                .count(),
            2
        );
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_do_while_and_try_catch() {
        let tree = parse("@do { x++; } while (x < 3);\n@try { } catch (E e) { } finally { }");
        let root_block = tree.root().first_child().unwrap();
        assert_eq!(
            root_block
                .children()
                .filter(|n| n.kind() == SyntaxKind::CSharpCodeBlock)
                .count(),
            2
        );
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_razor_comment() {
        let tree = parse("a @* note *@ b");
        let block = tree.root().first_child().unwrap();
        assert_eq!(
            kinds(&block),
            [
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::RazorCommentBlock,
                SyntaxKind::MarkupTextLiteral
            ]
        );
        assert_eq!(ids(&parse("@* open")), ["RZ1028"]);
    }

    #[test]
    fn test_using_import() {
        let tree = parse("@using System.Text\n<p></p>");
        let literal = find(&tree, SyntaxKind::CSharpStatementLiteral);
        assert_eq!(literal.text().to_string(), "using System.Text");
        assert_eq!(
            tree.span_context(&literal).chunk_generator,
            ChunkGenerator::AddImport {
                namespace: "System.Text".to_string(),
                is_static: false
            }
        );
    }

    #[test]
    fn test_single_line_directive() {
        let tree = parse("@inherits Base<Model>\n<p></p>");
        let body = find(&tree, SyntaxKind::RazorDirectiveBody);
        assert_eq!(body.first_child().unwrap().text().to_string(), "inherits");
        let token = body
            .descendants()
            .find(|n| n.kind() == SyntaxKind::CSharpStatementLiteral)
            .unwrap();
        assert_eq!(token.text().to_string(), "Base<Model>");
        assert!(tree.diagnostics().is_empty());
        assert_eq!(
            tree.root().first_child().unwrap().last_child().unwrap().kind(),
            SyntaxKind::MarkupElement
        );
    }

    #[test]
    fn test_directive_diagnostics() {
        assert_eq!(ids(&parse("@inherits")), ["RZ1012"]);
        assert_eq!(ids(&parse("@inherits \"x\"")), ["RZ1013"]);
        assert_eq!(ids(&parse("@page \"/a\" extra")), ["RZ1017"]);
        assert_eq!(ids(&parse("@model A\n@model B\n")), ["RZ2001"]);
    }

    #[test]
    fn test_trailing_directive_content_is_markup() {
        let tree = parse("@page \"/a\" extra");
        let block = tree.root().first_child().unwrap();
        assert_eq!(block.last_child().unwrap().kind(), SyntaxKind::MarkupTextLiteral);
        assert_eq!(block.last_child().unwrap().text().to_string(), "extra");
    }

    #[test]
    fn test_tag_helper_directives() {
        let tree = parse("@addTagHelper *, MyAssembly\n@tagHelperPrefix th:\n");
        let generators: Vec<_> = tree
            .root()
            .spans()
            .into_iter()
            .filter(|span| span.kind() == SyntaxKind::CSharpStatementLiteral)
            .map(|span| tree.span_context(&span).chunk_generator.clone())
            .collect();
        assert_eq!(
            generators,
            [
                ChunkGenerator::AddTagHelper {
                    lookup_text: "*, MyAssembly".to_string(),
                    type_pattern: Some("*".to_string()),
                    assembly_name: Some("MyAssembly".to_string()),
                },
                ChunkGenerator::TagHelperPrefix {
                    prefix: "th:".to_string()
                },
            ]
        );
        assert!(tree.diagnostics().is_empty());

        assert_eq!(ids(&parse("@addTagHelper\n")), ["RZ1018"]);
        assert_eq!(ids(&parse("@addTagHelper \"nocomma\"\n")), ["RZ1036"]);
    }

    #[test]
    fn test_section_directive() {
        let tree = parse("@section Scripts { <script>if (a) { b(); }</script> }\nafter");
        let directive = find(&tree, SyntaxKind::RazorDirective);
        assert!(directive.text().to_string().ends_with("</script> }"));
        let section_markup = directive
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MarkupBlock)
            .unwrap();
        assert!(section_markup.text().to_string().contains("b(); }"));
        assert!(tree.diagnostics().is_empty());

        assert_eq!(ids(&parse("@section Scripts { <p>")), ["RZ1006"]);
    }

    #[test]
    fn test_code_directive_in_component() {
        let tree = parse_component("<h1>@count</h1>\n@code {\n  int count;\n}\n");
        let directive = find(&tree, SyntaxKind::RazorDirective);
        assert!(directive.text().to_string().contains("int count;"));
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_round_trip_of_malformed_input() {
        for text in [
            "<p class=\"@x",
            "@{ <div> @if (",
            "@section {",
            "</a></b><c",
            "@(",
            "<!-- @* -->",
            "@functions { void F() { <p>x</p> } ",
        ] {
            assert_eq!(parse(text).text(), text);
        }
    }
}
