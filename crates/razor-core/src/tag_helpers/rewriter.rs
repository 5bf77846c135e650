//! Rewriting bound elements into tag helper nodes
//!
//! One depth-first pass over the tree. Each element start tag is bound
//! against the descriptors in scope; bound elements become
//! `MarkupTagHelperElement` nodes annotated with their [`TagHelperInfo`] and
//! their attributes become tag helper attributes. A [`TrackerStack`] records
//! the open elements so parent-tag rules, allowed-children constraints and
//! same-named nested tags are resolved against the dynamic nesting.
//!
//! Untouched subtrees are reused as-is, so their annotations survive.

use rowan::{GreenNode, GreenNodeData, GreenTokenData, NodeOrToken};
use std::sync::Arc;

use indexmap::IndexSet;

use super::binder::{
    AttributeStructure, TagHelperAttributeInfo, TagHelperBinder, TagHelperBinding, TagHelperInfo,
    TagMode,
};
use super::descriptor::{TagHelperDescriptor, TagStructure};
use super::tracker::{EndTagMatch, TagTracker, TrackerStack};
use crate::config::RazorParserFeatureFlags;
use crate::cst::ast::{AstNode, AttributeBlock, EndTag, MarkupElement, StartTag};
use crate::cst::{
    AnnotationTable, GreenElement, RazorNodeExt, RazorSyntaxTree, SyntaxAnnotation, SyntaxKind,
    SyntaxNode, green_node,
};
use crate::diagnostics::{RazorDiagnostic, factory};
use crate::parser::is_void_element;
use crate::source::{SourceDocument, SourceSpan};

/// Descriptors that bound at least one element, in first-use order
pub type UsedDescriptors = IndexSet<Arc<TagHelperDescriptor>>;

/// Rewrite every element of `tree` that binds through `binder`
pub fn rewrite_tag_helpers(
    tree: &RazorSyntaxTree,
    binder: &TagHelperBinder,
) -> (RazorSyntaxTree, UsedDescriptors) {
    let mut rewriter = TagHelperRewriter::new(tree, binder);
    let root = rewriter.rewrite_node(&tree.root());
    tracing::debug!(
        used = rewriter.used.len(),
        diagnostics = rewriter.diagnostics.len(),
        "rewrote tag helpers"
    );

    let mut diagnostics = tree.diagnostics().to_vec();
    diagnostics.append(&mut rewriter.diagnostics);
    let rewritten = tree.with_root(root, rewriter.annotations, diagnostics);
    (rewritten, rewriter.used)
}

struct TagHelperRewriter<'a> {
    binder: &'a TagHelperBinder,
    source: &'a SourceDocument,
    flags: RazorParserFeatureFlags,
    is_component: bool,
    trackers: TrackerStack,
    annotations: AnnotationTable,
    diagnostics: Vec<RazorDiagnostic>,
    used: UsedDescriptors,
}

impl<'a> TagHelperRewriter<'a> {
    fn new(tree: &'a RazorSyntaxTree, binder: &'a TagHelperBinder) -> Self {
        Self {
            binder,
            source: tree.source(),
            flags: tree.options().feature_flags,
            is_component: tree.options().file_kind.is_component(),
            trackers: TrackerStack::new(),
            annotations: tree.annotations().clone(),
            diagnostics: Vec::new(),
            used: UsedDescriptors::new(),
        }
    }

    fn span_of(&self, node: &SyntaxNode) -> SourceSpan {
        self.source.span(node.position(), node.full_width())
    }

    fn rewrite_node(&mut self, node: &SyntaxNode) -> GreenNode {
        if node.is_span() {
            return node.green().into_owned();
        }
        let children = self.rewrite_children(node);
        rebuild_if_changed(node, children)
    }

    fn rewrite_children(&mut self, node: &SyntaxNode) -> Vec<GreenElement> {
        let mut out = Vec::new();
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Token(token) => out.push(NodeOrToken::Token(token.green().to_owned())),
                NodeOrToken::Node(child) if child.kind() == SyntaxKind::MarkupElement => {
                    self.rewrite_element(&child, &mut out);
                }
                NodeOrToken::Node(child) => out.push(NodeOrToken::Node(self.rewrite_node(&child))),
            }
        }
        out
    }

    fn rewrite_element(&mut self, node: &SyntaxNode, out: &mut Vec<GreenElement>) {
        let Some(element) = MarkupElement::cast(node.clone()) else {
            out.push(NodeOrToken::Node(node.green().into_owned()));
            return;
        };
        let Some(start) = element.start_tag() else {
            debug_assert!(element.end_tag().is_some(), "element without tags");
            if let Some(end) = element.end_tag() {
                self.check_stray_end_tag(&end);
            }
            out.push(NodeOrToken::Node(node.green().into_owned()));
            return;
        };

        // `<!p>` opt-outs and `<text>` transitions never bind
        if start.is_bang_escaped() || start.is_markup_transition() {
            self.rewrite_plain_element(node, &element, &start.name(), false, out);
            return;
        }

        let name = start.name();
        let attributes = literal_attributes(&start);
        let parent = self
            .trackers
            .parent()
            .map(|(name, is_helper)| (name.to_string(), is_helper));
        let binding = self.binder.bind(
            &name,
            &attributes,
            parent.as_ref().map(|(name, _)| name.as_str()),
            parent.as_ref().is_some_and(|(_, is_helper)| *is_helper),
        );

        match binding {
            Some(binding) => self.rewrite_tag_helper(node, &element, &start, binding, out),
            None => {
                self.validate_child_tag(&name, &start);
                if self.is_component && is_component_like(&name) {
                    if let Some(name_node) = start.name_node() {
                        let span = self.span_of(&name_node);
                        self.diagnostics
                            .push(factory::unbound_component_tag(span, &name));
                    }
                }
                let counted = element.end_tag().is_some();
                if counted {
                    self.trackers.note_unbound_start(&name);
                }
                self.rewrite_plain_element(node, &element, &name, counted, out);
            }
        }
    }

    /// Recurse into a plain element, tracking it while its body is visited.
    /// `counted` elements were noted against an enclosing same-named scope
    /// and release it at their end tag.
    fn rewrite_plain_element(
        &mut self,
        node: &SyntaxNode,
        element: &MarkupElement,
        name: &str,
        counted: bool,
        out: &mut Vec<GreenElement>,
    ) {
        let end = element.end_tag();
        let self_closing = element.start_tag().is_some_and(|start| start.is_self_closing());
        let tracked = end.is_some() || !(self_closing || is_void_element(name));
        if tracked {
            self.trackers.push(TagTracker::plain(name));
        }
        let children = self.rewrite_children(node);
        if tracked {
            self.trackers.pop();
        }
        if counted {
            let matched = self.trackers.end_tag(name);
            debug_assert_ne!(matched, EndTagMatch::TagHelper, "plain end tag closed a tag helper");
        }
        out.push(NodeOrToken::Node(rebuild_if_changed(node, children)));
    }

    fn rewrite_tag_helper(
        &mut self,
        node: &SyntaxNode,
        element: &MarkupElement,
        start: &StartTag,
        binding: TagHelperBinding,
        out: &mut Vec<GreenElement>,
    ) {
        let name = start.name();
        let name_span = start
            .name_node()
            .map_or_else(|| self.span_of(start.syntax()), |n| self.span_of(&n));

        let structure = self.resolve_tag_structure(&binding, &name, &name_span);
        self.validate_child_tag(&name, start);
        if start.is_partial() {
            self.diagnostics
                .push(factory::tag_helper_missing_close_angle(name_span.clone(), &name));
        }

        let mode = if start.is_self_closing() {
            TagMode::SelfClosing
        } else if structure == TagStructure::WithoutEndTag {
            TagMode::StartTagOnly
        } else {
            TagMode::StartTagAndEndTag
        };
        for descriptor in binding.descriptors() {
            self.used.insert(descriptor.clone());
        }

        let start_green = self.rewrite_start_tag(start, &binding);
        let info = Arc::new(TagHelperInfo::new(&name, mode, binding));
        let end = element.end_tag();

        if mode != TagMode::StartTagAndEndTag {
            let helper = green_node(
                SyntaxKind::MarkupTagHelperElement,
                vec![NodeOrToken::Node(start_green)],
            );
            self.annotations
                .set_annotation(&helper, SyntaxAnnotation::tag_helper_info(info.clone()));
            out.push(NodeOrToken::Node(helper));

            // any body or end tag written anyway becomes a sibling
            for child in element.body() {
                if child.kind() == SyntaxKind::MarkupElement {
                    self.rewrite_element(&child, out);
                } else {
                    out.push(NodeOrToken::Node(self.rewrite_node(&child)));
                }
            }
            if let Some(end) = end {
                let display = info
                    .binding
                    .descriptors()
                    .find(|d| d.tag_matching_rules.iter().any(|r| r.tag_structure == TagStructure::WithoutEndTag))
                    .map(|d| d.display_name().to_string())
                    .unwrap_or_default();
                self.diagnostics.push(factory::tag_helper_must_not_have_end_tag(
                    self.span_of(end.syntax()),
                    &name,
                    &display,
                ));
                let stray = green_node(
                    SyntaxKind::MarkupElement,
                    vec![NodeOrToken::Node(end.syntax().green().into_owned())],
                );
                out.push(NodeOrToken::Node(stray));
            }
            return;
        }

        if end.is_none() {
            self.diagnostics
                .push(factory::malformed_tag_helper(name_span, &name));
        }

        self.trackers
            .push(TagTracker::tag_helper(&name, &info.binding));
        let mut children = vec![NodeOrToken::Node(start_green)];
        for child in element.body() {
            self.validate_content(&child);
            if child.kind() == SyntaxKind::MarkupElement {
                self.rewrite_element(&child, &mut children);
            } else {
                children.push(NodeOrToken::Node(self.rewrite_node(&child)));
            }
        }
        if let Some(end) = &end {
            let matched = self.trackers.end_tag(&end.name());
            debug_assert_eq!(matched, EndTagMatch::TagHelper, "tag helper end tag mismatch");
            if end.is_partial() {
                self.diagnostics.push(factory::tag_helper_missing_close_angle(
                    self.span_of(end.syntax()),
                    &name,
                ));
            }
            let end_green = green_node(SyntaxKind::MarkupTagHelperEndTag, green_children(end.syntax()));
            children.push(NodeOrToken::Node(end_green));
        }
        self.trackers.pop();

        let helper = green_node(SyntaxKind::MarkupTagHelperElement, children);
        self.annotations
            .set_annotation(&helper, SyntaxAnnotation::tag_helper_info(info));
        debug_assert_eq!(helper.text_len(), node.green().text_len());
        out.push(NodeOrToken::Node(helper));
    }

    /// The single tag structure every bound descriptor agrees on
    fn resolve_tag_structure(
        &mut self,
        binding: &TagHelperBinding,
        tag_name: &str,
        span: &SourceSpan,
    ) -> TagStructure {
        let mut resolved: Option<(TagStructure, &Arc<TagHelperDescriptor>)> = None;
        for bound in binding.bound_descriptors() {
            for rule in &bound.rules {
                if rule.tag_structure == TagStructure::Unspecified {
                    continue;
                }
                match resolved {
                    None => resolved = Some((rule.tag_structure, &bound.descriptor)),
                    Some((structure, first)) if structure != rule.tag_structure => {
                        self.diagnostics.push(factory::inconsistent_tag_structure(
                            span.clone(),
                            first.display_name(),
                            bound.descriptor.display_name(),
                            tag_name,
                        ));
                        return TagStructure::Unspecified;
                    }
                    Some(_) => {}
                }
            }
        }
        resolved.map_or(TagStructure::Unspecified, |(structure, _)| structure)
    }

    /// Enforce the allowed children of a directly enclosing tag helper
    fn validate_child_tag(&mut self, tag_name: &str, start: &StartTag) {
        let Some(parent) = self.trackers.restricting_parent() else {
            return;
        };
        let child = match self.binder.prefix() {
            Some(prefix) if tag_name.len() > prefix.len() && tag_name.is_char_boundary(prefix.len()) => {
                let (head, rest) = tag_name.split_at(prefix.len());
                if head.eq_ignore_ascii_case(prefix) { rest } else { tag_name }
            }
            _ => tag_name,
        };
        if parent.allows_child(child) {
            return;
        }
        let span = start
            .name_node()
            .map_or_else(|| self.span_of(start.syntax()), |n| self.span_of(&n));
        self.diagnostics.push(factory::invalid_nested_tag(
            span,
            tag_name,
            &parent.tag_name,
            &parent.allowed_children_text(),
        ));
    }

    /// Text and comments directly under a restricting tag helper
    fn validate_content(&mut self, child: &SyntaxNode) {
        let Some(parent) = self.trackers.restricting_parent() else {
            return;
        };
        let span = match child.kind() {
            SyntaxKind::MarkupTextLiteral => {
                let content = child.content();
                let trimmed = content.trim_start();
                if trimmed.is_empty() {
                    return;
                }
                let offset = child.position() + (content.len() - trimmed.len());
                self.source.span(offset, trimmed.len())
            }
            SyntaxKind::MarkupCommentBlock if !self.flags.allow_html_comments_in_tag_helpers => {
                self.span_of(child)
            }
            _ => return,
        };
        let diagnostic =
            factory::cannot_have_non_tag_content(span, &parent.tag_name, &parent.allowed_children_text());
        self.diagnostics.push(diagnostic);
    }

    fn check_stray_end_tag(&mut self, end: &EndTag) {
        let name = end.name();
        if self.is_component || name.starts_with('!') || !self.binder.targets_tag_name(&name) {
            return;
        }
        if self.trackers.end_tag(&name) == EndTagMatch::Unmatched {
            self.diagnostics
                .push(factory::malformed_tag_helper(self.span_of(end.syntax()), &name));
        }
    }

    fn rewrite_start_tag(&mut self, start: &StartTag, binding: &TagHelperBinding) -> GreenNode {
        let tag_name = start.name();
        let mut children = Vec::new();
        for child in start.syntax().children_with_tokens() {
            let green = match child {
                NodeOrToken::Token(token) => NodeOrToken::Token(token.green().to_owned()),
                NodeOrToken::Node(child) => match AttributeBlock::cast(child.clone()) {
                    Some(attribute) => NodeOrToken::Node(self.rewrite_attribute(&attribute, binding, &tag_name)),
                    None => NodeOrToken::Node(self.rewrite_node(&child)),
                },
            };
            children.push(green);
        }
        green_node(SyntaxKind::MarkupTagHelperStartTag, children)
    }

    fn rewrite_attribute(
        &mut self,
        attribute: &AttributeBlock,
        binding: &TagHelperBinding,
        tag_name: &str,
    ) -> GreenNode {
        let name = attribute.name();
        let structure = attribute.structure();
        let bound = binding
            .descriptors()
            .find_map(|descriptor| descriptor.bound_attribute(&name));

        if let Some(bound) = bound {
            let via_indexer = !bound.matches_name(&name);
            let (is_boolean, is_string, type_name) = if via_indexer {
                (
                    bound.is_indexer_boolean_property(),
                    bound.is_indexer_string_property(),
                    bound.indexer_type_name.as_deref().unwrap_or_default(),
                )
            } else {
                (bound.is_boolean_property(), bound.is_string_property(), bound.type_name.as_ref())
            };
            let empty = match structure {
                AttributeStructure::Minimized => {
                    !(is_boolean && self.flags.allow_minimized_boolean_tag_helper_attributes)
                }
                _ => {
                    !is_string
                        && attribute
                            .literal_value()
                            .is_some_and(|value| value.trim().is_empty())
                }
            };
            if empty {
                let span = attribute
                    .name_node()
                    .map_or_else(|| self.span_of(attribute.syntax()), |n| self.span_of(&n));
                self.diagnostics
                    .push(factory::empty_bound_attribute(span, &name, tag_name, type_name));
            }
        }

        let kind = if attribute.is_minimized() {
            SyntaxKind::MarkupMinimizedTagHelperAttribute
        } else {
            SyntaxKind::MarkupTagHelperAttribute
        };
        let children = attribute
            .syntax()
            .children_with_tokens()
            .map(|child| match child {
                NodeOrToken::Token(token) => NodeOrToken::Token(token.green().to_owned()),
                NodeOrToken::Node(child) if child.kind() == SyntaxKind::GenericBlock => {
                    let inner = self.rewrite_children(&child);
                    NodeOrToken::Node(green_node(SyntaxKind::MarkupTagHelperAttributeValue, inner))
                }
                NodeOrToken::Node(child) => NodeOrToken::Node(self.rewrite_node(&child)),
            })
            .collect();
        let green = green_node(kind, children);
        self.annotations.set_annotation(
            &green,
            SyntaxAnnotation::tag_helper_attribute_info(Arc::new(TagHelperAttributeInfo {
                name,
                attribute_structure: structure,
                bound: bound.is_some(),
            })),
        );
        green
    }
}

/// Literal `name=value` pairs up to the first attribute carrying code
fn literal_attributes(start: &StartTag) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for child in start.attribute_area() {
        if let Some(attribute) = AttributeBlock::cast(child.clone()) {
            match attribute.literal_value() {
                Some(value) => pairs.push((attribute.name(), value)),
                None => break,
            }
        } else if child.kind() == SyntaxKind::CSharpCodeBlock {
            break;
        }
    }
    pairs
}

/// Green children of `node`, shared rather than copied
fn green_children(node: &SyntaxNode) -> Vec<GreenElement> {
    node.children_with_tokens()
        .map(|child| match child {
            NodeOrToken::Token(token) => NodeOrToken::Token(token.green().to_owned()),
            NodeOrToken::Node(child) => NodeOrToken::Node(child.green().into_owned()),
        })
        .collect()
}

/// PascalCase names look like components
fn is_component_like(tag_name: &str) -> bool {
    tag_name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn same_green(
    original: NodeOrToken<&GreenNodeData, &GreenTokenData>,
    new: &GreenElement,
) -> bool {
    match (original, new) {
        (NodeOrToken::Node(old), NodeOrToken::Node(new)) => std::ptr::eq(old, &**new),
        (NodeOrToken::Token(old), NodeOrToken::Token(new)) => std::ptr::eq(old, &**new),
        _ => false,
    }
}

/// Reuse `node`'s green when every child came back unchanged
fn rebuild_if_changed(node: &SyntaxNode, children: Vec<GreenElement>) -> GreenNode {
    let green = node.green();
    let unchanged = green.children().len() == children.len()
        && green
            .children()
            .zip(&children)
            .all(|(old, new)| same_green(old, new));
    if unchanged {
        green.into_owned()
    } else {
        green_node(node.kind(), children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileKind, RazorLanguageVersion, RazorParserOptions};
    use crate::cst::dump::dump_tree;
    use crate::tag_helpers::{TagHelperDescriptorBuilder, TagHelperKind};

    fn descriptor(
        name: &str,
        configure: impl FnOnce(TagHelperDescriptorBuilder) -> TagHelperDescriptorBuilder,
    ) -> Arc<TagHelperDescriptor> {
        Arc::new(configure(TagHelperDescriptorBuilder::new(TagHelperKind::TagHelper, name, "Test")).build())
    }

    fn rewrite_with(
        text: &str,
        options: RazorParserOptions,
        descriptors: Vec<Arc<TagHelperDescriptor>>,
    ) -> (RazorSyntaxTree, UsedDescriptors) {
        let tree = RazorSyntaxTree::parse(SourceDocument::new(text, None), options);
        let binder = TagHelperBinder::new(None, descriptors);
        rewrite_tag_helpers(&tree, &binder)
    }

    fn rewrite(text: &str, descriptors: Vec<Arc<TagHelperDescriptor>>) -> (RazorSyntaxTree, UsedDescriptors) {
        rewrite_with(text, RazorParserOptions::default(), descriptors)
    }

    fn helpers(tree: &RazorSyntaxTree) -> Vec<SyntaxNode> {
        tree.root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::MarkupTagHelperElement)
            .collect()
    }

    fn ids(tree: &RazorSyntaxTree) -> Vec<&str> {
        tree.diagnostics().iter().map(|d| d.id.as_str()).collect()
    }

    fn p_helper() -> Arc<TagHelperDescriptor> {
        descriptor("Test.PTagHelper", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("p");
            })
        })
    }

    #[test]
    fn test_bound_element_is_rewritten_and_annotated() {
        let text = "<div><p class=\"x\">hi</p></div>";
        let (tree, used) = rewrite(text, vec![p_helper()]);
        assert_eq!(tree.text(), text);
        assert_eq!(used.len(), 1);

        let elements = helpers(&tree);
        assert_eq!(elements.len(), 1);
        let info = tree.annotations().tag_helper_info(&elements[0]).unwrap();
        assert_eq!(info.tag_name, "p");
        assert_eq!(info.tag_mode, TagMode::StartTagAndEndTag);

        let kinds: Vec<SyntaxKind> = elements[0].children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            [
                SyntaxKind::MarkupTagHelperStartTag,
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupTagHelperEndTag
            ]
        );
        let attribute = elements[0]
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MarkupTagHelperAttribute)
            .unwrap();
        let attribute_info = tree.annotations().tag_helper_attribute_info(&attribute).unwrap();
        assert_eq!(attribute_info.name, "class");
        assert_eq!(attribute_info.attribute_structure, AttributeStructure::DoubleQuotes);
        assert!(!attribute_info.bound);
    }

    #[test]
    fn test_unbound_tree_is_shared() {
        let (tree, used) = rewrite("<div>@x</div>", vec![p_helper()]);
        let original = RazorSyntaxTree::parse(
            SourceDocument::new("<div>@x</div>", None),
            RazorParserOptions::default(),
        );
        assert!(used.is_empty());
        assert_eq!(dump_tree(&tree), dump_tree(&original));
    }

    #[test]
    fn test_span_contexts_survive_rewrite() {
        let text = "<p>@Name</p>";
        let original = RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default());
        let (tree, _) = rewrite(text, vec![p_helper()]);
        let annotated = |tree: &RazorSyntaxTree| {
            tree.root()
                .spans()
                .iter()
                .filter(|span| tree.annotations().span_context(span).is_some())
                .count()
        };
        assert!(annotated(&original) > 0);
        assert_eq!(annotated(&tree), annotated(&original));
    }

    #[test]
    fn test_same_named_child_without_required_attribute() {
        let myth = descriptor("Test.MythTagHelper", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("myth").require_attribute("req");
            })
        });
        let text = "<myth req=\"x\"><myth></myth></myth>";
        let (tree, _) = rewrite(text, vec![myth]);
        let elements = helpers(&tree);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].full_width(), text.len());
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_without_end_tag_promotes_body() {
        let input = descriptor("Test.InputTagHelper", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("my-input").tag_structure(TagStructure::WithoutEndTag);
            })
        });
        let (tree, _) = rewrite("<my-input>text</my-input>", vec![input]);
        let block = tree.root().first_child().unwrap();
        let kinds: Vec<SyntaxKind> = block.children().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            [
                SyntaxKind::MarkupTagHelperElement,
                SyntaxKind::MarkupTextLiteral,
                SyntaxKind::MarkupElement
            ]
        );
        let info = tree
            .annotations()
            .tag_helper_info(&block.first_child().unwrap())
            .unwrap()
            .clone();
        assert_eq!(info.tag_mode, TagMode::StartTagOnly);
        assert_eq!(ids(&tree), ["RZ1033"]);
    }

    #[test]
    fn test_self_closing_mode() {
        let (tree, _) = rewrite("<p />", vec![p_helper()]);
        let element = &helpers(&tree)[0];
        let info = tree.annotations().tag_helper_info(element).unwrap();
        assert_eq!(info.tag_mode, TagMode::SelfClosing);
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_missing_end_tag_is_malformed() {
        let (tree, _) = rewrite("<div><p>text</div>", vec![p_helper()]);
        assert_eq!(ids(&tree), ["RZ1034"]);
        assert_eq!(tree.diagnostics()[0].span.absolute_index, 6);
    }

    #[test]
    fn test_missing_close_angle() {
        let (tree, _) = rewrite("<p class=\"x\"", vec![p_helper()]);
        assert!(ids(&tree).contains(&"RZ1035"));
    }

    #[test]
    fn test_inconsistent_tag_structure() {
        let first = descriptor("Test.A", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("x").tag_structure(TagStructure::WithoutEndTag);
            })
        });
        let second = descriptor("Test.B", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("x").tag_structure(TagStructure::NormalOrSelfClosing);
            })
        });
        let (tree, _) = rewrite("<x></x>", vec![first, second]);
        assert_eq!(ids(&tree), ["RZ1030"]);
    }

    #[test]
    fn test_allowed_children() {
        let list = descriptor("Test.List", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("list");
            })
            .allowed_child_tag("item")
        });
        let text = "<list>\n  text<item></item><div></div><!-- c --></list>";
        let (tree, _) = rewrite(text, vec![list]);
        assert_eq!(ids(&tree), ["RZ2009", "RZ2010"]);
        // leading whitespace is excluded from the content diagnostic
        assert_eq!(tree.diagnostics()[0].span.absolute_index, 9);
        assert_eq!(tree.diagnostics()[0].span.length, 4);
    }

    #[test]
    fn test_html_comments_follow_feature_flag() {
        let list = descriptor("Test.List", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("list");
            })
            .allowed_child_tag("item")
        });
        let options = RazorParserOptions::new(FileKind::Legacy, RazorLanguageVersion::VERSION_2_0);
        let (tree, _) = rewrite_with("<list><!-- c --></list>", options, vec![list]);
        assert_eq!(ids(&tree), ["RZ2009"]);
    }

    #[test]
    fn test_minimized_bound_attribute_needs_value() {
        let input = descriptor("Test.InputTagHelper", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("input");
            })
            .bound_attribute(|a| {
                a.name("count").property_name("Count").type_name("System.Int32");
            })
            .bound_attribute(|a| {
                a.name("checked").property_name("Checked").type_name("System.Boolean");
            })
        });
        let (tree, _) = rewrite("<input count checked />", vec![input]);
        assert_eq!(ids(&tree), ["RZ2008"]);
        let minimized = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::MarkupMinimizedTagHelperAttribute)
            .count();
        assert_eq!(minimized, 2);
    }

    #[test]
    fn test_code_valued_attribute_stops_extraction() {
        let helper = descriptor("Test.Span", |b| {
            b.tag_matching_rule(|rule| {
                rule.tag_name("span").require_attribute("after");
            })
        });
        let (tree, _) = rewrite("<span title=\"@x\" after=\"1\"></span>", vec![helper]);
        assert!(helpers(&tree).is_empty());
    }

    #[test]
    fn test_stray_end_tag_of_tag_helper() {
        let (tree, _) = rewrite("</p>", vec![p_helper()]);
        assert_eq!(ids(&tree), ["RZ1034"]);
    }

    #[test]
    fn test_unbound_component_tag_warns() {
        let options = RazorParserOptions::new(FileKind::Component, RazorLanguageVersion::LATEST);
        let (tree, _) = rewrite_with("<Counter /><div></div>", options, Vec::new());
        assert_eq!(ids(&tree), ["RZ10012"]);
        assert!(!tree.diagnostics()[0].is_error());
    }

    #[test]
    fn test_rewrite_is_deterministic() {
        let text = "<p a=\"1\"><p>x</p></p><p />";
        let first = dump_tree(&rewrite(text, vec![p_helper()]).0);
        let second = dump_tree(&rewrite(text, vec![p_helper()]).0);
        assert_eq!(first, second);
    }
}
