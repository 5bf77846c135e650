//! Passes over the lowered document
//!
//! Passes run in ascending [`order`](IntermediateNodePass::order). The
//! default set shapes the flat lowered document into a namespace, class and
//! method, turns `@section` directives into sections, and adds one
//! class-level helper per view component the document uses.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexSet;

use super::node::{IntermediateNode, NodeKind};
use crate::config::RazorParserOptions;
use crate::parser::directives::{PAGE, SECTION};
use crate::source::SourceDocument;
use crate::tag_helpers::{TagHelperDescriptor, metadata};

pub const DEFAULT_NAMESPACE: &str = "Razor";
pub const DEFAULT_CLASS_NAME: &str = "Template";
pub const EXECUTE_METHOD_NAME: &str = "ExecuteAsync";

/// What a pass may read besides the document itself
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub source: &'a SourceDocument,
    pub options: &'a RazorParserOptions,
}

pub trait IntermediateNodePass: Send + Sync {
    fn name(&self) -> &'static str;

    fn order(&self) -> i32 {
        0
    }

    fn execute(&self, context: &PassContext<'_>, document: &mut IntermediateNode);
}

pub fn default_passes() -> Vec<Box<dyn IntermediateNodePass>> {
    vec![
        Box::new(DocumentClassifierPass),
        Box::new(SectionDirectivePass),
        Box::new(ViewComponentTagHelperPass),
    ]
}

/// Run `passes` over `document`, lowest order first; ties keep their
/// position in `passes`
pub fn run_passes(
    passes: &[Box<dyn IntermediateNodePass>],
    context: &PassContext<'_>,
    document: &mut IntermediateNode,
) {
    let mut ordered: Vec<&dyn IntermediateNodePass> = passes.iter().map(|p| p.as_ref()).collect();
    ordered.sort_by_key(|pass| pass.order());
    for pass in ordered {
        tracing::trace!(pass = pass.name(), "running pass");
        pass.execute(context, document);
    }
}

/// Wraps the lowered content into `Namespace[Class[Method[...]]]`.
///
/// Using directives stay at namespace level. The namespace comes from
/// `@namespace` or the configured root namespace, the class name from the
/// document's path and the base type from `@inherits`.
pub struct DocumentClassifierPass;

impl IntermediateNodePass for DocumentClassifierPass {
    fn name(&self) -> &'static str {
        "DocumentClassifier"
    }

    fn execute(&self, context: &PassContext<'_>, document: &mut IntermediateNode) {
        if document
            .children
            .iter()
            .any(|child| matches!(child.kind, NodeKind::Namespace { .. }))
        {
            return;
        }

        let namespace = first_token_of(document, "namespace")
            .or_else(|| context.options.root_namespace.clone())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let base_type = first_token_of(document, "inherits");
        let class_name = class_name_for(context.source);

        let (usings, body): (Vec<_>, Vec<_>) = std::mem::take(&mut document.children)
            .into_iter()
            .partition(|child| matches!(child.kind, NodeKind::UsingDirective { .. }));

        let method = IntermediateNode::new(NodeKind::Method {
            method_name: EXECUTE_METHOD_NAME.to_string(),
            return_type: "global::System.Threading.Tasks.Task".to_string(),
            modifiers: vec!["public".into(), "async".into(), "override".into()],
        })
        .with_children(body);
        let class = IntermediateNode::new(NodeKind::Class {
            class_name,
            base_type,
            modifiers: vec!["public".into()],
        })
        .with_children(vec![method]);

        let mut namespace_children = usings;
        namespace_children.push(class);
        document.children = vec![
            IntermediateNode::new(NodeKind::Namespace { content: namespace })
                .with_children(namespace_children),
        ];
    }
}

/// Content of the first token of the first `name` directive
fn first_token_of(document: &IntermediateNode, name: &str) -> Option<String> {
    let directive = document
        .find_descendants(|node| node.kind.directive_name() == Some(name))
        .next()?;
    directive.children.iter().find_map(|child| match &child.kind {
        NodeKind::DirectiveToken { content, .. } if !content.is_empty() => Some(content.clone()),
        _ => None,
    })
}

/// File stem turned into an identifier
fn class_name_for(source: &SourceDocument) -> String {
    let path = source.relative_path().or(source.file_path());
    let Some(stem) = path.and_then(|path| Path::new(&**path).file_stem()?.to_str()) else {
        return DEFAULT_CLASS_NAME.to_string();
    };
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        return DEFAULT_CLASS_NAME.to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Replaces each `@section Name { ... }` with a `Section` holding the body
pub struct SectionDirectivePass;

impl IntermediateNodePass for SectionDirectivePass {
    fn name(&self) -> &'static str {
        "SectionDirective"
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, _context: &PassContext<'_>, document: &mut IntermediateNode) {
        rewrite_sections(document);
    }
}

fn rewrite_sections(node: &mut IntermediateNode) {
    for child in &mut node.children {
        rewrite_sections(child);
        if !matches!(&child.kind, NodeKind::Directive { name, .. } if name == SECTION) {
            continue;
        }
        let (tokens, body): (Vec<_>, Vec<_>) = std::mem::take(&mut child.children)
            .into_iter()
            .partition(|n| matches!(n.kind, NodeKind::DirectiveToken { .. }));
        let section_name = tokens
            .into_iter()
            .find_map(|token| match token.kind {
                NodeKind::DirectiveToken { content, .. } => Some(content),
                _ => None,
            })
            .unwrap_or_default();
        child.kind = NodeKind::Section { section_name };
        child.children = body;
    }
}

/// Adds a `ViewComponentTagHelper` to the class for every distinct view
/// component descriptor bound in the document
pub struct ViewComponentTagHelperPass;

impl ViewComponentTagHelperPass {
    pub fn class_name(descriptor: &TagHelperDescriptor) -> String {
        let name = descriptor
            .metadata
            .get(metadata::VIEW_COMPONENT_NAME)
            .map_or_else(|| descriptor.short_name(), String::as_str);
        format!("__Generated__{name}ViewComponentTagHelper")
    }
}

impl IntermediateNodePass for ViewComponentTagHelperPass {
    fn name(&self) -> &'static str {
        "ViewComponentTagHelper"
    }

    fn order(&self) -> i32 {
        20
    }

    fn execute(&self, _context: &PassContext<'_>, document: &mut IntermediateNode) {
        let mut used: IndexSet<Arc<TagHelperDescriptor>> = IndexSet::new();
        for node in document.descendants() {
            if let NodeKind::TagHelper { descriptors, .. } = &node.kind {
                used.extend(descriptors.iter().filter(|d| d.is_view_component()).cloned());
            }
        }
        if used.is_empty() {
            return;
        }

        let helpers = used.into_iter().map(|descriptor| {
            IntermediateNode::new(NodeKind::ViewComponentTagHelper {
                class_name: Self::class_name(&descriptor),
                descriptor,
            })
        });
        let is_class = |node: &IntermediateNode| matches!(node.kind, NodeKind::Class { .. });
        match document.find_mut(&is_class) {
            Some(class) => class.children.extend(helpers),
            None => document.children.extend(helpers),
        }
    }
}

/// The `@page` directive of a document
#[derive(Debug, Clone)]
pub struct PageDirective {
    /// Route template without its quotes, when one was given
    pub route_template: Option<String>,
    pub directive_node: IntermediateNode,
}

impl PageDirective {
    /// Find the first `@page` directive, malformed or not
    pub fn try_get(document: &IntermediateNode) -> Option<Self> {
        let directive = document
            .find_descendants(|node| node.kind.directive_name() == Some(PAGE))
            .next()?;
        let route_template = directive.children.iter().find_map(|child| match &child.kind {
            NodeKind::DirectiveToken { content, .. } if !content.is_empty() => {
                Some(unquote(content).to_string())
            }
            _ => None,
        });
        Some(Self {
            route_template,
            directive_node: directive.clone(),
        })
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}
