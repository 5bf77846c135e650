//! Intermediate node types

use std::fmt;
use std::sync::Arc;

use crate::diagnostics::RazorDiagnostic;
use crate::parser::directives::{DirectiveDescriptor, DirectiveTokenDescriptor};
use crate::source::SourceSpan;
use crate::tag_helpers::{
    AttributeStructure, BoundAttributeDescriptor, TagHelperDescriptor, TagMode,
};

/// Language of an [`NodeKind::IntermediateToken`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Html,
    CSharp,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Html => write!(f, "Html"),
            TokenKind::CSharp => write!(f, "CSharp"),
        }
    }
}

/// What a node is, with the data specific to that kind
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Namespace {
        content: String,
    },
    Class {
        class_name: String,
        base_type: Option<String>,
        modifiers: Vec<String>,
    },
    Method {
        method_name: String,
        return_type: String,
        modifiers: Vec<String>,
    },
    Directive {
        name: String,
        descriptor: Arc<DirectiveDescriptor>,
    },
    /// A directive whose tokens or body did not parse cleanly
    MalformedDirective {
        name: String,
        descriptor: Arc<DirectiveDescriptor>,
    },
    DirectiveToken {
        content: String,
        /// `None` for tag helper directive lookup text
        descriptor: Option<DirectiveTokenDescriptor>,
    },
    UsingDirective {
        content: String,
        is_static: bool,
    },
    HtmlContent,
    HtmlAttribute {
        attribute_name: String,
        prefix: String,
        suffix: String,
    },
    HtmlAttributeValue {
        prefix: String,
    },
    CSharpExpressionAttributeValue {
        prefix: String,
    },
    CSharpCode,
    CSharpExpression,
    IntermediateToken {
        kind: TokenKind,
        content: String,
    },
    Section {
        section_name: String,
    },
    TagHelper {
        tag_name: String,
        tag_mode: TagMode,
        descriptors: Vec<Arc<TagHelperDescriptor>>,
    },
    TagHelperBody,
    TagHelperProperty {
        attribute_name: String,
        attribute_structure: AttributeStructure,
        bound_attribute: BoundAttributeDescriptor,
        descriptor: Arc<TagHelperDescriptor>,
        is_indexer_name_match: bool,
    },
    TagHelperHtmlAttribute {
        attribute_name: String,
        attribute_structure: AttributeStructure,
    },
    /// Class-level helper generated for one view component
    ViewComponentTagHelper {
        class_name: String,
        descriptor: Arc<TagHelperDescriptor>,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "DocumentIntermediateNode",
            NodeKind::Namespace { .. } => "NamespaceDeclaration",
            NodeKind::Class { .. } => "ClassDeclaration",
            NodeKind::Method { .. } => "MethodDeclaration",
            NodeKind::Directive { .. } => "Directive",
            NodeKind::MalformedDirective { .. } => "MalformedDirective",
            NodeKind::DirectiveToken { .. } => "DirectiveToken",
            NodeKind::UsingDirective { .. } => "UsingDirective",
            NodeKind::HtmlContent => "HtmlContent",
            NodeKind::HtmlAttribute { .. } => "HtmlAttribute",
            NodeKind::HtmlAttributeValue { .. } => "HtmlAttributeValue",
            NodeKind::CSharpExpressionAttributeValue { .. } => "CSharpExpressionAttributeValue",
            NodeKind::CSharpCode => "CSharpCode",
            NodeKind::CSharpExpression => "CSharpExpression",
            NodeKind::IntermediateToken { .. } => "IntermediateToken",
            NodeKind::Section { .. } => "Section",
            NodeKind::TagHelper { .. } => "TagHelper",
            NodeKind::TagHelperBody => "TagHelperBody",
            NodeKind::TagHelperProperty { .. } => "TagHelperProperty",
            NodeKind::TagHelperHtmlAttribute { .. } => "TagHelperHtmlAttribute",
            NodeKind::ViewComponentTagHelper { .. } => "ViewComponentTagHelper",
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, NodeKind::Directive { .. } | NodeKind::MalformedDirective { .. })
    }

    /// Directive name of `Directive` and `MalformedDirective` nodes
    pub fn directive_name(&self) -> Option<&str> {
        match self {
            NodeKind::Directive { name, .. } | NodeKind::MalformedDirective { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// One node of the lowered document.
///
/// Every node owns its children; `source` maps it back to the text it was
/// lowered from when there is such text.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediateNode {
    pub kind: NodeKind,
    pub source: Option<SourceSpan>,
    pub children: Vec<IntermediateNode>,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl IntermediateNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            source: None,
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: SourceSpan) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_children(mut self, children: Vec<IntermediateNode>) -> Self {
        self.children = children;
        self
    }

    /// Leaf token node
    pub fn token(kind: TokenKind, content: impl Into<String>) -> Self {
        Self::new(NodeKind::IntermediateToken {
            kind,
            content: content.into(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Concatenated content of the token descendants
    pub fn content(&self) -> String {
        let mut content = String::new();
        for node in self.descendants() {
            if let NodeKind::IntermediateToken { content: text, .. } = &node.kind {
                content.push_str(text);
            }
        }
        content
    }

    /// Pre-order traversal, `self` included
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find_descendants<'a>(
        &'a self,
        predicate: impl Fn(&IntermediateNode) -> bool + 'a,
    ) -> impl Iterator<Item = &'a IntermediateNode> + 'a {
        self.descendants().skip(1).filter(move |node| predicate(node))
    }

    /// Mutable pre-order search for the first node matching `predicate`
    pub fn find_mut(
        &mut self,
        predicate: &impl Fn(&IntermediateNode) -> bool,
    ) -> Option<&mut IntermediateNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(predicate))
    }

    /// Diagnostics of this node and its descendants
    pub fn all_diagnostics(&self) -> Vec<&RazorDiagnostic> {
        self.descendants()
            .flat_map(|node| node.diagnostics.iter())
            .collect()
    }
}

/// Iterator returned by [`IntermediateNode::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a IntermediateNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a IntermediateNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Stack-based construction of a node tree during lowering
#[derive(Debug)]
pub struct IntermediateNodeBuilder {
    stack: Vec<IntermediateNode>,
}

impl IntermediateNodeBuilder {
    pub fn new(root: IntermediateNode) -> Self {
        Self { stack: vec![root] }
    }

    /// The node children are currently added to
    pub fn current(&mut self) -> &mut IntermediateNode {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn add(&mut self, node: IntermediateNode) {
        self.current().children.push(node);
    }

    pub fn push(&mut self, node: IntermediateNode) {
        self.stack.push(node);
    }

    /// Close the innermost pushed node and add it to its parent. The root is
    /// never popped.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            if let Some(node) = self.stack.pop() {
                self.add(node);
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Close every open node and return the root
    pub fn build(mut self) -> IntermediateNode {
        while self.stack.len() > 1 {
            self.pop();
        }
        self.stack.swap_remove(0)
    }
}
