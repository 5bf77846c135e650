//! Out-of-band node annotations
//!
//! Annotations live in a side table keyed by green node identity rather than
//! inside the nodes, so attaching or replacing one never rebuilds the tree.
//! The table keeps a handle to every annotated green node, which keeps the
//! identity key valid for as long as the entry exists.

use rowan::{GreenNode, GreenNodeData};
use std::collections::HashMap;
use std::sync::Arc;

use super::{SpanContext, SyntaxNode};
use crate::tag_helpers::{TagHelperAttributeInfo, TagHelperInfo};

/// Annotation kind carrying a span's [`SpanContext`]
pub const SPAN_CONTEXT: &str = "SpanContext";
/// Annotation kind carrying a tag helper element's binding
pub const TAG_HELPER_INFO: &str = "TagHelperInfo";
/// Annotation kind carrying a tag helper attribute's binding
pub const TAG_HELPER_ATTRIBUTE_INFO: &str = "TagHelperAttributeInfo";

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    SpanContext(Arc<SpanContext>),
    TagHelperInfo(Arc<TagHelperInfo>),
    TagHelperAttributeInfo(Arc<TagHelperAttributeInfo>),
}

/// A keyed annotation
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxAnnotation {
    pub kind: &'static str,
    pub value: AnnotationValue,
}

impl SyntaxAnnotation {
    pub fn span_context(context: Arc<SpanContext>) -> Self {
        Self {
            kind: SPAN_CONTEXT,
            value: AnnotationValue::SpanContext(context),
        }
    }

    pub fn tag_helper_info(info: Arc<TagHelperInfo>) -> Self {
        Self {
            kind: TAG_HELPER_INFO,
            value: AnnotationValue::TagHelperInfo(info),
        }
    }

    pub fn tag_helper_attribute_info(info: Arc<TagHelperAttributeInfo>) -> Self {
        Self {
            kind: TAG_HELPER_ATTRIBUTE_INFO,
            value: AnnotationValue::TagHelperAttributeInfo(info),
        }
    }
}

#[derive(Debug, Clone)]
struct AnnotationEntry {
    /// Holds the node alive so its address stays a valid key
    _green: GreenNode,
    annotations: Vec<SyntaxAnnotation>,
}

/// Identity of a green node
pub type NodeKey = usize;

/// Copy-on-write map from green node identity to annotations
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    entries: Arc<HashMap<NodeKey, AnnotationEntry>>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_of(green: &GreenNodeData) -> NodeKey {
        green as *const GreenNodeData as usize
    }

    pub fn node_key(node: &SyntaxNode) -> NodeKey {
        Self::key_of(&node.green())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn annotations_of(&self, green: &GreenNodeData) -> &[SyntaxAnnotation] {
        self.entries
            .get(&Self::key_of(green))
            .map(|entry| entry.annotations.as_slice())
            .unwrap_or(&[])
    }

    pub fn annotations(&self, node: &SyntaxNode) -> &[SyntaxAnnotation] {
        self.entries
            .get(&Self::node_key(node))
            .map(|entry| entry.annotations.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, node: &SyntaxNode, kind: &str) -> Option<&AnnotationValue> {
        self.annotations(node)
            .iter()
            .find(|annotation| annotation.kind == kind)
            .map(|annotation| &annotation.value)
    }

    pub fn span_context(&self, node: &SyntaxNode) -> Option<&Arc<SpanContext>> {
        match self.get(node, SPAN_CONTEXT)? {
            AnnotationValue::SpanContext(context) => Some(context),
            _ => None,
        }
    }

    pub fn span_context_of(&self, green: &GreenNodeData) -> Option<&Arc<SpanContext>> {
        self.annotations_of(green)
            .iter()
            .find_map(|annotation| match &annotation.value {
                AnnotationValue::SpanContext(context) => Some(context),
                _ => None,
            })
    }

    pub fn tag_helper_info(&self, node: &SyntaxNode) -> Option<&Arc<TagHelperInfo>> {
        match self.get(node, TAG_HELPER_INFO)? {
            AnnotationValue::TagHelperInfo(info) => Some(info),
            _ => None,
        }
    }

    pub fn tag_helper_attribute_info(
        &self,
        node: &SyntaxNode,
    ) -> Option<&Arc<TagHelperAttributeInfo>> {
        match self.get(node, TAG_HELPER_ATTRIBUTE_INFO)? {
            AnnotationValue::TagHelperAttributeInfo(info) => Some(info),
            _ => None,
        }
    }

    /// Attach `annotation`, replacing an existing annotation of the same kind
    /// and keeping annotations of other kinds
    pub fn set_annotation(&mut self, green: &GreenNode, annotation: SyntaxAnnotation) {
        self.with_annotations(green, vec![annotation]);
    }

    /// Attach several annotations; for each kind present in `annotations`
    /// the previous value is dropped, other kinds survive
    pub fn with_annotations(&mut self, green: &GreenNode, annotations: Vec<SyntaxAnnotation>) {
        let entries = Arc::make_mut(&mut self.entries);
        let entry = entries
            .entry(Self::key_of(green))
            .or_insert_with(|| AnnotationEntry {
                _green: green.clone(),
                annotations: Vec::new(),
            });
        let mut merged: Vec<SyntaxAnnotation> = entry
            .annotations
            .iter()
            .filter(|existing| annotations.iter().all(|new| new.kind != existing.kind))
            .cloned()
            .collect();
        merged.extend(annotations);
        entry.annotations = merged;
    }

    /// Give `to` every annotation `from` has
    pub fn copy_annotations(&mut self, from: &GreenNodeData, to: &GreenNode) {
        let annotations = self.annotations_of(from).to_vec();
        if !annotations.is_empty() {
            self.with_annotations(to, annotations);
        }
    }

    pub fn remove(&mut self, green: &GreenNodeData) {
        let key = Self::key_of(green);
        if self.entries.contains_key(&key) {
            Arc::make_mut(&mut self.entries).remove(&key);
        }
    }

}
