//! Descriptor catalogs and per-document descriptor scoping

use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use super::cache::{DescriptorCache, StringCache};
use super::descriptor::{Checksum, TagHelperDescriptor};
use crate::config::TagHelperDiscovery;
use crate::cst::{ChunkGenerator, RazorNodeExt, RazorSyntaxTree};
use crate::error::RazorError;
use crate::result::Result;

/// An ordered, duplicate-free set of descriptors
#[derive(Debug, Clone, Default)]
pub struct DescriptorCatalog {
    descriptors: IndexMap<Checksum, Arc<TagHelperDescriptor>>,
}

impl DescriptorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TagHelperDescriptor>) -> Self {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert(Arc::new(descriptor));
        }
        catalog
    }

    /// Read a JSON array of descriptors
    pub fn load_json(text: &str, strings: &StringCache) -> Result<Self> {
        Self::load_json_with(text, strings, &DescriptorCache::new())
    }

    /// Like [`load_json`](Self::load_json), sharing descriptor instances
    /// through `descriptors`
    pub fn load_json_with(
        text: &str,
        strings: &StringCache,
        descriptors: &DescriptorCache,
    ) -> Result<Self> {
        let loaded: Vec<TagHelperDescriptor> = serde_json::from_str(text).map_err(|e| {
            RazorError::descriptor_error(format!("Invalid descriptor catalog: {e}"))
        })?;
        let total = loaded.len();
        let mut catalog = Self::new();
        for descriptor in loaded {
            catalog.insert(descriptors.get_or_insert(descriptor.intern(strings)));
        }
        tracing::debug!(total, unique = catalog.len(), "loaded descriptor catalog");
        Ok(catalog)
    }

    pub fn load_file(path: &Path, strings: &StringCache, descriptors: &DescriptorCache) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| RazorError::io_error(path, e))?;
        Self::load_json_with(&text, strings, descriptors).map_err(|e| match e {
            RazorError::DescriptorError { message } => {
                RazorError::descriptor_error(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        let descriptors: Vec<&TagHelperDescriptor> = self.iter().map(Arc::as_ref).collect();
        serde_json::to_string_pretty(&descriptors)
            .map_err(|e| RazorError::descriptor_error(format!("Cannot serialize catalog: {e}")))
    }

    /// Add a descriptor unless an equal one is already present
    pub fn insert(&mut self, descriptor: Arc<TagHelperDescriptor>) -> bool {
        let checksum = descriptor.checksum();
        if self.descriptors.contains_key(&checksum) {
            return false;
        }
        self.descriptors.insert(checksum, descriptor);
        true
    }

    pub fn extend(&mut self, other: &DescriptorCatalog) {
        for descriptor in other.iter() {
            self.insert(descriptor.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TagHelperDescriptor>> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors visible to `tree` and its tag prefix.
    ///
    /// Component documents see the whole catalog. Legacy documents apply
    /// their `@addTagHelper`, `@removeTagHelper` and `@tagHelperPrefix`
    /// directives in document order, starting from nothing, or from the
    /// whole catalog under [`TagHelperDiscovery::All`].
    pub fn scope_for(&self, tree: &RazorSyntaxTree, discovery: TagHelperDiscovery) -> DocumentScope {
        if tree.options().file_kind.is_component() {
            return DocumentScope {
                descriptors: self.iter().cloned().collect(),
                prefix: None,
            };
        }

        let mut visible: IndexMap<Checksum, Arc<TagHelperDescriptor>> = match discovery {
            TagHelperDiscovery::All => self.descriptors.clone(),
            TagHelperDiscovery::Directives => IndexMap::new(),
        };
        let mut prefix = None;
        for span in tree.root().spans() {
            let Some(context) = tree.annotations().span_context(&span) else {
                continue;
            };
            match &context.chunk_generator {
                ChunkGenerator::AddTagHelper {
                    type_pattern: Some(pattern),
                    assembly_name: Some(assembly),
                    ..
                } => {
                    for descriptor in self.iter() {
                        if lookup_matches(descriptor, pattern, assembly) {
                            visible.insert(descriptor.checksum(), descriptor.clone());
                        }
                    }
                }
                ChunkGenerator::RemoveTagHelper {
                    type_pattern: Some(pattern),
                    assembly_name: Some(assembly),
                    ..
                } => {
                    visible.retain(|_, descriptor| !lookup_matches(descriptor, pattern, assembly));
                }
                ChunkGenerator::TagHelperPrefix { prefix: value } => {
                    prefix = (!value.is_empty()).then(|| value.clone());
                }
                _ => {}
            }
        }

        tracing::debug!(
            visible = visible.len(),
            prefix = prefix.as_deref().unwrap_or_default(),
            "scoped descriptors"
        );
        DocumentScope {
            descriptors: visible.into_values().collect(),
            prefix,
        }
    }
}

/// `Type, Assembly` lookup text against a descriptor; `*` and a trailing
/// `*` in the type pattern are wildcards
fn lookup_matches(descriptor: &TagHelperDescriptor, pattern: &str, assembly: &str) -> bool {
    if !descriptor.assembly_name.eq_ignore_ascii_case(assembly) {
        return false;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => descriptor.name.starts_with(prefix),
        None => descriptor.name.as_ref() == pattern,
    }
}

/// The descriptors one document can bind to
#[derive(Debug, Clone, Default)]
pub struct DocumentScope {
    pub descriptors: Vec<Arc<TagHelperDescriptor>>,
    /// `@tagHelperPrefix` value every tag helper tag must carry
    pub prefix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileKind, RazorLanguageVersion, RazorParserOptions};
    use crate::source::SourceDocument;
    use crate::tag_helpers::{TagHelperDescriptorBuilder, TagHelperKind};

    fn descriptor(name: &str, assembly: &str, tag: &str) -> TagHelperDescriptor {
        TagHelperDescriptorBuilder::new(TagHelperKind::TagHelper, name, assembly)
            .tag_matching_rule(|rule| {
                rule.tag_name(tag);
            })
            .build()
    }

    fn catalog() -> DescriptorCatalog {
        DescriptorCatalog::from_descriptors([
            descriptor("Mvc.FormTagHelper", "Mvc", "form"),
            descriptor("Mvc.InputTagHelper", "Mvc", "input"),
            descriptor("Other.PTagHelper", "Other", "p"),
        ])
    }

    fn names(scope: &DocumentScope) -> Vec<&str> {
        scope.descriptors.iter().map(|d| d.name.as_ref()).collect()
    }

    fn legacy(text: &str) -> RazorSyntaxTree {
        RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default())
    }

    #[test]
    fn test_load_json_dedups_and_interns() {
        let json = serde_json::to_string(&vec![
            descriptor("Mvc.FormTagHelper", "Mvc", "form"),
            descriptor("Mvc.FormTagHelper", "Mvc", "form"),
            descriptor("Mvc.InputTagHelper", "Mvc", "input"),
        ])
        .unwrap();
        let strings = StringCache::new();
        let catalog = DescriptorCatalog::load_json(&json, &strings).unwrap();
        assert_eq!(catalog.len(), 2);
        let assemblies: Vec<_> = catalog.iter().map(|d| d.assembly_name.clone()).collect();
        assert!(Arc::ptr_eq(&assemblies[0], &assemblies[1]));
    }

    #[test]
    fn test_load_json_rejects_garbage() {
        let error = DescriptorCatalog::load_json("{ nope", &StringCache::new()).unwrap_err();
        assert!(matches!(error, RazorError::DescriptorError { .. }));
    }

    #[test]
    fn test_legacy_scope_follows_directives() {
        let tree = legacy(
            "@addTagHelper *, Mvc\n@addTagHelper Other.PTagHelper, Other\n@removeTagHelper Mvc.Input*, Mvc\n",
        );
        let scope = catalog().scope_for(&tree, TagHelperDiscovery::Directives);
        assert_eq!(names(&scope), ["Mvc.FormTagHelper", "Other.PTagHelper"]);
        assert_eq!(scope.prefix, None);
    }

    #[test]
    fn test_legacy_scope_without_directives_is_empty() {
        let tree = legacy("<form></form>");
        assert!(catalog().scope_for(&tree, TagHelperDiscovery::Directives).descriptors.is_empty());
        assert_eq!(catalog().scope_for(&tree, TagHelperDiscovery::All).descriptors.len(), 3);
    }

    #[test]
    fn test_prefix_directive() {
        let tree = legacy("@tagHelperPrefix \"th:\"\n@addTagHelper *, Other\n");
        let scope = catalog().scope_for(&tree, TagHelperDiscovery::Directives);
        assert_eq!(scope.prefix.as_deref(), Some("th:"));
        assert_eq!(names(&scope), ["Other.PTagHelper"]);
    }

    #[test]
    fn test_component_scope_sees_everything() {
        let tree = RazorSyntaxTree::parse(
            SourceDocument::new("<p></p>", None),
            RazorParserOptions::new(FileKind::Component, RazorLanguageVersion::LATEST),
        );
        let scope = catalog().scope_for(&tree, TagHelperDiscovery::Directives);
        assert_eq!(scope.descriptors.len(), 3);
    }
}
