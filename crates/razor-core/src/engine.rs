//! Document pipeline: parse, scope descriptors, rewrite, lower, run passes

use std::path::Path;
use std::sync::Arc;

use crate::config::{RazorParserOptions, TagHelperDiscovery};
use crate::cst::RazorSyntaxTree;
use crate::diagnostics::{RazorDiagnostic, sort_diagnostics};
use crate::intermediate::{
    IntermediateNode, IntermediateNodePass, PassContext, default_passes, lower_document,
    run_passes,
};
use crate::result::Result;
use crate::source::SourceDocument;
use crate::tag_helpers::{
    DescriptorCache, DescriptorCatalog, StringCache, TagHelperBinder, UsedDescriptors,
    rewrite_tag_helpers,
};

/// Everything produced for one document
#[derive(Debug, Clone)]
pub struct RazorCodeDocument {
    /// Tree as parsed, before tag helper rewriting
    pub syntax_tree: RazorSyntaxTree,
    pub tag_helper_tree: RazorSyntaxTree,
    pub used_descriptors: UsedDescriptors,
    pub document_node: IntermediateNode,
    /// Tree and descriptor diagnostics, sorted by offset
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl RazorCodeDocument {
    pub fn source(&self) -> &Arc<SourceDocument> {
        self.syntax_tree.source()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(RazorDiagnostic::is_error)
    }
}

/// Runs documents through the whole front end with one set of options.
///
/// The engine holds no per-document state; a shared engine can process
/// distinct documents from several threads.
pub struct RazorEngine {
    options: Arc<RazorParserOptions>,
    discovery: TagHelperDiscovery,
    strings: Arc<StringCache>,
    descriptors: DescriptorCache,
    passes: Vec<Box<dyn IntermediateNodePass>>,
}

impl RazorEngine {
    pub fn new(options: RazorParserOptions, strings: Arc<StringCache>) -> Self {
        Self {
            options: Arc::new(options),
            discovery: TagHelperDiscovery::default(),
            strings,
            descriptors: DescriptorCache::new(),
            passes: default_passes(),
        }
    }

    pub fn with_discovery(mut self, discovery: TagHelperDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    /// Replace the default pass set
    pub fn with_passes(mut self, passes: Vec<Box<dyn IntermediateNodePass>>) -> Self {
        self.passes = passes;
        self
    }

    pub fn options(&self) -> &RazorParserOptions {
        &self.options
    }

    /// Load and merge JSON descriptor catalogs, sharing interned strings and
    /// descriptors across files
    pub fn load_catalogs<P: AsRef<Path>>(&self, paths: &[P]) -> Result<DescriptorCatalog> {
        let mut catalog = DescriptorCatalog::new();
        for path in paths {
            let loaded = DescriptorCatalog::load_file(path.as_ref(), &self.strings, &self.descriptors)?;
            catalog.extend(&loaded);
        }
        Ok(catalog)
    }

    /// Parse only
    pub fn parse(&self, source: SourceDocument) -> RazorSyntaxTree {
        RazorSyntaxTree::parse(source, RazorParserOptions::clone(&self.options))
    }

    #[tracing::instrument(skip_all, fields(path = ?source.file_path()))]
    pub fn process(&self, source: SourceDocument, catalog: &DescriptorCatalog) -> RazorCodeDocument {
        let syntax_tree = self.parse(source);

        let scope = catalog.scope_for(&syntax_tree, self.discovery);
        let binder = TagHelperBinder::new(scope.prefix, scope.descriptors);
        let (tag_helper_tree, used_descriptors) = rewrite_tag_helpers(&syntax_tree, &binder);

        let mut document_node = lower_document(&tag_helper_tree);
        let context = PassContext {
            source: tag_helper_tree.source(),
            options: tag_helper_tree.options(),
        };
        run_passes(&self.passes, &context, &mut document_node);

        let mut diagnostics = tag_helper_tree.diagnostics().to_vec();
        for descriptor in &used_descriptors {
            diagnostics.extend(descriptor.diagnostics.iter().cloned());
        }
        sort_diagnostics(&mut diagnostics);

        tracing::debug!(
            used = used_descriptors.len(),
            diagnostics = diagnostics.len(),
            "processed document"
        );
        RazorCodeDocument {
            syntax_tree,
            tag_helper_tree,
            used_descriptors,
            document_node,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intermediate::NodeKind;
    use crate::tag_helpers::{TagHelperDescriptorBuilder, TagHelperKind};

    fn catalog() -> DescriptorCatalog {
        DescriptorCatalog::from_descriptors([TagHelperDescriptorBuilder::new(
            TagHelperKind::TagHelper,
            "Test.PTagHelper",
            "Test",
        )
        .tag_matching_rule(|rule| {
            rule.tag_name("p");
        })
        .build()])
    }

    fn engine() -> RazorEngine {
        RazorEngine::new(RazorParserOptions::default(), Arc::new(StringCache::new()))
    }

    #[test]
    fn test_code_document_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RazorCodeDocument>();
        assert_send_sync::<RazorEngine>();
    }

    #[test]
    fn test_directives_scope_descriptors() {
        let text = "@addTagHelper *, Test\n<p>hi</p>";
        let document = engine().process(SourceDocument::new(text, None), &catalog());
        assert_eq!(document.used_descriptors.len(), 1);
        assert!(
            document
                .document_node
                .find_descendants(|n| matches!(n.kind, NodeKind::TagHelper { .. }))
                .next()
                .is_some()
        );

        let document = engine().process(SourceDocument::new("<p>hi</p>", None), &catalog());
        assert!(document.used_descriptors.is_empty());
    }

    #[test]
    fn test_discovery_all_needs_no_directive() {
        let engine = engine().with_discovery(TagHelperDiscovery::All);
        let document = engine.process(SourceDocument::new("<p>hi</p>", None), &catalog());
        assert_eq!(document.used_descriptors.len(), 1);
        assert_eq!(document.tag_helper_tree.text(), "<p>hi</p>");
        assert_eq!(document.syntax_tree.text(), "<p>hi</p>");
    }

    #[test]
    fn test_diagnostics_are_merged_and_sorted() {
        let engine = engine().with_discovery(TagHelperDiscovery::All);
        let document = engine.process(SourceDocument::new("@(x\n<div><p>a</div>", None), &catalog());
        assert!(document.has_errors());
        let offsets: Vec<usize> = document.diagnostics.iter().map(|d| d.span.absolute_index).collect();
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn test_custom_passes_replace_defaults() {
        let engine = engine().with_passes(Vec::new());
        let document = engine.process(SourceDocument::new("<p></p>", None), &DescriptorCatalog::new());
        assert_eq!(document.document_node.children[0].name(), "HtmlContent");
    }

    #[test]
    fn test_load_catalogs_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, catalog().to_json().unwrap()).unwrap();
        let engine = engine();
        let merged = engine.load_catalogs(&[&path, &path]).unwrap();
        assert_eq!(merged.len(), 1);
    }
}
