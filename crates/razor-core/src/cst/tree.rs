//! The immutable result of parsing one document

use rowan::GreenNode;
use std::sync::Arc;

use super::{AnnotationTable, SpanContext, SyntaxNode};
use crate::config::RazorParserOptions;
use crate::diagnostics::RazorDiagnostic;
use crate::lexer::SpanTokenizer;
use crate::source::SourceDocument;

/// Green root, annotation side table, diagnostics, source and options.
///
/// Every field is immutable and shared, so a tree is `Send + Sync` and can be
/// read from several threads at once. Red nodes are created on demand by
/// [`root`](Self::root) and are not themselves shareable across threads.
#[derive(Debug, Clone)]
pub struct RazorSyntaxTree {
    green: GreenNode,
    annotations: AnnotationTable,
    diagnostics: Arc<[RazorDiagnostic]>,
    source: Arc<SourceDocument>,
    options: Arc<RazorParserOptions>,
}

impl RazorSyntaxTree {
    pub fn new(
        green: GreenNode,
        annotations: AnnotationTable,
        mut diagnostics: Vec<RazorDiagnostic>,
        source: Arc<SourceDocument>,
        options: Arc<RazorParserOptions>,
    ) -> Self {
        crate::diagnostics::sort_diagnostics(&mut diagnostics);
        Self {
            green,
            annotations,
            diagnostics: diagnostics.into(),
            source,
            options,
        }
    }

    /// Parse `source` into a tree
    pub fn parse(source: SourceDocument, options: RazorParserOptions) -> Self {
        crate::parser::RazorParser::new(Arc::new(options)).parse(Arc::new(source))
    }

    /// Red root; O(1), children are materialized lazily
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn annotations(&self) -> &AnnotationTable {
        &self.annotations
    }

    pub fn diagnostics(&self) -> &[RazorDiagnostic] {
        &self.diagnostics
    }

    pub fn source(&self) -> &Arc<SourceDocument> {
        &self.source
    }

    pub fn options(&self) -> &Arc<RazorParserOptions> {
        &self.options
    }

    /// Span context of a span, falling back to a plain handler for
    /// unannotated spans
    pub fn span_context(&self, span: &SyntaxNode) -> Arc<SpanContext> {
        if let Some(context) = self.annotations.span_context(span) {
            return context.clone();
        }
        let tokenizer = if span.kind().is_code_span() {
            SpanTokenizer::CSharp
        } else {
            SpanTokenizer::Markup
        };
        Arc::new(SpanContext::default_for(tokenizer))
    }

    /// Same source and options with a new root, annotations and diagnostics
    pub fn with_root(
        &self,
        green: GreenNode,
        annotations: AnnotationTable,
        diagnostics: Vec<RazorDiagnostic>,
    ) -> Self {
        Self::new(
            green,
            annotations,
            diagnostics,
            self.source.clone(),
            self.options.clone(),
        )
    }

    /// Full text of the tree; equal to the source text for a parsed tree
    pub fn text(&self) -> String {
        self.green.to_string()
    }
}
