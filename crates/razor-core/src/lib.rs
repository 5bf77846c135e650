//! Razor Core
//!
//! Front end for Razor templates: markup with embedded C#.
//! This crate tokenizes and parses documents into a lossless syntax tree,
//! binds tag helpers, supports incremental edits, and lowers the result
//! into an intermediate tree for code generation.

pub mod config;
pub mod cst;
pub mod diagnostics;
pub mod edit;
pub mod engine;
pub mod error;
pub mod intermediate;
pub mod lexer;
pub mod parser;
pub mod result;
pub mod source;
pub mod tag_helpers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileKind, RazorConfiguration, RazorLanguageVersion, RazorParserFeatureFlags,
    RazorParserOptions, TagHelperDiscovery,
};
pub use cst::{
    AnnotationTable, ChunkGenerator, RazorNodeExt, RazorSyntaxTree, SpanContext, SyntaxKind,
    SyntaxNode, SyntaxToken, locate_owner,
};
pub use diagnostics::{RazorDiagnostic, Severity};
pub use edit::{AcceptedCharacters, EditHandler, PartialParseOutcome, PartialParseResult};
pub use engine::{RazorCodeDocument, RazorEngine};
pub use error::{ErrorKind, RazorError};
pub use intermediate::{
    IntermediateNode, IntermediateNodePass, IntermediateNodeVisitor, NodeKind, PageDirective,
    format_node, lower_document,
};
pub use lexer::{CSharpTokenizer, HtmlTokenizer, SpanTokenizer, Token, Tokenizer};
pub use parser::RazorParser;
pub use result::Result;
pub use source::{SourceChange, SourceDocument, SourceLocation, SourceSpan};
pub use tag_helpers::{
    DescriptorCatalog, StringCache, TagHelperBinder, TagHelperDescriptor,
    TagHelperDescriptorBuilder, rewrite_tag_helpers,
};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("razor=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
