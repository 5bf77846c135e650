//! Per-span metadata: what a span generates and how it absorbs edits

use std::fmt;
use std::sync::Arc;

use crate::edit::{AcceptedCharacters, EditHandler};
use crate::lexer::SpanTokenizer;
use crate::parser::directives::{DirectiveDescriptor, DirectiveTokenDescriptor};

/// What downstream code generation emits for a span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkGenerator {
    /// Nothing; transitions, meta code and other Razor punctuation
    None,
    /// Literal markup
    Markup,
    /// C# statement code
    Statement,
    /// C# expression whose value is written to the output
    Expression,
    /// `@using` import
    AddImport { namespace: String, is_static: bool },
    /// Keyword of a directive
    Directive { descriptor: Arc<DirectiveDescriptor> },
    /// Argument of a directive
    DirectiveToken { descriptor: DirectiveTokenDescriptor },
    /// `@addTagHelper` lookup text
    AddTagHelper {
        lookup_text: String,
        type_pattern: Option<String>,
        assembly_name: Option<String>,
    },
    /// `@removeTagHelper` lookup text
    RemoveTagHelper {
        lookup_text: String,
        type_pattern: Option<String>,
        assembly_name: Option<String>,
    },
    /// `@tagHelperPrefix` value
    TagHelperPrefix { prefix: String },
}

impl ChunkGenerator {
    pub fn is_none(&self) -> bool {
        matches!(self, ChunkGenerator::None)
    }
}

impl fmt::Display for ChunkGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkGenerator::None => write!(f, "Gen<None>"),
            ChunkGenerator::Markup => write!(f, "Gen<Markup>"),
            ChunkGenerator::Statement => write!(f, "Gen<Stmt>"),
            ChunkGenerator::Expression => write!(f, "Gen<Expr>"),
            ChunkGenerator::AddImport {
                namespace,
                is_static,
            } => write!(f, "Gen<Import:{namespace};static={is_static}>"),
            ChunkGenerator::Directive { descriptor } => {
                write!(f, "Gen<Directive:{}>", descriptor.directive)
            }
            ChunkGenerator::DirectiveToken { descriptor } => {
                write!(f, "Gen<DirectiveToken:{}>", descriptor.kind)
            }
            ChunkGenerator::AddTagHelper { lookup_text, .. } => {
                write!(f, "Gen<AddTagHelper:{lookup_text}>")
            }
            ChunkGenerator::RemoveTagHelper { lookup_text, .. } => {
                write!(f, "Gen<RemoveTagHelper:{lookup_text}>")
            }
            ChunkGenerator::TagHelperPrefix { prefix } => {
                write!(f, "Gen<TagHelperPrefix:{prefix}>")
            }
        }
    }
}

/// The chunk generator and edit handler of one span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    pub chunk_generator: ChunkGenerator,
    pub edit_handler: EditHandler,
}

impl SpanContext {
    pub fn new(chunk_generator: ChunkGenerator, edit_handler: EditHandler) -> Self {
        Self {
            chunk_generator,
            edit_handler,
        }
    }

    /// Context assumed for spans that carry no annotation
    pub fn default_for(tokenizer: SpanTokenizer) -> Self {
        let generator = match tokenizer {
            SpanTokenizer::Markup => ChunkGenerator::Markup,
            SpanTokenizer::CSharp => ChunkGenerator::Statement,
        };
        Self::new(
            generator,
            EditHandler::plain(tokenizer, AcceptedCharacters::Any),
        )
    }

    pub fn with_accepted_characters(mut self, accepted: AcceptedCharacters) -> Self {
        self.edit_handler.accepted_characters = accepted;
        self
    }
}
