//! Intermediate representation consumed by code generation
//!
//! [`lower_document`] turns a rewritten syntax tree into a tree of
//! [`IntermediateNode`]s; [`run_passes`] then classifies and reshapes it.

mod formatter;
mod lowering;
mod node;
mod passes;
mod visitor;

pub use formatter::format_node;
pub use lowering::lower_document;
pub use node::{Descendants, IntermediateNode, IntermediateNodeBuilder, NodeKind, TokenKind};
pub use passes::{
    DEFAULT_CLASS_NAME, DEFAULT_NAMESPACE, DocumentClassifierPass, EXECUTE_METHOD_NAME,
    IntermediateNodePass, PageDirective, PassContext, SectionDirectivePass,
    ViewComponentTagHelperPass, default_passes, run_passes,
};
pub use visitor::IntermediateNodeVisitor;
