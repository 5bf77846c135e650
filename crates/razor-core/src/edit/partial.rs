//! In-place reparse of a single span

use std::sync::Arc;

use super::PartialParseResult;
use crate::cst::{AnnotationTable, RazorNodeExt, RazorSyntaxTree, SyntaxNode, locate_owner};
use crate::diagnostics::RazorDiagnostic;
use crate::result::Result;
use crate::source::{SourceChange, SourceDocument};

/// Result of [`RazorSyntaxTree::try_partial_parse`]
#[derive(Debug, Clone)]
pub struct PartialParseOutcome {
    pub result: PartialParseResult,
    /// The edited tree when the change was absorbed
    pub tree: Option<RazorSyntaxTree>,
}

impl PartialParseOutcome {
    fn rejected(result: PartialParseResult) -> Self {
        Self { result, tree: None }
    }
}

const LEXER_DIAGNOSTICS: [&str; 3] = ["RZ1000", "RZ1001", "RZ1002"];

impl RazorSyntaxTree {
    /// Absorb `change` by re-lexing the span that owns it.
    ///
    /// On acceptance the returned tree shares every untouched subtree with
    /// this one. On rejection no tree is returned and the caller reparses.
    pub fn try_partial_parse(&self, change: &SourceChange) -> Result<PartialParseOutcome> {
        let root = self.root();
        let Some(owner) = locate_owner(&root, change, self.annotations()) else {
            tracing::debug!(start = change.start(), "no span owns the change");
            return Ok(PartialParseOutcome::rejected(PartialParseResult::REJECTED));
        };

        let context = self.span_context(&owner);
        let edit = context.edit_handler.apply_change(&owner, change, false)?;
        if !edit.result.is_accepted() {
            tracing::debug!(result = ?edit.result, kind = %owner.kind(), "partial parse rejected");
            return Ok(PartialParseOutcome::rejected(edit.result));
        }

        let source = self.source().with_change(change)?;
        let new_root = SyntaxNode::new_root(owner.replace_with(edit.span.clone()));

        let mut annotations = self.annotations().clone();
        annotations.copy_annotations(&owner.green(), &edit.span);
        annotations.remove(&owner.green());
        carry_ancestor_annotations(&owner, &new_root, &mut annotations);

        let delta = change.new_text.len() as isize - change.span.length as isize;
        let span_start = owner.position();
        let span_end = owner.end_position();
        let mut diagnostics: Vec<RazorDiagnostic> = self
            .diagnostics()
            .iter()
            .filter(|d| {
                let offset = d.span.absolute_index;
                !(LEXER_DIAGNOSTICS.contains(&d.id.as_str()) && offset >= span_start && offset < span_end)
            })
            .map(|d| shift(d, change.end(), delta, &source))
            .collect();
        diagnostics.extend(edit.diagnostics.iter().map(|d| {
            let mut rebased = d.clone();
            rebased.span = source.span(span_start + d.span.absolute_index, d.span.length);
            rebased
        }));

        tracing::debug!(kind = %owner.kind(), position = span_start, "partial parse accepted");
        let tree = RazorSyntaxTree::new(
            new_root.green().into_owned(),
            annotations,
            diagnostics,
            Arc::new(source),
            self.options().clone(),
        );
        Ok(PartialParseOutcome {
            result: edit.result,
            tree: Some(tree),
        })
    }
}

/// Ancestors of a replaced span are rebuilt with new identities; move their
/// annotations over by following the same child path in the new tree
fn carry_ancestor_annotations(
    owner: &SyntaxNode,
    new_root: &SyntaxNode,
    annotations: &mut AnnotationTable,
) {
    let mut path = Vec::new();
    let mut current = owner.clone();
    while let Some(parent) = current.parent() {
        path.push(current.index());
        current = parent;
    }
    path.reverse();

    let mut old = current;
    let mut new = new_root.clone();
    annotations.copy_annotations(&old.green(), &new.green().into_owned());
    annotations.remove(&old.green());
    // the last step is the span itself, already handled
    for index in path.iter().take(path.len().saturating_sub(1)) {
        let (Some(old_child), Some(new_child)) = (nth_node(&old, *index), nth_node(&new, *index))
        else {
            return;
        };
        annotations.copy_annotations(&old_child.green(), &new_child.green().into_owned());
        annotations.remove(&old_child.green());
        old = old_child;
        new = new_child;
    }
}

fn nth_node(parent: &SyntaxNode, index: usize) -> Option<SyntaxNode> {
    parent
        .children_with_tokens()
        .nth(index)
        .and_then(|element| element.into_node())
}

fn shift(
    diagnostic: &RazorDiagnostic,
    change_end: usize,
    delta: isize,
    source: &SourceDocument,
) -> RazorDiagnostic {
    let mut shifted = diagnostic.clone();
    if diagnostic.span.absolute_index >= change_end {
        let start = diagnostic.span.absolute_index.saturating_add_signed(delta);
        shifted.span = source.span(start, diagnostic.span.length);
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RazorParserOptions;
    use crate::cst::SyntaxKind;

    fn parse(text: &str) -> RazorSyntaxTree {
        RazorSyntaxTree::parse(SourceDocument::new(text, None), RazorParserOptions::default())
    }

    #[test]
    fn test_accepts_identifier_edit_in_code_block() {
        let tree = parse("<p></p>@{ var x = 1; }");
        let change = SourceChange::new(tree.source().span(15, 0), "y");
        let outcome = tree.try_partial_parse(&change).unwrap();
        assert!(outcome.result.is_accepted());
        let edited = outcome.tree.unwrap();
        assert_eq!(edited.text(), "<p></p>@{ var xy = 1; }");
        assert_eq!(edited.source().text(), edited.text());

        // the edited span keeps its context
        let span = edited
            .root()
            .spans()
            .into_iter()
            .find(|s| s.kind() == SyntaxKind::CSharpStatementLiteral)
            .unwrap();
        assert!(edited.annotations().span_context(&span).is_some());
        // untouched markup keeps its identity
        let element = |t: &RazorSyntaxTree| {
            let block = t.root().first_child().unwrap();
            AnnotationTable::node_key(&block.first_child().unwrap())
        };
        assert_eq!(element(&edited), element(&tree));
    }

    #[test]
    fn test_rejects_brace_insertion() {
        let tree = parse("@{ var x = 1; }");
        let change = SourceChange::new(tree.source().span(8, 0), "{");
        let outcome = tree.try_partial_parse(&change).unwrap();
        assert!(outcome.result.is_rejected());
        assert!(outcome.tree.is_none());
    }

    #[test]
    fn test_newline_after_open_brace_requests_auto_complete() {
        let tree = parse("@{");
        let change = SourceChange::new(tree.source().span(2, 0), "\n");
        let outcome = tree.try_partial_parse(&change).unwrap();
        assert!(outcome.result.contains(PartialParseResult::AUTO_COMPLETE_BLOCK));
        assert!(outcome.tree.is_none());
    }

    #[test]
    fn test_diagnostics_after_edit_shift() {
        let tree = parse("@{ var x = 1; } @(");
        assert!(tree.diagnostics().iter().any(|d| d.id == "RZ1027"));
        let before = tree
            .diagnostics()
            .iter()
            .find(|d| d.id == "RZ1027")
            .unwrap()
            .span
            .absolute_index;
        let change = SourceChange::new(tree.source().span(8, 0), "yz");
        let edited = tree.try_partial_parse(&change).unwrap().tree.unwrap();
        let after = edited
            .diagnostics()
            .iter()
            .find(|d| d.id == "RZ1027")
            .unwrap()
            .span
            .absolute_index;
        assert_eq!(after, before + 2);
    }
}
