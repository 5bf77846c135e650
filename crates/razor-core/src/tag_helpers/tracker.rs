//! Open-tag bookkeeping for the rewriter

use super::binder::TagHelperBinding;

/// One open element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTracker {
    /// Name as written, prefix included
    pub tag_name: String,
    pub is_tag_helper: bool,
    /// Union of the bound descriptors' allowed child tags; `None` when no
    /// descriptor restricts its children
    pub allowed_children: Option<Vec<String>>,
    /// Plain tags with this helper's name currently open inside it
    pub open_matching_tags: usize,
}

impl TagTracker {
    pub fn plain(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            is_tag_helper: false,
            allowed_children: None,
            open_matching_tags: 0,
        }
    }

    pub fn tag_helper(tag_name: &str, binding: &TagHelperBinding) -> Self {
        let mut allowed: Vec<String> = Vec::new();
        for descriptor in binding.descriptors() {
            for child in &descriptor.allowed_child_tags {
                if !allowed.iter().any(|name| name.eq_ignore_ascii_case(&child.name)) {
                    allowed.push(child.name.to_string());
                }
            }
        }
        Self {
            tag_name: tag_name.to_string(),
            is_tag_helper: true,
            allowed_children: (!allowed.is_empty()).then_some(allowed),
            open_matching_tags: 0,
        }
    }

    pub fn allows_child(&self, tag_name: &str) -> bool {
        self.allowed_children.as_ref().is_none_or(|allowed| {
            allowed.iter().any(|name| name.eq_ignore_ascii_case(tag_name))
        })
    }

    pub fn restricts_children(&self) -> bool {
        self.allowed_children.is_some()
    }

    /// Allowed names joined for diagnostics
    pub fn allowed_children_text(&self) -> String {
        self.allowed_children
            .as_deref()
            .unwrap_or_default()
            .join(", ")
    }
}

/// What an end tag closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTagMatch {
    /// The innermost tag helper scope
    TagHelper,
    /// A plain tag that shares the scope's name
    NestedPlainTag,
    /// Nothing tracked
    Unmatched,
}

/// Stack of open elements, innermost last
#[derive(Debug, Clone, Default)]
pub struct TrackerStack {
    frames: Vec<TagTracker>,
}

impl TrackerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tracker: TagTracker) {
        self.frames.push(tracker);
    }

    pub fn pop(&mut self) -> Option<TagTracker> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top(&self) -> Option<&TagTracker> {
        self.frames.last()
    }

    /// Name and kind of the innermost open element, the binding parent
    pub fn parent(&self) -> Option<(&str, bool)> {
        self.top()
            .map(|tracker| (tracker.tag_name.as_str(), tracker.is_tag_helper))
    }

    pub fn current_tag_helper(&self) -> Option<&TagTracker> {
        self.frames.iter().rev().find(|tracker| tracker.is_tag_helper)
    }

    fn current_tag_helper_mut(&mut self) -> Option<&mut TagTracker> {
        self.frames.iter_mut().rev().find(|tracker| tracker.is_tag_helper)
    }

    /// The innermost tag helper when it directly contains new content and
    /// restricts its children
    pub fn restricting_parent(&self) -> Option<&TagTracker> {
        self.top()
            .filter(|tracker| tracker.is_tag_helper && tracker.restricts_children())
    }

    /// A start tag that did not bind; counted when it shares the name of
    /// the innermost tag helper so its end tag is not taken for the
    /// helper's own
    pub fn note_unbound_start(&mut self, tag_name: &str) {
        if let Some(tracker) = self.current_tag_helper_mut() {
            if tracker.tag_name.eq_ignore_ascii_case(tag_name) {
                tracker.open_matching_tags += 1;
            }
        }
    }

    /// Classify an end tag against the innermost tag helper scope
    pub fn end_tag(&mut self, tag_name: &str) -> EndTagMatch {
        let Some(tracker) = self.current_tag_helper_mut() else {
            return EndTagMatch::Unmatched;
        };
        if !tracker.tag_name.eq_ignore_ascii_case(tag_name) {
            return EndTagMatch::Unmatched;
        }
        if tracker.open_matching_tags > 0 {
            tracker.open_matching_tags -= 1;
            EndTagMatch::NestedPlainTag
        } else {
            EndTagMatch::TagHelper
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper(name: &str, allowed: Option<&[&str]>) -> TagTracker {
        TagTracker {
            tag_name: name.to_string(),
            is_tag_helper: true,
            allowed_children: allowed.map(|names| names.iter().map(|n| n.to_string()).collect()),
            open_matching_tags: 0,
        }
    }

    #[test]
    fn test_same_named_plain_tag_defers_scope_close() {
        let mut stack = TrackerStack::new();
        stack.push(helper("myth", None));
        stack.note_unbound_start("MYTH");
        assert_eq!(stack.current_tag_helper().unwrap().open_matching_tags, 1);
        assert_eq!(stack.end_tag("myth"), EndTagMatch::NestedPlainTag);
        assert_eq!(stack.end_tag("myth"), EndTagMatch::TagHelper);
    }

    #[test]
    fn test_other_names_do_not_count() {
        let mut stack = TrackerStack::new();
        stack.push(helper("myth", None));
        stack.note_unbound_start("div");
        assert_eq!(stack.current_tag_helper().unwrap().open_matching_tags, 0);
        assert_eq!(stack.end_tag("div"), EndTagMatch::Unmatched);
    }

    #[test]
    fn test_restricting_parent_only_for_direct_children() {
        let mut stack = TrackerStack::new();
        stack.push(helper("table-helper", Some(&["tr"])));
        let parent = stack.restricting_parent().unwrap();
        assert!(parent.allows_child("TR"));
        assert!(!parent.allows_child("div"));
        assert_eq!(parent.allowed_children_text(), "tr");

        stack.push(TagTracker::plain("tr"));
        assert!(stack.restricting_parent().is_none());
        assert_eq!(stack.parent(), Some(("tr", false)));
        assert_eq!(stack.current_tag_helper().unwrap().tag_name, "table-helper");
    }

    #[test]
    fn test_empty_stack() {
        let mut stack = TrackerStack::new();
        assert_eq!(stack.parent(), None);
        assert_eq!(stack.end_tag("p"), EndTagMatch::Unmatched);
        assert!(stack.pop().is_none());
    }
}
