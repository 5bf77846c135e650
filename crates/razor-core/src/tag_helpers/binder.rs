//! Matching concrete tags against the descriptors in scope

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::descriptor::{Checksum, TagHelperDescriptor, TagMatchingRuleDescriptor};

/// One descriptor of a binding with the rules that matched
#[derive(Debug, Clone, PartialEq)]
pub struct BoundDescriptor {
    pub descriptor: Arc<TagHelperDescriptor>,
    pub rules: Vec<TagMatchingRuleDescriptor>,
}

/// Descriptors bound to one tag, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct TagHelperBinding {
    /// Tag name as written, prefix included
    pub tag_name: String,
    pub parent_tag_name: Option<String>,
    /// Literal attributes the binding was computed from
    pub attributes: Vec<(String, String)>,
    pub prefix: Option<String>,
    bound: Vec<BoundDescriptor>,
}

impl TagHelperBinding {
    /// A binding with no descriptors
    pub fn empty(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            parent_tag_name: None,
            attributes: Vec::new(),
            prefix: None,
            bound: Vec::new(),
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TagHelperDescriptor>> {
        self.bound.iter().map(|bound| &bound.descriptor)
    }

    pub fn bound_descriptors(&self) -> &[BoundDescriptor] {
        &self.bound
    }

    /// Rules of `descriptor` that matched the tag
    pub fn rules_for(&self, descriptor: &TagHelperDescriptor) -> &[TagMatchingRuleDescriptor] {
        self.bound
            .iter()
            .find(|bound| bound.descriptor.as_ref() == descriptor)
            .map_or(&[], |bound| bound.rules.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Tag name without the `@tagHelperPrefix` prefix
    pub fn tag_name_without_prefix(&self) -> &str {
        strip_prefix(&self.tag_name, self.prefix.as_deref()).unwrap_or(&self.tag_name)
    }
}

/// How a tag helper element is written in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagMode {
    /// `<tag></tag>`
    StartTagAndEndTag,
    /// `<tag />`
    SelfClosing,
    /// `<tag>` where the descriptors forbid an end tag
    StartTagOnly,
}

impl fmt::Display for TagMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagMode::StartTagAndEndTag => "StartTagAndEndTag",
            TagMode::SelfClosing => "SelfClosing",
            TagMode::StartTagOnly => "StartTagOnly",
        };
        f.write_str(name)
    }
}

/// Quoting of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeStructure {
    DoubleQuotes,
    SingleQuotes,
    NoQuotes,
    /// No value at all: `<input disabled>`
    Minimized,
}

impl fmt::Display for AttributeStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeStructure::DoubleQuotes => "DoubleQuotes",
            AttributeStructure::SingleQuotes => "SingleQuotes",
            AttributeStructure::NoQuotes => "NoQuotes",
            AttributeStructure::Minimized => "Minimized",
        };
        f.write_str(name)
    }
}

/// Annotation of a rewritten tag helper element
#[derive(Debug, Clone, PartialEq)]
pub struct TagHelperInfo {
    pub tag_name: String,
    pub tag_mode: TagMode,
    pub binding: TagHelperBinding,
}

impl TagHelperInfo {
    pub fn new(tag_name: &str, tag_mode: TagMode, binding: TagHelperBinding) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            tag_mode,
            binding,
        }
    }
}

/// Annotation of a rewritten tag helper attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperAttributeInfo {
    pub name: String,
    pub attribute_structure: AttributeStructure,
    /// Some descriptor binds the attribute to a property
    pub bound: bool,
}

fn strip_prefix<'t>(tag_name: &'t str, prefix: Option<&str>) -> Option<&'t str> {
    match prefix {
        None => Some(tag_name),
        Some(prefix) => {
            let head = tag_name.get(..prefix.len())?;
            let rest = &tag_name[prefix.len()..];
            (head.eq_ignore_ascii_case(prefix) && !rest.is_empty()).then_some(rest)
        }
    }
}

/// Finds the descriptors a tag binds to.
///
/// Candidates are looked up by lowercase tag name plus every catch-all
/// descriptor, then evaluated in catalog order so the result does not depend
/// on hashing.
#[derive(Debug, Clone)]
pub struct TagHelperBinder {
    prefix: Option<String>,
    descriptors: Vec<Arc<TagHelperDescriptor>>,
    /// Lowercase tag name to indexes into `descriptors`
    by_tag_name: IndexMap<String, Vec<usize>>,
    catch_all: Vec<usize>,
}

impl TagHelperBinder {
    pub fn new(
        prefix: Option<String>,
        descriptors: impl IntoIterator<Item = Arc<TagHelperDescriptor>>,
    ) -> Self {
        let mut unique: IndexMap<Checksum, Arc<TagHelperDescriptor>> = IndexMap::new();
        for descriptor in descriptors {
            unique.entry(descriptor.checksum()).or_insert(descriptor);
        }
        let descriptors: Vec<_> = unique.into_values().collect();

        let mut by_tag_name: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut catch_all = Vec::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            for rule in &descriptor.tag_matching_rules {
                let slot = if rule.is_catch_all() {
                    &mut catch_all
                } else {
                    by_tag_name
                        .entry(rule.tag_name.to_ascii_lowercase())
                        .or_default()
                };
                if slot.last() != Some(&index) {
                    slot.push(index);
                }
            }
        }

        Self {
            prefix: prefix.filter(|prefix| !prefix.is_empty()),
            descriptors,
            by_tag_name,
            catch_all,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn descriptors(&self) -> &[Arc<TagHelperDescriptor>] {
        &self.descriptors
    }

    fn candidates(&self, tag_name: &str) -> Vec<usize> {
        let mut indexes: Vec<usize> = self
            .by_tag_name
            .get(&tag_name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .chain(&self.catch_all)
            .copied()
            .collect();
        indexes.sort_unstable();
        indexes.dedup();
        indexes
    }

    /// Bind a tag.
    ///
    /// `parent_tag_name` is the innermost enclosing element; when that
    /// element is itself a tag helper its prefix is dropped before parent
    /// rules compare against it.
    pub fn bind(
        &self,
        tag_name: &str,
        attributes: &[(String, String)],
        parent_tag_name: Option<&str>,
        parent_is_tag_helper: bool,
    ) -> Option<TagHelperBinding> {
        let name = strip_prefix(tag_name, self.prefix())?;
        let parent = parent_tag_name.map(|parent| {
            if parent_is_tag_helper {
                strip_prefix(parent, self.prefix()).unwrap_or(parent)
            } else {
                parent
            }
        });

        let bound: Vec<BoundDescriptor> = self
            .candidates(name)
            .into_iter()
            .filter_map(|index| {
                let descriptor = &self.descriptors[index];
                let rules: Vec<TagMatchingRuleDescriptor> = descriptor
                    .tag_matching_rules
                    .iter()
                    .filter(|rule| rule.is_match(name, parent, attributes))
                    .cloned()
                    .collect();
                (!rules.is_empty()).then(|| BoundDescriptor {
                    descriptor: descriptor.clone(),
                    rules,
                })
            })
            .collect();

        if bound.is_empty() {
            return None;
        }
        Some(TagHelperBinding {
            tag_name: tag_name.to_string(),
            parent_tag_name: parent_tag_name.map(str::to_string),
            attributes: attributes.to_vec(),
            prefix: self.prefix.clone(),
            bound,
        })
    }

    /// Some non catch-all rule targets `tag_name`, whatever its attributes
    pub fn targets_tag_name(&self, tag_name: &str) -> bool {
        let Some(name) = strip_prefix(tag_name, self.prefix()) else {
            return false;
        };
        self.by_tag_name
            .get(&name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .any(|&index| {
                self.descriptors[index]
                    .tag_matching_rules
                    .iter()
                    .any(|rule| !rule.is_catch_all() && rule.matches_tag(name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_helpers::{TagHelperDescriptorBuilder, TagHelperKind};

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    fn names(binding: &TagHelperBinding) -> Vec<&str> {
        binding.descriptors().map(|d| d.name.as_ref()).collect()
    }

    fn helper(name: &str, configure: impl FnOnce(&mut crate::tag_helpers::TagMatchingRuleDescriptorBuilder)) -> Arc<TagHelperDescriptor> {
        Arc::new(
            TagHelperDescriptorBuilder::new(TagHelperKind::TagHelper, name, "Test")
                .tag_matching_rule(configure)
                .build(),
        )
    }

    #[test]
    fn test_binds_by_tag_name_case_insensitively() {
        let binder = TagHelperBinder::new(None, [helper("T.P", |rule| {
            rule.tag_name("p");
        })]);
        let binding = binder.bind("P", &[], None, false).unwrap();
        assert_eq!(names(&binding), ["T.P"]);
        assert!(binder.bind("div", &[], None, false).is_none());
    }

    #[test]
    fn test_required_attributes_must_all_match() {
        let binder = TagHelperBinder::new(None, [helper("T.Input", |rule| {
            rule.tag_name("input").required_attributes("asp-for, [type='text']").unwrap();
        })]);
        assert!(binder.bind("input", &attrs(&[("asp-for", "Name")]), None, false).is_none());
        let binding = binder
            .bind("input", &attrs(&[("type", "text"), ("asp-for", "Name")]), None, false)
            .unwrap();
        assert_eq!(binding.rules_for(&binding.bound_descriptors()[0].descriptor).len(), 1);
    }

    #[test]
    fn test_catch_all_and_specific_keep_catalog_order() {
        let binder = TagHelperBinder::new(
            None,
            [
                helper("T.Any", |rule| {
                    rule.require_attribute("highlight");
                }),
                helper("T.Div", |rule| {
                    rule.tag_name("div");
                }),
            ],
        );
        let binding = binder
            .bind("div", &attrs(&[("highlight", "")]), None, false)
            .unwrap();
        assert_eq!(names(&binding), ["T.Any", "T.Div"]);
        assert!(!binder.targets_tag_name("span"));
        assert!(binder.targets_tag_name("DIV"));
    }

    #[test]
    fn test_prefix_is_required_and_stripped() {
        let binder = TagHelperBinder::new(Some("th:".into()), [helper("T.P", |rule| {
            rule.tag_name("p");
        })]);
        assert!(binder.bind("p", &[], None, false).is_none());
        let binding = binder.bind("th:p", &[], None, false).unwrap();
        assert_eq!(binding.tag_name_without_prefix(), "p");
        assert!(binder.bind("th:", &[], None, false).is_none());
    }

    #[test]
    fn test_parent_tag_rule() {
        let binder = TagHelperBinder::new(Some("th:".into()), [helper("T.Li", |rule| {
            rule.tag_name("li").parent_tag("ul");
        })]);
        assert!(binder.bind("th:li", &[], None, false).is_none());
        assert!(binder.bind("th:li", &[], Some("ol"), false).is_none());
        assert!(binder.bind("th:li", &[], Some("ul"), false).is_some());
        assert!(binder.bind("th:li", &[], Some("th:ul"), true).is_some());
    }

    #[test]
    fn test_component_names_are_case_sensitive() {
        let counter = Arc::new(
            TagHelperDescriptorBuilder::new(TagHelperKind::Component, "App.Counter", "App")
                .tag_matching_rule(|rule| {
                    rule.tag_name("Counter");
                })
                .build(),
        );
        let qualified = Arc::new(
            TagHelperDescriptorBuilder::new(TagHelperKind::Component, "App.Counter", "App")
                .metadata(crate::tag_helpers::metadata::FULLY_QUALIFIED_NAME_MATCH, "true")
                .tag_matching_rule(|rule| {
                    rule.tag_name("App.Counter");
                })
                .build(),
        );
        let binder = TagHelperBinder::new(None, [counter.clone(), qualified, counter]);
        assert_eq!(binder.descriptors().len(), 2);
        assert!(binder.bind("counter", &[], None, false).is_none());
        assert_eq!(binder.bind("Counter", &[], None, false).unwrap().len(), 1);
        assert_eq!(binder.bind("App.Counter", &[], None, false).unwrap().len(), 1);
    }
}
