//! Immutable tag helper descriptors
//!
//! A descriptor says which elements a tag helper or component targets and
//! which of their attributes bind to properties. Descriptors are compared by
//! a SHA-256 checksum of their canonical JSON form, so two descriptors loaded
//! from different catalogs are equal exactly when their content is.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use super::cache::StringCache;
use crate::diagnostics::RazorDiagnostic;

/// Matches every tag name
pub const CATCH_ALL_TAG: &str = "*";

/// What kind of runtime construct a descriptor describes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagHelperKind {
    /// A class-based tag helper
    #[default]
    TagHelper,
    /// A view component exposed as `<vc:name>`
    ViewComponent,
    Component,
    ChildContent,
    EventHandler,
    Bind,
    Ref,
    Key,
    Splat,
}

impl TagHelperKind {
    pub fn is_component_kind(self) -> bool {
        !matches!(self, TagHelperKind::TagHelper | TagHelperKind::ViewComponent)
    }
}

impl fmt::Display for TagHelperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagHelperKind::TagHelper => "ITagHelper",
            TagHelperKind::ViewComponent => "MVC.ViewComponent",
            TagHelperKind::Component => "Components.Component",
            TagHelperKind::ChildContent => "Components.ChildContent",
            TagHelperKind::EventHandler => "Components.EventHandler",
            TagHelperKind::Bind => "Components.Bind",
            TagHelperKind::Ref => "Components.Ref",
            TagHelperKind::Key => "Components.Key",
            TagHelperKind::Splat => "Components.Splat",
        };
        f.write_str(name)
    }
}

/// Whether a targeted element may have an end tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagStructure {
    #[default]
    Unspecified,
    NormalOrSelfClosing,
    /// `<input>` style: never has an end tag
    WithoutEndTag,
}

impl fmt::Display for TagStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagStructure::Unspecified => "Unspecified",
            TagStructure::NormalOrSelfClosing => "NormalOrSelfClosing",
            TagStructure::WithoutEndTag => "WithoutEndTag",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameComparison {
    #[default]
    FullMatch,
    PrefixMatch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueComparison {
    /// Any value, or none
    #[default]
    None,
    FullMatch,
    PrefixMatch,
    SuffixMatch,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn names_equal(left: &str, right: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        left == right
    } else {
        left.eq_ignore_ascii_case(right)
    }
}

fn starts_with(text: &str, prefix: &str, case_sensitive: bool) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && names_equal(&text[..prefix.len()], prefix, case_sensitive)
}

/// An attribute a matching rule requires
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredAttributeDescriptor {
    pub name: Arc<str>,
    #[serde(default)]
    pub name_comparison: NameComparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Arc<str>>,
    #[serde(default)]
    pub value_comparison: ValueComparison,
    #[serde(default, skip_serializing_if = "is_false")]
    pub case_sensitive: bool,
}

impl RequiredAttributeDescriptor {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            name_comparison: NameComparison::FullMatch,
            value: None,
            value_comparison: ValueComparison::None,
            case_sensitive: false,
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        match self.name_comparison {
            NameComparison::FullMatch => names_equal(name, &self.name, self.case_sensitive),
            // `data-*` needs at least one character after the prefix
            NameComparison::PrefixMatch => {
                name.len() > self.name.len() && starts_with(name, &self.name, self.case_sensitive)
            }
        }
    }

    /// Attribute values always compare case-sensitively
    pub fn matches_value(&self, value: &str) -> bool {
        let expected = self.value.as_deref().unwrap_or_default();
        match self.value_comparison {
            ValueComparison::None => true,
            ValueComparison::FullMatch => value == expected,
            ValueComparison::PrefixMatch => value.starts_with(expected),
            ValueComparison::SuffixMatch => value.ends_with(expected),
        }
    }

    pub fn is_match(&self, name: &str, value: &str) -> bool {
        self.matches_name(name) && self.matches_value(value)
    }

    fn intern(&mut self, cache: &StringCache) {
        self.name = cache.intern(&self.name);
        intern_opt(&mut self.value, cache);
    }
}

impl fmt::Display for RequiredAttributeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = if self.name_comparison == NameComparison::PrefixMatch {
            "*"
        } else {
            ""
        };
        let op = match self.value_comparison {
            ValueComparison::None => return write!(f, "[{}{star}]", self.name),
            ValueComparison::FullMatch => "=",
            ValueComparison::PrefixMatch => "^=",
            ValueComparison::SuffixMatch => "$=",
        };
        write!(
            f,
            "[{}{star}{op}'{}']",
            self.name,
            self.value.as_deref().unwrap_or_default()
        )
    }
}

/// One way a descriptor can target an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMatchingRuleDescriptor {
    pub tag_name: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_tag: Option<Arc<str>>,
    #[serde(default)]
    pub tag_structure: TagStructure,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<RequiredAttributeDescriptor>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub case_sensitive: bool,
}

impl TagMatchingRuleDescriptor {
    pub fn is_catch_all(&self) -> bool {
        self.tag_name.as_ref() == CATCH_ALL_TAG
    }

    /// `tag_name` has the prefix already removed
    pub fn matches_tag(&self, tag_name: &str) -> bool {
        self.is_catch_all() || names_equal(tag_name, &self.tag_name, self.case_sensitive)
    }

    pub fn matches_parent(&self, parent: Option<&str>) -> bool {
        match (&self.parent_tag, parent) {
            (None, _) => true,
            (Some(required), Some(parent)) => names_equal(parent, required, self.case_sensitive),
            (Some(_), None) => false,
        }
    }

    /// Every required attribute is present among `attributes`
    pub fn matches_attributes(&self, attributes: &[(String, String)]) -> bool {
        self.attributes.iter().all(|required| {
            attributes
                .iter()
                .any(|(name, value)| required.is_match(name, value))
        })
    }

    pub fn is_match(
        &self,
        tag_name: &str,
        parent: Option<&str>,
        attributes: &[(String, String)],
    ) -> bool {
        self.matches_tag(tag_name)
            && self.matches_parent(parent)
            && self.matches_attributes(attributes)
    }

    fn intern(&mut self, cache: &StringCache) {
        self.tag_name = cache.intern(&self.tag_name);
        intern_opt(&mut self.parent_tag, cache);
        for attribute in &mut self.attributes {
            attribute.intern(cache);
        }
    }
}

/// An attribute bound to a property of the tag helper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAttributeDescriptor {
    /// HTML attribute name
    pub name: Arc<str>,
    pub property_name: Arc<str>,
    pub type_name: Arc<str>,
    /// Prefix of dictionary-style attributes such as `asp-route-`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer_name_prefix: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer_type_name: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_enum: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub case_sensitive: bool,
}

const STRING_TYPES: &[&str] = &["System.String", "string"];
const BOOLEAN_TYPES: &[&str] = &["System.Boolean", "bool"];

impl BoundAttributeDescriptor {
    pub fn is_string_property(&self) -> bool {
        STRING_TYPES.contains(&self.type_name.as_ref())
    }

    pub fn is_boolean_property(&self) -> bool {
        BOOLEAN_TYPES.contains(&self.type_name.as_ref())
    }

    pub fn is_indexer_string_property(&self) -> bool {
        self.indexer_type_name
            .as_deref()
            .is_some_and(|name| STRING_TYPES.contains(&name))
    }

    pub fn is_indexer_boolean_property(&self) -> bool {
        self.indexer_type_name
            .as_deref()
            .is_some_and(|name| BOOLEAN_TYPES.contains(&name))
    }

    pub fn matches_name(&self, name: &str) -> bool {
        names_equal(name, &self.name, self.case_sensitive)
    }

    /// `name` addresses an entry of this attribute's dictionary
    pub fn matches_indexer(&self, name: &str) -> bool {
        self.indexer_name_prefix.as_deref().is_some_and(|prefix| {
            name.len() > prefix.len() && starts_with(name, prefix, self.case_sensitive)
        })
    }

    fn intern(&mut self, cache: &StringCache) {
        self.name = cache.intern(&self.name);
        self.property_name = cache.intern(&self.property_name);
        self.type_name = cache.intern(&self.type_name);
        intern_opt(&mut self.indexer_name_prefix, cache);
        intern_opt(&mut self.indexer_type_name, cache);
        intern_opt(&mut self.documentation, cache);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedChildTagDescriptor {
    pub name: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Arc<str>>,
}

/// SHA-256 digest identifying a descriptor's content
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum([u8; 32]);

impl Checksum {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({self})")
    }
}

/// Everything the compiler knows about one tag helper or component.
///
/// Fields are public for reading; descriptors are shared behind `Arc` and
/// never mutated once built, which keeps the lazily computed checksum valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagHelperDescriptor {
    #[serde(default)]
    pub kind: TagHelperKind,
    /// Fully qualified type name
    pub name: Arc<str>,
    pub assembly_name: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_output_hint: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub tag_matching_rules: Vec<TagMatchingRuleDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bound_attributes: Vec<BoundAttributeDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_child_tags: Vec<AllowedChildTagDescriptor>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<RazorDiagnostic>,
    #[serde(skip)]
    checksum: OnceLock<Checksum>,
}

impl TagHelperDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        kind: TagHelperKind,
        name: Arc<str>,
        assembly_name: Arc<str>,
        display_name: Option<Arc<str>>,
        documentation: Option<Arc<str>>,
        tag_output_hint: Option<Arc<str>>,
        case_sensitive: bool,
        tag_matching_rules: Vec<TagMatchingRuleDescriptor>,
        bound_attributes: Vec<BoundAttributeDescriptor>,
        allowed_child_tags: Vec<AllowedChildTagDescriptor>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            kind,
            name,
            assembly_name,
            display_name,
            documentation,
            tag_output_hint,
            case_sensitive,
            tag_matching_rules,
            bound_attributes,
            allowed_child_tags,
            metadata,
            diagnostics: Vec::new(),
            checksum: OnceLock::new(),
        }
    }

    /// Display name, defaulting to the type name
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Type name without its namespace
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_component(&self) -> bool {
        self.kind.is_component_kind()
    }

    pub fn is_view_component(&self) -> bool {
        self.kind == TagHelperKind::ViewComponent
    }

    /// Registered under its fully qualified name, like `<My.Lib.Counter>`
    pub fn is_fully_qualified_name_match(&self) -> bool {
        self.metadata
            .get(metadata::FULLY_QUALIFIED_NAME_MATCH)
            .is_some_and(|value| value == "true")
    }

    pub fn allows_child(&self, tag_name: &str) -> bool {
        self.allowed_child_tags.is_empty()
            || self
                .allowed_child_tags
                .iter()
                .any(|child| names_equal(tag_name, &child.name, self.case_sensitive))
    }

    /// Bound attribute an HTML attribute binds to, directly or through an
    /// indexer
    pub fn bound_attribute(&self, attribute_name: &str) -> Option<&BoundAttributeDescriptor> {
        self.bound_attributes
            .iter()
            .find(|bound| bound.matches_name(attribute_name))
            .or_else(|| {
                self.bound_attributes
                    .iter()
                    .find(|bound| bound.matches_indexer(attribute_name))
            })
    }

    pub fn checksum(&self) -> Checksum {
        *self.checksum.get_or_init(|| self.compute_checksum())
    }

    fn compute_checksum(&self) -> Checksum {
        // serializing plain data into memory does not fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        Checksum(Sha256::digest(&json).into())
    }

    /// Share every string through `cache`
    pub(crate) fn intern(mut self, cache: &StringCache) -> Self {
        self.name = cache.intern(&self.name);
        self.assembly_name = cache.intern(&self.assembly_name);
        intern_opt(&mut self.display_name, cache);
        intern_opt(&mut self.documentation, cache);
        intern_opt(&mut self.tag_output_hint, cache);
        for rule in &mut self.tag_matching_rules {
            rule.intern(cache);
        }
        for bound in &mut self.bound_attributes {
            bound.intern(cache);
        }
        for child in &mut self.allowed_child_tags {
            child.name = cache.intern(&child.name);
            intern_opt(&mut child.display_name, cache);
        }
        self
    }
}

impl PartialEq for TagHelperDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum() == other.checksum()
    }
}

impl Eq for TagHelperDescriptor {}

impl Hash for TagHelperDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum().hash(state);
    }
}

fn intern_opt(value: &mut Option<Arc<str>>, cache: &StringCache) {
    if let Some(text) = value.as_mut() {
        *text = cache.intern(text);
    }
}

/// Well-known metadata keys
pub mod metadata {
    pub const FULLY_QUALIFIED_NAME_MATCH: &str = "Components.NameMatch";
    pub const VIEW_COMPONENT_NAME: &str = "ViewComponentName";
    pub const COMMON_TYPE_NAME: &str = "Common.TypeName";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_helpers::TagHelperDescriptorBuilder;

    fn required(name: &str, comparison: NameComparison) -> RequiredAttributeDescriptor {
        RequiredAttributeDescriptor {
            name_comparison: comparison,
            ..RequiredAttributeDescriptor::new(name)
        }
    }

    #[test]
    fn test_required_attribute_name_matching() {
        let full = required("asp-for", NameComparison::FullMatch);
        assert!(full.matches_name("ASP-FOR"));
        assert!(!full.matches_name("asp-format"));

        let prefix = required("data-", NameComparison::PrefixMatch);
        assert!(prefix.matches_name("data-id"));
        assert!(!prefix.matches_name("data-"));
    }

    #[test]
    fn test_required_attribute_value_comparisons() {
        let mut attribute = required("href", NameComparison::FullMatch);
        attribute.value = Some("http".into());
        attribute.value_comparison = ValueComparison::PrefixMatch;
        assert!(attribute.is_match("href", "https://example.com"));
        assert!(!attribute.is_match("href", "/local"));

        attribute.value_comparison = ValueComparison::FullMatch;
        assert!(!attribute.is_match("href", "HTTP"));
    }

    #[test]
    fn test_checksum_tracks_content() {
        let build = |documentation: &str| {
            TagHelperDescriptorBuilder::new(TagHelperKind::TagHelper, "Test.PTagHelper", "Test")
                .documentation(documentation)
                .tag_matching_rule(|rule| {
                    rule.tag_name("p");
                })
                .build()
        };
        assert_eq!(build("a"), build("a"));
        assert_ne!(build("a"), build("b"));
        assert_eq!(build("a").checksum().to_string().len(), 64);
    }

    #[test]
    fn test_bound_attribute_lookup_prefers_direct_name() {
        let descriptor =
            TagHelperDescriptorBuilder::new(TagHelperKind::TagHelper, "Test.AnchorTagHelper", "Test")
                .tag_matching_rule(|rule| {
                    rule.tag_name("a");
                })
                .bound_attribute(|attribute| {
                    attribute
                        .name("asp-route")
                        .property_name("Route")
                        .type_name("System.String");
                })
                .bound_attribute(|attribute| {
                    attribute
                        .name("asp-all-route-data")
                        .property_name("RouteValues")
                        .type_name("System.Collections.Generic.IDictionary<string, string>")
                        .indexer("asp-route-", "System.String");
                })
                .build();

        assert_eq!(
            descriptor.bound_attribute("asp-route").unwrap().property_name.as_ref(),
            "Route"
        );
        let indexer = descriptor.bound_attribute("asp-route-id").unwrap();
        assert_eq!(indexer.property_name.as_ref(), "RouteValues");
        assert!(indexer.is_indexer_string_property());
        assert!(descriptor.bound_attribute("href").is_none());
    }

    #[test]
    fn test_deserialized_descriptor_equals_built_one() {
        let built = TagHelperDescriptorBuilder::new(TagHelperKind::Component, "App.Counter", "App")
            .case_sensitive(true)
            .tag_matching_rule(|rule| {
                rule.tag_name("Counter");
            })
            .build();
        let json = serde_json::to_string(&built).unwrap();
        let loaded: TagHelperDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, built);
        assert!(loaded.is_component());
        assert_eq!(loaded.short_name(), "Counter");
    }
}
