//! Builders for descriptors
//!
//! ```rust
//! use razor_core::tag_helpers::{TagHelperDescriptorBuilder, TagHelperKind, TagStructure};
//!
//! let input = TagHelperDescriptorBuilder::new(TagHelperKind::TagHelper, "Mvc.InputTagHelper", "Mvc")
//!     .tag_matching_rule(|rule| {
//!         rule.tag_name("input").tag_structure(TagStructure::WithoutEndTag);
//!     })
//!     .bound_attribute(|attribute| {
//!         attribute.name("asp-for").property_name("For").type_name("ModelExpression");
//!     })
//!     .build();
//! assert_eq!(input.tag_matching_rules[0].tag_name.as_ref(), "input");
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use super::descriptor::{
    AllowedChildTagDescriptor, BoundAttributeDescriptor, NameComparison,
    RequiredAttributeDescriptor, TagHelperDescriptor, TagHelperKind, TagMatchingRuleDescriptor,
    TagStructure, ValueComparison,
};
use super::selector::parse_required_attributes;
use crate::result::Result;

#[derive(Debug, Clone)]
pub struct TagHelperDescriptorBuilder {
    kind: TagHelperKind,
    name: Arc<str>,
    assembly_name: Arc<str>,
    display_name: Option<Arc<str>>,
    documentation: Option<Arc<str>>,
    tag_output_hint: Option<Arc<str>>,
    case_sensitive: bool,
    rules: Vec<TagMatchingRuleDescriptorBuilder>,
    bound_attributes: Vec<BoundAttributeDescriptorBuilder>,
    allowed_child_tags: Vec<AllowedChildTagDescriptor>,
    metadata: BTreeMap<String, String>,
}

impl TagHelperDescriptorBuilder {
    pub fn new(kind: TagHelperKind, name: &str, assembly_name: &str) -> Self {
        Self {
            kind,
            name: name.into(),
            assembly_name: assembly_name.into(),
            display_name: None,
            documentation: None,
            tag_output_hint: None,
            case_sensitive: kind.is_component_kind(),
            rules: Vec::new(),
            bound_attributes: Vec::new(),
            allowed_child_tags: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn documentation(mut self, documentation: &str) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn tag_output_hint(mut self, hint: &str) -> Self {
        self.tag_output_hint = Some(hint.into());
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn tag_matching_rule(mut self, configure: impl FnOnce(&mut TagMatchingRuleDescriptorBuilder)) -> Self {
        let mut rule = TagMatchingRuleDescriptorBuilder::default();
        configure(&mut rule);
        self.rules.push(rule);
        self
    }

    pub fn bound_attribute(mut self, configure: impl FnOnce(&mut BoundAttributeDescriptorBuilder)) -> Self {
        let mut attribute = BoundAttributeDescriptorBuilder::default();
        configure(&mut attribute);
        self.bound_attributes.push(attribute);
        self
    }

    pub fn allowed_child_tag(mut self, name: &str) -> Self {
        self.allowed_child_tags.push(AllowedChildTagDescriptor {
            name: name.into(),
            display_name: None,
        });
        self
    }

    pub fn build(self) -> TagHelperDescriptor {
        let case_sensitive = self.case_sensitive;
        let rules = self
            .rules
            .into_iter()
            .map(|rule| rule.build(case_sensitive))
            .collect();
        let bound_attributes = self
            .bound_attributes
            .into_iter()
            .map(|attribute| attribute.build(case_sensitive))
            .collect();
        TagHelperDescriptor::from_parts(
            self.kind,
            self.name,
            self.assembly_name,
            self.display_name,
            self.documentation,
            self.tag_output_hint,
            case_sensitive,
            rules,
            bound_attributes,
            self.allowed_child_tags,
            self.metadata,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagMatchingRuleDescriptorBuilder {
    tag_name: Option<Arc<str>>,
    parent_tag: Option<Arc<str>>,
    tag_structure: TagStructure,
    attributes: Vec<RequiredAttributeDescriptor>,
}

impl TagMatchingRuleDescriptorBuilder {
    pub fn tag_name(&mut self, tag_name: &str) -> &mut Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    pub fn parent_tag(&mut self, parent_tag: &str) -> &mut Self {
        self.parent_tag = Some(parent_tag.into());
        self
    }

    pub fn tag_structure(&mut self, tag_structure: TagStructure) -> &mut Self {
        self.tag_structure = tag_structure;
        self
    }

    /// Require an attribute by exact name
    pub fn require_attribute(&mut self, name: &str) -> &mut Self {
        self.attributes.push(RequiredAttributeDescriptor::new(name));
        self
    }

    pub fn require_attribute_with(
        &mut self,
        name: &str,
        name_comparison: NameComparison,
        value: Option<&str>,
        value_comparison: ValueComparison,
    ) -> &mut Self {
        self.attributes.push(RequiredAttributeDescriptor {
            name_comparison,
            value: value.map(Into::into),
            value_comparison,
            ..RequiredAttributeDescriptor::new(name)
        });
        self
    }

    /// Require every attribute of a selector such as
    /// `"asp-for, [type='text']"`
    pub fn required_attributes(&mut self, selector: &str) -> Result<&mut Self> {
        self.attributes.extend(parse_required_attributes(selector)?);
        Ok(self)
    }

    fn build(self, case_sensitive: bool) -> TagMatchingRuleDescriptor {
        let attributes = self
            .attributes
            .into_iter()
            .map(|attribute| RequiredAttributeDescriptor {
                case_sensitive,
                ..attribute
            })
            .collect();
        TagMatchingRuleDescriptor {
            tag_name: self.tag_name.unwrap_or_else(|| super::CATCH_ALL_TAG.into()),
            parent_tag: self.parent_tag,
            tag_structure: self.tag_structure,
            attributes,
            case_sensitive,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoundAttributeDescriptorBuilder {
    name: Option<Arc<str>>,
    property_name: Option<Arc<str>>,
    type_name: Option<Arc<str>>,
    indexer_name_prefix: Option<Arc<str>>,
    indexer_type_name: Option<Arc<str>>,
    is_enum: bool,
    documentation: Option<Arc<str>>,
}

impl BoundAttributeDescriptorBuilder {
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn property_name(&mut self, property_name: &str) -> &mut Self {
        self.property_name = Some(property_name.into());
        self
    }

    pub fn type_name(&mut self, type_name: &str) -> &mut Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Dictionary-style attributes: `prefix` followed by a key
    pub fn indexer(&mut self, prefix: &str, type_name: &str) -> &mut Self {
        self.indexer_name_prefix = Some(prefix.into());
        self.indexer_type_name = Some(type_name.into());
        self
    }

    pub fn is_enum(&mut self, is_enum: bool) -> &mut Self {
        self.is_enum = is_enum;
        self
    }

    pub fn documentation(&mut self, documentation: &str) -> &mut Self {
        self.documentation = Some(documentation.into());
        self
    }

    fn build(self, case_sensitive: bool) -> BoundAttributeDescriptor {
        let name: Arc<str> = self.name.unwrap_or_else(|| "".into());
        BoundAttributeDescriptor {
            property_name: self.property_name.unwrap_or_else(|| name.clone()),
            name,
            type_name: self.type_name.unwrap_or_else(|| "System.String".into()),
            indexer_name_prefix: self.indexer_name_prefix,
            indexer_type_name: self.indexer_type_name,
            is_enum: self.is_enum,
            documentation: self.documentation,
            case_sensitive,
        }
    }
}
