//! Tag helpers: descriptors, catalogs, binding and tree rewriting
//!
//! A [`TagHelperDescriptor`] says which elements a tag helper targets and
//! which attributes it binds. Descriptors are loaded into a
//! [`DescriptorCatalog`], scoped per document by its directives, bound per
//! element by a [`TagHelperBinder`], and applied to a parsed tree by
//! [`rewrite_tag_helpers`].

mod binder;
mod builder;
mod cache;
mod catalog;
mod descriptor;
mod rewriter;
mod selector;
mod tracker;

pub use binder::{
    AttributeStructure, BoundDescriptor, TagHelperAttributeInfo, TagHelperBinder,
    TagHelperBinding, TagHelperInfo, TagMode,
};
pub use builder::{
    BoundAttributeDescriptorBuilder, TagHelperDescriptorBuilder, TagMatchingRuleDescriptorBuilder,
};
pub use cache::{DescriptorCache, StringCache};
pub use catalog::{DescriptorCatalog, DocumentScope};
pub use descriptor::{
    AllowedChildTagDescriptor, BoundAttributeDescriptor, CATCH_ALL_TAG, Checksum, NameComparison,
    RequiredAttributeDescriptor, TagHelperDescriptor, TagHelperKind, TagMatchingRuleDescriptor,
    TagStructure, ValueComparison, metadata,
};
pub use rewriter::{UsedDescriptors, rewrite_tag_helpers};
pub use selector::parse_required_attributes;
pub use tracker::{EndTagMatch, TagTracker, TrackerStack};
