//! Directive descriptors and the built-in directive set

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::{FileKind, RazorLanguageVersion};

/// How a directive's content is shaped after its tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectiveKind {
    /// Tokens, then the end of the line
    SingleLine,
    /// Tokens, then a `{ markup }` block
    RazorBlock,
    /// Tokens, then a `{ code }` block
    CodeBlock,
}

/// Where and how often a directive may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectiveUsage {
    Unrestricted,
    FileScopedMultipleOccurring,
    FileScopedSinglyOccurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectiveTokenKind {
    Type,
    Namespace,
    Member,
    String,
    Attribute,
    Boolean,
    GenericTypeConstraint,
}

impl fmt::Display for DirectiveTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DirectiveTokenKind::Type => "type",
            DirectiveTokenKind::Namespace => "namespace",
            DirectiveTokenKind::Member => "member name",
            DirectiveTokenKind::String => "string",
            DirectiveTokenKind::Attribute => "attribute",
            DirectiveTokenKind::Boolean => "boolean",
            DirectiveTokenKind::GenericTypeConstraint => "generic type constraint",
        };
        f.write_str(text)
    }
}

/// One argument of a directive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectiveTokenDescriptor {
    pub kind: DirectiveTokenKind,
    pub optional: bool,
    pub name: String,
}

impl DirectiveTokenDescriptor {
    pub fn new(kind: DirectiveTokenKind, name: &str) -> Self {
        Self {
            kind,
            optional: false,
            name: name.to_string(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectiveDescriptor {
    pub directive: String,
    pub kind: DirectiveKind,
    pub usage: DirectiveUsage,
    pub tokens: Vec<DirectiveTokenDescriptor>,
    pub description: String,
}

impl DirectiveDescriptor {
    pub fn new(directive: &str, kind: DirectiveKind) -> Self {
        Self {
            directive: directive.to_string(),
            kind,
            usage: DirectiveUsage::Unrestricted,
            tokens: Vec::new(),
            description: String::new(),
        }
    }

    pub fn usage(mut self, usage: DirectiveUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn token(mut self, token: DirectiveTokenDescriptor) -> Self {
        self.tokens.push(token);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// `addTagHelper`, `removeTagHelper` and `tagHelperPrefix`
    pub fn is_tag_helper_directive(&self) -> bool {
        matches!(
            self.directive.as_str(),
            ADD_TAG_HELPER | REMOVE_TAG_HELPER | TAG_HELPER_PREFIX
        )
    }

    fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

pub const ADD_TAG_HELPER: &str = "addTagHelper";
pub const REMOVE_TAG_HELPER: &str = "removeTagHelper";
pub const TAG_HELPER_PREFIX: &str = "tagHelperPrefix";
pub const PAGE: &str = "page";
pub const SECTION: &str = "section";

use DirectiveKind::{CodeBlock, RazorBlock, SingleLine};
use DirectiveTokenKind as Token;
use DirectiveUsage::{FileScopedMultipleOccurring, FileScopedSinglyOccurring};

fn tag_helper_directive(name: &str, description: &str) -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new(name, SingleLine)
        .usage(FileScopedMultipleOccurring)
        .token(DirectiveTokenDescriptor::new(Token::String, "lookupText"))
        .description(description)
        .arc()
}

fn page() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new(PAGE, SingleLine)
        .usage(FileScopedSinglyOccurring)
        .token(DirectiveTokenDescriptor::new(Token::String, "RouteTemplate").optional())
        .description("Mark the document as a routable page")
        .arc()
}

fn inherits() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new("inherits", SingleLine)
        .usage(FileScopedSinglyOccurring)
        .token(DirectiveTokenDescriptor::new(Token::Type, "TypeName"))
        .description("Base class of the generated type")
        .arc()
}

fn inject() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new("inject", SingleLine)
        .usage(FileScopedMultipleOccurring)
        .token(DirectiveTokenDescriptor::new(Token::Type, "TypeName"))
        .token(DirectiveTokenDescriptor::new(Token::Member, "PropertyName"))
        .description("Inject a service into a property")
        .arc()
}

fn namespace() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new("namespace", SingleLine)
        .usage(FileScopedSinglyOccurring)
        .token(DirectiveTokenDescriptor::new(Token::Namespace, "Namespace"))
        .description("Namespace of the generated type")
        .arc()
}

fn implements() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new("implements", SingleLine)
        .usage(FileScopedMultipleOccurring)
        .token(DirectiveTokenDescriptor::new(Token::Type, "TypeName"))
        .description("Interface implemented by the generated type")
        .arc()
}

fn attribute() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new("attribute", SingleLine)
        .usage(FileScopedMultipleOccurring)
        .token(DirectiveTokenDescriptor::new(Token::Attribute, "Attribute"))
        .description("Attribute applied to the generated type")
        .arc()
}

fn functions() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new("functions", CodeBlock)
        .description("Members of the generated type")
        .arc()
}

fn section() -> Arc<DirectiveDescriptor> {
    DirectiveDescriptor::new(SECTION, RazorBlock)
        .token(DirectiveTokenDescriptor::new(Token::Member, "SectionName"))
        .description("Named markup section rendered by the layout")
        .arc()
}

/// Directives available to a document of `file_kind` at `version`
pub fn default_directives(
    file_kind: FileKind,
    version: RazorLanguageVersion,
) -> Vec<Arc<DirectiveDescriptor>> {
    let mut directives = Vec::new();
    if file_kind.is_component() {
        directives.extend([
            page(),
            inherits(),
            inject(),
            implements(),
            namespace(),
            attribute(),
            functions(),
            DirectiveDescriptor::new("code", CodeBlock)
                .description("Members of the component")
                .arc(),
            DirectiveDescriptor::new("layout", SingleLine)
                .usage(FileScopedSinglyOccurring)
                .token(DirectiveTokenDescriptor::new(Token::Type, "LayoutType"))
                .description("Layout component")
                .arc(),
            DirectiveDescriptor::new("typeparam", SingleLine)
                .usage(FileScopedMultipleOccurring)
                .token(DirectiveTokenDescriptor::new(Token::Member, "TypeParameter"))
                .token(
                    DirectiveTokenDescriptor::new(Token::GenericTypeConstraint, "Constraint")
                        .optional(),
                )
                .description("Generic type parameter of the component")
                .arc(),
        ]);
        if version >= RazorLanguageVersion::VERSION_5_0 {
            directives.push(
                DirectiveDescriptor::new("preservewhitespace", SingleLine)
                    .usage(FileScopedSinglyOccurring)
                    .token(DirectiveTokenDescriptor::new(Token::Boolean, "Preserve"))
                    .description("Keep whitespace-only markup")
                    .arc(),
            );
        }
        return directives;
    }

    directives.extend([
        tag_helper_directive(ADD_TAG_HELPER, "Register tag helpers from an assembly"),
        tag_helper_directive(REMOVE_TAG_HELPER, "Unregister tag helpers"),
        tag_helper_directive(TAG_HELPER_PREFIX, "Require a prefix on tag helper elements"),
        inherits(),
        functions(),
        section(),
        DirectiveDescriptor::new("model", SingleLine)
            .usage(FileScopedSinglyOccurring)
            .token(DirectiveTokenDescriptor::new(Token::Type, "TypeName"))
            .description("Model type of the view")
            .arc(),
        inject(),
    ]);
    if version >= RazorLanguageVersion::VERSION_2_0 {
        directives.push(page());
    }
    if version >= RazorLanguageVersion::VERSION_2_1 {
        directives.push(namespace());
    }
    if version >= RazorLanguageVersion::VERSION_3_0 {
        directives.extend([implements(), attribute()]);
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(kind: FileKind, version: RazorLanguageVersion) -> Vec<String> {
        default_directives(kind, version)
            .iter()
            .map(|d| d.directive.clone())
            .collect()
    }

    #[test]
    fn test_legacy_directive_set_grows_with_version() {
        let v1 = names(FileKind::Legacy, RazorLanguageVersion::VERSION_1_0);
        assert!(v1.contains(&"addTagHelper".to_string()));
        assert!(!v1.contains(&"page".to_string()));
        let latest = names(FileKind::Legacy, RazorLanguageVersion::LATEST);
        assert!(latest.contains(&"page".to_string()));
        assert!(latest.contains(&"namespace".to_string()));
        assert!(!latest.contains(&"code".to_string()));
    }

    #[test]
    fn test_component_directives() {
        let directives = names(FileKind::Component, RazorLanguageVersion::LATEST);
        assert!(directives.contains(&"code".to_string()));
        assert!(directives.contains(&"preservewhitespace".to_string()));
        assert!(!directives.contains(&"section".to_string()));
        assert!(!directives.contains(&"addTagHelper".to_string()));
    }

    #[test]
    fn test_tag_helper_directive_flag() {
        let add = tag_helper_directive(ADD_TAG_HELPER, "");
        assert!(add.is_tag_helper_directive());
        assert!(!page().is_tag_helper_directive());
    }
}
