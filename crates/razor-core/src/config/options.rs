//! Resolved parser options

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::RazorConfiguration;
use crate::error::RazorError;
use crate::parser::directives::{DirectiveDescriptor, default_directives};
use crate::result::Result;

/// Kind of Razor document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    /// MVC views and Razor pages (`.cshtml`)
    #[default]
    Legacy,
    /// Razor components (`.razor`)
    Component,
    /// `_Imports.razor`
    ComponentImport,
}

impl FileKind {
    /// Infer the file kind from a path
    pub fn from_path(path: &Path) -> Self {
        let is_razor = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("razor"));
        if !is_razor {
            return FileKind::Legacy;
        }
        let is_imports = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.eq_ignore_ascii_case("_Imports.razor"));
        if is_imports {
            FileKind::ComponentImport
        } else {
            FileKind::Component
        }
    }

    pub fn is_component(self) -> bool {
        matches!(self, FileKind::Component | FileKind::ComponentImport)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Legacy => write!(f, "mvc"),
            FileKind::Component => write!(f, "component"),
            FileKind::ComponentImport => write!(f, "componentImport"),
        }
    }
}

/// Razor language version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RazorLanguageVersion {
    major: u8,
    minor: u8,
}

impl RazorLanguageVersion {
    pub const VERSION_1_0: Self = Self::new(1, 0);
    pub const VERSION_1_1: Self = Self::new(1, 1);
    pub const VERSION_2_0: Self = Self::new(2, 0);
    pub const VERSION_2_1: Self = Self::new(2, 1);
    pub const VERSION_3_0: Self = Self::new(3, 0);
    pub const VERSION_5_0: Self = Self::new(5, 0);
    pub const VERSION_6_0: Self = Self::new(6, 0);
    pub const VERSION_7_0: Self = Self::new(7, 0);
    pub const VERSION_8_0: Self = Self::new(8, 0);
    pub const LATEST: Self = Self::VERSION_8_0;

    const KNOWN: [Self; 9] = [
        Self::VERSION_1_0,
        Self::VERSION_1_1,
        Self::VERSION_2_0,
        Self::VERSION_2_1,
        Self::VERSION_3_0,
        Self::VERSION_5_0,
        Self::VERSION_6_0,
        Self::VERSION_7_0,
        Self::VERSION_8_0,
    ];

    const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    pub fn major(self) -> u8 {
        self.major
    }

    pub fn minor(self) -> u8 {
        self.minor
    }
}

impl Default for RazorLanguageVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl fmt::Display for RazorLanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for RazorLanguageVersion {
    type Err = RazorError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") || s.eq_ignore_ascii_case("experimental") {
            return Ok(Self::LATEST);
        }
        Self::KNOWN
            .into_iter()
            .find(|version| version.to_string() == s)
            .ok_or_else(|| {
                RazorError::config_error(format!("Unknown Razor language version '{s}'"))
            })
    }
}

/// Parser behaviour switches derived from the language version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RazorParserFeatureFlags {
    pub allow_minimized_boolean_tag_helper_attributes: bool,
    pub allow_html_comments_in_tag_helpers: bool,
    pub allow_component_file_kind: bool,
    pub allow_csharp_in_markup_attribute_area: bool,
    pub allow_null_forgiving_operator: bool,
}

impl RazorParserFeatureFlags {
    pub fn from_version(version: RazorLanguageVersion) -> Self {
        let at_least = |minimum: RazorLanguageVersion| version >= minimum;
        Self {
            allow_minimized_boolean_tag_helper_attributes: at_least(
                RazorLanguageVersion::VERSION_2_1,
            ),
            allow_html_comments_in_tag_helpers: at_least(RazorLanguageVersion::VERSION_2_1),
            allow_component_file_kind: at_least(RazorLanguageVersion::VERSION_3_0),
            allow_csharp_in_markup_attribute_area: at_least(RazorLanguageVersion::VERSION_3_0),
            allow_null_forgiving_operator: at_least(RazorLanguageVersion::VERSION_6_0),
        }
    }
}

/// Everything the parser needs to know about a document besides its text
#[derive(Debug, Clone)]
pub struct RazorParserOptions {
    pub file_kind: FileKind,
    pub language_version: RazorLanguageVersion,
    pub feature_flags: RazorParserFeatureFlags,
    pub directives: Vec<Arc<DirectiveDescriptor>>,
    pub design_time: bool,
    pub root_namespace: Option<String>,
}

impl RazorParserOptions {
    pub fn new(file_kind: FileKind, language_version: RazorLanguageVersion) -> Self {
        Self {
            file_kind,
            language_version,
            feature_flags: RazorParserFeatureFlags::from_version(language_version),
            directives: default_directives(file_kind, language_version),
            design_time: false,
            root_namespace: None,
        }
    }

    /// Resolve a configuration for the document at `path`
    pub fn from_configuration(config: &RazorConfiguration, path: Option<&Path>) -> Result<Self> {
        let version = match &config.language_version {
            Some(version) => version.parse()?,
            None => RazorLanguageVersion::LATEST,
        };
        let file_kind = config
            .file_kind
            .or_else(|| path.map(FileKind::from_path))
            .unwrap_or_default();
        let mut options = Self::new(file_kind, version);
        if file_kind.is_component() && !options.feature_flags.allow_component_file_kind {
            return Err(RazorError::config_error(format!(
                "Component documents require language version 3.0 or later (configured {version})"
            )));
        }
        if let Some(allow) = config.allow_html_comments_in_tag_helpers {
            options.feature_flags.allow_html_comments_in_tag_helpers = allow;
        }
        options.design_time = config.design_time.unwrap_or(false);
        options.root_namespace = config.root_namespace.clone();
        Ok(options)
    }

    pub fn directive(&self, name: &str) -> Option<&Arc<DirectiveDescriptor>> {
        self.directives.iter().find(|d| d.directive == name)
    }
}

impl Default for RazorParserOptions {
    fn default() -> Self {
        Self::new(FileKind::Legacy, RazorLanguageVersion::LATEST)
    }
}
