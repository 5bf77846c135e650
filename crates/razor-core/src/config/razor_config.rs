//! On-disk configuration format

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RazorError;
use crate::result::Result;

use super::FileKind;

/// How tag helper descriptors become visible to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum TagHelperDiscovery {
    /// Legacy documents only see descriptors added with `@addTagHelper`
    #[default]
    Directives,
    /// Every catalog descriptor is visible to every document
    All,
}

/// Razor front-end configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RazorConfiguration {
    /// Razor language version
    #[schemars(description = "Razor language version: \"1.0\" through \"8.0\", or \"latest\"")]
    pub language_version: Option<String>,

    /// File kind override
    #[schemars(
        description = "Force the file kind instead of inferring it from the file extension"
    )]
    pub file_kind: Option<FileKind>,

    /// Namespace used when a document has no @namespace directive
    #[schemars(description = "Root namespace for generated classes")]
    pub root_namespace: Option<String>,

    /// Parse for tooling rather than for code generation
    #[schemars(description = "Enable design-time parsing")]
    pub design_time: Option<bool>,

    /// Override for the version-derived HTML comment feature flag
    #[schemars(
        description = "Allow HTML comments inside tag helpers that restrict their children"
    )]
    pub allow_html_comments_in_tag_helpers: Option<bool>,

    /// Tag helper descriptor catalogs
    #[schemars(description = "Paths to JSON tag helper descriptor catalogs")]
    pub tag_helper_catalogs: Option<Vec<PathBuf>>,

    /// Descriptor visibility mode
    #[schemars(description = "Tag helper discovery mode: 'directives' or 'all'")]
    pub tag_helper_discovery: Option<TagHelperDiscovery>,
}

impl RazorConfiguration {
    /// Load a configuration file, dispatching on its extension (TOML or JSON)
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| RazorError::io_error(path, e))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| {
                RazorError::config_error(format!("Invalid TOML in '{}': {e}", path.display()))
            }),
            _ => serde_json::from_str(&content).map_err(|e| {
                RazorError::config_error(format!("Invalid JSON in '{}': {e}", path.display()))
            }),
        }
    }

    /// JSON Schema describing the configuration format
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(RazorConfiguration);
        serde_json::to_value(&schema).unwrap_or_default()
    }

    /// Resolve catalog paths relative to the directory of the configuration file
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(catalogs) = &mut self.tag_helper_catalogs {
            for catalog in catalogs.iter_mut() {
                if catalog.is_relative() {
                    *catalog = base_dir.join(&*catalog);
                }
            }
        }
    }

    pub fn discovery(&self) -> TagHelperDiscovery {
        self.tag_helper_discovery.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_json() {
        let config: RazorConfiguration = serde_json::from_str(
            r#"{
                "languageVersion": "3.0",
                "fileKind": "component",
                "allowHtmlCommentsInTagHelpers": false,
                "tagHelperDiscovery": "all"
            }"#,
        )
        .unwrap();
        assert_eq!(config.language_version.as_deref(), Some("3.0"));
        assert_eq!(config.file_kind, Some(FileKind::Component));
        assert_eq!(config.allow_html_comments_in_tag_helpers, Some(false));
        assert_eq!(config.discovery(), TagHelperDiscovery::All);
    }

    #[test]
    fn test_deserialize_toml() {
        let config: RazorConfiguration = toml::from_str(
            r#"
languageVersion = "latest"
rootNamespace = "MyApp.Pages"
tagHelperCatalogs = ["catalog.json"]
"#,
        )
        .unwrap();
        assert_eq!(config.root_namespace.as_deref(), Some("MyApp.Pages"));
        assert_eq!(config.discovery(), TagHelperDiscovery::Directives);
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = RazorConfiguration {
            tag_helper_catalogs: Some(vec![PathBuf::from("a.json")]),
            ..Default::default()
        };
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.tag_helper_catalogs.unwrap()[0],
            PathBuf::from("/project/a.json")
        );
    }

    #[test]
    fn test_json_schema_lists_properties() {
        let schema = RazorConfiguration::json_schema();
        let properties = &schema["properties"];
        assert!(properties.get("languageVersion").is_some());
        assert!(properties.get("tagHelperCatalogs").is_some());
    }
}
