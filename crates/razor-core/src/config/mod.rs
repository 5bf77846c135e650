//! Configuration system
//!
//! A project may carry a `razor.toml` or `.razorrc.json` file. When no path is
//! given, the loader searches from the working directory up to the filesystem
//! root. The file resolves into [`RazorParserOptions`] per document.
//!
//! ```toml
//! languageVersion = "8.0"
//! rootNamespace = "MyApp"
//! tagHelperCatalogs = ["obj/taghelpers.json"]
//! tagHelperDiscovery = "directives"
//! ```

mod loader;
mod options;
mod razor_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use options::{FileKind, RazorLanguageVersion, RazorParserFeatureFlags, RazorParserOptions};
pub use razor_config::{RazorConfiguration, TagHelperDiscovery};
