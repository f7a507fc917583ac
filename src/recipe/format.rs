// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that declare a package's options, requirements,
//! upstream sources, CMake integration and consumer metadata.

use crate::cmake::DepHints;
use crate::package_info::SystemLink;
use crate::recipe::options::{OptionDecl, OptionValue};
use crate::recipe::reference::PackageReference;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A complete recipe for building a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Declared options with defaults
    #[serde(default)]
    pub options: BTreeMap<String, OptionDecl>,

    /// Requirements on other packages, optionally gated by an option
    #[serde(default)]
    pub requires: Vec<RequirementDecl>,

    /// Options forced onto dependencies
    #[serde(default)]
    pub propagate: Vec<PropagateRule>,

    /// Upstream source trees, first one is the main tree
    #[serde(default)]
    pub sources: Vec<SourceEntry>,

    /// Line insertions applied after the sources are checked out
    #[serde(default)]
    pub patches: Vec<PatchEntry>,

    /// CMake integration
    #[serde(default)]
    pub cmake: CMakeSection,

    /// Consumer metadata
    #[serde(default)]
    pub package_info: PackageInfoSection,

    /// Companion consumer project used to verify the package
    #[serde(default)]
    pub test_package: Option<TestPackageSection>,

    /// Directory the recipe was loaded from (None for the built-in recipe)
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Recipe {
    /// Substitute variables in a string
    ///
    /// Replaces `%(name)s` and `%(version)s` with the package's values.
    pub fn substitute(&self, template: &str) -> String {
        template
            .replace("%(version)s", &self.package.version)
            .replace("%(name)s", &self.package.name)
    }

    /// Reference of the package this recipe produces
    pub fn reference(&self) -> PackageReference {
        PackageReference::new(&self.package.name, &self.package.version)
    }

    /// Names of options that gate at least one requirement
    pub fn gating_options(&self) -> impl Iterator<Item = &str> {
        self.requires.iter().filter_map(|r| r.when.as_deref())
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Full description
    #[serde(default)]
    pub description: Option<String>,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Homepage URL
    #[serde(default)]
    pub homepage: Option<String>,

    /// Recipe repository URL
    #[serde(default)]
    pub url: Option<String>,

    /// Recipe author
    #[serde(default)]
    pub author: Option<String>,

    /// Search keywords
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A requirement on another package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementDecl {
    /// Pinned reference
    pub reference: PackageReference,

    /// Boolean option that enables this requirement (always required if unset)
    #[serde(default)]
    pub when: Option<String>,

    /// Expose the dependency's headers to our consumers
    #[serde(default)]
    pub transitive_headers: bool,
}

/// Force an option on a dependency when one of our options is enabled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagateRule {
    /// Our boolean option that triggers the rule
    pub when: String,
    /// Dependency package name
    pub package: String,
    /// Option of the dependency to force
    pub option: String,
    /// Forced value
    pub value: OptionValue,
}

/// A source tree to clone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Git URL
    pub url: String,

    /// Tag or commit to check out; supports `%(version)s`
    pub reference: String,

    /// Path relative to the source folder (root when unset)
    #[serde(default)]
    pub destination: Option<String>,
}

/// Insert a line before an anchor line in a source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchEntry {
    /// File relative to the source folder
    pub file: String,
    /// Text that must exist verbatim
    pub anchor: String,
    /// Text inserted (followed by a newline) right before the anchor
    pub insert: String,
}

/// CMake integration section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CMakeSection {
    /// Toolchain variables set to a dependency's package folder
    /// (variable name -> package name)
    #[serde(default)]
    pub root_variables: BTreeMap<String, String>,

    /// Per-dependency lookup hints
    #[serde(default)]
    pub deps: BTreeMap<String, DepHints>,
}

/// Consumer metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfoSection {
    /// Glob patterns (relative to the source folder) copied to `licenses/`
    #[serde(default = "default_licenses")]
    pub licenses: Vec<String>,

    /// System link table the package needs
    #[serde(default)]
    pub system_link: Option<SystemLink>,

    /// Preferred order of collected libraries
    #[serde(default)]
    pub link_order: Vec<String>,

    /// Reverse the ordered part of the library list
    #[serde(default)]
    pub reverse_link_order: bool,
}

impl Default for PackageInfoSection {
    fn default() -> Self {
        Self {
            licenses: default_licenses(),
            system_link: None,
            link_order: Vec::new(),
            reverse_link_order: false,
        }
    }
}

fn default_licenses() -> Vec<String> {
    vec!["LICENSE".to_string()]
}

/// Companion verification project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPackageSection {
    /// Project directory relative to the recipe
    #[serde(default = "default_test_path")]
    pub path: String,

    /// Executable produced by the project
    #[serde(default = "default_test_executable")]
    pub executable: String,

    /// Toolchain variables set to a package folder (variable -> package)
    #[serde(default)]
    pub root_variables: BTreeMap<String, String>,

    /// Toolchain variables set to a package's first include dir
    #[serde(default)]
    pub include_variables: BTreeMap<String, String>,

    /// Lookup hints for the consumer build
    #[serde(default)]
    pub deps: BTreeMap<String, DepHints>,
}

fn default_test_path() -> String {
    "test_package".to_string()
}

fn default_test_executable() -> String {
    "test_package".to_string()
}
