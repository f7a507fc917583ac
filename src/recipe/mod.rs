// src/recipe/mod.rs

//! Recipe system for packaging C++ libraries from source
//!
//! A recipe declares everything a cook needs:
//! - Options with defaults, and the platforms where an option does not exist
//! - Requirements on other packages, gated by options
//! - Upstream git sources pinned to tags, plus line insertions to apply
//! - CMake lookup hints and toolchain variables
//! - Consumer metadata (licenses, system link table)
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "magnum-integration"
//! version = "2020.06"
//!
//! [options.shared]
//! values = [true, false]
//! default = false
//!
//! [[requires]]
//! reference = "eigen/3.4.0"
//! when = "with_eigen"
//!
//! [[sources]]
//! url = "https://github.com/mosra/magnum-integration.git"
//! reference = "v%(version)s"
//! ```

mod format;
pub mod graph;
pub mod options;
pub mod parser;
pub mod reference;

pub use format::{
    CMakeSection, PackageInfoSection, PackageSection, PatchEntry, PropagateRule, Recipe,
    RequirementDecl, SourceEntry, TestPackageSection,
};
pub use options::{OptionDecl, OptionSet, OptionValue};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use reference::{PackageReference, ReferenceParseError};

/// The magnum-integration recipe shipped with the tool
pub const BUILTIN_RECIPE: &str = include_str!("../../recipes/magnum-integration/recipe.toml");

/// Files of the built-in recipe's verification project (relative path, content)
pub const BUILTIN_TEST_PACKAGE: &[(&str, &str)] = &[
    (
        "CMakeLists.txt",
        include_str!("../../recipes/magnum-integration/test_package/CMakeLists.txt"),
    ),
    (
        "test_package.cpp",
        include_str!("../../recipes/magnum-integration/test_package/test_package.cpp"),
    ),
];

/// Parse the built-in magnum-integration recipe
pub fn builtin() -> crate::Result<Recipe> {
    parse_recipe(BUILTIN_RECIPE)
}
