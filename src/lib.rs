// src/lib.rs

//! magnum-kitchen
//!
//! Packages the magnum-integration C++ library (Bullet, Eigen, GLM, ImGui
//! and OpenVR integration for Magnum) from a declarative recipe.
//!
//! # Architecture
//!
//! - Recipes: TOML declarations of options, requirements, sources and patches
//! - Resolution: a profile plus a recipe gives one immutable configuration
//! - Store: packaged configurations keyed by a hash of reference, settings
//!   and options
//! - Kitchen: source checkout, CMake generation, build, install, manifest
//! - Verification: a minimal consumer built and run against the package

pub mod cmake;
pub mod deps;
mod error;
pub mod hash;
pub mod kitchen;
pub mod package_info;
pub mod profile;
pub mod recipe;
pub mod resolve;
pub mod settings;
pub mod store;
pub mod verify;

pub use deps::{DependencyProvider, DependencySet, ResolvedDependency};
pub use error::{Error, Result};
pub use hash::Hash;
pub use kitchen::{Cook, CookResult, Kitchen, KitchenConfig};
pub use package_info::{CppInfo, LinkDirective, LinkMode};
pub use profile::Profile;
pub use recipe::{OptionValue, PackageReference, Recipe};
pub use resolve::{resolve, Resolution};
pub use settings::{Arch, BuildType, CompilerFamily, Os, Settings};
pub use store::{PackageManifest, PackageStore};
pub use verify::VerifyOutcome;
