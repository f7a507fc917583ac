// src/cmake/mod.rs

//! CMake integration
//!
//! - Build variables derived from resolved options
//! - The toolchain file that carries them into a configure run
//! - Per-dependency lookup files (`Find<Name>.cmake`, `<Name>Config.cmake`)

pub mod deps;
pub mod toolchain;

pub use deps::{DepHints, FindMode, write_dependency_files};
pub use toolchain::Toolchain;

use crate::error::{Error, Result};
use crate::recipe::{OptionSet, OptionValue};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A CMake cache value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CMakeValue {
    On,
    Off,
    Raw(String),
}

impl CMakeValue {
    pub fn path(path: &Path) -> Self {
        Self::Raw(cmake_path(path))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::On | Self::Off)
    }
}

impl From<bool> for CMakeValue {
    fn from(b: bool) -> Self {
        if b { Self::On } else { Self::Off }
    }
}

impl From<&OptionValue> for CMakeValue {
    fn from(v: &OptionValue) -> Self {
        match v {
            OptionValue::Bool(b) => Self::from(*b),
            OptionValue::Str(s) => Self::Raw(s.clone()),
        }
    }
}

impl fmt::Display for CMakeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
            Self::Raw(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered variable name -> value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CMakeVariables {
    vars: BTreeMap<String, CMakeValue>,
}

impl CMakeVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<CMakeValue>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&CMakeValue> {
        self.vars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CMakeValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Path with forward slashes, as CMake expects on every platform
pub fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Build variables for a configuration
///
/// Every active option becomes an upper-cased variable. `LIB_SUFFIX`,
/// `BUILD_STATIC` and `BUILD_STATIC_PIC` are always set. `root_variables`
/// maps a variable to the dependency whose package folder it names.
pub fn build_variables(
    options: &OptionSet,
    root_variables: &BTreeMap<String, String>,
    package_folders: &BTreeMap<String, PathBuf>,
) -> Result<CMakeVariables> {
    let mut vars = CMakeVariables::new();

    for (name, value) in options.iter() {
        vars.set(name.to_uppercase(), value);
    }

    let shared = options.flag("shared");
    let fpic = options.flag("fPIC");
    vars.set("LIB_SUFFIX", CMakeValue::Raw(String::new()));
    vars.set("BUILD_STATIC", !shared);
    vars.set("BUILD_STATIC_PIC", !shared && fpic);

    for (var, package) in root_variables {
        let folder = package_folders.get(package).ok_or_else(|| {
            Error::ResolutionError(format!(
                "{} needs the package folder of '{}', which is not a resolved dependency",
                var, package
            ))
        })?;
        vars.set(var.clone(), CMakeValue::path(folder));
    }

    Ok(vars)
}
