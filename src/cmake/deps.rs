// src/cmake/deps.rs

//! Lookup files that let `find_package` see packaged dependencies
//!
//! Each dependency gets an imported interface target carrying its include
//! directories, libraries and system link directives. Depending on its find
//! mode the target is written as a `Find<Name>.cmake` module, a
//! `<Name>Config.cmake` package config, both, or not at all (for packages
//! that ship their own CMake config and are located through `<Name>_ROOT`).

use super::cmake_path;
use super::toolchain::quote;
use crate::deps::{DependencySet, ResolvedDependency};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which lookup files to generate for a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindMode {
    /// Nothing; the package's own config is used
    None,
    /// `Find<Name>.cmake`
    Module,
    /// `<Name>Config.cmake`
    #[default]
    Config,
    /// Both files
    Both,
}

/// Lookup hints for one dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepHints {
    #[serde(default)]
    pub find_mode: FindMode,
    /// Name used in `find_package` (defaults to the package name)
    #[serde(default)]
    pub file_name: Option<String>,
    /// Imported target (defaults to `name::name`)
    #[serde(default)]
    pub target_name: Option<String>,
}

impl DepHints {
    pub fn file_name_for(&self, package: &str) -> String {
        self.file_name.clone().unwrap_or_else(|| package.to_string())
    }

    pub fn target_for(&self, package: &str) -> String {
        self.target_name
            .clone()
            .unwrap_or_else(|| format!("{}::{}", package, package))
    }
}

/// Render the script defining a dependency's imported target
pub fn render_lookup(dep: &ResolvedDependency, hints: &DepHints, requires: &[String]) -> String {
    let name = dep.name();
    let file_name = hints.file_name_for(name);
    let target = hints.target_for(name);
    let var = file_name.to_uppercase();
    let info = &dep.manifest.cpp_info;
    let root = &dep.package_folder;

    let join = |dirs: &[String]| -> String {
        dirs.iter()
            .map(|d| cmake_path(&root.join(d)))
            .collect::<Vec<_>>()
            .join(";")
    };
    let include_dirs = join(&info.includedirs);
    let lib_dirs = join(&info.libdirs);

    let mut out = String::new();
    out.push_str(&format!("# Generated by magnum-kitchen for {}\n", dep.reference()));
    out.push('\n');
    out.push_str(&format!("set({}_FOUND TRUE)\n", file_name));
    out.push_str(&format!("set({}_FOUND TRUE)\n", var));
    out.push_str(&format!("set({}_VERSION {})\n", file_name, quote(&dep.reference().version)));
    out.push_str(&format!("set({}_INCLUDE_DIRS {})\n", file_name, quote(&include_dirs)));
    out.push_str(&format!("set({}_INCLUDE_DIR {})\n", var, quote(&include_dirs)));
    out.push('\n');

    out.push_str(&format!("set(_{}_LINK \"\")\n", var));
    for lib in &info.libs {
        let lib_var = format!("{}_LIB_{}", var, lib.to_uppercase());
        out.push_str(&format!(
            "find_library({} NAMES {} PATHS {} NO_DEFAULT_PATH NO_CMAKE_FIND_ROOT_PATH)\n",
            lib_var,
            quote(lib),
            quote(&lib_dirs),
        ));
        out.push_str(&format!("if({})\n", lib_var));
        out.push_str(&format!("  list(APPEND _{}_LINK \"${{{}}}\")\n", var, lib_var));
        out.push_str("endif()\n");
    }
    for lib in &info.system_libs {
        out.push_str(&format!("list(APPEND _{}_LINK {})\n", var, quote(lib)));
    }
    for req in requires {
        out.push_str(&format!("list(APPEND _{}_LINK {})\n", var, quote(req)));
    }
    out.push('\n');

    out.push_str(&format!("if(NOT TARGET {})\n", target));
    out.push_str(&format!("  add_library({} INTERFACE IMPORTED)\n", target));
    out.push_str(&format!("  set_target_properties({} PROPERTIES\n", target));
    out.push_str(&format!("    INTERFACE_INCLUDE_DIRECTORIES {}\n", quote(&include_dirs)));
    out.push_str(&format!("    INTERFACE_LINK_LIBRARIES \"${{_{}_LINK}}\"\n", var));
    if !info.exelinkflags.is_empty() {
        out.push_str(&format!(
            "    INTERFACE_LINK_OPTIONS {}\n",
            quote(&info.exelinkflags.join(";")),
        ));
    }
    out.push_str("  )\n");
    out.push_str("endif()\n");
    out.push_str(&format!("set({}_LIBRARIES {})\n", file_name, target));
    out.push_str(&format!("set({}_LIBRARIES {})\n", var, target));

    out
}

fn render_config_version(dep: &ResolvedDependency) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Generated by magnum-kitchen for {}\n", dep.reference()));
    out.push_str(&format!("set(PACKAGE_VERSION {})\n", quote(&dep.reference().version)));
    out.push_str("set(PACKAGE_VERSION_COMPATIBLE TRUE)\n");
    out.push_str("if(PACKAGE_FIND_VERSION STREQUAL PACKAGE_VERSION)\n");
    out.push_str("  set(PACKAGE_VERSION_EXACT TRUE)\n");
    out.push_str("endif()\n");
    out
}

fn hints_or_default<'a>(
    hints: &'a BTreeMap<String, DepHints>,
    default: &'a DepHints,
    name: &str,
) -> &'a DepHints {
    hints.get(name).unwrap_or(default)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))
}

/// Write lookup files for every dependency into `dir`
///
/// Dependencies without hints use the defaults (config mode, package name,
/// `name::name`). Returns the written paths in dependency order.
pub fn write_dependency_files(
    dir: &Path,
    deps: &DependencySet,
    hints: &BTreeMap<String, DepHints>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .map_err(|e| Error::IoError(format!("Failed to create {}: {}", dir.display(), e)))?;

    let default_hints = DepHints::default();
    let hints_for = |name: &str| hints_or_default(hints, &default_hints, name).clone();

    let mut written = Vec::new();
    for dep in deps.iter() {
        let name = dep.name();
        let h = &hints_for(name);
        if h.find_mode == FindMode::None {
            debug!("Skipping lookup files for {} (find mode none)", name);
            continue;
        }

        // Link requirements that have targets of their own
        let requires: Vec<String> = dep
            .manifest
            .requires
            .iter()
            .map(|r| r.name.as_str())
            .filter(|&r| deps.get(r).is_some() && hints_for(r).find_mode != FindMode::None)
            .map(|r| hints_for(r).target_for(r))
            .collect();

        let content = render_lookup(dep, h, &requires);
        let file_name = h.file_name_for(name);

        if matches!(h.find_mode, FindMode::Module | FindMode::Both) {
            let path = dir.join(format!("Find{}.cmake", file_name));
            write_file(&path, &content)?;
            written.push(path);
        }
        if matches!(h.find_mode, FindMode::Config | FindMode::Both) {
            let path = dir.join(format!("{}Config.cmake", file_name));
            write_file(&path, &content)?;
            written.push(path);
            let path = dir.join(format!("{}ConfigVersion.cmake", file_name));
            write_file(&path, &render_config_version(dep))?;
            written.push(path);
        }
    }

    Ok(written)
}
