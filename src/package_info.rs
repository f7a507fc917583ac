// src/package_info.rs

//! Consumption metadata for a packaged configuration
//!
//! Consumers need the library names inside the package and whatever system
//! libraries or linker flags come with them. Library names are read from the
//! package folder; system link directives come from a fixed table keyed on
//! OS, compiler and link mode.

use crate::error::{Error, Result};
use crate::settings::{CompilerFamily, Os, Settings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use strum_macros::{Display, EnumIter};
use tracing::debug;
use walkdir::WalkDir;

/// How the package's own libraries are linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    Static,
    Shared,
}

/// System link table a recipe can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemLink {
    #[serde(rename = "opengl")]
    OpenGl,
}

/// One thing a consumer must add to its link line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LinkDirective {
    /// A system library, by the name the linker expects
    SystemLib(String),
    /// A raw flag for linking executables
    ExeLinkFlag(String),
}

impl fmt::Display for LinkDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemLib(lib) => write!(f, "system lib {}", lib),
            Self::ExeLinkFlag(flag) => write!(f, "exe link flag {}", flag),
        }
    }
}

/// The link table has no entry for this combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedCombination {
    pub os: Os,
    pub compiler: CompilerFamily,
    pub mode: LinkMode,
}

impl fmt::Display for UnsupportedCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no OpenGL link directives for os={} compiler={} link={}",
            self.os, self.compiler, self.mode
        )
    }
}

impl std::error::Error for UnsupportedCombination {}

impl From<UnsupportedCombination> for Error {
    fn from(e: UnsupportedCombination) -> Self {
        Error::UnsupportedPlatform(e.to_string())
    }
}

/// OpenGL link directives for a target
pub fn opengl_link_directives(
    os: Os,
    compiler: CompilerFamily,
    mode: LinkMode,
) -> std::result::Result<Vec<LinkDirective>, UnsupportedCombination> {
    use CompilerFamily::*;

    let lib = |name: &str| vec![LinkDirective::SystemLib(name.to_string())];

    match (os, compiler, mode) {
        (Os::Windows, Msvc, LinkMode::Static) => Ok(lib("OpenGL32.lib")),
        (Os::Windows, Msvc, LinkMode::Shared) => Ok(Vec::new()),
        (Os::Windows, Gcc | Clang, _) => Ok(lib("opengl32")),
        (Os::Macos, AppleClang | Clang | Gcc, _) => Ok(vec![LinkDirective::ExeLinkFlag(
            "-framework OpenGL".to_string(),
        )]),
        (Os::Linux | Os::FreeBSD, Gcc | Clang, LinkMode::Static) => Ok(lib("GL")),
        (Os::Linux | Os::FreeBSD, Gcc | Clang, LinkMode::Shared) => Ok(Vec::new()),
        _ => Err(UnsupportedCombination { os, compiler, mode }),
    }
}

/// Directives for a recipe's system link table
pub fn system_link_directives(
    link: SystemLink,
    settings: &Settings,
    mode: LinkMode,
) -> std::result::Result<Vec<LinkDirective>, UnsupportedCombination> {
    match link {
        SystemLink::OpenGl => opengl_link_directives(settings.os, settings.compiler, mode),
    }
}

/// What a consumer needs to compile and link against a package
///
/// Directories are relative to the package folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CppInfo {
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub includedirs: Vec<String>,
    #[serde(default)]
    pub libdirs: Vec<String>,
    #[serde(default)]
    pub bindirs: Vec<String>,
    #[serde(default)]
    pub system_libs: Vec<String>,
    #[serde(default)]
    pub exelinkflags: Vec<String>,
}

impl CppInfo {
    /// Conventional layout (`include`, `lib`, `bin`) with no libraries yet
    pub fn with_default_dirs() -> Self {
        Self {
            includedirs: vec!["include".to_string()],
            libdirs: vec!["lib".to_string()],
            bindirs: vec!["bin".to_string()],
            ..Self::default()
        }
    }

    pub fn add_directives(&mut self, directives: Vec<LinkDirective>) {
        for directive in directives {
            match directive {
                LinkDirective::SystemLib(lib) => self.system_libs.push(lib),
                LinkDirective::ExeLinkFlag(flag) => self.exelinkflags.push(flag),
            }
        }
    }
}

/// Library name from a file name, or None if it is not a library
fn library_name(file_name: &str) -> Option<String> {
    let (stem, import_lib) = if let Some(stem) = file_name.strip_suffix(".dll.a") {
        (stem, false)
    } else if let Some(stem) = file_name.strip_suffix(".lib") {
        (stem, true)
    } else if let Some(stem) = file_name.strip_suffix(".a") {
        (stem, false)
    } else if let Some(stem) = file_name.strip_suffix(".dylib") {
        (stem, false)
    } else if let Some(pos) = file_name.find(".so") {
        // libFoo.so, libFoo.so.2, libFoo.so.2.4
        let rest = &file_name[pos + 3..];
        if !rest.is_empty() && !rest.starts_with('.') {
            return None;
        }
        (&file_name[..pos], false)
    } else {
        return None;
    };

    // MSVC import libraries carry no prefix
    let name = if import_lib {
        stem
    } else {
        stem.strip_prefix("lib").unwrap_or(stem)
    };

    // Versioned dylibs: libFoo.2.dylib
    let name = if file_name.ends_with(".dylib") {
        name.split('.').next().unwrap_or(name)
    } else {
        name
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Collect library names from a package folder's `lib` and `bin` dirs
///
/// Names are deduplicated and sorted.
pub fn collect_libs(package_folder: &Path) -> Result<Vec<String>> {
    let mut libs = BTreeSet::new();

    for dir in ["lib", "bin"] {
        let dir = package_folder.join(dir);
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                Error::IoError(format!("Failed to scan {}: {}", dir.display(), e))
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str().and_then(library_name) {
                libs.insert(name);
            }
        }
    }

    debug!(
        "Collected {} libraries from {}",
        libs.len(),
        package_folder.display()
    );
    Ok(libs.into_iter().collect())
}

/// Put listed libraries first, in list order (reversed if asked)
///
/// Libraries not in `order` keep their relative order after the listed ones.
/// Listed names that were not collected are ignored.
pub fn order_libs(libs: Vec<String>, order: &[String], reverse: bool) -> Vec<String> {
    if order.is_empty() {
        return libs;
    }

    let mut ordered: Vec<String> = order
        .iter()
        .filter(|name| libs.contains(name))
        .cloned()
        .collect();
    if reverse {
        ordered.reverse();
    }

    let rest = libs.into_iter().filter(|l| !order.contains(l));
    ordered.extend(rest);
    ordered
}

/// Build the consumption metadata of a packaged configuration
pub fn package_info(
    recipe: &crate::recipe::Recipe,
    settings: &Settings,
    mode: LinkMode,
    package_folder: &Path,
) -> Result<CppInfo> {
    let mut info = CppInfo::with_default_dirs();

    let libs = collect_libs(package_folder)?;
    info.libs = order_libs(
        libs,
        &recipe.package_info.link_order,
        recipe.package_info.reverse_link_order,
    );

    if let Some(link) = recipe.package_info.system_link {
        info.add_directives(system_link_directives(link, settings, mode)?);
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn expected(os: Os, compiler: CompilerFamily, mode: LinkMode) -> Option<Vec<LinkDirective>> {
        use CompilerFamily::*;
        let sys = |s: &str| Some(vec![LinkDirective::SystemLib(s.to_string())]);
        match (os, compiler, mode) {
            (Os::Windows, Msvc, LinkMode::Static) => sys("OpenGL32.lib"),
            (Os::Windows, Msvc, LinkMode::Shared) => Some(vec![]),
            (Os::Windows, Gcc, _) | (Os::Windows, Clang, _) => sys("opengl32"),
            (Os::Macos, AppleClang, _) | (Os::Macos, Clang, _) | (Os::Macos, Gcc, _) => Some(vec![
                LinkDirective::ExeLinkFlag("-framework OpenGL".to_string()),
            ]),
            (Os::Linux, Gcc, LinkMode::Static)
            | (Os::Linux, Clang, LinkMode::Static)
            | (Os::FreeBSD, Gcc, LinkMode::Static)
            | (Os::FreeBSD, Clang, LinkMode::Static) => sys("GL"),
            (Os::Linux, Gcc, LinkMode::Shared)
            | (Os::Linux, Clang, LinkMode::Shared)
            | (Os::FreeBSD, Gcc, LinkMode::Shared)
            | (Os::FreeBSD, Clang, LinkMode::Shared) => Some(vec![]),
            _ => None,
        }
    }

    #[test]
    fn test_link_table_is_exact() {
        let mut supported = 0;
        for os in Os::iter() {
            for compiler in CompilerFamily::iter() {
                for mode in LinkMode::iter() {
                    let got = opengl_link_directives(os, compiler, mode);
                    match expected(os, compiler, mode) {
                        Some(want) => {
                            supported += 1;
                            assert_eq!(got.as_ref().ok(), Some(&want), "{} {} {}", os, compiler, mode);
                        }
                        None => assert_eq!(
                            got,
                            Err(UnsupportedCombination { os, compiler, mode }),
                            "{} {} {}",
                            os,
                            compiler,
                            mode
                        ),
                    }
                }
            }
        }
        // msvc x2, mingw/clang x4, mac 3x2, linux/bsd 2x2x2
        assert_eq!(supported, 2 + 4 + 6 + 8);
    }

    #[test]
    fn test_unsupported_combinations() {
        assert!(opengl_link_directives(Os::Linux, CompilerFamily::Msvc, LinkMode::Static).is_err());
        assert!(opengl_link_directives(Os::Android, CompilerFamily::Clang, LinkMode::Static).is_err());
        assert!(opengl_link_directives(Os::Windows, CompilerFamily::AppleClang, LinkMode::Shared).is_err());

        let err: Error = opengl_link_directives(Os::Emscripten, CompilerFamily::Clang, LinkMode::Static)
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
        assert!(err.to_string().contains("os=Emscripten"));
    }

    #[test]
    fn test_library_name() {
        assert_eq!(library_name("libMagnumImGuiIntegration.a").as_deref(), Some("MagnumImGuiIntegration"));
        assert_eq!(library_name("libMagnumEigenIntegration.so").as_deref(), Some("MagnumEigenIntegration"));
        assert_eq!(library_name("libMagnumGlmIntegration.so.2").as_deref(), Some("MagnumGlmIntegration"));
        assert_eq!(library_name("libFoo.2.dylib").as_deref(), Some("Foo"));
        assert_eq!(library_name("MagnumImGuiIntegration.lib").as_deref(), Some("MagnumImGuiIntegration"));
        assert_eq!(library_name("libFoo.dll.a").as_deref(), Some("Foo"));
        assert_eq!(library_name("Foo.dll"), None);
        assert_eq!(library_name("README.md"), None);
        assert_eq!(library_name("libsomething.sources"), None);
    }

    #[test]
    fn test_collect_libs() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        std::fs::create_dir_all(lib.join("cmake")).unwrap();
        for name in [
            "libMagnumImGuiIntegration.so",
            "libMagnumImGuiIntegration.so.2",
            "libMagnumEigenIntegration.a",
            "pkgconfig.txt",
        ] {
            std::fs::write(lib.join(name), b"").unwrap();
        }

        let libs = collect_libs(dir.path()).unwrap();
        assert_eq!(libs, vec!["MagnumEigenIntegration", "MagnumImGuiIntegration"]);
    }

    #[test]
    fn test_collect_libs_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_libs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_order_libs() {
        let libs = vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()];
        let order = vec!["C".to_string(), "A".to_string(), "Z".to_string()];

        assert_eq!(order_libs(libs.clone(), &[], false), libs);
        assert_eq!(order_libs(libs.clone(), &order, false), vec!["C", "A", "B", "D"]);
        assert_eq!(order_libs(libs, &order, true), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_cpp_info_directives() {
        let mut info = CppInfo::with_default_dirs();
        info.add_directives(vec![
            LinkDirective::SystemLib("GL".into()),
            LinkDirective::ExeLinkFlag("-framework OpenGL".into()),
        ]);
        assert_eq!(info.system_libs, vec!["GL"]);
        assert_eq!(info.exelinkflags, vec!["-framework OpenGL"]);
        assert_eq!(info.includedirs, vec!["include"]);
    }
}
