// src/kitchen/generate.rs

//! Build configuration: toolchain plus per-dependency lookup files

use crate::cmake::{build_variables, write_dependency_files, Toolchain};
use crate::deps::DependencySet;
use crate::error::Result;
use crate::recipe::Recipe;
use crate::resolve::Resolution;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `toolchain.cmake` and the lookup files into `generators_dir`
///
/// Returns the written files, toolchain first.
pub fn generate(
    recipe: &Recipe,
    resolution: &Resolution,
    deps: &DependencySet,
    generators_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let variables = build_variables(
        &resolution.options,
        &recipe.cmake.root_variables,
        &deps.folders(),
    )?;

    let mut toolchain = Toolchain::new(
        resolution.reference.to_string(),
        resolution.settings,
        generators_dir,
    );
    toolchain.variables = variables;
    toolchain.position_independent = resolution.options.get_safe("fPIC").map(|v| v.is_true());
    toolchain.shared = resolution.is_shared();
    toolchain.prefix_paths = deps.iter().map(|d| d.package_folder.clone()).collect();

    let mut written = vec![toolchain.write()?];
    written.extend(write_dependency_files(generators_dir, deps, &recipe.cmake.deps)?);

    info!(
        "Generated {} build files in {}",
        written.len(),
        generators_dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmake::toolchain::TOOLCHAIN_FILE;
    use crate::deps::ResolvedDependency;
    use crate::profile::Profile;
    use crate::recipe::{self, PackageReference};
    use crate::resolve::resolve;
    use crate::store::{PackageManifest, PackageSettings};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn dep(name: &str, version: &str, root: &Path) -> ResolvedDependency {
        let manifest = PackageManifest::new(
            PackageReference::new(name, version),
            PackageSettings::default(),
            BTreeMap::new(),
        );
        ResolvedDependency {
            manifest,
            package_folder: root.join(name),
            direct: true,
            transitive_headers: false,
        }
    }

    #[test]
    fn test_generate_writes_toolchain_and_lookups() {
        let dir = TempDir::new().unwrap();
        let recipe = recipe::builtin().unwrap();
        let resolution = resolve(&recipe, &Profile::host()).unwrap();

        let mut deps = DependencySet::default();
        for (name, version) in [
            ("corrade", "2020.06"),
            ("magnum", "2020.06"),
            ("eigen", "3.4.0"),
            ("glm", "0.9.9.8"),
        ] {
            deps.push(dep(name, version, dir.path()));
        }

        let generators = dir.path().join("generators");
        let written = generate(&recipe, &resolution, &deps, &generators).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![TOOLCHAIN_FILE, "FindEigen3.cmake", "FindGLM.cmake"]);

        let toolchain = fs::read_to_string(&written[0]).unwrap();
        assert!(toolchain.contains("set(WITH_IMGUI \"ON\" CACHE BOOL \"\" FORCE)"));
        assert!(toolchain.contains("set(BUILD_STATIC \"ON\" CACHE BOOL \"\" FORCE)"));
        assert!(toolchain.contains("Corrade_ROOT"));
        assert!(toolchain.contains("Magnum_ROOT"));
    }

    #[test]
    fn test_generate_requires_root_packages() {
        let dir = TempDir::new().unwrap();
        let recipe = recipe::builtin().unwrap();
        let resolution = resolve(&recipe, &Profile::host()).unwrap();

        let err = generate(&recipe, &resolution, &DependencySet::default(), dir.path()).unwrap_err();
        assert!(matches!(err, crate::Error::ResolutionError(_)));
    }
}
