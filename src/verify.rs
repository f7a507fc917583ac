// src/verify.rs

//! Verification of a created package with a minimal consumer project
//!
//! The consumer is configured against the package and its dependencies,
//! built, and executed when the host can run binaries for the target.

use crate::cmake::{cmake_path, write_dependency_files, CMakeValue, CMakeVariables, Toolchain};
use crate::deps::{DependencyProvider, DependencySet, ResolvedDependency};
use crate::error::{Error, Result};
use crate::kitchen::process::{run_tool, BuildLog, CMakeRunner};
use crate::recipe::{Recipe, TestPackageSection, BUILTIN_TEST_PACKAGE};
use crate::resolve::Resolution;
use crate::settings::Settings;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What the consumer check concluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VerifyOutcome {
    /// Built and ran successfully
    Passed,
    /// Built, but the binary cannot run on this host
    Skipped { reason: String },
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Skipped { reason } => write!(f, "skipped ({})", reason),
        }
    }
}

/// Inputs of one verification run
pub struct Verification<'a> {
    pub recipe: &'a Recipe,
    pub section: &'a TestPackageSection,
    pub resolution: &'a Resolution,
    pub deps: &'a DependencySet,
    /// Where the consumer is built
    pub build_folder: PathBuf,
    pub cmake: &'a CMakeRunner,
}

impl Verification<'_> {
    /// Build and run the consumer against the package `provider` holds
    pub fn run(&self, provider: &dyn DependencyProvider, log: &mut BuildLog) -> Result<VerifyOutcome> {
        let tested = find_tested(provider, self.resolution)?;
        let mut deps = self.deps.clone();
        deps.push(tested);

        let project = self.project_folder()?;
        let generators = self.build_folder.join("generators");
        let toolchain = self.toolchain(&deps, &generators)?;
        let toolchain_path = toolchain.write()?;
        write_dependency_files(&generators, &deps, &self.section.deps)?;

        let build_type = self.resolution.settings.build_type;
        info!("Building test package in {}", self.build_folder.display());
        self.cmake
            .configure(&project, &self.build_folder, &toolchain_path, build_type, None, log)
            .and_then(|_| self.cmake.build(&self.build_folder, build_type, log))
            .map_err(|e| Error::VerificationFailed(format!("test package did not build: {}", e)))?;

        let host = Settings::host();
        if !self.resolution.settings.can_run_on(&host) {
            let reason = format!(
                "cannot run {}/{} binaries on {}/{}",
                self.resolution.settings.os,
                self.resolution.settings.arch,
                host.os,
                host.arch
            );
            warn!("Not running test package: {}", reason);
            log.line(&format!("Test package skipped: {}", reason));
            return Ok(VerifyOutcome::Skipped { reason });
        }

        let exe = self.find_executable()?;
        run_tool("test", &exe, std::iter::empty::<&str>(), Some(&self.build_folder), log)
            .map_err(|e| Error::VerificationFailed(e.to_string()))?;

        log.line("Test package passed");
        Ok(VerifyOutcome::Passed)
    }

    /// Consumer sources: next to the recipe, or the built-in project
    fn project_folder(&self) -> Result<PathBuf> {
        if let Some(base) = &self.recipe.base_dir {
            let dir = base.join(&self.section.path);
            if !dir.is_dir() {
                return Err(Error::NotFound(format!(
                    "test package folder {}",
                    dir.display()
                )));
            }
            return Ok(dir);
        }

        let dir = self.build_folder.join("project");
        materialize_builtin(&dir)?;
        Ok(dir)
    }

    fn toolchain(&self, deps: &DependencySet, generators: &Path) -> Result<Toolchain> {
        let mut variables = CMakeVariables::new();
        for (var, package) in &self.section.root_variables {
            let dep = lookup(deps, var, package)?;
            variables.set(var.clone(), CMakeValue::path(&dep.package_folder));
        }
        for (var, package) in &self.section.include_variables {
            let dep = lookup(deps, var, package)?;
            variables.set(var.clone(), CMakeValue::Raw(cmake_path(&dep.include_dir())));
        }

        let mut toolchain = Toolchain::new(
            format!("{} test package", self.resolution.reference),
            self.resolution.settings,
            generators,
        );
        toolchain.variables = variables;
        toolchain.shared = self.resolution.is_shared();
        toolchain.position_independent = self
            .resolution
            .options
            .get_safe("fPIC")
            .map(|v| v.is_true());
        toolchain.prefix_paths = deps.iter().map(|d| d.package_folder.clone()).collect();
        Ok(toolchain)
    }

    /// Executable in the build tree; multi-config generators add a folder
    fn find_executable(&self) -> Result<PathBuf> {
        let settings = &self.resolution.settings;
        let name = format!("{}{}", self.section.executable, settings.os.exe_suffix());
        let candidates = [
            self.build_folder.join(&name),
            self.build_folder.join(settings.build_type.to_string()).join(&name),
            self.build_folder.join("bin").join(&name),
        ];
        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                Error::VerificationFailed(format!(
                    "{} was not produced in {}",
                    name,
                    self.build_folder.display()
                ))
            })
    }
}

fn lookup<'d>(deps: &'d DependencySet, var: &str, package: &str) -> Result<&'d ResolvedDependency> {
    deps.get(package).ok_or_else(|| {
        Error::ResolutionError(format!(
            "{} refers to '{}', which the test package does not depend on",
            var, package
        ))
    })
}

/// The tested package, looked up with its exact option values
fn find_tested(provider: &dyn DependencyProvider, resolution: &Resolution) -> Result<ResolvedDependency> {
    let manifest = provider
        .find_package(
            &resolution.reference,
            &resolution.settings,
            &resolution.options.to_map(),
        )?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "package {} for {}; create it first",
                resolution.reference, resolution.settings
            ))
        })?;
    let package_folder = provider.package_folder(&manifest);
    Ok(ResolvedDependency {
        manifest,
        package_folder,
        direct: true,
        transitive_headers: false,
    })
}

/// Write the built-in consumer project into `dir`
pub fn materialize_builtin(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (name, content) in BUILTIN_TEST_PACKAGE {
        let path = dir.join(name);
        fs::write(&path, content)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use crate::recipe::{self, PackageReference};
    use crate::resolve::resolve;
    use crate::store::{PackageManifest, PackageSettings};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    struct NoPackages;

    impl DependencyProvider for NoPackages {
        fn find_package(
            &self,
            _wanted: &PackageReference,
            _settings: &Settings,
            _constraints: &BTreeMap<String, crate::recipe::OptionValue>,
        ) -> Result<Option<PackageManifest>> {
            Ok(None)
        }

        fn package_folder(&self, _manifest: &PackageManifest) -> PathBuf {
            PathBuf::new()
        }
    }

    fn dep(name: &str, root: &Path) -> ResolvedDependency {
        ResolvedDependency {
            manifest: PackageManifest::new(
                PackageReference::new(name, "1.0"),
                PackageSettings::default(),
                BTreeMap::new(),
            ),
            package_folder: root.join(name),
            direct: true,
            transitive_headers: false,
        }
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(VerifyOutcome::Passed.to_string(), "passed");
        let skipped = VerifyOutcome::Skipped {
            reason: "cross build".to_string(),
        };
        assert_eq!(skipped.to_string(), "skipped (cross build)");
        assert_eq!(
            serde_json::to_value(&skipped).unwrap(),
            serde_json::json!({"status": "skipped", "reason": "cross build"})
        );
    }

    #[test]
    fn test_materialize_builtin() {
        let dir = TempDir::new().unwrap();
        materialize_builtin(dir.path()).unwrap();
        assert!(dir.path().join("CMakeLists.txt").is_file());
        assert!(dir.path().join("test_package.cpp").is_file());
    }

    #[test]
    fn test_missing_package_is_not_found() {
        let dir = TempDir::new().unwrap();
        let recipe = recipe::builtin().unwrap();
        let resolution = resolve(&recipe, &Profile::host()).unwrap();
        let section = recipe.test_package.clone().unwrap();
        let cmake = CMakeRunner {
            program: PathBuf::from("cmake"),
            generator: None,
            jobs: 1,
        };
        let deps = DependencySet::default();
        let verification = Verification {
            recipe: &recipe,
            section: &section,
            resolution: &resolution,
            deps: &deps,
            build_folder: dir.path().join("build"),
            cmake: &cmake,
        };

        let mut log = BuildLog::new();
        let err = verification.run(&NoPackages, &mut log).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_toolchain_variables() {
        let dir = TempDir::new().unwrap();
        let recipe = recipe::builtin().unwrap();
        let resolution = resolve(&recipe, &Profile::host()).unwrap();
        let section = recipe.test_package.clone().unwrap();
        let cmake = CMakeRunner {
            program: PathBuf::from("cmake"),
            generator: None,
            jobs: 1,
        };

        let mut deps = DependencySet::default();
        for name in ["corrade", "magnum", "magnum-integration"] {
            deps.push(dep(name, dir.path()));
        }
        let verification = Verification {
            recipe: &recipe,
            section: &section,
            resolution: &resolution,
            deps: &deps,
            build_folder: dir.path().join("build"),
            cmake: &cmake,
        };

        let toolchain = verification
            .toolchain(&deps, &dir.path().join("generators"))
            .unwrap();
        let integration = cmake_path(&dir.path().join("magnum-integration"));
        assert_eq!(
            toolchain.variables.get("MagnumIntegration_ROOT").map(|v| v.to_string()),
            Some(integration.clone())
        );
        assert_eq!(
            toolchain
                .variables
                .get("MAGNUMINTEGRATION_INCLUDE_DIR")
                .map(|v| v.to_string()),
            Some(format!("{}/include", integration))
        );
        assert!(toolchain.variables.get("Corrade_ROOT").is_some());
        assert!(toolchain.variables.get("Magnum_ROOT").is_some());
    }

    #[test]
    fn test_toolchain_needs_declared_packages() {
        let dir = TempDir::new().unwrap();
        let recipe = recipe::builtin().unwrap();
        let resolution = resolve(&recipe, &Profile::host()).unwrap();
        let section = recipe.test_package.clone().unwrap();
        let cmake = CMakeRunner {
            program: PathBuf::from("cmake"),
            generator: None,
            jobs: 1,
        };
        let deps = DependencySet::default();
        let verification = Verification {
            recipe: &recipe,
            section: &section,
            resolution: &resolution,
            deps: &deps,
            build_folder: dir.path().join("build"),
            cmake: &cmake,
        };

        let err = verification.toolchain(&deps, dir.path()).unwrap_err();
        assert!(matches!(err, Error::ResolutionError(_)));
    }
}
