// src/kitchen/mod.rs

//! Kitchen: where recipes are cooked into packages
//!
//! The Kitchen ties the steps of a cook together:
//! - Resolving options and requirements against a profile
//! - Binding requirements to packages from the store
//! - Cloning and patching sources
//! - Generating the CMake toolchain and lookup files
//! - Building, installing and recording the package
//! - Verifying the result with the recipe's test package

mod config;
mod cook;
pub mod generate;
pub mod layout;
pub mod process;
pub mod source;

pub use config::{CookResult, KitchenConfig, ENV_CMAKE, ENV_GIT, ENV_JOBS, ENV_STORE, ENV_WORKDIR};
pub use cook::{manifest_for, Cook};
pub use layout::Layout;
pub use process::{BuildLog, CMakeRunner};
pub use source::PatchOutcome;

use crate::deps::{resolve_dependencies, DependencyProvider, DependencySet};
use crate::error::{Error, Result};
use crate::package_info::{system_link_directives, CppInfo};
use crate::profile::Profile;
use crate::recipe::{validate_recipe, PackageReference, Recipe};
use crate::resolve::{resolve, Resolution};
use crate::store::{PackageStore, SourceProvenance};
use crate::verify::{Verification, VerifyOutcome};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A resolved configuration with its dependencies bound to packages
#[derive(Debug, Clone)]
pub struct Prepared {
    pub resolution: Resolution,
    pub deps: DependencySet,
}

/// Result of fetching sources without building
#[derive(Debug)]
pub struct SourceResult {
    pub sources: Vec<SourceProvenance>,
    pub patches: Vec<PatchOutcome>,
    pub log: String,
}

/// Consumption metadata of one configuration
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub reference: PackageReference,
    pub package_id: String,
    /// Whether the configuration exists in the store
    pub packaged: bool,
    pub cpp_info: CppInfo,
}

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    pub(crate) store: PackageStore,
    /// Where requirements are looked up; the store when unset
    provider: Option<Arc<dyn DependencyProvider>>,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration
    pub fn new(config: KitchenConfig) -> Self {
        let store = PackageStore::new(config.store_dir.clone());
        Self {
            config,
            store,
            provider: None,
        }
    }

    /// Create a new Kitchen that looks up requirements through `provider`
    pub fn with_provider(config: KitchenConfig, provider: Arc<dyn DependencyProvider>) -> Self {
        let mut kitchen = Self::new(config);
        kitchen.provider = Some(provider);
        kitchen
    }

    /// Create a Kitchen with default configuration
    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn store(&self) -> &PackageStore {
        &self.store
    }

    fn provider(&self) -> &dyn DependencyProvider {
        match &self.provider {
            Some(p) => p.as_ref(),
            None => &self.store,
        }
    }

    /// Validate the recipe and resolve it for a profile
    pub fn resolve(&self, recipe: &Recipe, profile: &Profile) -> Result<Resolution> {
        for warning in validate_recipe(recipe)? {
            debug!("Recipe: {}", warning);
        }
        resolve(recipe, profile)
    }

    /// Resolve, check the link table and bind requirements to packages
    ///
    /// Fails before anything is fetched or built when the settings have no
    /// entry in the recipe's system link table.
    pub fn prepare(&self, recipe: &Recipe, profile: &Profile) -> Result<Prepared> {
        let resolution = self.resolve(recipe, profile)?;
        check_link_table(recipe, &resolution)?;

        let deps = resolve_dependencies(self.provider(), &resolution)?;
        info!(
            "Resolved {} dependencies for {}: {}",
            deps.len(),
            resolution.reference,
            deps.order().join(", ")
        );
        Ok(Prepared { resolution, deps })
    }

    /// Clone and patch the recipe's sources into `dest`
    pub fn fetch_sources(&self, recipe: &Recipe, dest: &Path) -> Result<SourceResult> {
        let git = process::locate_tool(&self.config.git)?;
        let mut log = BuildLog::new();
        fs::create_dir_all(dest)?;

        let sources = source::acquire_sources(&git, recipe, dest, &mut log)?;
        let patches = source::apply_patches(&recipe.patches, dest, &mut log)?;
        Ok(SourceResult {
            sources,
            patches,
            log: log.into_string(),
        })
    }

    /// Write toolchain and lookup files for a profile into `out_dir`
    pub fn generate(&self, recipe: &Recipe, profile: &Profile, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let prepared = self.prepare(recipe, profile)?;
        generate::generate(recipe, &prepared.resolution, &prepared.deps, out_dir)
    }

    /// Cook a recipe: fetch, patch, generate, build, and package it
    pub fn cook(&self, recipe: &Recipe, profile: &Profile) -> Result<CookResult> {
        let prepared = self.prepare(recipe, profile)?;
        let git = process::locate_tool(&self.config.git)?;
        let cmake = self.cmake_runner()?;

        info!("Cooking {} for {}", prepared.resolution.reference, prepared.resolution.settings);

        let mut cook = Cook::new(
            self,
            recipe,
            &prepared.resolution,
            &prepared.deps,
            git,
            cmake,
        );

        cook.prep()?;
        cook.patch()?;
        cook.generate()?;
        cook.simmer()?;
        cook.plate()?;
        cook.clean();

        let result = cook.finish();
        info!(
            "Cooked {} ({}) into {}",
            result.reference,
            result.package_id,
            result.package_folder.display()
        );
        Ok(result)
    }

    /// Cook, then verify the package unless `run_test` is false
    pub fn create(&self, recipe: &Recipe, profile: &Profile, run_test: bool) -> Result<CookResult> {
        let mut result = self.cook(recipe, profile)?;
        if run_test && recipe.test_package.is_some() {
            let (outcome, log) = self.run_test(recipe, profile)?;
            result.log.push_str(&log);
            result.verification = Some(outcome);
        }
        Ok(result)
    }

    /// Verify an already created package with the recipe's test package
    pub fn test(&self, recipe: &Recipe, profile: &Profile) -> Result<VerifyOutcome> {
        self.run_test(recipe, profile).map(|(outcome, _)| outcome)
    }

    fn run_test(&self, recipe: &Recipe, profile: &Profile) -> Result<(VerifyOutcome, String)> {
        let section = recipe.test_package.as_ref().ok_or_else(|| {
            Error::NotFound(format!("[test_package] section in recipe {}", recipe.reference()))
        })?;
        let prepared = self.prepare(recipe, profile)?;
        let cmake = self.cmake_runner()?;
        let manifest = manifest_for(&prepared.resolution);
        let layout = Layout::new(
            &self.config.work_dir,
            &prepared.resolution.reference,
            &manifest.package_id,
        );

        let verification = Verification {
            recipe,
            section,
            resolution: &prepared.resolution,
            deps: &prepared.deps,
            build_folder: layout.test_folder,
            cmake: &cmake,
        };
        let mut log = BuildLog::new();
        let outcome = verification.run(&self.store, &mut log)?;
        info!("Test package {}", outcome);
        Ok((outcome, log.into_string()))
    }

    /// Consumption metadata for a profile without building
    ///
    /// Uses the stored package when it exists, otherwise reports what the
    /// recipe alone determines (default dirs plus system link directives).
    pub fn info(&self, recipe: &Recipe, profile: &Profile) -> Result<InfoReport> {
        let resolution = self.resolve(recipe, profile)?;
        check_link_table(recipe, &resolution)?;
        let manifest = manifest_for(&resolution);

        if let Some(stored) = self.store.get(&manifest.reference, &manifest.package_id)? {
            return Ok(InfoReport {
                reference: stored.reference,
                package_id: stored.package_id,
                packaged: true,
                cpp_info: stored.cpp_info,
            });
        }

        let mut cpp_info = CppInfo::with_default_dirs();
        if let Some(link) = recipe.package_info.system_link {
            cpp_info.add_directives(system_link_directives(
                link,
                &resolution.settings,
                resolution.link_mode(),
            )?);
        }
        Ok(InfoReport {
            reference: manifest.reference,
            package_id: manifest.package_id,
            packaged: false,
            cpp_info,
        })
    }

    fn cmake_runner(&self) -> Result<CMakeRunner> {
        Ok(CMakeRunner {
            program: process::locate_tool(&self.config.cmake)?,
            generator: self.config.generator.clone(),
            jobs: self.config.jobs,
        })
    }
}

fn check_link_table(recipe: &Recipe, resolution: &Resolution) -> Result<()> {
    if let Some(link) = recipe.package_info.system_link {
        system_link_directives(link, &resolution.settings, resolution.link_mode())?;
    }
    Ok(())
}
