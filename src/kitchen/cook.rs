// src/kitchen/cook.rs

//! Cook: the build of a single configuration, from checkout to stored package

use crate::deps::DependencySet;
use crate::error::{Error, Result};
use crate::package_info::package_info;
use crate::recipe::Recipe;
use crate::resolve::Resolution;
use crate::store::{digest_tree, PackageManifest, SourceProvenance};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::generate::generate;
use super::layout::Layout;
use super::process::{BuildLog, CMakeRunner};
use super::source::{acquire_sources, apply_patches};
use super::{CookResult, Kitchen};

/// A single cook operation
pub struct Cook<'a> {
    pub(super) kitchen: &'a Kitchen,
    pub(super) recipe: &'a Recipe,
    pub(super) resolution: &'a Resolution,
    pub(super) deps: &'a DependencySet,
    pub(super) layout: Layout,
    /// Manifest of the package being produced
    pub(super) manifest: PackageManifest,
    /// Store directory the package is installed into
    pub(super) package_folder: PathBuf,
    pub(super) git: PathBuf,
    pub(super) cmake: CMakeRunner,
    pub(super) toolchain: Option<PathBuf>,
    pub(super) sources: Vec<SourceProvenance>,
    pub(super) log: BuildLog,
    pub(super) warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    pub(super) fn new(
        kitchen: &'a Kitchen,
        recipe: &'a Recipe,
        resolution: &'a Resolution,
        deps: &'a DependencySet,
        git: PathBuf,
        cmake: CMakeRunner,
    ) -> Self {
        let manifest = manifest_for(resolution);
        let layout = Layout::new(
            &kitchen.config.work_dir,
            &resolution.reference,
            &manifest.package_id,
        );
        let package_folder = kitchen
            .store
            .package_dir(&manifest.reference, &manifest.package_id);

        Self {
            kitchen,
            recipe,
            resolution,
            deps,
            layout,
            manifest,
            package_folder,
            git,
            cmake,
            toolchain: None,
            sources: Vec::new(),
            log: BuildLog::new(),
            warnings: resolution.warnings.clone(),
        }
    }

    /// Phase 1: Prep - fetch all sources
    pub(super) fn prep(&mut self) -> Result<()> {
        fs::create_dir_all(&self.layout.root)?;
        self.sources = acquire_sources(
            &self.git,
            self.recipe,
            &self.layout.source_folder,
            &mut self.log,
        )?;
        for source in &self.sources {
            self.log.line(&format!(
                "Source {} at {} ({})",
                source.url, source.reference, source.commit
            ));
        }
        Ok(())
    }

    /// Phase 2: Apply the recipe's line insertions
    pub(super) fn patch(&mut self) -> Result<()> {
        apply_patches(&self.recipe.patches, &self.layout.source_folder, &mut self.log)?;
        Ok(())
    }

    /// Phase 3: Write toolchain and dependency lookup files
    pub(super) fn generate(&mut self) -> Result<()> {
        let written = generate(
            self.recipe,
            self.resolution,
            self.deps,
            &self.layout.generators_folder,
        )?;
        for path in &written {
            self.log.line(&format!("Generated {}", path.display()));
        }
        self.toolchain = written.into_iter().next();
        Ok(())
    }

    /// Phase 4: Simmer - configure and build
    pub(super) fn simmer(&mut self) -> Result<()> {
        let toolchain = self.toolchain.clone().ok_or_else(|| {
            Error::NotFound("toolchain file (generate must run before simmer)".to_string())
        })?;
        let build_type = self.resolution.settings.build_type;

        info!("Configuring {}", self.resolution.reference);
        self.cmake.configure(
            &self.layout.source_folder,
            &self.layout.build_folder,
            &toolchain,
            build_type,
            Some(&self.package_folder),
            &mut self.log,
        )?;

        info!("Building {} with {} jobs", self.resolution.reference, self.cmake.jobs);
        self.cmake
            .build(&self.layout.build_folder, build_type, &mut self.log)?;
        Ok(())
    }

    /// Phase 5: Plate - install into the store and record the manifest
    pub(super) fn plate(&mut self) -> Result<()> {
        let folder = self
            .kitchen
            .store
            .prepare_package_dir(&self.manifest.reference, &self.manifest.package_id)?;

        let copied = self.copy_licenses(&folder)?;
        if copied == 0 {
            let msg = format!(
                "No license files matched {}",
                self.recipe.package_info.licenses.join(", ")
            );
            warn!("{}", msg);
            self.warnings.push(msg);
        }

        self.cmake.install(
            &self.layout.build_folder,
            self.resolution.settings.build_type,
            &folder,
            &mut self.log,
        )?;

        let cpp_info = package_info(
            self.recipe,
            &self.resolution.settings,
            self.resolution.link_mode(),
            &folder,
        )?;
        if cpp_info.libs.is_empty() {
            let msg = format!("No libraries found in {}", folder.display());
            warn!("{}", msg);
            self.warnings.push(msg);
        }

        self.manifest.cpp_info = cpp_info;
        self.manifest.requires = self
            .resolution
            .requirements
            .iter()
            .map(|r| r.reference.clone())
            .collect();
        self.manifest.sources = self.sources.clone();
        self.manifest.files = digest_tree(&folder)?;
        self.kitchen.store.write_manifest(&self.manifest)?;

        self.log.line(&format!(
            "Packaged {} files into {}",
            self.manifest.files.len(),
            folder.display()
        ));
        self.package_folder = folder;
        Ok(())
    }

    /// Copy files matching the recipe's license patterns into `licenses/`
    fn copy_licenses(&mut self, folder: &Path) -> Result<usize> {
        let dest = folder.join("licenses");
        let base = glob::Pattern::escape(&self.layout.source_folder.to_string_lossy());
        let mut copied = 0;

        for pattern in &self.recipe.package_info.licenses {
            let full = format!("{}/{}", base, pattern);
            let paths = glob::glob(&full).map_err(|e| {
                Error::PackageError(format!("Invalid license pattern '{}': {}", pattern, e))
            })?;
            for path in paths.flatten() {
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name() else {
                    continue;
                };
                fs::create_dir_all(&dest)?;
                fs::copy(&path, dest.join(name)).map_err(|e| {
                    Error::PackageError(format!("Failed to copy {}: {}", path.display(), e))
                })?;
                self.log.line(&format!("Copied license {}", path.display()));
                copied += 1;
            }
        }

        Ok(copied)
    }

    /// Drop the build tree unless the config keeps it
    pub(super) fn clean(&mut self) {
        if self.kitchen.config.keep_builddir {
            debug!("Keeping build directory {}", self.layout.build_folder.display());
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.layout.build_folder) {
            debug!(
                "Could not remove {}: {}",
                self.layout.build_folder.display(),
                e
            );
        }
    }

    pub(super) fn finish(self) -> CookResult {
        CookResult {
            reference: self.manifest.reference.clone(),
            package_id: self.manifest.package_id.clone(),
            package_folder: self.package_folder,
            manifest: self.manifest,
            log: self.log.into_string(),
            warnings: self.warnings,
            verification: None,
        }
    }
}

/// Manifest skeleton for a resolved configuration (fixes the package id)
pub fn manifest_for(resolution: &Resolution) -> PackageManifest {
    PackageManifest::new(
        resolution.reference.clone(),
        resolution.settings.into(),
        resolution.options.to_map(),
    )
}
