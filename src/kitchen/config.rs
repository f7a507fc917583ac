// src/kitchen/config.rs

//! Configuration types for the Kitchen

use crate::error::{Error, Result};
use crate::recipe::PackageReference;
use crate::store::PackageManifest;
use crate::verify::VerifyOutcome;
use std::path::PathBuf;

/// Environment variable overriding the store directory
pub const ENV_STORE: &str = "MAGNUM_KITCHEN_STORE";
/// Environment variable overriding the work directory
pub const ENV_WORKDIR: &str = "MAGNUM_KITCHEN_WORKDIR";
/// Environment variable overriding the number of parallel jobs
pub const ENV_JOBS: &str = "MAGNUM_KITCHEN_JOBS";
/// Environment variable naming the cmake program
pub const ENV_CMAKE: &str = "CMAKE";
/// Environment variable naming the git program
pub const ENV_GIT: &str = "GIT";

/// Configuration for the Kitchen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitchenConfig {
    /// Sources and build trees, one folder per recipe version
    pub work_dir: PathBuf,
    /// Local package store
    pub store_dir: PathBuf,
    /// Number of parallel jobs handed to CMake
    pub jobs: u32,
    /// git program (name on PATH or absolute path)
    pub git: String,
    /// cmake program (name on PATH or absolute path)
    pub cmake: String,
    /// CMake generator (`-G`); CMake picks its default when unset
    pub generator: Option<String>,
    /// Keep build directory after completion (for debugging)
    pub keep_builddir: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        let work_dir = dirs::cache_dir()
            .map(|d| d.join("magnum-kitchen").join("work"))
            .unwrap_or_else(|| PathBuf::from(".magnum-kitchen/work"));
        let store_dir = dirs::data_dir()
            .map(|d| d.join("magnum-kitchen").join("store"))
            .unwrap_or_else(|| PathBuf::from(".magnum-kitchen/store"));

        Self {
            work_dir,
            store_dir,
            jobs,
            git: "git".to_string(),
            cmake: "cmake".to_string(),
            generator: None,
            keep_builddir: false,
        }
    }
}

impl KitchenConfig {
    /// Defaults with overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(store) = non_empty(ENV_STORE) {
            config.store_dir = PathBuf::from(store);
        }
        if let Some(work) = non_empty(ENV_WORKDIR) {
            config.work_dir = PathBuf::from(work);
        }
        if let Some(jobs) = non_empty(ENV_JOBS) {
            config.jobs = match jobs.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::ParseError(format!(
                        "{} must be a positive integer, got '{}'",
                        ENV_JOBS, jobs
                    )));
                }
            };
        }
        if let Some(cmake) = non_empty(ENV_CMAKE) {
            config.cmake = cmake;
        }
        if let Some(git) = non_empty(ENV_GIT) {
            config.git = git;
        }

        Ok(config)
    }
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    pub reference: PackageReference,
    pub package_id: String,
    /// Where the package was installed in the store
    pub package_folder: PathBuf,
    /// Manifest written next to the package
    pub manifest: PackageManifest,
    /// Build log
    pub log: String,
    /// Warnings generated during resolution and build
    pub warnings: Vec<String>,
    /// Outcome of the test consumer, if it was run
    pub verification: Option<VerifyOutcome>,
}
