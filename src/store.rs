// src/store.rs

//! Local package store
//!
//! Each packaged configuration lives in
//! `<root>/<name>/<version>/<package_id>/` next to a `package.toml`
//! manifest. Registered packages (an existing install such as a system
//! Magnum) keep only the manifest and point at their install prefix.

use crate::error::{Error, Result};
use crate::hash::{hash_bytes, hash_file};
use crate::package_info::CppInfo;
use crate::recipe::{OptionValue, PackageReference};
use crate::settings::{Arch, BuildType, CompilerFamily, Os, Settings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Manifest file name inside a package directory
pub const MANIFEST_FILE: &str = "package.toml";

/// Settings recorded on a package; absent values match anything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<Arch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<BuildType>,
}

impl PackageSettings {
    /// Whether a package built with these settings can serve `wanted`
    pub fn matches(&self, wanted: &Settings) -> bool {
        self.os.is_none_or(|os| os == wanted.os)
            && self.arch.is_none_or(|arch| arch == wanted.arch)
            && self.compiler.is_none_or(|c| c == wanted.compiler)
            && self.build_type.is_none_or(|bt| bt == wanted.build_type)
    }

    /// One `key=value` line per setting, `*` for unset
    pub fn canonical(&self) -> String {
        fn field<T: std::fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "*".to_string())
        }
        format!(
            "os={}\narch={}\ncompiler={}\nbuild_type={}\n",
            field(&self.os),
            field(&self.arch),
            field(&self.compiler),
            field(&self.build_type)
        )
    }
}

impl From<Settings> for PackageSettings {
    fn from(s: Settings) -> Self {
        Self {
            os: Some(s.os),
            arch: Some(s.arch),
            compiler: Some(s.compiler),
            build_type: Some(s.build_type),
        }
    }
}

/// Where a source tree came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProvenance {
    pub url: String,
    /// Tag or commit that was requested
    pub reference: String,
    /// Commit that was checked out
    pub commit: String,
    /// Directory relative to the source folder
    #[serde(default)]
    pub destination: String,
}

/// Digest of one packaged file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    /// Path relative to the package folder, `/`-separated
    pub path: String,
    pub sha256: String,
    pub size: u64,
}

/// Everything the store keeps about one packaged configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub reference: PackageReference,
    pub package_id: String,
    pub created: DateTime<Utc>,
    /// External install prefix for registered packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,
    /// Direct requirements of this package
    #[serde(default)]
    pub requires: Vec<PackageReference>,
    #[serde(default)]
    pub settings: PackageSettings,
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    pub cpp_info: CppInfo,
    #[serde(default)]
    pub sources: Vec<SourceProvenance>,
    #[serde(default)]
    pub files: Vec<FileDigest>,
}

impl PackageManifest {
    /// New manifest with its package id computed from the inputs
    pub fn new(
        reference: PackageReference,
        settings: PackageSettings,
        options: BTreeMap<String, OptionValue>,
    ) -> Self {
        let package_id = package_id(&reference, &settings, &options);
        Self {
            reference,
            package_id,
            created: Utc::now(),
            prefix: None,
            requires: Vec::new(),
            settings,
            options,
            cpp_info: CppInfo::default(),
            sources: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Whether every constrained option has exactly the wanted value
    pub fn satisfies_options(&self, constraints: &BTreeMap<String, OptionValue>) -> bool {
        constraints
            .iter()
            .all(|(name, value)| self.options.get(name) == Some(value))
    }
}

/// Identifier of a configuration: 16 hex chars of SHA-256 over
/// reference, settings and options
pub fn package_id(
    reference: &PackageReference,
    settings: &PackageSettings,
    options: &BTreeMap<String, OptionValue>,
) -> String {
    let mut text = format!("reference={}\n", reference);
    text.push_str(&settings.canonical());
    text.push_str("[options]\n");
    for (name, value) in options {
        text.push_str(&format!("{}={}\n", name, value));
    }
    hash_bytes(text.as_bytes()).short(16).to_string()
}

/// Digest every regular file under a folder, skipping the manifest
pub fn digest_tree(folder: &Path) -> Result<Vec<FileDigest>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry =
            entry.map_err(|e| Error::IoError(format!("Failed to walk {}: {}", folder.display(), e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(folder)
            .map_err(|e| Error::IoError(e.to_string()))?;
        if rel == Path::new(MANIFEST_FILE) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        let digest = hash_file(entry.path())?;
        files.push(FileDigest {
            path: rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            sha256: digest.to_string(),
            size,
        });
    }

    Ok(files)
}

/// A directory of packaged configurations
#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one configuration
    pub fn package_dir(&self, reference: &PackageReference, package_id: &str) -> PathBuf {
        self.root
            .join(&reference.name)
            .join(&reference.version)
            .join(package_id)
    }

    /// Folder consumers use: the registered prefix, or the package directory
    pub fn package_folder(&self, manifest: &PackageManifest) -> PathBuf {
        match &manifest.prefix {
            Some(prefix) => prefix.clone(),
            None => self.package_dir(&manifest.reference, &manifest.package_id),
        }
    }

    /// Start a fresh package directory, removing any previous content
    pub fn prepare_package_dir(&self, reference: &PackageReference, package_id: &str) -> Result<PathBuf> {
        let dir = self.package_dir(reference, package_id);
        if dir.exists() {
            debug!("Removing previous package at {}", dir.display());
            fs::remove_dir_all(&dir).map_err(|e| {
                Error::IoError(format!("Failed to clear {}: {}", dir.display(), e))
            })?;
        }
        fs::create_dir_all(&dir)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {}", dir.display(), e)))?;
        Ok(dir)
    }

    /// Write a manifest into its package directory
    pub fn write_manifest(&self, manifest: &PackageManifest) -> Result<PathBuf> {
        let dir = self.package_dir(&manifest.reference, &manifest.package_id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(MANIFEST_FILE);
        fs::write(&path, toml::to_string_pretty(manifest)?)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }

    /// Read the manifest of a package directory
    pub fn read_manifest(dir: &Path) -> Result<PackageManifest> {
        let path = dir.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::ParseError(format!("Invalid manifest {}: {}", path.display(), e)))
    }

    /// Record an existing install prefix as a package
    pub fn register(
        &self,
        reference: PackageReference,
        settings: PackageSettings,
        options: BTreeMap<String, OptionValue>,
        requires: Vec<PackageReference>,
        cpp_info: CppInfo,
        prefix: &Path,
    ) -> Result<PackageManifest> {
        if !prefix.is_dir() {
            return Err(Error::NotFound(format!(
                "Install prefix {} is not a directory",
                prefix.display()
            )));
        }
        let prefix = prefix.canonicalize()?;

        let mut manifest = PackageManifest::new(reference, settings, options);
        manifest.prefix = Some(prefix);
        manifest.requires = requires;
        manifest.cpp_info = cpp_info;

        self.write_manifest(&manifest)?;
        info!(
            "Registered {} ({}) at {}",
            manifest.reference,
            manifest.package_id,
            self.package_folder(&manifest).display()
        );
        Ok(manifest)
    }

    /// Look up one configuration by id
    pub fn get(&self, reference: &PackageReference, package_id: &str) -> Result<Option<PackageManifest>> {
        let dir = self.package_dir(reference, package_id);
        if !dir.join(MANIFEST_FILE).exists() {
            return Ok(None);
        }
        Self::read_manifest(&dir).map(Some)
    }

    /// Find the newest package matching a requirement, settings and
    /// option constraints
    pub fn find(
        &self,
        wanted: &PackageReference,
        settings: &Settings,
        constraints: &BTreeMap<String, OptionValue>,
    ) -> Result<Option<PackageManifest>> {
        let version_dir = self.root.join(&wanted.name).join(&wanted.version);
        if !version_dir.is_dir() {
            return Ok(None);
        }

        let mut best: Option<PackageManifest> = None;
        for entry in fs::read_dir(&version_dir)? {
            let entry = entry?;
            if !entry.path().join(MANIFEST_FILE).exists() {
                continue;
            }
            let manifest = Self::read_manifest(&entry.path())?;
            if !manifest.reference.satisfies(wanted)
                || !manifest.settings.matches(settings)
                || !manifest.satisfies_options(constraints)
            {
                debug!("Skipping {} ({})", manifest.reference, manifest.package_id);
                continue;
            }
            if best.as_ref().is_none_or(|b| manifest.created > b.created) {
                best = Some(manifest);
            }
        }

        Ok(best)
    }

    /// All packages in the store, by reference then age
    pub fn list(&self) -> Result<Vec<PackageManifest>> {
        let mut manifests = Vec::new();
        if !self.root.is_dir() {
            return Ok(manifests);
        }

        for entry in WalkDir::new(&self.root).min_depth(3).max_depth(3) {
            let entry = entry.map_err(|e| {
                Error::IoError(format!("Failed to scan store {}: {}", self.root.display(), e))
            })?;
            if entry.file_type().is_dir() && entry.path().join(MANIFEST_FILE).exists() {
                manifests.push(Self::read_manifest(entry.path())?);
            }
        }

        manifests.sort_by(|a, b| {
            a.reference
                .cmp(&b.reference)
                .then_with(|| a.created.cmp(&b.created))
        });
        Ok(manifests)
    }
}
