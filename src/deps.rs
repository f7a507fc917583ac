// src/deps.rs

//! Resolving requirements to packaged dependencies
//!
//! Requirements of a resolution are looked up through a
//! [`DependencyProvider`], then their own recorded requirements, until the
//! whole closure is known. The result is ordered with dependencies before
//! the packages that need them.

use crate::error::{Error, Result};
use crate::recipe::graph::PackageGraph;
use crate::recipe::{OptionValue, PackageReference};
use crate::resolve::Resolution;
use crate::settings::Settings;
use crate::store::{PackageManifest, PackageStore};
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source of packaged dependencies
///
/// Keeps resolution independent of where packages live.
pub trait DependencyProvider {
    /// Find a package satisfying a requirement under settings and option constraints
    fn find_package(
        &self,
        wanted: &PackageReference,
        settings: &Settings,
        constraints: &BTreeMap<String, OptionValue>,
    ) -> Result<Option<PackageManifest>>;

    /// Folder consumers use for a found package
    fn package_folder(&self, manifest: &PackageManifest) -> PathBuf;
}

impl DependencyProvider for PackageStore {
    fn find_package(
        &self,
        wanted: &PackageReference,
        settings: &Settings,
        constraints: &BTreeMap<String, OptionValue>,
    ) -> Result<Option<PackageManifest>> {
        self.find(wanted, settings, constraints)
    }

    fn package_folder(&self, manifest: &PackageManifest) -> PathBuf {
        PackageStore::package_folder(self, manifest)
    }
}

/// A dependency bound to a concrete package
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub manifest: PackageManifest,
    pub package_folder: PathBuf,
    /// Required directly by the recipe (not only through another package)
    pub direct: bool,
    pub transitive_headers: bool,
}

impl ResolvedDependency {
    pub fn name(&self) -> &str {
        &self.manifest.reference.name
    }

    pub fn reference(&self) -> &PackageReference {
        &self.manifest.reference
    }

    /// First include directory, absolute
    pub fn include_dir(&self) -> PathBuf {
        match self.manifest.cpp_info.includedirs.first() {
            Some(dir) => self.package_folder.join(dir),
            None => self.package_folder.join("include"),
        }
    }
}

/// All dependencies of a configuration, in dependency order
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    deps: BTreeMap<String, ResolvedDependency>,
    order: Vec<String>,
}

impl DependencySet {
    pub fn get(&self, name: &str) -> Option<&ResolvedDependency> {
        self.deps.get(name)
    }

    pub fn package_folder(&self, name: &str) -> Option<&Path> {
        self.deps.get(name).map(|d| d.package_folder.as_path())
    }

    /// Package folders by name
    pub fn folders(&self) -> BTreeMap<String, PathBuf> {
        self.deps
            .iter()
            .map(|(name, d)| (name.clone(), d.package_folder.clone()))
            .collect()
    }

    /// Dependencies before dependents
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.order.iter().filter_map(|name| self.deps.get(name))
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Add a package that is not a dependency, such as the package under test
    pub fn push(&mut self, dep: ResolvedDependency) {
        let name = dep.name().to_string();
        if !self.order.contains(&name) {
            self.order.push(name.clone());
        }
        self.deps.insert(name, dep);
    }
}

/// Resolve the full dependency closure of a resolution
pub fn resolve_dependencies(
    provider: &dyn DependencyProvider,
    resolution: &Resolution,
) -> Result<DependencySet> {
    let empty = BTreeMap::new();

    let mut graph = PackageGraph::new();
    let mut deps: BTreeMap<String, ResolvedDependency> = BTreeMap::new();
    let mut queue: VecDeque<(PackageReference, bool, bool, Option<String>)> = resolution
        .requirements
        .iter()
        .map(|r| (r.reference.clone(), true, r.transitive_headers, None))
        .collect();

    while let Some((wanted, direct, transitive_headers, required_by)) = queue.pop_front() {
        if let Some(existing) = deps.get_mut(&wanted.name) {
            if !existing.manifest.reference.satisfies(&wanted) {
                return Err(Error::ResolutionError(format!(
                    "Conflicting requirements: {} is resolved as {} but {} requires {}",
                    wanted.name,
                    existing.manifest.reference,
                    required_by.as_deref().unwrap_or(&resolution.reference.name),
                    wanted
                )));
            }
            existing.direct |= direct;
            existing.transitive_headers |= transitive_headers;
            continue;
        }

        let constraints = resolution
            .dependency_options
            .get(&wanted.name)
            .unwrap_or(&empty);
        let manifest = provider
            .find_package(&wanted, &resolution.settings, constraints)?
            .ok_or_else(|| Error::NotFound(describe_missing(&wanted, resolution, constraints)))?;

        debug!(
            "{} -> {} ({})",
            wanted, manifest.reference, manifest.package_id
        );

        let requires: Vec<&str> = manifest.requires.iter().map(|r| r.name.as_str()).collect();
        graph.add_package(&wanted.name, &requires);
        for req in &manifest.requires {
            queue.push_back((req.clone(), false, false, Some(wanted.name.clone())));
        }

        let package_folder = provider.package_folder(&manifest);
        deps.insert(
            wanted.name.clone(),
            ResolvedDependency {
                manifest,
                package_folder,
                direct,
                transitive_headers,
            },
        );
    }

    let order = graph.topological_sort()?;
    info!("Resolved {} dependencies: {}", order.len(), order.join(", "));

    Ok(DependencySet { deps, order })
}

fn describe_missing(
    wanted: &PackageReference,
    resolution: &Resolution,
    constraints: &BTreeMap<String, OptionValue>,
) -> String {
    let mut msg = format!("No package for {} with {}", wanted, resolution.settings);
    if !constraints.is_empty() {
        let opts: Vec<String> = constraints
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        msg.push_str(&format!(" and options {}", opts.join(", ")));
    }
    msg
}
