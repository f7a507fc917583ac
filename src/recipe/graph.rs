// src/recipe/graph.rs

//! Package dependency graph for link and lookup ordering
//!
//! Nodes are package names, edges point from a package to the packages it
//! requires. Ordering is deterministic: ties are broken by name, so the same
//! graph always produces the same order.
//!
//! # Example
//!
//! ```
//! use magnum_kitchen::recipe::graph::PackageGraph;
//!
//! let mut graph = PackageGraph::new();
//! graph.add_package("magnum-integration", &["magnum", "eigen"]);
//! graph.add_package("magnum", &["corrade"]);
//!
//! let order = graph.topological_sort().unwrap();
//! assert_eq!(order, vec!["corrade", "eigen", "magnum", "magnum-integration"]);
//! ```

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A directed graph of package requirements
#[derive(Debug, Default, Clone)]
pub struct PackageGraph {
    /// Package -> packages it requires
    edges: BTreeMap<String, BTreeSet<String>>,
    /// Package -> packages that require it
    reverse_edges: BTreeMap<String, BTreeSet<String>>,
}

impl PackageGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package with its requirements
    ///
    /// If the package already exists, this merges the requirements.
    pub fn add_package(&mut self, name: &str, requires: &[&str]) {
        self.edges.entry(name.to_string()).or_default();
        self.reverse_edges.entry(name.to_string()).or_default();

        for dep in requires {
            self.edges.entry(dep.to_string()).or_default();
            self.reverse_edges
                .entry(dep.to_string())
                .or_default()
                .insert(name.to_string());
            self.edges
                .entry(name.to_string())
                .or_default()
                .insert(dep.to_string());
        }
    }

    /// Topological sort using Kahn's algorithm
    ///
    /// Returns packages with requirements before the packages requiring them.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        // In-degree here counts unresolved requirements of each node
        let mut remaining: BTreeMap<&str, usize> = self
            .edges
            .iter()
            .map(|(name, deps)| (name.as_str(), deps.len()))
            .collect();

        let mut queue: VecDeque<&str> = remaining
            .iter()
            .filter(|&(_, deg)| *deg == 0)
            .map(|(name, _)| *name)
            .collect();
        let mut result = Vec::with_capacity(self.edges.len());

        while let Some(node) = queue.pop_front() {
            result.push(node.to_string());

            if let Some(dependents) = self.reverse_edges.get(node) {
                for dependent in dependents {
                    if let Some(deg) = remaining.get_mut(dependent.as_str()) {
                        *deg = deg.saturating_sub(1);
                        if *deg == 0 {
                            queue.push_back(dependent.as_str());
                        }
                    }
                }
            }
        }

        if result.len() != self.edges.len() {
            let stuck: Vec<&str> = self
                .edges
                .keys()
                .map(String::as_str)
                .filter(|k| !result.iter().any(|r| r == k))
                .collect();

            return Err(Error::ResolutionError(format!(
                "Circular dependency detected between: {}",
                stuck.join(", ")
            )));
        }

        Ok(result)
    }
}
