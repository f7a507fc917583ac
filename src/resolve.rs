// src/resolve.rs

//! Option and requirement resolution
//!
//! Turns a recipe plus a profile into the concrete configuration every later
//! step works from: the final option values, the requirements those options
//! enable, and the options forced onto dependencies.

use crate::error::{Error, Result};
use crate::package_info::LinkMode;
use crate::profile::Profile;
use crate::recipe::{OptionSet, OptionValue, PackageReference, Recipe};
use crate::settings::Settings;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A requirement selected for this configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub reference: PackageReference,
    pub transitive_headers: bool,
}

/// The resolved configuration of a recipe
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub reference: PackageReference,
    pub settings: Settings,
    pub options: OptionSet,
    /// Selected requirements, in recipe order
    pub requirements: Vec<Requirement>,
    /// Option values dependencies must have (package -> option -> value)
    pub dependency_options: BTreeMap<String, BTreeMap<String, OptionValue>>,
    pub warnings: Vec<String>,
}

impl Resolution {
    pub fn is_shared(&self) -> bool {
        self.options.flag("shared")
    }

    pub fn link_mode(&self) -> LinkMode {
        if self.is_shared() {
            LinkMode::Shared
        } else {
            LinkMode::Static
        }
    }

    /// The requirement on a package, if selected
    pub fn requirement(&self, name: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.reference.name == name)
    }
}

/// Resolve options and requirements of `recipe` for `profile`
pub fn resolve(recipe: &Recipe, profile: &Profile) -> Result<Resolution> {
    let settings = profile.settings;
    let mut options = OptionSet::from_declarations(&recipe.options);
    options.config_options(settings.os);

    for name in options.removed() {
        debug!("Option '{}' does not exist for os={}", name, settings.os);
    }

    for (name, value) in &profile.options {
        options.set(name, value.clone())?;
    }

    // Forced dependency options first, then the profile's own requests, so a
    // contradiction can be reported instead of silently overwritten
    let mut dependency_options: BTreeMap<String, BTreeMap<String, OptionValue>> = BTreeMap::new();
    for rule in &recipe.propagate {
        if !options.get(&rule.when)?.is_true() {
            continue;
        }
        debug!(
            "{}=True forces {}:{}={}",
            rule.when, rule.package, rule.option, rule.value
        );
        dependency_options
            .entry(rule.package.clone())
            .or_default()
            .insert(rule.option.clone(), rule.value.clone());
    }

    for (package, overrides) in &profile.dependency_options {
        for (option, value) in overrides {
            let slot = dependency_options.entry(package.clone()).or_default();
            match slot.get(option) {
                Some(forced) if forced != value => {
                    return Err(Error::ResolutionError(format!(
                        "Profile sets {}:{}={}, but the recipe forces {}",
                        package, option, value, forced
                    )));
                }
                _ => {
                    slot.insert(option.clone(), value.clone());
                }
            }
        }
    }

    let mut requirements = Vec::new();
    for decl in &recipe.requires {
        let enabled = match &decl.when {
            Some(gate) => options.get(gate)?.is_true(),
            None => true,
        };
        if enabled {
            requirements.push(Requirement {
                reference: decl.reference.clone(),
                transitive_headers: decl.transitive_headers,
            });
        }
    }

    let mut warnings = Vec::new();
    let gating: Vec<&str> = recipe.gating_options().collect();
    for (name, value) in options.iter() {
        if name.starts_with("with_") && !gating.contains(&name) {
            let msg = format!(
                "Option '{}={}' selects no requirement; the library is expected to come from the sources",
                name, value
            );
            warn!("{}", msg);
            warnings.push(msg);
        }
    }

    Ok(Resolution {
        reference: recipe.reference(),
        settings,
        options,
        requirements,
        dependency_options,
        warnings,
    })
}
