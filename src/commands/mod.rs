// src/commands/mod.rs

//! Command handlers for the magnum-kitchen CLI

mod completions;
mod cook;
mod recipe;
mod source;
mod store;

// Re-export all command handlers
pub use completions::cmd_completions;
pub use cook::{cmd_create, cmd_test};
pub use recipe::{cmd_info, cmd_inspect, cmd_resolve};
pub use source::{cmd_generate, cmd_source};
pub use store::{cmd_store_list, cmd_store_register, RegisterArgs};

use crate::cli::CommonArgs;
use anyhow::{Context, Result};
use magnum_kitchen::kitchen::KitchenConfig;
use magnum_kitchen::profile::Profile;
use magnum_kitchen::recipe::{self as kitchen_recipe, parse_recipe_file, Recipe};

/// The recipe named by --recipe, or the built-in one
pub(crate) fn load_recipe(common: &CommonArgs) -> Result<Recipe> {
    match &common.recipe {
        Some(path) => parse_recipe_file(path)
            .with_context(|| format!("Failed to parse recipe: {}", path.display())),
        None => kitchen_recipe::builtin().context("Failed to parse the built-in recipe"),
    }
}

/// The profile from --profile (or the host), with -s and -o applied
pub(crate) fn load_profile(common: &CommonArgs) -> Result<Profile> {
    let mut profile = match &common.profile {
        Some(path) => Profile::load(path)
            .with_context(|| format!("Failed to load profile: {}", path.display()))?,
        None => Profile::host(),
    };

    for setting in &common.settings {
        profile
            .apply_setting(setting)
            .with_context(|| format!("Invalid setting: {}", setting))?;
    }
    for option in &common.options {
        profile
            .apply_option(option)
            .with_context(|| format!("Invalid option: {}", option))?;
    }

    Ok(profile)
}

/// Kitchen configuration: defaults, then environment, then flags
pub(crate) fn kitchen_config(common: &CommonArgs) -> Result<KitchenConfig> {
    let mut config = KitchenConfig::from_env().context("Invalid environment configuration")?;

    if let Some(store) = &common.store {
        config.store_dir = store.clone();
    }
    if let Some(workdir) = &common.workdir {
        config.work_dir = workdir.clone();
    }
    if let Some(jobs) = common.jobs {
        anyhow::ensure!(jobs > 0, "--jobs must be at least 1");
        config.jobs = jobs;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use magnum_kitchen::settings::Os;
    use std::path::PathBuf;

    #[test]
    fn test_profile_from_flags() {
        let common = CommonArgs {
            settings: vec!["os=Windows".to_string(), "compiler=msvc".to_string()],
            options: vec!["shared=True".to_string()],
            ..CommonArgs::default()
        };
        let profile = load_profile(&common).unwrap();
        assert_eq!(profile.settings.os, Os::Windows);
        assert!(profile.options.contains_key("shared"));
    }

    #[test]
    fn test_bad_setting_is_reported() {
        let common = CommonArgs {
            settings: vec!["os".to_string()],
            ..CommonArgs::default()
        };
        assert!(load_profile(&common).is_err());
    }

    #[test]
    fn test_config_flags_override() {
        let common = CommonArgs {
            store: Some(PathBuf::from("/tmp/mk-store")),
            jobs: Some(2),
            ..CommonArgs::default()
        };
        let config = kitchen_config(&common).unwrap();
        assert_eq!(config.store_dir, PathBuf::from("/tmp/mk-store"));
        assert_eq!(config.jobs, 2);
    }

    #[test]
    fn test_builtin_recipe_by_default() {
        let recipe = load_recipe(&CommonArgs::default()).unwrap();
        assert_eq!(recipe.package.name, "magnum-integration");
    }
}
