// src/commands/source.rs

//! Source and generate commands

use super::{kitchen_config, load_profile, load_recipe};
use crate::cli::CommonArgs;
use anyhow::{Context, Result};
use magnum_kitchen::kitchen::{Kitchen, PatchOutcome};
use std::path::Path;

/// Clone and patch the recipe's sources into `folder`
pub fn cmd_source(common: &CommonArgs, folder: &Path) -> Result<()> {
    let recipe = load_recipe(common)?;
    let kitchen = Kitchen::new(kitchen_config(common)?);

    println!("Fetching sources for {}...", recipe.reference());
    let result = kitchen
        .fetch_sources(&recipe, folder)
        .with_context(|| format!("Failed to fetch sources for {}", recipe.package.name))?;

    println!("\n[COMPLETE] Fetched {} source tree(s):", result.sources.len());
    for source in &result.sources {
        let dest = if source.destination.is_empty() {
            "."
        } else {
            source.destination.as_str()
        };
        println!("  - {} @ {} ({}) -> {}", source.url, source.reference, source.commit, dest);
    }

    let skipped = result
        .patches
        .iter()
        .filter(|p| **p == PatchOutcome::AlreadyApplied)
        .count();
    println!(
        "Applied {} patch(es), {} already present",
        result.patches.len() - skipped,
        skipped
    );

    Ok(())
}

/// Write toolchain and lookup files for the profile into `output`
pub fn cmd_generate(common: &CommonArgs, output: &Path) -> Result<()> {
    let recipe = load_recipe(common)?;
    let profile = load_profile(common)?;
    let kitchen = Kitchen::new(kitchen_config(common)?);

    let written = kitchen
        .generate(&recipe, &profile, output)
        .with_context(|| format!("Failed to generate build files for {}", recipe.reference()))?;

    println!("[COMPLETE] Wrote {} file(s):", written.len());
    for path in &written {
        println!("  - {}", path.display());
    }

    Ok(())
}
