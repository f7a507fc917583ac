// src/commands/cook.rs

//! Create and test commands - build packages from the recipe

use super::{kitchen_config, load_profile, load_recipe};
use crate::cli::CommonArgs;
use anyhow::{Context, Result};
use magnum_kitchen::kitchen::Kitchen;
use magnum_kitchen::verify::VerifyOutcome;
use tracing::info;

/// Cook the recipe into the store, then run the test package
pub fn cmd_create(
    common: &CommonArgs,
    no_test: bool,
    keep_builddir: bool,
    generator: Option<String>,
) -> Result<()> {
    let recipe = load_recipe(common)?;
    let profile = load_profile(common)?;
    let mut config = kitchen_config(common)?;
    config.keep_builddir = keep_builddir;
    if generator.is_some() {
        config.generator = generator;
    }

    println!(
        "Cooking {} for {} with {} parallel jobs...",
        recipe.reference(),
        profile.settings,
        config.jobs
    );
    let kitchen = Kitchen::new(config);

    let result = kitchen
        .create(&recipe, &profile, !no_test)
        .with_context(|| format!("Failed to create {}", recipe.package.name))?;

    println!(
        "\n[COMPLETE] Created: {} ({})",
        result.reference, result.package_id
    );
    println!("  Package folder: {}", result.package_folder.display());
    println!("  Libraries: {}", result.manifest.cpp_info.libs.join(" "));
    if !result.manifest.cpp_info.system_libs.is_empty() {
        println!(
            "  System libs: {}",
            result.manifest.cpp_info.system_libs.join(" ")
        );
    }

    match &result.verification {
        Some(VerifyOutcome::Passed) => println!("[OK] Test package passed"),
        Some(outcome @ VerifyOutcome::Skipped { .. }) => println!("Test package {}", outcome),
        None => {}
    }

    if !result.warnings.is_empty() {
        println!("\nBuild warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    info!(
        "Successfully created {} in {}",
        result.reference,
        result.package_folder.display()
    );

    Ok(())
}

/// Run the test package against an already created package
pub fn cmd_test(common: &CommonArgs, generator: Option<String>) -> Result<()> {
    let recipe = load_recipe(common)?;
    let profile = load_profile(common)?;
    let mut config = kitchen_config(common)?;
    if generator.is_some() {
        config.generator = generator;
    }
    let kitchen = Kitchen::new(config);

    println!("Testing {} for {}...", recipe.reference(), profile.settings);
    let outcome = kitchen
        .test(&recipe, &profile)
        .with_context(|| format!("Test package failed for {}", recipe.reference()))?;

    match outcome {
        VerifyOutcome::Passed => println!("[OK] Test package passed"),
        VerifyOutcome::Skipped { reason } => println!("[OK] Test package built; run skipped: {}", reason),
    }

    Ok(())
}
