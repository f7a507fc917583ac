// src/commands/recipe.rs

//! Recipe commands - inspect, resolve and info

use super::{kitchen_config, load_profile, load_recipe};
use crate::cli::CommonArgs;
use anyhow::{Context, Result};
use magnum_kitchen::kitchen::Kitchen;
use magnum_kitchen::recipe::validate_recipe;

/// Show recipe metadata, options and validation warnings
pub fn cmd_inspect(common: &CommonArgs) -> Result<()> {
    let recipe = load_recipe(common)?;
    let warnings = validate_recipe(&recipe).context("Recipe validation failed")?;
    let pkg = &recipe.package;

    println!("Recipe: {} version {}", pkg.name, pkg.version);
    if let Some(description) = &pkg.description {
        println!("  {}", description);
    }
    if let Some(license) = &pkg.license {
        println!("  License: {}", license);
    }
    if let Some(homepage) = &pkg.homepage {
        println!("  Homepage: {}", homepage);
    }
    if !pkg.topics.is_empty() {
        println!("  Topics: {}", pkg.topics.join(", "));
    }

    println!("\nOptions:");
    for (name, decl) in &recipe.options {
        let values: Vec<String> = decl.values.iter().map(|v| v.to_string()).collect();
        print!("  {} = {} [{}]", name, decl.default, values.join(", "));
        if !decl.exclude_os.is_empty() {
            let os: Vec<String> = decl.exclude_os.iter().map(|o| o.to_string()).collect();
            print!(" (not on {})", os.join(", "));
        }
        println!();
    }

    println!("\nRequirements:");
    for req in &recipe.requires {
        match &req.when {
            Some(gate) => println!("  {} (when {})", req.reference, gate),
            None => println!("  {}", req.reference),
        }
    }

    println!("\nSources:");
    for source in &recipe.sources {
        let reference = recipe.substitute(&source.reference);
        match &source.destination {
            Some(dest) => println!("  {} @ {} -> {}", source.url, reference, dest),
            None => println!("  {} @ {}", source.url, reference),
        }
    }

    for warning in &warnings {
        println!("Warning: {}", warning);
    }
    if warnings.is_empty() {
        println!("\n[OK] No issues found");
    } else {
        println!("\n[OK] {} warning(s)", warnings.len());
    }

    Ok(())
}

/// Show the resolved configuration for a profile
pub fn cmd_resolve(common: &CommonArgs, json: bool) -> Result<()> {
    let recipe = load_recipe(common)?;
    let profile = load_profile(common)?;
    let kitchen = Kitchen::new(kitchen_config(common)?);

    let resolution = kitchen
        .resolve(&recipe, &profile)
        .with_context(|| format!("Failed to resolve {}", recipe.reference()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    println!("{} for {}", resolution.reference, resolution.settings);

    println!("\nOptions:");
    for (name, value) in resolution.options.iter() {
        println!("  {} = {}", name, value);
    }
    for name in resolution.options.removed() {
        println!("  {} (removed for {})", name, resolution.settings.os);
    }

    println!("\nRequirements:");
    for req in &resolution.requirements {
        if req.transitive_headers {
            println!("  {} (transitive headers)", req.reference);
        } else {
            println!("  {}", req.reference);
        }
    }

    if !resolution.dependency_options.is_empty() {
        println!("\nDependency options:");
        for (package, options) in &resolution.dependency_options {
            for (name, value) in options {
                println!("  {}:{} = {}", package, name, value);
            }
        }
    }

    for warning in &resolution.warnings {
        println!("Warning: {}", warning);
    }

    Ok(())
}

/// Print consumption metadata for a profile without building
pub fn cmd_info(common: &CommonArgs, json: bool) -> Result<()> {
    let recipe = load_recipe(common)?;
    let profile = load_profile(common)?;
    let kitchen = Kitchen::new(kitchen_config(common)?);

    let report = kitchen
        .info(&recipe, &profile)
        .with_context(|| format!("Failed to compute package info for {}", recipe.reference()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let state = if report.packaged { "packaged" } else { "not built" };
    println!("{} ({}, {})", report.reference, report.package_id, state);
    let info = &report.cpp_info;
    print_list("libs", &info.libs);
    print_list("includedirs", &info.includedirs);
    print_list("libdirs", &info.libdirs);
    print_list("bindirs", &info.bindirs);
    print_list("system_libs", &info.system_libs);
    print_list("exelinkflags", &info.exelinkflags);

    Ok(())
}

fn print_list(label: &str, values: &[String]) {
    if values.is_empty() {
        println!("  {}: -", label);
    } else {
        println!("  {}: {}", label, values.join(" "));
    }
}
