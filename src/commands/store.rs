// src/commands/store.rs

//! Store commands - register existing installs and list packages

use super::{kitchen_config, load_profile};
use crate::cli::CommonArgs;
use anyhow::{Context, Result};
use magnum_kitchen::package_info::{collect_libs, CppInfo};
use magnum_kitchen::recipe::{OptionValue, PackageReference};
use magnum_kitchen::store::{PackageSettings, PackageStore};
use std::collections::BTreeMap;
use std::path::Path;

/// Options of a registered package
pub struct RegisterArgs<'a> {
    pub reference: &'a str,
    pub prefix: &'a Path,
    pub requires: &'a [String],
    pub options: &'a [String],
    pub libs: &'a [String],
    pub system_libs: &'a [String],
    pub any_settings: bool,
}

/// Record an existing install prefix as a package
pub fn cmd_store_register(common: &CommonArgs, args: RegisterArgs<'_>) -> Result<()> {
    let config = kitchen_config(common)?;
    let store = PackageStore::new(&config.store_dir);

    let reference = PackageReference::parse(args.reference)
        .with_context(|| format!("Invalid reference: {}", args.reference))?;
    let requires = args
        .requires
        .iter()
        .map(|r| PackageReference::parse(r).with_context(|| format!("Invalid requirement: {}", r)))
        .collect::<Result<Vec<_>>>()?;

    let mut options = BTreeMap::new();
    for pair in args.options {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected NAME=VALUE, got '{}'", pair))?;
        options.insert(name.trim().to_string(), OptionValue::parse(value.trim()));
    }

    let settings = if args.any_settings {
        PackageSettings::default()
    } else {
        PackageSettings::from(load_profile(common)?.settings)
    };

    let mut cpp_info = CppInfo::with_default_dirs();
    cpp_info.libs = if args.libs.is_empty() {
        collect_libs(args.prefix)
            .with_context(|| format!("Failed to scan {}", args.prefix.display()))?
    } else {
        args.libs.to_vec()
    };
    cpp_info.system_libs = args.system_libs.to_vec();

    let manifest = store
        .register(reference, settings, options, requires, cpp_info, args.prefix)
        .with_context(|| format!("Failed to register {}", args.prefix.display()))?;

    println!(
        "[OK] Registered {} ({}) -> {}",
        manifest.reference,
        manifest.package_id,
        store.package_folder(&manifest).display()
    );
    if !manifest.cpp_info.libs.is_empty() {
        println!("  Libraries: {}", manifest.cpp_info.libs.join(" "));
    }

    Ok(())
}

/// List the packages in the store
pub fn cmd_store_list(common: &CommonArgs, json: bool) -> Result<()> {
    let config = kitchen_config(common)?;
    let store = PackageStore::new(&config.store_dir);
    let manifests = store
        .list()
        .with_context(|| format!("Failed to read store {}", store.root().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifests)?);
        return Ok(());
    }

    if manifests.is_empty() {
        println!("No packages in {}", store.root().display());
        return Ok(());
    }

    println!("Packages in {}:", store.root().display());
    for manifest in &manifests {
        let kind = if manifest.prefix.is_some() { "registered" } else { "built" };
        println!(
            "  {} {} [{}] {}",
            manifest.reference,
            manifest.package_id,
            kind,
            manifest.settings.canonical().trim_end().replace('\n', " ")
        );
    }

    Ok(())
}
