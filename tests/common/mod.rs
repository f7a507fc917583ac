// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use magnum_kitchen::kitchen::{Kitchen, KitchenConfig};
use magnum_kitchen::package_info::CppInfo;
use magnum_kitchen::recipe::{OptionValue, PackageReference};
use magnum_kitchen::store::{PackageManifest, PackageSettings, PackageStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A fake install prefix with `include/<name>/` and one static library per entry
pub fn fake_prefix(root: &Path, name: &str, libs: &[&str]) -> PathBuf {
    let prefix = root.join("prefixes").join(name);
    fs::create_dir_all(prefix.join("include").join(name)).unwrap();
    fs::create_dir_all(prefix.join("lib")).unwrap();
    for lib in libs {
        fs::write(prefix.join("lib").join(format!("lib{}.a", lib)), b"!<arch>\n").unwrap();
    }
    prefix
}

/// Register a fake prefix in the store, usable for any settings
pub fn register(
    store: &PackageStore,
    root: &Path,
    reference: &str,
    requires: &[&str],
    options: &[(&str, bool)],
    libs: &[&str],
) -> PackageManifest {
    let reference = PackageReference::parse(reference).unwrap();
    let prefix = fake_prefix(root, &format!("{}-{}", reference.name, options.len()), libs);

    let options: BTreeMap<String, OptionValue> = options
        .iter()
        .map(|(k, v)| (k.to_string(), OptionValue::Bool(*v)))
        .collect();
    let requires = requires
        .iter()
        .map(|r| PackageReference::parse(r).unwrap())
        .collect();

    let mut cpp_info = CppInfo::with_default_dirs();
    cpp_info.libs = libs.iter().map(|l| l.to_string()).collect();

    store
        .register(
            reference,
            PackageSettings::default(),
            options,
            requires,
            cpp_info,
            &prefix,
        )
        .unwrap()
}

/// A store holding corrade, static magnum, eigen and glm.
///
/// Returns (TempDir, store) - keep the TempDir alive to prevent cleanup.
pub fn setup_store() -> (TempDir, PackageStore) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = PackageStore::new(temp_dir.path().join("store"));

    register(&store, temp_dir.path(), "corrade/2020.06", &[], &[], &["CorradeUtility"]);
    register(
        &store,
        temp_dir.path(),
        "magnum/2020.06@camposs/stable",
        &["corrade/2020.06"],
        &[("shared", false)],
        &["Magnum", "MagnumGL"],
    );
    register(&store, temp_dir.path(), "eigen/3.4.0", &[], &[], &[]);
    register(&store, temp_dir.path(), "glm/0.9.9.8", &[], &[], &[]);

    (temp_dir, store)
}

/// Kitchen working inside `dir`, sharing the store's root
pub fn kitchen_for(dir: &Path, store: &PackageStore) -> Kitchen {
    Kitchen::new(KitchenConfig {
        work_dir: dir.join("work"),
        store_dir: store.root().to_path_buf(),
        jobs: 1,
        ..KitchenConfig::default()
    })
}

/// git on PATH, if any
pub fn git() -> Option<PathBuf> {
    which::which("git").ok()
}

fn run_git(git: &Path, dir: &Path, args: &[&str]) {
    let status = Command::new(git)
        .args([
            "-c",
            "user.name=Kitchen Tests",
            "-c",
            "user.email=tests@example.invalid",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// Create a git repository with `files`, committed and tagged `tag`
pub fn init_repo(git: &Path, dir: &Path, files: &[(&str, &str)], tag: &str) {
    fs::create_dir_all(dir).unwrap();
    run_git(git, dir, &["init", "--quiet"]);
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    run_git(git, dir, &["add", "."]);
    run_git(git, dir, &["commit", "--quiet", "-m", "initial"]);
    run_git(git, dir, &["tag", tag]);
}

/// Every file below `dir` (skipping `.git`) with its content
pub fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}
