// src/kitchen/source.rs

//! Source acquisition: git checkouts pinned to tags, plus line insertions

use super::process::{run_tool, BuildLog};
use crate::error::{Error, Result};
use crate::recipe::{PatchEntry, Recipe, SourceEntry};
use crate::store::SourceProvenance;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What happened to a single insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    /// The inserted text already precedes the anchor
    AlreadyApplied,
}

/// Insert `insert` plus a newline right before the first `anchor` in `file`
pub fn apply_insertion(file: &Path, anchor: &str, insert: &str) -> Result<PatchOutcome> {
    let patch_failed = |reason: String| Error::PatchFailed {
        file: file.display().to_string(),
        reason,
    };

    let content = fs::read_to_string(file).map_err(|e| patch_failed(e.to_string()))?;
    let pos = content
        .find(anchor)
        .ok_or_else(|| patch_failed(format!("anchor '{}' not found", anchor)))?;

    let line = format!("{}\n", insert);
    if content[..pos].ends_with(&line) {
        debug!("{} already contains '{}'", file.display(), insert);
        return Ok(PatchOutcome::AlreadyApplied);
    }

    let mut patched = String::with_capacity(content.len() + line.len());
    patched.push_str(&content[..pos]);
    patched.push_str(&line);
    patched.push_str(&content[pos..]);
    fs::write(file, patched).map_err(|e| patch_failed(e.to_string()))?;

    Ok(PatchOutcome::Applied)
}

/// Apply every recipe insertion below `source_folder`
pub fn apply_patches(
    patches: &[PatchEntry],
    source_folder: &Path,
    log: &mut BuildLog,
) -> Result<Vec<PatchOutcome>> {
    let mut outcomes = Vec::with_capacity(patches.len());
    for patch in patches {
        let file = source_folder.join(&patch.file);
        let outcome = apply_insertion(&file, &patch.anchor, &patch.insert)?;
        match outcome {
            PatchOutcome::Applied => {
                info!("Patched {}", patch.file);
                log.line(&format!("Patched {}: {}", patch.file, patch.insert));
            }
            PatchOutcome::AlreadyApplied => {
                log.line(&format!("Patch already applied: {}", patch.file));
            }
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Clone and check out every recipe source into `source_folder`
///
/// The first source is the root of the tree, later ones land in their
/// `destination` below it. Existing checkouts of the same URL are reused.
pub fn acquire_sources(
    git: &Path,
    recipe: &Recipe,
    source_folder: &Path,
    log: &mut BuildLog,
) -> Result<Vec<SourceProvenance>> {
    let mut provenance = Vec::with_capacity(recipe.sources.len());

    for source in &recipe.sources {
        let reference = recipe.substitute(&source.reference);
        let dest = destination_of(source, source_folder);
        fetch_one(git, &source.url, &reference, &dest, log)?;

        let commit = git_output(git, &dest, &["rev-parse", "HEAD"], log)?;
        info!("Checked out {} at {} ({})", source.url, reference, short_commit(&commit));

        provenance.push(SourceProvenance {
            url: source.url.clone(),
            reference,
            commit,
            destination: source.destination.clone().unwrap_or_default(),
        });
    }

    Ok(provenance)
}

fn destination_of(source: &SourceEntry, source_folder: &Path) -> PathBuf {
    match &source.destination {
        Some(rel) => source_folder.join(rel),
        None => source_folder.to_path_buf(),
    }
}

fn fetch_one(git: &Path, url: &str, reference: &str, dest: &Path, log: &mut BuildLog) -> Result<()> {
    if is_checkout_of(git, dest, url, log) {
        debug!("Reusing checkout of {} in {}", url, dest.display());
        log.line(&format!("Reusing checkout: {}", url));
    } else {
        if dest.exists() && fs::read_dir(dest)?.next().is_some() {
            return Err(Error::SourceFetchFailed(format!(
                "{} exists and is not a checkout of {}",
                dest.display(),
                url
            )));
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("Cloning {}", url);
        let dest_arg = dest.display().to_string();
        run_tool("clone", git, ["clone", "--quiet", url, dest_arg.as_str()], None, log)
            .map_err(|e| fetch_failed(url, e))?;
        log.line(&format!("Fetched source: {}", url));
    }

    let dest_arg = dest.display().to_string();
    run_tool(
        "checkout",
        git,
        ["-C", dest_arg.as_str(), "checkout", "--quiet", reference],
        None,
        log,
    )
    .map_err(|e| fetch_failed(url, e))?;

    Ok(())
}

fn is_checkout_of(git: &Path, dest: &Path, url: &str, log: &mut BuildLog) -> bool {
    if !dest.join(".git").exists() {
        return false;
    }
    git_output(git, dest, &["remote", "get-url", "origin"], log)
        .map(|origin| origin == url)
        .unwrap_or(false)
}

fn git_output(git: &Path, dir: &Path, args: &[&str], log: &mut BuildLog) -> Result<String> {
    let dir_arg = dir.display().to_string();
    let mut full = vec!["-C", dir_arg.as_str()];
    full.extend_from_slice(args);
    let out = run_tool(&format!("git {}", args.join(" ")), git, &full, None, log)
        .map_err(|e| Error::SourceFetchFailed(e.to_string()))?;
    Ok(out.trim().to_string())
}

fn fetch_failed(url: &str, err: Error) -> Error {
    match err {
        Error::CommandFailed { phase, stderr, .. } => {
            Error::SourceFetchFailed(format!("{} of {}: {}", phase, url, stderr.trim()))
        }
        other => other,
    }
}

fn short_commit(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CMAKELISTS: &str = "cmake_minimum_required(VERSION 3.4)\n\
                              project(MagnumIntegration CXX)\n\
                              find_package(Magnum REQUIRED)\n";

    #[test]
    fn test_insertion_before_anchor() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("CMakeLists.txt");
        fs::write(&file, CMAKELISTS).unwrap();

        let outcome =
            apply_insertion(&file, "find_package(Magnum REQUIRED)", "cmake_policy(SET CMP0074 NEW)")
                .unwrap();
        assert_eq!(outcome, PatchOutcome::Applied);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "cmake_minimum_required(VERSION 3.4)\n\
             project(MagnumIntegration CXX)\n\
             cmake_policy(SET CMP0074 NEW)\n\
             find_package(Magnum REQUIRED)\n"
        );
    }

    #[test]
    fn test_insertion_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("CMakeLists.txt");
        fs::write(&file, CMAKELISTS).unwrap();

        let anchor = "find_package(Magnum REQUIRED)";
        let insert = "cmake_policy(SET CMP0074 NEW)";
        apply_insertion(&file, anchor, insert).unwrap();
        let once = fs::read_to_string(&file).unwrap();

        assert_eq!(
            apply_insertion(&file, anchor, insert).unwrap(),
            PatchOutcome::AlreadyApplied
        );
        assert_eq!(fs::read_to_string(&file).unwrap(), once);
    }

    #[test]
    fn test_missing_anchor() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("CMakeLists.txt");
        fs::write(&file, "project(Other)\n").unwrap();

        let err = apply_insertion(&file, "find_package(Magnum REQUIRED)", "x").unwrap_err();
        assert!(matches!(err, Error::PatchFailed { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), "project(Other)\n");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = apply_insertion(&dir.path().join("nope.txt"), "a", "b").unwrap_err();
        assert!(matches!(err, Error::PatchFailed { .. }));
    }

    #[test]
    fn test_apply_patches_logs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CMakeLists.txt"), CMAKELISTS).unwrap();
        let patches = vec![PatchEntry {
            file: "CMakeLists.txt".to_string(),
            anchor: "find_package(Magnum REQUIRED)".to_string(),
            insert: "cmake_policy(SET CMP0074 NEW)".to_string(),
        }];

        let mut log = BuildLog::new();
        let first = apply_patches(&patches, dir.path(), &mut log).unwrap();
        let second = apply_patches(&patches, dir.path(), &mut log).unwrap();
        assert_eq!(first, vec![PatchOutcome::Applied]);
        assert_eq!(second, vec![PatchOutcome::AlreadyApplied]);
        assert!(log.as_str().contains("Patch already applied: CMakeLists.txt"));
    }

    #[test]
    fn test_non_checkout_destination_is_refused() {
        let Ok(git) = which::which("git") else {
            return;
        };
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stray.txt"), "x").unwrap();

        let mut log = BuildLog::new();
        let err = fetch_one(&git, "https://example.invalid/repo.git", "v1", dir.path(), &mut log)
            .unwrap_err();
        assert!(matches!(err, Error::SourceFetchFailed(_)));
    }

    #[test]
    fn test_short_commit() {
        assert_eq!(short_commit("0123456789abcdef0123"), "0123456789ab");
        assert_eq!(short_commit("abc"), "abc");
    }
}
