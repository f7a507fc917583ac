// src/recipe/parser.rs

//! Recipe file parsing and validation

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::options::validate_decl;
use std::collections::HashSet;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
///
/// The recipe's directory is remembered so relative paths (the
/// verification project) resolve against it.
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file {}: {}", path.display(), e)))?;

    let mut recipe = parse_recipe(&content)?;
    recipe.base_dir = path.parent().map(Path::to_path_buf);
    Ok(recipe)
}

/// Validate a recipe for completeness and correctness
///
/// Structural problems are errors. Suspicious but legal recipes produce
/// warnings, which are returned.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ParseError("Recipe package version cannot be empty".to_string()));
    }

    for (name, decl) in &recipe.options {
        validate_decl(name, decl)?;
    }

    // Every referenced option must be declared and boolean
    let check_gate = |option: &str, context: &str| -> Result<()> {
        let decl = recipe.options.get(option).ok_or_else(|| {
            Error::ParseError(format!("{} references undeclared option '{}'", context, option))
        })?;
        if !decl.is_boolean() {
            return Err(Error::ParseError(format!(
                "{} references non-boolean option '{}'",
                context, option
            )));
        }
        Ok(())
    };

    let mut seen = HashSet::new();
    for req in &recipe.requires {
        if !seen.insert(req.reference.name.as_str()) {
            return Err(Error::ParseError(format!(
                "Package '{}' is required more than once",
                req.reference.name
            )));
        }
        if let Some(when) = &req.when {
            check_gate(when, &format!("Requirement {}", req.reference))?;
        }
    }

    for rule in &recipe.propagate {
        check_gate(&rule.when, &format!("Propagation to {}:{}", rule.package, rule.option))?;
        if !recipe.requires.iter().any(|r| r.reference.name == rule.package) {
            warnings.push(format!(
                "Propagation targets '{}', which is not a direct requirement",
                rule.package
            ));
        }
    }

    if recipe.sources.is_empty() {
        warnings.push("No sources declared".to_string());
    }
    for (i, source) in recipe.sources.iter().enumerate() {
        if source.url.is_empty() || source.reference.is_empty() {
            return Err(Error::ParseError(format!(
                "Source #{} needs both url and reference",
                i + 1
            )));
        }
        if i > 0 && source.destination.is_none() {
            return Err(Error::ParseError(format!(
                "Source {} needs a destination (only the first source goes to the root)",
                source.url
            )));
        }
    }

    for patch in &recipe.patches {
        if patch.anchor.is_empty() || patch.insert.is_empty() {
            return Err(Error::ParseError(format!(
                "Patch for {} needs a non-empty anchor and insert",
                patch.file
            )));
        }
    }

    // `with_*` options normally select a dependency. One that gates nothing
    // is most likely vendored or stale; report it instead of guessing.
    let gating: HashSet<&str> = recipe.gating_options().collect();
    for name in recipe.options.keys() {
        if name.starts_with("with_") && !gating.contains(name.as_str()) {
            warnings.push(format!(
                "Option '{}' is declared but gates no requirement; it only reaches the build system",
                name
            ));
        }
    }

    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe;

    const MINIMAL: &str = r#"
[package]
name = "test"
version = "1.0"
license = "MIT"
description = "A test"

[options.shared]
values = [true, false]
default = false

[[sources]]
url = "https://example.com/test.git"
reference = "v%(version)s"
"#;

    #[test]
    fn test_parse_valid_recipe() {
        let recipe = parse_recipe(MINIMAL).unwrap();
        assert_eq!(recipe.package.name, "test");
        assert_eq!(recipe.substitute(&recipe.sources[0].reference), "v1.0");
        assert!(validate_recipe(&recipe).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_recipe() {
        assert!(parse_recipe("this is not valid toml at all {}").is_err());
    }

    #[test]
    fn test_builtin_recipe_parses() {
        let recipe = recipe::builtin().unwrap();
        assert_eq!(recipe.package.name, "magnum-integration");
        assert_eq!(recipe.package.version, "2020.06");
        assert_eq!(recipe.options.len(), 7);
        assert_eq!(recipe.requires.len(), 5);
        assert_eq!(recipe.sources.len(), 2);
        assert_eq!(recipe.patches.len(), 1);
        assert!(recipe.test_package.is_some());
        assert!(recipe.base_dir.is_none());
    }

    #[test]
    fn test_builtin_recipe_warns_about_imgui() {
        let recipe = recipe::builtin().unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert_eq!(warnings.len(), 1, "{:?}", warnings);
        assert!(warnings[0].contains("with_imgui"));
    }

    #[test]
    fn test_validate_empty_name() {
        let content = MINIMAL.replace("name = \"test\"", "name = \"\"");
        let recipe = parse_recipe(&content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_undeclared_gate() {
        let content = format!(
            "{}\n[[requires]]\nreference = \"zlib/1.3\"\nwhen = \"with_zlib\"\n",
            MINIMAL
        );
        let recipe = parse_recipe(&content).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(err.to_string().contains("with_zlib"));
    }

    #[test]
    fn test_validate_duplicate_requirement() {
        let content = format!(
            "{}\n[[requires]]\nreference = \"zlib/1.3\"\n\n[[requires]]\nreference = \"zlib/1.2\"\n",
            MINIMAL
        );
        let recipe = parse_recipe(&content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_bad_default() {
        let content = MINIMAL.replace("default = false", "default = \"static\"");
        let recipe = parse_recipe(&content).unwrap();
        assert!(matches!(
            validate_recipe(&recipe),
            Err(Error::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn test_validate_second_source_needs_destination() {
        let content = format!(
            "{}\n[[sources]]\nurl = \"https://example.com/b.git\"\nreference = \"v1\"\n",
            MINIMAL
        );
        let recipe = parse_recipe(&content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[package]
name = "test"
version = "1.0"
"#;
        let recipe = parse_recipe(content).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("sources")));
    }

    #[test]
    fn test_parse_recipe_file_sets_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let recipe = parse_recipe_file(&path).unwrap();
        assert_eq!(recipe.base_dir.as_deref(), Some(dir.path()));
    }
}
