// src/profile.rs

//! Profiles: the settings and option overrides of one configuration
//!
//! A profile is read from TOML or assembled from `-s`/`-o` command-line
//! pairs, then handed unchanged to every step.
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! compiler = "gcc"
//!
//! [options]
//! shared = true
//!
//! [dependency_options.magnum]
//! shared = true
//! ```

use crate::error::{Error, Result};
use crate::recipe::OptionValue;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings plus option overrides for one configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub settings: Settings,

    /// Overrides for the recipe's own options
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,

    /// Overrides for options of dependencies (package -> option -> value)
    #[serde(default)]
    pub dependency_options: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

/// Raw TOML form, where every setting is optional and falls back to the host
#[derive(Debug, Default, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    settings: BTreeMap<String, String>,
    #[serde(default)]
    options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    dependency_options: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl Profile {
    /// Profile for the host machine with no overrides
    pub fn host() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Parse a profile from TOML text
    ///
    /// Unset settings keep the host's values.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ProfileFile = toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid profile: {}", e)))?;

        let mut profile = Self::host();
        for (key, value) in &file.settings {
            profile.settings.set(key, value)?;
        }
        profile.options = normalize(file.options);
        profile.dependency_options = file
            .dependency_options
            .into_iter()
            .map(|(package, options)| (package, normalize(options)))
            .collect();
        Ok(profile)
    }

    /// Load a profile from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read profile {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Apply a `key=value` setting from the command line
    pub fn apply_setting(&mut self, pair: &str) -> Result<()> {
        let (key, value) = split_pair(pair)?;
        self.settings.set(key, value)
    }

    /// Apply a `name=value` or `package:name=value` option from the command line
    pub fn apply_option(&mut self, pair: &str) -> Result<()> {
        let (key, value) = split_pair(pair)?;
        let value = OptionValue::parse(value);

        match key.split_once(':') {
            Some((package, option)) if !package.is_empty() && !option.is_empty() => {
                self.dependency_options
                    .entry(package.to_string())
                    .or_default()
                    .insert(option.to_string(), value);
            }
            Some(_) => {
                return Err(Error::ParseError(format!(
                    "Expected 'package:option=value', got '{}'",
                    pair
                )));
            }
            None => {
                self.options.insert(key.to_string(), value);
            }
        }
        Ok(())
    }
}

/// Quoted values read the same as on the command line, so `"True"` is a boolean
fn normalize(options: BTreeMap<String, OptionValue>) -> BTreeMap<String, OptionValue> {
    options
        .into_iter()
        .map(|(name, value)| match value {
            OptionValue::Str(s) => (name, OptionValue::parse(&s)),
            other => (name, other),
        })
        .collect()
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim(), v.trim())),
        _ => Err(Error::ParseError(format!(
            "Expected 'key=value', got '{}'",
            pair
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{CompilerFamily, Os};

    #[test]
    fn test_parse_profile() {
        let profile = Profile::parse(
            r#"
[settings]
os = "Windows"
compiler = "msvc"

[options]
shared = true
with_glm = "False"

[dependency_options.magnum]
shared = true
"#,
        )
        .unwrap();

        assert_eq!(profile.settings.os, Os::Windows);
        assert_eq!(profile.settings.compiler, CompilerFamily::Msvc);
        assert_eq!(profile.options["shared"], OptionValue::Bool(true));
        assert_eq!(profile.options["with_glm"], OptionValue::Bool(false));
        assert_eq!(
            profile.dependency_options["magnum"]["shared"],
            OptionValue::Bool(true)
        );
    }

    #[test]
    fn test_quoted_booleans_resolve_like_cli_values() {
        let profile = Profile::parse(
            r#"
[settings]
os = "Linux"
compiler = "gcc"

[options]
shared = "True"
fPIC = "false"

[dependency_options.magnum]
shared = "True"
"#,
        )
        .unwrap();
        assert_eq!(profile.options["shared"], OptionValue::Bool(true));
        assert_eq!(profile.options["fPIC"], OptionValue::Bool(false));
        assert_eq!(
            profile.dependency_options["magnum"]["shared"],
            OptionValue::Bool(true)
        );

        let recipe = crate::recipe::builtin().unwrap();
        let resolution = crate::resolve::resolve(&recipe, &profile).unwrap();
        assert!(resolution.is_shared());
        assert_eq!(
            resolution.dependency_options["magnum"]["shared"],
            OptionValue::Bool(true)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_setting() {
        assert!(Profile::parse("[settings]\nlibc = \"musl\"\n").is_err());
        assert!(Profile::parse("[settings]\nos = \"Plan9\"\n").is_err());
    }

    #[test]
    fn test_apply_cli_pairs() {
        let mut profile = Profile::host();
        profile.apply_setting("os=Linux").unwrap();
        profile.apply_setting("build_type=Debug").unwrap();
        profile.apply_option("shared=True").unwrap();
        profile.apply_option("magnum:shared=true").unwrap();

        assert_eq!(profile.settings.os, Os::Linux);
        assert_eq!(profile.options["shared"], OptionValue::Bool(true));
        assert_eq!(
            profile.dependency_options["magnum"]["shared"],
            OptionValue::Bool(true)
        );
    }

    #[test]
    fn test_apply_malformed_pairs() {
        let mut profile = Profile::host();
        assert!(profile.apply_option("shared").is_err());
        assert!(profile.apply_option("=true").is_err());
        assert!(profile.apply_option(":shared=true").is_err());
        assert!(profile.apply_setting("os").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linux.toml");
        std::fs::write(&path, "[settings]\nos = \"Linux\"\ncompiler = \"clang\"\n").unwrap();

        let profile = Profile::load(&path).unwrap();
        assert_eq!(profile.settings.compiler, CompilerFamily::Clang);
        assert!(Profile::load(&dir.path().join("missing.toml")).is_err());
    }
}
