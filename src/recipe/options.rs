// src/recipe/options.rs

//! Recipe options: declarations, values and the per-configuration option set

use crate::error::{Error, Result};
use crate::settings::Os;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single option value
///
/// Booleans and enumerated strings are the only shapes an option can take.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// Parse a value from profile/CLI text
    ///
    /// `True`/`False` in any case are booleans, everything else is a string.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Self::Bool(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Self::Bool(false)
        } else {
            Self::Str(trimmed.to_string())
        }
    }

    /// The boolean payload, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) => None,
        }
    }

    /// Truthiness used for `when` conditions
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// Declaration of one option in a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDecl {
    /// Allowed values
    pub values: Vec<OptionValue>,

    /// Default value (must be one of `values`)
    pub default: OptionValue,

    /// Operating systems on which the option does not exist
    #[serde(default)]
    pub exclude_os: Vec<Os>,

    /// Human readable description
    #[serde(default)]
    pub description: Option<String>,
}

impl OptionDecl {
    /// Boolean option with the given default
    pub fn boolean(default: bool) -> Self {
        Self {
            values: vec![OptionValue::Bool(true), OptionValue::Bool(false)],
            default: OptionValue::Bool(default),
            exclude_os: Vec::new(),
            description: None,
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.values.iter().all(|v| v.as_bool().is_some())
    }

    fn allowed_list(&self) -> String {
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The options of one configuration
///
/// Starts out as the recipe defaults. Platform filtering and profile
/// overrides are applied on top, and every access is checked against the
/// declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    values: BTreeMap<String, OptionValue>,
    allowed: BTreeMap<String, Vec<OptionValue>>,
    /// Options removed by `config_options`, with the OS that removed them
    removed: BTreeMap<String, Os>,
    exclusions: BTreeMap<String, Vec<Os>>,
}

impl OptionSet {
    /// Build an option set holding every declared default
    pub fn from_declarations(decls: &BTreeMap<String, OptionDecl>) -> Self {
        let mut set = Self {
            values: BTreeMap::new(),
            allowed: BTreeMap::new(),
            removed: BTreeMap::new(),
            exclusions: BTreeMap::new(),
        };

        for (name, decl) in decls {
            set.values.insert(name.clone(), decl.default.clone());
            set.allowed.insert(name.clone(), decl.values.clone());
            if !decl.exclude_os.is_empty() {
                set.exclusions.insert(name.clone(), decl.exclude_os.clone());
            }
        }

        set
    }

    /// Drop options that do not exist on the target OS
    pub fn config_options(&mut self, os: Os) {
        for (name, excluded) in &self.exclusions {
            if excluded.contains(&os) && self.values.remove(name).is_some() {
                self.removed.insert(name.clone(), os);
            }
        }
    }

    /// Set an option, validating name, availability and value
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<()> {
        self.check_available(name)?;

        let allowed = &self.allowed[name];
        if !allowed.contains(&value) {
            return Err(Error::InvalidOptionValue {
                option: name.to_string(),
                value: value.to_string(),
                allowed: allowed
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Get an option, failing if it is unknown or was removed
    pub fn get(&self, name: &str) -> Result<&OptionValue> {
        self.check_available(name)?;
        Ok(&self.values[name])
    }

    /// Get an option if it exists for this configuration
    pub fn get_safe(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Boolean value of an option; absent or non-boolean reads as `false`
    pub fn flag(&self, name: &str) -> bool {
        self.get_safe(name).is_some_and(OptionValue::is_true)
    }

    /// Iterate over the active options in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of options removed for the target platform
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.removed.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Active values as a plain map
    pub fn to_map(&self) -> BTreeMap<String, OptionValue> {
        self.values.clone()
    }

    fn check_available(&self, name: &str) -> Result<()> {
        if let Some(os) = self.removed.get(name) {
            return Err(Error::OptionNotAvailable {
                option: name.to_string(),
                os: os.to_string(),
            });
        }
        if !self.allowed.contains_key(name) {
            return Err(Error::UnknownOption(name.to_string()));
        }
        Ok(())
    }
}

impl Serialize for OptionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Validate that a declaration is self-consistent
pub(crate) fn validate_decl(name: &str, decl: &OptionDecl) -> Result<()> {
    if decl.values.is_empty() {
        return Err(Error::ParseError(format!(
            "Option '{}' declares no allowed values",
            name
        )));
    }
    if !decl.values.contains(&decl.default) {
        return Err(Error::InvalidOptionValue {
            option: name.to_string(),
            value: decl.default.to_string(),
            allowed: decl.allowed_list(),
        });
    }
    Ok(())
}
