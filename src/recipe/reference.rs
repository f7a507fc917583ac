// src/recipe/reference.rs

//! Package references: `name/version[@user/channel]`
//!
//! Examples:
//! - `eigen/3.4.0`
//! - `magnum/2020.06@camposs/stable`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference to a packaged library at a pinned version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageReference {
    pub name: String,
    pub version: String,
    pub user: Option<String>,
    pub channel: Option<String>,
}

impl PackageReference {
    /// Create a reference without user/channel
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: None,
            channel: None,
        }
    }

    /// Parse a reference from `name/version[@user/channel]`
    pub fn parse(s: &str) -> Result<Self, ReferenceParseError> {
        let s = s.trim();
        let (base, namespace) = match s.split_once('@') {
            Some((base, ns)) => (base, Some(ns)),
            None => (s, None),
        };

        let (name, version) = base
            .split_once('/')
            .ok_or_else(|| ReferenceParseError::MissingVersion(s.to_string()))?;

        if name.is_empty() {
            return Err(ReferenceParseError::EmptyName(s.to_string()));
        }
        if version.is_empty() {
            return Err(ReferenceParseError::MissingVersion(s.to_string()));
        }

        let valid_name = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+');
        if !name.chars().all(valid_name) {
            return Err(ReferenceParseError::InvalidName(name.to_string()));
        }
        if !version.chars().all(valid_name) {
            return Err(ReferenceParseError::InvalidVersion(version.to_string()));
        }

        let (user, channel) = match namespace {
            None => (None, None),
            Some(ns) => {
                let (user, channel) = ns
                    .split_once('/')
                    .ok_or_else(|| ReferenceParseError::MissingChannel(s.to_string()))?;
                if user.is_empty() || channel.is_empty() {
                    return Err(ReferenceParseError::MissingChannel(s.to_string()));
                }
                if !user.chars().all(valid_name) || !channel.chars().all(valid_name) {
                    return Err(ReferenceParseError::InvalidName(ns.to_string()));
                }
                (Some(user.to_string()), Some(channel.to_string()))
            }
        };

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            user,
            channel,
        })
    }

    /// Whether `self` (a stored package) satisfies `wanted` (a requirement)
    ///
    /// Name and version must be equal. User/channel only matter when the
    /// requirement names them.
    pub fn satisfies(&self, wanted: &PackageReference) -> bool {
        self.name == wanted.name
            && self.version == wanted.version
            && (wanted.user.is_none() || self.user == wanted.user)
            && (wanted.channel.is_none() || self.channel == wanted.channel)
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let (Some(user), Some(channel)) = (&self.user, &self.channel) {
            write!(f, "@{}/{}", user, channel)?;
        }
        Ok(())
    }
}

impl FromStr for PackageReference {
    type Err = ReferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PackageReference {
    type Error = ReferenceParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PackageReference> for String {
    fn from(r: PackageReference) -> Self {
        r.to_string()
    }
}

/// Errors that can occur when parsing a package reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceParseError {
    /// Missing `/version`
    MissingVersion(String),
    /// Empty package name
    EmptyName(String),
    /// `@user` given without `/channel`
    MissingChannel(String),
    /// Invalid characters in name, user or channel
    InvalidName(String),
    /// Invalid characters in version
    InvalidVersion(String),
}

impl fmt::Display for ReferenceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVersion(s) => write!(f, "Missing version in reference: {}", s),
            Self::EmptyName(s) => write!(f, "Empty package name in reference: {}", s),
            Self::MissingChannel(s) => write!(f, "Expected '@user/channel' in reference: {}", s),
            Self::InvalidName(s) => write!(f, "Invalid name in reference: {}", s),
            Self::InvalidVersion(s) => write!(f, "Invalid version in reference: {}", s),
        }
    }
}

impl std::error::Error for ReferenceParseError {}

impl From<ReferenceParseError> for crate::Error {
    fn from(e: ReferenceParseError) -> Self {
        crate::Error::ParseError(e.to_string())
    }
}
