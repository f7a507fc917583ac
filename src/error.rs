// src/error.rs

//! Error types for the kitchen
//!
//! Every failure is fatal for the step that raised it. Nothing here is
//! retried; callers surface the error to the operator as-is.

use thiserror::Error;

/// Errors raised while resolving, fetching, building or packaging a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the standard library
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with extra context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Malformed recipe, profile, reference or manifest
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Option name not declared by the recipe
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// Option value outside the declared set
    #[error("Invalid value '{value}' for option '{option}' (allowed: {allowed})")]
    InvalidOptionValue {
        option: String,
        value: String,
        allowed: String,
    },

    /// Option removed for the target platform but referenced anyway
    #[error("Option '{option}' does not exist for os={os}")]
    OptionNotAvailable { option: String, os: String },

    /// Requirements or option constraints that cannot be satisfied
    #[error("Dependency resolution failed: {0}")]
    ResolutionError(String),

    /// Something that should exist (package, file, folder) does not
    #[error("Not found: {0}")]
    NotFound(String),

    /// Clone/checkout of an upstream source failed
    #[error("Source fetch failed: {0}")]
    SourceFetchFailed(String),

    /// A textual patch could not be applied
    #[error("Failed to patch {file}: {reason}")]
    PatchFailed { file: String, reason: String },

    /// Required external program is not installed
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    /// External program exited unsuccessfully
    #[error("{phase} failed with exit code {code:?}\nstderr: {stderr}")]
    CommandFailed {
        phase: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Packaging/install step failed
    #[error("Packaging failed: {0}")]
    PackageError(String),

    /// Settings combination the recipe has no answer for
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Test consumer failed to build or run
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::ParseError(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::IoError(format!("Failed to serialize TOML: {}", e))
    }
}
