// src/settings.rs

//! Target settings: operating system, architecture, compiler and build type
//!
//! Settings are plain typed values. Names round-trip through the spellings
//! used in profiles (`Windows`, `Macos`, `x86_64`, `apple-clang`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Target operating system
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Os {
    Windows,
    Linux,
    Macos,
    FreeBSD,
    Android,
    #[strum(serialize = "iOS")]
    #[serde(rename = "iOS")]
    Ios,
    Emscripten,
}

impl Os {
    /// Operating system of the running process
    pub fn host() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Macos),
            "freebsd" => Some(Self::FreeBSD),
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            _ => None,
        }
    }

    /// File extension of executables on this OS
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::Emscripten => ".js",
            _ => "",
        }
    }
}

/// Target CPU architecture
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86,
    #[strum(serialize = "x86_64")]
    #[serde(rename = "x86_64")]
    X86_64,
    Armv7,
    Armv8,
    Wasm,
}

impl Arch {
    /// Architecture of the running process
    pub fn host() -> Option<Self> {
        match std::env::consts::ARCH {
            "x86" => Some(Self::X86),
            "x86_64" => Some(Self::X86_64),
            "arm" => Some(Self::Armv7),
            "aarch64" => Some(Self::Armv8),
            "wasm32" => Some(Self::Wasm),
            _ => None,
        }
    }
}

/// Compiler family, the only part of the compiler setting the recipe branches on
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerFamily {
    Msvc,
    Gcc,
    Clang,
    AppleClang,
}

impl CompilerFamily {
    /// Conventional default compiler for an OS
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Windows => Self::Msvc,
            Os::Macos | Os::Ios => Self::AppleClang,
            Os::Linux => Self::Gcc,
            Os::FreeBSD | Os::Android | Os::Emscripten => Self::Clang,
        }
    }
}

/// CMake build type
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

/// Complete settings context for one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub compiler: CompilerFamily,
    pub build_type: BuildType,
}

impl Settings {
    pub fn new(os: Os, arch: Arch, compiler: CompilerFamily, build_type: BuildType) -> Self {
        Self {
            os,
            arch,
            compiler,
            build_type,
        }
    }

    /// Settings describing the machine we are running on
    ///
    /// Falls back to Linux/x86_64 on hosts the enums have no name for.
    pub fn host() -> Self {
        let os = Os::host().unwrap_or(Os::Linux);
        Self {
            os,
            arch: Arch::host().unwrap_or(Arch::X86_64),
            compiler: CompilerFamily::default_for(os),
            build_type: BuildType::Release,
        }
    }

    /// Whether binaries built for `self` can execute on `host`
    pub fn can_run_on(&self, host: &Settings) -> bool {
        if self.os != host.os {
            return false;
        }
        self.arch == host.arch || (self.arch == Arch::X86 && host.arch == Arch::X86_64)
    }

    /// Set a single setting from its profile key
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let bad = |what: &str| {
            crate::Error::ParseError(format!("Invalid {} setting: '{}'", what, value))
        };
        match key {
            "os" => self.os = value.parse().map_err(|_| bad("os"))?,
            "arch" => self.arch = value.parse().map_err(|_| bad("arch"))?,
            "compiler" => self.compiler = value.parse().map_err(|_| bad("compiler"))?,
            "build_type" => self.build_type = value.parse().map_err(|_| bad("build_type"))?,
            other => {
                return Err(crate::Error::ParseError(format!(
                    "Unknown setting '{}' (expected os, arch, compiler or build_type)",
                    other
                )));
            }
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "os={} arch={} compiler={} build_type={}",
            self.os, self.arch, self.compiler, self.build_type
        )
    }
}
