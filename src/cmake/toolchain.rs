// src/cmake/toolchain.rs

//! Toolchain file generation

use super::{cmake_path, CMakeValue, CMakeVariables};
use crate::error::{Error, Result};
use crate::settings::{Arch, CompilerFamily, Os, Settings};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the generated toolchain
pub const TOOLCHAIN_FILE: &str = "toolchain.cmake";

/// Everything that goes into `toolchain.cmake`
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Shown in the header comment
    pub title: String,
    pub settings: Settings,
    pub variables: CMakeVariables,
    /// `Some(fPIC)` when the option exists for the target
    pub position_independent: Option<bool>,
    pub shared: bool,
    /// Directory holding the lookup files; prepended to the module and prefix paths
    pub generators_dir: PathBuf,
    /// Dependency package folders, appended to `CMAKE_PREFIX_PATH`
    pub prefix_paths: Vec<PathBuf>,
    /// Machine running the build; other targets are cross-compiled
    pub host: Settings,
}

impl Toolchain {
    pub fn new(title: impl Into<String>, settings: Settings, generators_dir: &Path) -> Self {
        Self {
            title: title.into(),
            settings,
            variables: CMakeVariables::new(),
            position_independent: None,
            shared: false,
            generators_dir: generators_dir.to_path_buf(),
            prefix_paths: Vec::new(),
            host: Settings::host(),
        }
    }

    /// Render the toolchain file
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Generated by magnum-kitchen for {}\n", self.title));
        out.push_str(&format!("# {}\n\n", self.settings));

        out.push_str(&self.render_target());

        out.push_str("if(NOT CMAKE_BUILD_TYPE)\n");
        out.push_str(&format!(
            "  set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"\" FORCE)\n",
            self.settings.build_type
        ));
        out.push_str("endif()\n");

        if let Some(pic) = self.position_independent {
            out.push_str(&format!(
                "set(CMAKE_POSITION_INDEPENDENT_CODE {} CACHE BOOL \"\" FORCE)\n",
                CMakeValue::from(pic)
            ));
        }
        out.push_str(&format!(
            "set(BUILD_SHARED_LIBS {} CACHE BOOL \"\" FORCE)\n\n",
            CMakeValue::from(self.shared)
        ));

        let generators = quote(&cmake_path(&self.generators_dir));
        out.push_str(&format!("list(PREPEND CMAKE_MODULE_PATH {})\n", generators));
        out.push_str(&format!("list(PREPEND CMAKE_PREFIX_PATH {}", generators));
        for path in &self.prefix_paths {
            out.push_str(&format!(" {}", quote(&cmake_path(path))));
        }
        out.push_str(")\n\n");

        for (name, value) in self.variables.iter() {
            let kind = if value.is_bool() { "BOOL" } else { "STRING" };
            out.push_str(&format!(
                "set({} {} CACHE {} \"\" FORCE)\n",
                name,
                quote(&value.to_string()),
                kind
            ));
        }

        out
    }

    /// Compiler, architecture and cross-compilation lines for the settings
    fn render_target(&self) -> String {
        let settings = &self.settings;
        let mut out = String::new();

        if let Some((cc, cxx)) = compiler_programs(settings.compiler) {
            out.push_str("if(NOT DEFINED ENV{CC} AND NOT DEFINED ENV{CXX})\n");
            out.push_str(&format!("  set(CMAKE_C_COMPILER {})\n", quote(cc)));
            out.push_str(&format!("  set(CMAKE_CXX_COMPILER {})\n", quote(cxx)));
            out.push_str("endif()\n");
        }

        // Running on the host is allowed for x86 built on x86_64 (-m32)
        if !settings.can_run_on(&self.host) {
            out.push_str(&format!(
                "set(CMAKE_SYSTEM_NAME {})\n",
                quote(system_name(settings.os))
            ));
            out.push_str(&format!(
                "set(CMAKE_SYSTEM_PROCESSOR {})\n",
                quote(system_processor(settings.os, settings.arch))
            ));
        }

        match (settings.os, settings.compiler) {
            (Os::Macos | Os::Ios, _) => {
                out.push_str(&format!(
                    "set(CMAKE_OSX_ARCHITECTURES {} CACHE STRING \"\" FORCE)\n",
                    quote(apple_arch(settings.arch))
                ));
            }
            (_, CompilerFamily::Msvc) => {
                if let Some(platform) = msvc_platform(settings.arch) {
                    out.push_str("if(CMAKE_GENERATOR MATCHES \"Visual Studio\")\n");
                    out.push_str(&format!("  set(CMAKE_GENERATOR_PLATFORM {})\n", quote(platform)));
                    out.push_str("endif()\n");
                }
            }
            _ => {
                if let Some(flag) = gnu_arch_flag(settings.arch) {
                    out.push_str(&format!("string(APPEND CMAKE_C_FLAGS_INIT \" {}\")\n", flag));
                    out.push_str(&format!("string(APPEND CMAKE_CXX_FLAGS_INIT \" {}\")\n", flag));
                }
            }
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Write `toolchain.cmake` into the generators directory
    pub fn write(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.generators_dir).map_err(|e| {
            Error::IoError(format!(
                "Failed to create {}: {}",
                self.generators_dir.display(),
                e
            ))
        })?;
        let path = self.generators_dir.join(TOOLCHAIN_FILE);
        fs::write(&path, self.render())
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

/// C and C++ drivers of a compiler family; msvc is taken from the developer environment
fn compiler_programs(compiler: CompilerFamily) -> Option<(&'static str, &'static str)> {
    match compiler {
        CompilerFamily::Gcc => Some(("gcc", "g++")),
        CompilerFamily::Clang | CompilerFamily::AppleClang => Some(("clang", "clang++")),
        CompilerFamily::Msvc => None,
    }
}

fn system_name(os: Os) -> &'static str {
    match os {
        Os::Windows => "Windows",
        Os::Linux => "Linux",
        Os::Macos => "Darwin",
        Os::FreeBSD => "FreeBSD",
        Os::Android => "Android",
        Os::Ios => "iOS",
        Os::Emscripten => "Emscripten",
    }
}

fn system_processor(os: Os, arch: Arch) -> &'static str {
    match (os, arch) {
        (Os::Windows, Arch::X86_64) => "AMD64",
        (Os::Macos | Os::Ios, Arch::Armv8) => "arm64",
        (_, Arch::X86) => "x86",
        (_, Arch::X86_64) => "x86_64",
        (_, Arch::Armv7) => "armv7-a",
        (_, Arch::Armv8) => "aarch64",
        (_, Arch::Wasm) => "wasm32",
    }
}

fn apple_arch(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "i386",
        Arch::X86_64 => "x86_64",
        Arch::Armv7 => "armv7",
        Arch::Armv8 => "arm64",
        Arch::Wasm => "wasm32",
    }
}

fn msvc_platform(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X86 => Some("Win32"),
        Arch::X86_64 => Some("x64"),
        Arch::Armv7 => Some("ARM"),
        Arch::Armv8 => Some("ARM64"),
        Arch::Wasm => None,
    }
}

fn gnu_arch_flag(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X86 => Some("-m32"),
        Arch::X86_64 => Some("-m64"),
        _ => None,
    }
}

/// Double-quote a CMake argument
pub(crate) fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
