// src/cli/mod.rs

//! CLI definitions for magnum-kitchen
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Recipe commands:
//! - `inspect` - Recipe metadata, options and validation warnings
//! - `resolve` - Resolved options, requirements and propagated options
//! - `info` - Consumption metadata for a configuration
//!
//! Build commands:
//! - `source` - Clone and patch the sources
//! - `generate` - Write toolchain and lookup files
//! - `create` - Full cook followed by the test package
//! - `test` - Run the test package against a created package
//!
//! Store:
//! - `store` - Register and list packages

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod store;

pub use store::StoreCommands;

#[derive(Parser)]
#[command(name = "magnum-kitchen")]
#[command(version)]
#[command(about = "Fetch, configure, build and package magnum-integration", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Recipe file (defaults to the built-in magnum-integration recipe)
    #[arg(long, global = true, value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    /// Profile file with [settings], [options] and [dependency_options]
    #[arg(long, global = true, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Override a setting (os, arch, compiler, build_type)
    #[arg(short = 's', long = "setting", global = true, value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Override an option, or a dependency's option with `pkg:name=value`
    #[arg(short = 'o', long = "option", global = true, value_name = "[PKG:]NAME=VALUE")]
    pub options: Vec<String>,

    /// Package store directory
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Work directory for sources and build trees
    #[arg(long, global = true, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Number of parallel build jobs
    #[arg(short = 'j', long, global = true)]
    pub jobs: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show recipe metadata, options with defaults and validation warnings
    Inspect,

    /// Resolve options and requirements for a profile
    Resolve {
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clone and patch the recipe's sources
    Source {
        /// Destination folder
        #[arg(default_value = "source_subfolder")]
        folder: PathBuf,
    },

    /// Write the CMake toolchain and dependency lookup files
    Generate {
        /// Output folder
        #[arg(default_value = "generators")]
        output: PathBuf,
    },

    /// Build and package the recipe, then run its test package
    Create {
        /// Skip the test package
        #[arg(long)]
        no_test: bool,

        /// Keep the build directory after completion
        #[arg(long)]
        keep_builddir: bool,

        /// CMake generator (e.g. Ninja)
        #[arg(short = 'G', long)]
        generator: Option<String>,
    },

    /// Show libraries and link directives consumers need
    Info {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the test package against an already created package
    Test {
        /// CMake generator (e.g. Ninja)
        #[arg(short = 'G', long)]
        generator: Option<String>,
    },

    /// Package store management
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "magnum-kitchen",
            "resolve",
            "--json",
            "-s",
            "os=Windows",
            "-o",
            "shared=True",
            "-o",
            "magnum:shared=True",
        ])
        .unwrap();

        assert_eq!(cli.common.settings, vec!["os=Windows"]);
        assert_eq!(cli.common.options, vec!["shared=True", "magnum:shared=True"]);
        assert!(matches!(cli.command, Some(Commands::Resolve { json: true })));
    }

    #[test]
    fn test_create_flags() {
        let cli = Cli::try_parse_from([
            "magnum-kitchen",
            "--store",
            "/tmp/store",
            "create",
            "--no-test",
            "-G",
            "Ninja",
            "-j",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.common.store, Some(PathBuf::from("/tmp/store")));
        assert_eq!(cli.common.jobs, Some(4));
        match cli.command {
            Some(Commands::Create {
                no_test,
                keep_builddir,
                generator,
            }) => {
                assert!(no_test);
                assert!(!keep_builddir);
                assert_eq!(generator.as_deref(), Some("Ninja"));
            }
            _ => panic!("expected create"),
        }
    }
}
