// src/cli/store.rs

//! Package store subcommands

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Record an existing install prefix as a package
    ///
    /// The package gets the settings of the current profile, unless
    /// --any-settings marks it usable for every configuration
    /// (header-only libraries).
    Register {
        /// Package reference (name/version[@user/channel])
        reference: String,

        /// Install prefix holding include/ and lib/
        prefix: PathBuf,

        /// Requirement of the package (repeatable)
        #[arg(long = "require", value_name = "REFERENCE")]
        requires: Vec<String>,

        /// Option value of the package (repeatable)
        #[arg(long = "package-option", value_name = "NAME=VALUE")]
        options: Vec<String>,

        /// Library to link (repeatable); scanned from the prefix when omitted
        #[arg(long = "lib", value_name = "NAME")]
        libs: Vec<String>,

        /// System library to link (repeatable)
        #[arg(long = "system-lib", value_name = "NAME")]
        system_libs: Vec<String>,

        /// Match every settings combination
        #[arg(long)]
        any_settings: bool,
    },

    /// List packages in the store
    List {
        /// Print the packages as JSON
        #[arg(long)]
        json: bool,
    },
}
