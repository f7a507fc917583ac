// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: JSON output
fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print machine-readable JSON")
}

/// Common argument: CMake generator
fn generator_arg() -> Arg {
    Arg::new("generator")
        .short('G')
        .long("generator")
        .value_name("NAME")
        .help("CMake generator (e.g. Ninja)")
}

fn build_cli() -> Command {
    Command::new("magnum-kitchen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetch, configure, build and package magnum-integration")
        .subcommand_required(false)
        .arg(
            Arg::new("recipe")
                .long("recipe")
                .value_name("PATH")
                .global(true)
                .help("Recipe file (defaults to the built-in magnum-integration recipe)"),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("PATH")
                .global(true)
                .help("Profile file with [settings], [options] and [dependency_options]"),
        )
        .arg(
            Arg::new("setting")
                .short('s')
                .long("setting")
                .value_name("KEY=VALUE")
                .action(ArgAction::Append)
                .global(true)
                .help("Override a setting (os, arch, compiler, build_type)"),
        )
        .arg(
            Arg::new("option")
                .short('o')
                .long("option")
                .value_name("[PKG:]NAME=VALUE")
                .action(ArgAction::Append)
                .global(true)
                .help("Override an option, or a dependency's option"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("DIR")
                .global(true)
                .help("Package store directory (env: MAGNUM_KITCHEN_STORE)"),
        )
        .arg(
            Arg::new("workdir")
                .long("workdir")
                .value_name("DIR")
                .global(true)
                .help("Work directory for sources and build trees (env: MAGNUM_KITCHEN_WORKDIR)"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("N")
                .global(true)
                .help("Number of parallel build jobs (env: MAGNUM_KITCHEN_JOBS)"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show recipe metadata, options with defaults and validation warnings"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve options and requirements for a profile")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("source")
                .about("Clone and patch the recipe's sources")
                .arg(Arg::new("folder").default_value("source_subfolder").help("Destination folder")),
        )
        .subcommand(
            Command::new("generate")
                .about("Write the CMake toolchain and dependency lookup files")
                .arg(Arg::new("output").default_value("generators").help("Output folder")),
        )
        .subcommand(
            Command::new("create")
                .about("Build and package the recipe, then run its test package")
                .arg(
                    Arg::new("no_test")
                        .long("no-test")
                        .action(ArgAction::SetTrue)
                        .help("Skip the test package"),
                )
                .arg(
                    Arg::new("keep_builddir")
                        .long("keep-builddir")
                        .action(ArgAction::SetTrue)
                        .help("Keep the build directory after completion"),
                )
                .arg(generator_arg()),
        )
        .subcommand(
            Command::new("info")
                .about("Show libraries and link directives consumers need")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("test")
                .about("Run the test package against an already created package")
                .arg(generator_arg()),
        )
        .subcommand(
            Command::new("store")
                .about("Package store management")
                .subcommand(
                    Command::new("register")
                        .about("Record an existing install prefix as a package")
                        .arg(Arg::new("reference").required(true).help("name/version[@user/channel]"))
                        .arg(Arg::new("prefix").required(true).help("Install prefix"))
                        .arg(
                            Arg::new("require")
                                .long("require")
                                .action(ArgAction::Append)
                                .help("Requirement of the package"),
                        )
                        .arg(
                            Arg::new("package_option")
                                .long("package-option")
                                .action(ArgAction::Append)
                                .help("Option value of the package"),
                        )
                        .arg(
                            Arg::new("lib")
                                .long("lib")
                                .action(ArgAction::Append)
                                .help("Library to link"),
                        )
                        .arg(
                            Arg::new("system_lib")
                                .long("system-lib")
                                .action(ArgAction::Append)
                                .help("System library to link"),
                        )
                        .arg(
                            Arg::new("any_settings")
                                .long("any-settings")
                                .action(ArgAction::SetTrue)
                                .help("Match every settings combination"),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .about("List packages in the store")
                        .arg(json_arg()),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("bash, zsh, fish, elvish or powershell")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("magnum-kitchen.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
