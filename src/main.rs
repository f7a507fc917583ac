// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands, StoreCommands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let common = &cli.common;

    match cli.command {
        Some(Commands::Inspect) => commands::cmd_inspect(common),
        Some(Commands::Resolve { json }) => commands::cmd_resolve(common, json),
        Some(Commands::Source { folder }) => commands::cmd_source(common, &folder),
        Some(Commands::Generate { output }) => commands::cmd_generate(common, &output),
        Some(Commands::Create {
            no_test,
            keep_builddir,
            generator,
        }) => commands::cmd_create(common, no_test, keep_builddir, generator),
        Some(Commands::Info { json }) => commands::cmd_info(common, json),
        Some(Commands::Test { generator }) => commands::cmd_test(common, generator),
        Some(Commands::Store { command }) => match command {
            StoreCommands::Register {
                reference,
                prefix,
                requires,
                options,
                libs,
                system_libs,
                any_settings,
            } => commands::cmd_store_register(
                common,
                commands::RegisterArgs {
                    reference: &reference,
                    prefix: &prefix,
                    requires: &requires,
                    options: &options,
                    libs: &libs,
                    system_libs: &system_libs,
                    any_settings,
                },
            ),
            StoreCommands::List { json } => commands::cmd_store_list(common, json),
        },
        Some(Commands::Completions { shell }) => commands::cmd_completions(shell),
        None => {
            // No command provided, show help
            println!("magnum-kitchen v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'magnum-kitchen --help' for usage information");
            Ok(())
        }
    }
}
