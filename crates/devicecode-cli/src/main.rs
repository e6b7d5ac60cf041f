//! DeviceCode CLI - build, reconcile and search device wiki records.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build {
            input,
            origin,
            output,
            reference,
            sequential,
            skip_helper_pages,
            report_stale,
        } => commands::build::run(
            commands::build::BuildArgs {
                input,
                origin,
                output,
                reference,
                sequential,
                skip_helper_pages,
                report_stale,
            },
            cli.verbose,
        ),

        Commands::Search {
            directory,
            filter,
            strict,
            no_overlays,
            format,
        } => commands::search::run(directory, filter, strict, no_overlays, format, cli.verbose),

        Commands::Reconcile {
            directory,
            json,
            squash,
        } => commands::reconcile::run(directory, json, squash, cli.verbose),

        Commands::Dump {
            directory,
            value,
            format,
        } => commands::dump::run(directory, value, format, cli.verbose),

        Commands::Nearest { directory, model } => {
            commands::nearest::run(directory, model, cli.verbose)
        }

        Commands::Lint { directory, kind } => commands::lint::run(directory, kind, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
