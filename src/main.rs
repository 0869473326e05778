mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v; logs go to stderr so stdout stays JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ok = match cli.command {
        Commands::Show {
            source,
            query,
            get,
            output_type,
        } => commands::show(&source, &query, get.as_deref(), output_type).map(|()| true),
        Commands::Check { source } => commands::check(&source),
        Commands::Sections { source } => commands::sections(&source).map(|()| true),
        Commands::Render {
            source,
            annotated,
            enable,
        } => commands::render(&source, annotated, &enable).map(|()| true),
        Commands::Profiles { profiles } => commands::profiles(&profiles).map(|()| true),
        Commands::Install {
            source,
            profiles,
            dry_run,
            no_backup,
        } => commands::install(&source, &profiles, dry_run, no_backup),
        Commands::Drift { source, profiles } => commands::drift(&source, &profiles),
    }?;

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
