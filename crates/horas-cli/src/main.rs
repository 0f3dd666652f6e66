use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use horas_cli::commands::{delete, edit, list, register, report};
use horas_cli::{Cli, Commands, Config};

/// Load config and open the database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<horas_db::Database> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    horas_db::Database::open(&config.database_path).context("failed to open database")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Register {
            worker,
            date,
            site,
            task,
            segments,
            regularize,
            extra,
            extra_description,
        }) => {
            let mut db = open_database(cli.config.as_deref())?;
            register::run(
                &mut db,
                worker,
                date,
                *site,
                *task,
                segments,
                regularize.as_deref(),
                extra.as_deref(),
                extra_description.as_deref(),
            )?;
        }
        Some(Commands::Edit {
            id,
            segment,
            regularize,
            date,
            site,
            task,
            extra,
            extra_description,
            clear_extra,
        }) => {
            let mut db = open_database(cli.config.as_deref())?;
            edit::run(
                &mut db,
                *id,
                segment.as_deref(),
                regularize.as_deref(),
                date.as_deref(),
                *site,
                *task,
                extra.as_deref(),
                extra_description.as_deref(),
                *clear_extra,
            )?;
        }
        Some(Commands::Delete { id }) => {
            let db = open_database(cli.config.as_deref())?;
            delete::run(&db, *id)?;
        }
        Some(Commands::List {
            worker,
            date,
            from,
            to,
            site,
            task,
            json,
        }) => {
            let db = open_database(cli.config.as_deref())?;
            list::run(
                &db,
                worker.as_deref(),
                date.as_deref(),
                from.as_deref(),
                to.as_deref(),
                *site,
                *task,
                *json,
            )?;
        }
        Some(Commands::Report {
            month,
            from,
            to,
            worker,
            by_task,
            by_site,
            json,
        }) => {
            let db = open_database(cli.config.as_deref())?;
            report::run(
                &db,
                month.as_deref(),
                from.as_deref(),
                to.as_deref(),
                worker.as_deref(),
                *by_task,
                *by_site,
                *json,
            )?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
