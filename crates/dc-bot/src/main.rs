use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dc_bot::adapters::ConsoleTransport;
use dc_bot::commands::{build_engine, chat, job, leaderboard, stats, users};
use dc_bot::{Cli, Commands, Config, scheduler};
use dc_core::UserId;
use tracing_subscriber::EnvFilter;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(dc_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = dc_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so they never mix with the console transport.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Some(Commands::Chat {
            user,
            name,
            handle,
            schedule,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let speaker = chat::Speaker {
                user: UserId::new(user).context("invalid user id")?,
                name,
                handle,
            };
            let engine = Arc::new(build_engine(
                &config,
                db,
                Arc::new(ConsoleTransport::new(io::stdout())),
            )?);
            let jobs = if schedule {
                scheduler::spawn(
                    Arc::clone(&engine),
                    config.schedule.entries()?,
                    config.tz()?,
                )
            } else {
                Vec::new()
            };
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            chat::run(&engine, &speaker, stdin, &mut io::stderr()).await?;
            for handle in jobs {
                handle.abort();
            }
        }
        Some(Commands::Job { job: which }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let engine = build_engine(&config, db, Arc::new(ConsoleTransport::new(io::stdout())))?;
            job::run(&mut io::stderr(), &engine, which).await?;
        }
        Some(Commands::Users { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            users::run(&mut io::stdout(), &db, json)?;
        }
        Some(Commands::Stats) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            stats::run(&mut io::stdout(), &db)?;
        }
        Some(Commands::Leaderboard) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            leaderboard::run(&mut io::stdout(), &db)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
