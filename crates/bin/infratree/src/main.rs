//! # infratree: operator CLI
//!
//! Composition root that wires the `SQLite` document store into the
//! hierarchy engine and runs one subcommand.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize logging to stderr
//! - Open the `SQLite` pool and run migrations
//! - Construct the engine services over the store
//! - Print the command result as pretty JSON on stdout
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use infratree_adapter_storage_sqlite_sqlx::Config as StorageConfig;
use infratree_domain::error::{ErrorKind, InfraTreeError};

use crate::commands::{Command, Engine};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "infratree")]
#[command(version, about = "Manage a data-center infrastructure hierarchy", long_about = None)]
struct Cli {
    /// Configuration file; missing files fall back to defaults.
    #[arg(long, global = true, default_value = config::DEFAULT_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:#}", anyhow::Error::from(err));
            return ExitCode::from(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<String> {
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .map_err(InfraTreeError::from)?;

    let engine = Engine::new(db.document_store(), config.validation);
    let result = engine.execute(command).await;
    db.close().await;

    Ok(serde_json::to_string_pretty(&result?)?)
}

/// Engine failures print their sentinel and detail; anything else prints
/// its context chain.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<InfraTreeError>() {
        Some(engine) => {
            if engine.kind() == ErrorKind::Internal {
                tracing::error!(error = %engine, "storage failure");
                eprintln!("{engine}");
            } else {
                eprintln!("{engine}: {}", engine.detail());
            }
        }
        None => eprintln!("{err:#}"),
    }
}
