use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use portal_cli::commands;
use portal_cli::config::Config;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Operator tools for the municipal portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the database schema from embedded assets
    Rebuild(commands::rebuild::RebuildArgs),

    /// Validate a JSON file of form fields against the intake rules
    Validate(commands::validate::ValidateArgs),

    /// Show the status of an anonymous complaint
    Lookup(commands::lookup::LookupArgs),

    /// Register a department that submissions can be routed to
    AddDepartment(commands::add_department::AddDepartmentArgs),
}

async fn connect(config: &Config) -> Result<PgPool> {
    Ok(PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => {
            // Pure logic: no database, no config.
            if !commands::validate::execute(args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Rebuild(args) => {
            let config = Config::from_env()?;
            let pool = connect(&config).await?;
            commands::rebuild::execute(pool, args).await?;
        }
        Commands::Lookup(args) => {
            let config = Config::from_env()?;
            let pool = connect(&config).await?;
            commands::lookup::execute(pool, config, args).await?;
        }
        Commands::AddDepartment(args) => {
            let config = Config::from_env()?;
            let pool = connect(&config).await?;
            commands::add_department::execute(pool, args).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
