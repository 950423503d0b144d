use anyhow::Result;
use clap::Args;
use portal_db::schema::{rebuild_database, reset_database};
use sqlx::PgPool;

#[derive(Debug, Args)]
pub struct RebuildArgs {
    /// DANGER: drop every table (and its data) before rebuilding
    #[arg(long)]
    pub reset: bool,
}

pub async fn execute(pool: PgPool, args: RebuildArgs) -> Result<()> {
    println!("🏗️  Rebuilding portal schema...");

    if args.reset {
        println!("🔥 Reset requested. Dropping public schema...");
        reset_database(&pool).await?;
    }

    rebuild_database(&pool).await?;

    println!("✅ Schema applied: departments, complaints, anonymous_complaints, feedback, attachments.");
    Ok(())
}
