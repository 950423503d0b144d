use rust_embed::RustEmbed;
use sqlx::PgPool;
use tracing::info;

use crate::error::{Result, StoreError};

#[derive(RustEmbed)]
#[folder = "schema/"]
struct SchemaAssets;

const BUILD_ORDER: &str = "00_build_order.sql";

/// Reads the build order and applies all SQL files in a single transaction.
pub async fn rebuild_database(pool: &PgPool) -> Result<()> {
    let script = assemble_script()?;

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(&script).execute(&mut *tx).await?;
    tx.commit().await?;

    Ok(())
}

/// Drops every table in the public schema. Irreversible.
pub async fn reset_database(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql("DROP SCHEMA public CASCADE; CREATE SCHEMA public;")
        .execute(pool)
        .await?;
    Ok(())
}

/// Expands the build order manifest into one script.
pub fn assemble_script() -> Result<String> {
    let manifest = get_file_content(BUILD_ORDER)?;
    let mut full_script = String::new();

    for line in manifest.lines() {
        let trimmed = line.trim();

        // Parse: -- @include folder/file.sql
        if let Some(path) = parse_include_directive(trimmed) {
            info!(file = path, "including schema file");
            full_script.push_str(&get_file_content(path)?);
            full_script.push('\n');
        } else if !trimmed.starts_with("--") {
            full_script.push_str(line);
            full_script.push('\n');
        }
    }

    Ok(full_script)
}

fn get_file_content(path: &str) -> Result<String> {
    let file = SchemaAssets::get(path)
        .ok_or_else(|| StoreError::Schema(format!("missing schema file: {path}")))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| StoreError::Schema(format!("{path} is not UTF-8: {e}")))
}

fn parse_include_directive(line: &str) -> Option<&str> {
    if line.starts_with("--") && line.contains("@include") {
        line.split_whitespace().last()
    } else {
        None
    }
}
