use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Args;
use portal_core::{ReferenceNumber, VerificationCode};
use portal_db::PgRecordStore;
use portal_service::{IntakeOptions, IntakeService, MemoryAttachmentStore};
use sqlx::PgPool;

use crate::config::Config;

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Reference number, e.g. ANO-4821-AB
    #[arg(short, long)]
    pub reference: String,

    /// The verification code chosen when the complaint was filed
    #[arg(short, long)]
    pub code: String,
}

/// Trims both values the way the web form does before they are checked.
fn parse_args(args: &LookupArgs) -> Result<(ReferenceNumber, VerificationCode)> {
    let raw_reference = args.reference.trim();
    let reference = ReferenceNumber::parse(raw_reference)
        .ok_or_else(|| anyhow!("'{raw_reference}' is not a reference number (ANO-1234-AB)"))?;

    let code = args.code.trim();
    if code.is_empty() {
        return Err(anyhow!("the verification code must not be empty"));
    }
    Ok((reference, VerificationCode::new(code)))
}

pub async fn execute(pool: PgPool, config: Config, args: LookupArgs) -> Result<()> {
    let (reference, code) = parse_args(&args)?;

    // Lookups never touch attachments.
    let intake = IntakeService::new(
        Arc::new(PgRecordStore::new(pool)),
        Arc::new(MemoryAttachmentStore::new()),
        IntakeOptions {
            backend_timeout: config.backend_timeout,
            ..IntakeOptions::default()
        },
    );

    println!("🔎 Looking up {reference}...");
    match intake
        .lookup_anonymous(&reference, &code)
        .await?
    {
        Some(found) => {
            println!("✅ Found.");
            println!("   Status:    {}", found.status);
            if let Some(category) = found.category {
                println!("   Category:  {category}");
            }
            if let Some(submitted_at) = found.submitted_at {
                println!("   Submitted: {submitted_at}");
            }
        }
        None => println!("❌ No complaint matches that reference number and verification code."),
    }
    Ok(())
}
