use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub backend_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend_timeout = match var("PORTAL_BACKEND_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("PORTAL_BACKEND_TIMEOUT_SECS is not a number: {raw}"))?;
                if secs == 0 {
                    return Err(anyhow!("PORTAL_BACKEND_TIMEOUT_SECS must be greater than zero"));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Config {
            database_url: var("DATABASE_URL").context("DATABASE_URL must be set")?,
            backend_timeout,
        })
    }
}
