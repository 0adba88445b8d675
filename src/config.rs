use std::num::NonZeroU32;

use anyhow::{Context, Result};

/// `DATABASE_URL` value selecting the non-durable in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite URL (`sqlite://data/solar.db`) or `memory`.
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    /// Rows rendered on the dashboard page.
    pub dashboard_limit: NonZeroU32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: optional("DATABASE_URL", "sqlite://data/solar.db"),
            db_max_connections: optional("DB_MAX_CONNECTIONS", "5")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "5000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            dashboard_limit: parse_positive(&optional("DASHBOARD_LIMIT", "50"))
                .context("DASHBOARD_LIMIT must be a positive integer")?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.eq_ignore_ascii_case(MEMORY_DATABASE_URL)
    }
}

fn parse_positive(raw: &str) -> Result<NonZeroU32> {
    let n: u32 = raw.trim().parse()?;
    NonZeroU32::new(n).context("value must be greater than zero")
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
