//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, bind address, session signing key and which user store
//! backs the server.

use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;

/// Which `UserRepository` implementation the server is composed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sql" | "sqlite" => Ok(StoreBackend::Sql),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown store backend: {}", other),
        }
    }
}

/// Longest session lifetime accepted, 400 days.
pub const MAX_SESSION_MAX_AGE_SECONDS: u64 = 400 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub session_key: String,
    pub session_max_age_seconds: u64,
    pub bind_addr: String,
    pub log_level: String,
    pub domain_url: String,
    pub store_backend: StoreBackend,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = var_or("DATABASE_URL", "sqlite://apiserver.db?mode=rwc");

        let max_connections = var_or("DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = var_or("DB_ACQUIRE_TIMEOUT_SECONDS", "3")
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let session_key = lookup("SESSION_KEY").context("SESSION_KEY not set")?;
        if session_key.is_empty() {
            bail!("SESSION_KEY must not be empty");
        }

        let session_max_age_seconds = var_or("SESSION_MAX_AGE_SECONDS", "86400")
            .parse::<u64>()
            .context("SESSION_MAX_AGE_SECONDS must be a valid number")?;
        if session_max_age_seconds > MAX_SESSION_MAX_AGE_SECONDS {
            bail!(
                "SESSION_MAX_AGE_SECONDS must not exceed {}",
                MAX_SESSION_MAX_AGE_SECONDS
            );
        }

        let bind_addr = var_or("BIND_ADDR", "0.0.0.0:8080");
        let log_level = var_or("LOG_LEVEL", "debug");
        let domain_url = var_or("DOMAIN_URL", "http://localhost:8080")
            .trim_end_matches('/')
            .to_string();

        let store_backend = var_or("STORE_BACKEND", "sql")
            .parse::<StoreBackend>()
            .context("STORE_BACKEND must be either `sql` or `memory`")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            session_key,
            session_max_age_seconds,
            bind_addr,
            log_level,
            domain_url,
            store_backend,
        })
    }
}
