//! Main entry point for the API server.
//!
//! This file loads the configuration, initializes logging, composes the user
//! repository and session manager, and serves the Axum router.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;

use crate::api::AppState;
use crate::auth::session::CookieSessionManager;
use crate::repositories::{MemoryUserRepository, SqlUserRepository, UserRepository};
use anyhow::{Context, Result};
use config::{Config, StoreBackend};
use database::Database;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    let users: Arc<dyn UserRepository> = match config.store_backend {
        StoreBackend::Sql => {
            let db = Database::new(&config).await?;
            db.migrate().await?;
            Arc::new(SqlUserRepository::new(db.pool().clone()))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory user store; users are lost on restart");
            Arc::new(MemoryUserRepository::new())
        }
    };
    let sessions = Arc::new(CookieSessionManager::from_config(&config));

    let app = api::router(AppState::new(users, sessions, config.domain_url.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("Starting API server on {}", config.bind_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = log_level.parse::<Level>().unwrap_or(Level::DEBUG);
    tracing_subscriber::fmt().with_max_level(level).init();
}
