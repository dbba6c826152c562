//! HTTP surface of the server.
//!
//! `router` merges the registration and authentication routes and wraps them
//! in the request pipeline. Stages listed first in the `ServiceBuilder` run
//! first on the way in and last on the way out:
//!
//! 1. request id
//! 2. request logging
//! 3. CORS
//! 4. shared state
//!
//! The authentication gate is not part of this pipeline; it is layered onto
//! the private routes only (see `auth::routes`).

use crate::auth;
use crate::auth::session::SessionManager;
use crate::repositories::UserRepository;
use axum::{Extension, Router, middleware::from_fn};
use std::sync::Arc;
use tower::ServiceBuilder;

pub mod common;
pub mod context;
pub mod middleware;
pub mod user;


/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionManager>,
    /// Base URL redirects are built from, without trailing slash.
    pub domain_url: String,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionManager>,
        domain_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            sessions,
            domain_url: domain_url.into(),
        }
    }
}

/// Builds the application router with its middleware pipeline.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(user::routes::user_router())
        .merge(auth::routes::auth_router())
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::set_request_id))
                .layer(from_fn(middleware::log_request))
                .layer(middleware::cors_layer())
                .layer(Extension(state)),
        )
}
