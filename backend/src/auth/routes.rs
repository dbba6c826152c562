//! Defines the HTTP routes specifically for authentication.
//!
//! Session creation and Telegram sign-in are public; everything under
//! `/private` sits behind the authentication gate.

use crate::auth::handlers::*;
use crate::auth::middleware::authenticate_user;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/telegram/check", post(telegram_check))
        .nest("/private", private_router())
}

/// Routes reachable only with a valid session.
pub fn private_router() -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .route_layer(middleware::from_fn(authenticate_user))
}
