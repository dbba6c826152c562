//! Handler functions for authentication-related API endpoints.
//!
//! These functions decode the request payload, delegate to `AuthService` and
//! attach a fresh session to the response.

use crate::api::AppState;
use crate::api::common::json_rejection;
use crate::api::context::RequestContext;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::database::models::User;
use crate::errors::ApiError;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CONTENT_TYPE, LOCATION},
    },
    response::{IntoResponse, Response},
};

/// Path of the private landing page Telegram sign-ins are redirected to.
const PRIVATE_MAIN_PATH: &str = "/private/main";

/// Handle email/password login request
#[axum::debug_handler]
pub async fn create_session(
    Extension(state): Extension<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(json_rejection)?;

    let user = AuthService::new(state.users.as_ref())
        .login(&payload)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    state.sessions.issue_session(&mut headers, &user)?;

    tracing::info!("User {} logged in", user.id);
    Ok((StatusCode::OK, headers).into_response())
}

/// Handle Telegram sign-in: log the user in, registering them if needed.
#[axum::debug_handler]
pub async fn telegram_check(
    Extension(state): Extension<AppState>,
    payload: Result<Json<TelegramCheckRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(json_rejection)?;

    let user = AuthService::new(state.users.as_ref())
        .telegram_sign_in(&payload)
        .await?;

    let location = format!("{}{}", state.domain_url, PRIVATE_MAIN_PATH);
    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&location)
            .map_err(|e| ApiError::internal(format!("invalid redirect location: {}", e)))?,
    );
    state.sessions.issue_session(&mut headers, &user)?;

    Ok((StatusCode::FOUND, headers).into_response())
}

/// Get the user the session belongs to.
#[axum::debug_handler]
pub async fn whoami(Extension(context): Extension<RequestContext>) -> Result<Json<User>, ApiError> {
    context
        .user
        .map(Json)
        .ok_or_else(ApiError::not_authenticated)
}
