//! Handler functions for user registration.

use super::models::CreateUserRequest;
use crate::api::AppState;
use crate::api::common::json_rejection;
use crate::database::models::{User, check_password_strength};
use crate::errors::{ApiError, ERR_CONFIRM_PASSWORD_REQUIRED, ERR_EASY_PASSWORD};
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::StatusCode,
};

/// Registers a user with email and password.
#[axum::debug_handler]
pub async fn create_user(
    Extension(state): Extension<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(payload) = payload.map_err(json_rejection)?;

    if payload.confirm_password != payload.password {
        return Err(ApiError::validation(ERR_CONFIRM_PASSWORD_REQUIRED));
    }

    if !check_password_strength(&payload.password) {
        return Err(ApiError::validation(ERR_EASY_PASSWORD));
    }

    let mut user = User {
        phone: payload.phone.filter(|phone| !phone.is_empty()),
        ..User::with_email(payload.email, payload.password)
    };

    state.users.create(&mut user).await.map_err(|e| {
        tracing::warn!("User registration failed: {}", e);
        ApiError::unprocessable(e.to_string())
    })?;

    tracing::info!("Registered user {}", user.id);
    user.sanitize();
    Ok((StatusCode::CREATED, Json(user)))
}
