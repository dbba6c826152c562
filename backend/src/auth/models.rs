//! Request payloads for the authentication endpoints.

use serde::Deserialize;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-in through the Telegram login widget.
#[derive(Debug, Deserialize)]
pub struct TelegramCheckRequest {
    pub id_telegram: i64,
}
