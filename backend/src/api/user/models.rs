//! Request payloads for user registration.

use serde::Deserialize;

/// Registration payload
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub phone: Option<String>,
}
