//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::database::models::User;
use crate::errors::{ApiError, ERR_INCORRECT_EMAIL_OR_PASSWORD, StoreError};
use crate::repositories::UserRepository;

/// Authentication service resolving credentials to users.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(users: &'a dyn UserRepository) -> Self {
        AuthService { users }
    }

    /// Authenticate a user by email and password.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn login(&self, login_request: &LoginRequest) -> Result<User, ApiError> {
        match self.users.find_by_email(&login_request.email).await {
            Ok(user) if user.compare_password(&login_request.password) => Ok(user),
            Ok(_) => Err(ApiError::unauthenticated(ERR_INCORRECT_EMAIL_OR_PASSWORD)),
            Err(e) => {
                if !matches!(e, StoreError::NotFound) {
                    tracing::error!("Login lookup failed: {}", e);
                }
                Err(ApiError::unauthenticated(ERR_INCORRECT_EMAIL_OR_PASSWORD))
            }
        }
    }

    /// Finds the user owning a Telegram id, registering them on first sight.
    pub async fn telegram_sign_in(&self, request: &TelegramCheckRequest) -> Result<User, ApiError> {
        match self.users.find_by_external_id(request.id_telegram).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => {
                let mut user = User::with_telegram(request.id_telegram);
                self.users.create(&mut user).await.map_err(|e| {
                    tracing::warn!("Telegram user creation failed: {}", e);
                    ApiError::unprocessable(e.to_string())
                })?;
                tracing::info!("Registered Telegram user {}", user.id);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Telegram lookup failed: {}", e);
                Err(ApiError::internal(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::test_user;
    use crate::repositories::MemoryUserRepository;

    #[tokio::test]
    async fn test_login() {
        let repo = MemoryUserRepository::new();
        repo.create(&mut test_user()).await.unwrap();
        let service = AuthService::new(&repo);

        let request = LoginRequest {
            email: "user@example.org".to_string(),
            password: "password".to_string(),
        };
        let user = service.login(&request).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("user@example.org"));

        for (email, password) in [("user@example.org", "wrong"), ("nobody@example.org", "password")] {
            let request = LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            };
            let err = service.login(&request).await.unwrap_err();
            assert!(matches!(err, ApiError::Unauthenticated { .. }));
            assert_eq!(err.to_string(), ERR_INCORRECT_EMAIL_OR_PASSWORD);
        }
    }

    #[tokio::test]
    async fn test_telegram_sign_in_creates_once() {
        let repo = MemoryUserRepository::new();
        let service = AuthService::new(&repo);
        let request = TelegramCheckRequest { id_telegram: 555 };

        let first = service.telegram_sign_in(&request).await.unwrap();
        assert!(first.id > 0);
        assert_eq!(first.email, None);
        assert!(first.encrypted_password.is_none());

        let second = service.telegram_sign_in(&request).await.unwrap();
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_telegram_sign_in_rejects_negative_id() {
        let repo = MemoryUserRepository::new();
        let service = AuthService::new(&repo);
        let err = service
            .telegram_sign_in(&TelegramCheckRequest { id_telegram: -5 })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable { .. }));
    }
}
