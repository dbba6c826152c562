//! In-process user store for tests and database-less runs.

use super::UserRepository;
use crate::database::models::User;
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use validator::Validate;

/// Keeps users in a map keyed by id.
///
/// Ids are assigned as `len + 1`, which only stays unique because users are
/// never removed.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<i64, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &mut User) -> StoreResult<()> {
        user.validate()?;
        user.prepare_for_storage()?;

        let mut users = self.users.lock().await;

        let taken = users.values().any(|existing| {
            (user.email.is_some() && existing.email == user.email)
                || (user.id_telegram.is_some() && existing.id_telegram == user.id_telegram)
        });
        if taken {
            return Err(StoreError::Conflict("user".to_string()));
        }

        user.id = users.len() as i64 + 1;
        users.insert(
            user.id,
            User {
                password: String::new(),
                ..user.clone()
            },
        );

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        self.users
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        self.users
            .lock()
            .await
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_external_id(&self, id_telegram: i64) -> StoreResult<User> {
        self.users
            .lock()
            .await
            .values()
            .find(|u| u.id_telegram == Some(id_telegram))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
