//! User storage.
//!
//! `UserRepository` is the capability the handlers and the authentication
//! gate depend on. `SqlUserRepository` persists users in the database and
//! `MemoryUserRepository` keeps them in process for tests and local runs.

use crate::database::models::User;
use crate::errors::StoreResult;
use async_trait::async_trait;

pub mod memory_user_repository;
pub mod user_repository;

pub use memory_user_repository::MemoryUserRepository;
pub use user_repository::SqlUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Validates, hashes and stores `user`, writing the assigned id back.
    ///
    /// Nothing is stored when validation or hashing fails.
    async fn create(&self, user: &mut User) -> StoreResult<()>;

    async fn find_by_id(&self, id: i64) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str) -> StoreResult<User>;

    async fn find_by_external_id(&self, id_telegram: i64) -> StoreResult<User>;
}
