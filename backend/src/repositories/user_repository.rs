//! Database repository for user persistence.
//!
//! Provides create and lookup operations for system users.

use super::UserRepository;
use crate::database::models::User;
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use sqlx::SqlitePool;
use validator::Validate;

const INSERT_USER: &str =
    "INSERT INTO users (email, encrypted_password) VALUES (?, ?) RETURNING id";
const INSERT_USER_WITH_PHONE: &str =
    "INSERT INTO users (email, encrypted_password, phone) VALUES (?, ?, ?) RETURNING id";
const INSERT_TELEGRAM_USER: &str =
    "INSERT INTO users (id_telegram, email, encrypted_password) VALUES (?, ?, ?) RETURNING id";
const INSERT_TELEGRAM_USER_WITH_PHONE: &str = "INSERT INTO users (id_telegram, email, encrypted_password, phone) VALUES (?, ?, ?, ?) RETURNING id";

const SELECT_USER_BY_ID: &str =
    "SELECT id, id_telegram, email, phone, encrypted_password FROM users WHERE id = ?";
const SELECT_USER_BY_EMAIL: &str =
    "SELECT id, id_telegram, email, phone, encrypted_password FROM users WHERE email = ?";
const SELECT_USER_BY_TELEGRAM: &str =
    "SELECT id, id_telegram, email, phone, encrypted_password FROM users WHERE id_telegram = ?";

/// Repository for user database operations.
#[derive(Clone)]
pub struct SqlUserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl SqlUserRepository {
    /// Creates a new SqlUserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Runs the insert variant matching the optional columns set on `user`.
    async fn insert(&self, user: &User) -> Result<i64, sqlx::Error> {
        let query = match (user.id_telegram, user.phone.as_deref()) {
            (None, None) => sqlx::query_scalar::<_, i64>(INSERT_USER)
                .bind(&user.email)
                .bind(&user.encrypted_password),
            (None, Some(phone)) => sqlx::query_scalar::<_, i64>(INSERT_USER_WITH_PHONE)
                .bind(&user.email)
                .bind(&user.encrypted_password)
                .bind(phone),
            (Some(id_telegram), None) => sqlx::query_scalar::<_, i64>(INSERT_TELEGRAM_USER)
                .bind(id_telegram)
                .bind(&user.email)
                .bind(&user.encrypted_password),
            (Some(id_telegram), Some(phone)) => {
                sqlx::query_scalar::<_, i64>(INSERT_TELEGRAM_USER_WITH_PHONE)
                    .bind(id_telegram)
                    .bind(&user.email)
                    .bind(&user.encrypted_password)
                    .bind(phone)
            }
        };

        query.fetch_one(&self.pool).await
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn create(&self, user: &mut User) -> StoreResult<()> {
        user.validate()?;
        user.prepare_for_storage()?;

        user.id = self.insert(user).await.map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                tracing::warn!("User insert rejected: {}", db_err.message());
                StoreError::Conflict("user".to_string())
            }
            other => StoreError::Database(other),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        sqlx::query_as::<_, User>(SELECT_USER_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(SELECT_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_external_id(&self, id_telegram: i64) -> StoreResult<User> {
        sqlx::query_as::<_, User>(SELECT_USER_BY_TELEGRAM)
            .bind(id_telegram)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
