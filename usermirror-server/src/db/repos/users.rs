//! SQL store accessor over a MariaDB/MySQL pool
//!
//! Statements match the reference `Users` table:
//! - insert: one row per call, duplicates left to the store's constraints
//! - list: store-native order
//! - delete: whole table

use async_trait::async_trait;
use sqlx::mysql::MySql;
use sqlx::pool::PoolConnection;
use sqlx::MySqlPool;

use super::UserStore;
use crate::config::StoreConfig;
use crate::db::{create_pool, PoolStatus, StoreError};
use crate::models::{StoreRole, Username};

/// Store accessor backed by a sqlx pool.
#[derive(Debug, Clone)]
pub struct SqlStore {
    role: StoreRole,
    pool: MySqlPool,
}

impl SqlStore {
    pub fn new(role: StoreRole, pool: MySqlPool) -> Self {
        Self { role, pool }
    }

    /// Build the store with a lazily-connecting pool.
    pub fn from_config(role: StoreRole, config: &StoreConfig) -> Self {
        Self::new(role, create_pool(role, config))
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// The returned connection goes back to the pool when dropped.
    async fn checkout(&self) -> Result<PoolConnection<MySql>, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| StoreError::from_sqlx(self.role, e))
    }
}

#[async_trait]
impl UserStore for SqlStore {
    fn role(&self) -> StoreRole {
        self.role
    }

    async fn insert_username(&self, name: &Username) -> Result<(), StoreError> {
        let mut conn = self.checkout().await?;
        sqlx::query("INSERT INTO Users (username) VALUES (?)")
            .bind(name.as_str())
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::from_sqlx(self.role, e))?;
        Ok(())
    }

    async fn list_usernames(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.checkout().await?;
        sqlx::query_scalar::<_, String>("SELECT username FROM Users")
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| StoreError::from_sqlx(self.role, e))
    }

    async fn delete_all_usernames(&self) -> Result<(), StoreError> {
        let mut conn = self.checkout().await?;
        sqlx::query("DELETE FROM Users")
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::from_sqlx(self.role, e))?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.checkout().await?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::from_sqlx(self.role, e))?;
        Ok(())
    }

    fn pool_status(&self) -> PoolStatus {
        PoolStatus::of(&self.pool)
    }
}
