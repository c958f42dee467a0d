//! Schema bootstrap for the `Users` table

use sqlx::MySqlPool;

use super::StoreError;
use crate::models::StoreRole;

/// Create the `Users` table if it does not exist.
pub async fn ensure(role: StoreRole, pool: &MySqlPool) -> Result<(), StoreError> {
    tracing::info!(which_store = %role, "ensuring Users table");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Users (
            id INT AUTO_INCREMENT PRIMARY KEY,
            username VARCHAR(255) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_sqlx(role, e))?;

    Ok(())
}
