//! # Category Repository
//!
//! The category taxonomy products are filed under. Categories are created on
//! demand by the resolver and manual import; there is no delete.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository for category reads.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists category names alphabetically.
    pub async fn list(&self) -> DbResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    pub async fn exists(&self, name: &str) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        exists(&mut conn, name).await
    }
}

/// Checks whether a category exists.
pub async fn exists(conn: &mut SqliteConnection, name: &str) -> DbResult<bool> {
    let found: Option<String> = sqlx::query_scalar("SELECT name FROM categories WHERE name = ?1")
        .bind(name)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// Inserts the category if it is missing. Safe under concurrent callers.
pub async fn ensure(conn: &mut SqliteConnection, name: &str) -> DbResult<()> {
    let result = sqlx::query("INSERT OR IGNORE INTO categories (name, created_at) VALUES (?1, ?2)")
        .bind(name)
        .bind(Utc::now())
        .execute(conn)
        .await?;

    if result.rows_affected() > 0 {
        debug!(category = %name, "Created category");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::memory_db;

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let db = memory_db().await;
        let mut conn = db.pool().acquire().await.unwrap();

        ensure(&mut conn, "Consumable").await.unwrap();
        ensure(&mut conn, "Consumable").await.unwrap();
        ensure(&mut conn, "Peripheral").await.unwrap();
        drop(conn);

        let names = db.categories().list().await.unwrap();
        assert_eq!(names, vec!["Consumable".to_string(), "Peripheral".to_string()]);
        assert!(db.categories().exists("Peripheral").await.unwrap());
        assert!(!db.categories().exists("Furniture").await.unwrap());
    }
}
