//! # Business Repository
//!
//! Database operations for businesses (tenants).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caja_core::Business;

/// Repository for business database operations.
#[derive(Debug, Clone)]
pub struct BusinessRepository {
    pool: SqlitePool,
}

impl BusinessRepository {
    /// Creates a new BusinessRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BusinessRepository { pool }
    }

    /// Gets a business by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Business>> {
        let business = sqlx::query_as::<_, Business>(
            r#"
            SELECT id, name, address, currency, tax_rate_bps, created_at, updated_at
            FROM businesses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    /// Inserts a new business.
    pub async fn insert(&self, business: &Business) -> DbResult<()> {
        debug!(id = %business.id, name = %business.name, "Inserting business");

        sqlx::query(
            r#"
            INSERT INTO businesses (id, name, address, currency, tax_rate_bps, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&business.id)
        .bind(&business.name)
        .bind(&business.address)
        .bind(&business.currency)
        .bind(business.tax_rate_bps)
        .bind(business.created_at)
        .bind(business.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing business (name, address, currency, tax rate).
    pub async fn update(&self, business: &Business) -> DbResult<()> {
        debug!(id = %business.id, "Updating business");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE businesses SET
                name = ?2,
                address = ?3,
                currency = ?4,
                tax_rate_bps = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&business.id)
        .bind(&business.name)
        .bind(&business.address)
        .bind(&business.currency)
        .bind(business.tax_rate_bps)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Business", &business.id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_db;
    use caja_core::DEFAULT_CURRENCY;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_insert_get_update() {
        let db = test_db().await;
        let repo = db.businesses();
        let now = Utc::now();

        let mut business = Business {
            id: Uuid::new_v4().to_string(),
            name: "Kiosco Centro".to_string(),
            address: None,
            currency: DEFAULT_CURRENCY.to_string(),
            tax_rate_bps: 2100,
            created_at: now,
            updated_at: now,
        };
        repo.insert(&business).await.unwrap();

        let stored = repo.get_by_id(&business.id).await.unwrap().unwrap();
        assert_eq!(stored.tax_rate_bps, 2100);
        assert_eq!(stored.currency, "USD");

        business.tax_rate_bps = 1050;
        business.address = Some("Av. Siempre Viva 742".to_string());
        repo.update(&business).await.unwrap();

        let stored = repo.get_by_id(&business.id).await.unwrap().unwrap();
        assert_eq!(stored.tax_rate_bps, 1050);
        assert_eq!(stored.address.as_deref(), Some("Av. Siempre Viva 742"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        assert!(db.businesses().get_by_id("missing").await.unwrap().is_none());
    }
}
