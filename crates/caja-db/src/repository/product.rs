//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD scoped to a business
//! - Catalogue listing with name/SKU substring search
//! - Low-stock report
//!
//! Stock itself is never written here: the sale, cancellation, and manual
//! adjustment workflows own every stock mutation so that each change lands
//! together with its ledger row in one transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caja_core::Product;

/// All columns of the products table, in struct order.
const PRODUCT_COLUMNS: &str =
    "id, business_id, name, sku, price_cents, stock, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Catalogue search
/// let results = repo.list(&business_id, Some("coke"), 20).await?;
///
/// // Scoped lookup
/// let product = repo.get_for_business(&product_id, &business_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID (unscoped).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product scoped to a business.
    ///
    /// Inactive products are returned too: the manual adjustment path must
    /// be able to correct stock on a soft-deleted product.
    pub async fn get_for_business(&self, id: &str, business_id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND business_id = ?2"
        ))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products for a business.
    ///
    /// ## Arguments
    /// * `search` - Optional substring matched against name and SKU
    /// * `limit` - Maximum results to return
    pub async fn list(
        &self,
        business_id: &str,
        search: Option<&str>,
        limit: u32,
    ) -> DbResult<Vec<Product>> {
        debug!(business_id = %business_id, search = ?search, "Listing products");

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE business_id = ?1
              AND is_active = 1
              AND (?2 IS NULL OR name LIKE '%' || ?2 || '%' OR sku LIKE '%' || ?2 || '%')
            ORDER BY name
            LIMIT ?3
            "#
        ))
        .bind(business_id)
        .bind(search)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products at or below the given stock threshold,
    /// lowest stock first.
    pub async fn low_stock(&self, business_id: &str, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE business_id = ?1 AND is_active = 1 AND stock <= ?2
            ORDER BY stock ASC
            "#
        ))
        .bind(business_id)
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, business_id, name, sku, price_cents, stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.business_id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a product's catalogue fields (name, SKU, price, active flag).
    ///
    /// Deliberately does NOT touch `stock`; see the module docs.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                sku = ?3,
                price_cents = ?4,
                is_active = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical sales and movements still reference this product
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_business, test_db};
    use caja_core::LOW_STOCK_THRESHOLD;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(business_id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            name: name.to_string(),
            sku: Some(name.to_uppercase().replace(' ', "-")),
            price_cents,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_scoped() {
        let db = test_db().await;
        let business = seed_business(&db, 0).await;
        let repo = db.products();

        let p = product(&business, "Coca-Cola 330ml", 150, 24);
        repo.insert(&p).await.unwrap();

        let found = repo.get_for_business(&p.id, &business).await.unwrap().unwrap();
        assert_eq!(found.name, "Coca-Cola 330ml");
        assert_eq!(found.price_cents, 150);
        assert_eq!(found.stock, 24);
        assert!(found.is_active);

        let other_business = seed_business(&db, 0).await;
        assert!(repo.get_for_business(&p.id, &other_business).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let db = test_db().await;
        let business = seed_business(&db, 0).await;
        let repo = db.products();

        repo.insert(&product(&business, "Coca-Cola 330ml", 150, 10)).await.unwrap();
        repo.insert(&product(&business, "Coca-Cola 500ml", 220, 10)).await.unwrap();
        repo.insert(&product(&business, "Agua Mineral", 100, 10)).await.unwrap();

        let all = repo.list(&business, None, 50).await.unwrap();
        assert_eq!(all.len(), 3);

        let cokes = repo.list(&business, Some("Coca"), 50).await.unwrap();
        assert_eq!(cokes.len(), 2);

        // SKU matches too
        let by_sku = repo.list(&business, Some("AGUA"), 50).await.unwrap();
        assert_eq!(by_sku.len(), 1);
        assert_eq!(by_sku[0].name, "Agua Mineral");
    }

    #[tokio::test]
    async fn test_low_stock_orders_lowest_first() {
        let db = test_db().await;
        let business = seed_business(&db, 0).await;
        let repo = db.products();

        repo.insert(&product(&business, "Plenty", 100, 50)).await.unwrap();
        repo.insert(&product(&business, "Scarce", 100, 2)).await.unwrap();
        repo.insert(&product(&business, "Almost", 100, 9)).await.unwrap();

        let low = repo.low_stock(&business, LOW_STOCK_THRESHOLD).await.unwrap();
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].name, "Scarce");
        assert_eq!(low[1].name, "Almost");
    }

    #[tokio::test]
    async fn test_update_touches_catalogue_not_stock() {
        let db = test_db().await;
        let business = seed_business(&db, 0).await;
        let repo = db.products();

        let mut p = product(&business, "Widget", 100, 7);
        repo.insert(&p).await.unwrap();

        p.price_cents = 120;
        p.stock = 9999; // must be ignored
        repo.update(&p).await.unwrap();

        let stored = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(stored.price_cents, 120);
        assert_eq!(stored.stock, 7);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_list() {
        let db = test_db().await;
        let business = seed_business(&db, 0).await;
        let repo = db.products();

        let p = product(&business, "Retired", 100, 0);
        repo.insert(&p).await.unwrap();
        repo.soft_delete(&p.id).await.unwrap();

        assert!(repo.list(&business, None, 50).await.unwrap().is_empty());
        // Still reachable for corrections and history
        let stored = repo.get_for_business(&p.id, &business).await.unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let db = test_db().await;
        let business = seed_business(&db, 0).await;

        let ghost = product(&business, "Ghost", 100, 0);
        let err = db.products().update(&ghost).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
