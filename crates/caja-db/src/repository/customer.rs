//! # Customer Repository
//!
//! Database operations for customers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caja_core::Customer;

const CUSTOMER_COLUMNS: &str =
    "id, business_id, name, document, email, phone, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer scoped to a business.
    pub async fn get_for_business(&self, id: &str, business_id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1 AND business_id = ?2"
        ))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers for a business, most recently updated first.
    pub async fn list(&self, business_id: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE business_id = ?1
            ORDER BY updated_at DESC
            LIMIT ?2
            "#
        ))
        .bind(business_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, business_id, name, document, email, phone, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.business_id)
        .bind(&customer.name)
        .bind(&customer.document)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a customer's contact fields.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                document = ?3,
                email = ?4,
                phone = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.document)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer. Sales referencing it keep their rows
    /// (customer_id is set NULL by the schema).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_business, test_db};
    use caja_core::DEFAULT_QUERY_LIMIT;
    use uuid::Uuid;

    fn customer(business_id: &str, name: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4().to_string(),
            business_id: business_id.to_string(),
            name: name.to_string(),
            document: None,
            email: None,
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let db = test_db().await;
        let business = seed_business(&db, 0).await;
        let repo = db.customers();

        let mut c = customer(&business, "Ana García");
        repo.insert(&c).await.unwrap();

        let stored = repo.get_for_business(&c.id, &business).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ana García");

        c.phone = Some("+34 600 000 000".to_string());
        repo.update(&c).await.unwrap();
        let stored = repo.get_for_business(&c.id, &business).await.unwrap().unwrap();
        assert_eq!(stored.phone.as_deref(), Some("+34 600 000 000"));

        assert_eq!(repo.list(&business, DEFAULT_QUERY_LIMIT).await.unwrap().len(), 1);

        repo.delete(&c.id).await.unwrap();
        assert!(repo.get_for_business(&c.id, &business).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_customer_is_not_found() {
        let db = test_db().await;
        let err = db.customers().delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
