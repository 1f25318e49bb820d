//! Shared test fixtures: an in-memory database plus seed helpers for the
//! rows every workflow needs (a user to act, a business to scope to, a
//! product to sell).

use chrono::Utc;
use uuid::Uuid;

use caja_core::{Business, Product, DEFAULT_CURRENCY};

use crate::pool::{Database, DbConfig};

/// Fresh in-memory database with the full schema applied.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// Inserts a user row and returns its id.
///
/// Users are provisioned by the external identity layer in production, so
/// there is no repository for them; tests write the row directly.
pub(crate) async fn seed_user(db: &Database) -> String {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, email, full_name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&id)
    .bind(format!("cashier-{id}@example.com"))
    .bind("Test Cashier")
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await
    .expect("seed user");

    id
}

/// Inserts a business with the given tax rate and returns its id.
pub(crate) async fn seed_business(db: &Database, tax_rate_bps: u32) -> String {
    let now = Utc::now();
    let business = Business {
        id: Uuid::new_v4().to_string(),
        name: "Test Business".to_string(),
        address: None,
        currency: DEFAULT_CURRENCY.to_string(),
        tax_rate_bps,
        created_at: now,
        updated_at: now,
    };

    db.businesses().insert(&business).await.expect("seed business");
    business.id
}

/// Inserts an active product and returns its id.
pub(crate) async fn seed_product(
    db: &Database,
    business_id: &str,
    price_cents: i64,
    stock: i64,
) -> String {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        business_id: business_id.to_string(),
        name: format!("Product {}", &Uuid::new_v4().to_string()[..8]),
        sku: None,
        price_cents,
        stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    db.products().insert(&product).await.expect("seed product");
    product.id
}
