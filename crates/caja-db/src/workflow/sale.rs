//! # Sale Workflow
//!
//! Sale creation and cancellation.
//!
//! ## Creation Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        create_sale                                  │
//! │                                                                     │
//! │  1. VALIDATE INPUT (pure)                                           │
//! │     └── non-empty items, positive quantities and unit prices        │
//! │                                                                     │
//! │  2. BEGIN TRANSACTION                                               │
//! │                                                                     │
//! │  3. CHECK EVERY LINE                                                │
//! │     └── product exists, active, scoped to business → stock ≥ qty   │
//! │                                                                     │
//! │  4. COMPUTE TOTALS                                                  │
//! │     └── subtotal = Σ qty × price, tax from business rate            │
//! │                                                                     │
//! │  5. WRITE                                                           │
//! │     └── sale row (COMPLETED)                                        │
//! │     └── per line: sale_items row                                    │
//! │                   guarded stock decrement                           │
//! │                   stock_movements row (OUT, -qty)                   │
//! │                                                                     │
//! │  6. COMMIT (any failure above rolls everything back)                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancellation is the inverse: flip COMPLETED → CANCELLED and give every
//! line's quantity back to stock, one IN movement per line. A second
//! cancellation of the same sale is rejected, not absorbed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use caja_core::{
    totals::line_subtotal, validation, CoreError, Money, MovementType, PaymentMethod, Sale,
    SaleItem, SaleStatus, SaleTotals, TaxRate,
};

use crate::error::DbError;
use crate::pool::Database;
use crate::workflow::stock::{apply_stock_delta, record_movement, NewMovement};
use crate::workflow::WorkflowResult;

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// One requested line of a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    /// Price charged per unit, snapshotted into the sale item.
    pub unit_price_cents: i64,
}

/// Input for sale creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSaleInput {
    pub business_id: String,
    pub customer_id: Option<String>,
    pub items: Vec<SaleLine>,
    /// Absolute discount on the subtotal, applied before tax. Defaults to 0.
    #[serde(default)]
    pub discount_cents: i64,
    pub payment_method: PaymentMethod,
    /// Open register session this sale settles through, if any.
    pub cash_register_id: Option<String>,
}

/// A created sale with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Creation
// =============================================================================

/// Creates a COMPLETED sale: validates stock, computes totals, persists the
/// sale with its items, decrements inventory, and writes one OUT movement
/// per line - all in a single transaction.
///
/// ## Errors
/// - `Validation` - empty items, non-positive quantity or unit price,
///   negative discount
/// - `ProductNotFound` - a line references a product that is absent,
///   inactive, or owned by another business
/// - `InsufficientStock` - a line asks for more than is on hand
/// - `Db` - storage failure; nothing is persisted
pub async fn create_sale(
    db: &Database,
    user_id: &str,
    input: CreateSaleInput,
) -> WorkflowResult<CreatedSale> {
    debug!(
        business_id = %input.business_id,
        lines = input.items.len(),
        "create_sale"
    );

    validation::validate_line_count(input.items.len())?;
    validation::validate_amount_cents("discount", input.discount_cents)?;
    for line in &input.items {
        validation::validate_quantity(line.quantity)?;
        validation::validate_unit_price_cents(line.unit_price_cents)?;
    }

    let mut tx = db.pool().begin().await?;

    // Check every line before writing anything: product present and active,
    // enough stock on hand. First failure wins.
    let mut available = Vec::with_capacity(input.items.len());
    for line in &input.items {
        let stock: Option<i64> = sqlx::query_scalar(
            "SELECT stock FROM products WHERE id = ?1 AND business_id = ?2 AND is_active = 1",
        )
        .bind(&line.product_id)
        .bind(&input.business_id)
        .fetch_optional(&mut *tx)
        .await?;

        let stock = match stock {
            Some(stock) => stock,
            None => return Err(CoreError::ProductNotFound(line.product_id.clone()).into()),
        };

        if stock < line.quantity {
            return Err(CoreError::InsufficientStock {
                product_id: line.product_id.clone(),
                available: stock,
                requested: line.quantity,
            }
            .into());
        }

        available.push(stock);
    }

    let subtotal = input
        .items
        .iter()
        .fold(Money::zero(), |acc, line| {
            acc + line_subtotal(Money::from_cents(line.unit_price_cents), line.quantity)
        });

    // Missing business ⇒ rate 0; the FK on the sale insert still rejects a
    // sale for a business that does not exist.
    let tax_rate_bps: Option<u32> =
        sqlx::query_scalar("SELECT tax_rate_bps FROM businesses WHERE id = ?1")
            .bind(&input.business_id)
            .fetch_optional(&mut *tx)
            .await?;

    let totals = SaleTotals::compute(
        subtotal,
        Money::from_cents(input.discount_cents),
        TaxRate::from_bps(tax_rate_bps.unwrap_or(0)),
    );

    let sale_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, business_id, user_id, customer_id, cash_register_id,
            subtotal_cents, discount_cents, tax_cents, total_cents,
            payment_method, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&sale_id)
    .bind(&input.business_id)
    .bind(user_id)
    .bind(&input.customer_id)
    .bind(&input.cash_register_id)
    .bind(totals.subtotal.cents())
    .bind(totals.discount.cents())
    .bind(totals.tax.cents())
    .bind(totals.total.cents())
    .bind(input.payment_method)
    .bind(SaleStatus::Completed)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let sale_reason = format!("Sale {sale_id}");
    let mut items = Vec::with_capacity(input.items.len());

    for (line, stock_before) in input.items.iter().zip(available) {
        let item = SaleItem {
            id: Uuid::new_v4().to_string(),
            sale_id: sale_id.clone(),
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            subtotal_cents: line_subtotal(Money::from_cents(line.unit_price_cents), line.quantity)
                .cents(),
        };

        sqlx::query(
            r#"
            INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price_cents, subtotal_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.subtotal_cents)
        .execute(&mut *tx)
        .await?;

        // The guard re-checks stock atomically; losing a race to a
        // concurrent sale surfaces here and rolls the whole sale back.
        if !apply_stock_delta(&mut tx, &line.product_id, -line.quantity, now).await? {
            return Err(CoreError::InsufficientStock {
                product_id: line.product_id.clone(),
                available: stock_before,
                requested: line.quantity,
            }
            .into());
        }

        record_movement(
            &mut tx,
            NewMovement {
                business_id: &input.business_id,
                product_id: &line.product_id,
                quantity: -line.quantity,
                movement_type: MovementType::Out,
                reason: &sale_reason,
                user_id,
                now,
            },
        )
        .await?;

        items.push(item);
    }

    tx.commit().await?;

    info!(
        sale_id = %sale_id,
        total_cents = totals.total.cents(),
        lines = items.len(),
        "Sale created"
    );

    Ok(CreatedSale {
        sale: Sale {
            id: sale_id,
            business_id: input.business_id,
            user_id: user_id.to_string(),
            customer_id: input.customer_id,
            cash_register_id: input.cash_register_id,
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            payment_method: input.payment_method,
            status: SaleStatus::Completed,
            created_at: now,
        },
        items,
    })
}

// =============================================================================
// Cancellation
// =============================================================================

/// Cancels a COMPLETED sale: flips its status and reverses its inventory
/// effects exactly once, one IN movement per line, in a single transaction.
///
/// Register reconciliation is never recomputed retroactively: a register
/// closed between the sale and its cancellation keeps the sale in its
/// expected-amount snapshot.
///
/// ## Errors
/// - `SaleNotFound` - no such sale
/// - `SaleAlreadyCancelled` - cancellation is one-shot, a repeat is rejected
/// - `Db` - storage failure; the sale stays COMPLETED
pub async fn cancel_sale(db: &Database, user_id: &str, sale_id: &str) -> WorkflowResult<Sale> {
    debug!(sale_id = %sale_id, "cancel_sale");

    let mut tx = db.pool().begin().await?;

    let sale: Option<Sale> = sqlx::query_as(
        r#"
        SELECT id, business_id, user_id, customer_id, cash_register_id,
               subtotal_cents, discount_cents, tax_cents, total_cents,
               payment_method, status, created_at
        FROM sales
        WHERE id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(&mut *tx)
    .await?;

    let mut sale = match sale {
        Some(sale) => sale,
        None => return Err(CoreError::SaleNotFound(sale_id.to_string()).into()),
    };

    if sale.status == SaleStatus::Cancelled {
        return Err(CoreError::SaleAlreadyCancelled(sale_id.to_string()).into());
    }

    let lines: Vec<(String, i64)> =
        sqlx::query_as("SELECT product_id, quantity FROM sale_items WHERE sale_id = ?1")
            .bind(sale_id)
            .fetch_all(&mut *tx)
            .await?;

    sqlx::query("UPDATE sales SET status = ?2 WHERE id = ?1")
        .bind(sale_id)
        .bind(SaleStatus::Cancelled)
        .execute(&mut *tx)
        .await?;

    let now = Utc::now();
    let restore_reason = format!("Sale {sale_id} cancelled");

    for (product_id, quantity) in &lines {
        // A restore delta is positive, so the guard can only fail if the
        // product row itself is gone.
        if !apply_stock_delta(&mut tx, product_id, *quantity, now).await? {
            return Err(DbError::not_found("Product", product_id).into());
        }

        record_movement(
            &mut tx,
            NewMovement {
                business_id: &sale.business_id,
                product_id,
                quantity: *quantity,
                movement_type: MovementType::In,
                reason: &restore_reason,
                user_id,
                now,
            },
        )
        .await?;
    }

    tx.commit().await?;

    info!(sale_id = %sale_id, lines = lines.len(), "Sale cancelled");

    sale.status = SaleStatus::Cancelled;
    Ok(sale)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_business, seed_product, seed_user, test_db};
    use crate::workflow::WorkflowError;

    fn one_line(business_id: &str, product_id: &str, quantity: i64, price: i64) -> CreateSaleInput {
        CreateSaleInput {
            business_id: business_id.to_string(),
            customer_id: None,
            items: vec![SaleLine {
                product_id: product_id.to_string(),
                quantity,
                unit_price_cents: price,
            }],
            discount_cents: 0,
            payment_method: PaymentMethod::Cash,
            cash_register_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_sale_computes_totals() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 2100).await; // 21%
        let product = seed_product(&db, &business, 1000, 10).await;

        let created = create_sale(&db, &user, one_line(&business, &product, 2, 1000))
            .await
            .unwrap();

        assert_eq!(created.sale.subtotal_cents, 2000);
        assert_eq!(created.sale.tax_cents, 420);
        assert_eq!(created.sale.total_cents, 2420);
        assert_eq!(created.sale.status, SaleStatus::Completed);
        assert_eq!(created.items.len(), 1);
        assert_eq!(created.items[0].subtotal_cents, 2000);
    }

    #[tokio::test]
    async fn test_create_sale_persists_sale_and_items() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;
        let product = seed_product(&db, &business, 500, 10).await;

        let created = create_sale(&db, &user, one_line(&business, &product, 3, 500))
            .await
            .unwrap();

        let stored = db.sales().get_by_id(&created.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, 1500);
        assert_eq!(stored.user_id, user);

        let items = db.sales().get_items(&created.sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].unit_price_cents, 500);
        assert_eq!(items[0].subtotal_cents, 1500);
    }

    #[tokio::test]
    async fn test_create_sale_decrements_stock_and_writes_ledger() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;
        let product = seed_product(&db, &business, 1000, 10).await;

        let created = create_sale(&db, &user, one_line(&business, &product, 4, 1000))
            .await
            .unwrap();

        let stock = db.products().get_by_id(&product).await.unwrap().unwrap().stock;
        assert_eq!(stock, 6);

        let movements = db.stock_movements().list(&business, Some(&product), 50).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].quantity, -4);
        assert_eq!(movements[0].movement_type, MovementType::Out);
        assert_eq!(
            movements[0].reason.as_deref(),
            Some(format!("Sale {}", created.sale.id).as_str())
        );
        assert_eq!(movements[0].user_id, user);
    }

    #[tokio::test]
    async fn test_discount_applies_before_tax() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 1000).await; // 10%
        let product = seed_product(&db, &business, 10000, 5).await;

        let mut input = one_line(&business, &product, 1, 10000);
        input.discount_cents = 2000;
        let created = create_sale(&db, &user, input).await.unwrap();

        // tax on 8000, not 10000
        assert_eq!(created.sale.tax_cents, 800);
        assert_eq!(created.sale.total_cents, 8800);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejected_without_mutation() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 2100).await;
        let product = seed_product(&db, &business, 1000, 3).await;

        let err = create_sale(&db, &user, one_line(&business, &product, 5, 1000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::InsufficientStock { available: 3, requested: 5, .. })
        ));

        // No sale row, stock untouched, empty ledger
        let sales = db.sales().list(&business, None, None, 50).await.unwrap();
        assert!(sales.is_empty());
        let stock = db.products().get_by_id(&product).await.unwrap().unwrap().stock;
        assert_eq!(stock, 3);
        assert!(db.stock_movements().list(&business, None, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_rolls_back_everything() {
        // Second line fails after the first line passed validation-by-read:
        // nothing from the first line may survive.
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;
        let product_a = seed_product(&db, &business, 1000, 10).await;
        let product_b = seed_product(&db, &business, 2000, 1).await;

        let input = CreateSaleInput {
            business_id: business.clone(),
            customer_id: None,
            items: vec![
                SaleLine {
                    product_id: product_a.clone(),
                    quantity: 2,
                    unit_price_cents: 1000,
                },
                SaleLine {
                    product_id: product_b.clone(),
                    quantity: 5,
                    unit_price_cents: 2000,
                },
            ],
            discount_cents: 0,
            payment_method: PaymentMethod::Debit,
            cash_register_id: None,
        };

        let err = create_sale(&db, &user, input).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::InsufficientStock { .. })
        ));

        let stock_a = db.products().get_by_id(&product_a).await.unwrap().unwrap().stock;
        assert_eq!(stock_a, 10);
        assert!(db.sales().list(&business, None, None, 50).await.unwrap().is_empty());
        assert!(db.stock_movements().list(&business, None, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_items_rejected() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;

        let input = CreateSaleInput {
            business_id: business.clone(),
            customer_id: None,
            items: vec![],
            discount_cents: 0,
            payment_method: PaymentMethod::Cash,
            cash_register_id: None,
        };

        let err = create_sale(&db, &user, input).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("items is required"));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_and_price_rejected() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;
        let product = seed_product(&db, &business, 1000, 10).await;

        let err = create_sale(&db, &user, one_line(&business, &product, 0, 1000))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quantity must be positive"));

        let err = create_sale(&db, &user, one_line(&business, &product, 1, 0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unit_price must be positive"));
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_products_rejected() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;

        let err = create_sale(&db, &user, one_line(&business, "missing", 1, 1000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::ProductNotFound(_))
        ));

        let product = seed_product(&db, &business, 1000, 10).await;
        db.products().soft_delete(&product).await.unwrap();

        let err = create_sale(&db, &user, one_line(&business, &product, 1, 1000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_and_flips_status() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;
        let product = seed_product(&db, &business, 1000, 10).await;

        let created = create_sale(&db, &user, one_line(&business, &product, 4, 1000))
            .await
            .unwrap();

        let cancelled = cancel_sale(&db, &user, &created.sale.id).await.unwrap();
        assert_eq!(cancelled.status, SaleStatus::Cancelled);

        let stock = db.products().get_by_id(&product).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);

        let movements = db.stock_movements().list(&business, Some(&product), 50).await.unwrap();
        assert_eq!(movements.len(), 2);
        // Newest first: the IN restore, then the original OUT
        assert_eq!(movements[0].movement_type, MovementType::In);
        assert_eq!(movements[0].quantity, 4);
        assert_eq!(
            movements[0].reason.as_deref(),
            Some(format!("Sale {} cancelled", created.sale.id).as_str())
        );
    }

    #[tokio::test]
    async fn test_cancel_twice_rejected_without_extra_movements() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;
        let product = seed_product(&db, &business, 1000, 10).await;

        let created = create_sale(&db, &user, one_line(&business, &product, 2, 1000))
            .await
            .unwrap();
        cancel_sale(&db, &user, &created.sale.id).await.unwrap();

        let err = cancel_sale(&db, &user, &created.sale.id).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::SaleAlreadyCancelled(_))
        ));

        // Still exactly one OUT and one IN
        let movements = db.stock_movements().list(&business, Some(&product), 50).await.unwrap();
        assert_eq!(movements.len(), 2);
        let stock = db.products().get_by_id(&product).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);
    }

    #[tokio::test]
    async fn test_cancel_unknown_sale_rejected() {
        let db = test_db().await;
        let user = seed_user(&db).await;

        let err = cancel_sale(&db, &user, "missing").await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Core(CoreError::SaleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_multi_line_sale_touches_every_product() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 2100).await;
        let product_a = seed_product(&db, &business, 1000, 10).await;
        let product_b = seed_product(&db, &business, 250, 8).await;

        let input = CreateSaleInput {
            business_id: business.clone(),
            customer_id: None,
            items: vec![
                SaleLine {
                    product_id: product_a.clone(),
                    quantity: 2,
                    unit_price_cents: 1000,
                },
                SaleLine {
                    product_id: product_b.clone(),
                    quantity: 4,
                    unit_price_cents: 250,
                },
            ],
            discount_cents: 0,
            payment_method: PaymentMethod::Transfer,
            cash_register_id: None,
        };

        let created = create_sale(&db, &user, input).await.unwrap();

        // subtotal 2000 + 1000 = 3000, tax 630, total 3630
        assert_eq!(created.sale.subtotal_cents, 3000);
        assert_eq!(created.sale.tax_cents, 630);
        assert_eq!(created.sale.total_cents, 3630);
        assert_eq!(created.items.len(), 2);

        assert_eq!(db.products().get_by_id(&product_a).await.unwrap().unwrap().stock, 8);
        assert_eq!(db.products().get_by_id(&product_b).await.unwrap().unwrap().stock, 4);

        // One OUT movement per line
        assert_eq!(
            db.stock_movements().list(&business, None, 50).await.unwrap().len(),
            2
        );

        // Cancelling restores both lines
        cancel_sale(&db, &user, &created.sale.id).await.unwrap();
        assert_eq!(db.products().get_by_id(&product_a).await.unwrap().unwrap().stock, 10);
        assert_eq!(db.products().get_by_id(&product_b).await.unwrap().unwrap().stock, 8);
    }

    #[tokio::test]
    async fn test_created_sale_serializes_for_the_api() {
        let db = test_db().await;
        let user = seed_user(&db).await;
        let business = seed_business(&db, 0).await;
        let product = seed_product(&db, &business, 1000, 10).await;

        let created = create_sale(&db, &user, one_line(&business, &product, 1, 1000))
            .await
            .unwrap();

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["sale"]["payment_method"], "CASH");
        assert_eq!(json["sale"]["status"], "COMPLETED");
        assert_eq!(json["sale"]["total_cents"], 1000);
        assert_eq!(json["items"][0]["quantity"], 1);
    }
}
