//! # Order Repository (Order Engine)
//!
//! Creates and validates orders. Every mutation runs in one SQLite
//! transaction; business rules come from `erp_core::pricing`.
//!
//! ## create_order
//! ```text
//! BEGIN
//!   touch client row            ← first statement writes: write lock held
//!   read client ── debt > limit ──► BLOCKED_ORDER audit, COMMIT, Err
//!   read products ── missing ────► ROLLBACK, Err(ProductNotFound)
//!   price lines (VIP -10%)
//!   INSERT order, items, CREATE_ORDER audit
//! COMMIT
//! ```
//!
//! ## validate_order
//! ```text
//! BEGIN
//!   UPDATE orders SET status = VALIDATED WHERE id = ? AND status = PENDING
//!        └── 0 rows ──► ROLLBACK, Err(InvalidOrderStatus)
//!   check pass: Σ quantity per product ≤ stock
//!        └── short ──► ROLLBACK, STOCK_ERROR audit, Err(InsufficientStock)
//!   act pass, per line:
//!        UPDATE products SET stock -= q WHERE id = ? AND stock >= q
//!        StockMovement(OUT), ALERT_STOCK if stock < safety_stock
//!   client.current_debt += total
//!   VALIDATE_ORDER audit
//! COMMIT
//! ```
//!
//! ## Serialization
//! Both operations write before they read anything they decide on. SQLite
//! grants one write lock at a time, so two validations competing for the
//! same stock run one after the other and the second one sees the first
//! one's decrements. The guarded decrement and the `CHECK` constraint keep
//! stock non-negative even if that ordering were ever broken.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{DbResult, EngineError, EngineResult};
use crate::repository::audit::{insert_entry, AuditRepository};
use crate::repository::client::fetch_client;
use crate::repository::product::fetch_product;
use crate::repository::stock::insert_movement;
use erp_core::pricing::{aggregate_demand, check_credit, check_stock, needs_restock_alert, price_order, StockDemand};
use erp_core::validation::validate_order_request;
use erp_core::{
    AuditAction, CoreError, Money, MovementDirection, NewAuditEntry, Order, OrderItem,
    OrderLineRequest, OrderReceipt, OrderStatus, Product,
};

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedOrder {
    pub order_id: String,
    pub status: OrderStatus,
    pub total: Money,
    /// SKUs that fell under their safety stock.
    pub stock_alerts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // create_order
    // =========================================================================

    /// Creates a PENDING order.
    ///
    /// ## Returns
    /// * `Ok(OrderReceipt)` - order id, total, PENDING
    /// * `Err(Core(Validation))` - malformed request, nothing written
    /// * `Err(Core(ClientNotFound | ProductNotFound))` - nothing written
    /// * `Err(Core(CreditLimitExceeded))` - only a BLOCKED_ORDER audit row written
    pub async fn create_order(
        &self,
        client_id: &str,
        lines: &[OrderLineRequest],
        actor_id: Option<&str>,
    ) -> EngineResult<OrderReceipt> {
        validate_order_request(client_id, lines)?;

        let mut tx = self.pool.begin().await?;

        // Takes the write lock and doubles as the existence check
        let touched = sqlx::query("UPDATE clients SET current_debt_cents = current_debt_cents WHERE id = ?1")
            .bind(client_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(CoreError::ClientNotFound(client_id.to_string()).into());
        }

        let client = fetch_client(&mut tx, client_id)
            .await?
            .ok_or_else(|| CoreError::ClientNotFound(client_id.to_string()))?;

        if let Err(rejection) = check_credit(&client) {
            if let Some(entry) = rejection.audit_entry(actor_id) {
                insert_entry(&mut tx, &entry).await?;
            }
            tx.commit().await?;

            warn!(
                client_id = %client.id,
                debt_cents = client.current_debt_cents,
                limit_cents = client.credit_limit_cents,
                "Order blocked: credit limit exceeded"
            );
            return Err(rejection.into());
        }

        let mut products: Vec<Product> = Vec::with_capacity(lines.len());
        for line in lines {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            products.push(product);
        }

        let priced_input: Vec<(&Product, i64)> = products
            .iter()
            .zip(lines)
            .map(|(product, line)| (product, line.quantity))
            .collect();
        let (priced, total) = price_order(&client, &priced_input)?;

        let order_id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO orders (id, client_id, total_amount_cents, status, created_at, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&order_id)
        .bind(&client.id)
        .bind(total.cents())
        .bind(OrderStatus::Pending)
        .bind(Utc::now())
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;

        for (line_no, (line, product)) in priced.iter().zip(&products).enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (id, order_id, line_no, product_id, quantity, unit_price_cents, discount_bps)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order_id)
            .bind(line_no as i64)
            .bind(&product.id)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.discount_bps as i64)
            .execute(&mut *tx)
            .await?;
        }

        insert_entry(
            &mut tx,
            &NewAuditEntry::new(
                AuditAction::CreateOrder,
                format!("Order {} created for client {} ({})", order_id, client.id, total),
                actor_id,
            ),
        )
        .await?;

        tx.commit().await?;

        info!(
            order_id = %order_id,
            client_id = %client.id,
            lines = priced.len(),
            total_cents = total.cents(),
            vip = client.is_vip,
            "Order created"
        );

        Ok(OrderReceipt {
            order_id,
            total,
            status: OrderStatus::Pending,
        })
    }

    // =========================================================================
    // validate_order
    // =========================================================================

    /// Validates a PENDING order: reserves stock and charges the client.
    ///
    /// ## Returns
    /// * `Ok(ValidatedOrder)` - stock decremented, debt raised
    /// * `Err(Core(InvalidOrderStatus))` - order missing or not PENDING
    /// * `Err(Core(InsufficientStock))` - nothing changed but a STOCK_ERROR row
    pub async fn validate_order(&self, order_id: &str, actor_id: Option<&str>) -> EngineResult<ValidatedOrder> {
        let mut tx = self.pool.begin().await?;

        match validate_in_tx(&mut tx, order_id, actor_id).await {
            Ok(outcome) => {
                tx.commit().await?;
                info!(
                    order_id = %order_id,
                    total_cents = outcome.total.cents(),
                    alerts = outcome.stock_alerts.len(),
                    "Order validated"
                );
                Ok(outcome)
            }
            Err(err) => {
                tx.rollback().await?;

                // Written after the rollback so it survives it. A refusal
                // that cannot be audited is reported as a store failure.
                if let EngineError::Core(rejection) = &err {
                    if let Some(entry) = rejection.audit_entry(actor_id) {
                        warn!(order_id = %order_id, error = %rejection, "Order validation refused");
                        if let Err(audit_err) = AuditRepository::new(self.pool.clone()).record(&entry).await {
                            error!(
                                order_id = %order_id,
                                refusal = %rejection,
                                error = %audit_err,
                                "Failed to audit refused validation"
                            );
                            return Err(audit_err.into());
                        }
                    }
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order with its items in line order.
    pub async fn get_order(&self, order_id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut conn, order_id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Transaction Bodies
// =============================================================================

async fn validate_in_tx(
    conn: &mut SqliteConnection,
    order_id: &str,
    actor_id: Option<&str>,
) -> EngineResult<ValidatedOrder> {
    // Claim first: this write takes the lock that serializes validations
    let claimed = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2 AND status = ?3")
        .bind(OrderStatus::Validated)
        .bind(order_id)
        .bind(OrderStatus::Pending)
        .execute(&mut *conn)
        .await?;

    if claimed.rows_affected() == 0 {
        let current: Option<OrderStatus> = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?;
        return Err(CoreError::InvalidOrderStatus {
            order_id: order_id.to_string(),
            current_status: current.map_or("missing".to_string(), |s| s.to_string()),
        }
        .into());
    }

    let order = fetch_order(conn, order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

    // Check pass
    let mut demands = Vec::new();
    for (product_id, requested) in aggregate_demand(&order.items) {
        let product = fetch_product(conn, &product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;
        demands.push(StockDemand {
            product_id,
            sku: product.sku,
            requested,
            available: product.stock_quantity,
        });
    }
    check_stock(order_id, &demands)?;

    debug!(order_id = %order_id, products = demands.len(), "Stock check passed");

    // Act pass
    let mut stock_alerts = Vec::new();
    for item in &order.items {
        let row: Option<(i64, i64, String)> = sqlx::query_as(
            r#"
            UPDATE products SET stock_quantity = stock_quantity - ?1
            WHERE id = ?2 AND stock_quantity >= ?1
            RETURNING stock_quantity, safety_stock, sku
            "#,
        )
        .bind(item.quantity)
        .bind(&item.product_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some((stock_after, safety_stock, sku)) = row else {
            let (sku, available) = stock_of(conn, &item.product_id).await?;
            return Err(CoreError::InsufficientStock {
                order_id: order_id.to_string(),
                sku,
                available,
                requested: item.quantity,
            }
            .into());
        };

        insert_movement(conn, &item.product_id, item.quantity, MovementDirection::Out, actor_id).await?;

        if needs_restock_alert(stock_after, safety_stock) {
            insert_entry(
                conn,
                &NewAuditEntry::new(
                    AuditAction::AlertStock,
                    format!("Product {} below safety stock: {} left (safety {})", sku, stock_after, safety_stock),
                    actor_id,
                ),
            )
            .await?;
            warn!(sku = %sku, stock_after, safety_stock, "Stock below safety threshold");
            stock_alerts.push(sku);
        }
    }

    sqlx::query("UPDATE clients SET current_debt_cents = current_debt_cents + ?1 WHERE id = ?2")
        .bind(order.total_amount_cents)
        .bind(&order.client_id)
        .execute(&mut *conn)
        .await?;

    insert_entry(
        conn,
        &NewAuditEntry::new(
            AuditAction::ValidateOrder,
            format!("Order {} validated, client {} charged {}", order_id, order.client_id, order.total_amount()),
            actor_id,
        ),
    )
    .await?;

    Ok(ValidatedOrder {
        order_id: order_id.to_string(),
        status: OrderStatus::Validated,
        total: order.total_amount(),
        stock_alerts,
    })
}

async fn stock_of(conn: &mut SqliteConnection, product_id: &str) -> DbResult<(String, i64)> {
    let row: (String, i64) = sqlx::query_as("SELECT sku, stock_quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(row)
}

async fn fetch_order(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        SELECT id, client_id, total_amount_cents, status, created_at, created_by
        FROM orders
        WHERE id = ?1
        "#,
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(mut order) = order else {
        return Ok(None);
    };

    order.items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, order_id, product_id, quantity, unit_price_cents, discount_bps
        FROM order_items
        WHERE order_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(order))
}

// =============================================================================
// Tests
// =============================================================================
