//! # Warehouse Repository
//!
//! Both ends of the ETL and the analytics reads.
//!
//! ```text
//! ERP store                         Warehouse store
//! ─────────                         ───────────────
//! extract_validated_lines()  ──►   replace_all(star)     (one transaction)
//!                                   client_activity()     ┐
//!                                   daily_revenue()       ├─ analytics
//!                                   totals()              ┘
//! ```
//!
//! The same repository type is used on either store; calling a warehouse
//! method on the ERP store fails with a missing-table error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use erp_core::star::{ExtractedLine, StarSchema};
use erp_core::OrderStatus;

/// Per-client aggregates read from `fact_sales`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClientActivity {
    pub client_id: String,
    pub name: String,
    pub last_order_date: NaiveDate,
    /// Distinct orders.
    pub frequency: i64,
    /// Total revenue.
    pub monetary_cents: i64,
}

/// Row counts of the five warehouse tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseCounts {
    pub time: i64,
    pub products: i64,
    pub clients: i64,
    pub stores: i64,
    pub facts: i64,
}

#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    // =========================================================================
    // Extract (ERP store)
    // =========================================================================

    /// Every line of every VALIDATED order, joined with product and client.
    pub async fn extract_validated_lines(&self) -> DbResult<Vec<ExtractedLine>> {
        let lines = sqlx::query_as::<_, ExtractedLine>(
            r#"
            SELECT
                o.id                    AS order_id,
                o.created_at            AS order_date,
                c.id                    AS client_id,
                c.name                  AS client_name,
                c.is_vip                AS is_vip,
                p.id                    AS product_id,
                p.sku                   AS sku,
                p.name                  AS product_name,
                p.purchase_price_cents  AS purchase_price_cents,
                oi.quantity             AS quantity,
                oi.unit_price_cents     AS unit_price_cents
            FROM order_items oi
            INNER JOIN orders o   ON o.id = oi.order_id
            INNER JOIN products p ON p.id = oi.product_id
            INNER JOIN clients c  ON c.id = o.client_id
            WHERE o.status = ?1
            ORDER BY o.created_at, o.id, oi.line_no
            "#,
        )
        .bind(OrderStatus::Validated)
        .fetch_all(&self.pool)
        .await?;

        debug!(lines = lines.len(), "Extracted validated order lines");
        Ok(lines)
    }

    // =========================================================================
    // Load (warehouse store)
    // =========================================================================

    /// Replaces all five tables with `star`, atomically.
    ///
    /// Dimensions are written before the fact table. Readers see either the
    /// previous image or the new one, never a mix.
    ///
    /// Returns the number of rows written.
    pub async fn replace_all(&self, star: &StarSchema) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        for table in ["fact_sales", "dim_time", "dim_product", "dim_client", "dim_store"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }

        for row in &star.time {
            sqlx::query("INSERT INTO dim_time (date_key, year, month, day, season) VALUES (?1, ?2, ?3, ?4, ?5)")
                .bind(row.date_key)
                .bind(row.year)
                .bind(row.month)
                .bind(row.day)
                .bind(row.season)
                .execute(&mut *tx)
                .await?;
        }

        for row in &star.products {
            sqlx::query(
                "INSERT INTO dim_product (product_id, sku, name, purchase_price_cents) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&row.product_id)
            .bind(&row.sku)
            .bind(&row.name)
            .bind(row.purchase_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        for row in &star.clients {
            sqlx::query(
                "INSERT INTO dim_client (client_id, name, is_vip, segment, geography) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&row.client_id)
            .bind(&row.name)
            .bind(row.is_vip)
            .bind(&row.segment)
            .bind(&row.geography)
            .execute(&mut *tx)
            .await?;
        }

        for row in &star.stores {
            sqlx::query("INSERT INTO dim_store (store_id, name, city) VALUES (?1, ?2, ?3)")
                .bind(row.store_id)
                .bind(&row.name)
                .bind(&row.city)
                .execute(&mut *tx)
                .await?;
        }

        for row in &star.facts {
            sqlx::query(
                r#"
                INSERT INTO fact_sales
                    (order_id, product_id, client_id, date_key, store_id,
                     quantity, revenue_cents, cost_cents, margin_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&row.order_id)
            .bind(&row.product_id)
            .bind(&row.client_id)
            .bind(row.date_key)
            .bind(row.store_id)
            .bind(row.quantity)
            .bind(row.revenue_cents)
            .bind(row.cost_cents)
            .bind(row.margin_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let rows = star.total_rows();
        info!(rows, facts = star.facts.len(), "Warehouse replaced");
        Ok(rows)
    }

    // =========================================================================
    // Reads (warehouse store)
    // =========================================================================

    pub async fn counts(&self) -> DbResult<WarehouseCounts> {
        let (time, products, clients, stores, facts): (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM dim_time),
                (SELECT COUNT(*) FROM dim_product),
                (SELECT COUNT(*) FROM dim_client),
                (SELECT COUNT(*) FROM dim_store),
                (SELECT COUNT(*) FROM fact_sales)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(WarehouseCounts {
            time,
            products,
            clients,
            stores,
            facts,
        })
    }

    /// All fact rows in load order.
    pub async fn facts(&self) -> DbResult<Vec<erp_core::star::FactSales>> {
        let facts = sqlx::query_as::<_, erp_core::star::FactSales>(
            r#"
            SELECT order_id, product_id, client_id, date_key, store_id,
                   quantity, revenue_cents, cost_cents, margin_cents
            FROM fact_sales
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(facts)
    }

    /// Recency/frequency/monetary inputs, one row per client with sales.
    pub async fn client_activity(&self) -> DbResult<Vec<ClientActivity>> {
        let rows = sqlx::query_as::<_, ClientActivity>(
            r#"
            SELECT
                f.client_id                         AS client_id,
                COALESCE(MAX(d.name), f.client_id)  AS name,
                MAX(f.date_key)                     AS last_order_date,
                COUNT(DISTINCT f.order_id)          AS frequency,
                SUM(f.revenue_cents)                AS monetary_cents
            FROM fact_sales f
            LEFT JOIN dim_client d ON d.client_id = f.client_id
            GROUP BY f.client_id
            ORDER BY f.client_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue per calendar day, ascending.
    pub async fn daily_revenue(&self) -> DbResult<Vec<(NaiveDate, i64)>> {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT date_key, SUM(revenue_cents)
            FROM fact_sales
            GROUP BY date_key
            ORDER BY date_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// (Σ revenue, Σ margin) in cents.
    pub async fn totals(&self) -> DbResult<(i64, i64)> {
        let totals: (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(revenue_cents), 0), COALESCE(SUM(margin_cents), 0) FROM fact_sales",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::Schema;
    use crate::repository::client::NewClient;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use erp_core::star::{transform, DimStore, Season};
    use erp_core::OrderLineRequest;

    async fn erp_with_history() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let vip = db
            .clients()
            .insert(&NewClient {
                name: "VIP".to_string(),
                credit_limit_cents: 10_000_000,
                is_vip: true,
                ..Default::default()
            })
            .await
            .unwrap();
        let mouse = db
            .products()
            .insert(&NewProduct {
                sku: "EAN002".to_string(),
                name: "Souris".to_string(),
                price_cents: 2_500,
                purchase_price_cents: 1_500,
                stock_quantity: 100,
                safety_stock: 0,
            })
            .await
            .unwrap();

        let line = OrderLineRequest {
            product_id: mouse.id.clone(),
            quantity: 4,
        };
        let validated = db.orders().create_order(&vip.id, &[line.clone()], None).await.unwrap();
        db.orders().validate_order(&validated.order_id, None).await.unwrap();
        // Stays PENDING, must not be extracted
        db.orders().create_order(&vip.id, &[line], None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_extract_only_validated() {
        let erp = erp_with_history().await;
        let lines = erp.warehouse().extract_validated_lines().await.unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 4);
        assert_eq!(lines[0].unit_price_cents, 2_250);
        assert!(lines[0].is_vip);
    }

    #[tokio::test]
    async fn test_replace_all_and_reads() {
        let erp = erp_with_history().await;
        let wh = Database::new(DbConfig::in_memory().schema(Schema::Warehouse)).await.unwrap();

        let star = transform(&erp.warehouse().extract_validated_lines().await.unwrap(), DimStore::default());
        let written = wh.warehouse().replace_all(&star).await.unwrap();
        assert_eq!(written, star.total_rows());

        // Loading twice replaces, it does not append
        wh.warehouse().replace_all(&star).await.unwrap();
        let counts = wh.warehouse().counts().await.unwrap();
        assert_eq!(counts.facts, 1);
        assert_eq!(counts.stores, 1);
        assert_eq!(counts.time, 1);

        let facts = wh.warehouse().facts().await.unwrap();
        assert_eq!(facts[0].revenue_cents, 9_000);
        assert_eq!(facts[0].margin_cents, 3_000);

        let (revenue, margin) = wh.warehouse().totals().await.unwrap();
        assert_eq!((revenue, margin), (9_000, 3_000));

        let activity = wh.warehouse().client_activity().await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].name, "VIP");
        assert_eq!(activity[0].frequency, 1);

        assert_eq!(wh.warehouse().daily_revenue().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_season_round_trips_through_dim_time() {
        let wh = Database::new(DbConfig::in_memory().schema(Schema::Warehouse)).await.unwrap();
        let mut star = StarSchema::default();
        star.time.push(erp_core::star::DimTime::from_date(
            NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
        ));
        wh.warehouse().replace_all(&star).await.unwrap();

        let season: Season = sqlx::query_scalar("SELECT season FROM dim_time")
            .fetch_one(wh.pool())
            .await
            .unwrap();
        assert_eq!(season, Season::Summer);
    }

    #[tokio::test]
    async fn test_empty_warehouse_totals_are_zero() {
        let wh = Database::new(DbConfig::in_memory().schema(Schema::Warehouse)).await.unwrap();
        assert_eq!(wh.warehouse().totals().await.unwrap(), (0, 0));
        assert!(wh.warehouse().client_activity().await.unwrap().is_empty());
    }
}
