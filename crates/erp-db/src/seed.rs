//! # Demo Data
//!
//! Two loaders used by the `seed` binary and the server's `/seed` routes.
//!
//! ## Master Data
//! ```text
//! EAN001  Laptop Pro        1200.00  stock 50   safety 5
//! EAN002  Wireless Mouse      25.00  stock 200  safety 20
//! EAN003  27" Monitor        300.00  stock 2    safety 10   ← nearly out
//!
//! Alpha Corp   limit 5000.00  debt   0.00  VIP
//! Beta Shop    limit  500.00  debt 600.00       ← blocked
//! ```
//!
//! ## Bulk History
//! Five `MASSIVE-00n` products, ten demo clients (every third VIP) and fifty
//! VALIDATED orders spread over the last 90 days, so the warehouse has
//! enough dates for forecasting and enough clients for segmentation.
//! Runs once: skipped when `MASSIVE-001` exists.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::audit::insert_entry;
use crate::repository::client::NewClient;
use crate::repository::product::NewProduct;
use erp_core::pricing::{discount_for, price_line};
use erp_core::{AuditAction, NewAuditEntry, OrderStatus, Product};

/// SKU whose presence marks the bulk history as loaded.
pub const MASSIVE_MARKER_SKU: &str = "MASSIVE-001";

const MASSIVE_PRODUCTS: i64 = 5;
const MASSIVE_CLIENTS: i64 = 10;
const MASSIVE_ORDERS: usize = 50;
const HISTORY_DAYS: i64 = 90;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub products: usize,
    pub clients: usize,
    pub orders: usize,
    /// False when the data was already there.
    pub created: bool,
}

/// Loads the demo master data. Each table is filled only while empty.
pub async fn seed_master_data(db: &Database) -> DbResult<SeedReport> {
    let admin = db.users().get_or_create("admin", "admin").await?;
    let mut report = SeedReport::default();

    if db.products().count().await? == 0 {
        let products = [
            ("EAN001", "Laptop Pro", 120_000, 90_000, 50, 5),
            ("EAN002", "Wireless Mouse", 2_500, 1_000, 200, 20),
            ("EAN003", "27\" Monitor", 30_000, 22_000, 2, 10),
        ];
        for (sku, name, price, purchase, stock, safety) in products {
            db.products()
                .insert(&NewProduct {
                    sku: sku.to_string(),
                    name: name.to_string(),
                    price_cents: price,
                    purchase_price_cents: purchase,
                    stock_quantity: stock,
                    safety_stock: safety,
                })
                .await?;
            report.products += 1;
        }
    }

    if db.clients().count().await? == 0 {
        db.clients()
            .insert(&NewClient {
                name: "Alpha Corp".to_string(),
                email: Some("contact@alpha.example".to_string()),
                phone: Some("0340011122".to_string()),
                credit_limit_cents: 500_000,
                current_debt_cents: 0,
                is_vip: true,
            })
            .await?;
        db.clients()
            .insert(&NewClient {
                name: "Beta Shop".to_string(),
                email: Some("hello@beta.example".to_string()),
                phone: Some("0330099988".to_string()),
                credit_limit_cents: 50_000,
                current_debt_cents: 60_000,
                is_vip: false,
            })
            .await?;
        report.clients = 2;

        db.audit()
            .record(&NewAuditEntry::new(
                AuditAction::Seed,
                "Demo products and clients created",
                Some(&admin.id),
            ))
            .await?;
    }

    report.created = report.products > 0 || report.clients > 0;
    info!(products = report.products, clients = report.clients, "Master data seeded");
    Ok(report)
}

/// Loads the bulk history. Idempotent on [`MASSIVE_MARKER_SKU`].
///
/// Orders are written directly as VALIDATED with back-dated timestamps. They
/// stand for history that predates this system, so they neither move stock
/// nor raise client debt.
pub async fn seed_massive_data<R: Rng>(db: &Database, now: DateTime<Utc>, rng: &mut R) -> DbResult<SeedReport> {
    if db.products().get_by_sku(MASSIVE_MARKER_SKU).await?.is_some() {
        info!("Bulk history already present, skipping");
        return Ok(SeedReport::default());
    }

    let admin = db.users().get_or_create("admin", "admin").await?;
    let batch = Uuid::new_v4().simple().to_string();

    let mut products: Vec<Product> = Vec::new();
    for i in 1..=MASSIVE_PRODUCTS {
        let product = db
            .products()
            .insert(&NewProduct {
                sku: format!("MASSIVE-{:03}", i),
                name: format!("Generated Product {}", i),
                price_cents: 10_000 * i,
                purchase_price_cents: 7_000 * i,
                stock_quantity: 10_000,
                safety_stock: 10,
            })
            .await?;
        products.push(product);
    }

    let mut clients = Vec::new();
    for i in 1..=MASSIVE_CLIENTS {
        let client = db
            .clients()
            .insert(&NewClient {
                name: format!("Demo Client {}", i),
                email: Some(format!("demo_{}_{}@mail.example", &batch[..8], i)),
                phone: None,
                credit_limit_cents: 5_000_000,
                current_debt_cents: 0,
                is_vip: i % 3 == 0,
            })
            .await?;
        clients.push(client);
    }

    let mut tx = db.pool().begin().await?;

    for _ in 0..MASSIVE_ORDERS {
        let client = &clients[rng.gen_range(0..clients.len())];
        let created_at = now - Duration::days(rng.gen_range(1..=HISTORY_DAYS));
        let discount = discount_for(client.is_vip);
        let order_id = Uuid::new_v4().to_string();

        let line_count = rng.gen_range(1..=3);
        let mut lines = Vec::with_capacity(line_count);
        for _ in 0..line_count {
            let product = &products[rng.gen_range(0..products.len())];
            let quantity = rng.gen_range(1..=5);
            lines.push((product.id.clone(), price_line(product.price(), quantity, discount)));
        }
        let total: i64 = lines.iter().map(|(_, l)| l.line_total.cents()).sum();

        sqlx::query(
            r#"
            INSERT INTO orders (id, client_id, total_amount_cents, status, created_at, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&order_id)
        .bind(&client.id)
        .bind(total)
        .bind(OrderStatus::Validated)
        .bind(created_at)
        .bind(&admin.id)
        .execute(&mut *tx)
        .await?;

        for (line_no, (product_id, line)) in lines.iter().enumerate() {
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
            .bind(product_id)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.discount_bps as i64)
            .execute(&mut *tx)
            .await?;
        }
    }

    insert_entry(
        &mut tx,
        &NewAuditEntry::new(
            AuditAction::Seed,
            format!("Bulk history created: {} validated orders", MASSIVE_ORDERS),
            Some(&admin.id),
        ),
    )
    .await?;

    tx.commit().await?;

    info!(orders = MASSIVE_ORDERS, "Bulk history seeded");
    Ok(SeedReport {
        products: products.len(),
        clients: clients.len(),
        orders: MASSIVE_ORDERS,
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_master_data_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = seed_master_data(&db).await.unwrap();
        assert!(first.created);
        assert_eq!((first.products, first.clients), (3, 2));

        let second = seed_master_data(&db).await.unwrap();
        assert!(!second.created);
        assert_eq!(db.products().count().await.unwrap(), 3);

        let blocked: Vec<_> = db
            .clients()
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.is_blocked())
            .collect();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].name, "Beta Shop");
    }

    #[tokio::test]
    async fn test_massive_seed_runs_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();

        let report = seed_massive_data(&db, now, &mut rng).await.unwrap();
        assert!(report.created);
        assert_eq!(db.orders().count().await.unwrap(), 50);

        let lines = db.warehouse().extract_validated_lines().await.unwrap();
        assert!(lines.len() >= 50);
        assert!(lines.iter().all(|l| l.order_date < now));

        let again = seed_massive_data(&db, now, &mut rng).await.unwrap();
        assert!(!again.created);
        assert_eq!(db.orders().count().await.unwrap(), 50);
    }
}
