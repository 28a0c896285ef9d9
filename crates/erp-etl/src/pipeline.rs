//! # ETL Pipeline
//!
//! One warehouse rebuild: extract, transform, load.
//!
//! ## Run Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Pipeline::run()                                │
//! │                                                                         │
//! │  1. EXTRACT  (ERP store)                                               │
//! │     every line of a VALIDATED order, joined with product and client    │
//! │     └── none? → "Terminated (empty)", warehouse untouched              │
//! │                                                                         │
//! │  2. TRANSFORM (pure, erp_core::star::transform)                        │
//! │     dim_time (season buckets), dim_product, dim_client, dim_store,     │
//! │     fact_sales with revenue / cost / margin                            │
//! │                                                                         │
//! │  3. LOAD (warehouse store, one transaction)                            │
//! │     delete all five tables, insert dimensions, then facts              │
//! │                                                                         │
//! │  Each phase is published on the StatusBoard as it starts.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Runs are idempotent: the warehouse is replaced, never appended to.
//! Serialization is the caller's job (see [`crate::scheduler`]).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use erp_core::star::{transform, DimStore};
use erp_db::Database;

use crate::error::{EtlError, EtlResult};
use crate::status::{EtlPhase, StatusBoard};

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing to load.
    Empty,
    Loaded {
        /// Fact rows written.
        rows_loaded: u64,
        /// Fact plus dimension rows written.
        total_rows: u64,
    },
}

/// Extracts from the ERP store and rebuilds the warehouse store.
#[derive(Debug, Clone)]
pub struct Pipeline {
    erp: Database,
    warehouse: Database,
    store: DimStore,
    board: StatusBoard,
}

impl Pipeline {
    pub fn new(erp: Database, warehouse: Database, store: DimStore, board: StatusBoard) -> Self {
        Pipeline {
            erp,
            warehouse,
            store,
            board,
        }
    }

    pub fn board(&self) -> &StatusBoard {
        &self.board
    }

    /// Runs one rebuild and publishes its outcome.
    ///
    /// A failure is written to the board as `Failed: <message>` and also
    /// returned; the previous warehouse image stays in place.
    #[instrument(skip(self))]
    pub async fn run(&self) -> EtlResult<RunOutcome> {
        match self.run_phases().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(error = %e, "ETL run failed");
                self.board.set_phase(EtlPhase::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_phases(&self) -> EtlResult<RunOutcome> {
        self.board.set_phase(EtlPhase::Extracting);
        let lines = self
            .erp
            .warehouse()
            .extract_validated_lines()
            .await
            .map_err(EtlError::ExtractFailed)?;

        if lines.is_empty() {
            info!("No validated orders to load");
            self.board.set_phase(EtlPhase::Empty);
            return Ok(RunOutcome::Empty);
        }

        self.board.set_phase(EtlPhase::Transforming);
        let star = transform(&lines, self.store.clone());

        self.board.set_phase(EtlPhase::Loading);
        let total_rows = self
            .warehouse
            .warehouse()
            .replace_all(&star)
            .await
            .map_err(EtlError::LoadFailed)?;

        let rows_loaded = star.facts.len() as u64;
        self.board.succeeded(rows_loaded, Utc::now());
        info!(rows_loaded, total_rows, "ETL run complete");

        Ok(RunOutcome::Loaded {
            rows_loaded,
            total_rows: total_rows as u64,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use erp_core::OrderLineRequest;
    use erp_db::{DbConfig, NewClient, NewProduct, Schema};

    /// ERP store with two validated orders (three lines) and one pending.
    pub(crate) async fn erp_with_sales() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = db
            .clients()
            .insert(&NewClient {
                name: "Gamma Depot".to_string(),
                credit_limit_cents: 10_000_000,
                ..Default::default()
            })
            .await
            .unwrap();

        let mut products = Vec::new();
        for (sku, price, purchase) in [("EAN101", 1_000, 600), ("EAN102", 5_000, 4_000)] {
            products.push(
                db.products()
                    .insert(&NewProduct {
                        sku: sku.to_string(),
                        name: format!("Product {}", sku),
                        price_cents: price,
                        purchase_price_cents: purchase,
                        stock_quantity: 100,
                        safety_stock: 0,
                    })
                    .await
                    .unwrap(),
            );
        }

        let line = |i: usize, quantity| OrderLineRequest {
            product_id: products[i].id.clone(),
            quantity,
        };

        let first = db
            .orders()
            .create_order(&client.id, &[line(0, 3), line(1, 1)], None)
            .await
            .unwrap();
        db.orders().validate_order(&first.order_id, None).await.unwrap();

        let second = db.orders().create_order(&client.id, &[line(0, 2)], None).await.unwrap();
        db.orders().validate_order(&second.order_id, None).await.unwrap();

        db.orders().create_order(&client.id, &[line(1, 9)], None).await.unwrap();
        db
    }

    pub(crate) async fn warehouse() -> Database {
        Database::new(DbConfig::in_memory().schema(Schema::Warehouse))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_loads_one_fact_per_line() {
        let erp = erp_with_sales().await;
        let wh = warehouse().await;
        let pipeline = Pipeline::new(erp, wh.clone(), DimStore::default(), StatusBoard::new());

        let outcome = pipeline.run().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Loaded { rows_loaded: 3, .. }));

        let status = pipeline.board().snapshot();
        assert_eq!(status.status, "Succeeded");
        assert_eq!(status.rows_loaded, 3);
        assert!(status.last_run.is_some());

        let facts = wh.warehouse().facts().await.unwrap();
        assert_eq!(facts.len(), 3);
        let revenue: i64 = facts.iter().map(|f| f.revenue_cents).sum();
        let cost: i64 = facts.iter().map(|f| f.cost_cents).sum();
        let margin: i64 = facts.iter().map(|f| f.margin_cents).sum();
        assert_eq!(margin, revenue - cost);
        assert_eq!(revenue, 3_000 + 5_000 + 2_000);
    }

    #[tokio::test]
    async fn test_rerun_replaces() {
        let erp = erp_with_sales().await;
        let wh = warehouse().await;
        let pipeline = Pipeline::new(erp, wh.clone(), DimStore::default(), StatusBoard::new());

        pipeline.run().await.unwrap();
        pipeline.run().await.unwrap();

        let counts = wh.warehouse().counts().await.unwrap();
        assert_eq!(counts.facts, 3);
        assert_eq!(counts.clients, 1);
        assert_eq!(counts.products, 2);
        assert_eq!(counts.stores, 1);
    }

    #[tokio::test]
    async fn test_empty_extract_leaves_warehouse_untouched() {
        let erp = erp_with_sales().await;
        let wh = warehouse().await;
        let board = StatusBoard::new();
        Pipeline::new(erp, wh.clone(), DimStore::default(), board.clone())
            .run()
            .await
            .unwrap();
        let before = board.snapshot();
        let counts_before = wh.warehouse().counts().await.unwrap();
        let facts_before = wh.warehouse().facts().await.unwrap();

        let empty_erp = Database::new(DbConfig::in_memory()).await.unwrap();
        let pipeline = Pipeline::new(empty_erp, wh.clone(), DimStore::default(), board.clone());
        assert_eq!(pipeline.run().await.unwrap(), RunOutcome::Empty);

        let status = board.snapshot();
        assert_eq!(status.status, "Terminated (empty)");
        assert_eq!(status.rows_loaded, before.rows_loaded);
        assert_eq!(status.last_run, before.last_run);
        assert_eq!(counts_before.facts, 3);
        assert_eq!(wh.warehouse().counts().await.unwrap(), counts_before);
        assert_eq!(wh.warehouse().facts().await.unwrap(), facts_before);
    }

    #[tokio::test]
    async fn test_load_failure_is_published() {
        let erp = erp_with_sales().await;
        // ERP schema has no star tables
        let wrong = Database::new(DbConfig::in_memory()).await.unwrap();
        let pipeline = Pipeline::new(erp, wrong, DimStore::default(), StatusBoard::new());

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, EtlError::LoadFailed(_)));

        let status = pipeline.board().snapshot();
        assert!(status.status.starts_with("Failed: "));
        assert_eq!(status.rows_loaded, 0);
        assert_eq!(status.last_run, None);
    }

    #[tokio::test]
    async fn test_configured_store_is_loaded() {
        let erp = erp_with_sales().await;
        let wh = warehouse().await;
        let store = DimStore {
            store_id: 1,
            name: "North Depot".to_string(),
            city: "Mahajanga".to_string(),
        };
        Pipeline::new(erp, wh.clone(), store, StatusBoard::new())
            .run()
            .await
            .unwrap();

        let city: String = sqlx_city(&wh).await;
        assert_eq!(city, "Mahajanga");
    }

    async fn sqlx_city(wh: &Database) -> String {
        use sqlx::Row;
        sqlx::query("SELECT city FROM dim_store")
            .fetch_one(wh.pool())
            .await
            .unwrap()
            .get("city")
    }

    #[test]
    fn test_outcome_is_tagged() {
        let json = serde_json::to_value(RunOutcome::Loaded { rows_loaded: 3, total_rows: 9 }).unwrap();
        assert_eq!(json["outcome"], "loaded");
        assert_eq!(json["rows_loaded"], 3);

        let json = serde_json::to_value(RunOutcome::Empty).unwrap();
        assert_eq!(json["outcome"], "empty");
    }
}
