//! # Database Migrations
//!
//! Embedded SQL migrations for both stores.
//!
//! ## Two Schemas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  migrations/erp/         → transactional store (orders, stock, audit)  │
//! │  migrations/warehouse/   → star schema (dim_*, fact_sales)             │
//! │                                                                         │
//! │  Each store tracks its own _sqlx_migrations table, so the two          │
//! │  schemas evolve independently.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Add `NNN_description.sql` to the right directory
//! 2. **NEVER** modify an applied migration, add a new one

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Transactional schema, embedded at compile time.
static ERP_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/erp");

/// Warehouse schema, embedded at compile time.
static WAREHOUSE_MIGRATOR: Migrator = sqlx::migrate!("../../migrations/warehouse");

/// Which schema a [`crate::Database`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Erp,
    Warehouse,
}

impl Schema {
    fn migrator(self) -> &'static Migrator {
        match self {
            Schema::Erp => &ERP_MIGRATOR,
            Schema::Warehouse => &WAREHOUSE_MIGRATOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Schema::Erp => "erp",
            Schema::Warehouse => "warehouse",
        }
    }
}

/// Runs all pending migrations of a schema. Idempotent.
pub async fn run_migrations(pool: &SqlitePool, schema: Schema) -> DbResult<()> {
    info!(schema = schema.as_str(), "Checking for pending migrations");

    schema.migrator().run(pool).await?;

    info!(schema = schema.as_str(), "All migrations applied successfully");
    Ok(())
}
