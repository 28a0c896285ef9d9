//! # erp-db: Database Layer for the Distribution ERP
//!
//! SQLite storage for both the transactional store and the analytical
//! warehouse, plus the transactional order engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ERP Data Flow                                    │
//! │                                                                         │
//! │  HTTP route (POST /orders)        ETL worker          Analytics        │
//! │       │                               │                    │            │
//! │       ▼                               ▼                    ▼            │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     erp-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ erp/         │  │   │
//! │  │   │ WAL, FK, busy │    │ Warehouse...  │    │ warehouse/   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                             │                   │
//! │       ▼                                             ▼                   │
//! │   erp.db (transactional)                    warehouse.db (star)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded migrations for both schemas
//! - [`error`] - `DbError` and the order engine's `EngineError`
//! - [`repository`] - Repositories, including the order engine
//! - [`seed`] - Demo master data and bulk history
//!
//! ## Usage
//!
//! ```rust,ignore
//! use erp_db::{Database, DbConfig, Schema};
//!
//! let erp = Database::new(DbConfig::new("erp.db")).await?;
//! let warehouse = Database::new(DbConfig::new("warehouse.db").schema(Schema::Warehouse)).await?;
//!
//! let receipt = erp.orders().create_order(&client_id, &lines, Some(&user_id)).await?;
//! erp.orders().validate_order(&receipt.order_id, Some(&user_id)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use migrations::Schema;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditRepository;
pub use repository::client::{ClientRepository, NewClient};
pub use repository::order::{OrderRepository, ValidatedOrder};
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::stock::StockRepository;
pub use repository::user::UserRepository;
pub use repository::warehouse::{ClientActivity, WarehouseCounts, WarehouseRepository};
