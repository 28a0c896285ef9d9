//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP route / ETL worker / analytics engine                            │
//! │       │                                                                 │
//! │       │  db.orders().validate_order(id, actor)                          │
//! │       ▼                                                                 │
//! │  OrderRepository (order engine)                                        │
//! │  ├── create_order    one transaction, credit rule, VIP pricing         │
//! │  ├── validate_order  claim, check pass, act pass, debt                 │
//! │  └── get_order       order + items                                     │
//! │       │                                                                 │
//! │       │  uses the connection-level helpers of audit / stock / client   │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Clients and credit lines
//! - [`ProductRepository`](product::ProductRepository) - Catalog and stock levels
//! - [`UserRepository`](user::UserRepository) - Operators
//! - [`OrderRepository`](order::OrderRepository) - The transactional order engine
//! - [`AuditRepository`](audit::AuditRepository) - Append-only audit log
//! - [`StockRepository`](stock::StockRepository) - Append-only stock journal
//! - [`WarehouseRepository`](warehouse::WarehouseRepository) - ETL extract, star-schema load and reads

pub mod audit;
pub mod client;
pub mod order;
pub mod product;
pub mod stock;
pub mod user;
pub mod warehouse;
