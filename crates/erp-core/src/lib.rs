//! # erp-core: Pure Business Logic for the Distribution ERP
//!
//! This crate holds every business rule of the ERP as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Distribution ERP Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 erp-server (axum HTTP routes)                   │   │
//! │  │     /orders   /etl/trigger   /etl/status   /analytics/*         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ erp-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │   star    │  │ validation│  │   │
//! │  │   │  Client   │  │ VIP -10%  │  │  DimTime  │  │  order    │  │   │
//! │  │   │  Order    │  │ credit    │  │ FactSales │  │  input    │  │   │
//! │  │   │  Product  │  │ stock plan│  │  seasons  │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          erp-db / erp-etl / erp-analytics (I/O layers)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Transactional domain types (Client, Product, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types and their audit entries
//! - [`validation`] - Order input validation
//! - [`pricing`] - Credit rule, VIP pricing, stock check/act planning
//! - [`star`] - Warehouse rows and the star-schema transform
//!
//! ## Example Usage
//!
//! ```rust
//! use erp_core::money::Money;
//! use erp_core::pricing::{discount_for, price_line};
//!
//! // VIP clients get 10% off, frozen into the unit price
//! let discount = discount_for(true);
//! let line = price_line(Money::from_cents(120_000), 2, discount);
//! assert_eq!(line.unit_price.cents(), 108_000);
//! assert_eq!(line.line_total.cents(), 216_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod star;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Discount granted to VIP clients, in basis points (1000 = 10%).
pub const VIP_DISCOUNT_BPS: u32 = 1000;

/// Maximum number of lines accepted in a single order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 before stock is reserved.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Highest accepted price, credit limit or debt in cents (1 billion in major units).
///
/// Keeps `price × MAX_ITEM_QUANTITY × MAX_ORDER_LINES` well inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Identifier of the single synthetic store row in the warehouse.
///
/// The transactional system is single-store, so every fact row points here.
pub const DEFAULT_STORE_ID: i64 = 1;
