//! # Domain Types
//!
//! Transactional domain types of the distribution ERP.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │      Order      │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  client_id      │   │  id (UUID)      │       │
//! │  │  credit_limit   │   │  status         │   │  sku (unique)   │       │
//! │  │  current_debt   │   │  total_amount   │   │  price          │       │
//! │  │  is_vip         │   │  items: Vec ────┼──►│  stock_quantity │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Append-only journals:  StockMovement (IN/OUT)   AuditEntry (tagged)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An [`Order`] owns its items by value. Items carry `order_id` only as the
//! foreign key they are stored under; there is no pointer back to the order.
//!
//! With the `sqlx` feature these types derive `FromRow` / `Type` so erp-db can
//! map rows straight into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Client
// =============================================================================

/// A customer account with a credit line.
///
/// Debt and limit change independently. Whether the client is blocked is
/// derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub credit_limit_cents: i64,
    pub current_debt_cents: i64,
    pub is_vip: bool,
}

impl Client {
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }

    #[inline]
    pub fn current_debt(&self) -> Money {
        Money::from_cents(self.current_debt_cents)
    }

    /// True when the client owes strictly more than its limit.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.current_debt_cents > self.credit_limit_cents
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product held in the central stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,

    /// Business identifier (EAN), unique.
    pub sku: String,

    pub name: String,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Purchase price in cents, used for warehouse cost and margin.
    pub purchase_price_cents: i64,

    /// Units on hand. Never negative after a committed mutation.
    pub stock_quantity: i64,

    /// Threshold below which an `ALERT_STOCK` entry is written.
    pub safety_stock: i64,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }
}

// =============================================================================
// User
// =============================================================================

/// An operator referenced as the actor of orders, movements and audit rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order. The only transition is `Pending → Validated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Validated,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Validated => "VALIDATED",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order and its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub client_id: String,

    /// Σ unit_price × quantity, fixed when the order is created.
    pub total_amount_cents: i64,

    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,

    /// Lines in insertion order. Loaded separately from the order row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// One order line. Uses the snapshot pattern: the unit price is frozen at
/// order time, discount included, so later price changes never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,

    /// Unit price in cents after discount (frozen).
    pub unit_price_cents: i64,

    /// Discount that was applied, in basis points (1000 = 10%).
    pub discount_bps: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// A requested order line, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// What the caller gets back from order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub total: Money,
    pub status: OrderStatus,
}

// =============================================================================
// Stock Movement
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementDirection {
    In,
    Out,
}

/// Append-only stock journal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub direction: MovementDirection,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Audit Log
// =============================================================================

/// Tag of an audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Order creation refused by the credit rule.
    BlockedOrder,
    CreateOrder,
    /// Validation refused by the stock check.
    StockError,
    /// Stock fell below safety stock after a validation.
    AlertStock,
    ValidateOrder,
    /// Demo data was loaded.
    Seed,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::BlockedOrder => "BLOCKED_ORDER",
            AuditAction::CreateOrder => "CREATE_ORDER",
            AuditAction::StockError => "STOCK_ERROR",
            AuditAction::AlertStock => "ALERT_STOCK",
            AuditAction::ValidateOrder => "VALIDATE_ORDER",
            AuditAction::Seed => "SEED",
        }
    }
}

/// A persisted audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: String,
    pub action: AuditAction,
    pub details: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An audit row about to be written. Id and timestamp are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub details: String,
    pub user_id: Option<String>,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction, details: impl Into<String>, actor_id: Option<&str>) -> Self {
        Self {
            action,
            details: details.into(),
            user_id: actor_id.map(str::to_string),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
