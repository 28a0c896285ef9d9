//! # Pricing and Order Rules
//!
//! The pure half of the order engine: everything that can be decided from
//! values already read inside the transaction.
//!
//! ## Order Lifecycle
//! ```text
//! create_order                                validate_order
//! ────────────                                ──────────────
//! check_credit(client) ──✗──► BLOCKED_ORDER   aggregate_demand(items)
//!        │                                           │
//!        ▼                                           ▼
//! discount_for(is_vip)                        check_stock(demands) ──✗──► STOCK_ERROR
//!        │                                           │
//!        ▼                                           ▼
//! price_line(...) per line                    decrement per line
//!        │                                    needs_restock_alert ──► ALERT_STOCK
//!        ▼                                           │
//! total = Σ line_total                               ▼
//!                                             debt += total
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Client, OrderItem, Product};
use crate::validation::{validate_price_cents, validate_quantity};
use crate::{MAX_ORDER_LINES, VIP_DISCOUNT_BPS};

// =============================================================================
// Credit
// =============================================================================

/// Refuses new orders from a client whose debt exceeds its limit.
pub fn check_credit(client: &Client) -> CoreResult<()> {
    if client.is_blocked() {
        return Err(CoreError::CreditLimitExceeded {
            client_id: client.id.clone(),
            debt_cents: client.current_debt_cents,
            limit_cents: client.credit_limit_cents,
        });
    }
    Ok(())
}

// =============================================================================
// Pricing
// =============================================================================

/// Discount in basis points for a client: flat 10% for VIP, nothing otherwise.
#[inline]
pub fn discount_for(is_vip: bool) -> u32 {
    if is_vip {
        VIP_DISCOUNT_BPS
    } else {
        0
    }
}

/// One priced line, ready to be stored as an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub quantity: i64,
    /// Frozen unit price, discount already applied.
    pub unit_price: Money,
    pub discount_bps: u32,
    pub line_total: Money,
}

/// Prices a line from the product's current price.
pub fn price_line(list_price: Money, quantity: i64, discount_bps: u32) -> PricedLine {
    let unit_price = list_price.apply_percentage_discount(discount_bps);
    PricedLine {
        quantity,
        unit_price,
        discount_bps,
        line_total: unit_price.multiply_quantity(quantity),
    }
}

/// Prices every line of an order for a client.
///
/// Returns the priced lines in input order and the order total. Stored
/// prices are re-checked against `MAX_PRICE_CENTS` so a row written around
/// the repository cannot overflow the total.
pub fn price_order(client: &Client, lines: &[(&Product, i64)]) -> CoreResult<(Vec<PricedLine>, Money)> {
    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        }
        .into());
    }

    let discount = discount_for(client.is_vip);
    let mut priced = Vec::with_capacity(lines.len());
    for (product, qty) in lines {
        validate_price_cents(&format!("price of {}", product.sku), product.price_cents)?;
        validate_quantity(*qty)?;
        priced.push(price_line(product.price(), *qty, discount));
    }
    let total = priced.iter().map(|l| l.line_total).sum();
    Ok((priced, total))
}

// =============================================================================
// Stock
// =============================================================================

/// Total quantity an order needs from one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDemand {
    pub product_id: String,
    pub sku: String,
    pub requested: i64,
    pub available: i64,
}

/// Sums item quantities per product, keeping first-seen product order.
///
/// Two lines on the same product must fit in stock together, so the check
/// pass works on these sums rather than on raw lines.
pub fn aggregate_demand(items: &[OrderItem]) -> Vec<(String, i64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<(String, i64)> = Vec::new();

    for item in items {
        match index.get(item.product_id.as_str()) {
            Some(&i) => out[i].1 += item.quantity,
            None => {
                index.insert(item.product_id.as_str(), out.len());
                out.push((item.product_id.clone(), item.quantity));
            }
        }
    }

    out
}

/// Check pass: fails on the first product whose demand exceeds stock.
pub fn check_stock(order_id: &str, demands: &[StockDemand]) -> CoreResult<()> {
    match demands.iter().find(|d| d.requested > d.available) {
        Some(d) => Err(CoreError::InsufficientStock {
            order_id: order_id.to_string(),
            sku: d.sku.clone(),
            available: d.available,
            requested: d.requested,
        }),
        None => Ok(()),
    }
}

/// True when stock left after a decrement is under the safety threshold.
#[inline]
pub fn needs_restock_alert(stock_after: i64, safety_stock: i64) -> bool {
    stock_after < safety_stock
}

// =============================================================================
// Unit Tests
// =============================================================================
