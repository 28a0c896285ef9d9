//! # Star Schema
//!
//! Row types of the analytical warehouse and the pure transform that builds
//! them from extracted order lines.
//!
//! ## Model
//! ```text
//!                     ┌─────────────┐
//!                     │   DimTime   │ date_key, year, month, day, season
//!                     └──────┬──────┘
//!                            │
//! ┌─────────────┐     ┌──────▼──────┐     ┌─────────────┐
//! │ DimProduct  │◄────│  FactSales  │────►│  DimClient  │
//! └─────────────┘     └──────┬──────┘     └─────────────┘
//!                            │
//!                     ┌──────▼──────┐
//!                     │  DimStore   │ single synthetic row
//!                     └─────────────┘
//! ```
//!
//! One fact row per extracted line. Revenue uses the unit price frozen on
//! the order item; cost uses the product's current purchase price.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::DEFAULT_STORE_ID;

// =============================================================================
// Extracted Line
// =============================================================================

/// One order line of a validated order, joined with its product and client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExtractedLine {
    pub order_id: String,
    pub order_date: DateTime<Utc>,
    pub client_id: String,
    pub client_name: String,
    pub is_vip: bool,
    pub product_id: String,
    pub sku: String,
    pub product_name: String,
    pub purchase_price_cents: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

// =============================================================================
// Season
// =============================================================================

/// Meteorological season of a month (northern-hemisphere buckets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Buckets: {12, 1, 2} Winter, {3, 4, 5} Spring, {6, 7, 8} Summer,
    /// anything else Autumn.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }
}

// =============================================================================
// Dimension and Fact Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DimTime {
    pub date_key: NaiveDate,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub season: Season,
}

impl DimTime {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date_key: date,
            year: date.year(),
            month: date.month() as i32,
            day: date.day() as i32,
            season: Season::from_month(date.month()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DimProduct {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub purchase_price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DimClient {
    pub client_id: String,
    pub name: String,
    pub is_vip: bool,
    /// "VIP" or "Standard".
    pub segment: String,
    pub geography: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DimStore {
    pub store_id: i64,
    pub name: String,
    pub city: String,
}

impl Default for DimStore {
    fn default() -> Self {
        Self {
            store_id: DEFAULT_STORE_ID,
            name: "Central Store".to_string(),
            city: "Antananarivo".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FactSales {
    pub order_id: String,
    pub product_id: String,
    pub client_id: String,
    pub date_key: NaiveDate,
    pub store_id: i64,
    pub quantity: i64,
    pub revenue_cents: i64,
    pub cost_cents: i64,
    pub margin_cents: i64,
}

impl FactSales {
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }

    #[inline]
    pub fn margin(&self) -> Money {
        Money::from_cents(self.margin_cents)
    }
}

/// Placeholder geography until clients carry an address.
pub const DEFAULT_GEOGRAPHY: &str = "National";

// =============================================================================
// Star Schema
// =============================================================================

/// A complete warehouse image, loaded in one replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarSchema {
    pub time: Vec<DimTime>,
    pub products: Vec<DimProduct>,
    pub clients: Vec<DimClient>,
    pub stores: Vec<DimStore>,
    pub facts: Vec<FactSales>,
}

impl StarSchema {
    /// Rows written by a load: all dimensions plus facts.
    pub fn total_rows(&self) -> usize {
        self.time.len()
            + self.products.len()
            + self.clients.len()
            + self.stores.len()
            + self.facts.len()
    }
}

/// Builds the star schema from extracted lines.
///
/// Dimensions are de-duplicated on their key and sorted by it, so the same
/// input always yields the same rows.
pub fn transform(lines: &[ExtractedLine], store: DimStore) -> StarSchema {
    let mut time: BTreeMap<NaiveDate, DimTime> = BTreeMap::new();
    let mut products: BTreeMap<&str, DimProduct> = BTreeMap::new();
    let mut clients: BTreeMap<&str, DimClient> = BTreeMap::new();
    let mut facts = Vec::with_capacity(lines.len());

    for line in lines {
        let date = line.order_date.date_naive();
        time.entry(date).or_insert_with(|| DimTime::from_date(date));

        products
            .entry(line.product_id.as_str())
            .or_insert_with(|| DimProduct {
                product_id: line.product_id.clone(),
                sku: line.sku.clone(),
                name: line.product_name.clone(),
                purchase_price_cents: line.purchase_price_cents,
            });

        clients
            .entry(line.client_id.as_str())
            .or_insert_with(|| DimClient {
                client_id: line.client_id.clone(),
                name: line.client_name.clone(),
                is_vip: line.is_vip,
                segment: if line.is_vip { "VIP" } else { "Standard" }.to_string(),
                geography: DEFAULT_GEOGRAPHY.to_string(),
            });

        let revenue = Money::from_cents(line.unit_price_cents).multiply_quantity(line.quantity);
        let cost = Money::from_cents(line.purchase_price_cents).multiply_quantity(line.quantity);

        facts.push(FactSales {
            order_id: line.order_id.clone(),
            product_id: line.product_id.clone(),
            client_id: line.client_id.clone(),
            date_key: date,
            store_id: store.store_id,
            quantity: line.quantity,
            revenue_cents: revenue.cents(),
            cost_cents: cost.cents(),
            margin_cents: (revenue - cost).cents(),
        });
    }

    StarSchema {
        time: time.into_values().collect(),
        products: products.into_values().collect(),
        clients: clients.into_values().collect(),
        stores: vec![store],
        facts,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
