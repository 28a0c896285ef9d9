//! Headline figures for the dashboard.

use serde::{Deserialize, Serialize};

use erp_core::Money;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_revenue: Money,
    pub total_margin: Money,
}

impl Kpis {
    pub fn from_totals((revenue_cents, margin_cents): (i64, i64)) -> Self {
        Kpis {
            total_revenue: Money::from_cents(revenue_cents),
            total_margin: Money::from_cents(margin_cents),
        }
    }
}
