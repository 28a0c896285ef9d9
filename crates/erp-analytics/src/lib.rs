//! # erp-analytics: Warehouse Analytics for the Distribution ERP
//!
//! Customer segmentation, revenue forecasting and KPIs over the star schema
//! built by `erp-etl`. Every call reads the warehouse fresh.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Analytics Data Flow                              │
//! │                                                                         │
//! │  GET /analytics/segments   /forecast          /kpis                    │
//! │          │                     │                 │                      │
//! │          ▼                     ▼                 ▼                      │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 AnalyticsEngine (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   rfm + kmeans          forecast + arima         kpi            │   │
//! │  │   (pure)                (pure)                   (pure)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │          │                     │                 │                      │
//! │          ▼                     ▼                 ▼                      │
//! │   client_activity()     daily_revenue()       totals()                 │
//! │                     warehouse.db (erp-db)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Degraded Answers
//! - Fewer than 3 clients with sales → `SegmentationReport::InsufficientData`
//! - Fewer than 5 sales dates → `ForecastReport` with `status = mock`
//! - Any read failure in `get_kpis` → zeros

pub mod arima;
pub mod error;
pub mod forecast;
pub mod kmeans;
pub mod kpi;
pub mod rfm;

use tracing::{info, warn};

use erp_db::Database;

pub use error::{AnalyticsError, AnalyticsResult};
pub use forecast::{ForecastReport, ForecastStatus, MonthlyForecast};
pub use kpi::Kpis;
pub use rfm::{CustomerSegment, SegmentationReport};

/// Read-only analytics over a warehouse store.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    warehouse: Database,
}

impl AnalyticsEngine {
    pub fn new(warehouse: Database) -> Self {
        AnalyticsEngine { warehouse }
    }

    /// RFM features per client, clustered into three labelled segments.
    pub async fn segment_customers(&self) -> AnalyticsResult<SegmentationReport> {
        let activity = self.warehouse.warehouse().client_activity().await?;
        let report = rfm::segment(&activity);
        info!(clients = activity.len(), segments = report.segments().len(), "Customers segmented");
        Ok(report)
    }

    /// Monthly revenue for the 90 days after the last sale.
    pub async fn forecast_sales(&self) -> AnalyticsResult<ForecastReport> {
        let daily = self.warehouse.warehouse().daily_revenue().await?;
        let report = forecast::forecast(&daily)?;
        info!(dates = daily.len(), status = ?report.status, "Sales forecast computed");
        Ok(report)
    }

    /// Total revenue and margin. Never fails: read errors yield zeros.
    pub async fn get_kpis(&self) -> Kpis {
        match self.warehouse.warehouse().totals().await {
            Ok(totals) => Kpis::from_totals(totals),
            Err(e) => {
                warn!(error = %e, "KPI read failed, reporting zeros");
                Kpis::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use erp_core::star::{DimStore, ExtractedLine, StarSchema};
    use erp_db::{DbConfig, Schema};

    async fn warehouse() -> Database {
        Database::new(DbConfig::in_memory().schema(Schema::Warehouse))
            .await
            .unwrap()
    }

    fn line(order: usize, client: usize, day: u32, unit_price_cents: i64) -> ExtractedLine {
        let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        ExtractedLine {
            order_id: format!("order-{}", order),
            order_date: date.and_hms_opt(10, 0, 0).unwrap().and_utc(),
            client_id: format!("client-{}", client),
            client_name: format!("Client {}", client),
            is_vip: false,
            product_id: "product-1".to_string(),
            sku: "EAN001".to_string(),
            product_name: "Laptop".to_string(),
            purchase_price_cents: unit_price_cents / 2,
            quantity: 1,
            unit_price_cents,
        }
    }

    async fn load(wh: &Database, lines: &[ExtractedLine]) {
        let star: StarSchema = erp_core::star::transform(lines, DimStore::default());
        wh.warehouse().replace_all(&star).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_warehouse_degrades() {
        let engine = AnalyticsEngine::new(warehouse().await);

        let segments = engine.segment_customers().await.unwrap();
        assert!(matches!(segments, SegmentationReport::InsufficientData { clients: 0, .. }));

        let forecast = engine.forecast_sales().await.unwrap();
        assert_eq!(forecast.status, ForecastStatus::Mock);

        assert_eq!(engine.get_kpis().await, Kpis::default());
    }

    #[tokio::test]
    async fn test_segments_and_forecast_over_loaded_warehouse() {
        let wh = warehouse().await;
        let mut lines = Vec::new();
        // client 0: big and frequent, client 1..2: medium, client 3..4: small and stale
        for day in 1..=12 {
            lines.push(line(day as usize, 0, day, 500_000));
        }
        for (i, client) in [1, 2].into_iter().enumerate() {
            lines.push(line(100 + i, client, 10, 80_000));
            lines.push(line(110 + i, client, 11, 80_000));
        }
        for (i, client) in [3, 4].into_iter().enumerate() {
            lines.push(line(200 + i, client, 1, 5_000));
        }
        load(&wh, &lines).await;

        let engine = AnalyticsEngine::new(wh);

        let report = engine.segment_customers().await.unwrap();
        let segments = report.segments();
        assert_eq!(segments.len(), 5);
        let top = segments.iter().find(|s| s.client_id == "client-0").unwrap();
        assert_eq!(top.segment, "VIP");
        assert_eq!(top.frequency, 12);
        assert_eq!(top.recency_days, 0);

        let forecast = engine.forecast_sales().await.unwrap();
        assert_eq!(forecast.status, ForecastStatus::Success);
        assert_eq!(forecast.data.first().unwrap().month, "2024-05");

        let kpis = engine.get_kpis().await;
        let revenue: i64 = lines.iter().map(|l| l.unit_price_cents).sum();
        assert_eq!(kpis.total_revenue.cents(), revenue);
        assert_eq!(kpis.total_margin.cents(), revenue - revenue / 2);
    }

    #[tokio::test]
    async fn test_kpis_are_zero_on_read_failure() {
        // ERP schema: no fact_sales table
        let erp = Database::new(DbConfig::in_memory()).await.unwrap();
        let engine = AnalyticsEngine::new(erp);
        assert_eq!(engine.get_kpis().await, Kpis::default());
        assert!(engine.segment_customers().await.is_err());
    }
}
