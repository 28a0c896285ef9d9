//! # Sales Forecast
//!
//! Daily revenue → ARIMA(1,1,1) → 90 daily predictions → monthly totals.
//!
//! With fewer than [`MIN_DATES`] distinct dates there is nothing to fit;
//! the report falls back to three fixed placeholder months and says so in
//! its `status`.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use erp_core::Money;

use crate::arima::Arima111;
use crate::error::AnalyticsResult;

/// Distinct sales dates needed before a model is fitted.
pub const MIN_DATES: usize = 5;

/// Days predicted past the last observed date.
pub const HORIZON_DAYS: usize = 90;

/// Placeholder predictions (major units) for months +1..+3.
const MOCK_PREDICTIONS: [i64; 3] = [12_500, 13_200, 14_100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Success,
    /// Not enough history; `data` holds placeholder values.
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyForecast {
    /// `YYYY-MM`, or `Month +n` for placeholder values.
    pub month: String,
    pub prediction: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub status: ForecastStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Vec<MonthlyForecast>,
}

impl ForecastReport {
    pub fn mock() -> Self {
        ForecastReport {
            status: ForecastStatus::Mock,
            message: Some("Simulated next 3 months (not enough history).".to_string()),
            data: MOCK_PREDICTIONS
                .iter()
                .enumerate()
                .map(|(i, &major)| MonthlyForecast {
                    month: format!("Month +{}", i + 1),
                    prediction: Money::from_major(major),
                })
                .collect(),
        }
    }
}

/// Forecasts from `(date, revenue cents)` rows sorted by date.
pub fn forecast(daily: &[(NaiveDate, i64)]) -> AnalyticsResult<ForecastReport> {
    if daily.len() < MIN_DATES {
        return Ok(ForecastReport::mock());
    }

    let series: Vec<f64> = daily.iter().map(|&(_, cents)| cents as f64).collect();
    let model = Arima111::fit(&series)?;
    let predictions = model.forecast(HORIZON_DAYS);

    // Non-empty: MIN_DATES > 0
    let last = daily[daily.len() - 1].0;
    Ok(ForecastReport {
        status: ForecastStatus::Success,
        message: None,
        data: by_month(last, &predictions),
    })
}

/// Sums daily predictions dated `last + 1 ..` into calendar months.
fn by_month(last: NaiveDate, predictions: &[f64]) -> Vec<MonthlyForecast> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for (i, &value) in predictions.iter().enumerate() {
        let date = last + Duration::days(i as i64 + 1);
        *months.entry(date.format("%Y-%m").to_string()).or_default() += value;
    }

    months
        .into_iter()
        .map(|(month, cents)| MonthlyForecast {
            month,
            prediction: Money::from_cents(cents.round() as i64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_short_history_is_mock() {
        let daily: Vec<_> = (1..=4).map(|d| (day(d), 10_000)).collect();
        let report = forecast(&daily).unwrap();

        assert_eq!(report.status, ForecastStatus::Mock);
        let values: Vec<i64> = report.data.iter().map(|m| m.prediction.major()).collect();
        assert_eq!(values, vec![12_500, 13_200, 14_100]);
        assert_eq!(report.data[0].month, "Month +1");
    }

    #[test]
    fn test_flat_history_forecasts_by_month() {
        let daily: Vec<_> = (1..=10).map(|d| (day(d), 10_000)).collect();
        let report = forecast(&daily).unwrap();

        assert_eq!(report.status, ForecastStatus::Success);
        // Jan 11 .. Apr 9 (2024 is a leap year)
        let months: Vec<&str> = report.data.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03", "2024-04"]);

        let jan = &report.data[0];
        assert_eq!(jan.prediction, Money::from_cents(21 * 10_000));
        let total: i64 = report.data.iter().map(|m| m.prediction.cents()).sum();
        assert_eq!(total, 90 * 10_000);
    }

    #[test]
    fn test_mock_serializes_status() {
        let json = serde_json::to_value(ForecastReport::mock()).unwrap();
        assert_eq!(json["status"], "mock");
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
    }
}
