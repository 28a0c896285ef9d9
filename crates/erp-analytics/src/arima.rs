//! # ARIMA(1,1,1)
//!
//! First difference of the series, then an ARMA(1,1) without constant:
//!
//! ```text
//! y_t = x_t − x_{t−1}
//! y_t = φ·y_{t−1} + e_t + θ·e_{t−1}
//! ```
//!
//! Fitted by conditional sum of squares: residuals start from e = 0 and the
//! pair (φ, θ) minimizing Σ e_t² is found by a coarse grid over the
//! stationary/invertible square, refined around the best point.

use crate::error::{AnalyticsError, AnalyticsResult};

/// Fitted coefficients stay strictly inside this bound.
const COEFF_BOUND: f64 = 0.99;
const GRID_STEP: f64 = 0.05;
const REFINE_ROUNDS: usize = 4;
const REFINE_SPAN: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arima111 {
    pub phi: f64,
    pub theta: f64,
    /// Conditional sum of squared residuals at (phi, theta).
    pub css: f64,
    last_level: f64,
    last_diff: f64,
    last_residual: f64,
}

impl Arima111 {
    /// Fits the model to `series` (oldest first). Needs at least 3 points.
    pub fn fit(series: &[f64]) -> AnalyticsResult<Self> {
        if series.len() < 3 {
            return Err(AnalyticsError::DegenerateSeries(format!(
                "{} points, at least 3 required",
                series.len()
            )));
        }
        if series.iter().any(|x| !x.is_finite()) {
            return Err(AnalyticsError::DegenerateSeries(
                "series contains non-finite values".into(),
            ));
        }

        let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

        let mut best: Option<(f64, f64, f64)> = None;

        let steps = (COEFF_BOUND / GRID_STEP).floor() as i32;
        for i in -steps..=steps {
            for j in -steps..=steps {
                consider(&diffs, i as f64 * GRID_STEP, j as f64 * GRID_STEP, &mut best);
            }
        }

        let mut step = GRID_STEP;
        for _ in 0..REFINE_ROUNDS {
            let Some((phi0, theta0, _)) = best else { break };
            step /= REFINE_SPAN as f64;
            for i in -REFINE_SPAN..=REFINE_SPAN {
                for j in -REFINE_SPAN..=REFINE_SPAN {
                    let phi = (phi0 + i as f64 * step).clamp(-COEFF_BOUND, COEFF_BOUND);
                    let theta = (theta0 + j as f64 * step).clamp(-COEFF_BOUND, COEFF_BOUND);
                    consider(&diffs, phi, theta, &mut best);
                }
            }
        }

        let Some((phi, theta, sse)) = best else {
            return Err(AnalyticsError::FitFailed(
                "objective is not finite for any coefficients".into(),
            ));
        };

        let (_, last_residual) = css(&diffs, phi, theta);
        Ok(Arima111 {
            phi,
            theta,
            css: sse,
            last_level: series[series.len() - 1],
            last_diff: diffs[diffs.len() - 1],
            last_residual,
        })
    }

    /// Point forecasts of the next `steps` levels.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(steps);
        let mut level = self.last_level;
        let mut diff = self.last_diff;

        for h in 0..steps {
            diff = if h == 0 {
                self.phi * diff + self.theta * self.last_residual
            } else {
                self.phi * diff
            };
            level += diff;
            out.push(level);
        }
        out
    }
}

/// Keeps (phi, theta, sse) in `best` when its objective is finite and lower.
fn consider(diffs: &[f64], phi: f64, theta: f64, best: &mut Option<(f64, f64, f64)>) {
    let (sse, _) = css(diffs, phi, theta);
    if sse.is_finite() && best.map_or(true, |(_, _, b)| sse < b) {
        *best = Some((phi, theta, sse));
    }
}

/// Σ e_t² and the final residual for the differenced series.
fn css(diffs: &[f64], phi: f64, theta: f64) -> (f64, f64) {
    let mut prev = 0.0;
    let mut sse = 0.0;
    for t in 1..diffs.len() {
        let e = diffs[t] - phi * diffs[t - 1] - theta * prev;
        sse += e * e;
        prev = e;
    }
    (sse, prev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_recovers_ar_coefficient() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut level = 1_000.0;
        let mut diff: f64 = 0.0;
        let mut series = vec![level];
        for _ in 0..400 {
            diff = 0.6 * diff + rng.gen_range(-1.0..1.0);
            level += diff;
            series.push(level);
        }

        let model = Arima111::fit(&series).unwrap();
        assert!((model.phi - 0.6).abs() < 0.2, "phi = {}", model.phi);
        assert!(model.theta.abs() < 0.25, "theta = {}", model.theta);
        assert!(model.phi.abs() <= COEFF_BOUND && model.theta.abs() <= COEFF_BOUND);
    }

    #[test]
    fn test_trend_is_extrapolated() {
        let series: Vec<f64> = (1..=10).map(|i| i as f64 * 10.0).collect();
        let model = Arima111::fit(&series).unwrap();
        let forecast = model.forecast(3);

        assert_eq!(forecast.len(), 3);
        assert!(forecast[0] > 100.0);
        assert!(forecast[1] > forecast[0]);
        assert!(forecast[2] > forecast[1]);
    }

    #[test]
    fn test_constant_series_stays_flat() {
        let model = Arima111::fit(&[50.0; 6]).unwrap();
        assert_eq!(model.css, 0.0);
        assert!(model.forecast(5).iter().all(|&x| x == 50.0));
    }

    #[test]
    fn test_degenerate_series() {
        assert!(matches!(
            Arima111::fit(&[1.0, 2.0]),
            Err(AnalyticsError::DegenerateSeries(_))
        ));
        assert!(matches!(
            Arima111::fit(&[1.0, f64::NAN, 3.0, 4.0]),
            Err(AnalyticsError::DegenerateSeries(_))
        ));
    }

    #[test]
    fn test_overflowing_series_fails_fit() {
        let series = [0.0, f64::MAX, -f64::MAX, f64::MAX, 0.0];
        assert!(Arima111::fit(&series).is_err());
    }
}
