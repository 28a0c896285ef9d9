//! # RFM Segmentation
//!
//! Recency, frequency and monetary value per client, standardized and
//! clustered into three segments.
//!
//! ## Pipeline
//! ```text
//! ClientActivity rows (warehouse)
//!     │   recency   = days between the newest order overall and the client's last order
//!     │   frequency = distinct orders
//!     │   monetary  = Σ revenue
//!     ▼
//! standardize each feature: (x − mean) / std   (population std, 0 → 1)
//!     ▼
//! k-means, k = 3, seed 42, 10 restarts
//!     ▼
//! clusters ranked by mean monetary:  lowest → "At risk", middle → "Occasional", highest → "VIP"
//! ```

use serde::{Deserialize, Serialize};

use erp_core::Money;
use erp_db::ClientActivity;

use crate::kmeans::KMeans;

/// Clients needed before clustering makes sense.
pub const MIN_CLIENTS: usize = 3;

/// Segment names, lowest mean monetary value first.
pub const SEGMENT_LABELS: [&str; 3] = ["At risk", "Occasional", "VIP"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
    pub client_id: String,
    pub client_name: String,
    pub recency_days: i64,
    pub frequency: i64,
    pub monetary: Money,
    pub segment: String,
}

/// Response of `segment_customers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SegmentationReport {
    Ready {
        segments: Vec<CustomerSegment>,
    },
    /// Fewer than [`MIN_CLIENTS`] clients have sales in the warehouse.
    InsufficientData {
        clients: usize,
        message: String,
    },
}

impl SegmentationReport {
    fn insufficient(clients: usize) -> Self {
        SegmentationReport::InsufficientData {
            clients,
            message: format!(
                "Not enough data for segmentation (minimum {} clients). Run the ETL first.",
                MIN_CLIENTS
            ),
        }
    }

    pub fn segments(&self) -> &[CustomerSegment] {
        match self {
            SegmentationReport::Ready { segments } => segments,
            SegmentationReport::InsufficientData { .. } => &[],
        }
    }
}

/// Segments `activity`. Pure: no I/O.
pub fn segment(activity: &[ClientActivity]) -> SegmentationReport {
    if activity.len() < MIN_CLIENTS {
        return SegmentationReport::insufficient(activity.len());
    }

    let Some(reference) = activity.iter().map(|a| a.last_order_date).max() else {
        return SegmentationReport::insufficient(0);
    };

    let recency: Vec<i64> = activity
        .iter()
        .map(|a| (reference - a.last_order_date).num_days())
        .collect();

    let features: Vec<Vec<f64>> = activity
        .iter()
        .zip(&recency)
        .map(|(a, &r)| vec![r as f64, a.frequency as f64, a.monetary_cents as f64])
        .collect();

    let Some(clustering) = KMeans::new(SEGMENT_LABELS.len()).fit(&standardize(&features)) else {
        return SegmentationReport::insufficient(activity.len());
    };

    let names = rank_clusters(&clustering.labels, activity, SEGMENT_LABELS.len());

    let segments = activity
        .iter()
        .zip(recency)
        .zip(&clustering.labels)
        .map(|((a, recency_days), &label)| CustomerSegment {
            client_id: a.client_id.clone(),
            client_name: a.name.clone(),
            recency_days,
            frequency: a.frequency,
            monetary: Money::from_cents(a.monetary_cents),
            segment: names[label].to_string(),
        })
        .collect();

    SegmentationReport::Ready { segments }
}

/// Scales every column to zero mean and unit population variance.
/// A constant column is only centred.
pub fn standardize(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    if rows.is_empty() {
        return Vec::new();
    }
    let n = rows.len() as f64;
    let dim = rows[0].len();

    let mut scaled = rows.to_vec();
    for j in 0..dim {
        let mean = rows.iter().map(|r| r[j]).sum::<f64>() / n;
        let variance = rows.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 { std } else { 1.0 };
        for row in scaled.iter_mut() {
            row[j] = (row[j] - mean) / scale;
        }
    }
    scaled
}

/// Label per cluster index, ranked by the cluster's mean monetary value.
/// Empty clusters rank lowest.
fn rank_clusters(labels: &[usize], activity: &[ClientActivity], k: usize) -> Vec<&'static str> {
    let mut sums = vec![0.0; k];
    let mut counts = vec![0usize; k];
    for (&label, a) in labels.iter().zip(activity) {
        sums[label] += a.monetary_cents as f64;
        counts[label] += 1;
    }

    let mut order: Vec<(usize, f64)> = (0..k)
        .map(|c| {
            let mean = if counts[c] == 0 {
                f64::NEG_INFINITY
            } else {
                sums[c] / counts[c] as f64
            };
            (c, mean)
        })
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut names = vec![SEGMENT_LABELS[0]; k];
    for (rank, (cluster, _)) in order.into_iter().enumerate() {
        names[cluster] = SEGMENT_LABELS[rank.min(SEGMENT_LABELS.len() - 1)];
    }
    names
}
