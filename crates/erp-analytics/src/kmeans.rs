//! # K-Means Clustering
//!
//! Lloyd's algorithm with k-means++ seeding and several restarts; the run
//! with the lowest inertia wins. A fixed seed makes results reproducible
//! across calls.
//!
//! ```text
//! for each of n_init restarts:
//!     seed k centroids (k-means++: next pick ∝ squared distance)
//!     repeat until centroid shift ≤ tol or max_iter:
//!         assign each point to its nearest centroid
//!         move each centroid to the mean of its points
//! keep the restart with the smallest Σ squared distance
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    pub k: usize,
    pub n_init: usize,
    pub max_iter: usize,
    /// Largest squared centroid shift that counts as converged.
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        KMeans {
            k: 3,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index per input point.
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Σ squared distance of each point to its centroid.
    pub inertia: f64,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        KMeans {
            k,
            ..Default::default()
        }
    }

    /// Clusters `points`. None when there are fewer points than clusters.
    ///
    /// All points must have the same dimension.
    pub fn fit(&self, points: &[Vec<f64>]) -> Option<Clustering> {
        if self.k == 0 || points.len() < self.k {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<Clustering> = None;

        for _ in 0..self.n_init.max(1) {
            let seeds = plus_plus_init(points, self.k, &mut rng);
            let candidate = self.lloyd(points, seeds);
            let better = best
                .as_ref()
                .map_or(true, |b| candidate.inertia < b.inertia);
            if better {
                best = Some(candidate);
            }
        }

        best
    }

    fn lloyd(&self, points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> Clustering {
        let dim = points[0].len();
        let mut labels = vec![0; points.len()];

        for _ in 0..self.max_iter {
            for (label, point) in labels.iter_mut().zip(points) {
                *label = nearest(point, &centroids).0;
            }

            let mut sums = vec![vec![0.0; dim]; self.k];
            let mut counts = vec![0usize; self.k];
            for (&label, point) in labels.iter().zip(points) {
                counts[label] += 1;
                for (s, v) in sums[label].iter_mut().zip(point) {
                    *s += v;
                }
            }

            let mut shift: f64 = 0.0;
            for (c, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
                // Empty cluster keeps its previous centroid
                if count == 0 {
                    continue;
                }
                let moved: Vec<f64> = sum.into_iter().map(|s| s / count as f64).collect();
                shift = shift.max(squared_distance(&moved, &centroids[c]));
                centroids[c] = moved;
            }

            if shift <= self.tol {
                break;
            }
        }

        let mut inertia = 0.0;
        for (label, point) in labels.iter_mut().zip(points) {
            let (c, d2) = nearest(point, &centroids);
            *label = c;
            inertia += d2;
        }

        Clustering {
            labels,
            centroids,
            inertia,
        }
    }
}

fn plus_plus_init(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)].clone());

    let mut d2: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = None;
            let mut last_positive = 0;
            for (i, &d) in d2.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                last_positive = i;
                if target < d {
                    chosen = Some(i);
                    break;
                }
                target -= d;
            }
            chosen.unwrap_or(last_positive)
        } else {
            // Every point coincides with a centroid
            rng.gen_range(0..n)
        };

        centroids.push(points[next].clone());
        let newest = &centroids[centroids.len() - 1];
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, newest));
        }
    }

    centroids
}

/// Index of the nearest centroid and its squared distance. Ties go to the
/// lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.2, 0.1],
            vec![0.1, 0.3],
            vec![10.0, 10.0],
            vec![10.2, 9.9],
            vec![20.0, 0.0],
            vec![20.1, 0.2],
            vec![19.8, 0.1],
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let result = KMeans::default().fit(&blobs()).unwrap();
        let l = &result.labels;

        assert!(l[0] == l[1] && l[1] == l[2]);
        assert!(l[3] == l[4]);
        assert!(l[5] == l[6] && l[6] == l[7]);
        assert!(l[0] != l[3] && l[3] != l[5] && l[0] != l[5]);
        assert!(result.inertia < 1.0);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let a = KMeans::default().fit(&blobs()).unwrap();
        let b = KMeans::default().fit(&blobs()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![vec![1.0], vec![2.0]];
        assert!(KMeans::new(3).fit(&points).is_none());
        assert!(KMeans::new(0).fit(&points).is_none());
    }

    #[test]
    fn test_identical_points() {
        let points = vec![vec![1.0, 1.0]; 4];
        let result = KMeans::default().fit(&points).unwrap();
        assert_eq!(result.inertia, 0.0);
        assert_eq!(result.labels.len(), 4);
    }

    #[test]
    fn test_exactly_k_points_have_zero_inertia() {
        let points = vec![vec![0.0], vec![5.0], vec![9.0]];
        let result = KMeans::default().fit(&points).unwrap();
        assert_eq!(result.inertia, 0.0);
        let mut labels = result.labels.clone();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 3);
    }
}
