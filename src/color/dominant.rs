//! Dominant color extraction by seeded k-means clustering
//!
//! Pixels are clustered in RGB space with Lloyd's algorithm. Each restart is
//! seeded with k-means++ from its own deterministic RNG stream; the restart
//! with the lowest inertia (sum of squared distances) wins and ties keep the
//! earliest restart. Centroids are reported most-populous first.
//!
//! Identical pixels are folded into weighted points before clustering, which
//! gives the same partition as clustering every pixel individually.

use std::collections::HashMap;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::ClusteringConfig;
use crate::{AnalysisError, Result};

/// One cluster centroid with its population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    /// Centroid truncated to 8-bit channels
    pub rgb: [u8; 3],
    /// Number of pixels assigned to this cluster
    pub count: usize,
    /// Fraction of the pixel set assigned to this cluster
    pub share: f32,
}

/// Result of a single clustering restart
#[derive(Debug, Clone)]
struct Clustering {
    centroids: Vec<[f64; 3]>,
    populations: Vec<usize>,
    inertia: f64,
}

/// Weighted point: a distinct color and how many pixels carry it
#[derive(Debug, Clone, Copy)]
struct WeightedColor {
    color: [f64; 3],
    count: usize,
}

/// k-means dominant color extractor with pinned seeding
#[derive(Debug, Clone)]
pub struct DominantColorExtractor {
    seed: u64,
    restarts: usize,
    max_iterations: usize,
}

impl Default for DominantColorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DominantColorExtractor {
    /// Create an extractor with seed 42 and 10 restarts
    pub fn new() -> Self {
        Self::with_config(&ClusteringConfig::default())
    }

    /// Create an extractor from clustering configuration
    pub fn with_config(config: &ClusteringConfig) -> Self {
        Self {
            seed: config.seed,
            restarts: config.restarts.max(1),
            max_iterations: config.max_iterations.max(1),
        }
    }

    /// Number of distinct colors in a pixel set
    pub fn distinct_colors(pixels: &[[u8; 3]]) -> usize {
        fold_pixels(pixels).len()
    }

    /// Extract up to `k` dominant colors, most common first
    ///
    /// # Errors
    ///
    /// Returns `ClusteringError` if the pixel set is empty, `k` is zero or the
    /// set holds fewer than `k` distinct colors.
    pub fn extract(&self, pixels: &[[u8; 3]], k: usize) -> Result<Vec<DominantColor>> {
        if pixels.is_empty() {
            return Err(AnalysisError::clustering("pixel set is empty"));
        }
        if k == 0 {
            return Err(AnalysisError::clustering("cluster count must be at least 1"));
        }

        let points = fold_pixels(pixels);
        if points.len() < k {
            return Err(AnalysisError::clustering(format!(
                "{} distinct colors cannot form {} clusters",
                points.len(),
                k
            )));
        }

        let mut best: Option<Clustering> = None;
        for restart in 0..self.restarts {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(restart as u64));
            let run = self.lloyd(&points, k, &mut rng);
            trace!("k-means restart {}: inertia {:.2}", restart, run.inertia);

            let better = match &best {
                Some(current) => run.inertia < current.inertia,
                None => true,
            };
            if better {
                best = Some(run);
            }
        }

        let best = best.ok_or_else(|| AnalysisError::clustering("no clustering restarts ran"))?;
        debug!(
            "k-means: k={} over {} distinct colors, best inertia {:.2}",
            k,
            points.len(),
            best.inertia
        );

        let total = pixels.len() as f32;
        let mut order: Vec<usize> = (0..best.centroids.len()).collect();
        order.sort_by(|&a, &b| best.populations[b].cmp(&best.populations[a]));

        Ok(order
            .into_iter()
            .map(|i| DominantColor {
                rgb: truncate(best.centroids[i]),
                count: best.populations[i],
                share: best.populations[i] as f32 / total,
            })
            .collect())
    }

    /// Extract up to `k` dominant colors as bare RGB triples
    pub fn extract_rgb(&self, pixels: &[[u8; 3]], k: usize) -> Result<Vec<[u8; 3]>> {
        Ok(self
            .extract(pixels, k)?
            .into_iter()
            .map(|c| c.rgb)
            .collect())
    }

    fn lloyd(&self, points: &[WeightedColor], k: usize, rng: &mut StdRng) -> Clustering {
        let mut centroids = seed_plus_plus(points, k, rng);
        let k = centroids.len();
        let mut assignment = vec![usize::MAX; points.len()];

        for _ in 0..self.max_iterations {
            let mut changed = false;
            for (i, point) in points.iter().enumerate() {
                let nearest = nearest_centroid(&centroids, point.color).0;
                if assignment[i] != nearest {
                    assignment[i] = nearest;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            let mut sums = vec![[0.0f64; 3]; k];
            let mut weights = vec![0usize; k];
            for (point, &cluster) in points.iter().zip(&assignment) {
                let w = point.count as f64;
                for c in 0..3 {
                    sums[cluster][c] += point.color[c] * w;
                }
                weights[cluster] += point.count;
            }
            for cluster in 0..k {
                // An emptied cluster keeps its previous centroid
                if weights[cluster] > 0 {
                    let w = weights[cluster] as f64;
                    centroids[cluster] = [
                        sums[cluster][0] / w,
                        sums[cluster][1] / w,
                        sums[cluster][2] / w,
                    ];
                }
            }
        }

        let mut populations = vec![0usize; k];
        let mut inertia = 0.0;
        for point in points {
            let (cluster, dist) = nearest_centroid(&centroids, point.color);
            populations[cluster] += point.count;
            inertia += dist * point.count as f64;
        }

        Clustering {
            centroids,
            populations,
            inertia,
        }
    }
}

/// k-means++ seeding weighted by pixel counts
fn seed_plus_plus(points: &[WeightedColor], k: usize, rng: &mut StdRng) -> Vec<[f64; 3]> {
    let mut chosen = Vec::with_capacity(k);
    let mut centroids = Vec::with_capacity(k);

    let first_weights: Vec<f64> = points.iter().map(|p| p.count as f64).collect();
    let first = weighted_pick(&first_weights, rng).unwrap_or(0);
    chosen.push(first);
    centroids.push(points[first].color);

    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p.color, points[first].color))
        .collect();

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .zip(&distances)
            .map(|(p, d)| p.count as f64 * d)
            .collect();

        let next = match weighted_pick(&weights, rng) {
            Some(index) => index,
            // All remaining mass sits on chosen colors
            None => match (0..points.len()).find(|i| !chosen.contains(i)) {
                Some(index) => index,
                None => break,
            },
        };
        chosen.push(next);
        centroids.push(points[next].color);

        for (d, p) in distances.iter_mut().zip(points) {
            *d = d.min(squared_distance(p.color, points[next].color));
        }
    }

    centroids
}

fn weighted_pick(weights: &[f64], rng: &mut StdRng) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if *w > 0.0 && target < cumulative {
            return Some(i);
        }
    }
    weights.iter().rposition(|w| *w > 0.0)
}

/// Index of the nearest centroid and its squared distance; ties go to the lower index
fn nearest_centroid(centroids: &[[f64; 3]], color: [f64; 3]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(*centroid, color);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn squared_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Fold identical pixels into weighted points, in first-seen order
fn fold_pixels(pixels: &[[u8; 3]]) -> Vec<WeightedColor> {
    let mut index: HashMap<[u8; 3], usize> = HashMap::new();
    let mut points: Vec<WeightedColor> = Vec::new();
    for pixel in pixels {
        match index.get(pixel) {
            Some(&i) => points[i].count += 1,
            None => {
                index.insert(*pixel, points.len());
                points.push(WeightedColor {
                    color: [pixel[0] as f64, pixel[1] as f64, pixel[2] as f64],
                    count: 1,
                });
            }
        }
    }
    points
}

fn truncate(centroid: [f64; 3]) -> [u8; 3] {
    [
        centroid[0].clamp(0.0, 255.0) as u8,
        centroid[1].clamp(0.0, 255.0) as u8,
        centroid[2].clamp(0.0, 255.0) as u8,
    ]
}
