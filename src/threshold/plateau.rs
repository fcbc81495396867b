//! Plateau search over the weighted average degree of cut graphs.

use crate::matrix::DistanceMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Thresholds `0.90, 0.85, ..., 0.05`
pub fn default_thresholds() -> Vec<f64> {
    (1..19).rev().map(|i| i as f64 * 0.05).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateauOptions {
    /// Descending thresholds; the first one only anchors the sweep
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
    /// Weight surviving scores by `-ln(1 - x)` instead of `x`
    #[serde(default = "default_log_weights")]
    pub log_weights: bool,
}

fn default_log_weights() -> bool {
    true
}

impl Default for PlateauOptions {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
            log_weights: default_log_weights(),
        }
    }
}

/// Weighted average degree of the graph linking pairs below `threshold`.
///
/// Returns `None` when no pair survives the cut.
pub fn weighted_average_degree(
    matrix: &DistanceMatrix,
    threshold: f64,
    log_weights: bool,
) -> Option<f64> {
    let mut degrees: BTreeMap<usize, f64> = BTreeMap::new();

    for (i, j, score) in matrix.upper_triangle() {
        if score < threshold {
            let weight = if log_weights { -(1.0 - score).ln() } else { score };
            *degrees.entry(i).or_insert(0.0) += weight;
            *degrees.entry(j).or_insert(0.0) += weight;
        }
    }

    if degrees.is_empty() {
        return None;
    }
    Some(degrees.values().sum::<f64>() / degrees.len() as f64)
}

/// Mean threshold of the longest degree plateau, or `None` if every
/// plateau holds a single threshold.
pub fn find_threshold(matrix: &DistanceMatrix, options: &PlateauOptions) -> Option<f64> {
    let mut previous = weighted_average_degree(matrix, 1.0, false).unwrap_or(0.0);
    let mut plateaus: Vec<Vec<f64>> = vec![vec![1.0]];

    for &threshold in options.thresholds.iter().skip(1) {
        // cuts without edges, or with zero total weight, carry no signal
        let Some(degree) = weighted_average_degree(matrix, threshold, options.log_weights)
            .filter(|degree| *degree != 0.0)
        else {
            continue;
        };

        let change = degree - previous;
        previous = degree;
        trace!(threshold, degree, change, "weighted average degree");

        match plateaus.last_mut() {
            Some(current) if change >= 0.0 => current.push(threshold),
            _ => plateaus.push(vec![threshold]),
        }
    }

    let longest = plateaus
        .iter()
        .filter(|plateau| plateau.len() > 1)
        .fold(None::<&Vec<f64>>, |best, plateau| match best {
            Some(best) if best.len() >= plateau.len() => Some(best),
            _ => Some(plateau),
        })?;

    let mean = longest.iter().sum::<f64>() / longest.len() as f64;
    debug!(
        plateaus = plateaus.len(),
        length = longest.len(),
        threshold = mean,
        "selected plateau threshold"
    );
    Some(mean)
}
