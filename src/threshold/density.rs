//! Partition density of a cut graph and the density-ratio threshold search.

use crate::components::{components, label_components, CutGraph};
use crate::errors::{ClusterError, Result};
use crate::matrix::DistanceMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RANGE_EPSILON: f64 = 1e-12;

/// Partition density of a cut together with its component count
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartitionDensity {
    pub density: f64,
    pub components: usize,
}

/// Arithmetic range `lo, lo + step, ...` strictly below `hi`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub lo: f64,
    pub hi: f64,
    pub step: f64,
}

impl Default for ThresholdRange {
    fn default() -> Self {
        Self {
            lo: 0.3,
            hi: 0.7,
            step: 0.05,
        }
    }
}

impl ThresholdRange {
    pub fn validate(&self) -> Result<()> {
        if !(self.step > 0.0) {
            return Err(ClusterError::invalid_parameter(
                "step",
                format!("must be positive, got {}", self.step),
            ));
        }
        if !(self.lo < self.hi) {
            return Err(ClusterError::invalid_parameter(
                "range",
                format!("lower bound {} must be below upper bound {}", self.lo, self.hi),
            ));
        }
        Ok(())
    }

    /// Thresholds of the range, computed as `lo + k * step`
    pub fn values(&self) -> Vec<f64> {
        (0..)
            .map(|k| self.lo + k as f64 * self.step)
            .take_while(|t| *t < self.hi - RANGE_EPSILON)
            .collect()
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }
}

/// Partition density of the graph linking every pair below `threshold`.
///
/// Each component with `n > 2` nodes and `m` internal edges contributes
/// `m * (m - (n - 1)) / ((n - 1) * (n - 2))`; the sum is scaled by `2 / T`
/// with `T` the number of cut edges. A cut of singletons yields `(0.0, N)`.
pub fn partition_density(matrix: &DistanceMatrix, threshold: f64) -> PartitionDensity {
    let graph = CutGraph::below(matrix, threshold);
    let labels = label_components(&graph);
    let parts = components(&labels);

    if parts.len() == matrix.size() {
        return PartitionDensity {
            density: 0.0,
            components: parts.len(),
        };
    }

    let total_edges = graph.edge_count() as f64;
    let sum: f64 = parts
        .iter()
        .filter(|nodes| nodes.len() > 2)
        .map(|nodes| {
            let n = nodes.len() as f64;
            let m = graph.internal_edges(nodes) as f64;
            m * (m - (n - 1.0)) / ((n - 1.0) * (n - 2.0))
        })
        .sum();

    PartitionDensity {
        density: 2.0 / total_edges * sum,
        components: parts.len(),
    }
}

/// Pick the threshold with the best density per merged component.
///
/// Runs of densities equal to the last value are stripped from the end, then
/// runs equal to the first value from the front. If either strip consumes
/// the whole range the midpoint of the range is returned.
pub fn best_threshold(matrix: &DistanceMatrix, range: ThresholdRange) -> Result<f64> {
    range.validate()?;

    let mut scored: Vec<(f64, PartitionDensity)> = range
        .values()
        .into_iter()
        .map(|t| (t, partition_density(matrix, t)))
        .collect();

    for (t, pd) in &scored {
        trace!(threshold = t, density = pd.density, components = pd.components, "partition density");
    }

    if !strip_trailing_run(&mut scored) {
        debug!(fallback = range.midpoint(), "density flat at the upper end, using midpoint");
        return Ok(range.midpoint());
    }
    scored.reverse();
    if !strip_trailing_run(&mut scored) {
        debug!(fallback = range.midpoint(), "density flat at the lower end, using midpoint");
        return Ok(range.midpoint());
    }
    scored.reverse();

    let size = matrix.size() as f64;
    let mut best_score = 0.0;
    let mut best = range.midpoint();
    for (t, pd) in &scored {
        let score = pd.density / (size + 1.0 - pd.components as f64);
        if score >= best_score {
            best_score = score;
            best = *t;
        }
    }

    debug!(threshold = best, score = best_score, "selected density threshold");
    Ok(best)
}

/// Remove the run at the end of `scored` equal to its last density.
/// Returns `false` if nothing is left afterwards.
fn strip_trailing_run(scored: &mut Vec<(f64, PartitionDensity)>) -> bool {
    if let Some(&(_, last)) = scored.last() {
        while scored
            .last()
            .is_some_and(|(_, pd)| pd.density == last.density)
        {
            scored.pop();
        }
    }
    !scored.is_empty()
}
