//! Markov clustering (MCL).
//!
//! The matrix is turned into a column-stochastic flow matrix, then expansion
//! (matrix power) and inflation (elementwise power followed by column
//! normalization) alternate until the flow is idempotent or the step budget
//! runs out. Rows that keep mass after convergence are attractors; each
//! attractor claims the columns it still reaches.
//!
//! # Example
//!
//! ```rust
//! use taxoclust::markov::{mcl, MclOptions};
//! use taxoclust::matrix::{DistanceMatrix, TaxonSet};
//!
//! let matrix = DistanceMatrix::from_condensed(&[0.1, 0.9, 0.9]).unwrap();
//! let taxa = TaxonSet::new(["a", "b", "c"]).unwrap();
//! let result = mcl(&matrix, &taxa, &MclOptions::with_threshold(0.5)).unwrap();
//!
//! assert_eq!(result.assignment.len(), 2);
//! assert!(result.converged);
//! ```

mod stochastic;

use crate::assignment::{AssignmentShape, ClusterAssignment, ClusterId};
use crate::components::components;
use crate::errors::{ClusterError, Result};
use crate::matrix::{DistanceMatrix, MatrixSemantics, TaxonSet, WeightTransform};
use std::fmt;
use std::sync::Arc;
use stochastic::TransitionMatrix;
use tracing::{debug, warn};

/// Diagonal applied before the first normalization
#[derive(Clone, Default)]
pub enum SelfLoops {
    /// Every node loops to itself with weight 1
    #[default]
    Unit,
    /// Keep whatever the diagonal holds
    Keep,
    /// Compute the loop weight from the node's column
    Custom(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>),
}

impl SelfLoops {
    pub fn custom(weight: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(weight))
    }
}

impl fmt::Debug for SelfLoops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("Unit"),
            Self::Keep => f.write_str("Keep"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MclOptions {
    /// Cut applied before the flow starts; `None` uses the matrix as given
    pub threshold: Option<f64>,
    pub max_steps: usize,
    pub inflation: f64,
    pub expansion: u32,
    pub self_loops: SelfLoops,
    /// Weight of the edges surviving the cut
    pub logs: WeightTransform,
    pub semantics: MatrixSemantics,
    /// Entries at or below this value count as zero
    pub tolerance: f64,
}

impl Default for MclOptions {
    fn default() -> Self {
        Self {
            threshold: None,
            max_steps: 1000,
            inflation: 2.0,
            expansion: 2,
            self_loops: SelfLoops::Unit,
            logs: WeightTransform::SemanticDefault,
            semantics: MatrixSemantics::Distances,
            tolerance: 1e-9,
        }
    }
}

impl MclOptions {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(ClusterError::invalid_parameter(
                "max_steps",
                "must be at least 1",
            ));
        }
        if self.expansion == 0 {
            return Err(ClusterError::invalid_parameter(
                "expansion",
                "must be at least 1",
            ));
        }
        if !(self.inflation > 0.0) || !self.inflation.is_finite() {
            return Err(ClusterError::invalid_parameter(
                "inflation",
                format!("must be a positive number, got {}", self.inflation),
            ));
        }
        if !(self.tolerance >= 0.0) {
            return Err(ClusterError::invalid_parameter(
                "tolerance",
                format!("must not be negative, got {}", self.tolerance),
            ));
        }
        Ok(())
    }
}

/// Outcome of a Markov clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovClustering {
    pub assignment: ClusterAssignment,
    /// Cluster id per taxon index
    pub labels: Vec<ClusterId>,
    pub steps: usize,
    pub converged: bool,
}

pub fn mcl(matrix: &DistanceMatrix, taxa: &TaxonSet, options: &MclOptions) -> Result<MarkovClustering> {
    matrix.check_taxa(taxa)?;
    options.validate()?;

    let mut flow = TransitionMatrix::from_matrix(matrix);
    let size = flow.size();

    if let Some(threshold) = options.threshold {
        for (i, j, score) in matrix.upper_triangle() {
            let weight = if options.semantics.includes(score, threshold) {
                options.logs.apply(options.semantics, score)
            } else {
                0.0
            };
            flow.set(i, j, weight);
            flow.set(j, i, weight);
        }
    }

    match &options.self_loops {
        SelfLoops::Unit => (0..size).for_each(|i| flow.set(i, i, 1.0)),
        SelfLoops::Keep => {}
        SelfLoops::Custom(weight) => {
            for i in 0..size {
                let column = flow.column(i);
                flow.set(i, i, weight(&column));
            }
        }
    }

    flow.normalize_columns();

    let mut steps = 0;
    let mut converged = false;
    while steps < options.max_steps {
        flow = flow.expand(options.expansion);
        flow.inflate(options.inflation);
        flow.normalize_columns();
        steps += 1;

        if flow.is_idempotent(options.tolerance) {
            converged = true;
            break;
        }
    }

    if converged {
        debug!(steps, "markov flow converged");
    } else {
        warn!(steps, "markov flow did not converge within the step budget");
    }

    let labels = interpret(&flow, options.tolerance);
    let assignment =
        ClusterAssignment::from_index_groups(AssignmentShape::Exclusive, components(&labels), taxa);

    Ok(MarkovClustering {
        assignment,
        labels,
        steps,
        converged,
    })
}

/// Attractor rows claim the unclaimed columns they reach, numbered in claim
/// order; nodes nobody claims become singletons.
fn interpret(flow: &TransitionMatrix, tolerance: f64) -> Vec<ClusterId> {
    const UNCLAIMED: ClusterId = 0;

    let size = flow.size();
    let mut labels = vec![UNCLAIMED; size];
    let mut next: ClusterId = 1;

    for i in 0..size {
        let mut claimed_any = false;
        for (j, value) in flow.row(i).iter().enumerate() {
            if labels[j] == UNCLAIMED && *value > tolerance {
                labels[j] = next;
                claimed_any = true;
            }
        }
        if claimed_any {
            next += 1;
        }
    }

    for label in labels.iter_mut().filter(|l| **l == UNCLAIMED) {
        *label = next;
        next += 1;
    }

    labels
}
