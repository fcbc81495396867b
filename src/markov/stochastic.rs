//! Dense column-stochastic matrix operations used by the Markov clusterer.

use crate::matrix::DistanceMatrix;
use ndarray::{Array2, ArrayView1, Axis};

/// Square working matrix owned by a single clustering run
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransitionMatrix {
    cells: Array2<f64>,
}

impl TransitionMatrix {
    pub(crate) fn from_matrix(matrix: &DistanceMatrix) -> Self {
        let size = matrix.size();
        let cells = Array2::from_shape_fn((size, size), |(i, j)| matrix.get(i, j));
        Self { cells }
    }

    pub(crate) fn size(&self) -> usize {
        self.cells.nrows()
    }

    pub(crate) fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[[i, j]]
    }

    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        self.cells[[i, j]] = value;
    }

    pub(crate) fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.cells.row(i)
    }

    pub(crate) fn column(&self, j: usize) -> Vec<f64> {
        self.cells.column(j).to_vec()
    }

    /// Scale every column to sum to one. Columns summing to zero stay zero.
    pub(crate) fn normalize_columns(&mut self) {
        let totals = self.cells.sum_axis(Axis(0));
        for (mut column, &total) in self.cells.columns_mut().into_iter().zip(totals.iter()) {
            if total != 0.0 {
                column.mapv_inplace(|value| value / total);
            }
        }
    }

    /// Matrix power: `exponent - 1` successive products
    pub(crate) fn expand(&self, exponent: u32) -> TransitionMatrix {
        let cells = (1..exponent).fold(self.cells.clone(), |acc, _| acc.dot(&self.cells));
        TransitionMatrix { cells }
    }

    /// Raise every entry to `power`
    pub(crate) fn inflate(&mut self, power: f64) {
        self.cells.mapv_inplace(|value| value.powf(power));
    }

    /// Every row holds a single distinct value above `tolerance`
    /// (within `tolerance`), or nothing above it.
    pub(crate) fn is_idempotent(&self, tolerance: f64) -> bool {
        self.cells.rows().into_iter().all(|row| {
            let (low, high) = row
                .iter()
                .filter(|v| **v > tolerance)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            low > high || high - low <= tolerance
        })
    }
}
