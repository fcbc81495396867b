//! Matrix and taxon containers shared by every clustering strategy.
//!
//! A [`DistanceMatrix`] is square and index-aligned with a [`TaxonSet`].
//! Only the upper triangle (`i < j`) is consulted by the edge predicates, so
//! the diagonal may hold anything. Matrices are never mutated by the
//! clustering code; algorithms that need an in-place numeric pass (MCL) work
//! on their own copy.

pub mod adapter;
pub mod semantics;

pub use adapter::{adapt, WeightedEdge, WeightedGraph};
pub use semantics::{MatrixSemantics, WeightTransform};

use crate::errors::{ClusterError, Result};
use std::collections::HashSet;

/// Square matrix of pairwise scores stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Build a matrix from its rows.
    ///
    /// Fails with `ShapeMismatch` if any row length differs from the number
    /// of rows, and with `InvalidParameter` on NaN or infinite entries.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);

        for row in rows {
            if row.len() != size {
                return Err(ClusterError::shape_mismatch(size, row.len()));
            }
            values.extend(row);
        }

        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ClusterError::invalid_parameter(
                "matrix",
                format!("entries must be finite, found {}", bad),
            ));
        }

        Ok(Self { size, values })
    }

    /// Expand a condensed upper triangle (row-major pairs `i < j`) into a
    /// symmetric matrix with a zero diagonal.
    pub fn from_condensed(condensed: &[f64]) -> Result<Self> {
        let size = condensed_size(condensed.len()).ok_or_else(|| {
            ClusterError::invalid_parameter(
                "condensed",
                format!(
                    "{} values do not form the upper triangle of a square matrix",
                    condensed.len()
                ),
            )
        })?;

        let mut rows = vec![vec![0.0; size]; size];
        let mut values = condensed.iter();
        for i in 0..size {
            for j in (i + 1)..size {
                if let Some(&value) = values.next() {
                    rows[i][j] = value;
                    rows[j][i] = value;
                }
            }
        }

        Self::from_rows(rows)
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.size).map(|i| self.get(i, j)).collect()
    }

    /// Iterate over `(i, j, score)` for every pair `i < j` in row-major order
    pub fn upper_triangle(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.size).flat_map(move |i| ((i + 1)..self.size).map(move |j| (i, j, self.get(i, j))))
    }

    /// Copy of the matrix with row and column `k` removed
    pub fn without(&self, k: usize) -> DistanceMatrix {
        let kept: Vec<usize> = (0..self.size).filter(|&i| i != k).collect();
        let values = kept
            .iter()
            .flat_map(|&i| kept.iter().map(move |&j| (i, j)))
            .map(|(i, j)| self.get(i, j))
            .collect();

        DistanceMatrix {
            size: kept.len(),
            values,
        }
    }

    /// Verify that this matrix is aligned with `taxa`
    pub fn check_taxa(&self, taxa: &TaxonSet) -> Result<()> {
        if self.size != taxa.len() {
            return Err(ClusterError::shape_mismatch(taxa.len(), self.size));
        }
        Ok(())
    }
}

/// Side length of the square matrix whose strict upper triangle has `len` cells
fn condensed_size(len: usize) -> Option<usize> {
    let size = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    (size * size.saturating_sub(1) / 2 == len).then_some(size)
}

/// Ordered, duplicate-free labels aligned with matrix rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonSet {
    labels: Vec<String>,
}

impl TaxonSet {
    /// Build a taxon set; fails on an empty sequence or duplicate labels.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        if labels.is_empty() {
            return Err(ClusterError::invalid_parameter(
                "taxa",
                "at least one taxon is required",
            ));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = labels.iter().find(|label| !seen.insert(label.as_str())) {
            return Err(ClusterError::invalid_parameter(
                "taxa",
                format!("duplicate taxon '{}'", duplicate),
            ));
        }

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Copy of the set with the taxon at `k` removed.
    ///
    /// Callers only remove from sets with at least two taxa.
    pub(crate) fn without(&self, k: usize) -> TaxonSet {
        let labels = self
            .labels
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != k)
            .map(|(_, label)| label.clone())
            .collect();
        TaxonSet { labels }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_from_condensed_builds_symmetric_matrix() {
        let (matrix, _) = germanic();

        assert_eq!(matrix.size(), 5);
        assert_eq!(matrix.get(0, 1), 0.5);
        assert_eq!(matrix.get(1, 0), 0.5);
        assert_eq!(matrix.get(0, 4), 0.2);
        assert_eq!(matrix.get(3, 4), 0.3);
        assert_eq!(matrix.get(2, 2), 0.0);
    }

    #[test]
    fn test_from_condensed_rejects_ragged_length() {
        let err = DistanceMatrix::from_condensed(&[0.1, 0.2]).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidParameter { .. }));
    }

    #[test]
    fn test_from_rows_rejects_non_square() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, 0.1], vec![0.1]]).unwrap_err();
        assert!(matches!(err, ClusterError::ShapeMismatch { expected: 2, found: 1 }));
    }

    #[test]
    fn test_from_rows_rejects_nan() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![0.1, 0.0]]).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidParameter { .. }));
    }

    #[test]
    fn test_without_removes_row_and_column() {
        let (matrix, taxa) = germanic();
        let reduced = matrix.without(0);
        let reduced_taxa = taxa.without(0);

        assert_eq!(reduced.size(), 4);
        assert_eq!(reduced_taxa.labels(), ["Swedish", "Icelandic", "English", "Dutch"]);
        // Swedish-Icelandic keeps its score
        assert_eq!(reduced.get(0, 1), 0.4);
        // English-Dutch keeps its score
        assert_eq!(reduced.get(2, 3), 0.3);
    }

    #[test]
    fn test_upper_triangle_order() {
        let (matrix, _) = germanic();
        let scores: Vec<f64> = matrix.upper_triangle().map(|(_, _, s)| s).collect();
        assert_eq!(scores, GERMANIC_CONDENSED.to_vec());
    }

    #[test]
    fn test_taxon_set_rejects_duplicates_and_empty() {
        assert!(TaxonSet::new(Vec::<String>::new()).is_err());
        let err = TaxonSet::new(["a", "b", "a"]).unwrap_err();
        assert!(err.to_string().contains("duplicate taxon 'a'"));
    }

    #[test]
    fn test_check_taxa_reports_mismatch() {
        let (matrix, _) = germanic();
        let taxa = TaxonSet::new(["x", "y"]).unwrap();
        assert!(matches!(
            matrix.check_taxa(&taxa),
            Err(ClusterError::ShapeMismatch { expected: 2, found: 5 })
        ));
    }
}
