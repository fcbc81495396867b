//! Connected-component labeling over a binary cut of a distance matrix.
//!
//! Labels are assigned by relabeling rather than a tree-based union-find:
//! pairs are scanned in row-major order and a merge rewrites every node
//! carrying the larger label to the smaller one. Which label a component ends
//! up with is an implementation detail; membership is what callers rely on.

use crate::matrix::DistanceMatrix;

/// Symmetric boolean adjacency obtained by cutting a matrix at a threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutGraph {
    size: usize,
    cells: Vec<bool>,
}

impl CutGraph {
    /// Link every pair `i < j` with `matrix[i][j] < threshold`
    pub fn below(matrix: &DistanceMatrix, threshold: f64) -> Self {
        let size = matrix.size();
        let mut graph = Self {
            size,
            cells: vec![false; size * size],
        };
        for (i, j, score) in matrix.upper_triangle() {
            if score < threshold {
                graph.link(i, j);
            }
        }
        graph
    }

    pub fn from_edges(size: usize, edges: &[(usize, usize)]) -> Self {
        let mut graph = Self {
            size,
            cells: vec![false; size * size],
        };
        for &(i, j) in edges {
            graph.link(i, j);
        }
        graph
    }

    fn link(&mut self, i: usize, j: usize) {
        self.cells[i * self.size + j] = true;
        self.cells[j * self.size + i] = true;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_linked(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.size + j]
    }

    /// Total number of undirected edges
    pub fn edge_count(&self) -> usize {
        (0..self.size)
            .map(|i| ((i + 1)..self.size).filter(|&j| self.is_linked(i, j)).count())
            .sum()
    }

    /// Number of edges with both endpoints in `nodes`
    pub fn internal_edges(&self, nodes: &[usize]) -> usize {
        nodes
            .iter()
            .enumerate()
            .map(|(a, &i)| nodes[a + 1..].iter().filter(|&&j| self.is_linked(i, j)).count())
            .sum()
    }
}

/// Label connected components; labels start at 1 and every node gets one.
pub fn label_components(graph: &CutGraph) -> Vec<usize> {
    const UNLABELED: usize = 0;

    let size = graph.size();
    let mut labels = vec![UNLABELED; size];
    let mut next_label = 1;

    for i in 0..size {
        for j in (i + 1)..size {
            if !graph.is_linked(i, j) {
                continue;
            }

            match (labels[i], labels[j]) {
                (a, b) if a == b && a != UNLABELED => {}
                (UNLABELED, UNLABELED) => {
                    labels[i] = next_label;
                    labels[j] = next_label;
                    next_label += 1;
                }
                (a, UNLABELED) => labels[j] = a,
                (UNLABELED, b) => labels[i] = b,
                (a, b) => {
                    let (keep, replace) = (a.min(b), a.max(b));
                    for label in labels.iter_mut().filter(|l| **l == replace) {
                        *label = keep;
                    }
                }
            }
        }
    }

    for i in 0..size {
        if labels[i] == UNLABELED {
            let fresh = labels.iter().copied().max().unwrap_or(UNLABELED) + 1;
            labels[i] = fresh;
        }
    }

    labels
}

/// Group node indices by component, components ordered by label
pub fn components(labels: &[usize]) -> Vec<Vec<usize>> {
    let mut distinct: Vec<usize> = labels.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    distinct
        .into_iter()
        .map(|label| {
            labels
                .iter()
                .enumerate()
                .filter(|(_, l)| **l == label)
                .map(|(node, _)| node)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::fixtures::germanic;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_isolated_nodes_get_singleton_labels() {
        let graph = CutGraph::from_edges(3, &[]);
        assert_eq!(label_components(&graph), vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_keeps_smaller_label() {
        // 0-3 gets label 1, 1-2 gets label 2, then 1-3 merges 2 into 1
        let graph = CutGraph::from_edges(4, &[(0, 3), (1, 2), (1, 3)]);
        assert_eq!(label_components(&graph), vec![1, 1, 1, 1]);
        assert_eq!(components(&label_components(&graph)), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_propagation_and_trailing_singletons() {
        let graph = CutGraph::from_edges(5, &[(0, 3), (3, 4)]);
        let labels = label_components(&graph);

        assert_eq!(labels[0], labels[3]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[1], labels[2]);
        assert!(labels.iter().all(|&l| l >= 1));
        assert_eq!(components(&labels), vec![vec![0, 3, 4], vec![1], vec![2]]);
    }

    #[test]
    fn test_germanic_cut() {
        let (matrix, _) = germanic();
        let graph = CutGraph::below(&matrix, 0.5);
        let labels = label_components(&graph);

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(components(&labels), vec![vec![0, 3, 4], vec![1, 2]]);
        assert_eq!(graph.internal_edges(&[0, 3, 4]), 2);
    }
}
