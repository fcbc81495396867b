//! Tree construction by UPGMA and neighbor joining.

use crate::matrix::{DistanceMatrix, TaxonSet};

/// Rooted binary tree with branch lengths on every child edge
#[derive(Debug, Clone, PartialEq)]
pub enum NewickTree {
    Leaf(String),
    Join {
        left: Box<NewickTree>,
        left_length: f64,
        right: Box<NewickTree>,
        right_length: f64,
    },
}

impl NewickTree {
    fn join(left: NewickTree, left_length: f64, right: NewickTree, right_length: f64) -> Self {
        Self::Join {
            left: Box::new(left),
            left_length,
            right: Box::new(right),
            right_length,
        }
    }

    /// Newick string terminated by `;`, branch lengths with two decimals
    pub fn to_newick(&self, include_distances: bool) -> String {
        let mut out = String::new();
        self.write(&mut out, include_distances);
        out.push(';');
        out
    }

    fn write(&self, out: &mut String, include_distances: bool) {
        match self {
            Self::Leaf(label) => out.push_str(label),
            Self::Join {
                left,
                left_length,
                right,
                right_length,
            } => {
                out.push('(');
                left.write(out, include_distances);
                if include_distances {
                    out.push_str(&format!(":{:.2}", left_length));
                }
                out.push(',');
                right.write(out, include_distances);
                if include_distances {
                    out.push_str(&format!(":{:.2}", right_length));
                }
                out.push(')');
            }
        }
    }

    pub fn leaves(&self) -> Vec<&str> {
        match self {
            Self::Leaf(label) => vec![label.as_str()],
            Self::Join { left, right, .. } => {
                let mut leaves = left.leaves();
                leaves.extend(right.leaves());
                leaves
            }
        }
    }
}

/// Working state shared by both builders: active subtrees with their pairwise
/// distances. Merges write into slot `i` and drop slot `j`.
struct ActiveSet {
    nodes: Vec<NewickTree>,
    distances: Vec<Vec<f64>>,
}

impl ActiveSet {
    fn new(matrix: &DistanceMatrix, taxa: &TaxonSet) -> Self {
        Self {
            nodes: taxa.iter().map(|t| NewickTree::Leaf(t.to_string())).collect(),
            distances: (0..matrix.size()).map(|i| matrix.row(i).to_vec()).collect(),
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// First pair `(i, j)`, `i < j`, minimizing `score`
    fn argmin(&self, score: impl Fn(usize, usize) -> f64) -> Option<(usize, usize)> {
        let mut best: Option<(f64, usize, usize)> = None;
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                let value = score(i, j);
                if best.is_none_or(|(top, _, _)| value < top) {
                    best = Some((value, i, j));
                }
            }
        }
        best.map(|(_, i, j)| (i, j))
    }

    fn remove(&mut self, j: usize) -> NewickTree {
        self.distances.remove(j);
        for row in &mut self.distances {
            row.remove(j);
        }
        self.nodes.remove(j)
    }

    fn into_root(mut self) -> NewickTree {
        self.nodes.swap_remove(0)
    }
}

pub(super) fn upgma(matrix: &DistanceMatrix, taxa: &TaxonSet) -> NewickTree {
    let mut active = ActiveSet::new(matrix, taxa);
    let mut sizes = vec![1usize; active.len()];
    let mut heights = vec![0.0f64; active.len()];

    while active.len() > 1 {
        let Some((i, j)) = active.argmin(|i, j| active.distances[i][j]) else {
            break;
        };
        let height = active.distances[i][j] / 2.0;

        for k in (0..active.len()).filter(|&k| k != i && k != j) {
            let merged = (active.distances[i][k] * sizes[i] as f64
                + active.distances[j][k] * sizes[j] as f64)
                / (sizes[i] + sizes[j]) as f64;
            active.distances[i][k] = merged;
            active.distances[k][i] = merged;
        }

        let right = active.remove(j);
        let left = std::mem::replace(&mut active.nodes[i], NewickTree::Leaf(String::new()));
        active.nodes[i] = NewickTree::join(left, height - heights[i], right, height - heights[j]);

        sizes[i] += sizes[j];
        sizes.remove(j);
        heights[i] = height;
        heights.remove(j);
    }

    active.into_root()
}

pub(super) fn neighbor_joining(matrix: &DistanceMatrix, taxa: &TaxonSet) -> NewickTree {
    let mut active = ActiveSet::new(matrix, taxa);

    while active.len() > 2 {
        let n = active.len();
        let totals: Vec<f64> = active.distances.iter().map(|row| row.iter().sum()).collect();
        let Some((i, j)) = active.argmin(|i, j| {
            (n as f64 - 2.0) * active.distances[i][j] - totals[i] - totals[j]
        }) else {
            break;
        };

        let dij = active.distances[i][j];
        let left_length = dij / 2.0 + (totals[i] - totals[j]) / (2.0 * (n as f64 - 2.0));
        let right_length = dij - left_length;

        for k in (0..n).filter(|&k| k != i && k != j) {
            let merged = (active.distances[i][k] + active.distances[j][k] - dij) / 2.0;
            active.distances[i][k] = merged;
            active.distances[k][i] = merged;
        }

        let right = active.remove(j);
        let left = std::mem::replace(&mut active.nodes[i], NewickTree::Leaf(String::new()));
        active.nodes[i] = NewickTree::join(left, left_length, right, right_length);
    }

    if active.len() == 2 {
        let half = active.distances[0][1] / 2.0;
        let right = active.remove(1);
        let left = active.into_root();
        return NewickTree::join(left, half, right, half);
    }

    active.into_root()
}
