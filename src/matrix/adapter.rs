//! Reinterpret a raw matrix as a weighted graph under a given semantics.

use super::{DistanceMatrix, MatrixSemantics, TaxonSet, WeightTransform};
use crate::errors::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Unordered edge `source < target` with its raw score and optional weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEdge {
    pub source: usize,
    pub target: usize,
    pub score: f64,
    pub weight: Option<f64>,
}

impl WeightedEdge {
    pub fn key(&self) -> (usize, usize) {
        (self.source, self.target)
    }
}

/// Graph over taxon indices whose edges passed the semantics predicate
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedGraph {
    edges: Vec<WeightedEdge>,
    adjacency: Vec<BTreeSet<usize>>,
}

impl WeightedGraph {
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Edges in row-major discovery order
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }

    pub fn neighbors(&self, node: usize) -> &BTreeSet<usize> {
        &self.adjacency[node]
    }

    /// Edge weights keyed by `(source, target)`, or `None` when the graph is
    /// unweighted.
    pub fn weights(&self) -> Option<BTreeMap<(usize, usize), f64>> {
        if self.edges.is_empty() || self.edges.iter().any(|e| e.weight.is_none()) {
            return None;
        }
        Some(
            self.edges
                .iter()
                .filter_map(|e| e.weight.map(|w| (e.key(), w)))
                .collect(),
        )
    }
}

/// Build the graph of pairs passing `semantics` at `threshold`.
///
/// Under `distances` and `similarities` a weight is attached only when a
/// `transform` is given; under `weights` every edge is weighted, falling
/// back to the default `-log2((1-w)^2)` transform.
pub fn adapt(
    matrix: &DistanceMatrix,
    taxa: &TaxonSet,
    semantics: MatrixSemantics,
    threshold: f64,
    transform: Option<&WeightTransform>,
) -> Result<WeightedGraph> {
    matrix.check_taxa(taxa)?;

    let default_transform = WeightTransform::SemanticDefault;
    let transform = match (semantics, transform) {
        (_, Some(transform)) => Some(transform),
        (MatrixSemantics::Weights, None) => Some(&default_transform),
        _ => None,
    };

    let mut adjacency = vec![BTreeSet::new(); matrix.size()];
    let edges: Vec<WeightedEdge> = matrix
        .upper_triangle()
        .filter(|&(_, _, score)| semantics.includes(score, threshold))
        .map(|(source, target, score)| WeightedEdge {
            source,
            target,
            score,
            weight: transform.map(|t| t.apply(semantics, score)),
        })
        .collect();

    for edge in &edges {
        adjacency[edge.source].insert(edge.target);
        adjacency[edge.target].insert(edge.source);
    }

    Ok(WeightedGraph { edges, adjacency })
}
