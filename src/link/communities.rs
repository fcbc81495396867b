//! Edge community detection (Ahn, Bagrow and Lehmann link communities).
//!
//! Two edges that share a node are compared through the neighborhoods of
//! their other endpoints. Edge pairs are merged in order of decreasing
//! similarity with single linkage, so each resulting community is a set of
//! edges and a node may belong to several communities.

use crate::matrix::WeightedGraph;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Undirected edge key `(low, high)`
pub type EdgeKey = (usize, usize);

/// Assigns each edge of a graph to a community.
///
/// Community ids are opaque; only the partition of the edges matters.
pub trait EdgeCommunityDetector {
    /// Merge edge pairs with similarity at or above `cut`, or all pairs when
    /// `cut` is `None`.
    fn detect(&self, graph: &WeightedGraph, cut: Option<f64>) -> BTreeMap<EdgeKey, usize>;
}

/// Single-linkage merge of edges by neighborhood similarity
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLinkageCommunities;

/// Similarity between two edges sharing a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePair {
    pub first: EdgeKey,
    pub second: EdgeKey,
    pub similarity: f64,
}

fn edge_key(a: usize, b: usize) -> EdgeKey {
    (a.min(b), a.max(b))
}

fn inclusive_neighborhoods(graph: &WeightedGraph) -> Vec<BTreeSet<usize>> {
    (0..graph.node_count())
        .map(|node| {
            let mut neighborhood = graph.neighbors(node).clone();
            neighborhood.insert(node);
            neighborhood
        })
        .collect()
}

/// Visit every pair of edges `(i, n)` and `(j, n)` with `i < j`, nodes `n`
/// in ascending order.
fn for_each_adjacent_pair(graph: &WeightedGraph, mut visit: impl FnMut(usize, usize, usize)) {
    for node in 0..graph.node_count() {
        let neighbors: Vec<usize> = graph.neighbors(node).iter().copied().collect();
        for (a, &i) in neighbors.iter().enumerate() {
            for &j in &neighbors[a + 1..] {
                visit(node, i, j);
            }
        }
    }
}

/// Jaccard index of the inclusive neighborhoods of the non-shared endpoints
pub fn unweighted_similarities(graph: &WeightedGraph) -> Vec<EdgePair> {
    let neighborhoods = inclusive_neighborhoods(graph);
    let mut pairs = Vec::new();

    for_each_adjacent_pair(graph, |node, i, j| {
        let shared = neighborhoods[i].intersection(&neighborhoods[j]).count();
        let union = neighborhoods[i].union(&neighborhoods[j]).count();
        pairs.push(EdgePair {
            first: edge_key(i, node),
            second: edge_key(j, node),
            similarity: shared as f64 / union as f64,
        });
    });

    pairs
}

/// Tanimoto coefficient of the weighted neighborhood vectors.
///
/// A node's weight to itself is the mean weight of its incident edges.
pub fn weighted_similarities(graph: &WeightedGraph, weights: &BTreeMap<EdgeKey, f64>) -> Vec<EdgePair> {
    let neighborhoods = inclusive_neighborhoods(graph);
    let mut vectors: BTreeMap<EdgeKey, f64> = weights.clone();

    for node in 0..graph.node_count() {
        let neighbors = graph.neighbors(node);
        if neighbors.is_empty() {
            continue;
        }
        let total: f64 = neighbors
            .iter()
            .map(|&other| weights.get(&edge_key(node, other)).copied().unwrap_or(0.0))
            .sum();
        vectors.insert((node, node), total / neighbors.len() as f64);
    }

    let entry = |a: usize, b: usize| vectors.get(&edge_key(a, b)).copied().unwrap_or(0.0);

    let squared_norms: Vec<f64> = neighborhoods
        .iter()
        .enumerate()
        .map(|(node, neighborhood)| neighborhood.iter().map(|&x| entry(node, x).powi(2)).sum())
        .collect();

    let mut pairs = Vec::new();
    for_each_adjacent_pair(graph, |node, i, j| {
        let dot: f64 = neighborhoods[i]
            .intersection(&neighborhoods[j])
            .map(|&x| entry(i, x) * entry(j, x))
            .sum();
        pairs.push(EdgePair {
            first: edge_key(i, node),
            second: edge_key(j, node),
            similarity: dot / (squared_norms[i] + squared_norms[j] - dot),
        });
    });

    pairs
}

impl EdgeCommunityDetector for SingleLinkageCommunities {
    fn detect(&self, graph: &WeightedGraph, cut: Option<f64>) -> BTreeMap<EdgeKey, usize> {
        let mut edge_community: BTreeMap<EdgeKey, usize> = BTreeMap::new();
        let mut community_edges: BTreeMap<usize, Vec<EdgeKey>> = BTreeMap::new();
        for (id, edge) in graph.edges().iter().enumerate() {
            edge_community.insert(edge.key(), id);
            community_edges.insert(id, vec![edge.key()]);
        }

        let mut pairs = match graph.weights() {
            Some(weights) => weighted_similarities(graph, &weights),
            None => unweighted_similarities(graph),
        };
        // stable: equally similar pairs keep their discovery order
        pairs.sort_by(|a, b| (1.0 - a.similarity).total_cmp(&(1.0 - b.similarity)));

        for pair in pairs {
            if cut.is_some_and(|cut| pair.similarity < cut) {
                break;
            }

            let (Some(&first), Some(&second)) =
                (edge_community.get(&pair.first), edge_community.get(&pair.second))
            else {
                continue;
            };
            if first == second {
                continue;
            }

            let size_of = |id: usize| community_edges.get(&id).map_or(0, Vec::len);
            let (keep, absorb) = if size_of(second) > size_of(first) {
                (second, first)
            } else {
                (first, second)
            };

            let moved = community_edges.remove(&absorb).unwrap_or_default();
            for edge in &moved {
                edge_community.insert(*edge, keep);
            }
            community_edges.entry(keep).or_default().extend(moved);
            trace!(keep, absorb, similarity = pair.similarity, "merged edge communities");
        }

        edge_community
    }
}
