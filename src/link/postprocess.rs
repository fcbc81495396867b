//! Turn edge communities into taxon clusters.

use super::communities::EdgeKey;
use crate::assignment::{AssignmentShape, ClusterAssignment, ClusterId};
use crate::matrix::{TaxonSet, WeightedGraph};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Nodes and edges of one detected community
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NodeCommunity {
    pub nodes: BTreeSet<usize>,
    pub edges: Vec<EdgeKey>,
}

/// Group edges by community, communities ordered by their first edge in
/// graph edge order.
pub(crate) fn collect_communities(
    graph: &WeightedGraph,
    edge_community: &BTreeMap<EdgeKey, usize>,
) -> Vec<NodeCommunity> {
    let mut order: Vec<usize> = Vec::new();
    let mut by_id: BTreeMap<usize, NodeCommunity> = BTreeMap::new();

    for edge in graph.edges() {
        let key = edge.key();
        let Some(&id) = edge_community.get(&key) else {
            continue;
        };
        let community = by_id.entry(id).or_insert_with(|| {
            order.push(id);
            NodeCommunity {
                nodes: BTreeSet::new(),
                edges: Vec::new(),
            }
        });
        community.nodes.insert(key.0);
        community.nodes.insert(key.1);
        community.edges.push(key);
    }

    order.into_iter().filter_map(|id| by_id.remove(&id)).collect()
}

/// Drop communities whose node set is a strict subset of another one, or
/// equal to an earlier one.
pub(crate) fn drop_nested(communities: Vec<NodeCommunity>) -> Vec<NodeCommunity> {
    let before = communities.len();
    let survivors: Vec<NodeCommunity> = communities
        .iter()
        .enumerate()
        .filter(|(index, community)| {
            !communities.iter().enumerate().any(|(other_index, other)| {
                other_index != *index
                    && (community.nodes.is_subset(&other.nodes)
                        && (community.nodes != other.nodes || other_index < *index))
            })
        })
        .map(|(_, community)| community.clone())
        .collect();

    if survivors.len() < before {
        debug!(dropped = before - survivors.len(), "removed nested link communities");
    }
    survivors
}

/// Fuzzy assignment: survivors numbered `1..=K`, uncovered taxa appended as
/// singletons in taxon order.
pub(crate) fn fuzzy_assignment(survivors: &[NodeCommunity], taxa: &TaxonSet) -> ClusterAssignment {
    ClusterAssignment::from_index_groups(AssignmentShape::Fuzzy, with_orphans(survivors, taxa.len()), taxa)
}

/// Exclusive assignment: each taxon keeps the cluster in which it has the
/// most incident edges (lowest id on ties); ids are then renumbered densely.
pub(crate) fn exclusive_assignment(survivors: &[NodeCommunity], taxa: &TaxonSet) -> ClusterAssignment {
    let groups = with_orphans(survivors, taxa.len());

    let mut incidence: Vec<BTreeMap<ClusterId, usize>> = vec![BTreeMap::new(); taxa.len()];
    for (position, community) in survivors.iter().enumerate() {
        let id = position + 1;
        for &(a, b) in &community.edges {
            *incidence[a].entry(id).or_insert(0) += 1;
            *incidence[b].entry(id).or_insert(0) += 1;
        }
    }

    let mut memberships: Vec<Vec<ClusterId>> = vec![Vec::new(); taxa.len()];
    for (position, group) in groups.iter().enumerate() {
        for &taxon in group {
            memberships[taxon].push(position + 1);
        }
    }

    let mut exclusive: Vec<Vec<usize>> = vec![Vec::new(); groups.len()];
    for (taxon, ids) in memberships.iter().enumerate() {
        let mut best: Option<(ClusterId, usize)> = None;
        for &id in ids {
            let count = incidence[taxon].get(&id).copied().unwrap_or(0);
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((id, count));
            }
        }
        if let Some((id, _)) = best {
            exclusive[id - 1].push(taxon);
        }
    }

    ClusterAssignment::from_index_groups(AssignmentShape::Exclusive, exclusive, taxa)
}

fn with_orphans(survivors: &[NodeCommunity], size: usize) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = survivors
        .iter()
        .map(|community| community.nodes.iter().copied().collect())
        .collect();

    let covered: BTreeSet<usize> = survivors.iter().flat_map(|c| c.nodes.iter().copied()).collect();
    groups.extend((0..size).filter(|t| !covered.contains(t)).map(|t| vec![t]));
    groups
}
