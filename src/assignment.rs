//! Cluster assignments: the common output of every strategy.
//!
//! Cluster ids are dense (`1..=K`). Members keep taxon order inside each
//! cluster. An assignment is either exclusive (each taxon in exactly one
//! cluster) or fuzzy (a taxon may sit in several).

use crate::matrix::TaxonSet;
use serde::Serialize;
use std::collections::BTreeMap;

/// Positive, dense cluster identifier
pub type ClusterId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentShape {
    Exclusive,
    Fuzzy,
}

/// Mapping from cluster id to member labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    shape: AssignmentShape,
    clusters: BTreeMap<ClusterId, Vec<String>>,
}

impl ClusterAssignment {
    /// Number groups of taxon indices `1..=K` in the given order.
    ///
    /// Members are sorted into taxon order; empty groups are skipped.
    pub fn from_index_groups(
        shape: AssignmentShape,
        groups: impl IntoIterator<Item = Vec<usize>>,
        taxa: &TaxonSet,
    ) -> Self {
        let clusters = groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .enumerate()
            .map(|(position, mut group)| {
                group.sort_unstable();
                group.dedup();
                let members = group.iter().map(|&i| taxa.get(i).to_string()).collect();
                (position + 1, members)
            })
            .collect();

        Self { shape, clusters }
    }

    /// Every taxon in its own cluster, ids following taxon order
    pub fn singletons(shape: AssignmentShape, taxa: &TaxonSet) -> Self {
        Self::from_index_groups(shape, (0..taxa.len()).map(|i| vec![i]), taxa)
    }

    /// Exclusive assignment from a per-taxon label vector; labels are
    /// renumbered densely by first occurrence.
    pub fn from_labels(labels: &[usize], taxa: &TaxonSet) -> Self {
        let mut order: Vec<usize> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for (taxon, label) in labels.iter().enumerate() {
            match order.iter().position(|l| l == label) {
                Some(slot) => groups[slot].push(taxon),
                None => {
                    order.push(*label);
                    groups.push(vec![taxon]);
                }
            }
        }

        Self::from_index_groups(AssignmentShape::Exclusive, groups, taxa)
    }

    pub fn shape(&self) -> AssignmentShape {
        self.shape
    }

    pub fn is_fuzzy(&self) -> bool {
        self.shape == AssignmentShape::Fuzzy
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, id: ClusterId) -> Option<&[String]> {
        self.clusters.get(&id).map(Vec::as_slice)
    }

    /// Clusters in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &[String])> {
        self.clusters.iter().map(|(id, members)| (*id, members.as_slice()))
    }

    pub fn clusters(&self) -> &BTreeMap<ClusterId, Vec<String>> {
        &self.clusters
    }

    /// Reverted view: each taxon with the sorted ids of its clusters.
    ///
    /// Every taxon of `taxa` is present, with an empty list if unassigned.
    pub fn membership(&self, taxa: &TaxonSet) -> BTreeMap<String, Vec<ClusterId>> {
        let mut membership: BTreeMap<String, Vec<ClusterId>> =
            taxa.iter().map(|t| (t.to_string(), Vec::new())).collect();

        for (id, members) in &self.clusters {
            for member in members {
                membership.entry(member.clone()).or_default().push(*id);
            }
        }

        membership
    }

    /// Per-index cluster id for exclusive assignments.
    ///
    /// Returns `None` if any taxon is unassigned or appears more than once.
    pub fn labels(&self, taxa: &TaxonSet) -> Option<Vec<ClusterId>> {
        let membership = self.membership(taxa);
        taxa.iter()
            .map(|taxon| match membership.get(taxon).map(Vec::as_slice) {
                Some([id]) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Member sets as sorted label lists, ignoring ids
    pub fn partition(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = self
            .clusters
            .values()
            .map(|members| {
                let mut members = members.clone();
                members.sort();
                members
            })
            .collect();
        groups.sort();
        groups
    }
}
