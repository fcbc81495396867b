//! Agglomerative linkage: flat cuts and tree construction.
//!
//! [`HierarchicalLinkage`] is the seam the consensus clusterer and the engine
//! depend on. [`AgglomerativeLinkage`] is the production implementation:
//! average (UPGMA), single and complete linkage for flat cuts, UPGMA and
//! neighbor joining for trees rendered as Newick strings.

mod flat;
mod tree;

pub use tree::NewickTree;

use crate::assignment::{AssignmentShape, ClusterAssignment};
use crate::errors::{ClusterError, Result};
use crate::matrix::{DistanceMatrix, TaxonSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Distance between two clusters in a flat cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageMethod {
    /// Mean pairwise distance
    #[default]
    Upgma,
    /// Closest pair
    Single,
    /// Farthest pair
    Complete,
}

impl LinkageMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upgma => "upgma",
            Self::Single => "single",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkageMethod {
    type Err = ClusterError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upgma" => Ok(Self::Upgma),
            "single" => Ok(Self::Single),
            "complete" => Ok(Self::Complete),
            other => Err(ClusterError::invalid_parameter(
                "method",
                format!("unknown linkage method '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMethod {
    #[default]
    Upgma,
    Neighbor,
}

impl FromStr for TreeMethod {
    type Err = ClusterError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upgma" => Ok(Self::Upgma),
            "neighbor" | "nj" => Ok(Self::Neighbor),
            other => Err(ClusterError::invalid_parameter(
                "tree_method",
                format!("unknown tree method '{}'", other),
            )),
        }
    }
}

/// Hierarchical clustering provider
pub trait HierarchicalLinkage {
    /// Exclusive clusters obtained by merging while the closest pair of
    /// clusters is below `threshold`.
    fn flat_cluster(
        &self,
        method: LinkageMethod,
        threshold: f64,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
    ) -> Result<ClusterAssignment>;

    /// Newick rendering of the full tree
    fn tree(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
        method: TreeMethod,
        include_distances: bool,
    ) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AgglomerativeLinkage;

impl HierarchicalLinkage for AgglomerativeLinkage {
    fn flat_cluster(
        &self,
        method: LinkageMethod,
        threshold: f64,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
    ) -> Result<ClusterAssignment> {
        matrix.check_taxa(taxa)?;
        let groups = flat::merge_below(matrix, method, threshold);
        debug!(%method, threshold, clusters = groups.len(), "flat linkage cut");
        Ok(ClusterAssignment::from_index_groups(
            AssignmentShape::Exclusive,
            groups,
            taxa,
        ))
    }

    fn tree(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
        method: TreeMethod,
        include_distances: bool,
    ) -> Result<String> {
        matrix.check_taxa(taxa)?;
        let tree = match method {
            TreeMethod::Upgma => tree::upgma(matrix, taxa),
            TreeMethod::Neighbor => tree::neighbor_joining(matrix, taxa),
        };
        Ok(tree.to_newick(include_distances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::fixtures::germanic;
    use pretty_assertions::assert_eq;

    fn partition(method: LinkageMethod, threshold: f64) -> Vec<Vec<String>> {
        let (matrix, taxa) = germanic();
        AgglomerativeLinkage
            .flat_cluster(method, threshold, &matrix, &taxa)
            .unwrap()
            .partition()
    }

    fn owned(groups: &[&[&str]]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|g| g.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_upgma_cuts() {
        assert_eq!(
            partition(LinkageMethod::Upgma, 0.6),
            owned(&[&["Dutch", "English", "German"], &["Icelandic", "Swedish"]])
        );
        assert_eq!(
            partition(LinkageMethod::Upgma, 0.5),
            owned(&[&["Dutch", "German"], &["English"], &["Icelandic", "Swedish"]])
        );
    }

    #[test]
    fn test_single_and_complete_cuts() {
        assert_eq!(
            partition(LinkageMethod::Single, 0.5),
            owned(&[&["Dutch", "English", "German"], &["Icelandic", "Swedish"]])
        );
        assert_eq!(
            partition(LinkageMethod::Complete, 0.5),
            owned(&[&["Dutch", "German"], &["English"], &["Icelandic", "Swedish"]])
        );
    }

    #[test]
    fn test_flat_ids_follow_merge_slots() {
        let (matrix, taxa) = germanic();
        let assignment = AgglomerativeLinkage
            .flat_cluster(LinkageMethod::Upgma, 0.6, &matrix, &taxa)
            .unwrap();

        assert_eq!(assignment.get(1).unwrap(), ["German", "English", "Dutch"]);
        assert_eq!(assignment.get(2).unwrap(), ["Swedish", "Icelandic"]);
    }

    #[test]
    fn test_upgma_tree() {
        let (matrix, taxa) = germanic();
        let plain = AgglomerativeLinkage
            .tree(&matrix, &taxa, TreeMethod::Upgma, false)
            .unwrap();
        assert_eq!(plain, "(((German,Dutch),English),(Swedish,Icelandic));");

        let with_lengths = AgglomerativeLinkage
            .tree(&matrix, &taxa, TreeMethod::Upgma, true)
            .unwrap();
        assert_eq!(
            with_lengths,
            "(((German:0.10,Dutch:0.10):0.18,English:0.28):0.06,(Swedish:0.20,Icelandic:0.20):0.14);"
        );
    }

    #[test]
    fn test_neighbor_joining_tree() {
        let (matrix, taxa) = germanic();
        let newick = AgglomerativeLinkage
            .tree(&matrix, &taxa, TreeMethod::Neighbor, false)
            .unwrap();
        assert_eq!(newick, "(((German,(Swedish,Icelandic)),Dutch),English);");
    }

    #[test]
    fn test_parse_methods() {
        assert_eq!("UPGMA".parse::<LinkageMethod>().unwrap(), LinkageMethod::Upgma);
        assert_eq!("complete".parse::<LinkageMethod>().unwrap(), LinkageMethod::Complete);
        assert_eq!("nj".parse::<TreeMethod>().unwrap(), TreeMethod::Neighbor);
        assert!("ward".parse::<LinkageMethod>().is_err());
    }
}
