//! Link clustering: clusters from communities of edges.
//!
//! The matrix is cut into a graph, the edges are grouped into communities by
//! an [`EdgeCommunityDetector`], and every community contributes the set of
//! nodes its edges touch. Communities contained in another one are dropped.
//! The result is fuzzy by nature; the exclusive mode keeps each taxon in the
//! cluster where it has the most edges.
//!
//! # Example
//!
//! ```rust
//! use taxoclust::link::{LinkClusterer, LinkOptions};
//! use taxoclust::matrix::{DistanceMatrix, TaxonSet};
//!
//! let matrix = DistanceMatrix::from_condensed(&[0.5, 0.67, 0.8, 0.2, 0.4, 0.7, 0.6, 0.8, 0.8, 0.3]).unwrap();
//! let taxa = TaxonSet::new(["German", "Swedish", "Icelandic", "English", "Dutch"]).unwrap();
//!
//! let clusters = LinkClusterer::new()
//!     .cluster(&matrix, &taxa, &LinkOptions::new(0.5))
//!     .unwrap();
//! assert_eq!(clusters.get(2).unwrap(), ["Swedish", "Icelandic"]);
//! ```

mod communities;
mod postprocess;

pub use communities::{
    unweighted_similarities, weighted_similarities, EdgeCommunityDetector, EdgeKey, EdgePair,
    SingleLinkageCommunities,
};

use crate::assignment::{AssignmentShape, ClusterAssignment};
use crate::errors::Result;
use crate::matrix::{adapt, DistanceMatrix, MatrixSemantics, TaxonSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkOptions {
    /// Cut applied to the matrix to build the graph
    pub threshold: f64,
    /// Minimum edge-pair similarity for a merge; `None` merges everything
    pub link_threshold: Option<f64>,
    pub semantics: MatrixSemantics,
    /// Allow a taxon in several clusters
    pub fuzzy: bool,
}

impl LinkOptions {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            link_threshold: None,
            semantics: MatrixSemantics::Distances,
            fuzzy: true,
        }
    }

    pub fn exclusive(self) -> Self {
        Self {
            fuzzy: false,
            ..self
        }
    }
}

/// Link clusterer over an injected edge community detector
#[derive(Debug, Clone, Default)]
pub struct LinkClusterer<D: EdgeCommunityDetector = SingleLinkageCommunities> {
    detector: D,
}

impl LinkClusterer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: EdgeCommunityDetector> LinkClusterer<D> {
    pub fn with_detector(detector: D) -> Self {
        Self { detector }
    }

    pub fn cluster(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
        options: &LinkOptions,
    ) -> Result<ClusterAssignment> {
        let graph = adapt(matrix, taxa, options.semantics, options.threshold, None)?;
        let shape = if options.fuzzy {
            AssignmentShape::Fuzzy
        } else {
            AssignmentShape::Exclusive
        };

        if !graph.has_edges() {
            debug!(threshold = options.threshold, "no edges survive the cut, every taxon is a singleton");
            return Ok(ClusterAssignment::singletons(shape, taxa));
        }

        let edge_community = self.detector.detect(&graph, options.link_threshold);
        let communities = postprocess::collect_communities(&graph, &edge_community);
        let survivors = postprocess::drop_nested(communities);
        debug!(
            edges = graph.edge_count(),
            communities = survivors.len(),
            "link communities detected"
        );

        Ok(match shape {
            AssignmentShape::Fuzzy => postprocess::fuzzy_assignment(&survivors, taxa),
            AssignmentShape::Exclusive => postprocess::exclusive_assignment(&survivors, taxa),
        })
    }
}

/// Link clustering with the default detector
pub fn link_cluster(
    matrix: &DistanceMatrix,
    taxa: &TaxonSet,
    options: &LinkOptions,
) -> Result<ClusterAssignment> {
    LinkClusterer::new().cluster(matrix, taxa, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::fixtures::{germanic, two_triangles};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn clusters(assignment: &ClusterAssignment) -> Vec<(usize, Vec<String>)> {
        assignment.iter().map(|(id, m)| (id, m.to_vec())).collect()
    }

    fn expected(groups: &[&[&str]]) -> Vec<(usize, Vec<String>)> {
        groups
            .iter()
            .enumerate()
            .map(|(i, g)| (i + 1, g.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_germanic_at_half() {
        let (matrix, taxa) = germanic();
        let want = expected(&[&["German", "English", "Dutch"], &["Swedish", "Icelandic"]]);

        let fuzzy = link_cluster(&matrix, &taxa, &LinkOptions::new(0.5)).unwrap();
        assert_eq!(clusters(&fuzzy), want);
        assert!(fuzzy.is_fuzzy());

        let exclusive = link_cluster(&matrix, &taxa, &LinkOptions::new(0.5).exclusive()).unwrap();
        assert_eq!(clusters(&exclusive), want);
        assert_eq!(exclusive.labels(&taxa).unwrap(), vec![1, 2, 2, 1, 1]);
    }

    #[test]
    fn test_full_merge_without_link_threshold() {
        let (matrix, taxa) = germanic();
        let assignment = link_cluster(&matrix, &taxa, &LinkOptions::new(0.7)).unwrap();
        assert_eq!(assignment.len(), 1);
        assert_eq!(assignment.get(1).unwrap().len(), 5);
    }

    #[test]
    fn test_link_threshold_yields_overlap() {
        let (matrix, taxa) = germanic();
        let options = LinkOptions {
            link_threshold: Some(0.5),
            ..LinkOptions::new(0.7)
        };

        let fuzzy = link_cluster(&matrix, &taxa, &options).unwrap();
        assert_eq!(
            clusters(&fuzzy),
            expected(&[&["German", "Swedish", "Icelandic", "Dutch"], &["English", "Dutch"]])
        );
        assert_eq!(fuzzy.membership(&taxa)["Dutch"], vec![1, 2]);

        let exclusive = link_cluster(&matrix, &taxa, &options.exclusive()).unwrap();
        assert_eq!(
            clusters(&exclusive),
            expected(&[&["German", "Swedish", "Icelandic", "Dutch"], &["English"]])
        );
    }

    #[test]
    fn test_weighted_link_clustering() {
        let (matrix, taxa) = germanic();
        let options = LinkOptions {
            link_threshold: Some(0.3),
            semantics: MatrixSemantics::Weights,
            ..LinkOptions::new(0.7)
        };
        let assignment = link_cluster(&matrix, &taxa, &options).unwrap();
        assert_eq!(
            clusters(&assignment),
            expected(&[&["German", "Swedish", "Icelandic", "Dutch"], &["English", "Dutch"]])
        );
    }

    #[test]
    fn test_similarities_leave_orphan() {
        let (matrix, taxa) = germanic();
        let options = LinkOptions {
            semantics: MatrixSemantics::Similarities,
            ..LinkOptions::new(0.75)
        };
        let assignment = link_cluster(&matrix, &taxa, &options).unwrap();
        assert_eq!(
            clusters(&assignment),
            expected(&[&["German", "Icelandic", "English", "Dutch"], &["Swedish"]])
        );
    }

    #[test]
    fn test_bridge_community_is_kept_when_fuzzy() {
        let (matrix, taxa) = two_triangles();
        let options = LinkOptions {
            link_threshold: Some(0.5),
            ..LinkOptions::new(0.5)
        };

        let fuzzy = link_cluster(&matrix, &taxa, &options).unwrap();
        assert_eq!(
            clusters(&fuzzy),
            expected(&[&["a", "b", "c"], &["c", "d"], &["d", "e", "f"]])
        );

        let exclusive = link_cluster(&matrix, &taxa, &options.exclusive()).unwrap();
        assert_eq!(clusters(&exclusive), expected(&[&["a", "b", "c"], &["d", "e", "f"]]));
    }

    #[test]
    fn test_no_edges_gives_singletons() {
        let (matrix, taxa) = germanic();
        let assignment = link_cluster(&matrix, &taxa, &LinkOptions::new(0.1).exclusive()).unwrap();

        assert!(!assignment.is_fuzzy());
        assert_eq!(assignment.len(), 5);
        assert_eq!(assignment.labels(&taxa).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(assignment.membership(&taxa), singleton_membership(&taxa));
    }

    #[test]
    fn test_no_edges_gives_fuzzy_singletons() {
        let (matrix, taxa) = germanic();
        let assignment = link_cluster(&matrix, &taxa, &LinkOptions::new(0.1)).unwrap();

        assert!(assignment.is_fuzzy());
        assert_eq!(assignment.len(), 5);
        for (id, taxon) in (1..=5).zip(taxa.iter()) {
            assert_eq!(assignment.get(id).unwrap(), [taxon]);
        }
        assert_eq!(assignment.labels(&taxa), None);
        assert_eq!(assignment.membership(&taxa), singleton_membership(&taxa));
    }

    fn singleton_membership(taxa: &TaxonSet) -> BTreeMap<String, Vec<usize>> {
        taxa.iter()
            .enumerate()
            .map(|(i, taxon)| (taxon.to_string(), vec![i + 1]))
            .collect()
    }

    struct EveryEdgeAlone;

    impl EdgeCommunityDetector for EveryEdgeAlone {
        fn detect(
            &self,
            graph: &crate::matrix::WeightedGraph,
            _cut: Option<f64>,
        ) -> BTreeMap<EdgeKey, usize> {
            graph.edges().iter().enumerate().map(|(i, e)| (e.key(), i)).collect()
        }
    }

    #[test]
    fn test_injected_detector() {
        let (matrix, taxa) = germanic();
        let clusterer = LinkClusterer::with_detector(EveryEdgeAlone);
        let assignment = clusterer.cluster(&matrix, &taxa, &LinkOptions::new(0.5)).unwrap();

        assert_eq!(
            clusters(&assignment),
            expected(&[&["German", "Dutch"], &["Swedish", "Icelandic"], &["English", "Dutch"]])
        );
    }
}
