//! Fuzzy consensus clustering by leave-one-out co-membership.
//!
//! Every taxon is removed in turn and the remaining taxa are flat-clustered.
//! Pairs that end up together gain one unit of weight in a co-membership
//! graph over all taxa. The maximal cliques of that graph are the fuzzy
//! clusters: a taxon that sits between two groups shows up in both.

mod cliques;

pub use cliques::{CliqueEnumerator, PetgraphCliques};

use crate::assignment::{AssignmentShape, ClusterAssignment};
use crate::errors::{ClusterError, Result};
use crate::link::{EdgeCommunityDetector, LinkClusterer, LinkOptions, SingleLinkageCommunities};
use crate::linkage::{AgglomerativeLinkage, HierarchicalLinkage, LinkageMethod};
use crate::matrix::{DistanceMatrix, TaxonSet};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Flat clustering run on each leave-one-out matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusMethod {
    #[default]
    Upgma,
    Single,
    Complete,
    /// Exclusive link clustering
    Link,
}

impl ConsensusMethod {
    pub fn linkage(&self) -> Option<LinkageMethod> {
        match self {
            Self::Upgma => Some(LinkageMethod::Upgma),
            Self::Single => Some(LinkageMethod::Single),
            Self::Complete => Some(LinkageMethod::Complete),
            Self::Link => None,
        }
    }
}

impl fmt::Display for ConsensusMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.linkage() {
            Some(method) => write!(f, "{}", method),
            None => f.write_str("link"),
        }
    }
}

impl FromStr for ConsensusMethod {
    type Err = ClusterError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "link" | "link_clustering" => Ok(Self::Link),
            other => other.parse::<LinkageMethod>().map(Self::from),
        }
    }
}

impl From<LinkageMethod> for ConsensusMethod {
    fn from(method: LinkageMethod) -> Self {
        match method {
            LinkageMethod::Upgma => Self::Upgma,
            LinkageMethod::Single => Self::Single,
            LinkageMethod::Complete => Self::Complete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusOptions {
    pub threshold: f64,
    pub method: ConsensusMethod,
}

impl ConsensusOptions {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            method: ConsensusMethod::default(),
        }
    }
}

/// Undirected graph over all taxa, edge weights counting co-clustered runs.
///
/// Node `i` carries taxon index `i`.
#[derive(Debug, Clone)]
pub struct CoMembershipGraph {
    graph: UnGraph<usize, u32>,
}

impl CoMembershipGraph {
    pub fn new(size: usize) -> Self {
        let mut graph = UnGraph::with_capacity(size, 0);
        for taxon in 0..size {
            graph.add_node(taxon);
        }
        Self { graph }
    }

    pub fn increment(&mut self, a: usize, b: usize) {
        let (a, b) = (NodeIndex::new(a), NodeIndex::new(b));
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge] += 1,
            None => {
                self.graph.add_edge(a, b, 1);
            }
        }
    }

    pub fn weight(&self, a: usize, b: usize) -> u32 {
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .map_or(0, |edge| self.graph[edge])
    }

    /// `(low, high, weight)` for every edge, sorted
    pub fn edges(&self) -> Vec<(usize, usize, u32)> {
        let mut edges: Vec<(usize, usize, u32)> = self
            .graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                let (a, b) = (self.graph[a], self.graph[b]);
                Some((a.min(b), a.max(b), self.graph[edge]))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn graph(&self) -> &UnGraph<usize, u32> {
        &self.graph
    }
}

/// Fuzzy clusters together with the graph they were read from
#[derive(Debug, Clone)]
pub struct FuzzyConsensus {
    pub assignment: ClusterAssignment,
    pub graph: CoMembershipGraph,
}

pub struct ConsensusClusterer<
    L: HierarchicalLinkage = AgglomerativeLinkage,
    D: EdgeCommunityDetector = SingleLinkageCommunities,
    Q: CliqueEnumerator = PetgraphCliques,
> {
    linkage: L,
    link: LinkClusterer<D>,
    cliques: Q,
}

impl ConsensusClusterer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for ConsensusClusterer {
    fn default() -> Self {
        Self {
            linkage: AgglomerativeLinkage,
            link: LinkClusterer::new(),
            cliques: PetgraphCliques,
        }
    }
}

impl<L, D, Q> ConsensusClusterer<L, D, Q>
where
    L: HierarchicalLinkage,
    D: EdgeCommunityDetector,
    Q: CliqueEnumerator,
{
    pub fn with_providers(linkage: L, link: LinkClusterer<D>, cliques: Q) -> Self {
        Self {
            linkage,
            link,
            cliques,
        }
    }

    pub fn cluster(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
        options: &ConsensusOptions,
    ) -> Result<FuzzyConsensus> {
        matrix.check_taxa(taxa)?;

        let positions: HashMap<&str, usize> =
            taxa.iter().enumerate().map(|(i, t)| (t, i)).collect();
        let mut graph = CoMembershipGraph::new(taxa.len());

        if taxa.len() > 1 {
            for left_out in 0..taxa.len() {
                let reduced = matrix.without(left_out);
                let reduced_taxa = taxa.without(left_out);
                let clusters = self.flat(&reduced, &reduced_taxa, options)?;

                for (_, members) in clusters.iter() {
                    let indices: Vec<usize> = members
                        .iter()
                        .filter_map(|m| positions.get(m.as_str()).copied())
                        .collect();
                    for (a, &i) in indices.iter().enumerate() {
                        for &j in &indices[a + 1..] {
                            graph.increment(i, j);
                        }
                    }
                }
            }
        }

        let groups: Vec<Vec<usize>> = self.cliques.maximal_cliques(&graph).collect();
        debug!(
            method = %options.method,
            threshold = options.threshold,
            cliques = groups.len(),
            "fuzzy consensus"
        );

        Ok(FuzzyConsensus {
            assignment: ClusterAssignment::from_index_groups(AssignmentShape::Fuzzy, groups, taxa),
            graph,
        })
    }

    fn flat(
        &self,
        matrix: &DistanceMatrix,
        taxa: &TaxonSet,
        options: &ConsensusOptions,
    ) -> Result<ClusterAssignment> {
        match options.method.linkage() {
            Some(method) => self
                .linkage
                .flat_cluster(method, options.threshold, matrix, taxa),
            None => self
                .link
                .cluster(matrix, taxa, &LinkOptions::new(options.threshold).exclusive()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::fixtures::{germanic, two_triangles};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_germanic_co_membership() {
        let (matrix, taxa) = germanic();
        let result = ConsensusClusterer::new()
            .cluster(&matrix, &taxa, &ConsensusOptions::new(0.5))
            .unwrap();

        assert_eq!(result.graph.edges(), vec![(0, 4, 3), (1, 2, 3), (3, 4, 1)]);
        assert_eq!(result.graph.weight(4, 0), 3);
        assert_eq!(result.graph.weight(0, 1), 0);
    }

    #[test]
    fn test_germanic_cliques() {
        let (matrix, taxa) = germanic();
        let result = ConsensusClusterer::new()
            .cluster(&matrix, &taxa, &ConsensusOptions::new(0.5))
            .unwrap();
        let assignment = result.assignment;

        assert!(assignment.is_fuzzy());
        assert_eq!(assignment.get(1).unwrap(), ["German", "Dutch"]);
        assert_eq!(assignment.get(2).unwrap(), ["Swedish", "Icelandic"]);
        assert_eq!(assignment.get(3).unwrap(), ["English", "Dutch"]);
        assert_eq!(assignment.membership(&taxa)["Dutch"], vec![1, 3]);
    }

    #[test]
    fn test_link_method() {
        let (matrix, taxa) = germanic();
        let options = ConsensusOptions {
            threshold: 0.5,
            method: ConsensusMethod::Link,
        };
        let result = ConsensusClusterer::new().cluster(&matrix, &taxa, &options).unwrap();

        assert_eq!(
            result.graph.edges(),
            vec![(0, 3, 2), (0, 4, 3), (1, 2, 3), (3, 4, 3)]
        );
        assert_eq!(
            result.assignment.partition(),
            vec![
                vec!["Dutch".to_string(), "English".to_string(), "German".to_string()],
                vec!["Icelandic".to_string(), "Swedish".to_string()],
            ]
        );
    }

    #[test]
    fn test_separated_groups_are_cliques() {
        let (matrix, taxa) = two_triangles();
        let result = ConsensusClusterer::new()
            .cluster(&matrix, &taxa, &ConsensusOptions::new(0.4))
            .unwrap();

        assert_eq!(result.assignment.len(), 2);
        assert_eq!(result.assignment.get(1).unwrap(), ["a", "b", "c"]);
        assert_eq!(result.assignment.get(2).unwrap(), ["d", "e", "f"]);
    }

    #[test]
    fn test_single_taxon() {
        let matrix = DistanceMatrix::from_rows(vec![vec![0.0]]).unwrap();
        let taxa = TaxonSet::new(["solo"]).unwrap();
        let result = ConsensusClusterer::new()
            .cluster(&matrix, &taxa, &ConsensusOptions::new(0.5))
            .unwrap();
        assert_eq!(result.assignment.get(1).unwrap(), ["solo"]);
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("link".parse::<ConsensusMethod>().unwrap(), ConsensusMethod::Link);
        assert_eq!("Single".parse::<ConsensusMethod>().unwrap(), ConsensusMethod::Single);
        assert!("ward".parse::<ConsensusMethod>().is_err());
    }
}
